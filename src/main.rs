use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::{error, info};

mod db;
mod handlers;
mod models;

use db::MongoDB;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mongodb_uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_name = std::env::var("DATABASE_NAME").unwrap_or_else(|_| "ride_book".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let db = MongoDB::new(&mongodb_uri, &db_name)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    if let Err(e) = db.seed_data().await {
        error!("FAQ seeding failed: {}", e);
    }

    info!("Starting ride-book server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .route("/api/health", web::get().to(handlers::misc::health))
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login))
                    .route("/logout", web::post().to(handlers::auth::logout)),
            )
            .service(
                web::scope("/api/users")
                    .route("/me", web::get().to(handlers::users::me))
                    .route("/me/profile", web::put().to(handlers::users::update_profile))
                    .route("", web::get().to(handlers::users::list_users))
                    .route("/{id}/role", web::put().to(handlers::users::set_role)),
            )
            .service(
                web::scope("/api/bookings")
                    .route("", web::post().to(handlers::bookings::create_booking))
                    .route("/my", web::get().to(handlers::bookings::get_user_bookings))
                    .route("", web::get().to(handlers::bookings::get_all_bookings))
                    .route("/{id}/assign", web::put().to(handlers::bookings::assign_driver))
                    .route("/{id}/status", web::put().to(handlers::bookings::update_status))
                    .route("/{id}", web::delete().to(handlers::bookings::cancel_booking)),
            )
            .service(
                web::scope("/api/trips")
                    .route("", web::post().to(handlers::trips::create_trip))
                    .route("/my", web::get().to(handlers::trips::get_user_trips))
                    .route("", web::get().to(handlers::trips::get_all_trips))
                    .route("/{id}/status", web::put().to(handlers::trips::update_status))
                    .route("/{id}", web::delete().to(handlers::trips::cancel_trip)),
            )
            .service(
                web::scope("/api/cars")
                    .route("", web::post().to(handlers::cars::create_car))
                    .route("", web::get().to(handlers::cars::get_available_cars))
                    .route("/mine", web::get().to(handlers::cars::get_my_cars))
                    .route("/{id}/verify", web::put().to(handlers::cars::verify_car))
                    .route("/{id}", web::delete().to(handlers::cars::delete_car)),
            )
            .service(
                web::scope("/api/payments")
                    .route("/session", web::post().to(handlers::payments::create_session))
                    .route("/webhook", web::post().to(handlers::payments::webhook))
                    .route("/transactions", web::get().to(handlers::payments::get_transactions)),
            )
            .service(
                web::scope("/api/chat")
                    .route("", web::post().to(handlers::chatbot::chat))
                    .route("/history", web::get().to(handlers::chatbot::history)),
            )
            .route("/api/contact", web::post().to(handlers::misc::create_contact))
            .route("/api/feedback", web::post().to(handlers::misc::create_feedback))
            .route("/api/feedback", web::get().to(handlers::misc::list_feedback))
            .route("/api/reviews", web::post().to(handlers::misc::create_review))
            .route(
                "/api/reviews/driver/{id}",
                web::get().to(handlers::misc::get_driver_reviews),
            )
            .route(
                "/api/drivers/active",
                web::get().to(handlers::misc::get_active_drivers),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
