use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::{CreateContactRequest, CreateFeedbackRequest, CreateReviewRequest, Role};

pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

pub async fn create_contact(
    db: web::Data<MongoDB>,
    body: web::Json<CreateContactRequest>,
) -> Result<HttpResponse, Error> {
    match db.create_contact(&body).await {
        Ok(contact) => Ok(HttpResponse::Created().json(contact)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn create_feedback(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    body: web::Json<CreateFeedbackRequest>,
) -> Result<HttpResponse, Error> {
    let user_id = claims_from_token(&req).map(|c| c.sub);

    match db.create_feedback(user_id.as_deref(), &body).await {
        Ok(feedback) => Ok(HttpResponse::Created().json(feedback)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn list_feedback(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    match db.list_feedback().await {
        Ok(entries) => Ok(HttpResponse::Ok().json(entries)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn create_review(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.create_review(&claims.sub, &body).await {
        Ok(review) => Ok(HttpResponse::Created().json(review)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_driver_reviews(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let driver_id = path.into_inner();
    match db.get_driver_reviews(&driver_id).await {
        Ok(reviews) => Ok(HttpResponse::Ok().json(reviews)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

// Presence read model: drivers with an open session.
pub async fn get_active_drivers(db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    match db.get_active_drivers().await {
        Ok(drivers) => Ok(HttpResponse::Ok().json(drivers)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}
