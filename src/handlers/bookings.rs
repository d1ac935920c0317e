use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::booking::{AssignDriverRequest, CreateBookingRequest, UpdateStatusRequest};
use crate::models::Role;

pub async fn create_booking(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    booking_req: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.create_booking(&claims.sub, &booking_req).await {
        Ok(booking) => Ok(HttpResponse::Created().json(booking)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_user_bookings(
    req: HttpRequest,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.get_user_bookings(&claims.sub).await {
        Ok(bookings) => {
            let mut detailed_bookings = Vec::new();
            for b in bookings {
                let car = match &b.car_id {
                    Some(id) => db.get_car(&id.to_hex()).await.ok().flatten(),
                    None => None,
                };
                let driver = match &b.driver_id {
                    Some(id) => db.get_user(&id.to_hex()).await.ok().flatten(),
                    None => None,
                };
                detailed_bookings.push(json!({
                    "id": b.id.map(|id| id.to_hex()),
                    "pickup": b.pickup,
                    "dropoff": b.dropoff,
                    "date": b.ride_date,
                    "passengers": b.passengers,
                    "fare": b.fare,
                    "status": b.status,
                    "paymentStatus": b.payment_status,
                    "driverName": driver.as_ref().map(|d| d.username.clone()).unwrap_or_else(|| "Not assigned".to_string()),
                    "carModel": car.as_ref().map(|c| c.model.clone()).unwrap_or_else(|| "Not assigned".to_string()),
                    "carPlate": car.as_ref().map(|c| c.plate.clone()).unwrap_or_else(|| "N/A".to_string()),
                    "bookingDate": b.created_at.to_string(), // Simple string representation
                }));
            }
            Ok(HttpResponse::Ok().json(detailed_bookings))
        }
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_all_bookings(
    req: HttpRequest,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    match db.get_all_bookings().await {
        Ok(bookings) => Ok(HttpResponse::Ok().json(bookings)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn assign_driver(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<AssignDriverRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    let booking_id = path.into_inner();
    match db.assign_driver(&booking_id, &body.driver_id, body.car_id.as_deref()).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Driver assigned" }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn update_status(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role == Role::Customer {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Driver or admin access required" })));
    }

    let booking_id = path.into_inner();
    match db.update_booking_status(&booking_id, &claims, body.status).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "status": body.status }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn cancel_booking(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let booking_id = path.into_inner();
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.cancel_booking(&booking_id, &claims.sub).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Booking cancelled successfully" }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}
