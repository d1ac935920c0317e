use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::{CreateTripRequest, Role, UpdateStatusRequest};

pub async fn create_trip(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    trip_req: web::Json<CreateTripRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.create_trip(&claims.sub, &trip_req).await {
        Ok(trip) => Ok(HttpResponse::Created().json(trip)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_user_trips(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.get_user_trips(&claims.sub).await {
        Ok(trips) => Ok(HttpResponse::Ok().json(trips)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_all_trips(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    match db.get_all_trips().await {
        Ok(trips) => Ok(HttpResponse::Ok().json(trips)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
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
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    let trip_id = path.into_inner();
    match db.update_trip_status(&trip_id, body.status).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "status": body.status }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn cancel_trip(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let trip_id = path.into_inner();
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.cancel_trip(&trip_id, &claims.sub).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Trip cancelled successfully" }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}
