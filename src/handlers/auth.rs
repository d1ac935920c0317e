use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;

pub async fn register(
    db: web::Data<MongoDB>,
    user: web::Json<crate::models::RegisterRequest>,
) -> Result<HttpResponse, Error> {
    match db.create_user(&user).await {
        Ok(auth_response) => Ok(HttpResponse::Ok().json(auth_response)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn login(
    db: web::Data<MongoDB>,
    credentials: web::Json<crate::models::LoginRequest>,
) -> Result<HttpResponse, Error> {
    match db.authenticate_user(&credentials).await {
        Ok(auth_response) => Ok(HttpResponse::Ok().json(auth_response)),
        Err(e) => Ok(HttpResponse::Unauthorized().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn logout(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.close_sessions(&claims.sub).await {
        Ok(closed) => Ok(HttpResponse::Ok().json(json!({ "success": true, "sessions_closed": closed }))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}
