use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::{Role, UpdateProfileRequest, UpdateRoleRequest};

pub async fn me(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    let user = match db.get_user(&claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" }))),
        Err(e) => return Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    };

    let profile = db.get_profile(&claims.sub).await.ok().flatten();

    Ok(HttpResponse::Ok().json(json!({
        "id": claims.sub,
        "username": user.username,
        "email": user.email,
        "role": user.role,
        "profile": profile,
    })))
}

pub async fn update_profile(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.upsert_profile(&claims.sub, &body).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn list_users(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    match db.list_users().await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn set_role(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    let user_id = path.into_inner();
    match db.set_user_role(&user_id, body.role).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "role": body.role }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}
