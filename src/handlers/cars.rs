use actix_web::{web, Error, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::{CarResponse, CreateCarRequest, Role};

pub async fn create_car(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    car_req: web::Json<CreateCarRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Driver {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Driver access required" })));
    }

    match db.create_car(&claims.sub, &car_req).await {
        Ok(car) => Ok(HttpResponse::Created().json(CarResponse::from(car))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_available_cars(db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    match db.get_available_cars().await {
        Ok(cars) => {
            let cars: Vec<CarResponse> = cars.into_iter().map(CarResponse::from).collect();
            Ok(HttpResponse::Ok().json(cars))
        }
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn get_my_cars(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.get_owner_cars(&claims.sub).await {
        Ok(cars) => {
            let cars: Vec<CarResponse> = cars.into_iter().map(CarResponse::from).collect();
            Ok(HttpResponse::Ok().json(cars))
        }
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn verify_car(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };
    if claims.role != Role::Admin {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Admin access required" })));
    }

    let car_id = path.into_inner();
    match db.verify_car(&car_id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Car verified" }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

pub async fn delete_car(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    let car_id = path.into_inner();
    match db.delete_car(&car_id, &claims).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Car removed" }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}
