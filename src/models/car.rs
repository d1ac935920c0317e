use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct Car {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub owner_id: mongodb::bson::oid::ObjectId,
    pub model: String,
    pub plate: String,
    pub seats: i32,
    pub rate_per_km: f64,
    pub location: String,
    pub available: bool,
    pub verified: bool,
    pub created_at: mongodb::bson::DateTime,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CarResponse {
    pub id: String,
    pub owner_id: String,
    pub model: String,
    pub plate: String,
    pub seats: i32,
    pub rate_per_km: f64,
    pub location: String,
    pub available: bool,
    pub verified: bool,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            owner_id: car.owner_id.to_hex(),
            model: car.model,
            plate: car.plate,
            seats: car.seats,
            rate_per_km: car.rate_per_km,
            location: car.location,
            available: car.available,
            verified: car.verified,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateCarRequest {
    pub model: String,
    pub plate: String,
    pub seats: i32,
    pub rate_per_km: f64,
    pub location: String,
}
