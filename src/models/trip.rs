use super::booking::BookingStatus;
use super::payment::PaymentStatus;
use serde::{Deserialize, Serialize, Serializer};

// A tour-package booking. Shares the status enums with ride bookings.
#[derive(Serialize, Deserialize, Clone)]
pub struct Trip {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_id_as_hex"
    )]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub user_id: mongodb::bson::oid::ObjectId,
    pub tour_name: String,
    pub start_date: String,
    pub guests: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_session_id: Option<String>,
    pub contact_email: String,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<mongodb::bson::DateTime>,
}

fn serialize_id_as_hex<S>(
    id: &Option<mongodb::bson::oid::ObjectId>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(oid) => serializer.serialize_str(&oid.to_hex()),
        None => serializer.serialize_none(),
    }
}

#[derive(Deserialize)]
pub struct CreateTripRequest {
    pub tour_name: String,
    pub start_date: String,
    pub guests: i32,
    pub total_price: f64,
    pub contact_email: Option<String>,
}
