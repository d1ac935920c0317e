use super::payment::PaymentStatus;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Assigned,
    Completed,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_id_as_hex"
    )]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub user_id: mongodb::bson::oid::ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<mongodb::bson::oid::ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_id: Option<mongodb::bson::oid::ObjectId>,
    pub pickup: String,
    pub dropoff: String,
    pub ride_date: String,
    pub passengers: i32,
    pub fare: f64,
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
pub struct CreateBookingRequest {
    pub pickup: String,
    pub dropoff: String,
    pub ride_date: String,
    pub passengers: i32,
    pub fare: f64,
    pub contact_email: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: String,
    pub car_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_lowercase() {
        let s = serde_json::to_string(&BookingStatus::Assigned).unwrap();
        assert_eq!(s, "\"assigned\"");
        let back: BookingStatus = serde_json::from_str(&s).unwrap();
        assert_eq!(back, BookingStatus::Assigned);
    }

    #[test]
    fn out_of_enum_status_is_rejected() {
        let parsed: Result<UpdateStatusRequest, _> =
            serde_json::from_str(r#"{ "status": "teleported" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn any_enum_value_is_accepted_as_update() {
        // No transition table: every enum value is a valid target.
        for raw in ["pending", "confirmed", "assigned", "completed", "cancelled"] {
            let body = format!(r#"{{ "status": "{}" }}"#, raw);
            assert!(serde_json::from_str::<UpdateStatusRequest>(&body).is_ok());
        }
    }
}
