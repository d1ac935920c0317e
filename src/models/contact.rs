use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct Contact {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: mongodb::bson::DateTime,
}

#[derive(Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Feedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<mongodb::bson::oid::ObjectId>,
    pub message: String,
    pub created_at: mongodb::bson::DateTime,
}

#[derive(Deserialize)]
pub struct CreateFeedbackRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub user_id: mongodb::bson::oid::ObjectId,
    pub driver_id: mongodb::bson::oid::ObjectId,
    pub rating: i32,
    pub comment: String,
    pub created_at: mongodb::bson::DateTime,
}

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub driver_id: String,
    pub rating: i32,
    pub comment: String,
}
