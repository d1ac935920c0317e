use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Payment,
    Refund,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PaymentTransaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    // Provider session or payment id this transaction settles.
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub customer_email: String,
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<mongodb::bson::oid::ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<mongodb::bson::oid::ObjectId>,
    pub created_at: mongodb::bson::DateTime,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    // Exactly one of these identifies the record being paid for.
    pub booking_id: Option<String>,
    pub trip_id: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub checkout_url: String,
}

// Shape of the provider's checkout-session creation response.
#[derive(Deserialize)]
pub struct ProviderSession {
    pub id: String,
    pub url: String,
}

// Inbound webhook event. Signature verification is disabled; the payload
// is trusted as-is.
#[derive(Serialize, Deserialize, Clone)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct WebhookEventData {
    pub session_id: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub customer_email: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_event_decodes() {
        let raw = r#"{
            "type": "checkout.completed",
            "data": {
                "session_id": "cs_test_123",
                "amount": 1450.0,
                "currency": "kes",
                "customer_email": "rider@example.com"
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, "checkout.completed");
        assert_eq!(event.data.session_id, "cs_test_123");
        assert_eq!(event.data.currency, "kes");
    }

    #[test]
    fn webhook_event_defaults_currency() {
        let raw = r#"{
            "type": "payment.refunded",
            "data": {
                "session_id": "cs_test_456",
                "amount": 900.0,
                "customer_email": "rider@example.com"
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.data.currency, "usd");
    }

    #[test]
    fn payment_status_rejects_unknown_values() {
        assert!(serde_json::from_str::<PaymentStatus>("\"paid\"").is_ok());
        assert!(serde_json::from_str::<PaymentStatus>("\"settled\"").is_err());
    }
}
