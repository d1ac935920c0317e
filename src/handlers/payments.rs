use actix_web::{web, Error, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::payment::ProviderSession;
use crate::models::{CreateSessionRequest, Role, SessionResponse, WebhookEvent};

/// Creates a provider-hosted checkout session for a booking or trip the
/// caller owns and stores the session id on the record so the webhook can
/// find it again.
pub async fn create_session(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    payload: web::Json<CreateSessionRequest>,
) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    // Resolve the record being paid for and check ownership.
    let (amount, email, booking_id, trip_id) = if let Some(id) = &payload.booking_id {
        let booking = match db.get_booking(id).await {
            Ok(Some(b)) => b,
            Ok(None) => return Ok(HttpResponse::NotFound().json(json!({ "error": "Booking not found" }))),
            Err(e) => return Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
        };
        if booking.user_id.to_hex() != claims.sub {
            return Ok(HttpResponse::Forbidden().json(json!({ "error": "Not your booking" })));
        }
        (booking.fare, booking.contact_email, Some(id.clone()), None)
    } else if let Some(id) = &payload.trip_id {
        let trip = match db.get_trip(id).await {
            Ok(Some(t)) => t,
            Ok(None) => return Ok(HttpResponse::NotFound().json(json!({ "error": "Trip not found" }))),
            Err(e) => return Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
        };
        if trip.user_id.to_hex() != claims.sub {
            return Ok(HttpResponse::Forbidden().json(json!({ "error": "Not your trip" })));
        }
        (trip.total_price, trip.contact_email, None, Some(id.clone()))
    } else {
        return Ok(HttpResponse::BadRequest().json(json!({ "error": "booking_id or trip_id required" })));
    };

    // 1. Ask the provider for a checkout session
    let api_url = std::env::var("PAYMENT_API_URL")
        .unwrap_or_else(|_| "https://api.payments.example.com/v1/checkout/sessions".to_string());
    let api_key = std::env::var("PAYMENT_API_KEY").unwrap_or_default();

    let client = reqwest::Client::new();
    let response = client
        .post(&api_url)
        .bearer_auth(api_key)
        .json(&json!({
            "amount": amount,
            "currency": "usd",
            "customer_email": email,
        }))
        .send()
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if !response.status().is_success() {
        error!("Payment provider rejected session creation: {}", response.status());
        return Ok(HttpResponse::BadGateway().json(json!({ "error": "Payment provider error" })));
    }

    let session: ProviderSession = response
        .json()
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    // 2. Store the session reference on the record
    let stored = match (&booking_id, &trip_id) {
        (Some(id), _) => db.set_booking_session(id, &session.id).await,
        (_, Some(id)) => db.set_trip_session(id, &session.id).await,
        (None, None) => Ok(()),
    };
    if let Err(e) = stored {
        return Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() })));
    }

    info!("Created payment session {} for user {}", session.id, claims.sub);
    Ok(HttpResponse::Ok().json(SessionResponse {
        session_id: session.id,
        checkout_url: session.url,
    }))
}

/// Provider event intake. Signature verification is disabled; events are
/// reconciled purely by payload matching.
pub async fn webhook(
    db: web::Data<MongoDB>,
    event: web::Json<WebhookEvent>,
) -> Result<HttpResponse, Error> {
    match event.event_type.as_str() {
        "checkout.completed" => match db.reconcile_checkout(&event.data).await {
            Ok(transaction) => Ok(HttpResponse::Ok().json(json!({ "received": true, "transaction": transaction }))),
            Err(e) => {
                error!("Checkout reconciliation failed: {}", e);
                Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() })))
            }
        },
        "payment.refunded" => match db.reconcile_refund(&event.data).await {
            Ok(transaction) => Ok(HttpResponse::Ok().json(json!({ "received": true, "transaction": transaction }))),
            Err(e) => {
                error!("Refund reconciliation failed: {}", e);
                Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() })))
            }
        },
        other => {
            // Unhandled event types are acknowledged so the provider stops retrying.
            info!("Ignoring webhook event type: {}", other);
            Ok(HttpResponse::Ok().json(json!({ "received": true })))
        }
    }
}

pub async fn get_transactions(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    let result = if claims.role == Role::Admin {
        db.get_all_transactions().await
    } else {
        let user = match db.get_user(&claims.sub).await {
            Ok(Some(u)) => u,
            Ok(None) => return Ok(HttpResponse::NotFound().json(json!({ "error": "User not found" }))),
            Err(e) => return Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
        };
        db.get_transactions_for(&claims.sub, &user.email).await
    };

    match result {
        Ok(transactions) => Ok(HttpResponse::Ok().json(transactions)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}
