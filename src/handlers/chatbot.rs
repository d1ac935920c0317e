use actix_web::{web, Error, HttpRequest, HttpResponse};
use mongodb::bson;
use serde_json::json;

use crate::db::MongoDB;
use crate::handlers::claims_from_token;
use crate::models::chat::{best_match, ChatMessage, ChatReply, ChatRequest, FALLBACK_ANSWER};

pub async fn chat(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, Error> {
    if body.message.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({ "error": "Message is empty" })));
    }

    // Anonymous visitors can use the bot; only history is tied to an account.
    let user_oid = claims_from_token(&req)
        .and_then(|c| bson::oid::ObjectId::parse_str(&c.sub).ok());

    let entries = match db.get_faq_entries().await {
        Ok(entries) => entries,
        Err(e) => return Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    };

    let (answer, score) = match best_match(&body.message, &entries) {
        Some((entry, score)) => (entry.answer.clone(), score),
        None => (FALLBACK_ANSWER.to_string(), 0.0),
    };

    let message = ChatMessage {
        id: None,
        user_id: user_oid,
        question: body.message.clone(),
        answer: answer.clone(),
        score,
        created_at: bson::DateTime::now(),
    };
    if let Err(e) = db.insert_chat_message(message).await {
        log::warn!("Failed to persist chat message: {}", e);
    }

    Ok(HttpResponse::Ok().json(ChatReply { answer, score }))
}

pub async fn history(req: HttpRequest, db: web::Data<MongoDB>) -> Result<HttpResponse, Error> {
    let claims = match claims_from_token(&req) {
        Some(c) => c,
        None => return Ok(HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))),
    };

    match db.get_chat_history(&claims.sub).await {
        Ok(messages) => Ok(HttpResponse::Ok().json(messages)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))),
    }
}
