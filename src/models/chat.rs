use serde::{Deserialize, Serialize};

// Below this score the bot answers with a generic fallback instead of a
// weakly-matched FAQ entry.
pub const MATCH_THRESHOLD: f64 = 0.25;

pub const FALLBACK_ANSWER: &str =
    "Sorry, I don't have an answer for that yet. Please reach out via the contact form.";

#[derive(Serialize, Deserialize, Clone)]
pub struct FaqEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    pub question: String,
    pub answer: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<mongodb::bson::oid::ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<mongodb::bson::oid::ObjectId>,
    pub question: String,
    pub answer: String,
    pub score: f64,
    pub created_at: mongodb::bson::DateTime,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub score: f64,
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(|t| t.to_string())
        .collect();
    // Jaccard works on sets; repeated words must not count twice.
    tokens.sort();
    tokens.dedup();
    tokens
}

/// Token-overlap similarity between a user question and an FAQ question
/// (Jaccard over words longer than two characters).
pub fn similarity(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.iter().filter(|t| tb.contains(t)).count();
    let total = ta.len() + tb.len() - shared;
    shared as f64 / total as f64
}

/// Picks the FAQ entry closest to `question`, or `None` when the best score
/// falls below the threshold.
pub fn best_match<'a>(question: &str, entries: &'a [FaqEntry]) -> Option<(&'a FaqEntry, f64)> {
    let mut best: Option<(&FaqEntry, f64)> = None;
    for entry in entries {
        let score = similarity(question, &entry.question);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((entry, score));
        }
    }
    best.filter(|(_, score)| *score >= MATCH_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(question: &str, answer: &str) -> FaqEntry {
        FaqEntry {
            id: None,
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn identical_questions_score_one() {
        assert_eq!(similarity("How do I cancel a booking?", "How do I cancel a booking?"), 1.0);
    }

    #[test]
    fn similarity_is_case_insensitive() {
        let a = similarity("CANCEL MY BOOKING", "cancel my booking");
        assert!(a > 0.99);
    }

    #[test]
    fn repeated_tokens_do_not_inflate_the_score() {
        let score = similarity("book book book", "booking a book");
        assert!(score <= 1.0);
        // {book} vs {book, booking}: one shared token over a union of two.
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn unrelated_questions_score_low() {
        assert!(similarity("refund policy", "driver documents") < MATCH_THRESHOLD);
    }

    #[test]
    fn best_match_prefers_closest_entry() {
        let entries = vec![
            faq("How do I cancel a booking?", "Open My Bookings and press cancel."),
            faq("How do I become a driver?", "Register with the driver role."),
        ];
        let (hit, score) = best_match("can I cancel my booking", &entries).unwrap();
        assert_eq!(hit.answer, "Open My Bookings and press cancel.");
        assert!(score >= MATCH_THRESHOLD);
    }

    #[test]
    fn below_threshold_yields_no_match() {
        let entries = vec![faq("How do I cancel a booking?", "...")];
        assert!(best_match("what is the weather tomorrow", &entries).is_none());
    }

    #[test]
    fn empty_question_never_matches() {
        let entries = vec![faq("How do I cancel a booking?", "...")];
        assert!(best_match("", &entries).is_none());
    }
}
