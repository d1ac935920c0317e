pub mod auth;
pub mod bookings;
pub mod cars;
pub mod chatbot;
pub mod misc;
pub mod payments;
pub mod trips;
pub mod users;

use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::{debug, error};

use crate::models::Claims;

// Helper to extract claims from JWT token in Authorization header
pub fn claims_from_token(req: &HttpRequest) -> Option<Claims> {
    let auth_header = req.headers().get("Authorization")?;

    let auth_str = auth_header.to_str().ok()?;
    if !auth_str.starts_with("Bearer ") {
        debug!("Invalid Authorization header format");
        return None;
    }

    let token = &auth_str[7..];
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    ) {
        Ok(token_data) => {
            debug!("Token decoded successfully for user: {}", token_data.claims.sub);
            Some(token_data.claims)
        }
        Err(e) => {
            error!("Token decoding failed: {:?}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use actix_web::test::TestRequest;

    fn make_token(role: Role) -> String {
        std::env::set_var("JWT_SECRET", "secret");
        let claims = Claims {
            sub: "64b7f0a1c2d3e4f5a6b7c8d9".to_string(),
            role,
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[test]
    fn extracts_claims_from_bearer_header() {
        let token = make_token(Role::Driver);
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let claims = claims_from_token(&req).unwrap();
        assert_eq!(claims.sub, "64b7f0a1c2d3e4f5a6b7c8d9");
        assert_eq!(claims.role, Role::Driver);
    }

    #[test]
    fn missing_header_yields_none() {
        let req = TestRequest::default().to_http_request();
        assert!(claims_from_token(&req).is_none());
    }

    #[test]
    fn non_bearer_header_yields_none() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(claims_from_token(&req).is_none());
    }

    #[test]
    fn garbage_token_yields_none() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_http_request();
        assert!(claims_from_token(&req).is_none());
    }
}
