//! Authentication middleware and extractors.
//!
//! Bearer-token authentication. Every handler that acts on behalf of a
//! customer takes a [`RequireCustomer`] extractor and receives an explicit
//! [`CustomerIdentity`]; there is no ambient identity below the route layer.
//! Administrative routes take [`RequireAdmin`] instead.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use copper_kettle_core::{CustomerId, Email};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::CustomerIdentity;
use crate::state::AppState;

/// Role carried inside a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

/// JWT claims for storefront bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Customer identifier.
    pub sub: String,
    /// Display name.
    pub username: String,
    /// Account email address.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Access role.
    pub role: Role,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Extractor that requires an authenticated customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     RequireCustomer(identity): RequireCustomer,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
pub struct RequireCustomer(pub CustomerIdentity);

/// Extractor that requires an authenticated administrator.
pub struct RequireAdmin(pub CustomerIdentity);

/// Rejection for a missing, malformed, or insufficient bearer token.
#[derive(Debug)]
pub enum AuthRejection {
    /// No valid token on the request.
    Unauthorized,
    /// Valid token, wrong role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        identity_from_claims(&claims).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        if claims.role != Role::Admin {
            return Err(AuthRejection::Forbidden);
        }
        identity_from_claims(&claims).map(Self)
    }
}

fn claims_from_parts(parts: &Parts, state: &AppState) -> Result<Claims, AuthRejection> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthRejection::Unauthorized)?;

    let token = bearer_token(header).ok_or(AuthRejection::Unauthorized)?;
    decode_claims(token, state.config().jwt_secret.expose_secret()).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AuthRejection::Unauthorized
    })
}

/// Strip the `Bearer ` scheme from an Authorization header value.
fn bearer_token(header: &str) -> Option<&str> {
    let rest = header.strip_prefix("Bearer ")?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Decode and validate a bearer token. Expiry is checked by the library.
fn decode_claims(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

fn identity_from_claims(claims: &Claims) -> Result<CustomerIdentity, AuthRejection> {
    let email = Email::parse(&claims.email).map_err(|_| AuthRejection::Unauthorized)?;
    Ok(CustomerIdentity {
        customer_id: CustomerId::new(claims.sub.clone()),
        username: claims.username.clone(),
        email,
        phone: claims.phone.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    const SECRET: &str = "mZ4qT8wB2nK6xR9pC3vJ7dL1gF5hY0sA";

    fn token(role: Role, exp_offset_secs: i64) -> String {
        let claims = Claims {
            sub: "cust_42".to_string(),
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: Some("9800000000".to_string()),
            role,
            exp: Utc::now().timestamp() + exp_offset_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("encode token")
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_decode_valid_token() {
        let claims = decode_claims(&token(Role::Customer, 3600), SECRET).expect("valid token");
        assert_eq!(claims.sub, "cust_42");
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.phone.as_deref(), Some("9800000000"));
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let result = decode_claims(&token(Role::Customer, 3600), "another-secret-entirely-here!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let result = decode_claims(&token(Role::Customer, -3600), SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_identity_from_claims() {
        let claims = decode_claims(&token(Role::Admin, 3600), SECRET).expect("valid token");
        let identity = identity_from_claims(&claims).expect("identity");
        assert_eq!(identity.customer_id, CustomerId::new("cust_42"));
        assert_eq!(identity.email.as_str(), "asha@example.com");
    }

    #[test]
    fn test_role_round_trips_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("serialize"),
            "\"admin\""
        );
        let role: Role = serde_json::from_str("\"customer\"").expect("deserialize");
        assert_eq!(role, Role::Customer);
    }
}
