//! Token verification only. Issuing, refresh and revocation belong to the
//! identity service that fronts this one; we just trust its signed claims.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Username.
    pub sub: String,
    /// Role id, see `model::role::Role`.
    pub role: u8,
    pub exp: usize,

    /// Present only if this user is linked to an employee record.
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
pub fn sign_token(claims: &Claims, secret: &str) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            user_id: 7,
            sub: "jdoe".into(),
            role: 2,
            exp: 4_102_444_800, // far future
            employee_id: Some(1000),
            department_id: Some(4),
        }
    }

    #[test]
    fn round_trips_signed_claims() {
        let token = sign_token(&claims(), "secret");
        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.employee_id, Some(1000));
        assert_eq!(decoded.department_id, Some(4));
    }

    #[test]
    fn rejects_a_foreign_signature() {
        let token = sign_token(&claims(), "secret");
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
