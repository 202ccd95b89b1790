use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

/// Tokens are issued by the identity service; tests mint their own.
#[cfg(test)]
pub fn generate_access_token(
    user_id: u64,
    role: crate::model::role::Role,
    employee_id: Option<u64>,
    secret: &str,
) -> String {
    use crate::models::TokenType;
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        user_id,
        sub: format!("user-{user_id}"),
        role: role as u8,
        exp: (chrono::Utc::now().timestamp() + 900) as usize,
        jti: uuid::Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
