use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::user::UserId};

// ================================== Claims ================================== //

/// Claims of a token issued by the external identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub exp: i64,
}

pub trait DecodeJwt {
    fn decode_jwt(&self, key: &DecodingKey) -> AppResult<Claims>;
}

impl DecodeJwt for str {
    fn decode_jwt(&self, key: &DecodingKey) -> AppResult<Claims> {
        let claims = jsonwebtoken::decode::<Claims>(self, key, &Validation::default())?.claims;
        Ok(claims)
    }
}
