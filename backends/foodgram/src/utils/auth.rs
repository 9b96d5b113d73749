use actix_web::{
    http::header::{HeaderValue, AUTHORIZATION},
    web::Data,
    HttpRequest,
};

use crate::{
    db::GenerateAuth,
    error::{AppError, AppResult},
    models::user::{User, UserId},
    utils::DecodeJwt,
    AppState,
};

const SCHEME: &str = "Token";

/// The authenticated viewer of a request.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user: User,
    pub token: String,
}

impl Auth {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// Resolves the viewer for endpoints that require one.
pub async fn authenticate(state: &Data<AppState>, req: &HttpRequest) -> AppResult<Auth> {
    let token = preprocess_authz_token(req.headers().get(AUTHORIZATION))?;
    let claims = token.decode_jwt(&state.decoding_key)?;

    state
        .db
        .send(GenerateAuth {
            user_id: claims.user_id,
            token,
        })
        .await?
}

fn preprocess_authz_token(token: Option<&HeaderValue>) -> AppResult<String> {
    let token = token.ok_or(AppError::Unauthorized("No authorization was provided"))?;
    let mut it = token
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed authorization header"))?
        .split_whitespace();

    let (Some(scheme), Some(token), None) = (it.next(), it.next(), it.next()) else {
        return Err(AppError::Unauthorized("Malformed authorization header"));
    };

    if scheme != SCHEME {
        return Err(AppError::Unauthorized("Invalid authorization method"));
    }

    Ok(token.to_string())
}
