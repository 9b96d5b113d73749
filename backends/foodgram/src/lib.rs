#[macro_use]
extern crate tracing;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod shopping_list;
pub mod utils;

use actix::Addr;
use jsonwebtoken::DecodingKey;

use crate::db::DbExecutor;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Addr<DbExecutor>,
    pub decoding_key: DecodingKey,
}

impl AppState {
    pub fn new(db: Addr<DbExecutor>, jwt_secret: &str) -> Self {
        Self {
            db,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }
}
