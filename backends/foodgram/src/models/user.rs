use crate::schema::users;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;

pub type UserId = i32;

/// A local mirror of an identity managed by the external provider.
#[derive(Debug, Clone, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}
