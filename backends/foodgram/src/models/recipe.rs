use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};

use crate::models::user::UserId;
use crate::schema::recipes;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = recipes)]
pub struct Recipe {
    pub id: i32,
    pub author_id: UserId,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub struct NewRecipe<'a> {
    pub author_id: UserId,
    pub name: &'a str,
    pub text: &'a str,
    pub image: &'a str,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = recipes)]
pub struct UpdateRecipe<'a> {
    pub name: Option<&'a str>,
    pub text: Option<&'a str>,
    pub image: Option<&'a str>,
    pub cooking_time: Option<i32>,
}
