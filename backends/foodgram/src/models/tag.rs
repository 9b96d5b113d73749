use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{recipe_tags, tags};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = tags)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tags)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipe_tags)]
pub struct NewRecipeTag {
    pub recipe_id: i32,
    pub tag_id: i32,
}
