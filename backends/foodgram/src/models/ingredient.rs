use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{ingredients, recipe_ingredients};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = ingredients)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ingredients)]
pub struct NewIngredient {
    pub id: Option<i32>,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub struct NewRecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub amount: i32,
}
