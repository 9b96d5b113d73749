use diesel::Insertable;

use crate::models::user::UserId;
use crate::schema::{favorite_recipes, shopping_carts};

#[derive(Debug, Insertable)]
#[diesel(table_name = favorite_recipes)]
pub struct NewFavoriteRecipe {
    pub user_id: UserId,
    pub recipe_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = shopping_carts)]
pub struct NewShoppingCartEntry {
    pub user_id: UserId,
    pub recipe_id: i32,
}
