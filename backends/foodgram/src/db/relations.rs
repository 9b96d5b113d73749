use actix::prelude::*;
use diesel::prelude::*;

use crate::api::recipes::{AddToRelation, RemoveFromRelation, ShortRecipeResponse};
use crate::db::recipes::find_recipe;
use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::relation::{NewFavoriteRecipe, NewShoppingCartEntry};
use crate::models::user::UserId;
use crate::schema::{favorite_recipes, shopping_carts};

/// The per-user recipe sets: favorites and the shopping cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeRelation {
    Favorite,
    ShoppingCart,
}

impl RecipeRelation {
    fn label(self) -> &'static str {
        match self {
            RecipeRelation::Favorite => "favorites",
            RecipeRelation::ShoppingCart => "shopping cart",
        }
    }
}

impl Handler<AddToRelation> for DbExecutor {
    type Result = AppResult<ShortRecipeResponse>;

    fn handle(&mut self, msg: AddToRelation, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        add_relation(&mut conn, msg.relation, msg.auth.user_id(), msg.recipe_id)
    }
}

impl Handler<RemoveFromRelation> for DbExecutor {
    type Result = AppResult<()>;

    fn handle(&mut self, msg: RemoveFromRelation, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        remove_relation(&mut conn, msg.relation, msg.auth.user_id(), msg.recipe_id)
    }
}

/// Adds the recipe to the user's set. The insert itself decides whether the
/// pair already exists, so two racing adds cannot both succeed.
pub fn add_relation(
    conn: &mut PgConnection,
    relation: RecipeRelation,
    user_id: UserId,
    recipe_id: i32,
) -> AppResult<ShortRecipeResponse> {
    let recipe = find_recipe(conn, recipe_id)?;

    let inserted = match relation {
        RecipeRelation::Favorite => diesel::insert_into(favorite_recipes::table)
            .values(NewFavoriteRecipe { user_id, recipe_id })
            .on_conflict_do_nothing()
            .execute(conn)?,
        RecipeRelation::ShoppingCart => diesel::insert_into(shopping_carts::table)
            .values(NewShoppingCartEntry { user_id, recipe_id })
            .on_conflict_do_nothing()
            .execute(conn)?,
    };

    if inserted == 0 {
        return Err(AppError::conflict(format!(
            "Recipe is already in {}",
            relation.label()
        )));
    }

    debug!(?relation, user_id, recipe_id, "relation added");
    Ok(recipe.into())
}

pub fn remove_relation(
    conn: &mut PgConnection,
    relation: RecipeRelation,
    user_id: UserId,
    recipe_id: i32,
) -> AppResult<()> {
    let deleted = match relation {
        RecipeRelation::Favorite => diesel::delete(
            favorite_recipes::table
                .filter(favorite_recipes::user_id.eq(user_id))
                .filter(favorite_recipes::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
        RecipeRelation::ShoppingCart => diesel::delete(
            shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .filter(shopping_carts::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
    };

    if deleted == 0 {
        return Err(AppError::not_found(format!(
            "Recipe is not in {}",
            relation.label()
        )));
    }

    debug!(?relation, user_id, recipe_id, "relation removed");
    Ok(())
}
