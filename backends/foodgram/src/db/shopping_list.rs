use actix::prelude::*;
use diesel::prelude::*;

use crate::api::recipes::DownloadShoppingList;
use crate::db::DbExecutor;
use crate::error::AppResult;
use crate::models::user::UserId;
use crate::schema::{ingredients, recipe_ingredients, shopping_carts};
use crate::shopping_list::ShoppingList;

impl Handler<DownloadShoppingList> for DbExecutor {
    type Result = AppResult<ShoppingList>;

    fn handle(&mut self, msg: DownloadShoppingList, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        build_shopping_list(&mut conn, msg.auth.user_id())
    }
}

/// Sums every ingredient line of every recipe in the user's cart.
pub fn build_shopping_list(conn: &mut PgConnection, user_id: UserId) -> AppResult<ShoppingList> {
    let rows = shopping_carts::table
        .inner_join(
            recipe_ingredients::table
                .on(recipe_ingredients::recipe_id.eq(shopping_carts::recipe_id)),
        )
        .inner_join(
            ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)),
        )
        .filter(shopping_carts::user_id.eq(user_id))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load::<(String, String, i32)>(conn)?;

    let list = ShoppingList::aggregate(rows);
    info!(user_id, lines = list.lines.len(), "shopping list built");

    Ok(list)
}
