use std::collections::HashSet;

use actix::prelude::*;
use diesel::prelude::*;
use diesel::sql_query;

use crate::api::ingredients::{GetIngredient, SearchIngredients};
use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::ingredient::{Ingredient, NewIngredient};
use crate::schema::ingredients;

impl Handler<SearchIngredients> for DbExecutor {
    type Result = AppResult<Vec<Ingredient>>;

    fn handle(&mut self, msg: SearchIngredients, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        search_ingredients(&mut conn, msg.prefix.as_deref())
    }
}

impl Handler<GetIngredient> for DbExecutor {
    type Result = AppResult<Ingredient>;

    fn handle(&mut self, msg: GetIngredient, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        get_ingredient(&mut conn, msg.ingredient_id)
    }
}

/// Case-insensitive prefix search ordered by name. No prefix lists the whole catalog.
pub fn search_ingredients(
    conn: &mut PgConnection,
    prefix: Option<&str>,
) -> AppResult<Vec<Ingredient>> {
    let mut query = ingredients::table
        .select(Ingredient::as_select())
        .order((ingredients::name, ingredients::id))
        .into_boxed();

    if let Some(prefix) = prefix {
        query = query.filter(ingredients::name.ilike(format!("{}%", escape_like(prefix))));
    }

    query.load::<Ingredient>(conn).map_err(Into::into)
}

pub fn get_ingredient(conn: &mut PgConnection, ingredient_id: i32) -> AppResult<Ingredient> {
    ingredients::table
        .find(ingredient_id)
        .select(Ingredient::as_select())
        .first::<Ingredient>(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Ingredient not found"))
}

/// Loads catalog entries in one transaction. Rows whose `(name, unit)` pair
/// is already present are skipped. Returns the number of rows written.
pub fn import_ingredients(
    conn: &mut PgConnection,
    new_ingredients: &[NewIngredient],
) -> AppResult<usize> {
    conn.transaction::<_, AppError, _>(|conn| {
        let mut known: HashSet<(String, String)> = ingredients::table
            .select((ingredients::name, ingredients::measurement_unit))
            .load::<(String, String)>(conn)?
            .into_iter()
            .collect();

        let fresh: Vec<&NewIngredient> = new_ingredients
            .iter()
            .filter(|row| known.insert((row.name.clone(), row.measurement_unit.clone())))
            .collect();

        let mut inserted = 0;
        for row in &fresh {
            inserted += diesel::insert_into(ingredients::table)
                .values(*row)
                .on_conflict(ingredients::id)
                .do_nothing()
                .execute(conn)?;
        }

        // explicit ids bypass the sequence
        if fresh.iter().any(|row| row.id.is_some()) {
            sql_query(
                "SELECT setval(pg_get_serial_sequence('ingredients', 'id'), \
                 COALESCE(MAX(id), 1)) FROM ingredients",
            )
            .execute(conn)?;
        }

        Ok(inserted)
    })
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
