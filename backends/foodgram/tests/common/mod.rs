#![allow(dead_code)]

use std::env;
use std::sync::Once;

use diesel::prelude::*;
use uuid::Uuid;

use foodgram::api::recipes::IngredientAmount;
use foodgram::db::{self, RecipeDraft};
use foodgram::error::AppError;
use foodgram::models::ingredient::Ingredient;
use foodgram::models::tag::{NewTag, Tag};
use foodgram::models::user::{NewUser, User};
use foodgram::schema::{ingredients, tags};

static MIGRATIONS: Once = Once::new();

/// Runs `func` inside a transaction that is always rolled back.
/// Skipped when `DATABASE_URL` is not set.
pub fn database_test<F>(func: F)
where
    F: FnOnce(&mut PgConnection) -> Result<(), AppError>,
{
    let Ok(db_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping database test");
        return;
    };

    let mut conn = PgConnection::establish(&db_url).expect("Failed to connect to database");
    MIGRATIONS.call_once(|| db::run_migrations(&mut conn).expect("Failed to run migrations"));

    conn.test_transaction::<_, AppError, _>(func);
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub fn user(conn: &mut PgConnection) -> Result<User, AppError> {
    let username = unique("cook");
    db::register_user(
        conn,
        &NewUser {
            email: format!("{username}@example.com"),
            username,
            first_name: "Test".into(),
            last_name: "Cook".into(),
        },
    )
}

pub fn tag(conn: &mut PgConnection) -> Result<Tag, AppError> {
    let name = unique("tag");
    let bytes = *Uuid::new_v4().as_bytes();

    diesel::insert_into(tags::table)
        .values(NewTag {
            slug: name.clone(),
            name,
            color: format!("#{:02X}{:02X}{:02X}", bytes[0], bytes[1], bytes[2]),
        })
        .returning(Tag::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn ingredient(conn: &mut PgConnection, name: &str, unit: &str) -> Result<Ingredient, AppError> {
    diesel::insert_into(ingredients::table)
        .values((
            ingredients::name.eq(name),
            ingredients::measurement_unit.eq(unit),
        ))
        .returning(Ingredient::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn line(ingredient: &Ingredient, amount: i32) -> IngredientAmount {
    IngredientAmount {
        id: ingredient.id,
        amount,
    }
}

pub fn draft(name: &str, tags: &[&Tag], lines: Vec<IngredientAmount>) -> RecipeDraft {
    RecipeDraft {
        name: name.into(),
        text: "Mix everything and bake".into(),
        image: "recipes/test.png".into(),
        cooking_time: 30,
        tags: tags.iter().map(|tag| tag.id).collect(),
        ingredients: lines,
    }
}
