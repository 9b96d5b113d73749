mod common;

use common::{database_test, draft, ingredient, line, tag, user};
use diesel::prelude::*;
use foodgram::api::recipes::RecipeFilter;
use foodgram::db::{self, RecipeChanges, RecipeRelation};
use foodgram::error::AppError;
use foodgram::pagination::{Page, PageParams};
use foodgram::schema::{favorite_recipes, recipe_ingredients, recipes};
use pretty_assertions::assert_eq;

fn first_page() -> Page {
    Page::new(PageParams::default(), 6)
}

#[test]
fn update_replaces_every_ingredient_line() {
    database_test(|conn| {
        let author = user(conn)?;
        let breakfast = tag(conn)?;
        let dinner = tag(conn)?;
        let flour = ingredient(conn, "flour", "g")?;
        let sugar = ingredient(conn, "sugar", "g")?;

        let created = db::create_recipe(
            conn,
            author.id,
            &draft("Pancakes", &[&breakfast], vec![line(&flour, 2), line(&sugar, 3)]),
        )?;
        assert_eq!(created.ingredients.len(), 2);
        assert_eq!(created.author.id, author.id);
        assert!(!created.is_favorited);

        let updated = db::update_recipe(
            conn,
            created.id,
            author.id,
            &RecipeChanges {
                name: None,
                text: None,
                image: None,
                cooking_time: Some(45),
                tags: vec![dinner.id],
                ingredients: vec![line(&flour, 5)],
            },
        )?;

        let lines: Vec<(i32, i32)> = updated
            .ingredients
            .iter()
            .map(|line| (line.id, line.amount))
            .collect();
        assert_eq!(lines, vec![(flour.id, 5)]);
        assert_eq!(updated.tags, vec![dinner]);
        assert_eq!(updated.cooking_time, 45);
        assert_eq!(updated.name, "Pancakes");

        let stored = recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(created.id))
            .count()
            .get_result::<i64>(conn)?;
        assert_eq!(stored, 1);

        Ok(())
    })
}

#[test]
fn same_author_cannot_reuse_a_name() {
    database_test(|conn| {
        let author = user(conn)?;
        let other = user(conn)?;
        let lunch = tag(conn)?;
        let rice = ingredient(conn, "rice", "g")?;

        db::create_recipe(conn, author.id, &draft("Pilaf", &[&lunch], vec![line(&rice, 300)]))?;

        // a different author may use the same name
        db::create_recipe(conn, other.id, &draft("Pilaf", &[&lunch], vec![line(&rice, 200)]))?;

        let err = db::create_recipe(
            conn,
            author.id,
            &draft("Pilaf", &[&lunch], vec![line(&rice, 100)]),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");

        Ok(())
    })
}

#[test]
fn failed_update_keeps_the_previous_lines() {
    database_test(|conn| {
        let author = user(conn)?;
        let lunch = tag(conn)?;
        let flour = ingredient(conn, "flour", "g")?;
        let sugar = ingredient(conn, "sugar", "g")?;

        db::create_recipe(conn, author.id, &draft("Crepes", &[&lunch], vec![line(&flour, 1)]))?;
        let waffles = db::create_recipe(
            conn,
            author.id,
            &draft("Waffles", &[&lunch], vec![line(&flour, 2), line(&sugar, 3)]),
        )?;

        // the rename collides only after the old lines were replaced
        let err = db::update_recipe(
            conn,
            waffles.id,
            author.id,
            &RecipeChanges {
                name: Some("Crepes".into()),
                text: None,
                image: None,
                cooking_time: None,
                tags: vec![lunch.id],
                ingredients: vec![line(&sugar, 9)],
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");

        let kept = db::get_recipe(conn, waffles.id, None)?;
        let lines: Vec<(&str, i32)> = kept
            .ingredients
            .iter()
            .map(|line| (line.name.as_str(), line.amount))
            .collect();
        assert_eq!(lines, vec![("flour", 2), ("sugar", 3)]);
        assert_eq!(kept.name, "Waffles");

        Ok(())
    })
}

#[test]
fn unknown_ingredient_leaves_nothing_behind() {
    database_test(|conn| {
        let author = user(conn)?;
        let lunch = tag(conn)?;
        let rice = ingredient(conn, "rice", "g")?;
        let mut missing = rice.clone();
        missing.id = rice.id + 10_000;

        let err = db::create_recipe(
            conn,
            author.id,
            &draft("Pilaf", &[&lunch], vec![line(&rice, 1), line(&missing, 1)]),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");

        let count = recipes::table
            .filter(recipes::author_id.eq(author.id))
            .count()
            .get_result::<i64>(conn)?;
        assert_eq!(count, 0);

        Ok(())
    })
}

#[test]
fn only_the_author_may_edit_or_delete() {
    database_test(|conn| {
        let author = user(conn)?;
        let stranger = user(conn)?;
        let lunch = tag(conn)?;
        let rice = ingredient(conn, "rice", "g")?;

        let recipe =
            db::create_recipe(conn, author.id, &draft("Pilaf", &[&lunch], vec![line(&rice, 3)]))?;

        let changes = RecipeChanges {
            name: Some("Stolen".into()),
            text: None,
            image: None,
            cooking_time: None,
            tags: vec![lunch.id],
            ingredients: vec![line(&rice, 1)],
        };
        assert!(matches!(
            db::update_recipe(conn, recipe.id, stranger.id, &changes),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            db::delete_recipe(conn, recipe.id, stranger.id),
            Err(AppError::Forbidden(_))
        ));

        let unchanged = db::get_recipe(conn, recipe.id, None)?;
        assert_eq!(unchanged.name, "Pilaf");
        assert_eq!(unchanged.ingredients[0].amount, 3);

        Ok(())
    })
}

#[test]
fn deleting_a_recipe_removes_its_relations() {
    database_test(|conn| {
        let author = user(conn)?;
        let fan = user(conn)?;
        let lunch = tag(conn)?;
        let rice = ingredient(conn, "rice", "g")?;

        let recipe =
            db::create_recipe(conn, author.id, &draft("Pilaf", &[&lunch], vec![line(&rice, 3)]))?;
        db::add_relation(conn, RecipeRelation::Favorite, fan.id, recipe.id)?;
        db::add_relation(conn, RecipeRelation::ShoppingCart, fan.id, recipe.id)?;

        db::delete_recipe(conn, recipe.id, author.id)?;

        let favorites = favorite_recipes::table
            .filter(favorite_recipes::recipe_id.eq(recipe.id))
            .count()
            .get_result::<i64>(conn)?;
        assert_eq!(favorites, 0);
        assert!(db::build_shopping_list(conn, fan.id)?.is_empty());
        assert!(matches!(
            db::get_recipe(conn, recipe.id, None),
            Err(AppError::NotFound(_))
        ));

        Ok(())
    })
}

#[test]
fn listing_applies_every_filter() {
    database_test(|conn| {
        let alice = user(conn)?;
        let bob = user(conn)?;
        let breakfast = tag(conn)?;
        let dinner = tag(conn)?;
        let egg = ingredient(conn, "egg", "pcs")?;

        let omelette =
            db::create_recipe(conn, alice.id, &draft("Omelette", &[&breakfast], vec![line(&egg, 2)]))?;
        let frittata =
            db::create_recipe(conn, alice.id, &draft("Frittata", &[&dinner], vec![line(&egg, 4)]))?;
        let shakshuka = db::create_recipe(
            conn,
            bob.id,
            &draft("Shakshuka", &[&breakfast, &dinner], vec![line(&egg, 3)]),
        )?;
        db::add_relation(conn, RecipeRelation::Favorite, bob.id, omelette.id)?;

        let ids = |list: foodgram::api::recipes::RecipeListResponse| {
            list.results.iter().map(|recipe| recipe.id).collect::<Vec<_>>()
        };

        let by_alice = RecipeFilter {
            author: Some(alice.id),
            ..Default::default()
        };
        assert_eq!(
            ids(db::list_recipes(conn, &by_alice, None, first_page())?),
            vec![frittata.id, omelette.id]
        );

        let breakfasts = RecipeFilter {
            tags: vec![breakfast.slug.clone()],
            ..Default::default()
        };
        assert_eq!(
            ids(db::list_recipes(conn, &breakfasts, None, first_page())?),
            vec![shakshuka.id, omelette.id]
        );

        let favorites = RecipeFilter {
            is_favorited: true,
            ..Default::default()
        };
        let listed = db::list_recipes(conn, &favorites, Some(bob.id), first_page())?;
        assert_eq!(listed.count, 1);
        assert!(listed.results[0].is_favorited);
        assert_eq!(listed.results[0].id, omelette.id);

        // anonymous viewers have no favorites
        assert_eq!(db::list_recipes(conn, &favorites, None, first_page())?.count, 0);

        db::add_relation(conn, RecipeRelation::ShoppingCart, bob.id, frittata.id)?;
        let in_cart = RecipeFilter {
            is_in_shopping_cart: true,
            ..Default::default()
        };
        let listed = db::list_recipes(conn, &in_cart, Some(bob.id), first_page())?;
        assert_eq!(ids(listed), vec![frittata.id]);
        assert_eq!(db::list_recipes(conn, &in_cart, Some(alice.id), first_page())?.count, 0);

        let favorite_and_in_cart = RecipeFilter {
            is_favorited: true,
            is_in_shopping_cart: true,
            ..Default::default()
        };
        assert_eq!(
            db::list_recipes(conn, &favorite_and_in_cart, Some(bob.id), first_page())?.count,
            0
        );

        let combined = RecipeFilter {
            author: Some(bob.id),
            tags: vec![dinner.slug.clone()],
            ..Default::default()
        };
        assert_eq!(
            ids(db::list_recipes(conn, &combined, None, first_page())?),
            vec![shakshuka.id]
        );

        Ok(())
    })
}

#[test]
fn listing_is_paginated() {
    database_test(|conn| {
        let author = user(conn)?;
        let lunch = tag(conn)?;
        let rice = ingredient(conn, "rice", "g")?;

        for n in 0..5 {
            db::create_recipe(
                conn,
                author.id,
                &draft(&format!("Rice bowl {n}"), &[&lunch], vec![line(&rice, 100)]),
            )?;
        }

        let filter = RecipeFilter {
            author: Some(author.id),
            ..Default::default()
        };
        let page = Page::new(
            PageParams {
                page: Some(2),
                limit: Some(2),
            },
            6,
        );

        let listed = db::list_recipes(conn, &filter, None, page)?;
        assert_eq!(listed.count, 5);
        let names: Vec<&str> = listed.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Rice bowl 2", "Rice bowl 1"]);

        Ok(())
    })
}
