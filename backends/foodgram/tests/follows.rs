mod common;

use common::{database_test, draft, ingredient, line, tag, user};
use foodgram::db;
use foodgram::error::AppError;
use foodgram::pagination::{Page, PageParams};
use pretty_assertions::assert_eq;

#[test]
fn self_follow_is_rejected() {
    database_test(|conn| {
        let cook = user(conn)?;

        assert!(matches!(
            db::follow(conn, cook.id, cook.id, None),
            Err(AppError::Validation(_))
        ));

        Ok(())
    })
}

#[test]
fn follow_twice_conflicts_and_unfollow_reverts() {
    database_test(|conn| {
        let author = user(conn)?;
        let reader = user(conn)?;

        let followed = db::follow(conn, reader.id, author.id, None)?;
        assert_eq!(followed.author.id, author.id);
        assert!(followed.author.is_subscribed);
        assert!(db::get_user(conn, author.id, Some(reader.id))?.is_subscribed);

        assert!(matches!(
            db::follow(conn, reader.id, author.id, None),
            Err(AppError::Conflict(_))
        ));

        db::unfollow(conn, reader.id, author.id)?;
        assert!(!db::get_user(conn, author.id, Some(reader.id))?.is_subscribed);
        assert!(matches!(
            db::unfollow(conn, reader.id, author.id),
            Err(AppError::NotFound(_))
        ));

        Ok(())
    })
}

#[test]
fn following_a_missing_user_is_not_found() {
    database_test(|conn| {
        let reader = user(conn)?;

        assert!(matches!(
            db::follow(conn, reader.id, i32::MAX, None),
            Err(AppError::NotFound(_))
        ));

        Ok(())
    })
}

#[test]
fn subscriptions_embed_author_recipes() {
    database_test(|conn| {
        let author = user(conn)?;
        let quiet = user(conn)?;
        let reader = user(conn)?;
        let lunch = tag(conn)?;
        let rice = ingredient(conn, "rice", "g")?;

        for name in ["Pilaf", "Risotto", "Paella"] {
            db::create_recipe(conn, author.id, &draft(name, &[&lunch], vec![line(&rice, 100)]))?;
        }

        let followed = db::follow(conn, reader.id, author.id, None)?;
        assert_eq!(followed.recipes.len(), 3);
        assert_eq!(followed.recipes_count, 3);

        db::follow(conn, reader.id, quiet.id, None)?;

        let page = Page::new(PageParams::default(), 6);
        let listed = db::list_following(conn, reader.id, page, Some(2))?;
        assert_eq!(listed.count, 2);

        let authors: Vec<i32> = listed.results.iter().map(|s| s.author.id).collect();
        assert_eq!(authors, vec![quiet.id, author.id]);

        let busy = &listed.results[1];
        assert_eq!(busy.recipes_count, 3);
        let names: Vec<&str> = busy.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Paella", "Risotto"]);

        assert!(listed.results[0].recipes.is_empty());

        Ok(())
    })
}
