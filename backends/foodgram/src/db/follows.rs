use std::collections::HashMap;

use actix::prelude::*;
use diesel::prelude::*;

use crate::api::recipes::ShortRecipeResponse;
use crate::api::users::{
    FollowAuthor, GetSubscriptions, SubscriptionListResponse, SubscriptionResponse,
    UnfollowAuthor, UserResponse,
};
use crate::db::users::find_user;
use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::follow::NewFollow;
use crate::models::recipe::Recipe;
use crate::models::user::{User, UserId};
use crate::pagination::{Page, Paginated};
use crate::schema::{follows, recipes, users};

impl Handler<FollowAuthor> for DbExecutor {
    type Result = AppResult<SubscriptionResponse>;

    fn handle(&mut self, msg: FollowAuthor, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        follow(&mut conn, msg.auth.user_id(), msg.author_id, msg.recipes_limit)
    }
}

impl Handler<UnfollowAuthor> for DbExecutor {
    type Result = AppResult<()>;

    fn handle(&mut self, msg: UnfollowAuthor, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        unfollow(&mut conn, msg.auth.user_id(), msg.author_id)
    }
}

impl Handler<GetSubscriptions> for DbExecutor {
    type Result = AppResult<SubscriptionListResponse>;

    fn handle(&mut self, msg: GetSubscriptions, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let page = Page::new(msg.page, self.page_size);

        list_following(&mut conn, msg.auth.user_id(), page, msg.recipes_limit)
    }
}

/// Subscribes `follower_id` to `author_id`. Self-follow is rejected before
/// touching storage; an existing pair is reported by the insert itself.
pub fn follow(
    conn: &mut PgConnection,
    follower_id: UserId,
    author_id: UserId,
    recipes_limit: Option<i64>,
) -> AppResult<SubscriptionResponse> {
    if follower_id == author_id {
        return Err(AppError::validation(
            "author",
            "You can't subscribe to yourself",
        ));
    }

    let author = find_user(conn, author_id)?;

    let inserted = diesel::insert_into(follows::table)
        .values(NewFollow {
            user_id: follower_id,
            author_id,
        })
        .on_conflict_do_nothing()
        .execute(conn)?;

    if inserted == 0 {
        return Err(AppError::conflict("You are already subscribed to this author"));
    }

    info!(follower_id, author_id, "author followed");

    subscription_responses(conn, vec![author], recipes_limit)?
        .pop()
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub fn unfollow(conn: &mut PgConnection, follower_id: UserId, author_id: UserId) -> AppResult<()> {
    let deleted = diesel::delete(
        follows::table
            .filter(follows::user_id.eq(follower_id))
            .filter(follows::author_id.eq(author_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(AppError::not_found("You are not subscribed to this author"));
    }

    info!(follower_id, author_id, "author unfollowed");
    Ok(())
}

/// Authors followed by `follower_id`, most recent subscription first.
pub fn list_following(
    conn: &mut PgConnection,
    follower_id: UserId,
    page: Page,
    recipes_limit: Option<i64>,
) -> AppResult<SubscriptionListResponse> {
    let count = follows::table
        .filter(follows::user_id.eq(follower_id))
        .count()
        .get_result::<i64>(conn)?;

    let authors = follows::table
        .inner_join(users::table.on(users::id.eq(follows::author_id)))
        .filter(follows::user_id.eq(follower_id))
        .order((follows::created_at.desc(), follows::author_id.desc()))
        .limit(page.size)
        .offset(page.offset())
        .select(User::as_select())
        .load::<User>(conn)?;

    Ok(Paginated {
        count,
        results: subscription_responses(conn, authors, recipes_limit)?,
    })
}

/// Every author passed in is followed by the viewer, so `is_subscribed` is set.
fn subscription_responses(
    conn: &mut PgConnection,
    authors: Vec<User>,
    recipes_limit: Option<i64>,
) -> AppResult<Vec<SubscriptionResponse>> {
    let author_ids: Vec<UserId> = authors.iter().map(|author| author.id).collect();

    let mut recipes_by_author: HashMap<UserId, Vec<Recipe>> = HashMap::new();
    for recipe in recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .order((recipes::created_at.desc(), recipes::id.desc()))
        .load::<Recipe>(conn)?
    {
        recipes_by_author
            .entry(recipe.author_id)
            .or_default()
            .push(recipe);
    }

    let limit = recipes_limit.map(|limit| usize::try_from(limit.max(0)).unwrap_or(usize::MAX));

    Ok(authors
        .into_iter()
        .map(|author| {
            let mut recipes = recipes_by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as i64;
            if let Some(limit) = limit {
                recipes.truncate(limit);
            }

            SubscriptionResponse {
                author: UserResponse::new(author, true),
                recipes: recipes.into_iter().map(ShortRecipeResponse::from).collect(),
                recipes_count,
            }
        })
        .collect())
}
