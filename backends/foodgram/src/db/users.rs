use actix::prelude::*;
use diesel::prelude::*;

use crate::api::users::{GetUser, UserResponse};
use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, User, UserId};
use crate::schema::{follows, users};

impl Handler<GetUser> for DbExecutor {
    type Result = AppResult<UserResponse>;

    fn handle(&mut self, msg: GetUser, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        let viewer = msg.auth.as_ref().map(|auth| auth.user_id());

        get_user(&mut conn, msg.user_id, viewer)
    }
}

pub fn get_user(
    conn: &mut PgConnection,
    user_id: UserId,
    viewer: Option<UserId>,
) -> AppResult<UserResponse> {
    let user = find_user(conn, user_id)?;
    let is_subscribed = match viewer {
        Some(viewer) => is_following(conn, viewer, user.id)?,
        None => false,
    };

    Ok(UserResponse::new(user, is_subscribed))
}

pub(crate) fn find_user(conn: &mut PgConnection, user_id: UserId) -> AppResult<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub(crate) fn is_following(
    conn: &mut PgConnection,
    follower_id: UserId,
    author_id: UserId,
) -> AppResult<bool> {
    diesel::select(diesel::dsl::exists(
        follows::table
            .filter(follows::user_id.eq(follower_id))
            .filter(follows::author_id.eq(author_id)),
    ))
    .get_result::<bool>(conn)
    .map_err(Into::into)
}

/// Mirrors an identity issued by the external provider into `users`.
pub fn register_user(conn: &mut PgConnection, new_user: &NewUser) -> AppResult<User> {
    diesel::insert_into(users::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result::<User>(conn)
        .map_err(Into::into)
}
