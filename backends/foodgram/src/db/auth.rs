use actix::prelude::*;
use diesel::prelude::*;

use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::user::{User, UserId};
use crate::utils::auth::Auth;

// message handler implementations ↓

#[derive(Debug, Clone, Message)]
#[rtype(result = "AppResult<Auth>")]
pub struct GenerateAuth {
    pub user_id: UserId,
    pub token: String,
}

impl Handler<GenerateAuth> for DbExecutor {
    type Result = AppResult<Auth>;

    fn handle(&mut self, msg: GenerateAuth, _: &mut Self::Context) -> Self::Result {
        use crate::schema::users::dsl::*;

        let mut conn = self.pool.get()?;

        match users
            .find(msg.user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?
        {
            None => Err(AppError::Unauthorized("Invalid Token")),
            Some(user) => Ok(Auth {
                user,
                token: msg.token,
            }),
        }
    }
}
