use actix::prelude::*;
use diesel::prelude::*;

use crate::api::tags::{GetTag, GetTags};
use crate::db::DbExecutor;
use crate::error::{AppError, AppResult};
use crate::models::tag::{NewTag, Tag};
use crate::schema::tags;

impl Handler<GetTags> for DbExecutor {
    type Result = AppResult<Vec<Tag>>;

    fn handle(&mut self, _: GetTags, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        list_tags(&mut conn)
    }
}

impl Handler<GetTag> for DbExecutor {
    type Result = AppResult<Tag>;

    fn handle(&mut self, msg: GetTag, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        get_tag(&mut conn, msg.tag_id)
    }
}

pub fn list_tags(conn: &mut PgConnection) -> AppResult<Vec<Tag>> {
    tags::table
        .order(tags::id)
        .select(Tag::as_select())
        .load::<Tag>(conn)
        .map_err(Into::into)
}

pub fn get_tag(conn: &mut PgConnection, tag_id: i32) -> AppResult<Tag> {
    tags::table
        .find(tag_id)
        .select(Tag::as_select())
        .first::<Tag>(conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Tag not found"))
}

/// Inserts tags, skipping any whose name, colour or slug is already taken.
/// Returns the number of rows written.
pub fn import_tags(conn: &mut PgConnection, new_tags: &[NewTag]) -> AppResult<usize> {
    conn.transaction::<_, AppError, _>(|conn| {
        let mut inserted = 0;
        for tag in new_tags {
            inserted += diesel::insert_into(tags::table)
                .values(tag)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(inserted)
    })
}
