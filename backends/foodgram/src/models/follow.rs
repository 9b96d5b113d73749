use diesel::Insertable;

use crate::models::user::UserId;
use crate::schema::follows;

#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub user_id: UserId,
    pub author_id: UserId,
}
