pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod tag;
pub mod user;
