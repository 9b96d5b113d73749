pub mod auth;
pub use auth::*;

pub mod follows;
pub use follows::*;

pub mod ingredients;
pub use ingredients::*;

pub mod recipes;
pub use recipes::*;

pub mod relations;
pub use relations::*;

pub mod shopping_list;
pub use shopping_list::*;

pub mod tags;
pub use tags::*;

mod users;
pub use users::*;

use actix::prelude::{Actor, SyncContext};
use diesel::{
    r2d2::{ConnectionManager, Pool},
    Connection, PgConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::config::Configuration;
use crate::utils::MediaStore;

pub type Conn = PgConnection;
pub type PgPool = Pool<ConnectionManager<Conn>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Owns the connection pool; every storage message runs on one of its
/// synchronous worker threads.
pub struct DbExecutor {
    pub pool: PgPool,
    pub media: MediaStore,
    /// Page size used when a listing request carries no `limit`
    pub page_size: i64,
}

impl DbExecutor {
    pub fn new(pool: PgPool, media: MediaStore, page_size: i64) -> Self {
        Self {
            pool,
            media,
            page_size,
        }
    }
}

impl Actor for DbExecutor {
    type Context = SyncContext<Self>;
}

/// Run any pending migrations, then build the pool
pub fn connect(config: &Configuration) -> Result<PgPool, BoxError> {
    let mut migration_conn = Conn::establish(&config.database_url)?;
    run_migrations(&mut migration_conn)?;

    let manager = ConnectionManager::<Conn>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.database_max_connections)
        .build(manager)?;

    Ok(pool)
}

pub fn run_migrations(conn: &mut Conn) -> Result<(), BoxError> {
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for migration in applied {
        info!(%migration, "applied migration");
    }

    Ok(())
}
