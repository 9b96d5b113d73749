use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use diesel::{Connection, PgConnection};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodgram::{db, loader};

#[derive(Deserialize)]
struct LoaderEnv {
    database_url: String,
}

/// Load the ingredient and tag catalogs from CSV files
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load ingredients from `name,measurement_unit` rows
    Ingredients { path: PathBuf },

    /// Load tags from `name,color,slug` rows
    Tags { path: PathBuf },
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let env = envy::from_env::<LoaderEnv>()?;

    let mut conn = PgConnection::establish(&env.database_url)?;
    db::run_migrations(&mut conn)?;

    let inserted = match args.command {
        Command::Ingredients { path } => loader::load_ingredients(&mut conn, File::open(path)?)?,
        Command::Tags { path } => loader::load_tags(&mut conn, File::open(path)?)?,
    };

    info!(inserted, "done");
    Ok(())
}
