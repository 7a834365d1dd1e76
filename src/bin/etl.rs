use std::{error::Error, path::PathBuf};

use clap::Parser;
use dwh_etl::{
    config::DwhConfig,
    etl::load,
    session::{self, Target},
};
use env_logger::Env;
use log::info;

#[derive(Parser, Debug)]
#[command(version, about = "Load the staging tables, then the star schema", long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "dwh.cfg")]
    config: PathBuf,

    /// Environment name, loads overrides from .env/<ENV>.env
    #[arg(short, long)]
    env: Option<String>,

    /// Run against a local DuckDB file instead of the cluster
    #[arg(long)]
    duckdb: Option<PathBuf>,

    /// Exit with status 1 if any statement failed
    #[arg(long)]
    strict: bool,
}

/// Run after `create_tables`.  Loading twice without re-creating the tables
/// duplicates the rows of the fact and dimension tables.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if let Some(env) = &args.env {
        dotenvy::from_path(PathBuf::from(format!(".env/{}.env", env)))?;
    }
    let config = DwhConfig::load(&args.config)?;
    let target = Target::from_duckdb_path(args.duckdb);

    let report = session::run(&target, &config, load);

    println!("{}", report.ascii_table());
    info!("{}", report.summary());

    let code = report.exit_code(args.strict);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
