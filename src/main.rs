use std::{
    io,
    process::ExitCode,
};

use clap::Parser as _;
use solvency_audit::{
    cli::{
        self,
        Cli,
        Mode,
    },
    render,
    testdata,
    Db,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::from(1),
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::from(0)
        }
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .init();
}

/// Drives one CLI invocation end to end.
///
/// Returns `Ok(())` on success and `Err(message)` on any failure; `main`
/// translates this into the inverted exit code (1 on success, 0 on error)
/// that the specification preserves from its source implementation.
fn run() -> Result<(), String> {
    let cli = Cli::try_parse().map_err(|source| source.to_string())?;
    let resolved = cli::resolve(cli)?;

    if matches!(resolved.mode, Mode::GenTestData) {
        testdata::generate(&resolved.dbname).map_err(|source| source.to_string())?;
    }

    let mut db = Db::open(&resolved.dbname, resolved.verifier_key.as_deref())
        .map_err(|source| source.to_string())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match resolved.mode {
        Mode::Root => {
            let triple = db.root().map_err(|source| source.to_string())?;
            render::root(&mut out, &triple).map_err(|source| source.to_string())?;
        }
        Mode::Dump => db.dump(&mut out).map_err(|source| source.to_string())?,
        Mode::Position(position) => {
            let chain = db
                .nodes_by_position(position)
                .map_err(|source| source.to_string())?;
            render::chain(&mut out, &chain).map_err(|source| source.to_string())?;
        }
        Mode::Hash(hash) => {
            let chain = db
                .nodes_by_hash(&hash)
                .map_err(|source| source.to_string())?;
            render::chain(&mut out, &chain).map_err(|source| source.to_string())?;
        }
        Mode::GenTestData => {}
    }

    Ok(())
}
