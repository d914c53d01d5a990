pub mod catalog;
pub mod config;
pub mod encounter;
pub mod engine;
mod error;
pub mod rules;
pub mod selection;
pub mod session;
pub mod shell;
pub mod summary;

use std::io;

use anyhow::Result;

pub use catalog::{Catalog, Category, EquipmentItem};
pub use config::ConfigPaths;
pub use encounter::{DependencyStatus, EncounterContext, PatientWeight};
pub use engine::{Advisory, CategoryPlan, Engine};
pub use error::{EquipmentError, EquipmentResult};
pub use session::{Session, WeightProposal};
pub use summary::OrderSummary;

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let engine = Engine::load(&ConfigPaths::resolve())?;

    let stdin = io::stdin();
    match shell::run_shell(&engine, stdin.lock(), io::stdout())? {
        Some(summary) => tracing::info!("Order completed with {} item(s)", summary.lines.len()),
        None => tracing::info!("Walkthrough ended without an order"),
    }
    Ok(())
}
