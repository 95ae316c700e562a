//! Vocabulary Seeding Binary
//!
//! Loads a JSON seed document into a fresh in-memory registry and prints the
//! resulting tree with codes, positions and flags. Useful for checking a
//! seed file before shipping it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin selections-seed -- vocabularies.json
//!
//! # Or through the environment
//! SELECTIONS_SEED=vocabularies.json cargo run --bin selections-seed
//! ```
//!
//! # Environment Variables
//!
//! - `SELECTIONS_SEED`: Seed file path when no argument is given
//! - `SELECTIONS_CONFIG`: Optional registry config (JSON)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use selections_core::services::{load_seed_file, seed_vocabulary};
use selections_core::{InMemoryStore, Node, Registry, RegistryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let seed_path: PathBuf = env::args()
        .nth(1)
        .or_else(|| env::var("SELECTIONS_SEED").ok())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("Usage: selections-seed <seed.json>"))?;

    let config = match env::var("SELECTIONS_CONFIG") {
        Ok(path) => {
            let text = tokio::fs::read_to_string(&path).await?;
            RegistryConfig::from_json_str(&text).map_err(|e| anyhow::anyhow!(e))?
        }
        Err(_) => RegistryConfig::default(),
    };

    tracing::info!("Seeding from {}", seed_path.display());

    let registry = Registry::with_config(Arc::new(InMemoryStore::new()), config);
    let seeds = load_seed_file(&seed_path).await?;
    let report = seed_vocabulary(&registry, &seeds).await?;

    let mut pending: Vec<(usize, Node)> = registry
        .roots()
        .await?
        .into_iter()
        .rev()
        .map(|node| (0, node))
        .collect();

    while let Some((depth, node)) = pending.pop() {
        println!("{}{}", "  ".repeat(depth), describe(&node));
        for child in registry.children(node.id).await?.into_iter().rev() {
            pending.push((depth + 1, child));
        }
    }

    println!(
        "\n{} created, {} reused",
        report.created, report.reused
    );
    Ok(())
}

fn describe(node: &Node) -> String {
    let mut line = format!("{} [{}]", node.name, node.system_code);
    if let Some(position) = node.position() {
        line.push_str(&format!(" #{}", position));
    }
    if node.is_default {
        line.push_str(" (default)");
    }
    if node.is_archived() {
        line.push_str(" (archived)");
    }
    line
}
