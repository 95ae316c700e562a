//! Vocabulary Seeding
//!
//! Vocabularies are usually known at development time and seeded once per
//! environment. A seed document is a JSON array of nested [`SeedNode`]s:
//!
//! ```json
//! [
//!   { "name": "priority", "children": [
//!       { "name": "low", "position": 1 },
//!       { "name": "medium", "position": 2, "is_default": true },
//!       { "name": "high", "position": 3 }
//!   ]}
//! ]
//! ```
//!
//! Seeding is idempotent: a node whose (explicit or derived) code already
//! exists is reused, archived or not, and its subtree is seeded beneath it.

use crate::models::{Node, NodeUpdate};
use crate::services::error::RegistryError;
use crate::services::registry::{derive_system_code, CreateNodeParams, Registry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One node of a seed document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedNode {
    pub name: String,
    pub system_code: Option<String>,
    pub position: Option<i64>,
    pub is_default: bool,
    pub is_system: bool,
    pub archived: bool,
    pub children: Vec<SeedNode>,
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub created: usize,
    pub reused: usize,
}

/// Parse a seed document from JSON text
pub fn parse_seed(json: &str) -> Result<Vec<SeedNode>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and parse a seed document from disk
pub async fn load_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<SeedNode>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    let seeds = parse_seed(&text)
        .map_err(|e| anyhow::anyhow!("Invalid seed document {}: {}", path.display(), e))?;
    Ok(seeds)
}

/// Create every node of `seeds` (depth-first), reusing nodes that already exist
pub async fn seed_vocabulary(
    registry: &Registry,
    seeds: &[SeedNode],
) -> Result<SeedReport, RegistryError> {
    let mut report = SeedReport::default();

    // Explicit stack instead of recursion: async fns cannot recurse without boxing
    let mut pending: Vec<(Option<Node>, &SeedNode)> =
        seeds.iter().rev().map(|seed| (None, seed)).collect();

    while let Some((parent, seed)) = pending.pop() {
        let node = seed_one(registry, parent.as_ref(), seed, &mut report).await?;
        for child in seed.children.iter().rev() {
            pending.push((Some(node.clone()), child));
        }
    }

    tracing::info!(
        "Seeded {} vocabulary: {} created, {} reused",
        registry.config().entity_name,
        report.created,
        report.reused
    );
    Ok(report)
}

async fn seed_one(
    registry: &Registry,
    parent: Option<&Node>,
    seed: &SeedNode,
    report: &mut SeedReport,
) -> Result<Node, RegistryError> {
    let code = seed.system_code.clone().unwrap_or_else(|| {
        derive_system_code(&seed.name, parent.map(|p| p.system_code.as_str()))
    });

    if let Some(existing) = registry.find_by_code(&code).await? {
        report.reused += 1;
        return Ok(existing);
    }

    let mut params = CreateNodeParams::new(seed.name.clone()).with_code(code);
    params.parent_id = parent.map(|p| p.id);
    params.position = seed.position;
    params.is_default = seed.is_default;
    params.is_system = seed.is_system;

    let mut node = registry.create(params).await?;
    if seed.archived {
        node = registry
            .update(node.id, NodeUpdate::new().with_archived(true))
            .await?;
    }
    report.created += 1;
    Ok(node)
}
