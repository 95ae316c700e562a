//! Default Invariant Property Tests
//!
//! Whatever sequence of promotions, demotions, archivals and restorations is
//! applied to a sibling set, at most one sibling is default afterwards and no
//! archived sibling is default.

use proptest::prelude::*;
use selections_core::models::{NodeId, NodeUpdate};
use selections_core::services::{CreateNodeParams, Registry};
use selections_core::InMemoryStore;
use std::sync::Arc;

const SIBLINGS: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Op {
    Promote(usize),
    Demote(usize),
    Archive(usize),
    Restore(usize),
    PromoteAndArchive(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let idx = 0..SIBLINGS;
    prop_oneof![
        idx.clone().prop_map(Op::Promote),
        idx.clone().prop_map(Op::Demote),
        idx.clone().prop_map(Op::Archive),
        idx.clone().prop_map(Op::Restore),
        idx.prop_map(Op::PromoteAndArchive),
    ]
}

/// (defaults, archived defaults) in the sibling set after each operation
async fn run(ops: Vec<Op>) -> Vec<(usize, usize)> {
    let registry = Registry::new(Arc::new(InMemoryStore::new()));
    let root = registry
        .create(CreateNodeParams::new("priority"))
        .await
        .unwrap();

    let mut ids: Vec<NodeId> = Vec::with_capacity(SIBLINGS);
    for n in 0..SIBLINGS {
        let node = registry
            .create(CreateNodeParams::new(format!("level {}", n)).under(root.id))
            .await
            .unwrap();
        ids.push(node.id);
    }

    let mut observed = Vec::with_capacity(ops.len());
    for op in ops {
        let (id, update) = match op {
            Op::Promote(i) => (ids[i], NodeUpdate::new().with_default(true)),
            Op::Demote(i) => (ids[i], NodeUpdate::new().with_default(false)),
            Op::Archive(i) => (ids[i], NodeUpdate::new().with_archived(true)),
            Op::Restore(i) => (ids[i], NodeUpdate::new().with_archived(false)),
            Op::PromoteAndArchive(i) => (
                ids[i],
                NodeUpdate::new().with_default(true).with_archived(true),
            ),
        };
        registry.update(id, update).await.unwrap();

        let children = registry.children(root.id).await.unwrap();
        let defaults = children.iter().filter(|n| n.is_default).count();
        let archived_defaults = children
            .iter()
            .filter(|n| n.is_default && n.is_archived())
            .count();
        observed.push((defaults, archived_defaults));
    }
    observed
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_at_most_one_default_per_sibling_set(ops in prop::collection::vec(arb_op(), 1..24)) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let observed = runtime.block_on(run(ops));

        for (step, (defaults, archived_defaults)) in observed.into_iter().enumerate() {
            prop_assert!(defaults <= 1, "step {}: {} defaults", step, defaults);
            prop_assert_eq!(archived_defaults, 0, "step {}: archived default", step);
        }
    }
}
