//! Property-Based Invariant Testing
//!
//! Invariants that must hold for any source model:
//! - N clusters with distinct names produce exactly N + 1 documents
//! - Every server document carries its cluster's first physical address, or -1
//! - Exactly one base config document per run
//! - Identical input yields identical output and receipt id

use dm_config_gen::generation::run_generation_phases;
use dm_config_gen::output::MemoryWriter;
use dm_config_gen::report::ValidationReport;
use dm_config_gen::source::{DiagnosticAddress, SoftwareClusterElement};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies
// =============================================================================

fn arb_address() -> impl Strategy<Value = DiagnosticAddress> {
    prop_oneof![
        (0i64..=65535).prop_map(DiagnosticAddress::physical),
        (0i64..=65535).prop_map(DiagnosticAddress::functional),
    ]
}

fn arb_clusters() -> impl Strategy<Value = Vec<SoftwareClusterElement>> {
    prop::collection::hash_set("[A-Za-z][A-Za-z0-9_]{0,12}", 0..16).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let count = names.len();
        prop::collection::vec(prop::collection::vec(arb_address(), 0..4), count).prop_map(
            move |address_lists| {
                names
                    .iter()
                    .zip(address_lists)
                    .map(|(name, addresses)| {
                        addresses
                            .into_iter()
                            .fold(SoftwareClusterElement::new(name.clone()), |element, a| {
                                element.with_address(a)
                            })
                    })
                    .collect()
            },
        )
    })
}

fn expected_target(element: &SoftwareClusterElement) -> i64 {
    element
        .diagnostic_addresses
        .iter()
        .find(|a| a.is_physical())
        .and_then(|a| a.address.network_address())
        .unwrap_or(-1)
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_document_count_is_clusters_plus_one(source in arb_clusters()) {
        let mut writer = MemoryWriter::new();
        let mut report = ValidationReport::new();

        let outcome = run_generation_phases(&source, &mut report, &mut writer);

        // names like "dm_base" would collide with the base config
        let colliding = source.iter().any(|c| c.name == "dm_base");
        let expected = source.len() + 1 - usize::from(colliding);
        prop_assert_eq!(writer.requests().len(), expected);
        prop_assert_eq!(outcome.summary.document_count, expected);

        let base_configs = writer
            .requests()
            .iter()
            .filter(|r| r.file_name == "dm_base_config.json")
            .count();
        prop_assert_eq!(base_configs, 1);

        let unique: HashSet<_> = writer.requests().iter().map(|r| &r.file_name).collect();
        prop_assert_eq!(unique.len(), writer.requests().len());
    }

    #[test]
    fn prop_target_address_matches_first_physical(source in arb_clusters()) {
        let mut writer = MemoryWriter::new();
        let mut report = ValidationReport::new();

        run_generation_phases(&source, &mut report, &mut writer);

        for element in source.iter().filter(|c| c.name != "dm_base") {
            let file_name = format!("{}_config.json", element.name);
            let expected = format!(r#"{{"TargetAddress":{}}}"#, expected_target(element));
            prop_assert_eq!(writer.content_of(&file_name), Some(expected.as_str()));
        }
    }

    #[test]
    fn prop_runs_are_deterministic(source in arb_clusters()) {
        let mut first = MemoryWriter::new();
        let mut second = MemoryWriter::new();
        let mut report = ValidationReport::new();

        let a = run_generation_phases(&source, &mut report, &mut first);
        let b = run_generation_phases(&source, &mut report, &mut second);

        prop_assert_eq!(first.requests(), second.requests());
        prop_assert_eq!(a.receipt.receipt_id, b.receipt.receipt_id);
    }
}
