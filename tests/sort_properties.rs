//! Property-based tests for the type sorter.

use std::collections::HashMap;

use proptest::prelude::*;
use xmlschema_codegen::{sorted_types, ElementDecl, SchemaType};

/// Build a set of schema types from generated specs: kind 0 is simple,
/// kind 1 is complex with simple content, kind 2 is complex with
/// structured content. Dependency seeds are mapped onto structured
/// members only — onto earlier ones when `allow_forward` is false, which
/// guarantees an acyclic graph.
fn build_types(specs: &[(u8, Vec<usize>)], allow_forward: bool) -> Vec<SchemaType> {
    let structured: Vec<usize> = specs
        .iter()
        .enumerate()
        .filter(|(_, (kind, _))| *kind == 2)
        .map(|(i, _)| i)
        .collect();

    specs
        .iter()
        .enumerate()
        .map(|(i, (kind, dep_seeds))| {
            let name = format!("{{urn:t}}type{}", i);
            match kind {
                0 => SchemaType::simple(name),
                1 => SchemaType::with_simple_content(name),
                _ => {
                    let candidates: Vec<usize> = if allow_forward {
                        structured.clone()
                    } else {
                        structured.iter().copied().filter(|&j| j < i).collect()
                    };
                    let elements = dep_seeds
                        .iter()
                        .enumerate()
                        .filter(|_| !candidates.is_empty())
                        .map(|(n, seed)| {
                            let target = candidates[seed % candidates.len()];
                            ElementDecl::new(
                                format!("{{urn:t}}e{}_{}", i, n),
                                format!("{{urn:t}}type{}", target),
                            )
                        })
                        .collect();
                    SchemaType::structured(name, elements)
                }
            }
        })
        .collect()
}

fn sorted_names(types: &[SchemaType]) -> Vec<String> {
    let mut names: Vec<String> = types.iter().map(|t| t.name.clone()).collect();
    names.sort();
    names
}

fn arb_specs() -> impl Strategy<Value = Vec<(u8, Vec<usize>)>> {
    prop::collection::vec(
        (0..3u8, prop::collection::vec(0usize..100, 0..4)),
        1..24,
    )
}

proptest! {
    #[test]
    fn acyclic_sort_properties(specs in arb_specs()) {
        let types = build_types(&specs, false);
        let ordered = sorted_types(&types, false).unwrap();

        // Permutation: same multiset of names, length preserved
        prop_assert_eq!(ordered.len(), types.len());
        let mut output: Vec<String> = ordered.iter().map(|t| t.name.clone()).collect();
        output.sort();
        prop_assert_eq!(output, sorted_names(&types));

        // Bucket ordering: simple, then simple-content, then structured
        let rank = |t: &SchemaType| {
            if t.is_simple() {
                0
            } else if t.has_simple_content() {
                1
            } else {
                2
            }
        };
        let ranks: Vec<u8> = ordered.iter().map(|t| rank(t)).collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));

        // Dependency ordering: every structured dependency precedes its
        // dependent
        let position: HashMap<&str, usize> = ordered
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        for t in &types {
            if t.is_simple() || t.has_simple_content() {
                continue;
            }
            for element in t.content_elements() {
                let dep = element.type_name.as_deref().unwrap();
                let dep_type = types.iter().find(|x| x.name == dep).unwrap();
                if dep_type.is_complex() && !dep_type.has_simple_content() {
                    prop_assert!(position[dep] < position[t.name.as_str()]);
                }
            }
        }

        // Independent types keep their relative input order within the
        // structured bucket when there are no dependencies at all
        if types.iter().all(|t| t.content_elements().is_empty()) {
            let input_names: Vec<&str> = types
                .iter()
                .filter(|t| rank(t) == 2)
                .map(|t| t.name.as_str())
                .collect();
            let output_names: Vec<&str> = ordered
                .iter()
                .filter(|t| rank(t) == 2)
                .map(|t| t.name.as_str())
                .collect();
            prop_assert_eq!(input_names, output_names);
        }
    }

    #[test]
    fn tolerant_sort_is_always_a_permutation(specs in arb_specs()) {
        // Forward and self references allowed: cycles are possible, the
        // tolerant sort must still return every input exactly once
        let types = build_types(&specs, true);
        let ordered = sorted_types(&types, true).unwrap();

        prop_assert_eq!(ordered.len(), types.len());
        let mut output: Vec<String> = ordered.iter().map(|t| t.name.clone()).collect();
        output.sort();
        prop_assert_eq!(output, sorted_names(&types));
    }

    #[test]
    fn strict_sort_agrees_with_tolerant_on_success(specs in arb_specs()) {
        let types = build_types(&specs, true);
        if let Ok(strict) = sorted_types(&types, false) {
            let tolerant = sorted_types(&types, true).unwrap();
            let strict_names: Vec<&str> = strict.iter().map(|t| t.name.as_str()).collect();
            let tolerant_names: Vec<&str> = tolerant.iter().map(|t| t.name.as_str()).collect();
            prop_assert_eq!(strict_names, tolerant_names);
        }
    }
}
