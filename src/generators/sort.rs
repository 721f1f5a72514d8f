//! Dependency-respecting ordering of schema types
//!
//! Orders type declarations so that every type appears after the complex
//! types it references, which is what declaration-ordered target languages
//! (Fortran derived types, C structs) need.
//!
//! Simple types and complex types with simple content can never participate
//! in a forward reference, so they are emitted up front in their original
//! relative order; only complex types with structured content go through
//! the iterative fixed-point resolution.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::SchemaType;

/// Sort schema types into a dependency-safe declaration order.
///
/// The output is a permutation of the input: all simple types first, then
/// complex types with simple content, then complex types with structured
/// content ordered so that each one's referenced types appear earlier.
/// Types with no interdependency keep their original relative order.
///
/// Dependencies on types outside the input set are ignored. A residue of
/// mutually dependent types is an error unless `accept_circularity` is set,
/// in which case it is appended unresolved.
pub fn sorted_types<'a, I>(types: I, accept_circularity: bool) -> Result<Vec<&'a SchemaType>>
where
    I: IntoIterator<Item = &'a SchemaType>,
{
    let xsd_types: Vec<&SchemaType> = types.into_iter().collect();

    let mut ordered: Vec<&SchemaType> = xsd_types
        .iter()
        .copied()
        .filter(|t| t.is_simple())
        .collect();
    ordered.extend(
        xsd_types
            .iter()
            .copied()
            .filter(|t| t.is_complex() && t.has_simple_content()),
    );

    // The working set: structured complex types with their direct
    // dependencies, restricted to members of the working set itself
    let structured: Vec<&SchemaType> = xsd_types
        .iter()
        .copied()
        .filter(|t| t.is_complex() && !t.has_simple_content())
        .collect();
    let member_names: HashSet<&str> = structured.iter().map(|t| t.name.as_str()).collect();
    let mut unordered: IndexMap<&str, (&SchemaType, Vec<&str>)> = structured
        .iter()
        .map(|t| {
            let deps: Vec<&str> = t
                .content_elements()
                .iter()
                .filter_map(|e| e.type_name.as_deref())
                .filter(|type_name| member_names.contains(type_name))
                .collect();
            (t.name.as_str(), (*t, deps))
        })
        .collect();

    while !unordered.is_empty() {
        let ready: Vec<&str> = unordered
            .iter()
            .filter(|(_, (_, deps))| deps.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if ready.is_empty() {
            if !accept_circularity {
                let stuck: Vec<&str> = unordered.keys().copied().collect();
                return Err(Error::Circularity(format!("[{}]", stuck.join(", "))));
            }
            ordered.extend(unordered.values().map(|(t, _)| *t));
            break;
        }

        for name in &ready {
            if let Some((schema_type, _)) = unordered.shift_remove(*name) {
                ordered.push(schema_type);
            }
        }

        let remaining: HashSet<&str> = unordered.keys().copied().collect();
        for (_, (_, deps)) in unordered.iter_mut() {
            deps.retain(|name| remaining.contains(name));
        }
    }

    assert_eq!(xsd_types.len(), ordered.len());
    Ok(ordered)
}

/// Like [`sorted_types`] but with simple types removed from both input and
/// output.
pub fn sorted_complex_types<'a, I>(
    types: I,
    accept_circularity: bool,
) -> Result<Vec<&'a SchemaType>>
where
    I: IntoIterator<Item = &'a SchemaType>,
{
    sorted_types(
        types.into_iter().filter(|t| !t.is_simple()),
        accept_circularity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ElementDecl;
    use pretty_assertions::assert_eq;

    fn simple(name: &str) -> SchemaType {
        SchemaType::simple(format!("{{urn:x}}{}", name))
    }

    fn scalarized(name: &str) -> SchemaType {
        SchemaType::with_simple_content(format!("{{urn:x}}{}", name))
    }

    fn structured(name: &str, deps: &[&str]) -> SchemaType {
        let elements = deps
            .iter()
            .enumerate()
            .map(|(i, dep)| {
                ElementDecl::new(format!("{{urn:x}}e{}", i), format!("{{urn:x}}{}", dep))
            })
            .collect();
        SchemaType::structured(format!("{{urn:x}}{}", name), elements)
    }

    fn names(ordered: &[&SchemaType]) -> Vec<String> {
        ordered.iter().map(|t| t.local_name.clone()).collect()
    }

    #[test]
    fn test_bucket_ordering() {
        let types = vec![
            structured("record", &[]),
            simple("scalar"),
            scalarized("amount"),
            simple("vector"),
        ];
        let ordered = sorted_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["scalar", "vector", "amount", "record"]);
    }

    #[test]
    fn test_dependency_ordering() {
        // chain: c depends on b depends on a
        let types = vec![
            structured("c", &["b"]),
            structured("b", &["a"]),
            structured("a", &[]),
        ];
        let ordered = sorted_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["a", "b", "c"]);
    }

    #[test]
    fn test_independent_types_keep_relative_order() {
        let types = vec![
            structured("gamma", &[]),
            structured("alpha", &[]),
            structured("beta", &[]),
        ];
        let ordered = sorted_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["gamma", "alpha", "beta"]);
    }

    #[test]
    fn test_out_of_set_dependencies_are_ignored() {
        // "record" references a type that is not part of the input set
        let types = vec![structured("record", &["elsewhere"])];
        let ordered = sorted_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["record"]);
    }

    #[test]
    fn test_dependencies_on_simple_types_are_ignored() {
        // simple types land in an earlier bucket, so they never block
        let types = vec![structured("record", &["scalar"]), simple("scalar")];
        let ordered = sorted_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["scalar", "record"]);
    }

    #[test]
    fn test_circularity_is_an_error_by_default() {
        let types = vec![structured("a", &["b"]), structured("b", &["a"])];
        let err = sorted_types(&types, false).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("{urn:x}a"), "{}", message);
        assert!(message.contains("{urn:x}b"), "{}", message);
    }

    #[test]
    fn test_circularity_can_be_accepted() {
        let types = vec![structured("a", &["b"]), structured("b", &["a"])];
        let ordered = sorted_types(&types, true).unwrap();
        assert_eq!(ordered.len(), 2);
        let mut got = names(&ordered);
        got.sort();
        assert_eq!(got, ["a", "b"]);
    }

    #[test]
    fn test_self_reference_is_circular() {
        let types = vec![structured("node", &["node"])];
        assert!(sorted_types(&types, false).is_err());
        let ordered = sorted_types(&types, true).unwrap();
        assert_eq!(names(&ordered), ["node"]);
    }

    #[test]
    fn test_partial_cycle_residue() {
        // "head" resolves, the a/b cycle is appended as residue
        let types = vec![
            structured("a", &["b"]),
            structured("head", &[]),
            structured("b", &["a"]),
        ];
        let ordered = sorted_types(&types, true).unwrap();
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0].local_name, "head");
    }

    #[test]
    fn test_sorted_complex_types_drops_simple() {
        let types = vec![
            simple("scalar"),
            structured("record", &[]),
            scalarized("amount"),
        ];
        let ordered = sorted_complex_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["amount", "record"]);
    }

    #[test]
    fn test_empty_input() {
        let ordered = sorted_types(std::iter::empty(), false).unwrap();
        assert!(ordered.is_empty());
    }

    #[test]
    fn test_diamond_dependencies() {
        let types = vec![
            structured("top", &["left", "right"]),
            structured("left", &["base"]),
            structured("right", &["base"]),
            structured("base", &[]),
        ];
        let ordered = sorted_types(&types, false).unwrap();
        assert_eq!(names(&ordered), ["base", "left", "right", "top"]);
    }
}
