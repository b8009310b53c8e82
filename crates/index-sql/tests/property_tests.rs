//! Property tests for document ids, clause composition and join resolution.

mod common;

use helios_index_sql::DocumentIdScheme;
use helios_index_sql::sql::{AND_SEPARATOR, Associations, ClauseBuilder, LIST_SEPARATOR};
use helios_index_sql::types::AssociationReference;
use proptest::prelude::*;

use common::*;

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        "[a-z]{1,8}( = [0-9]{1,3})?",
    ]
}

proptest! {
    #[test]
    fn test_encode_decode_round_trip(
        pk in 0u64..=u64::from(u32::MAX),
        total in 1u32..=64,
        offset in 0u32..64,
    ) {
        let scheme = DocumentIdScheme::new(total, offset).unwrap();
        let id = scheme.encode(pk).unwrap();
        prop_assert_eq!(scheme.decode(id), Some(pk));
    }

    #[test]
    fn test_distinct_offsets_never_collide(
        pk1 in 0u64..1_000_000,
        pk2 in 0u64..1_000_000,
        total in 2u32..=32,
        offsets in (0u32..32, 0u32..32),
    ) {
        let (first, second) = (offsets.0 % total, offsets.1 % total);
        prop_assume!(first != second);

        let a = DocumentIdScheme::new(total, first).unwrap();
        let b = DocumentIdScheme::new(total, second).unwrap();
        prop_assert_ne!(a.encode(pk1), b.encode(pk2));
        prop_assert_eq!(b.decode(a.encode(pk1).unwrap()), None);
    }

    #[test]
    fn test_clause_never_emits_stray_separators(
        leading in proptest::option::of(fragment()),
        fragments in proptest::collection::vec(fragment(), 0..8),
    ) {
        let mut clause = match &leading {
            Some(leading) => ClauseBuilder::with_leading(leading.clone()),
            None => ClauseBuilder::new(),
        };
        clause.add_all(fragments.iter().cloned());

        for separator in [LIST_SEPARATOR, AND_SEPARATOR] {
            let sql = clause.separated(separator);
            let trimmed = separator.trim();
            let doubled = format!("{}{}", separator, separator);

            prop_assert!(!sql.starts_with(separator));
            prop_assert!(!sql.ends_with(separator));
            prop_assert!(!sql.contains(&doubled));
            prop_assert!(!sql.trim_start().starts_with(trimmed));

            let non_blank = leading
                .iter()
                .chain(fragments.iter())
                .filter(|f| !f.trim().is_empty())
                .count();
            if non_blank == 0 {
                prop_assert_eq!(sql, "");
            }
        }
    }

    #[test]
    fn test_join_resolution_idempotent(
        order in proptest::sample::subsequence(
            vec!["user", "taggings", "taggings.tag", "categories", "comments"],
            0..=5,
        ),
        repeats in 1usize..4,
    ) {
        let mut source = article_source();
        for _ in 0..repeats {
            for path in &order {
                source = source.with_association(AssociationReference::path(path));
            }
        }

        let adapter = source.dialect.adapter();
        let associations = Associations::resolve(&source, &blog_schema(), adapter).unwrap();

        let mut paths: Vec<_> = associations.joins().iter().map(|j| j.path.join(".")).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        prop_assert_eq!(paths.len(), total);

        for path in &order {
            let path: Vec<String> = path.split('.').map(str::to_string).collect();
            prop_assert!(associations.join_for(&path).is_some());
        }
    }
}
