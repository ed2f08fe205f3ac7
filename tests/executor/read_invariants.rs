//! Entity read invariants

use crate::common::*;
use haystack_engine::EntityAccess;
use haystackdb::{Dict, EntityId, Error, Table};
use proptest::prelude::*;

#[test]
fn read_by_ids_aligns_with_input() {
    let executor = create_executor();
    let t = executor
        .execute("read", &id_rows(&["pt-2", "ghost", "site-1", "pt-2"]))
        .unwrap();
    assert_eq!(
        row_ids(&t),
        vec![
            Some("pt-2".to_string()),
            None,
            Some("site-1".to_string()),
            Some("pt-2".to_string()),
        ]
    );
}

#[test]
fn checked_read_names_first_miss() {
    let executor = create_executor();
    let db = executor.database();
    let ids: Vec<EntityId> = ["pt-1", "gone-a", "pt-2", "gone-b"]
        .iter()
        .map(|s| EntityId::new(*s))
        .collect();
    match db.entities().read_by_ids(&ids, true) {
        Err(haystack_core::Error::UnknownEntity(id)) => assert_eq!(id, "@gone-a"),
        other => panic!("expected UnknownEntity, got {:?}", other),
    }
}

#[test]
fn unchecked_read_without_match_is_none() {
    let executor = create_executor();
    let db = executor.database();
    assert!(db.entities().read("chiller", false).unwrap().is_none());
    assert!(matches!(
        db.entities().read("chiller", true),
        Err(haystack_core::Error::UnknownEntity(_))
    ));
    let site = db.entities().read("site", true).unwrap().unwrap();
    assert_eq!(site.get_str("dis"), Some("Headquarters"));
}

#[test]
fn filter_read_and_limit() {
    let executor = create_executor();
    let points = executor
        .execute("read", &one_row(Dict::new().with("filter", "point")))
        .unwrap();
    assert_eq!(points.num_rows(), 3);

    let limited = executor
        .execute(
            "read",
            &one_row(Dict::new().with("filter", "point").with("limit", 2)),
        )
        .unwrap();
    assert_eq!(limited.num_rows(), 2);

    let none = executor
        .execute("read", &one_row(Dict::new().with("filter", "chiller")))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn filter_follows_refs() {
    let executor = create_executor();
    let t = executor
        .execute(
            "read",
            &one_row(Dict::new().with("filter", "his and equipRef->siteRef->site")),
        )
        .unwrap();
    let mut ids = row_ids(&t);
    ids.sort();
    assert_eq!(ids, vec![Some("pt-2".to_string()), Some("pt-3".to_string())]);
}

#[test]
fn empty_batch_is_empty_table() {
    let executor = create_executor();
    let db = executor.database();
    let t = db.entities().read_by_ids(&[], true).unwrap();
    assert_eq!(t.num_rows(), 0);
    assert!(executor.execute("read", &Table::empty()).is_err());
}

proptest! {
    #[test]
    fn unchecked_batch_length_and_alignment(
        picks in prop::collection::vec((any::<bool>(), 0usize..5), 0..20)
    ) {
        let executor = create_executor();
        let known = ["site-1", "ahu-1", "pt-1", "pt-2", "pt-3"];
        let ids: Vec<EntityId> = picks
            .iter()
            .map(|(hit, i)| if *hit {
                EntityId::new(known[*i])
            } else {
                EntityId::new(format!("missing-{}", i))
            })
            .collect();
        let t = executor.database().entities().read_by_ids(&ids, false).unwrap();
        prop_assert_eq!(t.num_rows(), ids.len());
        for (row, ((hit, _), id)) in t.rows().zip(picks.iter().zip(&ids)) {
            if *hit {
                prop_assert_eq!(row.id(), Some(id));
            } else {
                prop_assert!(row.missing("id"));
            }
        }
    }
}
