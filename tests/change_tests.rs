//! Behavior of the merge/delete change algebra.

mod common;

use assert_matches::assert_matches;
use common::*;
use metagraph::{Change, Delete, Merge, MetadataError, MetadataGraph};

#[test]
fn merge_adds_candidate_triples() {
    let graph = annotations();
    let before = graph.len().unwrap();

    let carol = ex("carol");
    let candidate = vec![
        resource_triple(&carol, &nn("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"), &foaf("Person")),
        literal_triple(&carol, &foaf("name"), "Carol"),
    ];

    let mut change = Change::from(Merge::new(candidate.clone()));
    change.apply_to(&graph).unwrap();

    assert!(change.applied());
    assert_eq!(graph.len().unwrap(), before + 2);
    assert_eq!(change.record().added.len(), 2);
    for triple in &candidate {
        assert!(graph.contains_triple(triple).unwrap());
    }
}

#[test]
fn merging_a_subset_produces_an_empty_record() {
    let graph = annotations();
    let before = graph.len().unwrap();

    // Already present in the fixture.
    let candidate = vec![literal_triple(&ex("alice"), &foaf("name"), "Alice")];

    let mut change = Change::from(Merge::new(candidate));
    change.apply_to(&graph).unwrap();

    assert!(change.applied());
    assert!(change.record().is_empty());
    assert_eq!(graph.len().unwrap(), before);
}

#[test]
fn double_apply_fails_fast() {
    let graph = annotations();
    let mut change = Change::from(Merge::new(vec![literal_triple(
        &ex("carol"),
        &foaf("name"),
        "Carol",
    )]));

    change.apply_to(&graph).unwrap();
    assert_matches!(
        change.apply_to(&graph),
        Err(MetadataError::ChangeAlreadyApplied)
    );
}

#[test]
fn undo_before_apply_fails_fast() {
    let graph = annotations();
    let mut change = Change::from(Delete::new(ex("alice"), true));
    assert_matches!(
        change.undo_from(&graph),
        Err(MetadataError::ChangeNotApplied)
    );
}

#[test]
fn guarded_merge_rejects_and_rolls_back() {
    let graph = annotations();
    let pristine = graph.duplicate().unwrap();

    // The schema does not define ex:Nonexistent.
    let candidate = vec![resource_triple(
        &ex("thing"),
        &nn("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
        &ex("Nonexistent"),
    )];

    let mut change = Change::from(Merge::guarded(candidate, reasoner()));
    let result = change.apply_to(&graph);

    assert_matches!(result, Err(MetadataError::SchemaViolation(_)));
    assert!(!change.applied());
    assert!(change.record().is_empty());
    assert_same_triples(&graph, &pristine);
}

#[test]
fn guarded_merge_accepts_valid_data() {
    let graph = annotations();
    let carol = ex("carol");
    let candidate = vec![
        resource_triple(&carol, &nn("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"), &foaf("Person")),
        literal_triple(&carol, &foaf("name"), "Carol"),
    ];

    let mut change = Change::from(Merge::guarded(candidate, reasoner()));
    change.apply_to(&graph).unwrap();

    assert!(change.applied());
    assert!(graph.contains_resource(&carol).unwrap());
}

#[test]
fn unguarded_merge_accepts_invalid_data() {
    // Legacy-compatible mode: schema violations are silently accepted.
    let graph = annotations();
    let candidate = vec![resource_triple(
        &ex("thing"),
        &nn("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
        &ex("Nonexistent"),
    )];

    let mut change = Change::from(Merge::new(candidate));
    change.apply_to(&graph).unwrap();

    assert!(change.applied());
    assert!(graph.contains_resource(&ex("thing")).unwrap());
}

#[test]
fn merge_undo_removes_what_was_added() {
    let graph = annotations();
    let pristine = graph.duplicate().unwrap();

    let mut change = Change::from(Merge::new(vec![literal_triple(
        &ex("carol"),
        &foaf("name"),
        "Carol",
    )]));
    change.apply_to(&graph).unwrap();
    change.undo_from(&graph).unwrap();

    assert_same_triples(&graph, &pristine);
    assert_matches!(
        change.undo_from(&graph),
        Err(MetadataError::ChangeAlreadyUndone)
    );
}

fn chain_graph() -> MetadataGraph {
    // A -> B -> C, nothing else references B or C.
    let graph = MetadataGraph::new().unwrap();
    graph
        .insert_all(&[
            resource_triple(&ex("A"), &ex("p"), &ex("B")),
            resource_triple(&ex("B"), &ex("q"), &ex("C")),
        ])
        .unwrap();
    graph
}

#[test]
fn recursive_delete_cascades_to_orphans() {
    let graph = chain_graph();

    let mut change = Change::from(Delete::new(ex("A"), true));
    change.apply_to(&graph).unwrap();

    assert!(change.applied());
    assert_eq!(graph.len().unwrap(), 0);
    assert_eq!(change.record().removed.len(), 2);
}

#[test]
fn non_recursive_delete_removes_only_own_triples() {
    let graph = chain_graph();

    let mut change = Change::from(Delete::new(ex("A"), false));
    change.apply_to(&graph).unwrap();

    assert_eq!(graph.len().unwrap(), 1);
    assert!(!graph.contains_resource(&ex("A")).unwrap());
    assert!(graph.contains_resource(&ex("B")).unwrap());
    assert!(graph.contains_resource(&ex("C")).unwrap());
}

#[test]
fn delete_preserves_shared_references() {
    // Both A and X reference B; deleting A must keep B.
    let graph = MetadataGraph::new().unwrap();
    graph
        .insert_all(&[
            resource_triple(&ex("A"), &ex("p"), &ex("B")),
            resource_triple(&ex("X"), &ex("p"), &ex("B")),
            resource_triple(&ex("B"), &ex("q"), &ex("C")),
        ])
        .unwrap();

    let mut change = Change::from(Delete::new(ex("A"), true));
    change.apply_to(&graph).unwrap();

    assert!(graph.contains_resource(&ex("B")).unwrap());
    assert!(graph.contains_resource(&ex("C")).unwrap());
    assert_eq!(graph.len().unwrap(), 2);
}

#[test]
fn delete_is_idempotent() {
    let once = chain_graph();
    let mut first = Change::from(Delete::new(ex("A"), true));
    first.apply_to(&once).unwrap();

    let twice = chain_graph();
    let mut second = Change::from(Delete::new(ex("A"), true));
    second.apply_to(&twice).unwrap();
    let mut third = Change::from(Delete::new(ex("A"), true));
    third.apply_to(&twice).unwrap();

    assert!(third.applied());
    assert!(third.record().is_empty());
    assert_same_triples(&once, &twice);
}

#[test]
fn deleting_a_missing_resource_is_a_noop_marked_applied() {
    let graph = annotations();
    let before = graph.len().unwrap();

    let mut change = Change::from(Delete::new(ex("ghost"), true));
    change.apply_to(&graph).unwrap();

    assert!(change.applied());
    assert!(change.record().is_empty());
    assert_eq!(graph.len().unwrap(), before);
}

#[test]
fn self_reference_does_not_recurse_forever() {
    let graph = MetadataGraph::new().unwrap();
    graph
        .insert_all(&[
            resource_triple(&ex("A"), &ex("p"), &ex("A")),
            resource_triple(&ex("A"), &ex("p"), &ex("B")),
        ])
        .unwrap();

    let mut change = Change::from(Delete::new(ex("A"), true));
    change.apply_to(&graph).unwrap();

    assert_eq!(graph.len().unwrap(), 0);
}

#[test]
fn mutually_referencing_cycle_survives() {
    // A -> B -> C -> B: after A's removal, B is still referenced by C, so
    // the prune stops there. Reference counting keeps live cycles.
    let graph = MetadataGraph::new().unwrap();
    graph
        .insert_all(&[
            resource_triple(&ex("A"), &ex("p"), &ex("B")),
            resource_triple(&ex("B"), &ex("q"), &ex("C")),
            resource_triple(&ex("C"), &ex("r"), &ex("B")),
        ])
        .unwrap();

    let mut change = Change::from(Delete::new(ex("A"), true));
    change.apply_to(&graph).unwrap();

    assert_eq!(graph.len().unwrap(), 2);
    assert_eq!(change.record().removed.len(), 1);
    assert!(graph.contains_resource(&ex("B")).unwrap());
    assert!(graph.contains_resource(&ex("C")).unwrap());
}

#[test]
fn delete_undo_restores_the_graph() {
    let graph = chain_graph();
    let pristine = graph.duplicate().unwrap();

    let mut change = Change::from(Delete::new(ex("A"), true));
    change.apply_to(&graph).unwrap();
    assert_eq!(graph.len().unwrap(), 0);

    change.undo_from(&graph).unwrap();
    assert_same_triples(&graph, &pristine);
}

#[test]
fn chain_scenario_records_both_removals() {
    // Given {(A,p,B),(B,q,C)}, Delete(A, recursive) yields the empty graph
    // and a record covering both triples: B becomes unreferenced after A's
    // removal, then C after B's.
    let graph = chain_graph();

    let mut change = Change::from(Delete::new(ex("A"), true));
    change.apply_to(&graph).unwrap();

    assert_eq!(graph.len().unwrap(), 0);
    let removed = &change.record().removed;
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&resource_triple(&ex("A"), &ex("p"), &ex("B"))));
    assert!(removed.contains(&resource_triple(&ex("B"), &ex("q"), &ex("C"))));
}
