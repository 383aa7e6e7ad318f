use lineage_core::{
    lower_json_value, lower_records, Forest, LineageError, MemberRecord, NodeKind,
    StructuralError,
};
use serde_json::json;
use std::collections::HashSet;

fn lower(value: serde_json::Value) -> Forest {
    lower_json_value(&value).unwrap()
}

fn assert_single_placement(forest: &Forest) {
    let mut seen = HashSet::new();
    for node in forest.iter() {
        for child in forest.children(node) {
            assert!(
                seen.insert(child.id().to_string()),
                "node {} is linked more than once",
                child.id()
            );
        }
    }
}

#[test]
fn reciprocal_pair_synthesizes_one_family_unit() {
    let forest = lower(json!([
        { "id": "1", "name": "Albert", "children": ["3"] },
        { "id": "2", "name": "Beatrice", "spouseId": "1", "children": ["3"] },
        { "id": "3", "name": "Clara" },
    ]));

    let units: Vec<_> = forest.family_units().collect();
    assert_eq!(units.len(), 1);
    let unit_node = units[0];
    assert_eq!(unit_node.id(), "family-2-1-3");
    assert_eq!(unit_node.kind(), NodeKind::FamilyUnit);
    assert_eq!(unit_node.name(), "Beatrice & Albert");

    let unit = unit_node.as_family_unit().unwrap();
    let [first, second] = forest.spouses(unit).unwrap();
    assert_eq!(first.id, "2");
    assert_eq!(second.id, "1");
    assert_eq!(forest.child_ids("family-2-1-3").unwrap(), ["3"]);

    assert_eq!(forest.child_ids("2").unwrap(), ["family-2-1-3"]);
    assert!(forest.child_ids("1").unwrap().is_empty());
    assert_eq!(forest.root_ids(), ["1", "2"]);
    assert_single_placement(&forest);
}

#[test]
fn claimants_without_spouse_link_fall_back_to_first_claimant() {
    let forest = lower(json!([
        { "id": "p1", "name": "P1", "children": ["x"] },
        { "id": "p2", "name": "P2", "children": ["x"] },
        { "id": "p3", "name": "P3", "children": ["x"] },
        { "id": "x", "name": "X" },
    ]));

    assert_eq!(forest.child_ids("p1").unwrap(), ["x"]);
    assert!(forest.child_ids("p2").unwrap().is_empty());
    assert!(forest.child_ids("p3").unwrap().is_empty());
    assert_eq!(forest.family_unit_count(), 0);
    assert_eq!(forest.root_ids(), ["p1", "p2", "p3"]);
}

#[test]
fn dangling_child_reference_is_dropped() {
    let forest = lower(json!([
        { "id": "1", "name": "A", "children": ["2", "404"] },
        { "id": "2", "name": "B" },
    ]));

    assert_eq!(forest.child_ids("1").unwrap(), ["2"]);
    assert!(forest.get("404").is_none());
    assert_eq!(forest.root_ids(), ["1"]);
}

#[test]
fn couple_sharing_missing_child_keeps_childless_unit() {
    let forest = lower(json!([
        { "id": "a", "name": "A", "spouseId": "b", "children": ["ghost"] },
        { "id": "b", "name": "B", "spouseId": "a", "children": ["ghost"] },
    ]));

    assert_eq!(forest.family_unit_count(), 1);
    assert_eq!(forest.child_ids("a").unwrap(), ["family-a-b-ghost"]);
    assert!(forest.child_ids("family-a-b-ghost").unwrap().is_empty());
    assert!(forest.child_ids("b").unwrap().is_empty());
    assert!(forest.get("ghost").is_none());
    assert_eq!(forest.root_ids(), ["a", "b"]);
}

#[test]
fn self_declared_spouse_uses_first_claimant_fallback() {
    let forest = lower(json!([
        { "id": "a", "name": "A", "spouseId": "a", "children": ["c"] },
        { "id": "x", "name": "X", "children": ["c"] },
        { "id": "c", "name": "C" },
    ]));

    assert_eq!(forest.family_unit_count(), 0);
    assert_eq!(forest.child_ids("a").unwrap(), ["c"]);
    assert!(forest.child_ids("x").unwrap().is_empty());
}

#[test]
fn mutual_parenting_is_a_structural_error() {
    let err = lower_json_value(&json!([
        { "id": "A", "name": "A", "children": ["B"] },
        { "id": "B", "name": "B", "children": ["A"] },
    ]))
    .unwrap_err();

    assert_eq!(
        err,
        LineageError::Structural(StructuralError::Cycle {
            path: vec!["A".to_string(), "B".to_string(), "A".to_string()]
        })
    );
}

#[test]
fn cycle_through_family_unit_is_detected() {
    let err = lower_json_value(&json!([
        { "id": "a", "name": "A", "spouseId": "b", "children": ["c"] },
        { "id": "b", "name": "B", "spouseId": "a", "children": ["c"] },
        { "id": "c", "name": "C", "children": ["a"] },
    ]))
    .unwrap_err();

    match err {
        LineageError::Structural(StructuralError::Cycle { path }) => {
            assert_eq!(path, ["a", "family-a-b-c", "c", "a"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn stranded_spouse_becomes_its_own_root() {
    let forest = lower(json!([
        { "id": "g", "name": "Grandparent", "children": ["a"] },
        { "id": "a", "name": "A", "spouseId": "b", "children": ["c"] },
        { "id": "b", "name": "B", "spouseId": "a", "children": ["c"] },
        { "id": "c", "name": "C" },
    ]));

    assert_eq!(forest.root_ids(), ["g", "b"]);
    assert_eq!(forest.child_ids("a").unwrap(), ["family-a-b-c"]);
    assert_eq!(forest.depth_of("g"), Some(0));
    assert_eq!(forest.depth_of("family-a-b-c"), Some(2));
    assert_eq!(forest.depth_of("c"), Some(3));
    assert_eq!(forest.depth_of("b"), Some(0));
    assert_eq!(forest.max_depth(), Some(3));
}

#[test]
fn couple_with_two_shared_children_gets_two_units() {
    let forest = lower(json!([
        { "id": "m", "name": "M", "spouseId": "f", "children": ["k1", "k2"] },
        { "id": "f", "name": "F", "spouseId": "m", "children": ["k1", "k2"] },
        { "id": "k1", "name": "K1" },
        { "id": "k2", "name": "K2" },
    ]));

    let ids: Vec<&str> = forest.family_units().map(|unit| unit.id()).collect();
    assert_eq!(ids, ["family-m-f-k1", "family-m-f-k2"]);
    assert_eq!(forest.child_ids("family-m-f-k1").unwrap(), ["k1"]);
    assert_eq!(forest.child_ids("family-m-f-k2").unwrap(), ["k2"]);
    assert_eq!(forest.root_ids(), ["m", "f"]);
}

#[test]
fn disconnected_ancestries_yield_multiple_roots_in_input_order() {
    let forest = lower(json!([
        { "id": "1", "name": "A", "children": ["2"] },
        { "id": "2", "name": "B", "children": ["3"] },
        { "id": "3", "name": "C" },
        { "id": "10", "name": "X", "children": ["11"] },
        { "id": "11", "name": "Y" },
    ]));

    assert_eq!(forest.root_ids(), ["1", "10"]);
    assert_eq!(forest.member_count(), 5);
    assert_eq!(forest.len(), 5);
}

#[test]
fn linear_lineage_has_one_root() {
    let forest = lower_records([
        MemberRecord::new("1", "A").with_children(["2"]),
        MemberRecord::new("2", "B").with_children(["3"]),
        MemberRecord::new("3", "C"),
    ])
    .unwrap();

    assert_eq!(forest.root_ids(), ["1"]);
    assert_eq!(forest.max_depth(), Some(2));
}

#[test]
fn lowering_is_deterministic() {
    let input = json!([
        { "id": 1, "name": "A", "spouseId": 2, "children": [3, 4, 99] },
        { "id": 2, "name": "B", "spouseId": 1, "children": [3] },
        { "id": 3, "name": "C", "children": [5] },
        { "id": 4, "name": "D", "children": [5] },
        { "id": 5, "name": "E" },
        { "id": 6, "name": "F", "children": [4] },
    ]);

    let first = lower_json_value(&input).unwrap();
    let second = lower_json_value(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.snapshot(None).unwrap(), second.snapshot(None).unwrap());
}

#[test]
fn messy_claims_still_place_every_node_once() {
    let forest = lower(json!([
        { "id": "x", "name": "X", "children": ["c", "c", "d"] },
        { "id": "a", "name": "A", "spouseId": "b", "children": ["c", "d"] },
        { "id": "b", "name": "B", "spouseId": "a", "children": ["c", "d", "e"] },
        { "id": "c", "name": "C", "children": ["e"] },
        { "id": "d", "name": "D" },
        { "id": "e", "name": "E" },
    ]));

    assert_single_placement(&forest);
    assert!(forest.child_ids("x").unwrap().is_empty());
    assert_eq!(
        forest.child_ids("a").unwrap(),
        ["family-a-b-c", "family-a-b-d"]
    );
    // `e` has no spouse pair among its claimants, so `b` (first claimant) keeps it.
    assert_eq!(forest.child_ids("b").unwrap(), ["e"]);
    assert!(forest.child_ids("c").unwrap().is_empty());
    assert_eq!(forest.child_ids("family-a-b-c").unwrap(), ["c"]);
}

#[test]
fn empty_input_yields_empty_forest() {
    let forest = lower(json!([]));
    assert!(forest.is_empty());
    assert!(forest.root_ids().is_empty());
    assert_eq!(forest.max_depth(), None);
}

#[test]
fn input_records_are_not_mutated() {
    let records = vec![
        MemberRecord::new("1", "A").with_children(["3"]),
        MemberRecord::new("2", "B").with_spouse("1").with_children(["3"]),
        MemberRecord::new("3", "C"),
    ];

    let forest = lower_records(records.clone()).unwrap();
    let member = forest.get("2").unwrap().as_member().unwrap();
    assert_eq!(member, &records[1]);
    assert_eq!(member.child_ids, ["3"]);
}
