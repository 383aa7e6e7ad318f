use lineage_core::{lower_json_value, Forest, NodeKind, SnapshotError};
use serde_json::json;

fn augustine_family() -> Forest {
    lower_json_value(&json!([
        { "id": 6, "name": "Augustine", "spouseId": 7, "children": [8, 9], "bio": "Patriarch" },
        { "id": 7, "name": "Mary", "spouseId": 6, "children": [8] },
        { "id": 8, "name": "Peter", "children": [10] },
        { "id": 9, "name": "Paul" },
        { "id": 10, "name": "Grandkid" },
    ]))
    .unwrap()
}

#[test]
fn snapshot_lists_roots_and_family_units() {
    let snapshot = augustine_family().snapshot(None).unwrap();

    assert_eq!(snapshot.roots, ["6", "7"]);
    assert!(snapshot.focus.is_none());
    assert_eq!(snapshot.family_units.len(), 1);
    assert_eq!(snapshot.family_units[0].id, "family-6-7-8");
    assert_eq!(snapshot.family_units[0].name, "Augustine & Mary");
    assert_eq!(snapshot.family_units[0].children, ["8"]);
}

#[test]
fn focus_reports_children_and_grandchildren_via_family_unit() {
    let snapshot = augustine_family().snapshot(Some("6")).unwrap();
    let focus = snapshot.focus.unwrap();

    assert_eq!(focus.id, "6");
    assert_eq!(focus.name, "Augustine");
    let children: Vec<(&str, NodeKind)> = focus
        .children
        .iter()
        .map(|child| (child.id.as_str(), child.kind))
        .collect();
    assert_eq!(
        children,
        [("9", NodeKind::Member), ("family-6-7-8", NodeKind::FamilyUnit)]
    );

    assert_eq!(focus.grandchildren.len(), 1);
    let grandchild = &focus.grandchildren[0];
    assert_eq!(grandchild.id, "8");
    assert_eq!(grandchild.name, "Peter");
    assert_eq!(grandchild.via_id, "family-6-7-8");
    assert_eq!(grandchild.via, "Augustine & Mary");
}

#[test]
fn focus_on_stranded_spouse_is_a_leaf() {
    let focus = augustine_family().snapshot(Some("7")).unwrap().focus.unwrap();
    assert!(focus.children.is_empty());
    assert!(focus.grandchildren.is_empty());
}

#[test]
fn unknown_focus_is_rejected() {
    let err = augustine_family().snapshot(Some("404")).unwrap_err();
    assert_eq!(err, SnapshotError::FocusNotFound("404".to_string()));
}

#[test]
fn snapshot_json_uses_camel_case_keys() {
    let text = augustine_family()
        .snapshot(Some("6"))
        .unwrap()
        .to_json_pretty()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["roots"], json!(["6", "7"]));
    assert_eq!(value["familyUnits"][0]["id"], "family-6-7-8");
    assert_eq!(value["focus"]["children"][1]["kind"], "family-unit");
    assert_eq!(value["focus"]["grandchildren"][0]["viaId"], "family-6-7-8");
    assert!(text.contains("\n  \"roots\""));
}

#[test]
fn snapshot_without_focus_omits_the_key() {
    let text = augustine_family().snapshot(None).unwrap().to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value.get("focus").is_none());
}

#[test]
fn nested_view_serializes_full_subtree() {
    let forest = augustine_family();
    let text = forest.nested("6").unwrap().to_json_string().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["kind"], "member");
    assert_eq!(value["id"], "6");
    assert_eq!(value["spouseId"], "7");
    assert_eq!(value["bio"], "Patriarch");
    assert_eq!(value["children"][0]["id"], "9");
    assert_eq!(value["children"][0]["children"], json!([]));

    let unit = &value["children"][1];
    assert_eq!(unit["kind"], "family-unit");
    assert_eq!(unit["name"], "Augustine & Mary");
    assert_eq!(unit["spouses"][0]["id"], "6");
    assert_eq!(unit["spouses"][1]["id"], "7");
    assert_eq!(unit["children"][0]["id"], "8");
    assert_eq!(unit["children"][0]["children"][0]["id"], "10");
}

#[test]
fn nested_roots_follow_root_order() {
    let forest = augustine_family();
    let ids: Vec<&str> = forest
        .nested_roots()
        .iter()
        .map(|nested| nested.node().id())
        .collect();
    assert_eq!(ids, ["6", "7"]);
    assert!(forest.nested("404").is_none());

    let all: serde_json::Value = serde_json::from_str(&forest.nested_json().unwrap()).unwrap();
    assert_eq!(all[0]["id"], "6");
    assert_eq!(all[1]["id"], "7");
    assert_eq!(all[1]["children"], json!([]));
}

#[test]
fn input_kind_attribute_cannot_shadow_node_kind() {
    let forest = lower_json_value(&json!([
        { "id": "1", "name": "A", "kind": "family-unit", "spouses": ["x"], "role": "Elder" },
    ]))
    .unwrap();

    let text = forest.nested("1").unwrap().to_json_string().unwrap();
    assert_eq!(text.matches("\"kind\"").count(), 1);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["kind"], "member");
    assert_eq!(value["role"], "Elder");
    assert!(value.get("spouses").is_none());
}
