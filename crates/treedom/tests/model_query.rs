use serde_json::json;
use treedom::{Model, NodeId};

/// A todo list with done flags spread over both tree levels, so queries
/// have to look past the structure.
fn todos() -> Model {
    Model::new(vec![
        json!({"id": "groceries", "text": "shop", "done": false, "childNodes": [
            {"id": "milk", "text": "milk", "done": true},
            {"id": "bread", "text": "bread", "done": false}
        ]}),
        json!({"id": "taxes", "text": "file taxes", "done": true}),
        json!({"id": "note", "text": "no done flag here"}),
    ])
    .unwrap()
}

fn ids(nodes: &[&treedom::Node]) -> Vec<String> {
    nodes.iter().map(|node| node.id().to_string()).collect()
}

#[test]
fn done_queries_match_exactly_the_done_nodes() {
    let mut model = todos();

    let done = model.get_elements_by_property(Some("done"), Some(&json!(true)));
    assert_eq!(ids(&done), ["milk", "taxes"]);

    let open = model.get_elements_by_property(Some("done"), Some(&json!(false)));
    assert_eq!(ids(&open), ["groceries", "bread"]);

    // flipping a flag moves the node between the result sets
    model
        .set(&NodeId::from("bread"), "done", json!(true))
        .unwrap();
    let done = model.get_elements_by_property(Some("done"), Some(&json!(true)));
    assert_eq!(ids(&done), ["milk", "bread", "taxes"]);
}

#[test]
fn presence_queries_skip_nodes_without_the_field() {
    let model = todos();

    let flagged = model.get_elements_by_property(Some("done"), None);
    assert_eq!(ids(&flagged), ["groceries", "milk", "bread", "taxes"]);
    assert!(!ids(&flagged).contains(&"note".to_string()));
}

#[test]
fn counts_agree_with_the_materialized_results() {
    let model = todos();

    for (path, value) in [
        (Some("done"), Some(json!(true))),
        (Some("done"), Some(json!(false))),
        (Some("done"), None),
        (Some("text"), None),
        (None, None),
        (Some("missing"), None),
    ] {
        assert_eq!(
            model.count_elements_by_property(path, value.as_ref()),
            model.get_elements_by_property(path, value.as_ref()).len(),
            "{path:?} {value:?}"
        );
    }
    assert_eq!(model.count_elements_by_property(None, None), 5);
}

#[test]
fn results_come_in_registration_order_not_tree_order() {
    let mut model = todos();

    // move "taxes" to the front of the top level; registration order of
    // query results does not follow
    model.prepend_child(&NodeId::from("taxes"), None).unwrap();
    let all = model.get_elements_by_property(Some("text"), None);
    assert_eq!(ids(&all), ["groceries", "milk", "bread", "taxes", "note"]);
}

#[test]
fn removed_subtrees_drop_out_of_query_results() {
    let mut model = todos();

    model.remove_child(&NodeId::from("groceries")).unwrap();

    let done = model.get_elements_by_property(Some("done"), Some(&json!(true)));
    assert_eq!(ids(&done), ["taxes"]);
    assert_eq!(model.count_elements_by_property(Some("done"), None), 1);
}

#[test]
fn reinforced_references_are_queryable_by_equality() {
    let mut model = todos();

    // cache a derived reference on each list, then find a node by it
    model
        .reinforce_property(&NodeId::from("milk"), "element", json!("li-7"))
        .unwrap();
    model
        .reinforce_property(&NodeId::from("bread"), "element", json!("li-8"))
        .unwrap();

    let hit = model.get_elements_by_property(Some("element"), Some(&json!("li-8")));
    assert_eq!(ids(&hit), ["bread"]);
}

#[test]
fn nested_and_ancestor_paths_resolve_in_queries() {
    let model = Model::new(vec![json!({
        "id": "settings",
        "kind": "panel",
        "childNodes": [
            {"id": "volume", "config": {"min": 0, "max": 100}},
            {"id": "balance", "config": {"min": -10, "max": 10}}
        ]
    })])
    .unwrap();

    let capped = model.get_elements_by_property(Some("config.max"), Some(&json!(100)));
    assert_eq!(ids(&capped), ["volume"]);

    let in_panel =
        model.get_elements_by_property(Some("parentNode.kind"), Some(&json!("panel")));
    assert_eq!(ids(&in_panel), ["volume", "balance"]);
}

#[test]
fn degenerate_filters_match_nothing() {
    let model = todos();

    // a value needs a path to resolve against
    assert!(model
        .get_elements_by_property(None, Some(&json!(true)))
        .is_empty());
    // malformed paths are ignored, not errors
    assert!(model.get_elements_by_property(Some("a..b"), None).is_empty());
    assert_eq!(model.count_elements_by_property(Some(""), None), 0);
    // a path of parent hops alone resolves to nothing
    assert!(model
        .get_elements_by_property(Some("parentNode"), None)
        .is_empty());
}
