//! Integration tests for parsing definitions and resolving them into dags.

use dag_exporter::dag::{BuildOptions, Forwarder, Nesting, build_dag, build_dag_with};
use dag_exporter::export::export_pipeline;
use dag_exporter::parse;
use dag_exporter::pipeline::Pipeline;

#[test]
fn parse_order_pipeline() {
    let json = include_str!("fixtures/order_pipeline.json");
    let definition = parse::parse(json).expect("Should parse");
    assert_eq!(definition.root, "orders");
    assert_eq!(definition.dags.len(), 5);
    assert_eq!(definition.dags["orders"].nodes.len(), 4);
    assert!(definition.dags["orders"].edges[1].exec_only);
}

#[test]
fn parse_invalid_json_returns_error() {
    let errors = parse::parse("not valid json").unwrap_err();
    assert_eq!(errors[0].code, "P001");
}

#[test]
fn build_order_pipeline() {
    let json = include_str!("fixtures/order_pipeline.json");
    let pipeline = parse::parse_and_build(json).expect("Should build");
    let dag = pipeline.workflow_graph();

    assert_eq!(dag.id(), "orders");
    assert_eq!(dag.len(), 4);
    assert_eq!(dag.start_node(), Some("validate"));
    assert_eq!(dag.end_node(), Some("bill"));
    assert!(dag.has_branch());
    assert!(dag.is_execution_only());

    let route = dag.node("route").unwrap();
    assert!(route.is_dynamic());
    assert!(route.is_execution_only("dynamic"));
    assert!(route.is_execution_only("ship"));

    let ship = dag.node("ship").unwrap();
    assert!(!ship.is_execution_only("dynamic"));
    assert_eq!(
        ship.forwarder("bill"),
        Some(&Forwarder::Transform(dag_exporter::dag::Hook::new("items-to-invoice")))
    );

    let bill = dag.node("bill").unwrap();
    assert!(!bill.is_dynamic());
    match bill.nesting() {
        Nesting::SubDag(sub) => assert_eq!(sub.start_node(), Some("charge")),
        other => panic!("expected sub-dag, got {:?}", other),
    }

    assert!(pipeline.validate().is_ok());
}

#[test]
fn export_order_pipeline() {
    let json = include_str!("fixtures/order_pipeline.json");
    let pipeline = parse::parse_and_build(json).expect("Should build");
    let root = export_pipeline(&pipeline);

    assert_eq!(root.validity.as_ref().map(|v| v.is_valid), Some(true));

    let route = &root.nodes["route"];
    assert!(route.dynamic_exec_only);
    assert_eq!(route.conditional_dags.len(), 2);
    let notify = &route.conditional_dags["gold"].nodes["notify"].operations[0];
    assert!(notify.is_callback);
    assert_eq!(notify.name.as_deref(), Some("vip-desk"));
    assert!(route.conditional_dags["basic"].nodes["log"].operations[0].is_modifier);
    assert_eq!(route.child_exec_only["ship"], true);

    let ship = &root.nodes["ship"];
    assert!(ship.is_foreach);
    assert!(ship.has_sub_aggregator);
    let pack = &ship.foreach_dag.as_ref().unwrap().nodes["pack"];
    assert_eq!(pack.unique_id, "3_ship.1_pack");
    assert!(pack.operations[0].has_response_handler);

    let bill = &root.nodes["bill"];
    assert!(bill.has_sub_dag);
    assert!(bill.has_aggregator);
    assert_eq!(bill.sub_dag.as_ref().unwrap().nodes.len(), 2);

    assert!(root.nodes["validate"].operations[0].has_failure_handler);
}

#[test]
fn shared_body_is_expanded_per_reference() {
    let json = include_str!("fixtures/shared_body.json");
    let pipeline = parse::parse_and_build(json).expect("Should build");
    let root = export_pipeline(&pipeline);

    let first = root.nodes["first"].foreach_dag.as_ref().unwrap();
    let second = root.nodes["second"].foreach_dag.as_ref().unwrap();
    assert_eq!(first.nodes["work"].unique_id, "1_first.1_work");
    assert_eq!(second.nodes["work"].unique_id, "2_second.1_work");
}

#[test]
fn cyclic_reference_is_rejected() {
    let json = include_str!("fixtures/cyclic_reference.json");
    let definition = parse::parse(json).unwrap();
    let errors = build_dag(&definition).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "B003");
    assert_eq!(errors[0].message, "Cyclic dag reference: main -> inner -> main");
    assert_eq!(errors[0].node_id.as_deref(), Some("back"));
}

#[test]
fn doubling_references_hit_the_node_limit() {
    let json = include_str!("fixtures/doubling_reference.json");
    let definition = parse::parse(json).unwrap();
    let errors = build_dag(&definition).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "B008");
    assert_eq!(errors[0].message, "Definition expands beyond 10000 nodes");
    assert_eq!(errors[0].node_id.as_deref(), Some("b"));
}

#[test]
fn node_limit_counts_nested_dags() {
    let json = include_str!("fixtures/order_pipeline.json");
    let definition = parse::parse(json).unwrap();

    let exact = build_dag_with(&definition, &BuildOptions { node_limit: 9 });
    assert!(exact.is_ok(), "Nine expanded nodes should fit: {:?}", exact.err());

    let errors = build_dag_with(&definition, &BuildOptions { node_limit: 8 }).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "B008");
}

#[test]
fn missing_root_is_rejected() {
    let errors = parse::parse_and_build(r#"{"root": "main", "dags": {}}"#).unwrap_err();
    assert_eq!(errors[0].code, "B001");
}

#[test]
fn undefined_reference_is_rejected() {
    let json = r#"{
        "root": "main",
        "dags": {"main": {"nodes": [{"id": "a", "sub-dag": "nowhere"}]}}
    }"#;
    let errors = parse::parse_and_build(json).unwrap_err();
    assert_eq!(errors[0].code, "B002");
    assert_eq!(errors[0].node_id.as_deref(), Some("b"));
}

#[test]
fn conflicting_nesting_is_rejected() {
    let json = r#"{
        "root": "main",
        "dags": {
            "main": {"nodes": [{
                "id": "a",
                "sub-dag": "inner",
                "foreach": {"iterator": "split", "body": "inner"}
            }]},
            "inner": {"nodes": [{"id": "x"}]}
        }
    }"#;
    let errors = parse::parse_and_build(json).unwrap_err();
    assert_eq!(errors[0].code, "B006");
}

#[test]
fn dynamic_override_is_applied() {
    let json = r#"{
        "root": "main",
        "dags": {
            "main": {"nodes": [{"id": "late", "sub-dag": "inner", "dynamic": true}]},
            "inner": {"nodes": [{"id": "x"}]}
        }
    }"#;
    let pipeline = parse::parse_and_build(json).unwrap();
    let root = export_pipeline(&pipeline);
    let late = &root.nodes["late"];
    assert!(late.is_dynamic);
    assert!(!late.has_sub_dag);
}
