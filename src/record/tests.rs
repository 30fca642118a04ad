use super::*;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, StringArray};

fn chain(id: i64) -> Skeleton {
    Skeleton::new(
        id,
        vec![
            SkeletonNode::root(1, 0.0, 0.0, 0.0),
            SkeletonNode::new(2, 1, 1.0, 0.0, 0.0),
            SkeletonNode::new(3, 2, 2.0, 0.0, 0.0),
            SkeletonNode::new(4, 2, 2.0, 1.0, 0.0),
        ],
    )
}

#[test]
fn test_root_sentinel_maps_to_none() {
    let node = SkeletonNode::new(7, ROOT_PARENT, 0.0, 0.0, 0.0);
    assert!(node.is_root());
    assert_eq!(node.stored_parent(), -1);

    let child = SkeletonNode::new(8, 7, 0.0, 0.0, 0.0);
    assert_eq!(child.parent_id, Some(7));
}

#[test]
fn test_graph_adjacency() {
    let skeleton = chain(1);
    let graph = skeleton.graph().expect("valid tree");

    assert_eq!(graph.roots(), &[1]);
    assert_eq!(graph.children(2), &[3, 4]);
    assert_eq!(graph.parent(3), Some(2));
    assert_eq!(graph.parent(1), None);
    let leaves: Vec<i64> = graph.leaves(&skeleton.nodes).collect();
    assert_eq!(leaves, vec![3, 4]);
}

#[test]
fn test_graph_forest_with_two_roots() {
    let nodes = vec![
        SkeletonNode::root(1, 0.0, 0.0, 0.0),
        SkeletonNode::root(10, 5.0, 0.0, 0.0),
        SkeletonNode::new(11, 10, 6.0, 0.0, 0.0),
    ];
    let graph = SkeletonGraph::build(&nodes).expect("forest is valid");
    assert_eq!(graph.roots(), &[1, 10]);
}

#[test]
fn test_graph_detects_cycle() {
    let nodes = vec![
        SkeletonNode::root(1, 0.0, 0.0, 0.0),
        SkeletonNode::new(2, 3, 0.0, 0.0, 0.0),
        SkeletonNode::new(3, 2, 0.0, 0.0, 0.0),
    ];
    let errors = SkeletonGraph::build(&nodes).expect_err("cycle must fail");
    assert_eq!(errors, vec![GraphError::Cycle(vec![2, 3])]);
}

#[test]
fn test_graph_detects_self_loop() {
    let nodes = vec![SkeletonNode::new(5, 5, 0.0, 0.0, 0.0)];
    let errors = SkeletonGraph::build(&nodes).expect_err("self loop must fail");
    assert_eq!(errors, vec![GraphError::Cycle(vec![5])]);
}

#[test]
fn test_graph_collects_all_violations() {
    let nodes = vec![
        SkeletonNode::root(1, 0.0, 0.0, 0.0),
        SkeletonNode::new(1, 1, 0.0, 0.0, 0.0),
        SkeletonNode::new(2, 99, 0.0, 0.0, 0.0),
        SkeletonNode::new(3, 2, 0.0, 0.0, 0.0),
    ];
    let errors = SkeletonGraph::build(&nodes).expect_err("must fail");
    assert!(errors.contains(&GraphError::DuplicateNode(1)));
    assert!(errors.contains(&GraphError::DanglingParent { node: 2, parent: 99 }));
    // Node 3 hangs below the dangling node and is not reported as a cycle
    assert!(!errors.iter().any(|e| matches!(e, GraphError::Cycle(ids) if ids.contains(&3))));
}

#[test]
fn test_record_id_coercion() {
    assert_eq!(RecordId::from(12345).coerce(IdType::Str), Some(RecordId::from("12345")));
    assert_eq!(RecordId::from("67890").coerce(IdType::Int), Some(RecordId::Int(67890)));
    assert_eq!(RecordId::from("abc").coerce(IdType::Int), None);
    assert_eq!(RecordId::parse_as("-3", IdType::Int), Some(RecordId::Int(-3)));
    assert_eq!(RecordId::from("a:b").to_string(), "a:b");
}

#[test]
fn test_id_type_from_arrow() {
    use arrow::datatypes::DataType;
    assert_eq!(IdType::from_data_type(&DataType::Int32), Some(IdType::Int));
    assert_eq!(IdType::from_data_type(&DataType::Utf8), Some(IdType::Str));
    assert_eq!(IdType::from_data_type(&DataType::Float64), None);
    assert_eq!(IdType::parse(IdType::Int.as_str()), Some(IdType::Int));
}

#[test]
fn test_dotprops_unordered_equality() {
    let a = Dotprops::new("d1", vec![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]])
        .with_vectors(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let b = Dotprops::new("d1", vec![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0]])
        .with_vectors(vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
    assert!(a.eq_unordered(&b));
    assert_ne!(a, b);

    let c = b.clone().with_alpha(vec![0.5, 0.5]);
    assert!(!a.eq_unordered(&c));
}

#[test]
fn test_extra_columns_replace_and_compare() {
    let labels: ArrayRef = Arc::new(StringArray::from(vec!["soma", "axon"]));
    let mut extra = ExtraColumns::new().with("label", labels.clone());
    extra.insert("compartment", Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef);
    extra.insert("compartment", Arc::new(Int32Array::from(vec![3, 4])) as ArrayRef);

    assert_eq!(extra.len(), 2);
    assert_eq!(extra.names().collect::<Vec<_>>(), vec!["label", "compartment"]);

    let same = ExtraColumns::new()
        .with("compartment", Arc::new(Int32Array::from(vec![3, 4])) as ArrayRef)
        .with("label", labels);
    assert_eq!(extra, same);
}

#[test]
fn test_neuron_accessors() {
    let neuron: Neuron = chain(42).into();
    assert_eq!(neuron.id(), &RecordId::Int(42));
    assert_eq!(neuron.kind(), NeuronKind::Skeleton);
    assert_eq!(neuron.row_count(), 4);
    assert!(neuron.as_dotprops().is_none());
    assert_eq!(NeuronKind::parse("dotprops"), Some(NeuronKind::Dotprops));
}
