//! Topological scheduling — run this before dispatching any executor.
//!
//! Rules enforced:
//! 1. Node IDs must be unique within the workflow.
//! 2. Every edge must reference valid node IDs (both `source` and `target`).
//! 3. The directed graph must be acyclic (topological sort must succeed).
//! 4. Isolated nodes (referenced by no edge) still appear in the output.
//! 5. Ties among nodes with no mutual dependency are broken by original
//!    input order, so the same `(nodes, edges)` always produces the same
//!    order — including the empty-connections fast path, where the output
//!    must equal the input sequence exactly.
//!
//! Returns the input nodes in a valid execution order on success.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::EngineError;
use crate::models::{Edge, Node};

/// Validate the workflow's DAG and return nodes in topological execution order.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::UnknownNodeReference`] if an edge references a missing node.
/// - [`EngineError::CycleError`] if the graph is not acyclic.
pub fn topological_sort(nodes: &[Node], edges: &[Edge]) -> Result<Vec<Node>, EngineError> {
    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique, and build a stable index → position map.
    // -----------------------------------------------------------------------
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in nodes {
        if !seen_ids.insert(node.id.as_str()) {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    let index_of: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    // -----------------------------------------------------------------------
    // 2. Validate edge endpoints.
    // -----------------------------------------------------------------------
    for edge in edges {
        if !index_of.contains_key(edge.source.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.source.clone(),
                side: "source",
            });
        }
        if !index_of.contains_key(edge.target.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.target.clone(),
                side: "target",
            });
        }
    }

    // -----------------------------------------------------------------------
    // 3. Kahn's algorithm over dense index arrays, with a min-heap ordered
    //    by original input position so ties resolve deterministically — this
    //    is what makes the empty-connections case return nodes in their
    //    given order rather than whatever a HashMap happens to iterate in.
    // -----------------------------------------------------------------------
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut in_degree: Vec<usize> = vec![0; nodes.len()];

    for edge in edges {
        let from = index_of[edge.source.as_str()];
        let to = index_of[edge.target.as_str()];
        adjacency[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order: Vec<usize> = Vec::with_capacity(nodes.len());

    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &next in &adjacency[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() != nodes.len() {
        return Err(EngineError::CycleError);
    }

    Ok(order.into_iter().map(|i| nodes[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeType, Position};

    fn make_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            node_type: NodeType::ManualTrigger,
            name: id.to_string(),
            position: Position::ORIGIN,
            data: serde_json::Value::Null,
        }
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            source: from.to_string(),
            target: to.to_string(),
            source_handle: "main".to_string(),
            target_handle: "main".to_string(),
        }
    }

    #[test]
    fn linear_chain_sorts_in_order() {
        let nodes = vec![make_node("a"), make_node("b"), make_node("c")];
        let edges = vec![edge("a", "b"), edge("b", "c")];
        let sorted = topological_sort(&nodes, &edges).unwrap();
        let ids: Vec<_> = sorted.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_respects_partial_order() {
        let nodes = vec![make_node("t"), make_node("a"), make_node("b"), make_node("c")];
        let edges = vec![edge("t", "a"), edge("t", "b"), edge("a", "c"), edge("b", "c")];
        let sorted = topological_sort(&nodes, &edges).unwrap();
        let ids: Vec<_> = sorted.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"t"));
        assert_eq!(ids.last(), Some(&"c"));
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().position(|&x| x == "a").unwrap() < ids.iter().position(|&x| x == "c").unwrap());
        assert!(ids.iter().position(|&x| x == "b").unwrap() < ids.iter().position(|&x| x == "c").unwrap());
    }

    #[test]
    fn empty_connections_preserves_input_order() {
        let nodes = vec![make_node("z"), make_node("a"), make_node("m")];
        let sorted = topological_sort(&nodes, &[]).unwrap();
        let ids: Vec<_> = sorted.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn isolated_node_is_included() {
        let nodes = vec![make_node("a"), make_node("b"), make_node("c")];
        let edges = vec![edge("a", "b")];
        let sorted = topological_sort(&nodes, &edges).unwrap();
        assert_eq!(sorted.len(), 3);
        let ids: Vec<_> = sorted.iter().map(|n| n.id.as_str()).collect();
        assert!(ids.iter().position(|&x| x == "a").unwrap() < ids.iter().position(|&x| x == "b").unwrap());
        assert!(ids.contains(&"c"));
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let nodes = vec![make_node("a"), make_node("a")];
        assert!(matches!(
            topological_sort(&nodes, &[]),
            Err(EngineError::DuplicateNodeId(id)) if id == "a"
        ));
    }

    #[test]
    fn edge_referencing_missing_node_is_rejected() {
        let nodes = vec![make_node("a")];
        let edges = vec![edge("a", "ghost")];
        assert!(matches!(
            topological_sort(&nodes, &edges),
            Err(EngineError::UnknownNodeReference { node_id, .. }) if node_id == "ghost"
        ));
    }

    #[test]
    fn cycle_is_detected_before_any_node_would_run() {
        let nodes = vec![make_node("x"), make_node("y")];
        let edges = vec![edge("x", "y"), edge("y", "x")];
        assert!(matches!(topological_sort(&nodes, &edges), Err(EngineError::CycleError)));
    }

    #[test]
    fn single_node_no_edges_is_valid() {
        let nodes = vec![make_node("solo")];
        let sorted = topological_sort(&nodes, &[]).unwrap();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].id, "solo");
    }
}
