//! Storage ↔ execution graph transform.
//!
//! `db` stores connections with `fromNodeId`/`toNodeId`/`fromOutput`/`toInput`
//! field names; the execution view (and the rest of this crate) uses
//! `source`/`target`/`sourceHandle`/`targetHandle`. This module is the only
//! place that rename happens.

use std::str::FromStr;

use db::models::{ConnectionRow, NodeRow, WorkflowRow};

use crate::error::EngineError;
use crate::models::{Edge, Node, NodeType, Position, Trigger, Workflow};

/// Convert one stored node row into its execution-shape [`Node`].
///
/// Fails with [`EngineError::ConfigError`] if the row's `node_type` isn't
/// in the registered enumeration — this check happens at load time, not
/// at save time, per the storage contract.
pub fn node_from_row(row: NodeRow) -> Result<Node, EngineError> {
    let node_type = NodeType::from_str(&row.node_type)
        .map_err(|_| EngineError::ConfigError(format!("unknown node type: {}", row.node_type)))?;

    let position: Position = serde_json::from_value(row.position).map_err(|e| {
        EngineError::ConfigError(format!("node '{}' has an invalid position: {e}", row.id))
    })?;

    Ok(Node {
        id: row.id,
        node_type,
        name: row.name,
        position,
        data: row.data,
    })
}

/// Rename one stored connection into its execution-shape [`Edge`].
///
/// Implements the field rename spec §3 requires:
/// `fromNodeId → source`, `toNodeId → target`,
/// `fromOutput → sourceHandle`, `toInput → targetHandle`.
pub fn edge_from_connection(row: ConnectionRow) -> Edge {
    Edge {
        source: row.from_node_id,
        target: row.to_node_id,
        source_handle: row.from_output,
        target_handle: row.to_input,
    }
}

/// Rename a whole batch of connections to edges (`toExecutionEdges`).
pub fn to_execution_edges(rows: Vec<ConnectionRow>) -> Vec<Edge> {
    rows.into_iter().map(edge_from_connection).collect()
}

/// Split a [`Trigger`] into the `(trigger_type, trigger_config)` columns it's
/// stored as — the inverse of [`trigger_from_row`].
pub fn trigger_to_row_fields(trigger: &Trigger) -> (&'static str, serde_json::Value) {
    match trigger {
        Trigger::Manual => ("manual", serde_json::json!({})),
        Trigger::Webhook { path } => ("webhook", serde_json::json!({ "path": path })),
        Trigger::Cron { expression } => ("cron", serde_json::json!({ "expression": expression })),
    }
}

/// Parse a workflow row's `trigger_type`/`trigger_config` columns into a [`Trigger`].
pub fn trigger_from_row(workflow_row: &WorkflowRow) -> Result<Trigger, EngineError> {
    let tagged = serde_json::json!({
        "type": workflow_row.trigger_type,
        // Cron/Webhook variants carry their fields inline (serde internal
        // tagging), so splice trigger_config's keys alongside "type".
    });

    let mut tagged = match tagged {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    if let serde_json::Value::Object(config) = &workflow_row.trigger_config {
        for (k, v) in config {
            tagged.insert(k.clone(), v.clone());
        }
    }

    serde_json::from_value(serde_json::Value::Object(tagged)).map_err(|e| {
        EngineError::ConfigError(format!(
            "workflow '{}' has an invalid trigger ({}/{}): {e}",
            workflow_row.id, workflow_row.trigger_type, workflow_row.trigger_config
        ))
    })
}

/// Assemble the full execution-shape [`Workflow`] from its three storage rows.
pub fn to_execution_graph(
    workflow_row: WorkflowRow,
    node_rows: Vec<NodeRow>,
    connection_rows: Vec<ConnectionRow>,
) -> Result<Workflow, EngineError> {
    let trigger = trigger_from_row(&workflow_row)?;

    let nodes = node_rows
        .into_iter()
        .map(node_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let edges = to_execution_edges(connection_rows);

    for edge in &edges {
        if !nodes.iter().any(|n| n.id == edge.source) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.source.clone(),
                side: "source",
            });
        }
        if !nodes.iter().any(|n| n.id == edge.target) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.target.clone(),
                side: "target",
            });
        }
    }

    Ok(Workflow {
        id: workflow_row.id,
        name: workflow_row.name,
        user_id: workflow_row.user_id,
        trigger,
        nodes,
        edges,
        created_at: workflow_row.created_at,
        updated_at: workflow_row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn unknown_node_type_fails_fast_at_load() {
        let row = NodeRow {
            id: "n1".into(),
            workflow_id: Uuid::new_v4(),
            name: "n1".into(),
            node_type: "SOMETHING_WEIRD".into(),
            position: json!({"x": 0.0, "y": 0.0}),
            data: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(matches!(node_from_row(row), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn connection_fields_rename_to_edge_fields() {
        let row = ConnectionRow {
            id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            from_node_id: "a".into(),
            to_node_id: "b".into(),
            from_output: "main".into(),
            to_input: "main".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let edge = edge_from_connection(row);
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(edge.source_handle, "main");
        assert_eq!(edge.target_handle, "main");
    }

    fn workflow_row_with_trigger(trigger_type: &str, trigger_config: serde_json::Value) -> WorkflowRow {
        WorkflowRow {
            id: Uuid::new_v4(),
            name: "wf".into(),
            user_id: Uuid::new_v4(),
            trigger_type: trigger_type.into(),
            trigger_config,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn manual_trigger_round_trips() {
        let row = workflow_row_with_trigger("manual", json!({}));
        assert_eq!(trigger_from_row(&row).unwrap(), Trigger::Manual);
    }

    #[test]
    fn webhook_trigger_carries_path() {
        let row = workflow_row_with_trigger("webhook", json!({"path": "my-hook"}));
        assert_eq!(
            trigger_from_row(&row).unwrap(),
            Trigger::Webhook { path: "my-hook".into() }
        );
    }

    #[test]
    fn cron_trigger_carries_expression() {
        let row = workflow_row_with_trigger("cron", json!({"expression": "0 * * * *"}));
        assert_eq!(
            trigger_from_row(&row).unwrap(),
            Trigger::Cron { expression: "0 * * * *".into() }
        );
    }

    #[test]
    fn malformed_trigger_config_is_a_config_error() {
        let row = workflow_row_with_trigger("webhook", json!({}));
        assert!(matches!(trigger_from_row(&row), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn trigger_round_trips_through_row_fields() {
        for trigger in [
            Trigger::Manual,
            Trigger::Webhook { path: "my-hook".into() },
            Trigger::Cron { expression: "*/5 * * * *".into() },
        ] {
            let (trigger_type, trigger_config) = trigger_to_row_fields(&trigger);
            let row = workflow_row_with_trigger(trigger_type, trigger_config);
            assert_eq!(trigger_from_row(&row).unwrap(), trigger);
        }
    }
}
