//! The executor registry — process-wide map from [`NodeType`] to executor.
//!
//! Registration is static, done once at process start (see `cli`'s `serve`
//! and `worker` setup). Lookup is total over the enumeration: an
//! unregistered type fails with [`EngineError::ConfigError`], not a panic.

use std::collections::HashMap;
use std::sync::Arc;

use nodes::ExecutableNode;

use crate::error::EngineError;
use crate::models::NodeType;

/// Maps [`NodeType`] to a boxed [`ExecutableNode`] implementation.
pub struct Registry {
    executors: HashMap<NodeType, Arc<dyn ExecutableNode>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Register `executor` for `node_type`. Overwrites any prior registration.
    pub fn register(&mut self, node_type: NodeType, executor: Arc<dyn ExecutableNode>) {
        self.executors.insert(node_type, executor);
    }

    /// Look up the executor for `node_type`.
    ///
    /// # Errors
    /// [`EngineError::ConfigError`] if no executor is registered for this type.
    pub fn get(&self, node_type: NodeType) -> Result<&Arc<dyn ExecutableNode>, EngineError> {
        self.executors
            .get(&node_type)
            .ok_or_else(|| EngineError::ConfigError(format!("No executor for type {node_type}")))
    }

    /// Build the registry with the reference executors wired up:
    /// `HTTP_REQUEST` gets its own executor, and both `MANUAL_TRIGGER` and
    /// `INITIAL` alias the same manual-trigger executor instance.
    pub fn with_reference_executors() -> Self {
        Self::with_http_timeout(nodes::http_request::DEFAULT_TIMEOUT)
    }

    /// Same as [`Self::with_reference_executors`], but wires the configured
    /// per-request timeout (`HTTP_REQUEST_TIMEOUT_SECS`) into the HTTP
    /// executor instead of its hardcoded default.
    pub fn with_http_timeout(timeout: std::time::Duration) -> Self {
        let mut registry = Self::new();
        let manual_trigger: Arc<dyn ExecutableNode> = Arc::new(nodes::ManualTriggerNode);
        registry.register(NodeType::ManualTrigger, manual_trigger.clone());
        registry.register(NodeType::Initial, manual_trigger);
        registry.register(NodeType::HttpRequest, Arc::new(nodes::HttpRequestNode::with_timeout(timeout)));
        registry
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_reference_executors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_type_is_a_config_error() {
        let registry = Registry::new();
        let err = registry.get(NodeType::HttpRequest).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert!(err.to_string().contains("No executor for type HTTP_REQUEST"));
    }

    #[test]
    fn initial_aliases_manual_trigger() {
        let registry = Registry::with_reference_executors();
        assert!(registry.get(NodeType::ManualTrigger).is_ok());
        assert!(registry.get(NodeType::Initial).is_ok());
        assert!(registry.get(NodeType::HttpRequest).is_ok());
    }
}
