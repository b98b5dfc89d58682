use std::sync::{Arc, RwLock};

use super::RuleGraph;

/// Shared slot holding the currently published rule graph.
///
/// Readers clone the inner `Arc` and release the lock immediately, so a
/// request keeps using the graph it started with even if a newer one is
/// published mid-flight. The old graph is dropped once its last reader ends.
#[derive(Debug, Clone, Default)]
pub struct RuleGraphHandle {
    current: Arc<RwLock<Option<Arc<RuleGraph>>>>,
}

impl RuleGraphHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle with a graph already published.
    pub fn with_graph(graph: RuleGraph) -> Self {
        let handle = Self::new();
        handle.publish(graph);
        handle
    }

    /// Replaces the current graph. Returns the newly published snapshot.
    pub fn publish(&self, graph: RuleGraph) -> Arc<RuleGraph> {
        let graph = Arc::new(graph);
        let mut slot = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::clone(&graph));
        graph
    }

    /// The current graph, or `None` if nothing was ever published.
    pub fn current(&self) -> Option<Arc<RuleGraph>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn current_version(&self) -> Option<String> {
        self.current().map(|g| g.version().to_string())
    }
}
