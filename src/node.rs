//! Element tree for the page-builder document.
//!
//! The host hands over its elements data as nested JSON (each element carries a
//! type, a settings object, and an `elements` child list). This module mirrors
//! that shape and provides the single authoritative traversal used by the
//! discovery pass: depth-first, document order, one visit per node.

use serde::{Deserialize, Serialize};

/// Widget type string the pipeline looks for in the element tree.
pub const TARGET_WIDGET_TYPE: &str = "cjs_js_widget";

/// Nesting depth past which traversal stops descending. The host tree is
/// acyclic by construction (owned values, no references), so this only bounds
/// pathological nesting from a corrupted document.
const MAX_TREE_DEPTH: usize = 64;

/// One element descriptor from the page-builder's document data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub el_type: String,
    #[serde(default)]
    pub widget_type: Option<String>,
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default)]
    pub elements: Vec<ComponentNode>,
}

impl ComponentNode {
    /// Whether this descriptor is an instance of the custom-JS widget.
    pub fn is_target_widget(&self) -> bool {
        self.widget_type.as_deref() == Some(TARGET_WIDGET_TYPE)
    }
}

/// Find every custom-JS widget in the tree, depth-first in document order.
pub fn find_target_widgets(nodes: &[ComponentNode]) -> Vec<&ComponentNode> {
    let mut found = Vec::new();

    fn traverse<'a>(node: &'a ComponentNode, depth: usize, found: &mut Vec<&'a ComponentNode>) {
        if depth > MAX_TREE_DEPTH {
            return;
        }
        if node.is_target_widget() {
            found.push(node);
        }
        for child in &node.elements {
            traverse(child, depth + 1, found);
        }
    }

    for node in nodes {
        traverse(node, 0, &mut found);
    }

    found
}
