//! Document tree -> event sink.
//!
//! The emitter walks the tree depth-first and drives an [`EventSink`]:
//!
//! - node start, with the node's type annotation
//! - arguments in their original order
//! - properties sorted by key, so output is stable regardless of the order
//!   the properties were inserted in
//! - a children block, only when the node has children or its
//!   `emit_empty_children` hint is set
//! - node end
//!
//! The first sink failure stops the walk and is returned as is.

use tracing::debug;

use crate::error::Result;
use crate::event::{Event, EventRecorder, EventSink};
use crate::node::{Document, Node};
use crate::value::Value;

/// Drives an [`EventSink`] from a document tree.
pub struct Emitter<K> {
    sink: K,
}

impl<K: EventSink> Emitter<K> {
    pub fn new(sink: K) -> Self {
        Emitter { sink }
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Emit every top-level node, then the document end.
    pub fn emit_document(&mut self, doc: &Document) -> Result<()> {
        for node in doc.nodes() {
            self.emit_node(node)?;
        }
        self.sink.end_document()?;
        debug!(nodes = doc.len(), "emitted document");
        Ok(())
    }

    /// Emit a single node and its subtree.
    pub fn emit_node(&mut self, node: &Node) -> Result<()> {
        self.sink.start_node(&node.name, node.type_annotation.as_deref())?;

        for arg in &node.arguments {
            self.sink.argument(arg)?;
        }

        for (key, value) in sorted_properties(node) {
            self.sink.property(key, value)?;
        }

        if !node.children.is_empty() || node.hints.emit_empty_children {
            self.sink.start_children()?;
            for child in &node.children {
                self.emit_node(child)?;
            }
            self.sink.end_children()?;
        }

        self.sink.end_node()
    }
}

/// Properties in lexicographic key order. The node itself is left untouched.
fn sorted_properties(node: &Node) -> Vec<(&str, &Value)> {
    let mut props: Vec<_> = node
        .properties()
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    props.sort_unstable_by(|a, b| a.0.cmp(b.0));
    props
}

/// Emit a document into any sink.
pub fn emit_document<K: EventSink>(sink: K, doc: &Document) -> Result<K> {
    let mut emitter = Emitter::new(sink);
    emitter.emit_document(doc)?;
    Ok(emitter.into_sink())
}

impl Document {
    /// The canonical event sequence for this document, ending in `Eof`.
    pub fn to_events(&self) -> Result<Vec<Event>> {
        emit_document(EventRecorder::new(), self).map(EventRecorder::into_events)
    }
}
