//! The document tree: nodes with arguments, properties, and owned children.
//!
//! Children are owned by their parent through a plain `Vec<Node>`. Nodes do not
//! store a pointer to their parent; traversal that needs the parent uses the
//! borrowed [`NodeRef`] handle, which keeps the ownership graph a tree.
//!
//! # Example
//! ```
//! use kdl_tree::{Document, Node};
//!
//! let mut doc = Document::new();
//! doc.push_node(
//!     Node::new("host")
//!         .with_argument("example1")
//!         .with_child(Node::kv("user", "root"))
//!         .with_child(Node::kv("port", 22)),
//! );
//!
//! let host = doc.node("host").unwrap();
//! let kvs: Vec<_> = host.kvs().iter().map(|kv| kv.key).collect();
//! assert_eq!(kvs, ["user", "port"]);
//! ```

use indexmap::IndexMap;

use crate::value::Value;

/// Per-node hints for the emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitHints {
    /// Emit an explicit `{}` block when the node has no children.
    pub emit_empty_children: bool,
}

/// A KDL node.
///
/// Properties are kept in first-insertion order; setting an existing key
/// replaces its value without moving it. The order is what the diagnostic
/// printer shows. The emitter sorts keys instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub type_annotation: Option<String>,
    pub arguments: Vec<Value>,
    properties: IndexMap<String, Value>,
    pub children: Vec<Node>,
    pub hints: EmitHints,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            type_annotation: None,
            arguments: Vec::new(),
            properties: IndexMap::new(),
            children: Vec::new(),
            hints: EmitHints::default(),
        }
    }

    /// A node with a single argument, the usual shape of a key/value child.
    pub fn kv(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Node::new(name).with_argument(value)
    }

    pub fn with_type_annotation(mut self, ty: impl Into<String>) -> Self {
        self.type_annotation = Some(ty.into());
        self
    }

    pub fn with_argument(mut self, value: impl Into<Value>) -> Self {
        self.push_argument(value);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_property(key, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    pub fn push_argument(&mut self, value: impl Into<Value>) -> &mut Self {
        self.arguments.push(value.into());
        self
    }

    /// Insert or replace a property. A new key goes to the end of the
    /// property order; an existing key keeps its position.
    pub fn insert_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn push_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Append a single-argument child named `name`.
    pub fn push_kv(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push_child(Node::kv(name, value))
    }

    /// Append a new empty child and return it for further building.
    pub fn new_child(&mut self, name: impl Into<String>) -> &mut Node {
        self.children.push(Node::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn extend_children(&mut self, children: impl IntoIterator<Item = Node>) -> &mut Self {
        self.children.extend(children);
        self
    }

    /// Build children in a scratch document and append all of its nodes.
    pub fn children_from(&mut self, build: impl FnOnce(&mut Document)) -> &mut Self {
        let mut scratch = Document::new();
        build(&mut scratch);
        self.extend_children(scratch.nodes)
    }

    pub fn set_emit_empty_children(&mut self, emit: bool) -> &mut Self {
        self.hints.emit_empty_children = emit;
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Property keys in first-insertion order.
    pub fn property_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys().map(String::as_str)
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// All children with the given name, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Children that carry exactly one argument, as key/value pairs.
    pub fn kvs(&self) -> Vec<KV<'_>> {
        self.children
            .iter()
            .filter_map(|child| match child.arguments.as_slice() {
                [only] => Some(KV {
                    key: &child.name,
                    value: only,
                }),
                _ => None,
            })
            .collect()
    }
}

/// A child node viewed as a key/value pair: its name and sole argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KV<'a> {
    pub key: &'a str,
    pub value: &'a Value,
}

/// An ordered collection of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Document { nodes: Vec::new() }
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Document {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn push_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First top-level node with the given name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Top-level nodes as traversal handles (no parent).
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.nodes.iter().map(NodeRef::root)
    }

    /// Visit every node depth-first, parents before children.
    pub fn visit(&self, mut f: impl FnMut(&NodeRef<'_>)) {
        for root in self.roots() {
            root.visit(&mut f);
        }
    }
}

/// Borrowed traversal handle: a node plus a non-owning link to the handle of
/// its parent.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
    depth: usize,
}

impl<'a> NodeRef<'a> {
    /// A handle for a node treated as a root.
    pub fn root(node: &'a Node) -> Self {
        NodeRef {
            node,
            parent: None,
            depth: 0,
        }
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Number of ancestors; top-level nodes are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children<'b>(&'b self) -> impl Iterator<Item = NodeRef<'b>> + 'b {
        self.node.children.iter().map(move |child| NodeRef {
            node: child,
            parent: Some(self),
            depth: self.depth + 1,
        })
    }

    /// Names from the top-level ancestor down to this node.
    pub fn path(&self) -> Vec<&'a str> {
        let mut names = vec![self.node.name.as_str()];
        let mut cursor = self.parent;
        while let Some(parent) = cursor {
            names.push(parent.node.name.as_str());
            cursor = parent.parent;
        }
        names.reverse();
        names
    }

    /// Visit this node and its descendants depth-first.
    pub fn visit(&self, f: &mut impl FnMut(&NodeRef<'_>)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }
}

impl std::ops::Deref for NodeRef<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.node
    }
}
