//! Conversion between user records and document nodes.
//!
//! A record implements [`Marshal`] to become a node and [`Unmarshal`] to be
//! rebuilt from one. The batch helpers are all-or-nothing: converted nodes are
//! staged and only appended once every record has converted.
//!
//! # Example
//! ```
//! use kdl_tree::accessor::{as_i64, as_string, get, get_child_value};
//! use kdl_tree::{unmarshal_all, Document, Node, Result, Unmarshal};
//!
//! struct Host {
//!     name: String,
//!     port: i64,
//! }
//!
//! impl Unmarshal for Host {
//!     fn unmarshal_kdl(node: &Node) -> Result<Self> {
//!         Ok(Host {
//!             name: get(node, 0, as_string)?,
//!             port: get_child_value(node, "port", as_i64)?,
//!         })
//!     }
//! }
//!
//! let mut host = Node::new("host").with_argument("example1");
//! host.push_kv("port", 22);
//! let doc = Document::from_nodes([host]);
//!
//! let hosts: Vec<Host> = unmarshal_all(doc.nodes()).unwrap();
//! assert_eq!(hosts[0].name, "example1");
//! assert_eq!(hosts[0].port, 22);
//! ```

use tracing::debug;

use crate::error::Result;
use crate::node::{Document, Node};

/// A record that can produce a node.
pub trait Marshal {
    fn marshal_kdl(&self) -> Result<Node>;
}

/// A record that can produce a whole document.
pub trait MarshalDocument {
    fn marshal_kdl_document(&self) -> Result<Document>;
}

/// A record that can be rebuilt from a node.
pub trait Unmarshal: Sized {
    fn unmarshal_kdl(node: &Node) -> Result<Self>;
}

/// A record that can be rebuilt from a whole document.
pub trait UnmarshalDocument: Sized {
    fn unmarshal_kdl_document(doc: &Document) -> Result<Self>;
}

impl<M: Marshal + ?Sized> Marshal for &M {
    fn marshal_kdl(&self) -> Result<Node> {
        (**self).marshal_kdl()
    }
}

impl<M: Marshal + ?Sized> Marshal for Box<M> {
    fn marshal_kdl(&self) -> Result<Node> {
        (**self).marshal_kdl()
    }
}

impl Marshal for Node {
    fn marshal_kdl(&self) -> Result<Node> {
        Ok(self.clone())
    }
}

impl Unmarshal for Node {
    fn unmarshal_kdl(node: &Node) -> Result<Self> {
        Ok(node.clone())
    }
}

impl MarshalDocument for Document {
    fn marshal_kdl_document(&self) -> Result<Document> {
        Ok(self.clone())
    }
}

impl UnmarshalDocument for Document {
    fn unmarshal_kdl_document(doc: &Document) -> Result<Self> {
        Ok(doc.clone())
    }
}

fn stage<M: Marshal>(records: impl IntoIterator<Item = M>) -> Result<Vec<Node>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .marshal_kdl()
                .map_err(|e| e.context(format!("marshalling record {i}")))
        })
        .collect()
}

impl Document {
    /// Marshal each record and append the resulting nodes. On the first
    /// failure nothing is appended.
    pub fn marshal_nodes<M: Marshal>(&mut self, records: impl IntoIterator<Item = M>) -> Result<()> {
        let staged = stage(records)?;
        debug!(count = staged.len(), "marshalled top-level nodes");
        self.nodes.extend(staged);
        Ok(())
    }
}

impl Node {
    /// Marshal each record and append the resulting nodes as children. On the
    /// first failure nothing is appended.
    pub fn marshal_children<M: Marshal>(&mut self, records: impl IntoIterator<Item = M>) -> Result<()> {
        let staged = stage(records)?;
        debug!(count = staged.len(), parent = %self.name, "marshalled child nodes");
        self.children.extend(staged);
        Ok(())
    }
}

/// Unmarshal every node, or return the first failure and nothing else.
pub fn unmarshal_all<'n, T: Unmarshal>(nodes: impl IntoIterator<Item = &'n Node>) -> Result<Vec<T>> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            T::unmarshal_kdl(node)
                .map_err(|e| e.context(format!("unmarshalling node {i} ({})", node.name)))
        })
        .collect()
}
