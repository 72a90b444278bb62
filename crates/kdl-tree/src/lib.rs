//! # kdl-tree
//!
//! In-memory document tree for **KDL**, with a builder that turns a stream of
//! parse events into a tree and an emitter that flattens a tree back into a
//! canonical event stream.
//!
//! Text tokenizing lives outside this crate: anything that can produce the
//! event grammar in [`event`] can feed the builder, and anything that accepts
//! it can receive the emitter's output. [`TextSink`] is the bundled sink for
//! canonical KDL v2 text.
//!
//! ## Quick start
//!
//! ```rust
//! use kdl_tree::accessor::{as_i64, get_child_value};
//! use kdl_tree::{to_kdl_string, Document, Event};
//!
//! let doc = Document::from_events(vec![
//!     Event::start_node("host"),
//!     Event::argument("example1"),
//!     Event::start_node("port"),
//!     Event::argument(22),
//!     Event::end_node(),
//!     Event::end_node(),
//!     Event::eof(),
//! ])
//! .unwrap();
//!
//! let host = &doc.nodes()[0];
//! assert_eq!(get_child_value(host, "port", as_i64).unwrap(), 22);
//! assert_eq!(
//!     to_kdl_string(&doc).unwrap(),
//!     "host example1 {\n    port 22\n}\n"
//! );
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `Value` and its closed set of scalar kinds
//! - [`node`]: `Node`, `Document` and the `NodeRef` parent-aware handle
//! - [`accessor`]: typed extractors, `get`/`set`, `cast_all`
//! - [`event`]: the event grammar, `EventSource`/`EventSink`
//! - [`builder`]: event stream -> document
//! - [`emitter`]: document -> event sink
//! - [`marshal`]: record <-> node conversion traits
//! - [`text`]: canonical KDL text sink
//! - [`print`]: parenthesized diagnostic form
//! - [`error`]: `KdlError`

pub mod accessor;
pub mod builder;
pub mod emitter;
pub mod error;
pub mod event;
pub mod marshal;
pub mod node;
pub mod print;
pub mod text;
pub mod value;

pub use builder::{parse_document, TreeBuilder};
pub use emitter::{emit_document, Emitter};
pub use error::{KdlError, Result};
pub use event::{Event, EventKind, EventRecorder, EventSink, EventSource, EventStream};
pub use marshal::{unmarshal_all, Marshal, MarshalDocument, Unmarshal, UnmarshalDocument};
pub use node::{Document, EmitHints, Node, NodeRef, KV};
pub use print::{print_document, Printer};
pub use text::{to_kdl_string, to_kdl_string_with, KdlVersion, TextSink};
pub use value::{Value, ValueKind};
