//! Event stream -> document tree.
//!
//! The builder reads one event of lookahead from an [`EventSource`] and
//! descends recursively: a node is a `StartNode`, then any mix of `Argument`
//! and `Property` events, then child nodes, then a closing `EndNode`. The
//! document is a run of nodes terminated by `Eof`.
//!
//! Any deviation fails the whole document with a structural error; a
//! `ParseError` event from the source fails it with [`KdlError::Parse`]. There
//! is no recovery and no partial result.

use tracing::{debug, trace};

use crate::error::{KdlError, Result};
use crate::event::{Event, EventKind, EventSource, EventStream};
use crate::node::{Document, Node};
use crate::value::ValueKind;

/// Builds a [`Document`] from an event source.
pub struct TreeBuilder<S> {
    source: S,
    current: Option<Event>,
}

impl<S: EventSource> TreeBuilder<S> {
    pub fn new(source: S) -> Self {
        TreeBuilder {
            source,
            current: None,
        }
    }

    /// Consume the whole stream and return the document.
    pub fn parse_document(mut self) -> Result<Document> {
        self.advance()?;

        let mut doc = Document::new();
        while self.peek() == Some(EventKind::StartNode) {
            let node = self.next_node(None, 0)?;
            doc.push_node(node);
        }
        self.accept(EventKind::Eof)?;

        debug!(nodes = doc.len(), "parsed document");
        Ok(doc)
    }

    /// Build the node starting at the current `StartNode` event, including all
    /// of its children.
    fn next_node(&mut self, parent: Option<&str>, depth: usize) -> Result<Node> {
        let start = self.accept(EventKind::StartNode)?;
        trace!(name = %start.name, parent, depth, "start node");

        let mut node = Node::new(start.name);
        match start.value.kind() {
            ValueKind::Null => {
                node.type_annotation = start.value.type_annotation().map(str::to_owned);
            }
            _ => {
                return Err(KdlError::UnexpectedNodeValue {
                    found: start.value.kind_name(),
                })
            }
        }

        loop {
            match self.peek() {
                Some(EventKind::Argument) => {
                    let arg = self.accept(EventKind::Argument)?;
                    node.arguments.push(arg.value);
                }
                Some(EventKind::Property) => {
                    let prop = self.accept(EventKind::Property)?;
                    if node.property(&prop.name).is_some() {
                        trace!(key = %prop.name, node = %node.name, "duplicate property, last value wins");
                    }
                    node.insert_property(prop.name, prop.value);
                }
                _ => break,
            }
        }

        while self.peek() == Some(EventKind::StartNode) {
            let child = self.next_node(Some(&node.name), depth + 1)?;
            node.children.push(child);
        }

        self.accept(EventKind::EndNode)?;
        trace!(name = %node.name, depth, "end node");
        Ok(node)
    }

    fn peek(&self) -> Option<EventKind> {
        self.current.as_ref().map(|ev| ev.kind)
    }

    /// Pull the next event into the lookahead slot. Never pulls past `Eof`.
    fn advance(&mut self) -> Result<()> {
        if self.peek() == Some(EventKind::Eof) {
            return Ok(());
        }
        let event = self.source.next_event()?;
        if event.kind == EventKind::ParseError {
            debug!(reason = %event.name, "event source reported a parse error");
            self.current = None;
            return Err(KdlError::Parse(event.name));
        }
        trace!(%event, "-->");
        self.current = Some(event);
        Ok(())
    }

    /// Take the lookahead event if it has the expected kind and advance.
    fn accept(&mut self, expected: EventKind) -> Result<Event> {
        let found = self.peek();
        if found != Some(expected) {
            let found = found.map_or("no event", EventKind::name);
            trace!(expected = expected.name(), found, "<-- reject");
            return Err(KdlError::Structural {
                expected: expected.name(),
                found,
            });
        }
        trace!(kind = expected.name(), "<-- accept");

        let event = match expected {
            // Eof stays in the slot so later peeks still see it.
            EventKind::Eof => Event::eof(),
            _ => self.current.take().ok_or(KdlError::Structural {
                expected: expected.name(),
                found: "no event",
            })?,
        };
        if expected != EventKind::Eof {
            self.advance()?;
        }
        Ok(event)
    }
}

/// Build a document from any event source.
pub fn parse_document(source: impl EventSource) -> Result<Document> {
    TreeBuilder::new(source).parse_document()
}

impl Document {
    /// Build a document from an in-memory event sequence.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Result<Document> {
        parse_document(EventStream::new(events))
    }
}
