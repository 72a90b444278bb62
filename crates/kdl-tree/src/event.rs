//! The event grammar shared by the builder and the emitter.
//!
//! A document is a flat sequence of events:
//!
//! ```text
//! StartNode("host")            node name; value is an (annotated) null
//!   Argument(String("a"))      zero or more, in order
//!   Property("port", 22)       zero or more
//!   StartNode("user") ...      nested children
//! EndNode
//! Eof
//! ```
//!
//! [`EventSource`] is the pull side consumed by the builder, [`EventSink`] the
//! push side driven by the emitter. Both have in-memory implementations so the
//! tree logic can be exercised without a text grammar.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StartNode,
    Argument,
    Property,
    EndNode,
    Eof,
    ParseError,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::StartNode => "start_node",
            EventKind::Argument => "argument",
            EventKind::Property => "property",
            EventKind::EndNode => "end_node",
            EventKind::Eof => "eof",
            EventKind::ParseError => "parse_error",
        }
    }
}

/// One grammar event.
///
/// `name` is the node name for `StartNode`, the key for `Property`, and the
/// message for `ParseError`. `value` is the argument or property value; for
/// `StartNode` it is a null whose annotation is the node's type annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default = "plain_null", skip_serializing_if = "is_plain_null")]
    pub value: Value,
}

fn plain_null() -> Value {
    Value::null()
}

fn is_plain_null(v: &Value) -> bool {
    v.is_null() && v.type_annotation().is_none()
}

impl Event {
    fn new(kind: EventKind, name: impl Into<String>, value: Value) -> Self {
        Event {
            kind,
            name: name.into(),
            value,
        }
    }

    pub fn start_node(name: impl Into<String>) -> Self {
        Self::new(EventKind::StartNode, name, Value::null())
    }

    pub fn start_node_with_type(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EventKind::StartNode, name, Value::null().with_annotation(ty))
    }

    pub fn argument(value: impl Into<Value>) -> Self {
        Self::new(EventKind::Argument, String::new(), value.into())
    }

    pub fn property(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(EventKind::Property, key, value.into())
    }

    pub fn end_node() -> Self {
        Self::new(EventKind::EndNode, String::new(), Value::null())
    }

    pub fn eof() -> Self {
        Self::new(EventKind::Eof, String::new(), Value::null())
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(EventKind::ParseError, message, Value::null())
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if !self.name.is_empty() {
            write!(f, " {:?}", self.name)?;
        }
        if !is_plain_null(&self.value) {
            write!(f, " {}", self.value.type_string())?;
        }
        Ok(())
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Pull side of the event grammar.
///
/// After an `Eof` event, further pulls keep returning `Eof`. A `ParseError`
/// event is terminal; consumers must not pull again after seeing one.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Event>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Result<Event> {
        (**self).next_event()
    }
}

/// An [`EventSource`] over any sequence of events.
///
/// Once the sequence is exhausted, or an `Eof` has been yielded, every pull
/// returns `Eof`.
#[derive(Debug)]
pub struct EventStream<I> {
    events: I,
    finished: bool,
}

impl<I: Iterator<Item = Event>> EventStream<I> {
    pub fn new(events: impl IntoIterator<IntoIter = I>) -> Self {
        EventStream {
            events: events.into_iter(),
            finished: false,
        }
    }
}

impl<I: Iterator<Item = Event>> EventSource for EventStream<I> {
    fn next_event(&mut self) -> Result<Event> {
        if self.finished {
            return Ok(Event::eof());
        }
        match self.events.next() {
            Some(event) => {
                if event.kind == EventKind::Eof {
                    self.finished = true;
                }
                Ok(event)
            }
            None => {
                self.finished = true;
                Ok(Event::eof())
            }
        }
    }
}

/// Read a JSON array of events.
pub fn read_json_events(reader: impl Read) -> Result<Vec<Event>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Write events as a pretty-printed JSON array.
pub fn write_json_events(mut writer: impl Write, events: &[Event]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, events)?;
    writer.write_all(b"\n")?;
    Ok(())
}

// ============================================================================
// Sinks
// ============================================================================

/// Push side of the event grammar, driven by the emitter.
///
/// Any write may fail; the emitter stops at the first failure.
pub trait EventSink {
    fn start_node(&mut self, name: &str, type_annotation: Option<&str>) -> Result<()>;
    fn argument(&mut self, value: &Value) -> Result<()>;
    fn property(&mut self, key: &str, value: &Value) -> Result<()>;
    fn start_children(&mut self) -> Result<()>;
    fn end_children(&mut self) -> Result<()>;
    fn end_node(&mut self) -> Result<()>;
    fn end_document(&mut self) -> Result<()>;
}

impl<K: EventSink + ?Sized> EventSink for &mut K {
    fn start_node(&mut self, name: &str, type_annotation: Option<&str>) -> Result<()> {
        (**self).start_node(name, type_annotation)
    }

    fn argument(&mut self, value: &Value) -> Result<()> {
        (**self).argument(value)
    }

    fn property(&mut self, key: &str, value: &Value) -> Result<()> {
        (**self).property(key, value)
    }

    fn start_children(&mut self) -> Result<()> {
        (**self).start_children()
    }

    fn end_children(&mut self) -> Result<()> {
        (**self).end_children()
    }

    fn end_node(&mut self) -> Result<()> {
        (**self).end_node()
    }

    fn end_document(&mut self) -> Result<()> {
        (**self).end_document()
    }
}

/// An [`EventSink`] that records the flattened event sequence.
///
/// Children blocks are implicit in the event grammar (a `StartNode` before the
/// parent's `EndNode`), so `start_children`/`end_children` record nothing.
/// `end_document` records `Eof`, which makes the recording a complete stream
/// for [`EventStream`].
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventSink for EventRecorder {
    fn start_node(&mut self, name: &str, type_annotation: Option<&str>) -> Result<()> {
        self.events.push(match type_annotation {
            Some(ty) => Event::start_node_with_type(ty, name),
            None => Event::start_node(name),
        });
        Ok(())
    }

    fn argument(&mut self, value: &Value) -> Result<()> {
        self.events.push(Event::argument(value.clone()));
        Ok(())
    }

    fn property(&mut self, key: &str, value: &Value) -> Result<()> {
        self.events.push(Event::property(key, value.clone()));
        Ok(())
    }

    fn start_children(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_children(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        self.events.push(Event::end_node());
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.events.push(Event::eof());
        Ok(())
    }
}
