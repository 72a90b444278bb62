//! Canonical KDL text output.
//!
//! [`TextSink`] is an [`EventSink`] that writes a fixed layout, in KDL v2
//! unless built with [`TextSink::with_version`]:
//!
//! ```text
//! (server)host example1 port=22 {
//!     user root
//!     retries (u8)3
//!     empty {}
//! }
//! ```
//!
//! Names, keys, annotations and string values are written bare when they are
//! valid KDL identifiers and quoted otherwise. Floats always carry a decimal
//! point or an exponent, so they read back as floats.
//!
//! KDL v1 output differs in three places: keywords are bare (`true`, `null`),
//! string values are always quoted, and non-finite floats are an error since
//! v1 has no syntax for them.

use std::io::Write;

use crate::emitter::emit_document;
use crate::error::{KdlError, Result};
use crate::event::EventSink;
use crate::node::Document;
use crate::value::{Value, ValueKind};

const INDENT: &str = "    ";

/// Which KDL syntax a [`TextSink`] writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KdlVersion {
    V1,
    #[default]
    V2,
}

/// Writes KDL text to any [`Write`].
pub struct TextSink<W> {
    writer: W,
    version: KdlVersion,
    depth: usize,
    /// One entry per open children block: whether a child has been written yet.
    blocks: Vec<bool>,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_version(writer, KdlVersion::default())
    }

    pub fn with_version(writer: W, version: KdlVersion) -> Self {
        TextSink {
            writer,
            version,
            depth: 0,
            blocks: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_indent(&mut self) -> Result<()> {
        for _ in 0..self.depth {
            self.writer.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> EventSink for TextSink<W> {
    fn start_node(&mut self, name: &str, type_annotation: Option<&str>) -> Result<()> {
        if let Some(has_children) = self.blocks.last_mut() {
            if !*has_children {
                *has_children = true;
                self.writer.write_all(b"\n")?;
            }
        }
        self.write_indent()?;
        let mut out = String::new();
        push_annotation(type_annotation, &mut out);
        push_identifier(name, &mut out);
        self.writer.write_all(out.as_bytes())?;
        Ok(())
    }

    fn argument(&mut self, value: &Value) -> Result<()> {
        let mut out = String::from(" ");
        push_value(value, self.version, &mut out)?;
        self.writer.write_all(out.as_bytes())?;
        Ok(())
    }

    fn property(&mut self, key: &str, value: &Value) -> Result<()> {
        let mut out = String::from(" ");
        push_identifier(key, &mut out);
        out.push('=');
        push_value(value, self.version, &mut out)?;
        self.writer.write_all(out.as_bytes())?;
        Ok(())
    }

    fn start_children(&mut self) -> Result<()> {
        self.writer.write_all(b" {")?;
        self.blocks.push(false);
        self.depth += 1;
        Ok(())
    }

    fn end_children(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if self.blocks.pop().unwrap_or(false) {
            self.write_indent()?;
        }
        self.writer.write_all(b"}")?;
        Ok(())
    }

    fn end_node(&mut self) -> Result<()> {
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Render a document as canonical KDL v2 text.
pub fn to_kdl_string(doc: &Document) -> Result<String> {
    to_kdl_string_with(doc, KdlVersion::V2)
}

pub fn to_kdl_string_with(doc: &Document, version: KdlVersion) -> Result<String> {
    let sink = emit_document(TextSink::with_version(Vec::new(), version), doc)?;
    // The sink only ever writes UTF-8 built from `str`s.
    Ok(String::from_utf8_lossy(&sink.into_inner()).into_owned())
}

fn push_annotation(ty: Option<&str>, out: &mut String) {
    if let Some(ty) = ty {
        out.push('(');
        push_identifier(ty, out);
        out.push(')');
    }
}

fn push_value(value: &Value, version: KdlVersion, out: &mut String) -> Result<()> {
    push_annotation(value.type_annotation(), out);
    let v1 = version == KdlVersion::V1;
    match value.kind() {
        ValueKind::String(s) if v1 => push_quoted(s, out),
        ValueKind::String(s) => push_identifier(s, out),
        ValueKind::Integer(i) => out.push_str(&i.to_string()),
        ValueKind::Float(f) if v1 && !f.is_finite() => {
            return Err(KdlError::Range {
                value: f.to_string(),
                target: "a KDL v1 number",
            });
        }
        ValueKind::Float(f) => out.push_str(&format_float(*f)),
        ValueKind::BigInteger(b) => out.push_str(&b.to_string()),
        ValueKind::BigFloat(b) => out.push_str(&format_big_float(&b.to_string())),
        ValueKind::Boolean(b) => {
            if !v1 {
                out.push('#');
            }
            out.push_str(if *b { "true" } else { "false" });
        }
        ValueKind::Null if v1 => out.push_str("null"),
        ValueKind::Null => out.push_str("#null"),
    }
    Ok(())
}

/// Shortest round-trip digits. Exponent form (`1.5E-7`, `1E+16`) when the
/// decimal exponent is below -2 or at least 16.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "#nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "#inf" } else { "#-inf" }.to_string();
    }

    let sci = format!("{f:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if f != 0.0 && !(-2..16).contains(&exponent) {
        let sign = if exponent >= 0 { "+" } else { "" };
        return format!("{mantissa}E{sign}{exponent}");
    }

    let plain = f.to_string();
    if plain.contains('.') {
        plain
    } else {
        plain + ".0"
    }
}

/// Same exponent layout as [`format_float`], applied to `BigDecimal`'s
/// display, which varies the exponent's case and sign with magnitude.
fn format_big_float(text: &str) -> String {
    match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
            let sign = if exponent.starts_with('-') { "" } else { "+" };
            format!("{mantissa}E{sign}{exponent}")
        }
        None if text.contains('.') => text.to_string(),
        None => format!("{text}.0"),
    }
}

fn push_identifier(s: &str, out: &mut String) {
    if is_bare_identifier(s) {
        out.push_str(s);
    } else {
        push_quoted(s, out);
    }
}

fn push_quoted(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// A KDL v2 identifier that needs no quotes.
fn is_bare_identifier(s: &str) -> bool {
    if s.is_empty() || matches!(s, "true" | "false" | "null" | "inf" | "-inf" | "nan") {
        return false;
    }
    let forbidden = |c: char| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '\\' | '/' | '(' | ')' | '{' | '}' | ';' | '[' | ']' | '"' | '#' | '=')
            || matches!(c, '\u{FEFF}' | '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
    };
    if s.chars().any(forbidden) {
        return false;
    }

    // Anything that starts like a number would be read back as one.
    let mut chars = s.chars();
    let first = chars.next();
    let rest: String = chars.collect();
    let starts_numeric = |t: &str| {
        let mut cs = t.chars();
        match cs.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => cs.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    };
    match first {
        Some(c) if c.is_ascii_digit() => false,
        Some('+' | '-') => !starts_numeric(&rest),
        Some('.') => !rest.starts_with(|c: char| c.is_ascii_digit()),
        _ => true,
    }
}
