//! Parenthesized diagnostic form of a document.
//!
//! For inspection and test assertions only; the output is not meant to be
//! parsed back.
//!
//! ```text
//! (document
//!   (node "host"
//!     (argument (string "example1"))
//!     (property "port" (integer 22
//!       (type "u16")))))
//! ```

use crate::node::{Document, Node};
use crate::value::{Value, ValueKind};

/// Accumulates the diagnostic form in memory.
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Append `s`, indenting every line that starts after a newline in it.
    fn print(&mut self, s: &str) {
        let mut lines = s.split('\n').peekable();
        while let Some(line) = lines.next() {
            if self.at_line_start {
                self.out.push_str(&"  ".repeat(self.indent));
                self.at_line_start = false;
            }
            self.out.push_str(line);
            if lines.peek().is_some() {
                self.out.push('\n');
                self.at_line_start = true;
            }
        }
    }

    pub fn print_document(&mut self, doc: &Document) {
        self.print("(document");
        self.indent += 1;
        for node in doc.nodes() {
            self.print_node(node);
        }
        self.indent -= 1;
        self.print(")");
    }

    pub fn print_node(&mut self, node: &Node) {
        self.print(&format!("\n(node \"{}\"", node.name));
        self.indent += 1;
        if let Some(ty) = &node.type_annotation {
            self.print(&format!("\n(type \"{ty}\")"));
        }
        for arg in &node.arguments {
            self.print("\n(argument ");
            self.print_value(arg);
            self.print(")");
        }
        for (key, value) in node.properties() {
            self.print(&format!("\n(property \"{key}\" "));
            self.print_value(value);
            self.print(")");
        }
        for child in &node.children {
            self.print_node(child);
        }
        self.indent -= 1;
        self.print(")");
    }

    pub fn print_value(&mut self, value: &Value) {
        let head = match value.kind() {
            ValueKind::String(s) => format!("(string \"{s}\""),
            ValueKind::Integer(i) => format!("(integer {i}"),
            ValueKind::Float(f) => format!("(float {f:.6}"),
            ValueKind::BigInteger(b) => format!("(bigint {b}"),
            ValueKind::BigFloat(b) => format!("(bigfloat {b}"),
            ValueKind::Boolean(b) => format!("(boolean {b}"),
            ValueKind::Null => "(null".to_string(),
        };
        self.print(&head);

        if let Some(ty) = value.type_annotation() {
            self.indent += 1;
            self.print(&format!("\n(type \"{ty}\")"));
            self.indent -= 1;
        }
        self.print(")");
    }
}

/// Render the diagnostic form of a document.
pub fn print_document(doc: &Document) -> String {
    let mut printer = Printer::new();
    printer.print_document(doc);
    printer.into_string()
}
