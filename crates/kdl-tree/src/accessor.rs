//! Typed extraction from values and nodes.
//!
//! Extractors are plain functions `fn(&Value) -> Result<T>`. They compose with
//! [`get`], which resolves an argument index or a property name, and with
//! [`get_child_value`], which reads the first argument of a named child:
//!
//! ```
//! use kdl_tree::{accessor::*, Node};
//!
//! let host = Node::new("host")
//!     .with_argument("example1")
//!     .with_property("enabled", true)
//!     .with_child(Node::kv("port", 22));
//!
//! assert_eq!(get(&host, 0, as_str).unwrap(), "example1");
//! assert!(get(&host, "enabled", as_bool).unwrap());
//! assert_eq!(get_child_value(&host, "port", as_int).unwrap(), 22);
//! assert!(get(&host, "missing", as_string).unwrap_err().is_not_found());
//! ```

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use crate::error::{KdlError, Result};
use crate::node::Node;
use crate::value::{Value, ValueKind};

fn mismatch(expected: &'static str, found: &Value) -> KdlError {
    KdlError::KindMismatch {
        expected,
        found: found.kind_name(),
    }
}

fn out_of_range(value: impl ToString, target: &'static str) -> KdlError {
    KdlError::Range {
        value: value.to_string(),
        target,
    }
}

pub fn as_string(v: &Value) -> Result<String> {
    as_str(v).map(str::to_owned)
}

pub fn as_str(v: &Value) -> Result<&str> {
    match v.kind() {
        ValueKind::String(s) => Ok(s),
        _ => Err(mismatch("a string", v)),
    }
}

/// `Integer`, or a `BigInteger` that fits in `i64`.
pub fn as_i64(v: &Value) -> Result<i64> {
    match v.kind() {
        ValueKind::Integer(i) => Ok(*i),
        ValueKind::BigInteger(b) => b.to_i64().ok_or_else(|| out_of_range(b, "i64")),
        _ => Err(mismatch("an integer", v)),
    }
}

/// An integer narrowed to the host machine width.
pub fn as_int(v: &Value) -> Result<isize> {
    let i = as_i64(v)?;
    isize::try_from(i).map_err(|_| out_of_range(i, "isize"))
}

pub fn as_i32(v: &Value) -> Result<i32> {
    let i = as_i64(v)?;
    i32::try_from(i).map_err(|_| out_of_range(i, "i32"))
}

pub fn as_u64(v: &Value) -> Result<u64> {
    match v.kind() {
        ValueKind::Integer(i) => u64::try_from(*i).map_err(|_| out_of_range(i, "u64")),
        ValueKind::BigInteger(b) => b.to_u64().ok_or_else(|| out_of_range(b, "u64")),
        _ => Err(mismatch("an integer", v)),
    }
}

/// A float as `f64`.
///
/// A `BigFloat` is narrowed to the nearest `f64`. When the narrowing is not
/// exact the error is [`KdlError::PrecisionLoss`], which still carries the
/// narrowed value (see [`KdlError::best_effort_f64`]).
pub fn as_f64(v: &Value) -> Result<f64> {
    match v.kind() {
        ValueKind::Float(f) => Ok(*f),
        ValueKind::BigFloat(b) => {
            let narrowed = narrow_big_float(b);
            if narrowed.is_finite() && exact_decimal(narrowed) == *b {
                Ok(narrowed)
            } else {
                Err(KdlError::PrecisionLoss {
                    value: narrowed,
                    literal: b.to_string(),
                })
            }
        }
        _ => Err(mismatch("a float", v)),
    }
}

/// Any integer as an arbitrary-precision integer.
pub fn as_big_int(v: &Value) -> Result<BigInt> {
    match v.kind() {
        ValueKind::BigInteger(b) => Ok(b.clone()),
        ValueKind::Integer(i) => Ok(BigInt::from(*i)),
        _ => Err(mismatch("an integer", v)),
    }
}

/// Any float as an arbitrary-precision decimal. `Float` converts exactly.
pub fn as_big_float(v: &Value) -> Result<BigDecimal> {
    match v.kind() {
        ValueKind::BigFloat(b) => Ok(b.clone()),
        ValueKind::Float(f) if f.is_finite() => Ok(exact_decimal(*f)),
        ValueKind::Float(f) => Err(out_of_range(f, "a big float")),
        _ => Err(mismatch("a float", v)),
    }
}

pub fn as_bool(v: &Value) -> Result<bool> {
    match v.kind() {
        ValueKind::Boolean(b) => Ok(*b),
        _ => Err(mismatch("a boolean", v)),
    }
}

pub fn as_null(v: &Value) -> Result<()> {
    match v.kind() {
        ValueKind::Null => Ok(()),
        _ => Err(mismatch("null", v)),
    }
}

/// Lift an extractor so that `null` reads as `None`.
pub fn as_option<'v, T>(
    extract: impl Fn(&'v Value) -> Result<T>,
) -> impl Fn(&'v Value) -> Result<Option<T>> {
    move |v| {
        if v.is_null() {
            Ok(None)
        } else {
            extract(v).map(Some)
        }
    }
}

/// Convert every value, or report the first failure with the offending value.
pub fn cast_all<'v, T>(
    values: &'v [Value],
    extract: impl Fn(&'v Value) -> Result<T>,
) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| extract(v).map_err(|e| e.context(format!("casting value {}", v.type_string()))))
        .collect()
}

fn narrow_big_float(b: &BigDecimal) -> f64 {
    match b.to_f64() {
        Some(f) if !f.is_nan() => f,
        _ if b.is_negative() => f64::NEG_INFINITY,
        _ => f64::INFINITY,
    }
}

/// The exact decimal value of a finite `f64`.
fn exact_decimal(f: f64) -> BigDecimal {
    let bits = f.to_bits();
    let negative = bits >> 63 == 1;
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & 0x000f_ffff_ffff_ffff;
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | 0x0010_0000_0000_0000, biased - 1075)
    };
    let mut digits = BigInt::from(mantissa);
    if negative {
        digits = -digits;
    }
    if exponent >= 0 {
        BigDecimal::new(digits << exponent as usize, 0)
    } else {
        let scale = -exponent;
        BigDecimal::new(digits * BigInt::from(5u8).pow(scale as u32), scale)
    }
}

// ============================================================================
// Node access by key
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// A key addressing a node entry: integers address arguments, strings address
/// properties.
pub trait Key: sealed::Sealed {
    fn lookup<'n>(&self, node: &'n Node) -> Result<&'n Value>;
    fn assign(&self, node: &mut Node, value: Value) -> Result<()>;
}

fn lookup_index(node: &Node, index: i64) -> Result<&Value> {
    let slot = usize::try_from(index).map_err(|_| KdlError::InvalidIndex(index))?;
    node.arguments
        .get(slot)
        .ok_or_else(|| KdlError::not_found(format!("argument at index {index}")))
}

fn assign_index(node: &mut Node, index: i64, value: Value) -> Result<()> {
    let slot = usize::try_from(index).map_err(|_| KdlError::InvalidIndex(index))?;
    if slot >= node.arguments.len() {
        node.arguments
            .try_reserve(slot + 1 - node.arguments.len())
            .map_err(|_| KdlError::InvalidIndex(index))?;
        node.arguments.resize_with(slot + 1, Value::null);
    }
    node.arguments[slot] = value;
    Ok(())
}

macro_rules! index_key {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Key for $t {
                fn lookup<'n>(&self, node: &'n Node) -> Result<&'n Value> {
                    let index = i64::try_from(*self).map_err(|_| KdlError::InvalidIndex(i64::MAX))?;
                    lookup_index(node, index)
                }

                fn assign(&self, node: &mut Node, value: Value) -> Result<()> {
                    let index = i64::try_from(*self).map_err(|_| KdlError::InvalidIndex(i64::MAX))?;
                    assign_index(node, index, value)
                }
            }
        )*
    };
}

index_key!(usize, i32, i64);

impl sealed::Sealed for &str {}
impl sealed::Sealed for String {}

impl Key for &str {
    fn lookup<'n>(&self, node: &'n Node) -> Result<&'n Value> {
        node.property(self)
            .ok_or_else(|| KdlError::not_found(format!("property {self}")))
    }

    fn assign(&self, node: &mut Node, value: Value) -> Result<()> {
        node.insert_property(*self, value);
        Ok(())
    }
}

impl Key for String {
    fn lookup<'n>(&self, node: &'n Node) -> Result<&'n Value> {
        self.as_str().lookup(node)
    }

    fn assign(&self, node: &mut Node, value: Value) -> Result<()> {
        self.as_str().assign(node, value)
    }
}

/// Read an argument (integer key) or property (string key) and convert it.
///
/// A missing entry fails with an error for which
/// [`KdlError::is_not_found`] is true; extractor errors pass through unchanged.
pub fn get<'n, K: Key, R>(
    node: &'n Node,
    key: K,
    extract: impl FnOnce(&'n Value) -> Result<R>,
) -> Result<R> {
    extract(key.lookup(node)?)
}

/// Write an argument (integer key) or property (string key).
///
/// Writing past the end of the arguments pads the gap with nulls. Negative
/// indices fail with [`KdlError::InvalidIndex`].
pub fn set<K: Key>(node: &mut Node, key: K, value: impl Into<Value>) -> Result<()> {
    key.assign(node, value.into())
}

/// Read the first argument of the first child named `name` and convert it.
pub fn get_child_value<'n, R>(
    node: &'n Node,
    name: &str,
    extract: impl FnOnce(&'n Value) -> Result<R>,
) -> Result<R> {
    let child = node
        .child(name)
        .ok_or_else(|| KdlError::not_found(format!("child {name}")))?;
    let first = child
        .arguments
        .first()
        .ok_or_else(|| KdlError::not_found(format!("argument of child {name}")))?;
    extract(first)
}
