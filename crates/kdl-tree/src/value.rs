//! KDL values: a closed set of scalar kinds, each with an optional type
//! annotation.
//!
//! Integers and floats are stored as `i64`/`f64` when they fit. A literal that
//! exceeds the 64-bit range (or the precision of an `f64`) is kept as a
//! [`BigInt`] or [`BigDecimal`] instead of being truncated.
//!
//! # Example
//! ```
//! use kdl_tree::Value;
//!
//! let port = Value::from(22).with_annotation("u16");
//! assert_eq!(port.type_annotation(), Some("u16"));
//! assert_eq!(port.to_string(), "22");
//!
//! let huge = Value::from_number_literal("18446744073709551616").unwrap();
//! assert_eq!(huge.kind_name(), "bigint");
//! ```

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{KdlError, Result};

/// The underlying scalar of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    String(String),
    Integer(i64),
    Float(f64),
    /// Integer outside the `i64` range.
    BigInteger(BigInt),
    /// Float outside the range or precision of `f64`.
    BigFloat(BigDecimal),
    Boolean(bool),
    Null,
}

/// A KDL value with an optional type annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValueRepr", into = "ValueRepr")]
pub struct Value {
    kind: ValueKind,
    annotation: Option<String>,
}

impl Value {
    fn plain(kind: ValueKind) -> Self {
        Value {
            kind,
            annotation: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::plain(ValueKind::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::plain(ValueKind::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Self::plain(ValueKind::Float(value))
    }

    pub fn big_integer(value: BigInt) -> Self {
        Self::plain(ValueKind::BigInteger(value))
    }

    pub fn big_float(value: BigDecimal) -> Self {
        Self::plain(ValueKind::BigFloat(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::plain(ValueKind::Boolean(value))
    }

    pub fn null() -> Self {
        Self::plain(ValueKind::Null)
    }

    /// Return a copy of this value carrying the given type annotation.
    pub fn with_annotation(self, ty: impl Into<String>) -> Self {
        Value {
            kind: self.kind,
            annotation: Some(ty.into()),
        }
    }

    /// Return a copy of this value with any type annotation removed.
    pub fn without_annotation(self) -> Self {
        Self::plain(self.kind)
    }

    /// The host-native form of the value.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    pub fn type_annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    /// Short lowercase name of the variant, used in error messages and the
    /// diagnostic printer.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Canonical textual rendering of the scalar, without its annotation.
    pub fn as_display_string(&self) -> String {
        self.to_string()
    }

    /// Diagnostic rendering that includes the variant and the annotation, e.g.
    /// `(u8)integer(5)` or `string("x")`.
    pub fn type_string(&self) -> String {
        let prefix = format_annotation(self.type_annotation());
        match &self.kind {
            ValueKind::String(s) => format!("{prefix}string({s:?})"),
            ValueKind::Integer(i) => format!("{prefix}integer({i})"),
            ValueKind::Float(f) => format!("{prefix}float({f:.6})"),
            ValueKind::BigInteger(b) => format!("{prefix}bigint({b})"),
            ValueKind::BigFloat(b) => format!("{prefix}bigfloat({b})"),
            ValueKind::Boolean(b) => format!("{prefix}boolean({b})"),
            ValueKind::Null => format!("{prefix}null"),
        }
    }

    /// Classify a numeric literal, falling back to arbitrary precision when the
    /// value does not fit the native 64-bit types.
    ///
    /// Accepts an optional sign, `_` digit separators, `0x`/`0o`/`0b` radix
    /// prefixes for integers, and decimal/exponent notation for floats.
    pub fn from_number_literal(literal: &str) -> Result<Self> {
        let invalid = || KdlError::InvalidNumber(literal.to_string());
        let cleaned: String = literal.chars().filter(|&c| c != '_').collect();
        let (negative, body) = match cleaned.as_bytes().first() {
            Some(b'-') => (true, &cleaned[1..]),
            Some(b'+') => (false, &cleaned[1..]),
            _ => (false, cleaned.as_str()),
        };
        if body.is_empty() {
            return Err(invalid());
        }

        let radix = match body.get(..2) {
            Some("0x") | Some("0X") => Some(16),
            Some("0o") | Some("0O") => Some(8),
            Some("0b") | Some("0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let digits = &body[2..];
            if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
            let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
            return Ok(integer_value(negative, magnitude));
        }

        if body.bytes().all(|b| b.is_ascii_digit()) {
            let magnitude = BigInt::parse_bytes(body.as_bytes(), 10).ok_or_else(invalid)?;
            return Ok(integer_value(negative, magnitude));
        }

        if !is_decimal_syntax(body) {
            return Err(invalid());
        }
        let parsed: f64 = cleaned.parse().map_err(|_| invalid())?;
        if parsed.is_finite() && !underflowed(body, parsed) && significant_digits(body) <= 17 {
            return Ok(Value::float(parsed));
        }
        let big = BigDecimal::from_str(&cleaned).map_err(|_| invalid())?;
        Ok(Value::big_float(big))
    }

    /// Decode a number the event source could not fit into a native type and
    /// handed over as text: base-10 integers become `BigInteger`, anything else
    /// `BigFloat`.
    pub fn from_encoded_number(text: &str) -> Result<Self> {
        if let Ok(int) = BigInt::from_str(text) {
            return Ok(Value::big_integer(int));
        }
        BigDecimal::from_str(text)
            .map(Value::big_float)
            .map_err(|_| KdlError::InvalidNumber(text.to_string()))
    }
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String(_) => "string",
            ValueKind::Integer(_) => "integer",
            ValueKind::Float(_) => "float",
            ValueKind::BigInteger(_) => "bigint",
            ValueKind::BigFloat(_) => "bigfloat",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Null => "null",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::String(s) => f.write_str(s),
            ValueKind::Integer(i) => write!(f, "{i}"),
            ValueKind::Float(x) => write!(f, "{x:.6}"),
            ValueKind::BigInteger(b) => write!(f, "{b}"),
            ValueKind::BigFloat(b) => write!(f, "{b}"),
            ValueKind::Boolean(b) => write!(f, "{b}"),
            ValueKind::Null => f.write_str("null"),
        }
    }
}

/// Render an annotation prefix, `(ty)`; an empty annotation is `("")`.
pub(crate) fn format_annotation(ty: Option<&str>) -> String {
    match ty {
        None => String::new(),
        Some("") => "(\"\")".to_string(),
        Some(ty) => format!("({ty})"),
    }
}

fn integer_value(negative: bool, magnitude: BigInt) -> Value {
    let int = if negative { -magnitude } else { magnitude };
    match int.to_i64() {
        Some(small) => Value::integer(small),
        None => Value::big_integer(int),
    }
}

/// `digits[.digits][(e|E)[+|-]digits]`, at least one leading digit.
fn is_decimal_syntax(body: &str) -> bool {
    let bytes = body.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i > start
    };
    if !digits(&mut i) {
        return false;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        if !digits(&mut i) {
            return false;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        if !digits(&mut i) {
            return false;
        }
    }
    i == bytes.len()
}

fn mantissa(body: &str) -> &str {
    body.split(['e', 'E']).next().unwrap_or(body)
}

/// A non-zero literal that parsed to zero fell below the `f64` range.
fn underflowed(body: &str, parsed: f64) -> bool {
    parsed == 0.0 && mantissa(body).bytes().any(|b| (b'1'..=b'9').contains(&b))
}

fn significant_digits(body: &str) -> usize {
    let digits: String = mantissa(body).chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len()
}

// ============================================================================
// Host conversions
// ============================================================================

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

macro_rules! from_small_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::integer(i64::from(v))
            }
        })*
    };
}

from_small_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! from_wide_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(small) => Value::integer(small),
                    Err(_) => Value::big_integer(BigInt::from(v)),
                }
            }
        })*
    };
}

from_wide_int!(u64, isize, usize, i128, u128);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::boolean(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::big_integer(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::big_float(v)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::null()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(Value::null, Into::into)
    }
}

// ============================================================================
// JSON representation (event streams)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReprType {
    String,
    Integer,
    Float,
    BigInt,
    BigFloat,
    Boolean,
    Null,
}

/// Wire form of a value: `{"type": "integer", "value": 5, "annotation": "u8"}`.
/// Big numbers travel as strings; non-finite floats as `"inf"`, `"-inf"`, `"nan"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ValueRepr {
    #[serde(rename = "type")]
    ty: ReprType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<String>,
}

impl From<Value> for ValueRepr {
    fn from(v: Value) -> Self {
        use serde_json::Value as Json;
        let (ty, value) = match v.kind {
            ValueKind::String(s) => (ReprType::String, Some(Json::String(s))),
            ValueKind::Integer(i) => (ReprType::Integer, Some(Json::from(i))),
            ValueKind::Float(f) if f.is_finite() => (ReprType::Float, Some(Json::from(f))),
            ValueKind::Float(f) => {
                let text = if f.is_nan() {
                    "nan"
                } else if f > 0.0 {
                    "inf"
                } else {
                    "-inf"
                };
                (ReprType::Float, Some(Json::String(text.to_string())))
            }
            ValueKind::BigInteger(b) => (ReprType::BigInt, Some(Json::String(b.to_string()))),
            ValueKind::BigFloat(b) => (ReprType::BigFloat, Some(Json::String(b.to_string()))),
            ValueKind::Boolean(b) => (ReprType::Boolean, Some(Json::Bool(b))),
            ValueKind::Null => (ReprType::Null, None),
        };
        ValueRepr {
            ty,
            value,
            annotation: v.annotation,
        }
    }
}

impl TryFrom<ValueRepr> for Value {
    type Error = KdlError;

    fn try_from(repr: ValueRepr) -> Result<Self> {
        use serde_json::Value as Json;
        let mismatch = |expected: &'static str, found: &Option<Json>| {
            KdlError::Custom(format!(
                "{} value must be {expected}, got {}",
                repr.ty.name(),
                found.as_ref().map_or("nothing".to_string(), Json::to_string)
            ))
        };
        let value = match (repr.ty, &repr.value) {
            (ReprType::String, Some(Json::String(s))) => Value::string(s.clone()),
            (ReprType::Integer, Some(Json::Number(n))) if !n.is_f64() => match n.as_i64() {
                Some(i) => Value::integer(i),
                None => Value::from_number_literal(&n.to_string())?,
            },
            (ReprType::Integer, Some(Json::String(s))) => {
                let value = Value::from_number_literal(s)?;
                if !matches!(value.kind(), ValueKind::Integer(_) | ValueKind::BigInteger(_)) {
                    return Err(mismatch("an integer", &repr.value));
                }
                value
            }
            (ReprType::Float, Some(Json::Number(n))) => match n.as_f64() {
                Some(f) => Value::float(f),
                None => Value::from_number_literal(&n.to_string())?,
            },
            (ReprType::Float, Some(Json::String(s))) => match s.as_str() {
                "inf" => Value::float(f64::INFINITY),
                "-inf" => Value::float(f64::NEG_INFINITY),
                "nan" => Value::float(f64::NAN),
                other => Value::from_number_literal(other)?,
            },
            (ReprType::BigInt, Some(Json::String(s))) => {
                let int = BigInt::from_str(s).map_err(|_| KdlError::InvalidNumber(s.clone()))?;
                Value::big_integer(int)
            }
            (ReprType::BigInt, Some(Json::Number(n))) => Value::from_encoded_number(&n.to_string())?,
            (ReprType::BigFloat, Some(Json::String(s))) => {
                let big = BigDecimal::from_str(s).map_err(|_| KdlError::InvalidNumber(s.clone()))?;
                Value::big_float(big)
            }
            (ReprType::BigFloat, Some(Json::Number(n))) => {
                let big = BigDecimal::from_str(&n.to_string())
                    .map_err(|_| KdlError::InvalidNumber(n.to_string()))?;
                Value::big_float(big)
            }
            (ReprType::Boolean, Some(Json::Bool(b))) => Value::boolean(*b),
            (ReprType::Null, None | Some(Json::Null)) => Value::null(),
            (ReprType::String, found) => return Err(mismatch("a string", found)),
            (ReprType::Integer, found) => return Err(mismatch("an integer", found)),
            (ReprType::Float, found) => return Err(mismatch("a number", found)),
            (ReprType::BigInt | ReprType::BigFloat, found) => {
                return Err(mismatch("a numeric string", found))
            }
            (ReprType::Boolean, found) => return Err(mismatch("a boolean", found)),
            (ReprType::Null, found) => return Err(mismatch("absent", found)),
        };
        Ok(match repr.annotation {
            Some(ty) => value.with_annotation(ty),
            None => value,
        })
    }
}

impl ReprType {
    fn name(self) -> &'static str {
        match self {
            ReprType::String => "string",
            ReprType::Integer => "integer",
            ReprType::Float => "float",
            ReprType::BigInt => "bigint",
            ReprType::BigFloat => "bigfloat",
            ReprType::Boolean => "boolean",
            ReprType::Null => "null",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Value::string("x").to_string(), "x");
        assert_eq!(Value::integer(-42).to_string(), "-42");
        assert_eq!(Value::float(1.5).to_string(), "1.500000");
        assert_eq!(Value::boolean(true).to_string(), "true");
        assert_eq!(Value::null().to_string(), "null");
        assert_eq!(
            Value::big_integer(BigInt::from(u64::MAX) * 4).to_string(),
            "73786976294838206460"
        );
    }

    #[test]
    fn annotation_does_not_change_display() {
        let v = Value::integer(5).with_annotation("u8");
        assert_eq!(v.to_string(), "5");
        assert_eq!(v.type_string(), "(u8)integer(5)");
        assert_eq!(v.clone().without_annotation().type_annotation(), None);
    }

    #[test]
    fn empty_annotation_is_quoted_in_type_string() {
        assert_eq!(Value::null().with_annotation("").type_string(), "(\"\")null");
        assert_eq!(Value::string("a").type_string(), "string(\"a\")");
    }

    #[test]
    fn integer_literals() {
        assert_eq!(Value::from_number_literal("42").unwrap(), Value::integer(42));
        assert_eq!(Value::from_number_literal("-1_000").unwrap(), Value::integer(-1000));
        assert_eq!(Value::from_number_literal("0xff").unwrap(), Value::integer(255));
        assert_eq!(Value::from_number_literal("0o755").unwrap(), Value::integer(493));
        assert_eq!(Value::from_number_literal("0b1010").unwrap(), Value::integer(10));
        assert_eq!(
            Value::from_number_literal("-9223372036854775808").unwrap(),
            Value::integer(i64::MIN)
        );
    }

    #[test]
    fn integer_overflow_falls_back_to_bigint() {
        let v = Value::from_number_literal("9223372036854775808").unwrap();
        assert_eq!(
            v.kind(),
            &ValueKind::BigInteger(BigInt::from(i64::MAX) + 1)
        );
        let hex = Value::from_number_literal("0x1_0000_0000_0000_0000").unwrap();
        assert_eq!(hex.kind_name(), "bigint");
    }

    #[test]
    fn float_literals() {
        assert_eq!(Value::from_number_literal("1.5").unwrap(), Value::float(1.5));
        assert_eq!(Value::from_number_literal("-2.5e3").unwrap(), Value::float(-2500.0));
        assert_eq!(Value::from_number_literal("1e10").unwrap(), Value::float(1e10));
        assert_eq!(Value::from_number_literal("0.0").unwrap(), Value::float(0.0));
    }

    #[test]
    fn float_overflow_and_precision_fall_back_to_bigfloat() {
        assert_eq!(Value::from_number_literal("1e400").unwrap().kind_name(), "bigfloat");
        assert_eq!(Value::from_number_literal("1e-400").unwrap().kind_name(), "bigfloat");
        assert_eq!(
            Value::from_number_literal("3.14159265358979323846264338327950288").unwrap().kind_name(),
            "bigfloat"
        );
    }

    #[test]
    fn invalid_literals() {
        for bad in ["", "-", "abc", "1.", ".5", "1e", "0xzz", "inf", "1.2.3"] {
            assert!(
                matches!(Value::from_number_literal(bad), Err(KdlError::InvalidNumber(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn encoded_numbers() {
        assert_eq!(Value::from_encoded_number("123").unwrap().kind_name(), "bigint");
        assert_eq!(Value::from_encoded_number("1.5e999").unwrap().kind_name(), "bigfloat");
        assert!(Value::from_encoded_number("nope").is_err());
    }

    #[test]
    fn host_conversions() {
        assert_eq!(Value::from(7u8), Value::integer(7));
        assert_eq!(Value::from(u64::MAX).kind_name(), "bigint");
        assert_eq!(Value::from(usize::MIN), Value::integer(0));
        assert_eq!(Value::from(Some("x")), Value::string("x"));
        assert_eq!(Value::from(None::<i32>), Value::null());
        assert_eq!(Value::from(()), Value::null());
    }

    #[test]
    fn json_repr_roundtrip() {
        let values = vec![
            Value::string("hi").with_annotation("greeting"),
            Value::integer(-3),
            Value::float(0.25),
            Value::float(f64::INFINITY),
            Value::big_integer(BigInt::from(i64::MAX) * 10),
            Value::big_float(BigDecimal::from_str("1.5e400").unwrap()),
            Value::boolean(false),
            Value::null().with_annotation("unit"),
        ];
        for value in values {
            let json = serde_json::to_string(&value).unwrap();
            let back: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value, "through {json}");
        }
    }

    #[test]
    fn json_repr_rejects_wrong_payload() {
        let err = serde_json::from_str::<Value>(r#"{"type":"boolean","value":"yes"}"#).unwrap_err();
        assert!(err.to_string().contains("boolean value must be a boolean"));
    }

    #[test]
    fn json_repr_integer_rejects_fractions() {
        for json in [
            r#"{"type":"integer","value":1.5}"#,
            r#"{"type":"integer","value":"2.5"}"#,
        ] {
            let err = serde_json::from_str::<Value>(json).unwrap_err();
            assert!(err.to_string().contains("integer value must be an integer"), "{json}: {err}");
        }
    }

    #[test]
    fn json_repr_integer_accepts_wide_literals() {
        let value: Value =
            serde_json::from_str(r#"{"type":"integer","value":18446744073709551615}"#).unwrap();
        assert_eq!(value, Value::from(u64::MAX));
        let value: Value =
            serde_json::from_str(r#"{"type":"integer","value":"-170141183460469231731687303715884105728"}"#)
                .unwrap();
        assert_eq!(value, Value::from(i128::MIN));
    }
}
