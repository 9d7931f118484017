//! Map declared field types to flag kinds, and coerce raw values per kind.
//!
//! The kind of a flag is decided by the field's declared type alone. Values
//! arriving from the environment (strings) or from config files (whatever the
//! file format produced) are coerced into the kind's canonical `toml::Value`
//! shape before they reach the struct.

use std::fmt;

use toml::Value;

use crate::error::CommandError;

/// The kind of a command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    String,
    Int,
    Float,
    Bool,
    StringList,
    IntList,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagKind::String => "string",
            FlagKind::Int => "int",
            FlagKind::Float => "float",
            FlagKind::Bool => "bool",
            FlagKind::StringList => "string list",
            FlagKind::IntList => "int list",
        };
        f.write_str(name)
    }
}

const INTEGER_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];

/// Map the declared type of `field` to a flag kind.
pub fn map_type(field: &str, ty: &str) -> Result<FlagKind, CommandError> {
    FlagKind::from_type(ty).ok_or_else(|| CommandError::UnsupportedFieldType {
        field: field.to_string(),
        ty: ty.to_string(),
    })
}

impl FlagKind {
    /// Kind for a declared type as written in source, or `None` if the type
    /// has no flag representation.
    pub fn from_type(ty: &str) -> Option<FlagKind> {
        if let Some(element) = vec_element(ty) {
            return match scalar_kind(element)? {
                FlagKind::String => Some(FlagKind::StringList),
                FlagKind::Int => Some(FlagKind::IntList),
                _ => None,
            };
        }
        scalar_kind(ty)
    }

    pub fn is_list(self) -> bool {
        matches!(self, FlagKind::StringList | FlagKind::IntList)
    }

    pub fn zero(self) -> Value {
        match self {
            FlagKind::String => Value::String(String::new()),
            FlagKind::Int => Value::Integer(0),
            FlagKind::Float => Value::Float(0.0),
            FlagKind::Bool => Value::Boolean(false),
            FlagKind::StringList | FlagKind::IntList => Value::Array(vec![]),
        }
    }

    /// Coerce a raw string (an environment variable) into this kind.
    ///
    /// Lists are comma-separated; items are trimmed and empty items dropped.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            FlagKind::String => Ok(Value::String(raw.to_string())),
            FlagKind::Int => parse_int(raw).map(Value::Integer),
            FlagKind::Float => parse_float(raw).map(Value::Float),
            FlagKind::Bool => parse_bool(raw).map(Value::Boolean),
            FlagKind::StringList => Ok(Value::Array(
                split_list(raw)
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
            FlagKind::IntList => split_list(raw)
                .map(|item| parse_int(item).map(Value::Integer))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    /// Coerce a value read from a config file into this kind.
    pub fn coerce(self, value: &Value) -> Result<Value, String> {
        match (self, value) {
            (FlagKind::String, Value::String(_)) => Ok(value.clone()),
            (FlagKind::String, Value::Integer(i)) => Ok(Value::String(i.to_string())),
            (FlagKind::String, Value::Float(f)) => Ok(Value::String(f.to_string())),
            (FlagKind::String, Value::Boolean(b)) => Ok(Value::String(b.to_string())),

            (FlagKind::Int, Value::Integer(_)) => Ok(value.clone()),
            (FlagKind::Int, Value::Float(f)) if f.fract() == 0.0 && in_i64_range(*f) => {
                Ok(Value::Integer(*f as i64))
            }
            (FlagKind::Int, Value::Float(f)) => Err(format!("expected an integer, got {f}")),
            (FlagKind::Int, Value::String(s)) => parse_int(s).map(Value::Integer),

            (FlagKind::Float, Value::Float(_)) => Ok(value.clone()),
            (FlagKind::Float, Value::Integer(i)) => Ok(Value::Float(*i as f64)),
            (FlagKind::Float, Value::String(s)) => parse_float(s).map(Value::Float),

            (FlagKind::Bool, Value::Boolean(_)) => Ok(value.clone()),
            (FlagKind::Bool, Value::String(s)) => parse_bool(s).map(Value::Boolean),

            (FlagKind::StringList, Value::Array(items)) => items
                .iter()
                .map(|item| FlagKind::String.coerce(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (FlagKind::IntList, Value::Array(items)) => items
                .iter()
                .map(|item| FlagKind::Int.coerce(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (FlagKind::StringList | FlagKind::IntList, Value::String(s)) => self.parse(s),

            (kind, other) => Err(format!("expected {kind}, got {}", other.type_str())),
        }
    }

    /// Render a value of this kind as the strings a user would type.
    pub fn render(value: &Value) -> Vec<String> {
        match value {
            Value::String(s) => vec![s.clone()],
            Value::Integer(i) => vec![i.to_string()],
            Value::Float(f) => vec![f.to_string()],
            Value::Boolean(b) => vec![b.to_string()],
            Value::Array(items) => items.iter().flat_map(FlagKind::render).collect(),
            other => vec![other.to_string()],
        }
    }
}

fn scalar_kind(ty: &str) -> Option<FlagKind> {
    if ty.contains(['<', '>', '&', '(', '[', ' ']) {
        return None;
    }
    match last_segment(ty) {
        "String" => Some(FlagKind::String),
        "bool" => Some(FlagKind::Bool),
        "f32" | "f64" => Some(FlagKind::Float),
        t if INTEGER_TYPES.contains(&t) => Some(FlagKind::Int),
        _ => None,
    }
}

/// `Vec<T>` (optionally path-qualified) → `T`.
fn vec_element(ty: &str) -> Option<&str> {
    let (outer, inner) = ty.strip_suffix('>')?.split_once('<')?;
    (last_segment(outer) == "Vec").then_some(inner)
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn parse_int(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("expected an integer, got '{raw}'"))
}

fn parse_float(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("expected a number, got '{raw}'"))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("expected a boolean, got '{raw}'")),
    }
}
