//! Polymorphic parameter value storage.
//!
//! Every parameter holds exactly one of the five value shapes. Changing a
//! parameter's shape is never done in place: the assignment protocol unsets
//! and recreates the record instead.

use rustc_hash::FxHashMap;
use std::fmt;

/// The five mutually exclusive parameter types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParamType {
    Scalar,
    Integer,
    Float,
    Array,
    Assoc,
}

impl ParamType {
    /// Whether a value of this type can be mirrored into the environment
    /// as a single `NAME=value` string.
    #[inline]
    pub fn is_exportable(self) -> bool {
        matches!(self, ParamType::Scalar | ParamType::Integer | ParamType::Float)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParamType::Scalar => "scalar",
            ParamType::Integer => "integer",
            ParamType::Float => "float",
            ParamType::Array => "array",
            ParamType::Assoc => "association",
        };
        f.write_str(text)
    }
}

/// One stored parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(String),
    Integer(i64),
    Float(f64),
    Array(Vec<String>),
    Assoc(FxHashMap<String, String>),
}

impl ParamValue {
    /// The type tag of this value.
    pub fn type_of(&self) -> ParamType {
        match self {
            ParamValue::Scalar(_) => ParamType::Scalar,
            ParamValue::Integer(_) => ParamType::Integer,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Array(_) => ParamType::Array,
            ParamValue::Assoc(_) => ParamType::Assoc,
        }
    }

    /// The empty value of a given type, used when a record is created or
    /// reset to the unset state.
    pub fn empty(ty: ParamType) -> ParamValue {
        match ty {
            ParamType::Scalar => ParamValue::Scalar(String::new()),
            ParamType::Integer => ParamValue::Integer(0),
            ParamType::Float => ParamValue::Float(0.0),
            ParamType::Array => ParamValue::Array(Vec::new()),
            ParamType::Assoc => ParamValue::Assoc(FxHashMap::default()),
        }
    }

    /// Render the value as the single string used for environment entries
    /// and scalar coercion. Arrays join on a single space, the `typeset`
    /// display convention; associations are not renderable this way and
    /// yield an empty string.
    pub fn to_scalar_text(&self) -> String {
        match self {
            ParamValue::Scalar(s) => s.clone(),
            ParamValue::Integer(n) => n.to_string(),
            ParamValue::Float(x) => format_float(*x),
            ParamValue::Array(words) => join(words, ' '),
            ParamValue::Assoc(_) => String::new(),
        }
    }
}

/// An already-evaluated numeric value, integer or float.
///
/// Mixed-type arithmetic promotes to float.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Sum of two numbers, promoting to float when the types differ.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Number::Int(a.wrapping_add(b)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    /// Parse a plain integer or float literal. This is not a math
    /// evaluator; it covers environment import and literal text bound for
    /// numeric parameters.
    pub fn parse(text: &str) -> Option<Number> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some(Number::Int(0));
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(Number::Int(n));
        }
        trimmed.parse::<f64>().ok().map(Number::Float)
    }

    /// The stored value for this number.
    pub fn to_value(self) -> ParamValue {
        match self {
            Number::Int(n) => ParamValue::Integer(n),
            Number::Float(x) => ParamValue::Float(x),
        }
    }
}

/// Float rendering used for environment entries and scalar coercion.
///
/// Whole floats keep a trailing `.` suffix so the text still reads as a
/// float, matching the shell's output convention.
pub fn format_float(x: f64) -> String {
    if x.is_finite() && x == x.trunc() {
        format!("{x}.")
    } else {
        x.to_string()
    }
}

/// Join words on a separator character.
pub fn join(words: &[String], sep: char) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(word);
    }
    out
}

/// Split text on a separator character. The empty string yields an empty
/// array so that `split(join(a))` round-trips for every `a` without empty
/// trailing elements appearing from nowhere.
pub fn split(text: &str, sep: char) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(sep).map(str::to_owned).collect()
}

/// Order-preserving deduplication, applied to arrays flagged unique.
/// The first occurrence of each word wins.
pub fn uniq(words: &mut Vec<String>) {
    let mut seen: Vec<&str> = Vec::with_capacity(words.len());
    let mut keep = vec![false; words.len()];
    for (i, word) in words.iter().enumerate() {
        if !seen.contains(&word.as_str()) {
            seen.push(word.as_str());
            keep[i] = true;
        }
    }
    let mut i = 0;
    words.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}

/// Whether a name is a valid parameter identifier: a letter or underscore
/// followed by letters, digits, or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests;
