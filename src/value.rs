use std::{fmt::Display, str::FromStr};

use crate::IniParseFailure;

/// Default cap on literal nesting depth (list-of-list-of-…) accepted by the
/// evaluator. Keeps pathological input from exhausting the stack. See
/// [`IniContainer::parse_with_depth_limit`](crate::IniContainer::parse_with_depth_limit)
/// to pick a different limit.
pub const DEFAULT_NESTING_LIMIT: usize = 128;

/// A single configuration value, produced by the restricted literal
/// evaluator.
///
/// Values are fully self-contained data: no references to other items, no
/// deferred evaluation. The grammar is a closed set of literals — anything
/// expression-shaped (arithmetic, names, calls, indexing) is rejected at
/// parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum IniValue {
    /// A quoted string, e.g. `'hello'` or `"hello"`.
    String(String),

    /// A byte-string, e.g. `b'\x00\x01'`. Printable ASCII may appear
    /// directly; everything else uses `\xHH` escapes.
    Bytes(Vec<u8>),

    /// An integer, written in decimal, `0x` hex, `0o` octal, or `0b` binary
    /// form, with optional `_` digit grouping.
    Integer(i64),

    /// A floating-point number, e.g. `2.5` or `1e-3`.
    Float(f64),

    /// `True` or `False`.
    Bool(bool),

    /// The `None` value.
    None,

    /// A `[…]` sequence.
    List(Vec<IniValue>),

    /// A `(…)` sequence. Distinguished from [`IniValue::List`] only so that
    /// serialization can reproduce the original bracket style; the two carry
    /// no semantic difference.
    Tuple(Vec<IniValue>),

    /// A `{a, b}` collection. Deduplicated at parse time; first-occurrence
    /// order is kept so serialization stays deterministic. The empty set is
    /// written `set()`, since `{}` already means an empty dict.
    Set(Vec<IniValue>),

    /// A `{key: value}` mapping. Keys may be any value, not just strings.
    /// Pairs keep insertion order; a duplicate key overwrites in place.
    Dict(Vec<(IniValue, IniValue)>),
}

impl IniValue {
    /// Returns `true` if the value is a [`IniValue::String`].
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is a [`IniValue::Bytes`].
    pub fn is_bytes(&self) -> bool {
        matches!(self, Self::Bytes(..))
    }

    /// Returns `true` if the value is an [`IniValue::Integer`].
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(..))
    }

    /// Returns `true` if the value is an [`IniValue::Float`].
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(..))
    }

    /// Returns `true` if the value is a [`IniValue::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` if the value is [`IniValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` if the value is a [`IniValue::List`] or
    /// [`IniValue::Tuple`].
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(..) | Self::Tuple(..))
    }

    /// Returns `true` if the value is a [`IniValue::Set`].
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(..))
    }

    /// Returns `true` if the value is a [`IniValue::Dict`].
    pub fn is_dict(&self) -> bool {
        matches!(self, Self::Dict(..))
    }

    /// Returns `Some(&str)` if the value is a [`IniValue::String`],
    /// otherwise `None`.
    pub fn as_string(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Returns `Some(&[u8])` if the value is a [`IniValue::Bytes`],
    /// otherwise `None`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Self::Bytes(b) = self {
            Some(b)
        } else {
            None
        }
    }

    /// Returns `Some(i64)` if the value is an [`IniValue::Integer`],
    /// otherwise `None`.
    pub fn as_i64(&self) -> Option<i64> {
        if let Self::Integer(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Returns `Some(f64)` if the value is an [`IniValue::Float`],
    /// otherwise `None`.
    pub fn as_f64(&self) -> Option<f64> {
        if let Self::Float(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Returns `Some(bool)` if the value is a [`IniValue::Bool`], otherwise
    /// `None`.
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Returns the elements if the value is a [`IniValue::List`] or
    /// [`IniValue::Tuple`], otherwise `None`.
    pub fn as_sequence(&self) -> Option<&[IniValue]> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the elements if the value is a [`IniValue::Set`], otherwise
    /// `None`.
    pub fn as_set(&self) -> Option<&[IniValue]> {
        if let Self::Set(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Returns the key/value pairs if the value is a [`IniValue::Dict`],
    /// otherwise `None`.
    pub fn as_dict(&self) -> Option<&[(IniValue, IniValue)]> {
        if let Self::Dict(pairs) = self {
            Some(pairs)
        } else {
            None
        }
    }

    /// Looks up a dict entry by string key. Convenience for the common case
    /// of string-keyed mappings.
    pub fn get(&self, key: &str) -> Option<&IniValue> {
        self.as_dict().and_then(|pairs| {
            pairs
                .iter()
                .find(|(k, _)| k.as_string() == Some(key))
                .map(|(_, v)| v)
        })
    }
}

impl Display for IniValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(_) => self.write_string(f),
            Self::Bytes(_) => self.write_bytes(f),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(
                f,
                "{:?}",
                // The literal grammar has no spelling for infinities or NaN,
                // so they collapse to the nearest representable value.
                if value == &f64::INFINITY {
                    f64::MAX
                } else if value == &f64::NEG_INFINITY {
                    -f64::MAX
                } else if value.is_nan() {
                    0.0
                } else {
                    *value
                }
            ),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::None => write!(f, "None"),
            Self::List(items) => {
                write!(f, "[")?;
                write_separated(f, items)?;
                write!(f, "]")
            }
            Self::Tuple(items) => {
                write!(f, "(")?;
                write_separated(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Self::Set(items) if items.is_empty() => write!(f, "set()"),
            Self::Set(items) => {
                write!(f, "{{")?;
                write_separated(f, items)?;
                write!(f, "}}")
            }
            Self::Dict(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_separated(f: &mut std::fmt::Formatter<'_>, items: &[IniValue]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl IniValue {
    fn write_string(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = if let Self::String(s) = self { s } else { "" };
        write!(f, "'")?;
        for char in string.chars() {
            match char {
                '\\' | '\'' => write!(f, "\\{}", char)?,
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                '\t' => write!(f, "\\t")?,
                c if (c as u32) < 0x20 || c == '\u{7f}' => write!(f, "\\x{:02x}", c as u32)?,
                _ => write!(f, "{}", char)?,
            }
        }
        write!(f, "'")
    }

    fn write_bytes(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes: &[u8] = if let Self::Bytes(b) = self { b } else { &[] };
        write!(f, "b'")?;
        for &byte in bytes {
            match byte {
                b'\\' | b'\'' => write!(f, "\\{}", byte as char)?,
                b'\n' => write!(f, "\\n")?,
                b'\r' => write!(f, "\\r")?,
                b'\t' => write!(f, "\\t")?,
                0x20..=0x7e => write!(f, "{}", byte as char)?,
                _ => write!(f, "\\x{:02x}", byte)?,
            }
        }
        write!(f, "'")
    }
}

impl From<i64> for IniValue {
    fn from(value: i64) -> Self {
        IniValue::Integer(value)
    }
}

impl From<f64> for IniValue {
    fn from(value: f64) -> Self {
        IniValue::Float(value)
    }
}

impl From<bool> for IniValue {
    fn from(value: bool) -> Self {
        IniValue::Bool(value)
    }
}

impl From<&str> for IniValue {
    fn from(value: &str) -> Self {
        IniValue::String(value.to_string())
    }
}

impl From<String> for IniValue {
    fn from(value: String) -> Self {
        IniValue::String(value)
    }
}

impl From<Vec<u8>> for IniValue {
    fn from(value: Vec<u8>) -> Self {
        IniValue::Bytes(value)
    }
}

impl From<Vec<IniValue>> for IniValue {
    fn from(value: Vec<IniValue>) -> Self {
        IniValue::List(value)
    }
}

impl<T> From<Option<T>> for IniValue
where
    T: Into<IniValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => IniValue::None,
        }
    }
}

impl FromStr for IniValue {
    type Err = IniParseFailure;

    /// Runs the restricted literal evaluator over `s`.
    ///
    /// ```rust
    /// use inidot::IniValue;
    ///
    /// let value: IniValue = "[1, 2.5, 'three']".parse().unwrap();
    /// assert_eq!(value.as_sequence().map(|s| s.len()), Some(3));
    /// assert!("os.system('rm -rf /')".parse::<IniValue>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_value(s, DEFAULT_NESTING_LIMIT)
    }
}
