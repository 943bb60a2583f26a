// ABOUTME: Dynamic NBT value type.
// ABOUTME: Holds any decodable document without a schema; Display renders stringified NBT (SNBT).

use crate::types::Tag;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An NBT payload of any decodable tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// TAG_Byte
    Byte(i8),
    /// TAG_Short
    Short(i16),
    /// TAG_Int
    Int(i32),
    /// TAG_Long
    Long(i64),
    /// TAG_Float
    Float(f32),
    /// TAG_Double
    Double(f64),
    /// TAG_Byte_Array
    ByteArray(Vec<u8>),
    /// TAG_String
    String(String),
    /// TAG_List; the element tag is implied by the elements
    List(Vec<Value>),
    /// TAG_Compound (using `BTreeMap` for deterministic ordering)
    Compound(BTreeMap<String, Value>),
}

impl Value {
    /// The tag this value is stored under.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::String(_) => Tag::String,
            Value::List(_) => Tag::List,
            Value::Compound(_) => Tag::Compound,
        }
    }

    /// Returns true if this value is a compound.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        matches!(self, Value::Compound(_))
    }

    /// Returns true if this value is a list.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// If this is any integer tag, returns the value widened to i64.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Short(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// If this is a float or double, returns the value as f64.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteArray(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_compound(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// If this is a compound, returns a mutable reference to it.
    pub fn as_compound_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Index into a list. Returns None if not a list or index out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|l| l.get(index))
    }

    /// Look up a compound entry. Returns None if not a compound or key not found.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.as_compound().and_then(|c| c.get(key))
    }
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            _ => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(n) => write!(f, "{n}b"),
            Value::Short(n) => write!(f, "{n}s"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}L"),
            Value::Float(n) => write!(f, "{n}f"),
            Value::Double(n) => write!(f, "{n}d"),
            Value::ByteArray(bytes) => {
                write!(f, "[B;")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}b", *b as i8)?;
                }
                write!(f, "]")
            }
            Value::String(s) => write_quoted(f, s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Compound(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if is_bare_key(k) {
                        write!(f, "{k}")?;
                    } else {
                        write_quoted(f, k)?;
                    }
                    write!(f, ": {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i8> for Value {
    fn from(n: i8) -> Self {
        Value::Byte(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Byte(i8::from(b))
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Value::Short(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Compound(map)
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Byte(n) => serializer.serialize_i8(*n),
            Value::Short(n) => serializer.serialize_i16(*n),
            Value::Int(n) => serializer.serialize_i32(*n),
            Value::Long(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f32(*n),
            Value::Double(n) => serializer.serialize_f64(*n),
            Value::ByteArray(b) => serializer.serialize_bytes(b),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Compound(entries) => serializer.collect_map(entries),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "any NBT payload")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
                Ok(Value::from(v))
            }

            fn visit_i8<E>(self, v: i8) -> Result<Value, E> {
                Ok(Value::Byte(v))
            }

            fn visit_i16<E>(self, v: i16) -> Result<Value, E> {
                Ok(Value::Short(v))
            }

            fn visit_i32<E>(self, v: i32) -> Result<Value, E> {
                Ok(Value::Int(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Long(v))
            }

            fn visit_f32<E>(self, v: f32) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Double(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Value, E> {
                Ok(Value::ByteArray(v.to_vec()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Value, E> {
                Ok(Value::ByteArray(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some((key, val)) = map.next_entry()? {
                    entries.insert(key, val);
                }
                Ok(Value::Compound(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Build a [`Value::Compound`] from `key => value` pairs.
///
/// # Examples
///
/// ```rust
/// use serde_nbt::compound;
///
/// let level = compound! {
///     "name" => "Steve",
///     "health" => 20i16,
///     "pos" => vec![0.5f64, 64.0, -3.25],
/// };
/// assert_eq!(level.get_key("health").and_then(|v| v.as_i64()), Some(20));
/// ```
#[macro_export]
macro_rules! compound {
    ($($key:expr => $value:expr),* $(,)?) => {
        {
            let mut map = std::collections::BTreeMap::new();
            $(
                map.insert(String::from($key), $crate::Value::from($value));
            )*
            $crate::Value::Compound(map)
        }
    };
}
