//! Tri-state optional fields.
//!
//! Update commands must tell the renderer three different things about a field:
//! leave it alone, clear it, or set it. A plain `Option` can only say two of them.
//!
//! Serialization mapping (use together with
//! `#[serde(default, skip_serializing_if = "Field::is_unset")]`):
//!
//! | variant    | JSON          |
//! |------------|---------------|
//! | `Unset`    | key omitted   |
//! | `Clear`    | `null`        |
//! | `Value(v)` | `v`           |

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    /// No instruction: the renderer keeps its current state.
    #[default]
    Unset,
    /// Explicitly reset to "nothing".
    Clear,
    /// Explicitly set.
    Value(T),
}

impl<T> Field<T> {
    /// `Some` becomes `Value`, `None` becomes `Unset`.
    pub fn supplied(value: Option<T>) -> Self {
        value.map_or(Field::Unset, Field::Value)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Unset => Field::Unset,
            Field::Clear => Field::Clear,
            Field::Value(v) => Field::Value(f(v)),
        }
    }

    /// Like [`Field::map`] for fallible conversions.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Field<U>, E> {
        Ok(match self {
            Field::Unset => Field::Unset,
            Field::Clear => Field::Clear,
            Field::Value(v) => Field::Value(f(v)?),
        })
    }

    /// Apply this instruction to a piece of rendered state.
    pub fn merge_into(self, slot: &mut Option<T>) {
        match self {
            Field::Unset => {}
            Field::Clear => *slot = None,
            Field::Value(v) => *slot = Some(v),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    /// `None` becomes `Clear`: on the add path a missing value is still an explicit
    /// "nothing", never "keep what was there".
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Clear,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Unset | Field::Clear => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    /// Only called when the key is present; a missing key falls back to
    /// `Default` (`Unset`) through `#[serde(default)]`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}
