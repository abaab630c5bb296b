//! # Info - Self-Describing Metadata Container
//!
//! `Info` maps string keys to typed values and accompanies every operation
//! of the coupling protocol: connection settings, exchange identifiers,
//! results and control signals all travel as `Info`.
//!
//! ## Value Kinds
//!
//! | Kind | Rust type | Type name |
//! |------|-----------|-----------|
//! | Integer | `i64` (`i32` accepted) | `int` |
//! | Double | `f64` | `double` |
//! | Boolean | `bool` | `bool` |
//! | String | `String` (`&str` accepted on set) | `string` |
//! | Nested | `Info` | `info` |
//!
//! ## Read Contract
//!
//! - `get` on a missing key fails with `KeyNotFound`.
//! - `get_or` on a missing key returns the default and does NOT insert it.
//! - Reading with the wrong type fails with `TypeMismatch`, with or without
//!   a default.

use crate::errors::{CoSimError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Header used by the textual rendering.
pub const INFO_HEADER: &str = "CoSimIO-Info";

/// A single typed value stored in an [`Info`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfoValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Info(Info),
}

impl InfoValue {
    /// Name of the stored type, as used in renderings and error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            InfoValue::Int(_) => "int",
            InfoValue::Double(_) => "double",
            InfoValue::Bool(_) => "bool",
            InfoValue::String(_) => "string",
            InfoValue::Info(_) => "info",
        }
    }
}

impl From<i64> for InfoValue {
    fn from(v: i64) -> Self {
        InfoValue::Int(v)
    }
}

impl From<i32> for InfoValue {
    fn from(v: i32) -> Self {
        InfoValue::Int(i64::from(v))
    }
}

impl From<f64> for InfoValue {
    fn from(v: f64) -> Self {
        InfoValue::Double(v)
    }
}

impl From<bool> for InfoValue {
    fn from(v: bool) -> Self {
        InfoValue::Bool(v)
    }
}

impl From<String> for InfoValue {
    fn from(v: String) -> Self {
        InfoValue::String(v)
    }
}

impl From<&str> for InfoValue {
    fn from(v: &str) -> Self {
        InfoValue::String(v.to_string())
    }
}

impl From<Info> for InfoValue {
    fn from(v: Info) -> Self {
        InfoValue::Info(v)
    }
}

impl From<&Info> for InfoValue {
    fn from(v: &Info) -> Self {
        InfoValue::Info(v.clone())
    }
}

/// Types that can be read back out of an [`Info`].
pub trait InfoType: Sized {
    /// Type name reported in `TypeMismatch` errors.
    const TYPE_NAME: &'static str;

    /// Extract a value of this type, `None` if the stored kind differs.
    fn from_value(value: &InfoValue) -> Option<Self>;
}

impl InfoType for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &InfoValue) -> Option<Self> {
        match value {
            InfoValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl InfoType for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &InfoValue) -> Option<Self> {
        match value {
            InfoValue::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl InfoType for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_value(value: &InfoValue) -> Option<Self> {
        match value {
            InfoValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl InfoType for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &InfoValue) -> Option<Self> {
        match value {
            InfoValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl InfoType for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &InfoValue) -> Option<Self> {
        match value {
            InfoValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl InfoType for Info {
    const TYPE_NAME: &'static str = "info";

    fn from_value(value: &InfoValue) -> Option<Self> {
        match value {
            InfoValue::Info(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Heterogeneous key/value container.
///
/// Entries are kept sorted by key, which makes the textual rendering
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    entries: BTreeMap<String, InfoValue>,
}

impl Info {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a key exists.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite a value; the stored type follows the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<InfoValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style `set`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<InfoValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Read a value of type `T`.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if the key is absent
    /// - `TypeMismatch` if the stored value has another type
    pub fn get<T: InfoType>(&self, key: &str) -> Result<T> {
        match self.entries.get(key) {
            Some(value) => Self::convert(key, value),
            None => Err(CoSimError::KeyNotFound {
                key: key.to_string(),
                available: self.keys().collect::<Vec<_>>().join(", "),
            }),
        }
    }

    /// Read a value of type `T`, falling back to `default` if the key is
    /// absent. The container is never modified.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the key exists with another type.
    pub fn get_or<T: InfoType>(&self, key: &str, default: T) -> Result<T> {
        match self.entries.get(key) {
            Some(value) => Self::convert(key, value),
            None => Ok(default),
        }
    }

    /// Borrow the raw stored value.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&InfoValue> {
        self.entries.get(key)
    }

    fn convert<T: InfoType>(key: &str, value: &InfoValue) -> Result<T> {
        T::from_value(value).ok_or_else(|| CoSimError::TypeMismatch {
            key: key.to_string(),
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    // =========================================================================
    // TYPED CONVENIENCE ACCESSORS
    // =========================================================================

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    pub fn get_int_or(&self, key: &str, default: i64) -> Result<i64> {
        self.get_or(key, default)
    }

    pub fn get_double(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    pub fn get_double_or(&self, key: &str, default: f64) -> Result<f64> {
        self.get_or(key, default)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        self.get_or(key, default)
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        self.get_or(key, default.to_string())
    }

    pub fn get_info(&self, key: &str) -> Result<Info> {
        self.get(key)
    }

    pub fn get_info_or(&self, key: &str, default: Info) -> Result<Info> {
        self.get_or(key, default)
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, value);
    }

    pub fn set_double(&mut self, key: impl Into<String>, value: f64) {
        self.set(key, value);
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, value);
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, InfoValue::String(value.into()));
    }

    /// Store a deep copy of `value`.
    pub fn set_info(&mut self, key: impl Into<String>, value: &Info) {
        self.set(key, value);
    }

    // =========================================================================
    // CONTAINER OPERATIONS
    // =========================================================================

    /// Remove a key. Absent keys are ignored.
    pub fn erase(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // =========================================================================
    // JSON CONVERSION
    // =========================================================================

    /// Convert to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(k, v)| {
                let json = match v {
                    InfoValue::Int(i) => serde_json::Value::from(*i),
                    InfoValue::Double(d) => serde_json::Value::from(*d),
                    InfoValue::Bool(b) => serde_json::Value::from(*b),
                    InfoValue::String(s) => serde_json::Value::from(s.clone()),
                    InfoValue::Info(info) => info.to_json(),
                };
                (k.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Build from a JSON object. Integral numbers become `int`, other
    /// numbers `double`, objects nested `Info`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for arrays, nulls, or a non-object root.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| CoSimError::TypeMismatch {
            key: "<root>".to_string(),
            expected: "info",
            found: json_kind(value),
        })?;

        let mut info = Info::new();
        for (key, entry) in object {
            let value = match entry {
                serde_json::Value::Bool(b) => InfoValue::Bool(*b),
                serde_json::Value::String(s) => InfoValue::String(s.clone()),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => InfoValue::Int(i),
                    None => InfoValue::Double(n.as_f64().unwrap_or(f64::NAN)),
                },
                serde_json::Value::Object(_) => InfoValue::Info(Info::from_json(entry)?),
                other => {
                    return Err(CoSimError::TypeMismatch {
                        key: key.clone(),
                        expected: "int|double|bool|string|info",
                        found: json_kind(other),
                    })
                }
            };
            info.entries.insert(key.clone(), value);
        }
        Ok(info)
    }

    /// Parse a JSON document into an `Info`.
    ///
    /// # Errors
    ///
    /// `Io` for malformed JSON, otherwise as [`Info::from_json`].
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CoSimError::Io(e.to_string()))?;
        Self::from_json(&value)
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize, expand: bool) -> fmt::Result {
        let pad = " ".repeat(indent + 2);
        for (key, value) in &self.entries {
            match value {
                InfoValue::Info(nested) if expand => {
                    writeln!(
                        f,
                        "{pad}name: {key} | type: {INFO_HEADER}; containing {} entries",
                        nested.len()
                    )?;
                    nested.render(f, indent + 2, expand)?;
                }
                InfoValue::Info(nested) => {
                    writeln!(
                        f,
                        "{pad}name: {key} | value: {} entries | type: info",
                        nested.len()
                    )?;
                }
                InfoValue::Int(v) => writeln!(f, "{pad}name: {key} | value: {v} | type: int")?,
                InfoValue::Double(v) => writeln!(
                    f,
                    "{pad}name: {key} | value: {} | type: double",
                    general_format(*v)
                )?,
                InfoValue::Bool(v) => writeln!(f, "{pad}name: {key} | value: {v} | type: bool")?,
                InfoValue::String(v) => {
                    writeln!(f, "{pad}name: {key} | value: {v} | type: string")?
                }
            }
        }
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Six significant digits, fixed or scientific notation depending on the
/// exponent, trailing zeros dropped (`0.008`, `1e-08`, `1.23457e+08`).
fn general_format(value: f64) -> String {
    const PRECISION: i32 = 6;
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific
        .split_once('e')
        .and_then(|(m, e)| e.parse::<i32>().ok().map(|e| (m, e)))
    else {
        return value.to_string();
    };

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(PRECISION - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Renders the header line followed by one line per entry sorted by key.
///
/// The alternate form (`{:#}`) expands nested containers.
impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{INFO_HEADER}; containing {} entries", self.len())?;
        self.render(f, 0, f.alternate())
    }
}
