// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged hierarchical wire messages.
//!
//! A [`WireMessage`] is a named message type with presence-checkable
//! fields. Sub-messages are created on first mutable access, which makes
//! them present even when empty, the same way generated message code
//! behaves for singular message fields.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Suffix of every tagged-union message type name.
pub const ONE_OF_SUFFIX: &str = "OneOfMsg";

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Str(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Upper-case, underscore separated enum symbol.
    Enum(String),
    Msg(WireMessage),
    Repeated(Vec<WireValue>),
}

impl WireValue {
    /// Shape name used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Enum(_) => "enum",
            Self::Msg(_) => "message",
            Self::Repeated(_) => "repeated",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_msg(&self) -> Option<&WireMessage> {
        match self {
            Self::Msg(m) => Some(m),
            _ => None,
        }
    }
}

/// A wire message instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WireMessage {
    type_name: String,
    fields: BTreeMap<String, WireValue>,
}

impl WireMessage {
    /// Create an empty message of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Tagged unions are recognised by their type name.
    pub fn is_one_of(&self) -> bool {
        self.type_name.ends_with(ONE_OF_SUFFIX)
    }

    /// Presence check.
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&WireValue> {
        self.fields.get(field)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: WireValue) {
        self.fields.insert(field.into(), value);
    }

    /// Builder form of [`WireMessage::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: WireValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<WireValue> {
        self.fields.remove(field)
    }

    /// Sub-message, created (and thereby made present) if absent.
    pub fn msg_mut(&mut self, field: &str, type_name: &str) -> &mut WireMessage {
        let slot = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| WireValue::Msg(WireMessage::new(type_name)));
        if !matches!(slot, WireValue::Msg(_)) {
            *slot = WireValue::Msg(WireMessage::new(type_name));
        }
        match slot {
            WireValue::Msg(m) => m,
            _ => unreachable!("slot was just set to a message"),
        }
    }

    /// Present sub-message.
    pub fn msg(&self, field: &str) -> Option<&WireMessage> {
        self.get(field).and_then(WireValue::as_msg)
    }

    /// Present sub-message or a `MissingField` error.
    pub fn require_msg(&self, field: &str) -> Result<&WireMessage> {
        self.msg(field).ok_or_else(|| self.missing(field))
    }

    /// Append to a repeated field.
    pub fn push(&mut self, field: &str, value: WireValue) {
        let slot = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| WireValue::Repeated(Vec::new()));
        match slot {
            WireValue::Repeated(v) => v.push(value),
            other => *other = WireValue::Repeated(vec![value]),
        }
    }

    /// Elements of a repeated field, empty when absent.
    pub fn repeated(&self, field: &str) -> &[WireValue] {
        match self.get(field) {
            Some(WireValue::Repeated(v)) => v,
            _ => &[],
        }
    }

    /// Messages of a repeated field; non-message elements are an error.
    pub fn repeated_msgs(&self, field: &str) -> Result<Vec<&WireMessage>> {
        self.repeated(field)
            .iter()
            .map(|v| {
                v.as_msg().ok_or_else(|| Error::TypeMismatch {
                    expected: format!("message in {}.{}", self.type_name, field),
                    found: v.shape().to_string(),
                })
            })
            .collect()
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(WireValue::as_str)
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            Some(WireValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn i64(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            Some(WireValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn u64(&self, field: &str) -> Option<u64> {
        match self.get(field) {
            Some(WireValue::UInt(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn enum_symbol(&self, field: &str) -> Option<&str> {
        match self.get(field) {
            Some(WireValue::Enum(s)) => Some(s),
            _ => None,
        }
    }

    /// Present fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn missing(&self, field: &str) -> Error {
        Error::MissingField {
            message_type: self.type_name.clone(),
            field: field.to_string(),
        }
    }
}
