// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain values.

use super::class::{PropKind, ScalarKind};
use super::decimal::Decimal;
use super::object::PmObject;

/// Tolerance for comparing float-valued durations and timestamps.
pub const FLOAT_TOLERANCE: f64 = 1e-6;

/// Qualified XML name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Namespace URI.
    pub namespace: String,
    pub local_name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }
}

/// A domain property value.
#[derive(Debug, Clone)]
pub enum PmValue {
    /// String-like scalars: text, handles, URIs and codes.
    Str(String),
    Bool(bool),
    Int(i64),
    /// Unsigned scalars, version counters included.
    UInt(u64),
    /// Exact decimal value.
    Decimal(Decimal),
    /// Seconds.
    Duration(f64),
    /// Seconds since the epoch.
    Timestamp(f64),
    /// Domain enum member symbol.
    Enum(String),
    /// Qualified name.
    QName(QName),
    /// Nested object of a property type class.
    Node(PmObject),
    /// Values of a list property, all of the same shape.
    List(Vec<PmValue>),
}

impl PmValue {
    /// Shape name used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Str(_) => "Str",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::UInt(_) => "UInt",
            Self::Decimal(_) => "Decimal",
            Self::Duration(_) => "Duration",
            Self::Timestamp(_) => "Timestamp",
            Self::Enum(_) => "Enum",
            Self::QName(_) => "QName",
            Self::Node(_) => "Node",
            Self::List(_) => "List",
        }
    }

    /// Empty lists count as absent.
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Self::List(v) if v.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Duration(v) | Self::Timestamp(v) => Some(*v),
            Self::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&PmObject> {
        match self {
            Self::Node(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut PmObject> {
        match self {
            Self::Node(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PmValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Check that the value has the shape `kind` expects.
    pub fn fits(&self, kind: &PropKind) -> bool {
        match kind {
            PropKind::Attr(s) => self.fits_scalar(s),
            PropKind::HandleRefList | PropKind::HandleRefElementList | PropKind::TextList => {
                matches!(self, Self::List(v) if v.iter().all(|e| matches!(e, Self::Str(_))))
            }
            PropKind::DecimalList => {
                matches!(self, Self::List(v) if v.iter().all(|e| matches!(e, Self::Decimal(_))))
            }
            PropKind::Text => matches!(self, Self::Str(_)),
            PropKind::EnumText(e) => matches!(self, Self::Enum(s) if e.contains(s)),
            PropKind::QName => matches!(self, Self::QName(_)),
            PropKind::Node(cls) => matches!(self, Self::Node(o) if o.class().is_subclass_of(cls)),
            PropKind::NodeList(cls) => matches!(self, Self::List(v) if v
                .iter()
                .all(|e| matches!(e, Self::Node(o) if o.class().is_subclass_of(cls)))),
        }
    }

    fn fits_scalar(&self, kind: &ScalarKind) -> bool {
        match kind {
            ScalarKind::String
            | ScalarKind::AnyUri
            | ScalarKind::Handle
            | ScalarKind::HandleRef
            | ScalarKind::LocalizedTextRef
            | ScalarKind::SymbolicCodeName
            | ScalarKind::CodeIdentifier
            | ScalarKind::Extension => matches!(self, Self::Str(_)),
            ScalarKind::Bool => matches!(self, Self::Bool(_)),
            ScalarKind::Int => matches!(self, Self::Int(_)),
            ScalarKind::UInt | ScalarKind::VersionCounter | ScalarKind::ReferencedVersion => {
                matches!(self, Self::UInt(_))
            }
            ScalarKind::Decimal | ScalarKind::QualityIndicator => matches!(self, Self::Decimal(_)),
            ScalarKind::Duration => matches!(self, Self::Duration(_)),
            ScalarKind::Timestamp => matches!(self, Self::Timestamp(_)),
            ScalarKind::Enum(e) => matches!(self, Self::Enum(s) if e.contains(s)),
        }
    }
}

impl PartialEq for PmValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) | (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) | (Self::Timestamp(a), Self::Timestamp(b)) => {
                (a - b).abs() < FLOAT_TOLERANCE
            }
            (Self::QName(a), Self::QName(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for PmValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for PmValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for PmValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Decimal> for PmValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<PmObject> for PmValue {
    fn from(o: PmObject) -> Self {
        Self::Node(o)
    }
}

impl From<QName> for PmValue {
    fn from(q: QName) -> Self {
        Self::QName(q)
    }
}

impl<T: Into<PmValue>> From<Vec<T>> for PmValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_equality_uses_tolerance() {
        assert_eq!(PmValue::Duration(0.3), PmValue::Duration(0.299_999_999));
        assert_ne!(PmValue::Duration(0.3), PmValue::Duration(0.31));
        assert_ne!(PmValue::Duration(1.0), PmValue::Timestamp(1.0));
    }

    #[test]
    fn test_list_conversion() {
        let v: PmValue = vec!["a", "b"].into();
        assert_eq!(v.as_list().map(<[PmValue]>::len), Some(2));
        assert!(PmValue::List(Vec::new()).is_empty_list());
    }
}
