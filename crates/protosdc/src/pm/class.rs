// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-descriptor tables for domain classes.
//!
//! Every domain type is a static [`PmClass`]: an ordered list of the
//! properties declared at its own inheritance level plus a link to its
//! parent class. The mapper walks these tables instead of inspecting
//! types at runtime.

use std::fmt;

/// Scalar shape of an attribute-like property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// Plain string.
    String,
    Bool,
    /// Signed 64 bit integer.
    Int,
    /// Unsigned 64 bit integer.
    UInt,
    /// Exact decimal, wrapped as `{value, scale}`.
    Decimal,
    /// Seconds, wrapped as `{seconds, nanos}`.
    Duration,
    /// Seconds since the epoch, sent as unsigned milliseconds.
    Timestamp,
    /// Member of a closed enumeration; unknown symbols are rejected.
    Enum(&'static EnumDesc),
    /// URI string in a wrapper message.
    AnyUri,
    /// Descriptor or context state handle declaration.
    Handle,
    /// Reference to a handle declared elsewhere.
    HandleRef,
    /// Reference into a localized text table.
    LocalizedTextRef,
    /// Symbolic code name of a coded value.
    SymbolicCodeName,
    /// Code or coding system identifier.
    CodeIdentifier,
    /// Extension payload.
    Extension,
    /// `DescriptorVersion`, `StateVersion` and similar counters.
    VersionCounter,
    /// Counter referring to another object's version.
    ReferencedVersion,
    /// Quality indicator in `[0, 1]`.
    QualityIndicator,
}

impl ScalarKind {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Decimal => "Decimal",
            Self::Duration => "Duration",
            Self::Timestamp => "Timestamp",
            Self::Enum(e) => e.name,
            Self::AnyUri => "AnyURI",
            Self::Handle => "Handle",
            Self::HandleRef => "HandleRef",
            Self::LocalizedTextRef => "LocalizedTextRef",
            Self::SymbolicCodeName => "SymbolicCodeName",
            Self::CodeIdentifier => "CodeIdentifier",
            Self::Extension => "Extension",
            Self::VersionCounter => "VersionCounter",
            Self::ReferencedVersion => "ReferencedVersion",
            Self::QualityIndicator => "QualityIndicator",
        }
    }
}

/// Kind tag of a property; selects the encode/decode rule.
#[derive(Clone, Copy)]
pub enum PropKind {
    /// Attribute scalar.
    Attr(ScalarKind),
    /// Attribute holding a whitespace list of handle references.
    HandleRefList,
    /// Attribute holding a list of decimals.
    DecimalList,
    /// Element with text content.
    Text,
    /// Element with enumerated text content.
    EnumText(&'static EnumDesc),
    /// Element holding a qualified name.
    QName,
    /// Single nested element.
    Node(&'static PmClass),
    /// Repeated nested elements.
    NodeList(&'static PmClass),
    /// Repeated elements, each a handle reference.
    HandleRefElementList,
    /// Repeated text elements.
    TextList,
}

impl PropKind {
    /// Attribute kinds get the `_attr` wire suffix.
    pub fn is_attribute(&self) -> bool {
        matches!(self, Self::Attr(_) | Self::HandleRefList | Self::DecimalList)
    }

    /// Kinds whose domain value is a list.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Self::HandleRefList
                | Self::DecimalList
                | Self::NodeList(_)
                | Self::HandleRefElementList
                | Self::TextList
        )
    }
}

impl fmt::Debug for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attr(s) => write!(f, "Attr({})", s.name()),
            Self::HandleRefList => f.write_str("HandleRefList"),
            Self::DecimalList => f.write_str("DecimalList"),
            Self::Text => f.write_str("Text"),
            Self::EnumText(e) => write!(f, "EnumText({})", e.name),
            Self::QName => f.write_str("QName"),
            Self::Node(c) => write!(f, "Node({})", c.name),
            Self::NodeList(c) => write!(f, "NodeList({})", c.name),
            Self::HandleRefElementList => f.write_str("HandleRefElementList"),
            Self::TextList => f.write_str("TextList"),
        }
    }
}

/// One declared property.
#[derive(Clone, Copy, Debug)]
pub struct PropDesc {
    /// Domain property name (e.g. `DescriptorHandle`).
    pub name: &'static str,
    /// Kind tag.
    pub kind: PropKind,
    /// Absent values are allowed.
    pub optional: bool,
}

/// Optional property.
pub const fn opt(name: &'static str, kind: PropKind) -> PropDesc {
    PropDesc {
        name,
        kind,
        optional: true,
    }
}

/// Required property.
pub const fn req(name: &'static str, kind: PropKind) -> PropDesc {
    PropDesc {
        name,
        kind,
        optional: false,
    }
}

/// Enumeration with its domain member symbols.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDesc {
    /// Enum type name.
    pub name: &'static str,
    /// Member symbols in declaration order.
    pub members: &'static [&'static str],
}

impl EnumDesc {
    /// Check whether `symbol` is a member.
    pub fn contains(&self, symbol: &str) -> bool {
        self.members.iter().any(|m| *m == symbol)
    }
}

/// Domain class: own properties plus parent link.
pub struct PmClass {
    /// Domain class name.
    pub name: &'static str,
    /// Parent in the inheritance chain.
    pub parent: Option<&'static PmClass>,
    /// Wire message type for this inheritance level.
    pub msg: &'static str,
    /// Properties declared at this level, in wire order.
    pub props: &'static [PropDesc],
}

impl PmClass {
    /// Inheritance chain, least-derived first, ending with `self`.
    pub fn chain(&'static self) -> Vec<&'static PmClass> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(cls) = current {
            chain.push(cls);
            current = cls.parent;
        }
        chain.reverse();
        chain
    }

    /// `self` equals `other` or derives from it.
    pub fn is_subclass_of(&self, other: &PmClass) -> bool {
        let mut current = Some(self);
        while let Some(cls) = current {
            if cls.name == other.name {
                return true;
            }
            current = cls.parent;
        }
        false
    }

    /// Find a property anywhere in the chain.
    pub fn find_prop(&'static self, name: &str) -> Option<&'static PropDesc> {
        let mut current = Some(self);
        while let Some(cls) = current {
            if let Some(p) = cls.props.iter().find(|p| p.name == name) {
                return Some(p);
            }
            current = cls.parent;
        }
        None
    }

    /// All properties of the chain, least-derived level first.
    pub fn all_props(&'static self) -> impl Iterator<Item = &'static PropDesc> {
        self.chain().into_iter().flat_map(|c| c.props.iter())
    }
}

impl PartialEq for PmClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PmClass {}

impl fmt::Debug for PmClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PmClass({})", self.name)
    }
}
