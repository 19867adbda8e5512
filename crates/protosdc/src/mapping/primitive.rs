// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar value codecs.
//!
//! Pure functions between domain scalars and their wire sub-messages.
//! Optional strings, booleans and integers are wrapped in a `{value}`
//! message so that zero and absent stay distinguishable; required ones
//! are plain fields.

use super::naming::enum_name_to_p;
use crate::error::{Error, Result};
use crate::mdib::MdibVersionGroup;
use crate::pm::{Decimal, EnumDesc, PmValue, QName, ScalarKind};
use crate::wire::{WireMessage, WireValue};

// =======================================================================
// Decimal
// =======================================================================

/// `{value: mantissa, scale}` with value = mantissa * 10^-scale.
pub fn decimal_to_p(d: &Decimal) -> Result<WireMessage> {
    let value = i64::try_from(d.mantissa())
        .map_err(|_| Error::ValueOutOfRange(format!("decimal {} exceeds 64 bit mantissa", d)))?;
    Ok(WireMessage::new("Decimal")
        .with("value", WireValue::Int(value))
        .with("scale", WireValue::Int(i64::from(d.scale()))))
}

/// Exact inverse of [`decimal_to_p`]; absent scalars read as zero.
pub fn decimal_from_p(p: &WireMessage) -> Result<Decimal> {
    let value = p.i64("value").unwrap_or(0);
    Decimal::checked(i128::from(value), p.i64("scale").unwrap_or(0))
}

// =======================================================================
// Duration and timestamp
// =======================================================================

/// Split float seconds into `{seconds, nanos}`; nanos are truncated.
pub fn duration_to_p(seconds: f64) -> WireMessage {
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9) as i64;
    WireMessage::new("google.protobuf.Duration")
        .with("seconds", WireValue::Int(whole as i64))
        .with("nanos", WireValue::Int(nanos))
}

pub fn duration_from_p(p: &WireMessage) -> f64 {
    let seconds = p.i64("seconds").unwrap_or(0);
    let nanos = p.i64("nanos").unwrap_or(0);
    seconds as f64 + nanos as f64 / 1e9
}

/// Float seconds since the epoch to whole milliseconds.
pub fn timestamp_to_p(seconds: f64) -> Result<WireMessage> {
    if seconds < 0.0 || !seconds.is_finite() {
        return Err(Error::ValueOutOfRange(format!("timestamp {}", seconds)));
    }
    let millis = (seconds * 1000.0).round() as u64;
    Ok(WireMessage::new("TimestampMsg").with("unsigned_long", WireValue::UInt(millis)))
}

pub fn timestamp_from_p(p: &WireMessage) -> f64 {
    p.u64("unsigned_long").unwrap_or(0) as f64 / 1000.0
}

// =======================================================================
// Versions
// =======================================================================

pub fn version_counter_to_p(v: u64) -> WireMessage {
    WireMessage::new("VersionCounterMsg").with("unsigned_long", WireValue::UInt(v))
}

pub fn version_counter_from_p(p: &WireMessage) -> u64 {
    p.u64("unsigned_long").unwrap_or(0)
}

pub fn referenced_version_to_p(v: u64) -> WireMessage {
    WireMessage::new("ReferencedVersionMsg")
        .with("version_counter", WireValue::Msg(version_counter_to_p(v)))
}

pub fn referenced_version_from_p(p: &WireMessage) -> u64 {
    p.msg("version_counter")
        .map(version_counter_from_p)
        .unwrap_or(0)
}

// =======================================================================
// Wrappers
// =======================================================================

/// `{value}` wrapper of an optional scalar.
pub fn value_wrapper(type_name: &str, value: WireValue) -> WireMessage {
    WireMessage::new(type_name).with("value", value)
}

/// `{string}` wrapper of handles, references and codes.
pub fn string_wrapper(type_name: &str, s: &str) -> WireMessage {
    WireMessage::new(type_name).with("string", WireValue::Str(s.to_string()))
}

pub fn any_uri_to_p(s: &str) -> WireMessage {
    WireMessage::new("AnyURIMsg").with("any_u_r_i", WireValue::Str(s.to_string()))
}

pub fn qname_to_p(q: &QName) -> WireMessage {
    WireMessage::new("QualifiedNameMsg")
        .with("namespace", WireValue::Str(q.namespace.clone()))
        .with("local_name", WireValue::Str(q.local_name.clone()))
}

pub fn qname_from_p(p: &WireMessage) -> QName {
    QName::new(
        p.str("namespace").unwrap_or_default(),
        p.str("local_name").unwrap_or_default(),
    )
}

// =======================================================================
// Enumerations
// =======================================================================

/// Wire symbol of a domain enum member.
pub fn enum_to_p(desc: &EnumDesc, symbol: &str) -> Result<String> {
    if !desc.contains(symbol) {
        return Err(Error::TypeMismatch {
            expected: format!("member of {}", desc.name),
            found: symbol.to_string(),
        });
    }
    Ok(enum_name_to_p(symbol))
}

/// Domain member for a wire symbol, by re-deriving each member's wire name.
pub fn enum_from_p(desc: &EnumDesc, wire_symbol: &str, field: &str) -> Result<String> {
    desc.members
        .iter()
        .find(|m| enum_name_to_p(m) == wire_symbol)
        .map(|m| (*m).to_string())
        .ok_or_else(|| Error::UnknownEnum {
            value: wire_symbol.to_string(),
            field: field.to_string(),
            declaring_type: desc.name.to_string(),
        })
}

/// `{enum_type}` message of an enum attribute.
pub fn enum_attr_to_p(desc: &EnumDesc, symbol: &str) -> Result<WireMessage> {
    Ok(WireMessage::new(format!("{}Msg", desc.name))
        .with("enum_type", WireValue::Enum(enum_to_p(desc, symbol)?)))
}

pub fn enum_attr_from_p(desc: &EnumDesc, p: &WireMessage, field: &str) -> Result<String> {
    let symbol = p.enum_symbol("enum_type").ok_or_else(|| p.missing("enum_type"))?;
    enum_from_p(desc, symbol, field)
}

// =======================================================================
// Attribute scalars
// =======================================================================

fn mismatch(kind: &ScalarKind, found: &str) -> Error {
    Error::TypeMismatch {
        expected: kind.name().to_string(),
        found: found.to_string(),
    }
}

/// Encode an attribute scalar into its wire field value.
pub fn scalar_to_p(kind: &ScalarKind, optional: bool, value: &PmValue) -> Result<WireValue> {
    let wrap = |type_name: &str, v: WireValue| {
        if optional {
            WireValue::Msg(value_wrapper(type_name, v))
        } else {
            v
        }
    };
    let text = || value.as_str().ok_or_else(|| mismatch(kind, value.shape()));
    Ok(match kind {
        ScalarKind::String => wrap("google.protobuf.StringValue", WireValue::Str(text()?.into())),
        ScalarKind::Bool => {
            let b = value.as_bool().ok_or_else(|| mismatch(kind, value.shape()))?;
            wrap("google.protobuf.BoolValue", WireValue::Bool(b))
        }
        ScalarKind::Int => {
            let v = value.as_i64().ok_or_else(|| mismatch(kind, value.shape()))?;
            wrap("google.protobuf.Int64Value", WireValue::Int(v))
        }
        ScalarKind::UInt => {
            let v = value.as_u64().ok_or_else(|| mismatch(kind, value.shape()))?;
            wrap("google.protobuf.UInt64Value", WireValue::UInt(v))
        }
        ScalarKind::Decimal => {
            let d = value.as_decimal().ok_or_else(|| mismatch(kind, value.shape()))?;
            WireValue::Msg(decimal_to_p(&d)?)
        }
        ScalarKind::QualityIndicator => {
            let d = value.as_decimal().ok_or_else(|| mismatch(kind, value.shape()))?;
            WireValue::Msg(
                WireMessage::new("QualityIndicatorMsg")
                    .with("decimal", WireValue::Msg(decimal_to_p(&d)?)),
            )
        }
        ScalarKind::Duration => match value {
            PmValue::Duration(f) => WireValue::Msg(duration_to_p(*f)),
            other => return Err(mismatch(kind, other.shape())),
        },
        ScalarKind::Timestamp => match value {
            PmValue::Timestamp(f) => WireValue::Msg(timestamp_to_p(*f)?),
            other => return Err(mismatch(kind, other.shape())),
        },
        ScalarKind::Enum(desc) => WireValue::Msg(enum_attr_to_p(desc, text()?)?),
        ScalarKind::AnyUri => WireValue::Msg(any_uri_to_p(text()?)),
        ScalarKind::Handle => WireValue::Msg(string_wrapper("HandleMsg", text()?)),
        ScalarKind::HandleRef => WireValue::Msg(string_wrapper("HandleRefMsg", text()?)),
        ScalarKind::LocalizedTextRef => {
            WireValue::Msg(string_wrapper("LocalizedTextRefMsg", text()?))
        }
        ScalarKind::SymbolicCodeName => {
            WireValue::Msg(string_wrapper("SymbolicCodeNameMsg", text()?))
        }
        ScalarKind::CodeIdentifier => {
            WireValue::Msg(string_wrapper("CodeIdentifierMsg", text()?))
        }
        ScalarKind::Extension => WireValue::Msg(string_wrapper("ExtensionMsg", text()?)),
        ScalarKind::VersionCounter => {
            let v = value.as_u64().ok_or_else(|| mismatch(kind, value.shape()))?;
            WireValue::Msg(version_counter_to_p(v))
        }
        ScalarKind::ReferencedVersion => {
            let v = value.as_u64().ok_or_else(|| mismatch(kind, value.shape()))?;
            WireValue::Msg(referenced_version_to_p(v))
        }
    })
}

/// Decode an attribute scalar from its wire field value.
///
/// `field` names the wire field for diagnostics.
pub fn scalar_from_p(
    kind: &ScalarKind,
    optional: bool,
    wire: &WireValue,
    field: &str,
) -> Result<PmValue> {
    let inner = if optional
        && matches!(
            kind,
            ScalarKind::String | ScalarKind::Bool | ScalarKind::Int | ScalarKind::UInt
        ) {
        let msg = wire
            .as_msg()
            .ok_or_else(|| mismatch(kind, wire.shape()))?;
        msg.get("value").ok_or_else(|| msg.missing("value"))?
    } else {
        wire
    };
    let msg = || inner.as_msg().ok_or_else(|| mismatch(kind, inner.shape()));
    let wrapped_str = |name: &str| -> Result<PmValue> {
        let m = msg()?;
        m.str(name)
            .map(|s| PmValue::Str(s.to_string()))
            .ok_or_else(|| m.missing(name))
    };
    Ok(match kind {
        ScalarKind::String => match inner {
            WireValue::Str(s) => PmValue::Str(s.clone()),
            other => return Err(mismatch(kind, other.shape())),
        },
        ScalarKind::Bool => match inner {
            WireValue::Bool(b) => PmValue::Bool(*b),
            other => return Err(mismatch(kind, other.shape())),
        },
        ScalarKind::Int => match inner {
            WireValue::Int(v) => PmValue::Int(*v),
            other => return Err(mismatch(kind, other.shape())),
        },
        ScalarKind::UInt => match inner {
            WireValue::UInt(v) => PmValue::UInt(*v),
            other => return Err(mismatch(kind, other.shape())),
        },
        ScalarKind::Decimal => PmValue::Decimal(decimal_from_p(msg()?)?),
        ScalarKind::QualityIndicator => {
            let m = msg()?;
            PmValue::Decimal(decimal_from_p(m.require_msg("decimal")?)?)
        }
        ScalarKind::Duration => PmValue::Duration(duration_from_p(msg()?)),
        ScalarKind::Timestamp => PmValue::Timestamp(timestamp_from_p(msg()?)),
        ScalarKind::Enum(desc) => PmValue::Enum(enum_attr_from_p(desc, msg()?, field)?),
        ScalarKind::AnyUri => wrapped_str("any_u_r_i")?,
        ScalarKind::Handle
        | ScalarKind::HandleRef
        | ScalarKind::LocalizedTextRef
        | ScalarKind::SymbolicCodeName
        | ScalarKind::CodeIdentifier
        | ScalarKind::Extension => wrapped_str("string")?,
        ScalarKind::VersionCounter => PmValue::UInt(version_counter_from_p(msg()?)),
        ScalarKind::ReferencedVersion => PmValue::UInt(referenced_version_from_p(msg()?)),
    })
}

// =======================================================================
// Attribute lists
// =======================================================================

/// `{handle_ref: [{string}]}`.
pub fn handle_ref_list_to_p(values: &[PmValue]) -> Result<WireMessage> {
    let mut p = WireMessage::new("HandleRefListMsg");
    for v in values {
        let s = v
            .as_str()
            .ok_or_else(|| mismatch(&ScalarKind::HandleRef, v.shape()))?;
        p.push("handle_ref", WireValue::Msg(string_wrapper("HandleRefMsg", s)));
    }
    Ok(p)
}

pub fn handle_ref_list_from_p(p: &WireMessage) -> Result<Vec<PmValue>> {
    p.repeated_msgs("handle_ref")?
        .into_iter()
        .map(|m| {
            m.str("string")
                .map(|s| PmValue::Str(s.to_string()))
                .ok_or_else(|| m.missing("string"))
        })
        .collect()
}

/// `{decimal: [Decimal]}`.
pub fn decimal_list_to_p(values: &[PmValue]) -> Result<WireMessage> {
    let mut p = WireMessage::new("DecimalListMsg");
    for v in values {
        let d = v
            .as_decimal()
            .ok_or_else(|| mismatch(&ScalarKind::Decimal, v.shape()))?;
        p.push("decimal", WireValue::Msg(decimal_to_p(&d)?));
    }
    Ok(p)
}

pub fn decimal_list_from_p(p: &WireMessage) -> Result<Vec<PmValue>> {
    p.repeated_msgs("decimal")?
        .into_iter()
        .map(|m| decimal_from_p(m).map(PmValue::Decimal))
        .collect()
}

// =======================================================================
// Mdib version group
// =======================================================================

/// Fill a version group message: the version only when non-zero, the
/// instance id only when known.
pub fn set_mdib_version_group(p: &mut WireMessage, group: &MdibVersionGroup) {
    if group.mdib_version > 0 {
        p.set(
            "mdib_version_attr",
            WireValue::Msg(version_counter_to_p(group.mdib_version)),
        );
    }
    p.set(
        "sequence_id_attr",
        WireValue::Str(group.sequence_id.clone()),
    );
    if let Some(instance_id) = group.instance_id {
        p.set(
            "instance_id_attr",
            WireValue::Msg(value_wrapper(
                "google.protobuf.UInt64Value",
                WireValue::UInt(instance_id),
            )),
        );
    }
}

pub fn mdib_version_group_to_p(group: &MdibVersionGroup) -> WireMessage {
    let mut p = WireMessage::new("MdibVersionGroupMsg");
    set_mdib_version_group(&mut p, group);
    p
}

/// Read a version group; a missing version reads as 0.
pub fn mdib_version_group_from_p(p: &WireMessage) -> MdibVersionGroup {
    MdibVersionGroup {
        mdib_version: p
            .msg("mdib_version_attr")
            .map(version_counter_from_p)
            .unwrap_or(0),
        sequence_id: p.str("sequence_id_attr").unwrap_or_default().to_string(),
        instance_id: p.msg("instance_id_attr").and_then(|m| m.u64("value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::enums::{COMPONENT_ACTIVATION, METRIC_CATEGORY};

    fn d(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn test_decimal_exactness() {
        for s in ["0.01", "-123.456", "0", "1E+3", "99999999999.999999"] {
            let p = decimal_to_p(&d(s)).expect("encode");
            let back = decimal_from_p(&p).expect("decode");
            assert_eq!(back, d(s), "{}", s);
            assert_eq!(back.to_string(), d(s).to_string());
        }
        let p = decimal_to_p(&d("-123.456")).expect("encode");
        assert_eq!(p.i64("value"), Some(-123456));
        assert_eq!(p.i64("scale"), Some(3));
    }

    #[test]
    fn test_decimal_random_exactness() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let value = Decimal::new(i128::from(rng.i64(..)), rng.i32(-6..12));
            let back = decimal_from_p(&decimal_to_p(&value).expect("encode")).expect("decode");
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_decimal_scale_out_of_range() {
        for scale in [i64::from(i32::MAX), i64::from(i32::MIN), 1001, -1001] {
            let p = WireMessage::new("Decimal")
                .with("value", WireValue::Int(1))
                .with("scale", WireValue::Int(scale));
            assert!(
                matches!(decimal_from_p(&p), Err(Error::ValueOutOfRange(_))),
                "scale {}",
                scale
            );
        }
    }

    #[test]
    fn test_duration_split() {
        let p = duration_to_p(2.5);
        assert_eq!(p.i64("seconds"), Some(2));
        assert_eq!(p.i64("nanos"), Some(500_000_000));
        assert!((duration_from_p(&p) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_enum_roundtrip_and_rejection() {
        for m in COMPONENT_ACTIVATION.members {
            let p = enum_attr_to_p(&COMPONENT_ACTIVATION, m).expect("encode");
            let back = enum_attr_from_p(&COMPONENT_ACTIVATION, &p, "activation_state_attr")
                .expect("decode");
            assert_eq!(back, *m);
        }
        let bogus = WireMessage::new("MetricCategoryMsg")
            .with("enum_type", WireValue::Enum("NOT_A_CATEGORY".into()));
        let err = enum_attr_from_p(&METRIC_CATEGORY, &bogus, "metric_category_attr")
            .expect_err("unknown enum");
        assert!(matches!(err, Error::UnknownEnum { .. }));
        assert!(err.to_string().contains("MetricCategory"));
    }

    #[test]
    fn test_optional_wrappers_distinguish_zero() {
        let w = scalar_to_p(&ScalarKind::UInt, true, &PmValue::UInt(0)).expect("encode");
        assert!(matches!(&w, WireValue::Msg(m) if m.u64("value") == Some(0)));
        let back = scalar_from_p(&ScalarKind::UInt, true, &w, "x").expect("decode");
        assert_eq!(back, PmValue::UInt(0));
        let plain = scalar_to_p(&ScalarKind::Bool, false, &PmValue::Bool(true)).expect("encode");
        assert_eq!(plain, WireValue::Bool(true));
    }

    #[test]
    fn test_version_group_omits_zero_version() {
        let group = MdibVersionGroup::new(0, "urn:uuid:seq", None);
        let p = mdib_version_group_to_p(&group);
        assert!(!p.has("mdib_version_attr"));
        assert!(!p.has("instance_id_attr"));
        assert_eq!(mdib_version_group_from_p(&p), group);
        let group = MdibVersionGroup::new(17, "urn:uuid:seq", Some(3));
        assert_eq!(mdib_version_group_from_p(&mdib_version_group_to_p(&group)), group);
    }
}
