// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic instances of domain classes.

use super::class::{PmClass, PropDesc};
use super::value::PmValue;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// An instance of a [`PmClass`]; absent properties have no entry.
#[derive(Clone)]
pub struct PmObject {
    class: &'static PmClass,
    values: BTreeMap<&'static str, PmValue>,
}

impl PmObject {
    /// Create an instance with every property absent.
    pub fn new(class: &'static PmClass) -> Self {
        Self {
            class,
            values: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn class(&self) -> &'static PmClass {
        self.class
    }

    #[inline]
    pub fn class_name(&self) -> &'static str {
        self.class.name
    }

    /// Value of a property, `None` when absent.
    pub fn get(&self, name: &str) -> Option<&PmValue> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PmValue> {
        self.values.get_mut(name)
    }

    /// Set a property after checking name and value shape.
    ///
    /// Setting an empty list removes the property.
    pub fn set(&mut self, name: &str, value: impl Into<PmValue>) -> Result<()> {
        let prop = self.prop(name)?;
        let value = value.into();
        if !value.fits(&prop.kind) {
            return Err(Error::TypeMismatch {
                expected: format!("{:?} for {}.{}", prop.kind, self.class.name, name),
                found: value.shape().to_string(),
            });
        }
        self.insert(prop, value);
        Ok(())
    }

    /// Builder form of [`PmObject::set`].
    pub fn with(mut self, name: &str, value: impl Into<PmValue>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Remove a property value.
    pub fn remove(&mut self, name: &str) -> Option<PmValue> {
        self.values.remove(name)
    }

    /// Store a decoded value; the caller guarantees the shape.
    pub(crate) fn insert(&mut self, prop: &'static PropDesc, value: PmValue) {
        if value.is_empty_list() {
            self.values.remove(prop.name);
        } else {
            self.values.insert(prop.name, value);
        }
    }

    fn prop(&self, name: &str) -> Result<&'static PropDesc> {
        self.class
            .find_prop(name)
            .ok_or_else(|| Error::UnknownProperty {
                class: self.class.name.to_string(),
                property: name.to_string(),
            })
    }

    /// Present properties.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PmValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PmValue::as_str)
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(PmValue::as_u64)
    }

    pub fn node(&self, name: &str) -> Option<&PmObject> {
        self.get(name).and_then(PmValue::as_node)
    }

    /// List property, empty when absent.
    pub fn list(&self, name: &str) -> &[PmValue] {
        self.get(name).and_then(PmValue::as_list).unwrap_or(&[])
    }

    /// `Handle` of descriptors and context states.
    pub fn handle(&self) -> Option<&str> {
        self.str("Handle")
    }

    /// `DescriptorHandle` of states.
    pub fn descriptor_handle(&self) -> Option<&str> {
        self.str("DescriptorHandle")
    }

    /// `DescriptorVersion`, absent counts as 0.
    pub fn descriptor_version(&self) -> u64 {
        self.u64("DescriptorVersion").unwrap_or(0)
    }

    /// `StateVersion`, absent counts as 0.
    pub fn state_version(&self) -> u64 {
        self.u64("StateVersion").unwrap_or(0)
    }

    /// Copy every property of `other` into `self`, keeping this instance.
    pub fn update_from(&mut self, other: &PmObject) {
        if self.class.name != other.class.name {
            log::warn!(
                "[pm] updating {} from instance of {}",
                self.class.name,
                other.class.name
            );
        }
        self.values.clone_from(&other.values);
    }
}

impl PartialEq for PmObject {
    fn eq(&self, other: &Self) -> bool {
        self.class.name == other.class.name && self.values == other.values
    }
}

impl fmt::Debug for PmObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.class.name);
        for (k, v) in &self.values {
            s.field(k, v);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::descriptors::NUMERIC_METRIC_DESCRIPTOR;
    use crate::pm::types::CODED_VALUE;

    #[test]
    fn test_set_validates_name_and_shape() {
        let mut d = PmObject::new(&NUMERIC_METRIC_DESCRIPTOR);
        d.set("Handle", "m1").expect("handle");
        assert_eq!(d.handle(), Some("m1"));
        assert!(matches!(
            d.set("Bogus", "x"),
            Err(Error::UnknownProperty { .. })
        ));
        assert!(matches!(
            d.set("MetricCategory", PmValue::Enum("Nope".into())),
            Err(Error::TypeMismatch { .. })
        ));
        let unit = PmObject::new(&CODED_VALUE).with("Code", "262688").expect("code");
        d.set("Unit", unit).expect("unit");
        assert_eq!(d.node("Unit").and_then(|u| u.str("Code")), Some("262688"));
    }

    #[test]
    fn test_update_from_keeps_identity() {
        let mut a = PmObject::new(&NUMERIC_METRIC_DESCRIPTOR)
            .with("Handle", "m1")
            .expect("a");
        let b = PmObject::new(&NUMERIC_METRIC_DESCRIPTOR)
            .with("Handle", "m1")
            .and_then(|o| o.with("DescriptorVersion", PmValue::UInt(3)))
            .expect("b");
        let before: *const PmObject = &a;
        a.update_from(&b);
        assert_eq!(a.descriptor_version(), 3);
        assert!(std::ptr::eq(before, &a));
    }
}
