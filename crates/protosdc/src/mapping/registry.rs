// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class and message-type registries.
//!
//! Built once on first use from the static class tables. Descriptor and
//! state registries also pair every descriptor class with its state
//! class.

use super::generic;
use super::oneof::{find_populated_one_of, OneOfFamily};
use crate::error::{Error, Result};
use crate::pm::{descriptors, states, types, PmClass, PmObject};
use crate::wire::WireMessage;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Bidirectional class name / message type map.
pub struct TypeRegistry {
    by_name: HashMap<&'static str, &'static PmClass>,
    by_msg: HashMap<&'static str, &'static PmClass>,
}

impl TypeRegistry {
    fn build(classes: &[&'static PmClass]) -> Self {
        let mut by_name = HashMap::with_capacity(classes.len());
        let mut by_msg = HashMap::with_capacity(classes.len());
        for class in classes {
            by_name.insert(class.name, *class);
            by_msg.insert(class.msg, *class);
        }
        Self { by_name, by_msg }
    }

    pub fn by_name(&self, name: &str) -> Option<&'static PmClass> {
        self.by_name.get(name).copied()
    }

    pub fn by_msg(&self, type_name: &str) -> Option<&'static PmClass> {
        self.by_msg.get(type_name).copied()
    }

    pub fn contains(&self, class: &PmClass) -> bool {
        self.by_name.contains_key(class.name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Concrete descriptor classes.
pub fn descriptor_registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| TypeRegistry::build(descriptors::CONCRETE))
}

/// Concrete state classes.
pub fn state_registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| TypeRegistry::build(states::CONCRETE))
}

/// Property types.
pub fn property_registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| TypeRegistry::build(types::ALL))
}

/// Class registered for a wire message type.
pub fn class_for_msg(type_name: &str) -> Result<&'static PmClass> {
    descriptor_registry()
        .by_msg(type_name)
        .or_else(|| state_registry().by_msg(type_name))
        .or_else(|| property_registry().by_msg(type_name))
        .ok_or_else(|| Error::UnregisteredType(type_name.to_string()))
}

/// Class registered under a domain class name.
pub fn class_for_name(name: &str) -> Result<&'static PmClass> {
    descriptor_registry()
        .by_name(name)
        .or_else(|| state_registry().by_name(name))
        .or_else(|| property_registry().by_name(name))
        .ok_or_else(|| Error::UnregisteredType(name.to_string()))
}

/// Wire message type of a registered class.
pub fn msg_for_class(class: &PmClass) -> Result<&'static str> {
    let registered = descriptor_registry().contains(class)
        || state_registry().contains(class)
        || property_registry().contains(class);
    if !registered {
        return Err(Error::UnregisteredType(class.name.to_string()));
    }
    Ok(class.msg)
}

/// State class paired with a descriptor class.
pub fn state_class_for(descriptor_class: &PmClass) -> Result<&'static PmClass> {
    let stem = descriptor_class
        .name
        .strip_suffix("Descriptor")
        .ok_or_else(|| Error::UnregisteredType(descriptor_class.name.to_string()))?;
    state_registry()
        .by_name(&format!("{}State", stem))
        .ok_or_else(|| Error::UnregisteredType(format!("{}State", stem)))
}

/// Descriptor class paired with a state class.
pub fn descriptor_class_for(state_class: &PmClass) -> Result<&'static PmClass> {
    let stem = state_class
        .name
        .strip_suffix("State")
        .ok_or_else(|| Error::UnregisteredType(state_class.name.to_string()))?;
    descriptor_registry()
        .by_name(&format!("{}Descriptor", stem))
        .ok_or_else(|| Error::UnregisteredType(format!("{}Descriptor", stem)))
}

/// Encode a descriptor into the union of `family`.
pub fn descriptor_to_one_of(descriptor: &PmObject, family: OneOfFamily) -> Result<WireMessage> {
    if !descriptor_registry().contains(descriptor.class()) {
        return Err(Error::UnregisteredType(descriptor.class_name().to_string()));
    }
    family.wrap(descriptor.class(), generic::to_p(descriptor)?)
}

/// Encode a state into the union of `family`.
pub fn state_to_one_of(state: &PmObject, family: OneOfFamily) -> Result<WireMessage> {
    if !state_registry().contains(state.class()) {
        return Err(Error::UnregisteredType(state.class_name().to_string()));
    }
    family.wrap(state.class(), generic::to_p(state)?)
}

/// Decode a descriptor from a union or a plain descriptor message.
pub fn descriptor_from_p(p: &WireMessage) -> Result<PmObject> {
    let inner = find_populated_one_of(p)?;
    let class = descriptor_registry()
        .by_msg(inner.type_name())
        .ok_or_else(|| Error::UnregisteredType(inner.type_name().to_string()))?;
    generic::from_p_as(class, inner)
}

/// Decode a state from a union or a plain state message.
pub fn state_from_p(p: &WireMessage) -> Result<PmObject> {
    let inner = find_populated_one_of(p)?;
    let class = state_registry()
        .by_msg(inner.type_name())
        .ok_or_else(|| Error::UnregisteredType(inner.type_name().to_string()))?;
    generic::from_p_as(class, inner)
}
