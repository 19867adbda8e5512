// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Participant model: the typed vocabulary of descriptors, states and
//! the property types they are built from.
//!
//! Types are described by static field tables ([`PmClass`]) and
//! instantiated as [`PmObject`]s. The mapper in [`crate::mapping`]
//! walks the tables to convert instances to and from wire messages.
//!
//! # Example
//!
//! ```
//! use protosdc::pm::{descriptors, types, PmObject, PmValue};
//!
//! let unit = PmObject::new(&types::CODED_VALUE).with("Code", "262688")?;
//! let metric = PmObject::new(&descriptors::NUMERIC_METRIC_DESCRIPTOR)
//!     .with("Handle", "hr")?
//!     .with("Unit", unit)?
//!     .with("MetricCategory", PmValue::Enum("Msrmt".into()))?
//!     .with("MetricAvailability", PmValue::Enum("Cont".into()))?
//!     .with("Resolution", "0.1".parse::<protosdc::pm::Decimal>()?)?;
//! assert_eq!(metric.handle(), Some("hr"));
//! # Ok::<(), protosdc::Error>(())
//! ```

pub mod class;
mod decimal;
pub mod descriptors;
pub mod enums;
mod object;
pub mod states;
pub mod types;
mod value;

pub use class::{EnumDesc, PmClass, PropDesc, PropKind, ScalarKind};
pub use decimal::Decimal;
pub use object::PmObject;
pub use value::{PmValue, QName, FLOAT_TOLERANCE};
