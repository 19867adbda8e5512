// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bidirectional mapping between domain objects and wire messages.
//!
//! - [`naming`]: wire field names from domain names
//! - [`primitive`]: scalar codecs (decimal, duration, enums, versions)
//! - [`generic`]: the structural walker over class projections
//! - [`registry`]: class / message-type lookup and union helpers
//!
//! # Example
//!
//! ```
//! use protosdc::mapping::{from_p, to_p};
//! use protosdc::pm::{types, PmObject};
//!
//! let code = PmObject::new(&types::CODED_VALUE).with("Code", "262688")?;
//! let p = to_p(&code)?;
//! assert_eq!(p.type_name(), "CodedValueMsg");
//! assert_eq!(from_p(&p)?, code);
//! # Ok::<(), protosdc::Error>(())
//! ```

pub mod generic;
pub mod naming;
mod oneof;
pub mod primitive;
pub mod registry;
mod special;

pub use generic::{from_p, from_p_as, to_p};
pub use oneof::{find_populated_one_of, OneOfFamily};
pub use registry::{
    descriptor_from_p, descriptor_to_one_of, state_from_p, state_to_one_of,
};
