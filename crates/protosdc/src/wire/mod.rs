// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire representation: tagged hierarchical messages and their binary unit encoding.

mod codec;
mod message;

pub use codec::{decode_message, encode_message, MAGIC, MAX_DEPTH};
pub use message::{WireMessage, WireValue, ONE_OF_SUFFIX};
