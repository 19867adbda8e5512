// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # protosdc - medical device communication core
//!
//! Maps the BICEPS participant model (descriptors, states and their
//! property types) to tagged wire messages and back, and builds the two
//! ends of an SDC connection on top of that mapping: a provider that
//! reports mdib changes and executes operations, and a consumer that
//! mirrors the provider mdib and tracks the operations it invoked.
//!
//! ## Quick Start
//!
//! ```rust
//! use protosdc::config::{ConsumerConfig, ProviderConfig};
//! use protosdc::consumer::SdcConsumer;
//! use protosdc::provider::SdcProvider;
//! use protosdc::transport::LocalTransport;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(SdcProvider::new(ProviderConfig::new()));
//! provider.start()?;
//!
//! let transport = Arc::new(LocalTransport::new(&provider));
//! let consumer = SdcConsumer::new(transport, ConsumerConfig::new());
//! consumer.start_all(vec![])?; // subscribe first
//! consumer.init_mdib()?;       // then fetch
//! assert!(consumer.mdib().is_ready());
//! # Ok::<(), protosdc::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |  provider: SdcProvider          consumer: SdcConsumer          |
//! |   get/set services, SCO,         ConsumerMdib (mirror),        |
//! |   subscriptions + dispatcher     OperationsManager             |
//! +----------------------------------------------------------------+
//! |  messages / reports: request, response and report layouts      |
//! +----------------------------------------------------------------+
//! |  reader (tree assembly)  |  mdib (store, transactions)         |
//! +----------------------------------------------------------------+
//! |  mapping: naming, primitive codecs, generic walker, registries |
//! +----------------------------------------------------------------+
//! |  pm (domain model)       |  wire (tagged messages + codec)     |
//! +----------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`pm`] - descriptor, state and property type tables
//! - [`wire`] - wire messages and the binary unit codec
//! - [`mapping`] - domain <-> wire conversion
//! - [`reader`] - description tree assembly
//! - [`mdib`] - versioned descriptor/state store
//! - [`provider`] - reporting, get/set services, operations
//! - [`consumer`] - mirror, notifications, operation tracking
//! - [`transport`] - transport boundary and in-process transport

pub mod actions;
pub mod config;
pub mod consumer;
pub mod error;
pub mod invocation;
pub mod mapping;
pub mod mdib;
pub mod messages;
pub mod pm;
pub mod provider;
pub mod reader;
pub mod transport;
pub mod wire;

pub use error::{Error, Result};
