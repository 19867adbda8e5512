// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ready-made operation handlers.
//!
//! - [`MetricValueHandler`]: SetValue / SetString writing the metric
//!   value of the operation target
//! - [`ProposedStatesHandler`]: the four set-state operations, committing
//!   the proposed states as they are
//! - [`ActivateHandler`]: Activate backed by a closure

use super::sco::{ExecuteResult, OperationHandler};
use super::ProviderMdib;
use crate::error::{Error, Result};
use crate::invocation::SetArgument;
use crate::mdib::Transaction;
use crate::pm::types::{METRIC_QUALITY, NUMERIC_METRIC_VALUE, STRING_METRIC_VALUE};
use crate::pm::{PmObject, PmValue};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

fn wrong_argument(handle: &str, argument: &SetArgument) -> Error {
    Error::TypeMismatch {
        expected: format!("argument accepted by operation {}", handle),
        found: argument.operation_name().to_string(),
    }
}

/// Writes the requested value into the target metric state.
pub struct MetricValueHandler {
    handle: String,
    target: String,
    delayed: bool,
}

impl MetricValueHandler {
    pub fn new(handle: &str, target: &str) -> Self {
        Self {
            handle: handle.to_string(),
            target: target.to_string(),
            delayed: true,
        }
    }

    /// Execute on the calling thread.
    pub fn immediate(mut self) -> Self {
        self.delayed = false;
        self
    }
}

impl OperationHandler for MetricValueHandler {
    fn handle(&self) -> &str {
        &self.handle
    }

    fn delayed_processing(&self) -> bool {
        self.delayed
    }

    fn execute(&self, mdib: &ProviderMdib, argument: &SetArgument) -> Result<ExecuteResult> {
        let (value_class, value) = match argument {
            SetArgument::Value(d) => (&NUMERIC_METRIC_VALUE, PmValue::Decimal(d.clone())),
            SetArgument::String(s) => (&STRING_METRIC_VALUE, PmValue::Str(s.clone())),
            other => return Err(wrong_argument(&self.handle, other)),
        };
        let mut state = mdib
            .mdib()
            .read(|tables, _| tables.state(&self.target).map(|s| s.node.clone()))
            .ok_or_else(|| {
                Error::InvalidData(format!("no state for operation target {}", self.target))
            })?;
        let quality = PmObject::new(&METRIC_QUALITY).with("Validity", PmValue::Enum("Vld".into()))?;
        let metric_value = PmObject::new(value_class)
            .with("MetricQuality", quality)?
            .with("Value", value)?
            .with("DeterminationTime", PmValue::Timestamp(now_seconds()))?;
        state.set("MetricValue", metric_value)?;
        let mut tx = Transaction::new();
        tx.update_state(state);
        mdib.commit(tx)?;
        Ok(ExecuteResult::finished(Some(&self.target)))
    }
}

/// Commits proposed states of a set-state operation.
pub struct ProposedStatesHandler {
    handle: String,
    delayed: bool,
}

impl ProposedStatesHandler {
    pub fn new(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            delayed: true,
        }
    }

    pub fn immediate(mut self) -> Self {
        self.delayed = false;
        self
    }
}

impl OperationHandler for ProposedStatesHandler {
    fn handle(&self) -> &str {
        &self.handle
    }

    fn delayed_processing(&self) -> bool {
        self.delayed
    }

    fn execute(&self, mdib: &ProviderMdib, argument: &SetArgument) -> Result<ExecuteResult> {
        let proposed: Vec<PmObject> = match argument {
            SetArgument::MetricStates(s)
            | SetArgument::ComponentStates(s)
            | SetArgument::ContextStates(s) => s.clone(),
            SetArgument::AlertState(s) => vec![s.clone()],
            other => return Err(wrong_argument(&self.handle, other)),
        };
        let target = proposed
            .first()
            .and_then(|s| s.descriptor_handle())
            .map(str::to_string);
        let mut tx = Transaction::new();
        for state in proposed {
            tx.update_state(state);
        }
        if !tx.is_empty() {
            mdib.commit(tx)?;
        }
        Ok(ExecuteResult::finished(target.as_deref()))
    }
}

type ActivateFn = dyn Fn(&ProviderMdib, &[String]) -> Result<ExecuteResult> + Send + Sync;

/// Activate operation running a closure with the request arguments.
pub struct ActivateHandler {
    handle: String,
    delayed: bool,
    action: Box<ActivateFn>,
}

impl ActivateHandler {
    pub fn new<F>(handle: &str, action: F) -> Self
    where
        F: Fn(&ProviderMdib, &[String]) -> Result<ExecuteResult> + Send + Sync + 'static,
    {
        Self {
            handle: handle.to_string(),
            delayed: true,
            action: Box::new(action),
        }
    }

    pub fn immediate(mut self) -> Self {
        self.delayed = false;
        self
    }
}

impl OperationHandler for ActivateHandler {
    fn handle(&self) -> &str {
        &self.handle
    }

    fn delayed_processing(&self) -> bool {
        self.delayed
    }

    fn execute(&self, mdib: &ProviderMdib, argument: &SetArgument) -> Result<ExecuteResult> {
        match argument {
            SetArgument::Activate(args) => (self.action)(mdib, args),
            other => Err(wrong_argument(&self.handle, other)),
        }
    }
}
