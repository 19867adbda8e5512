// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Report action identifiers.

use crate::config::ACTION_PREFIX;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One identifier per report kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Waveform,
    EpisodicMetricReport,
    EpisodicAlertReport,
    EpisodicComponentReport,
    EpisodicContextReport,
    EpisodicOperationalStateReport,
    DescriptionModificationReport,
    /// Only subscribed through the set service stream.
    OperationInvokedReport,
}

impl Action {
    /// Report kinds delivered by the episodic report stream.
    pub const EPISODIC: [Action; 7] = [
        Action::Waveform,
        Action::EpisodicMetricReport,
        Action::EpisodicAlertReport,
        Action::EpisodicComponentReport,
        Action::EpisodicContextReport,
        Action::EpisodicOperationalStateReport,
        Action::DescriptionModificationReport,
    ];

    /// Last segment of the identifier.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Waveform => "WaveformStreamMsg",
            Self::EpisodicMetricReport => "EpisodicMetricReport",
            Self::EpisodicAlertReport => "EpisodicAlertReport",
            Self::EpisodicComponentReport => "EpisodicComponentReport",
            Self::EpisodicContextReport => "EpisodicContextReport",
            Self::EpisodicOperationalStateReport => "EpisodicOperationalStateReport",
            Self::DescriptionModificationReport => "DescriptionModificationReport",
            Self::OperationInvokedReport => "OperationInvokedReport",
        }
    }

    /// Full identifier, e.g. `org.somda.protosdc.mdib_reporting.action.EpisodicMetricReport`.
    pub fn identifier(&self) -> String {
        format!("{}{}", ACTION_PREFIX, self.short_name())
    }

    /// Filter match: the (trimmed) filter is a suffix of the identifier.
    ///
    /// A full identifier and a bare short name both match.
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim();
        !filter.is_empty() && self.identifier().ends_with(filter)
    }

    /// Every report kind the filter list selects.
    ///
    /// An empty list selects all episodic kinds. Operation invoked
    /// reports must be named explicitly.
    pub fn selected_by(filters: &[String]) -> Vec<Action> {
        if filters.is_empty() {
            return Self::EPISODIC.to_vec();
        }
        Self::EPISODIC
            .into_iter()
            .chain(std::iter::once(Self::OperationInvokedReport))
            .filter(|a| filters.iter().any(|f| a.matches(f)))
            .collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ACTION_PREFIX, self.short_name())
    }
}

impl FromStr for Action {
    type Err = Error;

    /// Accepts the full identifier or the short name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let short = s.strip_prefix(ACTION_PREFIX).unwrap_or(s);
        Self::EPISODIC
            .iter()
            .chain(std::iter::once(&Self::OperationInvokedReport))
            .find(|a| a.short_name() == short)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("unknown action {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_roundtrip() {
        for action in Action::EPISODIC {
            assert_eq!(action.identifier().parse::<Action>().ok(), Some(action));
            assert_eq!(action.short_name().parse::<Action>().ok(), Some(action));
        }
        assert_eq!(
            Action::Waveform.to_string(),
            "org.somda.protosdc.mdib_reporting.action.WaveformStreamMsg"
        );
        assert!("Bogus".parse::<Action>().is_err());
    }

    #[test]
    fn test_filter_suffix_match() {
        assert!(Action::EpisodicMetricReport.matches("EpisodicMetricReport"));
        assert!(Action::EpisodicMetricReport.matches(&Action::EpisodicMetricReport.identifier()));
        assert!(!Action::EpisodicAlertReport.matches("EpisodicMetricReport"));
        assert!(!Action::EpisodicAlertReport.matches("  "));
    }

    #[test]
    fn test_empty_filter_selects_all() {
        assert_eq!(Action::selected_by(&[]).len(), 7);
        assert!(!Action::selected_by(&[]).contains(&Action::OperationInvokedReport));
        let only = Action::selected_by(&["EpisodicContextReport ".to_string()]);
        assert_eq!(only, vec![Action::EpisodicContextReport]);
    }
}
