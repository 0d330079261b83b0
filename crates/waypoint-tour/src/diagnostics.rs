#![forbid(unsafe_code)]

//! Non-fatal conditions and how the tour degrades around them.
//!
//! None of these are returned as errors. The controller logs each one and
//! bumps a counter in [`AnomalyCounts`], then carries on.

use std::fmt;

/// Something went off the happy path without stopping the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anomaly {
    /// The retry schedule ran out before the step's target appeared.
    TargetUnresolved,
    /// A reported action did not complete the current step.
    UnmatchedAction,
    /// `retreat` on the first step, or a stepping call while the tour is not
    /// active.
    OutOfRangeNavigation,
    /// A timer fired for a step or timer slot that is no longer current.
    StaleTimerFire,
}

impl Anomaly {
    pub const ALL: [Anomaly; 4] = [
        Anomaly::TargetUnresolved,
        Anomaly::UnmatchedAction,
        Anomaly::OutOfRangeNavigation,
        Anomaly::StaleTimerFire,
    ];

    /// How the tour keeps going.
    #[must_use]
    pub const fn degradation(self) -> Degradation {
        match self {
            Self::TargetUnresolved => Degradation::FallbackTooltip,
            Self::UnmatchedAction | Self::OutOfRangeNavigation | Self::StaleTimerFire => {
                Degradation::Ignore
            }
        }
    }

    /// Stable label for logs and counters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TargetUnresolved => "target_unresolved",
            Self::UnmatchedAction => "unmatched_action",
            Self::OutOfRangeNavigation => "out_of_range_navigation",
            Self::StaleTimerFire => "stale_timer_fire",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the engine or its host does instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degradation {
    /// Show the tooltip at the fixed anchor with no highlight.
    FallbackTooltip,
    /// Drop the event; state is unchanged.
    Ignore,
    /// Keep the built-in configuration.
    UseDefaults,
    /// Behave as if the tour was never dismissed.
    AssumeNotDismissed,
    /// Do not run the tour at all. The host application is unaffected.
    DisableTour,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FallbackTooltip => write!(f, "fallback_tooltip"),
            Self::Ignore => write!(f, "ignore"),
            Self::UseDefaults => write!(f, "use_defaults"),
            Self::AssumeNotDismissed => write!(f, "assume_not_dismissed"),
            Self::DisableTour => write!(f, "disable_tour"),
        }
    }
}

/// Per-kind anomaly counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnomalyCounts {
    pub target_unresolved: u64,
    pub unmatched_action: u64,
    pub out_of_range_navigation: u64,
    pub stale_timer_fire: u64,
}

impl AnomalyCounts {
    pub fn record(&mut self, anomaly: Anomaly) {
        let slot = match anomaly {
            Anomaly::TargetUnresolved => &mut self.target_unresolved,
            Anomaly::UnmatchedAction => &mut self.unmatched_action,
            Anomaly::OutOfRangeNavigation => &mut self.out_of_range_navigation,
            Anomaly::StaleTimerFire => &mut self.stale_timer_fire,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn get(&self, anomaly: Anomaly) -> u64 {
        match anomaly {
            Anomaly::TargetUnresolved => self.target_unresolved,
            Anomaly::UnmatchedAction => self.unmatched_action,
            Anomaly::OutOfRangeNavigation => self.out_of_range_navigation,
            Anomaly::StaleTimerFire => self.stale_timer_fire,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        Anomaly::ALL.iter().map(|a| self.get(*a)).sum()
    }
}
