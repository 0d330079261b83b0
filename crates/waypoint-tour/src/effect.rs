#![forbid(unsafe_code)]

//! Requests the controller makes of its host.
//!
//! Effects queue up inside the controller in the order they were decided
//! and the host drains them after each call. A `Navigate` always precedes
//! the `StepEntered` of the step it navigates to.

/// Why a tour stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// Ran past the last step, or `complete()` was called.
    Completed,
    /// The user skipped the rest of the tour.
    Skipped,
    /// The user asked never to see the tour again.
    Dismissed,
}

impl FinishReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEffect {
    /// Show a page. `target` is the step's navigation action or its page key.
    Navigate { target: String },
    /// A step became current. Hosts use it to close menus or reset local UI.
    StepEntered { step_id: String, index: usize },
    /// The entered step asks the host to start something (e.g. a simulated generation).
    Signal { name: String },
    /// Forward a highlight click to the real element.
    ActivateTarget { target_key: String },
    /// The target was found for the first time on this step; bring it into view.
    ScrollIntoView { target_key: String },
    Finished {
        reason: FinishReason,
        last_step: String,
    },
}

impl TourEffect {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::StepEntered { .. } => "step_entered",
            Self::Signal { .. } => "signal",
            Self::ActivateTarget { .. } => "activate_target",
            Self::ScrollIntoView { .. } => "scroll_into_view",
            Self::Finished { .. } => "finished",
        }
    }
}
