#![forbid(unsafe_code)]

//! Read-only view of the tour for the host's renderer.
//!
//! A [`RenderSnapshot`] borrows from the controller and is rebuilt on
//! demand. While a phase transition is showing, the highlight and tooltip
//! are withheld and only the phase metadata should be drawn.

use waypoint_core::geometry::{Point, Rect, Size};

use crate::catalog::{InteractionMode, Phase, Step, StepCatalog};
use crate::overlay::{OverlayLayout, OverlayPlacement, TooltipAnchor};

/// How the highlight treats pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightMode {
    /// The highlight swallows clicks and reports them via `click_highlight`.
    /// Otherwise clicks pass through to the element underneath.
    pub intercepts_clicks: bool,
    /// Draw the attention pulse.
    pub pulse: bool,
}

impl HighlightMode {
    #[must_use]
    pub fn for_step(step: &Step) -> Self {
        Self {
            intercepts_clicks: step.wait_for_click,
            pulse: step.wait_for_click || step.interaction == InteractionMode::Click,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightView {
    /// Padded target bounds.
    pub rect: Rect,
    pub mode: HighlightMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipView {
    /// Top-left corner.
    pub origin: Point,
    pub size: Size,
    pub anchor: TooltipAnchor,
}

/// Position of the current step, within its phase and overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position within the current phase.
    pub step_in_phase: usize,
    pub steps_in_phase: usize,
    pub index: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn new(catalog: &StepCatalog, index: usize) -> Self {
        let range = catalog
            .step(index)
            .map(|step| catalog.phase_range(step.phase))
            .unwrap_or(index..index + 1);
        Self {
            step_in_phase: index.saturating_sub(range.start) + 1,
            steps_in_phase: range.len(),
            index,
            total: catalog.len(),
        }
    }

    /// Share of the tour reached, counting the current step, in `(0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.index + 1) as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Done,
    Current,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOverview<'a> {
    pub id: u32,
    pub title: &'a str,
    pub status: PhaseStatus,
}

/// Every phase in tour order with its status relative to `current`.
#[must_use]
pub fn phase_overview(catalog: &StepCatalog, current: u32) -> Vec<PhaseOverview<'_>> {
    let order = catalog.phase_order();
    let current_pos = order.iter().position(|id| *id == current);
    order
        .iter()
        .enumerate()
        .filter_map(|(pos, id)| {
            let phase = catalog.phase(*id)?;
            let status = match current_pos {
                Some(cur) if pos < cur => PhaseStatus::Done,
                Some(cur) if pos == cur => PhaseStatus::Current,
                _ => PhaseStatus::Pending,
            };
            Some(PhaseOverview {
                id: *id,
                title: &phase.title,
                status,
            })
        })
        .collect()
}

/// Everything a renderer needs for one frame of an active tour.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot<'a> {
    pub index: usize,
    pub step: &'a Step,
    pub phase: &'a Phase,
    /// The phase interstitial is showing; step UI is suppressed.
    pub phase_transition: bool,
    /// `None` during a phase transition or while the target is unresolved.
    pub highlight: Option<HighlightView>,
    /// `None` during a phase transition.
    pub tooltip: Option<TooltipView>,
    pub progress: Progress,
    pub phases: Vec<PhaseOverview<'a>>,
}

impl<'a> RenderSnapshot<'a> {
    pub(crate) fn build(
        catalog: &'a StepCatalog,
        index: usize,
        phase_transition: bool,
        placement: Option<OverlayPlacement>,
        layout: &OverlayLayout,
    ) -> Option<Self> {
        let step = catalog.step(index)?;
        let phase = catalog.phase(step.phase)?;
        let placement = placement.filter(|_| !phase_transition);
        let highlight = placement.and_then(|p| p.highlight).map(|rect| HighlightView {
            rect,
            mode: HighlightMode::for_step(step),
        });
        let tooltip = placement.map(|p| TooltipView {
            origin: p.tooltip,
            size: layout.tooltip,
            anchor: p.anchor,
        });
        Some(Self {
            index,
            step,
            phase,
            phase_transition,
            highlight,
            tooltip,
            progress: Progress::new(catalog, index),
            phases: phase_overview(catalog, step.phase),
        })
    }
}
