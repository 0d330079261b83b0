#![forbid(unsafe_code)]

//! Tour state machine.
//!
//! [`TourController`] owns the only mutable tour state. It reacts to four
//! kinds of input, all delivered on the host's event loop:
//!
//! - explicit calls (`start`, `advance`, `retreat`, `skip`, `complete`,
//!   `dismiss`, `click_highlight`),
//! - actions reported through an [`ActionBridge`],
//! - elapsed time passed to [`tick`](TourController::tick),
//! - viewport changes passed to
//!   [`on_viewport_change`](TourController::on_viewport_change).
//!
//! It answers with queued [`TourEffect`]s and an on-demand
//! [`RenderSnapshot`].
//!
//! # Timers
//!
//! Three concerns use timers: locator retries, auto-advance and the phase
//! transition window. Each has at most one pending timer, tracked in its own
//! slot. Leaving a step cancels all three before anything is armed for the
//! next one. Every timer also carries the step epoch it was armed in, and a
//! fire is acted on only if both its id and its epoch are still current.
//!
//! # Phase transitions
//!
//! Entering a step in a different phase (including the first step) raises
//! the phase transition flag for a fixed window. Until the window closes the
//! step is not activated: no target lookup, no retries, no auto-advance.
//! Advancing is still allowed.

use waypoint_core::geometry::{Rect, Size};
use waypoint_runtime::timer::{Fired, TimerId, TimerQueue};
use web_time::Duration;

use crate::bridge::{ActionBridge, ActionMailbox};
use crate::catalog::{Step, StepCatalog};
use crate::config::TourConfig;
use crate::diagnostics::{Anomaly, AnomalyCounts};
use crate::effect::{FinishReason, TourEffect};
use crate::locator::{Attempt, ElementLookup, LocatorStatus, TargetLocator};
use crate::overlay::{self, OverlayLayout, OverlayPlacement};
use crate::persistence::DismissalStore;
use crate::snapshot::RenderSnapshot;

/// Coarse tour lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    NotStarted,
    Active,
    Completed,
    Skipped,
}

impl Lifecycle {
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerConcern {
    LocatorRetry,
    AutoAdvance,
    PhaseTransition,
}

impl TimerConcern {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocatorRetry => "locator_retry",
            Self::AutoAdvance => "auto_advance",
            Self::PhaseTransition => "phase_transition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerTag {
    concern: TimerConcern,
    epoch: u64,
}

/// Pending timers by concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerCounts {
    pub locator: usize,
    pub auto_advance: usize,
    pub phase_transition: usize,
}

impl TimerCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.locator + self.auto_advance + self.phase_transition
    }
}

/// Result of [`TourController::click_highlight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The current step does not take highlight clicks.
    Ignored,
    /// The click went to the real element; the host's action report decides.
    Forwarded,
    /// The click went to the real element and the tour moved on.
    Advanced,
}

#[derive(Debug, Default)]
struct TimerSlots {
    retry: Option<TimerId>,
    auto_advance: Option<TimerId>,
    phase_transition: Option<TimerId>,
}

impl TimerSlots {
    fn get(&self, concern: TimerConcern) -> Option<TimerId> {
        match concern {
            TimerConcern::LocatorRetry => self.retry,
            TimerConcern::AutoAdvance => self.auto_advance,
            TimerConcern::PhaseTransition => self.phase_transition,
        }
    }

    fn get_mut(&mut self, concern: TimerConcern) -> &mut Option<TimerId> {
        match concern {
            TimerConcern::LocatorRetry => &mut self.retry,
            TimerConcern::AutoAdvance => &mut self.auto_advance,
            TimerConcern::PhaseTransition => &mut self.phase_transition,
        }
    }
}

/// Drives one tour over a host reachable through `L`.
#[derive(Debug)]
pub struct TourController<L> {
    catalog: StepCatalog,
    config: TourConfig,
    layout: OverlayLayout,
    lookup: L,
    viewport: Size,
    lifecycle: Lifecycle,
    finish_reason: Option<FinishReason>,
    index: usize,
    epoch: u64,
    phase_transition: bool,
    locator: TargetLocator,
    placement: Option<OverlayPlacement>,
    timers: TimerQueue<TimerTag>,
    slots: TimerSlots,
    mailbox: Option<ActionMailbox>,
    effects: Vec<TourEffect>,
    anomalies: AnomalyCounts,
}

impl<L: ElementLookup> TourController<L> {
    pub fn new(catalog: StepCatalog, config: TourConfig, lookup: L, viewport: Size) -> Self {
        let layout = OverlayLayout::from(&config);
        let locator = TargetLocator::new(config.retry.clone());
        Self {
            catalog,
            config,
            layout,
            lookup,
            viewport,
            lifecycle: Lifecycle::NotStarted,
            finish_reason: None,
            index: 0,
            epoch: 0,
            phase_transition: false,
            locator,
            placement: None,
            timers: TimerQueue::new(),
            slots: TimerSlots::default(),
            mailbox: None,
            effects: Vec::new(),
            anomalies: AnomalyCounts::default(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Begin at the first step.
    ///
    /// Whether the user dismissed the tour is the caller's check; see
    /// [`start_unless_dismissed`](Self::start_unless_dismissed). Calling this
    /// on a running or finished tour restarts it.
    pub fn start(&mut self) {
        self.cancel_all_timers();
        self.locator.clear();
        self.lifecycle = Lifecycle::Active;
        self.finish_reason = None;
        self.index = 0;
        tracing::info!(
            steps = self.catalog.len(),
            phases = self.catalog.phases().len(),
            "tour started"
        );
        self.enter_step(None);
    }

    /// Start unless `store` says the user opted out. Returns whether it started.
    pub fn start_unless_dismissed<S: DismissalStore + ?Sized>(&mut self, store: &S) -> bool {
        if store.is_dismissed() {
            tracing::info!(steps = self.catalog.len(), "tour dismissed earlier, not starting");
            return false;
        }
        self.start();
        true
    }

    /// Move to the next step, or finish as `Completed` from the last one.
    ///
    /// Returns `false` when the tour is not active.
    pub fn advance(&mut self) -> bool {
        if !self.require_active("advance") {
            return false;
        }
        if self.index >= self.catalog.last_index() {
            self.finish(Lifecycle::Completed, FinishReason::Completed);
            return true;
        }
        self.move_to(self.index + 1);
        true
    }

    /// Move to the previous step. A no-op on the first step.
    pub fn retreat(&mut self) -> bool {
        if !self.require_active("retreat") {
            return false;
        }
        if self.index == 0 {
            self.record(Anomaly::OutOfRangeNavigation);
            tracing::debug!(index = 0, "retreat ignored on first step");
            return false;
        }
        self.move_to(self.index - 1);
        true
    }

    /// End the tour early at the user's request.
    pub fn skip(&mut self) -> bool {
        if !self.require_active("skip") {
            return false;
        }
        self.finish(Lifecycle::Completed, FinishReason::Skipped);
        true
    }

    /// End the tour as completed regardless of the current step.
    pub fn complete(&mut self) -> bool {
        if !self.require_active("complete") {
            return false;
        }
        self.finish(Lifecycle::Completed, FinishReason::Completed);
        true
    }

    /// "Don't show again": persist the opt-out and stop a running tour.
    ///
    /// Also valid after the tour finished (the completion screen offers it);
    /// the flag is stored and the finished state is left alone.
    pub fn dismiss<S: DismissalStore + ?Sized>(&mut self, store: &mut S) {
        store.dismiss();
        if self.lifecycle == Lifecycle::Active {
            self.finish(Lifecycle::Skipped, FinishReason::Dismissed);
        } else {
            tracing::debug!(lifecycle = ?self.lifecycle, "tour dismissal stored");
        }
    }

    /// Release everything: timers, the action handler, a running tour.
    ///
    /// A tour still running is finished as skipped.
    pub fn teardown(&mut self) {
        if let Some(mailbox) = self.mailbox.take() {
            mailbox.unregister();
        }
        if self.lifecycle == Lifecycle::Active {
            self.finish(Lifecycle::Skipped, FinishReason::Skipped);
        } else {
            self.cancel_all_timers();
        }
    }

    // ── Host input ───────────────────────────────────────────────────────

    /// Become the receiver of `bridge`'s actions, replacing whoever held it.
    pub fn register_action_handler(&mut self, bridge: &ActionBridge) {
        let replaced = match self.mailbox.take() {
            Some(previous) => previous.unregister(),
            None => false,
        };
        self.mailbox = Some(bridge.install());
        tracing::debug!(replaced, "action handler registered");
    }

    /// Interpret one host action against the current step.
    ///
    /// Advances only when the current step lists `name` in the action table.
    /// Anything else is ignored. Returns whether the tour advanced.
    pub fn report_action(&mut self, name: &str) -> bool {
        if self.lifecycle != Lifecycle::Active {
            tracing::debug!(action = name, lifecycle = ?self.lifecycle, "action ignored, tour not active");
            self.record(Anomaly::UnmatchedAction);
            return false;
        }
        let Some(step) = self.catalog.step(self.index) else {
            return false;
        };
        if self.catalog.actions().matches(&step.id, name) {
            tracing::debug!(step = %step.id, index = self.index, action = name, "action matched");
            self.advance()
        } else {
            tracing::debug!(step = %step.id, index = self.index, action = name, "action ignored");
            self.record(Anomaly::UnmatchedAction);
            false
        }
    }

    /// Process every action waiting in the mailbox, in report order.
    ///
    /// Actions are matched against the step that is current when they are
    /// pumped, not when they were reported. Timers due before the report are
    /// only fired by [`tick`](Self::tick), so a host should tick by
    /// [`time_until_next`](Self::time_until_next) before pumping.
    ///
    /// Returns how many advanced the tour.
    pub fn pump_actions(&mut self) -> usize {
        let actions = match &self.mailbox {
            Some(mailbox) => mailbox.drain(),
            None => return 0,
        };
        let mut advanced = 0;
        for action in &actions {
            if self.report_action(action) {
                advanced += 1;
            }
        }
        advanced
    }

    /// The user clicked the highlight cutout.
    pub fn click_highlight(&mut self) -> ClickOutcome {
        if self.lifecycle != Lifecycle::Active || self.phase_transition {
            return ClickOutcome::Ignored;
        }
        let Some(step) = self.catalog.step(self.index) else {
            return ClickOutcome::Ignored;
        };
        if !step.wait_for_click {
            tracing::debug!(step = %step.id, "highlight click ignored, step does not wait for one");
            return ClickOutcome::Ignored;
        }
        self.effects.push(TourEffect::ActivateTarget {
            target_key: step.target_key.clone(),
        });
        if self.catalog.actions().has_rule(&step.id) {
            tracing::debug!(step = %step.id, "highlight click forwarded, waiting for host action");
            ClickOutcome::Forwarded
        } else {
            tracing::debug!(step = %step.id, "highlight click forwarded, advancing");
            self.advance();
            ClickOutcome::Advanced
        }
    }

    /// The viewport was resized. Re-measures the target right away.
    pub fn on_viewport_change(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.remeasure();
    }

    /// Re-measure the target outside the retry schedule (after a scroll).
    ///
    /// Does nothing to the lookup while the step is not activated.
    pub fn remeasure(&mut self) {
        if self.lifecycle == Lifecycle::Active
            && !self.phase_transition
            && self.locator.status() != LocatorStatus::Idle
        {
            let attempt = self.locator.attempt(&self.lookup);
            if attempt.rect.is_some() {
                self.cancel(TimerConcern::LocatorRetry);
            }
            self.on_attempt(attempt);
        }
        self.refresh_placement();
    }

    /// Let `elapsed` pass on the tour clock.
    ///
    /// Drains the action mailbox first, then fires due timers one at a time
    /// in deadline order. Reports that arrived after a deadline inside
    /// `elapsed` are therefore checked against the step that deadline would
    /// have left; hosts should tick at least every
    /// [`time_until_next`](Self::time_until_next).
    pub fn tick(&mut self, elapsed: Duration) {
        self.pump_actions();
        let until = self.timers.now().saturating_add(elapsed);
        while let Some(fired) = self.timers.pop_due(until) {
            self.on_timer(fired);
        }
        self.timers.settle(until);
    }

    // ── Output ───────────────────────────────────────────────────────────

    /// Take all queued effects.
    pub fn drain_effects(&mut self) -> Vec<TourEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Render state for an active tour.
    #[must_use]
    pub fn snapshot(&self) -> Option<RenderSnapshot<'_>> {
        if self.lifecycle != Lifecycle::Active {
            return None;
        }
        RenderSnapshot::build(
            &self.catalog,
            self.index,
            self.phase_transition,
            self.placement,
            &self.layout,
        )
    }

    #[must_use]
    pub fn pending_timers(&self) -> TimerCounts {
        TimerCounts {
            locator: self.count_timers(TimerConcern::LocatorRetry),
            auto_advance: self.count_timers(TimerConcern::AutoAdvance),
            phase_transition: self.count_timers(TimerConcern::PhaseTransition),
        }
    }

    /// Tour clock reading of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// How long the host may sleep before calling [`tick`](Self::tick).
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Current tour clock reading.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    // ── Accessors ────────────────────────────────────────────────────────

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// The current step while active.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        if self.lifecycle == Lifecycle::Active {
            self.catalog.step(self.index)
        } else {
            None
        }
    }

    #[must_use]
    pub fn phase_transition_active(&self) -> bool {
        self.phase_transition
    }

    /// Last successful measurement of the current target.
    #[must_use]
    pub fn target_rect(&self) -> Option<Rect> {
        self.locator.rect()
    }

    #[must_use]
    pub fn locator_status(&self) -> LocatorStatus {
        self.locator.status()
    }

    /// Derived tooltip and highlight placement, recomputed on every
    /// measurement and viewport change.
    #[must_use]
    pub fn placement(&self) -> Option<OverlayPlacement> {
        self.placement
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    #[must_use]
    pub fn anomalies(&self) -> AnomalyCounts {
        self.anomalies
    }

    #[must_use]
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Mutable access to the host model. Call [`remeasure`](Self::remeasure)
    /// afterwards if layout changed.
    pub fn lookup_mut(&mut self) -> &mut L {
        &mut self.lookup
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn require_active(&mut self, op: &'static str) -> bool {
        if self.lifecycle == Lifecycle::Active {
            return true;
        }
        tracing::debug!(op, lifecycle = ?self.lifecycle, "ignored, tour not active");
        self.record(Anomaly::OutOfRangeNavigation);
        false
    }

    fn record(&mut self, anomaly: Anomaly) {
        self.anomalies.record(anomaly);
    }

    fn move_to(&mut self, to: usize) {
        let from = self.index;
        self.leave_step();
        let (Some(old), Some(new)) = (self.catalog.step(from), self.catalog.step(to)) else {
            return;
        };
        if old.page_key != new.page_key {
            // Forward moves may use the step's own navigation action; going
            // back always returns to the plain page.
            let target = if to > from {
                new.navigation_target()
            } else {
                new.page_key.as_str()
            };
            tracing::debug!(from = %old.page_key, nav_target = target, "navigation requested");
            self.effects.push(TourEffect::Navigate {
                target: target.to_owned(),
            });
        }
        self.index = to;
        self.enter_step(Some(from));
    }

    fn enter_step(&mut self, from: Option<usize>) {
        self.epoch = self.epoch.wrapping_add(1);
        let Some(step) = self.catalog.step(self.index) else {
            return;
        };
        let phase_changed = from
            .and_then(|i| self.catalog.step(i))
            .is_none_or(|prev| prev.phase != step.phase);
        let phase = step.phase;

        tracing::debug!(
            step = %step.id,
            index = self.index,
            phase,
            epoch = self.epoch,
            "step entered"
        );
        self.effects.push(TourEffect::StepEntered {
            step_id: step.id.clone(),
            index: self.index,
        });
        if let Some(signal) = &step.enter_signal {
            self.effects.push(TourEffect::Signal {
                name: signal.clone(),
            });
        }
        self.locator.begin(&step.target_key);

        if phase_changed {
            self.phase_transition = true;
            tracing::debug!(phase, "phase transition started");
            self.arm(TimerConcern::PhaseTransition, self.config.phase_transition());
        } else {
            self.phase_transition = false;
            self.activate_step();
        }
        self.refresh_placement();
    }

    /// Look for the target and arm the step's own timers.
    fn activate_step(&mut self) {
        let attempt = self.locator.attempt(&self.lookup);
        self.on_attempt(attempt);
        self.schedule_retry();
        let auto = self
            .catalog
            .step(self.index)
            .and_then(|step| step.auto_advance_delay(self.config.default_auto_advance_ms));
        if let Some(delay) = auto {
            self.arm(TimerConcern::AutoAdvance, delay);
        }
    }

    fn leave_step(&mut self) {
        self.cancel(TimerConcern::LocatorRetry);
        self.cancel(TimerConcern::AutoAdvance);
        self.cancel(TimerConcern::PhaseTransition);
        self.locator.clear();
        self.placement = None;
    }

    fn finish(&mut self, lifecycle: Lifecycle, reason: FinishReason) {
        let last_step = self
            .catalog
            .step(self.index)
            .map(|s| s.id.clone())
            .unwrap_or_default();
        self.cancel_all_timers();
        self.locator.clear();
        self.placement = None;
        self.phase_transition = false;
        self.epoch = self.epoch.wrapping_add(1);
        self.lifecycle = lifecycle;
        self.finish_reason = Some(reason);
        tracing::info!(
            reason = reason.as_str(),
            last_step = %last_step,
            index = self.index,
            "tour finished"
        );
        self.effects.push(TourEffect::Finished { reason, last_step });
    }

    fn on_attempt(&mut self, attempt: Attempt) {
        let key = self.locator.target_key().unwrap_or_default();
        tracing::debug!(
            target_key = key,
            attempt = self.locator.retries_used(),
            found = attempt.rect.is_some(),
            "target lookup"
        );
        if attempt.first_hit {
            self.effects.push(TourEffect::ScrollIntoView {
                target_key: key.to_owned(),
            });
        }
        if attempt.gave_up {
            tracing::warn!(
                target_key = key,
                index = self.index,
                retries = self.locator.retries_used(),
                "target never appeared, using fallback tooltip"
            );
            self.record(Anomaly::TargetUnresolved);
        }
        self.refresh_placement();
    }

    fn schedule_retry(&mut self) {
        if let Some(delay) = self.locator.next_retry_delay() {
            self.arm(TimerConcern::LocatorRetry, delay);
        }
    }

    fn refresh_placement(&mut self) {
        self.placement = match (self.lifecycle, self.catalog.step(self.index)) {
            (Lifecycle::Active, Some(step)) => Some(overlay::place(
                self.locator.rect(),
                step.position,
                self.viewport,
                &self.layout,
            )),
            _ => None,
        };
    }

    fn on_timer(&mut self, fired: Fired<TimerTag>) {
        let TimerTag { concern, epoch } = fired.payload;
        let current = self.slots.get(concern) == Some(fired.id)
            && epoch == self.epoch
            && self.lifecycle == Lifecycle::Active;
        if !current {
            tracing::debug!(
                timer = concern.as_str(),
                id = fired.id.get(),
                epoch,
                current_epoch = self.epoch,
                "stale timer ignored"
            );
            self.record(Anomaly::StaleTimerFire);
            return;
        }
        *self.slots.get_mut(concern) = None;
        tracing::debug!(timer = concern.as_str(), id = fired.id.get(), index = self.index, "timer fired");

        match concern {
            TimerConcern::LocatorRetry => {
                let attempt = self.locator.retry(&self.lookup);
                self.on_attempt(attempt);
                self.schedule_retry();
            }
            TimerConcern::AutoAdvance => {
                self.advance();
            }
            TimerConcern::PhaseTransition => {
                self.phase_transition = false;
                tracing::debug!(index = self.index, "phase transition ended");
                self.activate_step();
            }
        }
    }

    fn arm(&mut self, concern: TimerConcern, delay: Duration) {
        self.cancel(concern);
        let id = self.timers.schedule(
            delay,
            TimerTag {
                concern,
                epoch: self.epoch,
            },
        );
        *self.slots.get_mut(concern) = Some(id);
        tracing::debug!(
            timer = concern.as_str(),
            id = id.get(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "timer armed"
        );
    }

    fn cancel(&mut self, concern: TimerConcern) {
        if let Some(id) = self.slots.get_mut(concern).take() {
            if self.timers.cancel(id).is_some() {
                tracing::debug!(timer = concern.as_str(), id = id.get(), "timer cancelled");
            }
        }
    }

    fn cancel_all_timers(&mut self) {
        let cancelled = self.timers.clear();
        self.slots = TimerSlots::default();
        if cancelled > 0 {
            tracing::debug!(cancelled, "all timers cancelled");
        }
    }

    fn count_timers(&self, concern: TimerConcern) -> usize {
        self.timers.count_where(|tag| tag.concern == concern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionRule, Phase, Step};
    use crate::locator::ScreenModel;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> TourController<ScreenModel> {
        let catalog = StepCatalog::new(
            vec![Phase::new(1, "One", ""), Phase::new(2, "Two", "")],
            vec![
                Step::new("a", 1, "home", "ta").auto_advance_ms(500),
                Step::new("b", 1, "home", "tb"),
                Step::new("c", 2, "list", "tc"),
            ],
            [ActionRule::new("b", "done-b")],
        )
        .expect("catalog");
        TourController::new(
            catalog,
            TourConfig::default(),
            ScreenModel::new(),
            Size::new(1280, 800),
        )
    }

    #[test]
    fn timer_from_older_epoch_is_ignored() {
        let mut tour = controller();
        tour.start();
        let stale = tour.timers.schedule(
            Duration::ZERO,
            TimerTag {
                concern: TimerConcern::AutoAdvance,
                epoch: tour.epoch.wrapping_sub(1),
            },
        );
        tour.slots.auto_advance = Some(stale);
        tour.tick(Duration::ZERO);
        assert_eq!(tour.current_index(), 0);
        assert_eq!(tour.anomalies().get(Anomaly::StaleTimerFire), 1);
    }

    #[test]
    fn timer_not_in_its_slot_is_ignored() {
        let mut tour = controller();
        tour.start();
        tour.timers.schedule(
            Duration::ZERO,
            TimerTag {
                concern: TimerConcern::AutoAdvance,
                epoch: tour.epoch,
            },
        );
        tour.tick(Duration::ZERO);
        assert_eq!(tour.current_index(), 0);
        assert_eq!(tour.anomalies().get(Anomaly::StaleTimerFire), 1);
    }

    #[test]
    fn auto_advance_waits_for_phase_transition() {
        let mut tour = controller();
        tour.start();
        assert!(tour.phase_transition_active());
        assert_eq!(tour.pending_timers().auto_advance, 0);
        tour.tick(ms(2000));
        assert!(!tour.phase_transition_active());
        assert_eq!(tour.pending_timers().auto_advance, 1);
        tour.tick(ms(499));
        assert_eq!(tour.current_index(), 0);
        tour.tick(ms(1));
        assert_eq!(tour.current_index(), 1);
        assert_eq!(tour.pending_timers().auto_advance, 0);
    }

    #[test]
    fn arming_replaces_previous_timer_of_same_concern() {
        let mut tour = controller();
        tour.start();
        tour.arm(TimerConcern::LocatorRetry, ms(10));
        tour.arm(TimerConcern::LocatorRetry, ms(20));
        assert_eq!(tour.pending_timers().locator, 1);
    }

    #[test]
    fn stepping_calls_before_start_are_out_of_range() {
        let mut tour = controller();
        assert!(!tour.advance());
        assert!(!tour.retreat());
        assert!(!tour.skip());
        assert_eq!(tour.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(tour.anomalies().get(Anomaly::OutOfRangeNavigation), 3);
        assert!(tour.snapshot().is_none());
    }

    #[test]
    fn finished_tour_rejects_further_stepping() {
        let mut tour = controller();
        tour.start();
        tour.complete();
        assert_eq!(tour.lifecycle(), Lifecycle::Completed);
        assert!(!tour.advance());
        assert!(tour.current_step().is_none());
        assert_eq!(tour.pending_timers().total(), 0);
    }
}
