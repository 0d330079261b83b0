#![forbid(unsafe_code)]

//! Finding and measuring a step's target element.
//!
//! The host exposes its markable elements through [`ElementLookup`]. A
//! [`TargetLocator`] tracks one step instance: the immediate attempt on
//! activation, the retries drawn from a [`RetryPolicy`], and out-of-band
//! re-measurements after resize or scroll. It never schedules anything
//! itself; the controller asks it for the next retry delay and owns the
//! timer.

use std::collections::HashMap;

use waypoint_core::geometry::Rect;
use waypoint_runtime::retry::RetryPolicy;
use web_time::Duration;

/// Host-side registry of markable elements.
pub trait ElementLookup {
    /// Current bounds of every element marked with `target_key`, in the
    /// host's document order. Hidden elements may report an empty rect.
    fn candidates(&self, target_key: &str) -> Vec<Rect>;
}

impl<T: ElementLookup + ?Sized> ElementLookup for &T {
    fn candidates(&self, target_key: &str) -> Vec<Rect> {
        (**self).candidates(target_key)
    }
}

impl<T: ElementLookup + ?Sized> ElementLookup for Box<T> {
    fn candidates(&self, target_key: &str) -> Vec<Rect> {
        (**self).candidates(target_key)
    }
}

/// First visible element for `target_key`.
///
/// Visible means both width and height are positive; a zero-sized match is
/// usually a copy hidden by a responsive layout and is skipped.
#[must_use]
pub fn resolve(lookup: &impl ElementLookup, target_key: &str) -> Option<Rect> {
    lookup
        .candidates(target_key)
        .into_iter()
        .find(|rect| !rect.is_empty())
}

/// In-memory element registry.
///
/// Useful as a host stand-in for tests and the demo; real hosts implement
/// [`ElementLookup`] over their own view tree.
#[derive(Debug, Clone, Default)]
pub struct ScreenModel {
    elements: HashMap<String, Vec<Rect>>,
}

impl ScreenModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element marked with `key`.
    pub fn mark(&mut self, key: impl Into<String>, rect: Rect) -> &mut Self {
        self.elements.entry(key.into()).or_default().push(rect);
        self
    }

    /// Replace every element marked with `key`.
    pub fn set(&mut self, key: impl Into<String>, rects: Vec<Rect>) -> &mut Self {
        self.elements.insert(key.into(), rects);
        self
    }

    /// Remove every element marked with `key`.
    pub fn unmark(&mut self, key: &str) -> &mut Self {
        self.elements.remove(key);
        self
    }

    /// Remove everything (a page change in a single-page host).
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Shift every element as if the page scrolled by `(dx, dy)`.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        for rects in self.elements.values_mut() {
            for rect in rects.iter_mut() {
                *rect = rect.translate(-dx, -dy);
            }
        }
    }
}

impl ElementLookup for ScreenModel {
    fn candidates(&self, target_key: &str) -> Vec<Rect> {
        self.elements.get(target_key).cloned().unwrap_or_default()
    }
}

/// Where a step instance's search stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocatorStatus {
    /// No step is being tracked.
    #[default]
    Idle,
    /// Not found yet; retries may remain.
    Searching,
    Resolved,
    /// Not found and no retries remain for this step instance.
    Unresolved,
}

/// Outcome of a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub rect: Option<Rect>,
    /// This attempt exhausted the retry schedule.
    pub gave_up: bool,
    /// First successful measurement for this step instance.
    pub first_hit: bool,
}

/// Resolution progress for the current step instance.
#[derive(Debug, Clone)]
pub struct TargetLocator {
    policy: RetryPolicy,
    target_key: Option<String>,
    retries_used: u32,
    ever_resolved: bool,
    rect: Option<Rect>,
    status: LocatorStatus,
}

impl TargetLocator {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            target_key: None,
            retries_used: 0,
            ever_resolved: false,
            rect: None,
            status: LocatorStatus::Idle,
        }
    }

    /// Start tracking a new step instance.
    pub fn begin(&mut self, target_key: &str) {
        self.target_key = Some(target_key.to_owned());
        self.retries_used = 0;
        self.ever_resolved = false;
        self.rect = None;
        self.status = LocatorStatus::Searching;
    }

    /// Stop tracking; geometry is forgotten.
    pub fn clear(&mut self) {
        self.target_key = None;
        self.retries_used = 0;
        self.ever_resolved = false;
        self.rect = None;
        self.status = LocatorStatus::Idle;
    }

    /// Look the target up without consuming a retry.
    ///
    /// Used for the activation attempt and for resize/scroll
    /// re-measurement. Does nothing while idle.
    pub fn attempt(&mut self, lookup: &impl ElementLookup) -> Attempt {
        self.measure(lookup)
    }

    /// Look the target up as the next scheduled retry.
    pub fn retry(&mut self, lookup: &impl ElementLookup) -> Attempt {
        if self.status == LocatorStatus::Searching {
            self.retries_used = self.retries_used.saturating_add(1);
        }
        self.measure(lookup)
    }

    fn measure(&mut self, lookup: &impl ElementLookup) -> Attempt {
        let Some(key) = self.target_key.as_deref() else {
            return Attempt {
                rect: None,
                gave_up: false,
                first_hit: false,
            };
        };
        let rect = resolve(lookup, key);
        let was_searching = self.status == LocatorStatus::Searching;
        let first_hit = rect.is_some() && !self.ever_resolved;
        self.rect = rect;

        let mut gave_up = false;
        self.status = if rect.is_some() {
            self.ever_resolved = true;
            LocatorStatus::Resolved
        } else if !self.ever_resolved && self.retries_used < self.policy.max_retries {
            LocatorStatus::Searching
        } else {
            gave_up = was_searching;
            LocatorStatus::Unresolved
        };

        Attempt {
            rect,
            gave_up,
            first_hit,
        }
    }

    /// Delay from now until the next retry, if one is due.
    ///
    /// `None` once the target resolved or the schedule is exhausted.
    #[must_use]
    pub fn next_retry_delay(&self) -> Option<Duration> {
        if self.status != LocatorStatus::Searching || self.retries_used >= self.policy.max_retries
        {
            return None;
        }
        Some(self.policy.delay(self.retries_used))
    }

    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    #[must_use]
    pub fn status(&self) -> LocatorStatus {
        self.status
    }

    #[must_use]
    pub fn target_key(&self) -> Option<&str> {
        self.target_key.as_deref()
    }

    /// Retries consumed by the current step instance.
    #[must_use]
    pub fn retries_used(&self) -> u32 {
        self.retries_used
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn locator() -> TargetLocator {
        TargetLocator::new(RetryPolicy::schedule([100, 300, 600, 1000, 2000]))
    }

    #[test]
    fn resolve_skips_zero_sized_matches() {
        let mut screen = ScreenModel::new();
        screen.mark("btn", Rect::new(0, 0, 0, 20));
        screen.mark("btn", Rect::new(10, 10, 80, 0));
        screen.mark("btn", Rect::new(40, 40, 80, 20));
        assert_eq!(resolve(&screen, "btn"), Some(Rect::new(40, 40, 80, 20)));
        assert_eq!(resolve(&screen, "missing"), None);
    }

    #[test]
    fn immediate_hit_needs_no_retry() {
        let mut screen = ScreenModel::new();
        screen.mark("btn", Rect::new(1, 2, 3, 4));
        let mut loc = locator();
        loc.begin("btn");
        let attempt = loc.attempt(&screen);
        assert_eq!(attempt.rect, Some(Rect::new(1, 2, 3, 4)));
        assert!(attempt.first_hit);
        assert_eq!(loc.status(), LocatorStatus::Resolved);
        assert_eq!(loc.next_retry_delay(), None);
    }

    #[test]
    fn retry_delays_follow_schedule_gaps() {
        let screen = ScreenModel::new();
        let mut loc = locator();
        loc.begin("late");
        loc.attempt(&screen);
        let mut gaps = Vec::new();
        while let Some(delay) = loc.next_retry_delay() {
            gaps.push(delay);
            loc.retry(&screen);
        }
        assert_eq!(gaps, vec![ms(100), ms(200), ms(300), ms(400), ms(1000)]);
        assert_eq!(loc.status(), LocatorStatus::Unresolved);
        assert_eq!(loc.retries_used(), 5);
    }

    #[test]
    fn gave_up_reported_once() {
        let screen = ScreenModel::new();
        let mut loc = TargetLocator::new(RetryPolicy::schedule([100]));
        loc.begin("never");
        assert!(!loc.attempt(&screen).gave_up);
        assert!(loc.retry(&screen).gave_up);
        // A later re-measurement is not another give-up.
        assert!(!loc.attempt(&screen).gave_up);
    }

    #[test]
    fn late_element_resolves_on_retry() {
        let mut screen = ScreenModel::new();
        let mut loc = locator();
        loc.begin("late");
        loc.attempt(&screen);
        loc.retry(&screen);
        screen.mark("late", Rect::new(5, 5, 10, 10));
        let attempt = loc.retry(&screen);
        assert!(attempt.first_hit);
        assert_eq!(loc.retries_used(), 2);
        assert_eq!(loc.next_retry_delay(), None);
    }

    #[test]
    fn remeasure_tracks_scroll() {
        let mut screen = ScreenModel::new();
        screen.mark("btn", Rect::new(100, 400, 50, 20));
        let mut loc = locator();
        loc.begin("btn");
        loc.attempt(&screen);
        screen.scroll_by(0, 150);
        let attempt = loc.attempt(&screen);
        assert_eq!(attempt.rect, Some(Rect::new(100, 250, 50, 20)));
        assert!(!attempt.first_hit);
        assert_eq!(loc.retries_used(), 0);
    }

    #[test]
    fn lost_element_does_not_restart_retries() {
        let mut screen = ScreenModel::new();
        screen.mark("btn", Rect::new(0, 0, 10, 10));
        let mut loc = locator();
        loc.begin("btn");
        loc.attempt(&screen);
        screen.unmark("btn");
        let attempt = loc.attempt(&screen);
        assert_eq!(attempt.rect, None);
        assert!(!attempt.gave_up);
        assert_eq!(loc.status(), LocatorStatus::Unresolved);
        assert_eq!(loc.next_retry_delay(), None);
    }

    #[test]
    fn begin_resets_previous_instance() {
        let screen = ScreenModel::new();
        let mut loc = locator();
        loc.begin("a");
        loc.attempt(&screen);
        loc.retry(&screen);
        loc.begin("b");
        assert_eq!(loc.retries_used(), 0);
        assert_eq!(loc.target_key(), Some("b"));
        assert_eq!(loc.next_retry_delay(), Some(ms(100)));
    }

    #[test]
    fn idle_locator_ignores_lookups() {
        let mut screen = ScreenModel::new();
        screen.mark("btn", Rect::new(0, 0, 10, 10));
        let mut loc = locator();
        let attempt = loc.attempt(&screen);
        assert_eq!(attempt.rect, None);
        assert_eq!(loc.status(), LocatorStatus::Idle);
        loc.begin("btn");
        loc.clear();
        assert_eq!(loc.next_retry_delay(), None);
    }

    #[test]
    fn zero_retry_policy_gives_up_on_first_miss() {
        let screen = ScreenModel::new();
        let mut loc = TargetLocator::new(RetryPolicy::no_retry());
        loc.begin("x");
        assert!(loc.attempt(&screen).gave_up);
        assert_eq!(loc.status(), LocatorStatus::Unresolved);
    }
}
