//! The scripted session and the loop that replays it.

use std::io::Write;

use waypoint::{
    ActionBridge, ClickOutcome, DismissalStore, Lifecycle, RenderSnapshot, ScreenModel, Size,
    StepCatalog, TooltipAnchor, TourConfig, TourController,
};
use web_time::Duration;

use crate::host::SimulatedHost;

/// Host clock resolution while waiting.
const FRAME_MS: u64 = 50;
const FRAME: Duration = Duration::from_millis(FRAME_MS);

/// One thing the pretend user or app does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Wait(u64),
    Resize(i32, i32),
    Scroll(i32),
    ClickHighlight,
    Report(&'static str),
    Advance,
    Retreat,
}

/// A full walk through the sample tour, including a few detours.
pub const SESSION: &[Cue] = &[
    // Phase 1 interstitial, then the sidebar.
    Cue::Wait(2000),
    Cue::ClickHighlight,
    // The template picker renders late; the locator keeps looking.
    Cue::Wait(900),
    Cue::Resize(1024, 700),
    Cue::ClickHighlight,
    // Belongs to a later step and is ignored here.
    Cue::Report("posting-published"),
    Cue::Wait(2600),
    Cue::Scroll(120),
    Cue::ClickHighlight,
    // Phase 2: interstitial, then two timed steps with a look back.
    Cue::Wait(2000),
    Cue::Wait(3000),
    Cue::Retreat,
    Cue::Wait(200),
    Cue::Advance,
    Cue::Wait(1500),
    // Phase 3.
    Cue::Wait(2000),
    Cue::ClickHighlight,
    // The member list never shows up.
    Cue::Wait(2500),
    Cue::Advance,
];

/// How a replay ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub started: bool,
    pub lifecycle: Lifecycle,
    pub reason: Option<&'static str>,
    pub anomalies: u64,
    pub elapsed: Duration,
}

pub struct Replay<W: Write> {
    tour: TourController<ScreenModel>,
    host: SimulatedHost,
    bridge: ActionBridge,
    out: W,
}

impl<W: Write> Replay<W> {
    pub fn new(catalog: StepCatalog, config: TourConfig, viewport: Size, out: W) -> Self {
        let bridge = ActionBridge::new();
        let first_page = catalog
            .step(0)
            .map(|s| s.page_key.clone())
            .unwrap_or_default();
        let host = SimulatedHost::new(bridge.clone(), &first_page);
        let mut tour = TourController::new(catalog, config, ScreenModel::new(), viewport);
        tour.register_action_handler(&bridge);
        Self {
            tour,
            host,
            bridge,
            out,
        }
    }

    /// Play `cues` from a fresh start, then optionally opt out.
    pub fn run(
        mut self,
        cues: &[Cue],
        store: &mut dyn DismissalStore,
        dismiss: bool,
    ) -> std::io::Result<Outcome> {
        self.host.sync(self.tour.now(), self.tour.lookup_mut());
        let started = self.tour.start_unless_dismissed(&*store);
        if !started {
            writeln!(self.out, "tour dismissed earlier, nothing to show")?;
        }
        self.settle()?;
        self.print_snapshot()?;

        for cue in cues {
            if !self.tour.is_active() {
                break;
            }
            writeln!(self.out, "{:>7} > {cue:?}", stamp(self.tour.now()))?;
            self.apply(*cue)?;
            self.print_snapshot()?;
        }

        if dismiss {
            self.tour.dismiss(store);
            self.settle()?;
        }
        self.tour.teardown();
        self.settle()?;

        let anomalies = self.tour.anomalies();
        writeln!(
            self.out,
            "anomalies: unresolved={} unmatched={} out_of_range={} stale={}",
            anomalies.target_unresolved,
            anomalies.unmatched_action,
            anomalies.out_of_range_navigation,
            anomalies.stale_timer_fire
        )?;
        Ok(Outcome {
            started,
            lifecycle: self.tour.lifecycle(),
            reason: self.tour.finish_reason().map(|r| r.as_str()),
            anomalies: anomalies.total(),
            elapsed: self.tour.now(),
        })
    }

    fn apply(&mut self, cue: Cue) -> std::io::Result<()> {
        match cue {
            Cue::Wait(ms) => {
                let mut left = Duration::from_millis(ms);
                while !left.is_zero() && self.tour.is_active() {
                    let step = left.min(FRAME);
                    self.tour.tick(step);
                    left -= step;
                    let now = self.tour.now();
                    if self.host.sync(now, self.tour.lookup_mut()) {
                        self.tour.remeasure();
                    }
                    self.settle()?;
                }
            }
            Cue::Resize(width, height) => self.tour.on_viewport_change(Size::new(width, height)),
            Cue::Scroll(dy) => {
                self.host.scroll(dy, self.tour.lookup_mut());
                self.tour.remeasure();
            }
            Cue::ClickHighlight => {
                let outcome = self.tour.click_highlight();
                if outcome == ClickOutcome::Ignored {
                    writeln!(self.out, "        click ignored")?;
                }
                self.settle()?;
                // Give the host's report a frame to arrive.
                self.apply(Cue::Wait(FRAME_MS))?;
            }
            Cue::Report(action) => {
                self.bridge.report_action(action);
                self.tour.pump_actions();
            }
            Cue::Advance => {
                self.tour.advance();
            }
            Cue::Retreat => {
                self.tour.retreat();
            }
        }
        self.settle()
    }

    /// Hand every queued effect to the host until the tour goes quiet.
    fn settle(&mut self) -> std::io::Result<()> {
        loop {
            let effects = self.tour.drain_effects();
            if effects.is_empty() {
                return Ok(());
            }
            for effect in &effects {
                writeln!(self.out, "{:>7}   {effect:?}", stamp(self.tour.now()))?;
                let now = self.tour.now();
                self.host.handle(effect, now, self.tour.lookup_mut());
            }
            self.tour.remeasure();
        }
    }

    fn print_snapshot(&mut self) -> std::io::Result<()> {
        let line = match self.tour.snapshot() {
            Some(snapshot) => describe(&snapshot, self.host.page()),
            None => format!("tour {}", self.tour.lifecycle().as_str()),
        };
        writeln!(self.out, "{:>7}   {line}", stamp(self.tour.now()))
    }
}

fn stamp(now: Duration) -> String {
    format!("{}ms", now.as_millis())
}

/// One-line summary of what the overlay shows.
pub fn describe(snapshot: &RenderSnapshot<'_>, page: &str) -> String {
    let progress = &snapshot.progress;
    let mut line = format!(
        "[{page}] {}/{} {} (phase {} \"{}\", {}/{})",
        progress.index + 1,
        progress.total,
        snapshot.step.id,
        snapshot.phase.id,
        snapshot.phase.title,
        progress.step_in_phase,
        progress.steps_in_phase,
    );
    if snapshot.phase_transition {
        line.push_str(" interstitial");
        return line;
    }
    match &snapshot.highlight {
        Some(h) => line.push_str(&format!(
            " highlight {},{} {}x{}{}",
            h.rect.x,
            h.rect.y,
            h.rect.width,
            h.rect.height,
            if h.mode.pulse { " pulse" } else { "" }
        )),
        None => line.push_str(" no highlight"),
    }
    if let Some(t) = &snapshot.tooltip {
        let anchor = match t.anchor {
            TooltipAnchor::Target(side) => format!("{side:?}").to_lowercase(),
            TooltipAnchor::Fallback => "fallback".to_owned(),
        };
        line.push_str(&format!(" tooltip {anchor} @ {},{}", t.origin.x, t.origin.y));
    }
    line
}
