//! A pretend recruiting app for the tour to walk through.
//!
//! Pages own elements that show up some time after the page is shown, the
//! sidebar navigates on click, and the draft generator takes a while before
//! it reports back. All of it runs on the tour's clock.

use std::collections::{HashMap, HashSet};

use waypoint::{ActionBridge, Rect, ScreenModel, TourEffect};
use web_time::Duration;

struct Element {
    key: &'static str,
    rect: Rect,
    /// Time after the page is shown until the element is rendered.
    delay: Duration,
}

fn element(key: &'static str, rect: Rect, delay_ms: u64) -> Element {
    Element {
        key,
        rect,
        delay: Duration::from_millis(delay_ms),
    }
}

/// What clicking a real element does in the app.
struct ClickBehavior {
    action: &'static str,
    opens: Option<&'static str>,
}

pub const GENERATION_SIGNAL: &str = "start-generation";
const GENERATION_TIME: Duration = Duration::from_millis(2500);

pub struct SimulatedHost {
    pages: HashMap<&'static str, Vec<Element>>,
    routes: HashMap<&'static str, &'static str>,
    clicks: HashMap<&'static str, ClickBehavior>,
    bridge: ActionBridge,
    page: String,
    shown_at: Duration,
    scroll_y: i32,
    rendered: HashSet<&'static str>,
    deferred: Vec<(Duration, &'static str)>,
}

impl SimulatedHost {
    pub fn new(bridge: ActionBridge, first_page: &str) -> Self {
        let pages = HashMap::from([
            (
                "dashboard",
                vec![
                    element("sidebar-chat", Rect::new(16, 140, 200, 40), 0),
                    element("stats", Rect::new(260, 40, 960, 240), 0),
                ],
            ),
            (
                "chat",
                vec![
                    element("type-select", Rect::new(320, 80, 420, 64), 450),
                    element("draft-preview", Rect::new(320, 180, 620, 420), 0),
                    element("publish-button", Rect::new(1080, 740, 150, 40), 0),
                ],
            ),
            (
                "postings",
                vec![
                    element("posting-card", Rect::new(260, 100, 420, 160), 120),
                    element("share-link", Rect::new(700, 130, 120, 32), 120),
                ],
            ),
            // The member list is behind a feature flag and never renders.
            (
                "team",
                vec![element("invite-button", Rect::new(1040, 24, 160, 40), 0)],
            ),
        ]);
        let routes = HashMap::from([("open-postings", "postings")]);
        let clicks = HashMap::from([
            (
                "sidebar-chat",
                ClickBehavior {
                    action: "chat-opened",
                    opens: Some("chat"),
                },
            ),
            (
                "type-select",
                ClickBehavior {
                    action: "type-selected",
                    opens: None,
                },
            ),
            (
                "publish-button",
                ClickBehavior {
                    action: "posting-published",
                    opens: None,
                },
            ),
            (
                "invite-button",
                ClickBehavior {
                    action: "invite-sent",
                    opens: None,
                },
            ),
        ]);
        Self {
            pages,
            routes,
            clicks,
            bridge,
            page: first_page.to_owned(),
            shown_at: Duration::ZERO,
            scroll_y: 0,
            rendered: HashSet::new(),
            deferred: Vec::new(),
        }
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    /// Act on one effect the tour asked for.
    pub fn handle(&mut self, effect: &TourEffect, now: Duration, screen: &mut ScreenModel) {
        match effect {
            TourEffect::Navigate { target } => {
                let page = self
                    .routes
                    .get(target.as_str())
                    .copied()
                    .unwrap_or(target.as_str())
                    .to_owned();
                self.show(&page, now, screen);
            }
            TourEffect::ActivateTarget { target_key } => {
                let Some(click) = self.clicks.get(target_key.as_str()) else {
                    tracing::debug!(target_key = %target_key, "click on inert element");
                    return;
                };
                let (action, opens) = (click.action, click.opens);
                if let Some(page) = opens {
                    self.show(page, now, screen);
                }
                self.bridge.report_action(action);
            }
            TourEffect::Signal { name } if name == GENERATION_SIGNAL => {
                self.deferred.push((now + GENERATION_TIME, "generation-complete"));
            }
            TourEffect::Signal { .. }
            | TourEffect::StepEntered { .. }
            | TourEffect::ScrollIntoView { .. }
            | TourEffect::Finished { .. } => {}
        }
    }

    /// Render elements whose delay has passed and deliver due reports.
    ///
    /// Returns whether the layout changed.
    pub fn sync(&mut self, now: Duration, screen: &mut ScreenModel) -> bool {
        let mut changed = false;
        if let Some(elements) = self.pages.get(self.page.as_str()) {
            for el in elements {
                if now >= self.shown_at + el.delay && self.rendered.insert(el.key) {
                    screen.mark(el.key, el.rect.translate(0, -self.scroll_y));
                    changed = true;
                }
            }
        }
        let (due, later): (Vec<_>, Vec<_>) =
            self.deferred.drain(..).partition(|(at, _)| *at <= now);
        self.deferred = later;
        for (_, action) in due {
            self.bridge.report_action(action);
        }
        changed
    }

    /// Scroll the page content up by `dy`.
    pub fn scroll(&mut self, dy: i32, screen: &mut ScreenModel) {
        self.scroll_y += dy;
        screen.scroll_by(0, dy);
    }

    fn show(&mut self, page: &str, now: Duration, screen: &mut ScreenModel) {
        if self.page == page {
            return;
        }
        tracing::debug!(from = %self.page, to = page, "host navigated");
        self.page = page.to_owned();
        self.shown_at = now;
        self.scroll_y = 0;
        self.rendered.clear();
        screen.clear();
        self.sync(now, screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint::ElementLookup;

    fn host() -> (SimulatedHost, ActionBridge, ScreenModel) {
        let bridge = ActionBridge::new();
        let host = SimulatedHost::new(bridge.clone(), "dashboard");
        (host, bridge, ScreenModel::new())
    }

    #[test]
    fn elements_render_after_their_delay() {
        let (mut host, _bridge, mut screen) = host();
        let nav = TourEffect::Navigate {
            target: "chat".into(),
        };
        host.handle(&nav, Duration::from_millis(1000), &mut screen);
        assert_eq!(host.page(), "chat");
        assert!(screen.candidates("type-select").is_empty());
        assert!(!screen.candidates("draft-preview").is_empty());

        assert!(host.sync(Duration::from_millis(1450), &mut screen));
        assert_eq!(screen.candidates("type-select").len(), 1);
        assert!(!host.sync(Duration::from_millis(2000), &mut screen));
    }

    #[test]
    fn navigation_actions_are_routed() {
        let (mut host, _bridge, mut screen) = host();
        let nav = TourEffect::Navigate {
            target: "open-postings".into(),
        };
        host.handle(&nav, Duration::ZERO, &mut screen);
        assert_eq!(host.page(), "postings");
    }

    #[test]
    fn clicks_report_actions_and_may_navigate() {
        let (mut host, bridge, mut screen) = host();
        let mailbox = bridge.install();
        host.sync(Duration::ZERO, &mut screen);
        let click = TourEffect::ActivateTarget {
            target_key: "sidebar-chat".into(),
        };
        host.handle(&click, Duration::ZERO, &mut screen);
        assert_eq!(host.page(), "chat");
        assert!(screen.candidates("sidebar-chat").is_empty());
        assert_eq!(mailbox.drain(), vec!["chat-opened".to_string()]);
    }

    #[test]
    fn generation_reports_back_later() {
        let (mut host, bridge, mut screen) = host();
        let mailbox = bridge.install();
        let signal = TourEffect::Signal {
            name: GENERATION_SIGNAL.into(),
        };
        host.handle(&signal, Duration::from_millis(100), &mut screen);
        host.sync(Duration::from_millis(2000), &mut screen);
        assert!(mailbox.drain().is_empty());
        host.sync(Duration::from_millis(2600), &mut screen);
        assert_eq!(mailbox.drain(), vec!["generation-complete".to_string()]);
    }

    #[test]
    fn scrolling_moves_rendered_elements() {
        let (mut host, _bridge, mut screen) = host();
        host.sync(Duration::ZERO, &mut screen);
        host.scroll(100, &mut screen);
        assert_eq!(screen.candidates("sidebar-chat"), vec![Rect::new(16, 40, 200, 40)]);
    }
}
