#![forbid(unsafe_code)]

//! Guided product tour engine.
//!
//! A tour walks a user through live application screens one [`Step`] at a
//! time. The host application supplies three things: an [`ElementLookup`]
//! that measures the elements steps point at, a place to act on
//! [`TourEffect`]s (navigation above all), and `report_action` calls through
//! an [`ActionBridge`] when something a step waits for has happened.
//!
//! The engine is single-threaded and never sleeps. The host advances its
//! clock with [`TourController::tick`].
//!
//! # Example
//!
//! ```
//! use waypoint_core::geometry::{Rect, Size};
//! use waypoint_tour::{
//!     ActionBridge, ActionRule, Lifecycle, Phase, ScreenModel, Step, StepCatalog, TourConfig,
//!     TourController,
//! };
//! use web_time::Duration;
//!
//! let catalog = StepCatalog::new(
//!     vec![Phase::new(1, "Basics", "")],
//!     vec![
//!         Step::new("open", 1, "home", "new-button").wait_for_click(true),
//!         Step::new("done", 1, "home", "result"),
//!     ],
//!     [ActionRule::new("open", "dialog-opened")],
//! )?;
//!
//! let mut screen = ScreenModel::new();
//! screen.mark("new-button", Rect::new(40, 40, 120, 32));
//!
//! let bridge = ActionBridge::new();
//! let mut tour = TourController::new(catalog, TourConfig::default(), screen, Size::new(1280, 800));
//! tour.register_action_handler(&bridge);
//! tour.start();
//! tour.tick(Duration::from_millis(2000));
//! assert!(tour.snapshot().and_then(|s| s.highlight).is_some());
//!
//! bridge.report_action("dialog-opened");
//! tour.tick(Duration::ZERO);
//! assert_eq!(tour.current_index(), 1);
//!
//! tour.advance();
//! assert_eq!(tour.lifecycle(), Lifecycle::Completed);
//! # Ok::<(), waypoint_tour::CatalogError>(())
//! ```

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod effect;
pub mod locator;
pub mod overlay;
pub mod persistence;
pub mod snapshot;

pub use bridge::{ActionBridge, ActionMailbox};
pub use catalog::{
    ActionRule, ActionTable, CatalogError, InteractionMode, Phase, Step, StepCatalog, TooltipSide,
};
pub use config::{ConfigError, TourConfig};
pub use controller::{ClickOutcome, Lifecycle, TimerConcern, TimerCounts, TourController};
pub use diagnostics::{Anomaly, AnomalyCounts, Degradation};
pub use effect::{FinishReason, TourEffect};
pub use locator::{ElementLookup, LocatorStatus, ScreenModel, TargetLocator};
pub use overlay::{OverlayLayout, OverlayPlacement, TooltipAnchor, place};
pub use persistence::{DismissalStore, FileStore, MemoryStore, PersistenceError};
pub use snapshot::{
    HighlightMode, HighlightView, PhaseOverview, PhaseStatus, Progress, RenderSnapshot,
    TooltipView,
};
