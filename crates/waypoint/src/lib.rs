#![forbid(unsafe_code)]

//! Waypoint public facade crate.
//!
//! Re-exports the tour engine and its building blocks, adds the unified
//! [`Error`] model, and offers a prelude for hosts.
//!
//! # Example
//!
//! ```
//! use waypoint::prelude::*;
//!
//! let catalog = StepCatalog::from_toml_str(r#"
//!     [[phases]]
//!     id = 1
//!     title = "Basics"
//!
//!     [[steps]]
//!     id = "hello"
//!     phase = 1
//!     page_key = "home"
//!     target_key = "logo"
//! "#)?;
//!
//! let mut tour = TourController::new(catalog, TourConfig::default(), ScreenModel::new(), Size::new(800, 600));
//! tour.start();
//! assert!(tour.is_active());
//! # Ok::<(), waypoint::Error>(())
//! ```

use std::path::Path;

pub mod error;

pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use waypoint_core::geometry::{Point, Rect, Sides, Size};

// --- Runtime re-exports ----------------------------------------------------

pub use waypoint_runtime::{BackoffStrategy, RetryPolicy, TimerId, TimerQueue};

// --- Tour re-exports -------------------------------------------------------

pub use waypoint_tour::{
    ActionBridge, ActionMailbox, ActionRule, Anomaly, AnomalyCounts, CatalogError, ClickOutcome,
    ConfigError, Degradation, DismissalStore, ElementLookup, FileStore, FinishReason,
    HighlightMode, InteractionMode, Lifecycle, MemoryStore, OverlayLayout, OverlayPlacement,
    PersistenceError, Phase, PhaseStatus, Progress, RenderSnapshot, ScreenModel, Step,
    StepCatalog, TimerConcern, TimerCounts, TooltipAnchor, TooltipSide, TourConfig,
    TourController, TourEffect, place,
};

// --- Loading ---------------------------------------------------------------

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a step catalog, choosing JSON or TOML by file extension.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<StepCatalog> {
    let path = path.as_ref();
    let loaded = if is_json(path) {
        StepCatalog::from_json_file(path)
    } else {
        StepCatalog::from_toml_file(path)
    };
    // Without a catalog there is no tour to fall back to.
    loaded.map_err(|err| match err {
        ConfigError::Io(io) => Error::Io(io),
        other => Error::Config(other),
    })
}

/// Load engine configuration, choosing JSON or TOML by file extension.
pub fn load_config(path: impl AsRef<Path>) -> Result<TourConfig> {
    let path = path.as_ref();
    let config = if is_json(path) {
        TourConfig::from_json_file(path)?
    } else {
        TourConfig::from_toml_file(path)?
    };
    Ok(config)
}

/// Load engine configuration, keeping the defaults if the file is missing
/// or invalid.
pub fn load_config_or_default(path: impl AsRef<Path>) -> TourConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                degradation = %err.degradation(),
                "tour config rejected"
            );
            TourConfig::default()
        }
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ActionBridge, ActionRule, ClickOutcome, DismissalStore, ElementLookup, Error,
        FinishReason, InteractionMode, Lifecycle, MemoryStore, Phase, Rect, Result, ScreenModel,
        Size, Step, StepCatalog, TooltipSide, TourConfig, TourController, TourEffect,
    };

    pub use crate::{core, runtime, tour};
}

pub use waypoint_core as core;
pub use waypoint_runtime as runtime;
pub use waypoint_tour as tour;
