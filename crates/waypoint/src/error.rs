#![forbid(unsafe_code)]

//! Waypoint error model and graceful degradation.
//!
//! A tour is an optional layer on top of a host application. Nothing that
//! goes wrong while loading or persisting it may take the host down, so
//! every error maps to a [`Degradation`] the host applies instead.
//!
//! Runtime conditions inside a running tour (a target that never appears,
//! an action for another step) are not errors at all. They are reported as
//! [`waypoint_tour::Anomaly`] counters on the controller.

use std::fmt;

use waypoint_tour::{CatalogError, ConfigError, Degradation, PersistenceError};

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for Waypoint hosts.
///
/// Each variant wraps a domain-specific error. Use [`Error::degradation`] to
/// decide how to carry on.
#[derive(Debug)]
pub enum Error {
    /// The step catalog is invalid.
    Catalog(CatalogError),
    /// A configuration or catalog file could not be read or parsed.
    Config(ConfigError),
    /// The dismissal flag could not be read or written.
    Persistence(PersistenceError),
    /// Raw I/O error (convenience variant for `?` on io::Result).
    Io(std::io::Error),
}

/// Standard result type for Waypoint APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

impl Error {
    /// Determine the graceful degradation action for this error.
    pub fn degradation(&self) -> Degradation {
        match self {
            // A catalog file that parsed but describes a broken tour is as
            // fatal to the tour as a broken in-code catalog.
            Self::Catalog(_) | Self::Config(ConfigError::Catalog(_)) => Degradation::DisableTour,
            Self::Config(_) => Degradation::UseDefaults,
            Self::Persistence(_) => Degradation::AssumeNotDismissed,
            Self::Io(_) => Degradation::DisableTour,
        }
    }

    /// Error type label for metrics and tracing.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Catalog(_) => "catalog",
            Self::Config(_) => "config",
            Self::Persistence(_) => "persistence",
            Self::Io(_) => "io",
        }
    }

    /// Whether the tour can still run after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), Degradation::DisableTour)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "invalid catalog: {err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<PersistenceError> for Error {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    fn toml_error() -> ConfigError {
        match waypoint_tour::TourConfig::from_toml_str("margin = [") {
            Err(err) => err,
            Ok(_) => panic!("malformed TOML parsed"),
        }
    }

    // ── From ────────────────────────────────────────────────────────

    #[test]
    fn error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io);
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{err}").contains("file missing"));
    }

    #[test]
    fn error_from_catalog() {
        let err: Error = CatalogError::DuplicateStepId("intro".into()).into();
        assert!(matches!(err, Error::Catalog(_)));
        assert!(format!("{err}").contains("intro"));
    }

    #[test]
    fn error_from_config() {
        let err: Error = toml_error().into();
        assert!(matches!(err, Error::Config(ConfigError::Toml(_))));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn error_from_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = PersistenceError::Io(io).into();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(format!("{err}").contains("read-only"));
    }

    // ── Degradation Mapping ─────────────────────────────────────────

    #[test]
    fn degradation_bad_config_keeps_defaults() {
        let err: Error = toml_error().into();
        assert_eq!(err.degradation(), Degradation::UseDefaults);
        let err: Error = ConfigError::Validation(vec!["margin".into()]).into();
        assert_eq!(err.degradation(), Degradation::UseDefaults);
        assert!(err.is_recoverable());
    }

    #[test]
    fn degradation_invalid_catalog_disables_tour() {
        let err: Error = CatalogError::Empty.into();
        assert_eq!(err.degradation(), Degradation::DisableTour);
        assert!(!err.is_recoverable());

        let err: Error = ConfigError::Catalog(CatalogError::Empty).into();
        assert_eq!(err.degradation(), Degradation::DisableTour);
    }

    #[test]
    fn degradation_storage_assumes_not_dismissed() {
        let io = std::io::Error::other("disk");
        let err: Error = PersistenceError::Io(io).into();
        assert_eq!(err.degradation(), Degradation::AssumeNotDismissed);
        assert!(err.is_recoverable());
    }

    #[test]
    fn error_type_labels() {
        let io = || std::io::Error::other("x");
        assert_eq!(Error::from(CatalogError::Empty).error_type(), "catalog");
        assert_eq!(Error::from(toml_error()).error_type(), "config");
        assert_eq!(Error::from(PersistenceError::Io(io())).error_type(), "persistence");
        assert_eq!(Error::from(io()).error_type(), "io");
    }

    #[test]
    fn degradation_display() {
        assert_eq!(Degradation::AssumeNotDismissed.to_string(), "assume_not_dismissed");
        assert_eq!(Degradation::DisableTour.to_string(), "disable_tour");
    }
}
