#![forbid(unsafe_code)]

//! Core primitives for Waypoint.
//!
//! Everything here is plain data with no knowledge of steps, timers or hosts.
//! Coordinates are signed viewport units so a target scrolled partly
//! off-screen can still be described exactly.

pub mod geometry;

pub use geometry::{Point, Rect, Sides, Size};
