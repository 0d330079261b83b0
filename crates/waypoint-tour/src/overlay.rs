#![forbid(unsafe_code)]

//! Highlight and tooltip placement.
//!
//! [`place`] is a pure function of the measured target, the step's preferred
//! side, the viewport and a fixed [`OverlayLayout`]. Resize and scroll
//! re-measurements call it again, so identical inputs must give identical
//! output.
//!
//! # Algorithm
//!
//! 1. Compute the naive tooltip origin on the preferred side, centred on the
//!    target along the cross axis.
//! 2. If that would be clipped on the main axis, try the opposite side.
//! 3. Clamp both axes into `[margin, extent - footprint - margin]`.
//! 4. Without a target, anchor the tooltip at the bottom centre of the
//!    viewport.

use waypoint_core::geometry::{Point, Rect, Sides, Size};

use crate::catalog::TooltipSide;
use crate::config::TourConfig;

/// Fixed geometry parameters for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    /// Tooltip footprint.
    pub tooltip: Size,
    /// Gap to the target and minimum distance to viewport edges.
    pub margin: i32,
    /// Highlight padding around the target.
    pub padding: i32,
    /// Distance of the fallback tooltip from the viewport bottom.
    pub fallback_bottom_offset: i32,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self::from(&TourConfig::default())
    }
}

impl From<&TourConfig> for OverlayLayout {
    fn from(config: &TourConfig) -> Self {
        Self {
            tooltip: config.tooltip,
            margin: config.margin,
            padding: config.highlight_padding,
            fallback_bottom_offset: config.fallback_bottom_offset,
        }
    }
}

/// Where the tooltip ended up relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipAnchor {
    /// Attached to the target on the given side (possibly flipped from the preferred one).
    Target(TooltipSide),
    /// No target geometry; fixed anchor near the bottom of the viewport.
    Fallback,
}

/// Result of [`place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Target rect grown by the layout padding; `None` without a target.
    pub highlight: Option<Rect>,
    /// Top-left corner of the tooltip.
    pub tooltip: Point,
    pub anchor: TooltipAnchor,
}

impl OverlayPlacement {
    /// Tooltip bounds for hit testing.
    #[must_use]
    pub fn tooltip_rect(&self, layout: &OverlayLayout) -> Rect {
        Rect::new(
            self.tooltip.x,
            self.tooltip.y,
            layout.tooltip.width,
            layout.tooltip.height,
        )
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.anchor == TooltipAnchor::Fallback
    }
}

/// Compute highlight and tooltip placement.
#[must_use]
pub fn place(
    target: Option<Rect>,
    preferred: TooltipSide,
    viewport: Size,
    layout: &OverlayLayout,
) -> OverlayPlacement {
    let Some(target) = target else {
        return fallback(viewport, layout);
    };

    let tip = layout.tooltip;
    let margin = layout.margin;

    let naive = naive_origin(target, preferred, tip, margin);
    let (side, origin) = if fits(naive, preferred, tip, viewport, margin) {
        (preferred, naive)
    } else {
        let flipped = preferred.opposite();
        let alt = naive_origin(target, flipped, tip, margin);
        if fits(alt, flipped, tip, viewport, margin) {
            (flipped, alt)
        } else {
            // Neither side has room; keep the author's choice and let clamping decide.
            (preferred, naive)
        }
    };

    OverlayPlacement {
        highlight: Some(target.outer(Sides::all(layout.padding))),
        tooltip: Point::new(
            clamp_axis(origin.x, viewport.width, tip.width, margin),
            clamp_axis(origin.y, viewport.height, tip.height, margin),
        ),
        anchor: TooltipAnchor::Target(side),
    }
}

fn fallback(viewport: Size, layout: &OverlayLayout) -> OverlayPlacement {
    let tip = layout.tooltip;
    let x = viewport.width.saturating_sub(tip.width) / 2;
    let y = viewport
        .height
        .saturating_sub(tip.height)
        .saturating_sub(layout.fallback_bottom_offset);
    OverlayPlacement {
        highlight: None,
        tooltip: Point::new(
            clamp_axis(x, viewport.width, tip.width, layout.margin),
            clamp_axis(y, viewport.height, tip.height, layout.margin),
        ),
        anchor: TooltipAnchor::Fallback,
    }
}

// Measured rects can sit anywhere in `i32` space, so all offsets saturate.
fn naive_origin(target: Rect, side: TooltipSide, tip: Size, margin: i32) -> Point {
    let centred_x = target.center_x().saturating_sub(tip.width / 2);
    let centred_y = target.center_y().saturating_sub(tip.height / 2);
    match side {
        TooltipSide::Bottom => Point::new(centred_x, target.bottom().saturating_add(margin)),
        TooltipSide::Top => Point::new(
            centred_x,
            target.top().saturating_sub(tip.height).saturating_sub(margin),
        ),
        TooltipSide::Right => Point::new(target.right().saturating_add(margin), centred_y),
        TooltipSide::Left => Point::new(
            target.left().saturating_sub(tip.width).saturating_sub(margin),
            centred_y,
        ),
    }
}

/// Whether the tooltip has room on the main axis of `side`.
fn fits(origin: Point, side: TooltipSide, tip: Size, viewport: Size, margin: i32) -> bool {
    match side {
        TooltipSide::Bottom => {
            origin.y.saturating_add(tip.height).saturating_add(margin) <= viewport.height
        }
        TooltipSide::Top => origin.y >= margin,
        TooltipSide::Right => {
            origin.x.saturating_add(tip.width).saturating_add(margin) <= viewport.width
        }
        TooltipSide::Left => origin.x >= margin,
    }
}

/// Clamp into `[margin, extent - size - margin]`; the low bound wins when the
/// viewport is too small for the footprint.
fn clamp_axis(value: i32, extent: i32, size: i32, margin: i32) -> i32 {
    let hi = extent.saturating_sub(size).saturating_sub(margin);
    if hi < margin {
        margin
    } else {
        value.clamp(margin, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1280, 800);

    fn layout() -> OverlayLayout {
        OverlayLayout::default()
    }

    #[test]
    fn bottom_placement_centres_under_target() {
        let target = Rect::new(500, 100, 200, 40);
        let p = place(Some(target), TooltipSide::Bottom, VIEWPORT, &layout());
        assert_eq!(p.anchor, TooltipAnchor::Target(TooltipSide::Bottom));
        assert_eq!(p.tooltip, Point::new(600 - 160, 140 + 16));
    }

    #[test]
    fn highlight_is_padded_target() {
        let target = Rect::new(500, 100, 200, 40);
        let p = place(Some(target), TooltipSide::Bottom, VIEWPORT, &layout());
        assert_eq!(p.highlight, Some(Rect::new(494, 94, 212, 52)));
    }

    #[test]
    fn bottom_flips_to_top_near_viewport_bottom() {
        let target = Rect::new(500, 700, 200, 40);
        let p = place(Some(target), TooltipSide::Bottom, VIEWPORT, &layout());
        assert_eq!(p.anchor, TooltipAnchor::Target(TooltipSide::Top));
        assert_eq!(p.tooltip.y, 700 - 180 - 16);
    }

    #[test]
    fn top_flips_to_bottom_near_viewport_top() {
        let target = Rect::new(500, 20, 200, 40);
        let p = place(Some(target), TooltipSide::Top, VIEWPORT, &layout());
        assert_eq!(p.anchor, TooltipAnchor::Target(TooltipSide::Bottom));
        assert_eq!(p.tooltip.y, 60 + 16);
    }

    #[test]
    fn left_flips_to_right_near_left_edge() {
        let target = Rect::new(10, 300, 200, 60);
        let p = place(Some(target), TooltipSide::Left, VIEWPORT, &layout());
        assert_eq!(p.anchor, TooltipAnchor::Target(TooltipSide::Right));
        assert_eq!(p.tooltip.x, 210 + 16);
    }

    #[test]
    fn right_flips_to_left_near_right_edge() {
        let target = Rect::new(1100, 300, 150, 60);
        let p = place(Some(target), TooltipSide::Right, VIEWPORT, &layout());
        assert_eq!(p.anchor, TooltipAnchor::Target(TooltipSide::Left));
        assert_eq!(p.tooltip.x, 1100 - 320 - 16);
    }

    #[test]
    fn cross_axis_is_clamped() {
        // Sidebar item hugging the left edge: centred tooltip would start off-screen.
        let target = Rect::new(0, 100, 60, 40);
        let p = place(Some(target), TooltipSide::Bottom, VIEWPORT, &layout());
        assert_eq!(p.tooltip.x, 16);
        // Right-side item near the bottom: vertical centre would overflow.
        let target = Rect::new(100, 760, 60, 30);
        let p = place(Some(target), TooltipSide::Right, VIEWPORT, &layout());
        assert_eq!(p.tooltip.y, 800 - 180 - 16);
    }

    #[test]
    fn no_room_either_side_keeps_preferred_and_clamps() {
        // Target fills the viewport height.
        let target = Rect::new(400, 0, 100, 800);
        let p = place(Some(target), TooltipSide::Bottom, VIEWPORT, &layout());
        assert_eq!(p.anchor, TooltipAnchor::Target(TooltipSide::Bottom));
        assert_eq!(p.tooltip.y, 800 - 180 - 16);
    }

    #[test]
    fn missing_target_uses_fallback_anchor() {
        let p = place(None, TooltipSide::Left, VIEWPORT, &layout());
        assert!(p.is_fallback());
        assert_eq!(p.highlight, None);
        assert_eq!(p.tooltip, Point::new((1280 - 320) / 2, 800 - 180 - 80));
    }

    #[test]
    fn tiny_viewport_pins_to_margin() {
        let tiny = Size::new(200, 100);
        let p = place(Some(Rect::new(50, 50, 10, 10)), TooltipSide::Bottom, tiny, &layout());
        assert_eq!(p.tooltip, Point::new(16, 16));
        let p = place(None, TooltipSide::Bottom, tiny, &layout());
        assert_eq!(p.tooltip, Point::new(16, 16));
    }

    #[test]
    fn placement_is_idempotent() {
        let target = Some(Rect::new(-30, 790, 90, 25));
        let a = place(target, TooltipSide::Right, VIEWPORT, &layout());
        let b = place(target, TooltipSide::Right, VIEWPORT, &layout());
        assert_eq!(a, b);
    }

    #[test]
    fn tooltip_rect_uses_footprint() {
        let p = place(None, TooltipSide::Bottom, VIEWPORT, &layout());
        let rect = p.tooltip_rect(&layout());
        assert_eq!((rect.width, rect.height), (320, 180));
        assert!(rect.right() <= VIEWPORT.width);
    }

    fn assert_on_screen(p: &OverlayPlacement) {
        let rect = p.tooltip_rect(&layout());
        assert!(rect.left() >= 16 && rect.top() >= 16, "{p:?}");
        assert!(rect.right() <= VIEWPORT.width - 16, "{p:?}");
        assert!(rect.bottom() <= VIEWPORT.height - 16, "{p:?}");
    }

    #[test]
    fn far_off_screen_targets_clamp_on_every_side() {
        let far = [
            (Rect::new(i32::MAX - 10, 100, 20, 20), TooltipSide::Right),
            (Rect::new(100, i32::MAX - 5, 20, 20), TooltipSide::Bottom),
            (Rect::new(i32::MIN + 4, 100, 20, 20), TooltipSide::Left),
            (Rect::new(100, i32::MIN + 4, 20, 20), TooltipSide::Top),
            (Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX), TooltipSide::Bottom),
        ];
        for (target, side) in far {
            let p = place(Some(target), side, VIEWPORT, &layout());
            assert!(matches!(p.anchor, TooltipAnchor::Target(_)));
            assert!(p.highlight.is_some());
            assert_on_screen(&p);
        }
    }

    #[test]
    fn extreme_layout_values_do_not_overflow() {
        let wide = OverlayLayout {
            tooltip: Size::new(i32::MAX, i32::MAX),
            margin: i32::MAX,
            padding: i32::MAX,
            fallback_bottom_offset: i32::MIN,
        };
        let p = place(None, TooltipSide::Bottom, Size::new(i32::MIN, i32::MIN), &wide);
        assert_eq!(p.tooltip, Point::new(i32::MAX, i32::MAX));
        let target = Some(Rect::new(i32::MAX, i32::MIN, i32::MAX, i32::MAX));
        for side in [TooltipSide::Top, TooltipSide::Bottom, TooltipSide::Left, TooltipSide::Right] {
            let p = place(target, side, VIEWPORT, &wide);
            assert_eq!(p.tooltip, Point::new(i32::MAX, i32::MAX));
        }
    }
}
