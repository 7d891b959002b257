//! Dial geometry: touch-to-time mapping and per-tick drawing parameters
//!
//! Coordinates follow the screen convention, x grows to the right and y grows
//! downwards. Angle 0 on the dial is the topmost point and time runs clockwise.

use serde::{Deserialize, Serialize};

/// A point on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Map a touch `position` on a dial centred at `center` to a second value.
///
/// The result is in `[0, time_limit)`: the angle is rounded to the nearest
/// tick and a touch rounding up to `time_limit` wraps to 0. Returns `None`
/// when the angle is undefined (touch exactly on the center, non-finite input
/// or a zero limit).
pub fn position_to_time(center: Point, position: Point, time_limit: u32) -> Option<u32> {
    if time_limit == 0 || !center.is_finite() || !position.is_finite() {
        return None;
    }

    let dx = f64::from(center.x) - f64::from(position.x);
    let dy = f64::from(center.y) - f64::from(position.y);
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let degrees = dy.atan2(dx).to_degrees();
    let clean_degrees = (degrees - 90.0).rem_euclid(360.0);
    let seconds = (clean_degrees * f64::from(time_limit) / 360.0).round() as u32;

    Some(seconds % time_limit)
}

/// Drawing parameters for a single dial tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialTick {
    pub index: u32,
    /// Direction of the tick, already rotated so that index 0 points up
    pub angle_degrees: f32,
    /// How much of the tick is highlighted, in `[0, 1]`
    pub fill: f32,
}

impl DialTick {
    /// Any part drawn in the highlight color
    pub fn is_highlighted(&self) -> bool {
        self.fill > 0.0
    }

    /// Any part of the dimmed track visible
    pub fn shows_track(&self) -> bool {
        self.fill < 1.0
    }

    /// Screen-space endpoints of this tick between two radii
    pub fn segment(&self, center: Point, inner_radius: f32, outer_radius: f32) -> TickSegment {
        let radians = self.angle_degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        let at = |radius: f32| Point::new(center.x + cos * radius, center.y + sin * radius);

        let highlight_radius = inner_radius + (outer_radius - inner_radius) * self.fill;

        TickSegment {
            start: at(inner_radius),
            highlight_end: at(highlight_radius),
            track_end: at(outer_radius),
        }
    }
}

/// Line endpoints for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSegment {
    pub start: Point,
    /// End of the highlighted part; equal to `start` when the tick is empty
    pub highlight_end: Point,
    pub track_end: Point,
}

/// Compute every tick of a dial showing `progress`.
///
/// `progress` is clamped to `[0, 1]`. Ticks before the progress point are
/// full, ticks after it are empty, the boundary tick is partially filled.
pub fn dial_ticks(progress: f32, tick_count: u32) -> Vec<DialTick> {
    if tick_count == 0 {
        return Vec::new();
    }

    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let step = 360.0 / tick_count as f32;
    let ticks_to_show = progress * tick_count as f32;

    (0..tick_count)
        .map(|index| DialTick {
            index,
            angle_degrees: index as f32 * step - 90.0,
            fill: (ticks_to_show - index as f32).clamp(0.0, 1.0),
        })
        .collect()
}

/// Radii used to lay out the ticks of a dial in a given area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialLayout {
    pub center: Point,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl DialLayout {
    /// Ticks start a third of the width from the center and reach the edge
    pub fn for_size(width: f32, height: f32) -> Self {
        let center = Point::new(width / 2.0, height / 2.0);
        Self {
            center,
            inner_radius: width / 3.0,
            outer_radius: center.x.min(center.y),
        }
    }
}
