//! Thermal frame handling and drive-control helpers for the presentation
//! layer.

use std::fmt;

use crate::constants::{GRID_SIZE, MAX_SPEED, MIN_SPEED, PIXEL_COUNT, SPEED_STEP};

/// A validated 8×8 thermal frame in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalGrid {
    pixels: [f64; PIXEL_COUNT],
}

impl ThermalGrid {
    /// Build a grid from a raw pixel slice. Returns `None` unless the slice
    /// holds exactly 64 values.
    pub fn from_pixels(pixels: &[f64]) -> Option<Self> {
        let pixels: [f64; PIXEL_COUNT] = pixels.try_into().ok()?;
        Some(Self { pixels })
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.pixels.chunks_exact(GRID_SIZE)
    }

    /// Temperature at `(row, col)`, `None` outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        (row < GRID_SIZE && col < GRID_SIZE).then(|| self.pixels[row * GRID_SIZE + col])
    }

    /// Coldest pixel.
    pub fn min(&self) -> f64 {
        self.pixels.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Hottest pixel.
    pub fn max(&self) -> f64 {
        self.pixels.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Colour of every pixel, scaled to this frame's own range.
    pub fn colors(&self) -> Vec<Rgb> {
        let (min, max) = (self.min(), self.max());
        self.pixels.iter().map(|&t| heat_color(t, min, max)).collect()
    }
}

/// 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Neutral colour for frames with no temperature spread.
    pub const GREY: Self = Self(128, 128, 128);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Map a temperature to the blue → cyan → green → yellow → red gradient
/// spanning `[min, max]`.
#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn heat_color(temp: f64, min: f64, max: f64) -> Rgb {
    let range = max - min;
    if range == 0.0 {
        return Rgb::GREY;
    }
    let n = ((temp - min) / range).clamp(0.0, 1.0);
    let ramp = |t: f64| (255.0 * t).round() as u8;

    if n < 0.25 {
        Rgb(0, ramp(n / 0.25), 255)
    } else if n < 0.5 {
        Rgb(0, 255, ramp(1.0 - (n - 0.25) / 0.25))
    } else if n < 0.75 {
        Rgb(ramp((n - 0.5) / 0.25), 255, 0)
    } else {
        Rgb(255, ramp(1.0 - (n - 0.75) / 0.25), 0)
    }
}

/// Speed as a percentage of full duty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn speed_percent(speed: u8) -> u8 {
    ((f64::from(speed) / f64::from(MAX_SPEED)) * 100.0).round() as u8
}

/// Snap a requested speed onto the control's range and step.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_speed(requested: i32) -> u8 {
    let min = i32::from(MIN_SPEED);
    let step = i32::from(SPEED_STEP);
    let bounded = requested.clamp(min, i32::from(MAX_SPEED));
    let snapped = min + ((bounded - min) / step) * step;
    snapped as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
