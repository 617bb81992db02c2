//! Playback time ↔ frame index conversion at a fixed nominal frame rate.
//!
//! Frames are always derived as `floor(seconds * rate)`. Products that land
//! within a small tolerance of an integer are snapped onto that integer
//! first, so that `time_to_frame(frame_to_time(f)) == f` holds even though
//! `f / 30 * 30` is not exact in binary floating point (e.g. `f = 123`).
//! The tolerance grows with the product, and the round trip holds for every
//! frame below 2^51.

use crate::types::{FrameIndex, FrameRate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Nominal frame rate used for every session.
pub const DEFAULT_FRAME_RATE: FrameRate = 30;

/// Advisory upper bound (10 s at 30 fps) while the duration is unknown.
pub const FALLBACK_FRAME_BOUND: FrameIndex = 300;

/// Distance, in frames, under which a product is treated as on-boundary.
const SNAP_EPSILON: f64 = 1e-6;

/// Relative snap tolerance for large products, a few ulps of the product.
const SNAP_RELATIVE: f64 = 4.0 * f64::EPSILON;

// ---------------------------------------------------------------------------
// FrameClock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    rate: FrameRate,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            rate: DEFAULT_FRAME_RATE,
        }
    }

    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Convert a playback position in seconds to a frame index.
    ///
    /// Negative and non-finite inputs clamp to frame 0.
    pub fn time_to_frame(&self, secs: f64) -> FrameIndex {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        let raw = secs * f64::from(self.rate);
        let nearest = raw.round();
        let tolerance = SNAP_EPSILON.max(raw * SNAP_RELATIVE);
        if (raw - nearest).abs() < tolerance {
            nearest as FrameIndex
        } else {
            raw.floor() as FrameIndex
        }
    }

    /// Start time of `frame`, in seconds.
    pub fn frame_to_time(&self, frame: FrameIndex) -> f64 {
        frame as f64 / f64::from(self.rate)
    }

    /// Upper bound offered to scrubbing controls.
    ///
    /// Falls back to [`FALLBACK_FRAME_BOUND`] when the duration is unknown or
    /// not a positive finite number. Advisory only: stored annotations are
    /// never checked against it.
    pub fn frame_bound(&self, duration_secs: Option<f64>) -> FrameIndex {
        match duration_secs {
            Some(d) if d.is_finite() && d > 0.0 => self.time_to_frame(d),
            _ => FALLBACK_FRAME_BOUND,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
