use bon::Builder;
use rand::Rng;
use std::f64::consts::PI;

use crate::Bounds;

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const GREEN: Color = Color::new(0x00, 0x80, 0x00);
    pub const YELLOW: Color = Color::new(0xff, 0xff, 0x00);
    pub const RED: Color = Color::new(0xff, 0x00, 0x00);
}

/// Maps a fill level (percent) to the color used for the fill path.
pub type FillColorFn = fn(f64) -> Color;

/// Default three-band fill color: green below 75, yellow below 90, red above.
pub fn threshold_fill_color(level: f64) -> Color {
    if level < 75.0 {
        Color::GREEN
    } else if level < 90.0 {
        Color::YELLOW
    } else {
        Color::RED
    }
}

// ============================================================================
// GAUGE PARAMETERS
// ============================================================================

pub const DEFAULT_WIDTH: f64 = 500.0;
pub const DEFAULT_HEIGHT: f64 = 350.0;
pub const DEFAULT_MARGIN: f64 = 40.0;
pub const DEFAULT_LEVEL: f64 = 50.0;
pub const DEFAULT_FREQUENCY: f64 = 0.18;
pub const DEFAULT_AMPLITUDE: f64 = 6.0;

/// How the vertical closing edges of the fill polygon are anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClosingEdge {
    /// Edges run from the surface all the way down to the baseline.
    #[default]
    Baseline,
    /// Edges span only a short band below the surface, anchored at
    /// `level - min(5, level)`.
    NearSurface,
}

/// Construction arguments for a [`Gauge`](crate::Gauge).
///
/// Width and height are optional: when unset they fall back to the surface's
/// reported bounds and then to the 500x350 defaults. Phase and time shift
/// default to uniform draws from `[0, pi)` so multiple gauges on one screen
/// stay visually out of step.
#[derive(Debug, Clone, Builder)]
pub struct GaugeOptions {
    /// Explicit pixel width of the drawing area.
    pub width: Option<f64>,
    /// Explicit pixel height of the drawing area.
    pub height: Option<f64>,
    /// Inset from the surface edges, in pixels.
    #[builder(default = DEFAULT_MARGIN)]
    pub margin: f64,
    /// Fill level in percent. Out-of-range values are accepted as given.
    #[builder(default = DEFAULT_LEVEL)]
    pub level: f64,
    /// Phase shift of the surface wave, in radians.
    #[builder(default = rand::rng().random_range(0.0..PI))]
    pub phase: f64,
    /// Spatial frequency of the surface wave.
    #[builder(default = DEFAULT_FREQUENCY)]
    pub frequency: f64,
    /// Amplitude of the surface wave, in logical units.
    #[builder(default = DEFAULT_AMPLITUDE)]
    pub amplitude: f64,
    /// Per-instance animation time offset, in radians.
    #[builder(default = rand::rng().random_range(0.0..PI))]
    pub time_shift: f64,
    /// Maps the current level to the fill color.
    #[builder(default = threshold_fill_color as FillColorFn)]
    pub fill_color: FillColorFn,
    /// Closing-edge strategy for the fill polygon.
    #[builder(default)]
    pub closing_edge: ClosingEdge,
}

impl Default for GaugeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeOptions {
    /// Resolves the optional dimensions against the surface's reported
    /// bounds. A degenerate report (zero-sized) falls through to the
    /// defaults, the same as no report at all.
    pub fn resolve(self, bounds: Option<Bounds>) -> GaugeConfig {
        let measured = bounds.filter(|b| b.width > 0.0 && b.height > 0.0);
        GaugeConfig {
            width: self
                .width
                .or(measured.map(|b| b.width))
                .unwrap_or(DEFAULT_WIDTH),
            height: self
                .height
                .or(measured.map(|b| b.height))
                .unwrap_or(DEFAULT_HEIGHT),
            margin: self.margin,
            level: self.level,
            phase: self.phase,
            frequency: self.frequency,
            amplitude: self.amplitude,
            time_shift: self.time_shift,
            fill_color: self.fill_color,
            closing_edge: self.closing_edge,
        }
    }
}

/// Fully resolved gauge parameters, owned by the gauge instance and mutated
/// only through its setters.
#[derive(Debug, Clone)]
pub struct GaugeConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub level: f64,
    pub phase: f64,
    pub frequency: f64,
    pub amplitude: f64,
    pub time_shift: f64,
    pub fill_color: FillColorFn,
    pub closing_edge: ClosingEdge,
}
