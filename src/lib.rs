// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

mod config;

pub use config::{
    threshold_fill_color, ClosingEdge, Color, FillColorFn, GaugeConfig, GaugeOptions,
    DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY, DEFAULT_HEIGHT, DEFAULT_LEVEL, DEFAULT_MARGIN,
    DEFAULT_WIDTH,
};

use thiserror::Error;
use tracing::{debug, trace};

// ============================================================================
// RENDERING SURFACE BOUNDARY
// ============================================================================

/// Pixel dimensions reported by a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Stroke style for the container contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 4.0,
            color: Color::BLACK,
        }
    }
}

/// Minimal path-drawing capability the gauge renders through.
///
/// Implementations must be idempotent per shape: drawing the same path twice
/// leaves the same picture as drawing it once. The contour is always handed
/// over after the fill so it stays the topmost boundary.
pub trait Surface {
    /// The surface's current pixel size, if it can be introspected.
    fn bounds(&self) -> Option<Bounds>;

    /// Whether the underlying handle can actually be drawn to.
    fn is_drawable(&self) -> bool;

    /// Removes everything previously drawn.
    fn clear(&mut self);

    /// Draws the closed fill polygon.
    fn fill_path(&mut self, path: &[PixelPoint], color: Color);

    /// Draws the container contour as an open polyline.
    fn stroke_path(&mut self, path: &[PixelPoint], stroke: Stroke);
}

/// Construction-time failures. Both are fatal: no gauge is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GaugeError {
    #[error("gauge needs a reference to a drawable surface")]
    MissingSurface,
    #[error("gauge surface was supplied but cannot be drawn to")]
    InvalidSurface,
}

// ============================================================================
// COORDINATE MAPPING
// ============================================================================

/// A one-dimensional affine map between a domain and a range. Inputs outside
/// the domain extrapolate; no clamping is performed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Affine mapping from the logical [0,100]x[0,100] domain onto the pixel
/// rectangle left inside the margin. Logical y runs bottom-up while pixel y
/// runs top-down, so the y scale is inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale_x: LinearScale,
    scale_y: LinearScale,
}

impl Transform {
    pub fn new(width: f64, height: f64, margin: f64) -> Self {
        Self {
            scale_x: LinearScale::new((0.0, 100.0), (margin, width - margin)),
            scale_y: LinearScale::new((0.0, 100.0), (height - margin, margin)),
        }
    }

    pub fn from_config(config: &GaugeConfig) -> Self {
        Self::new(config.width, config.height, config.margin)
    }

    pub fn x(&self, v: f64) -> f64 {
        self.scale_x.map(v)
    }

    pub fn y(&self, v: f64) -> f64 {
        self.scale_y.map(v)
    }

    pub fn apply(&self, p: WavePoint) -> PixelPoint {
        PixelPoint {
            x: self.x(p.x),
            y: self.y(p.y),
        }
    }

    pub fn apply_all(&self, points: &[WavePoint]) -> Vec<PixelPoint> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

// ============================================================================
// WAVE GEOMETRY
// ============================================================================

/// A point in the logical [0,100]x[0,100] coordinate domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePoint {
    pub x: f64,
    pub y: f64,
}

/// A point in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Number of interior samples along the surface wave.
pub const WAVE_SAMPLES: usize = 100;

/// Builds the closed fill-boundary polygon for the given parameters at
/// animation time `t` (milliseconds).
///
/// The sequence starts and ends on the left closing-edge anchor: anchor,
/// `{0, level}`, one wave sample per integer x in `0..100`, `{100, level}`,
/// the right anchor, and the left anchor again to close the loop; 105
/// points in all.
pub fn wave_vector(config: &GaugeConfig, t: f64) -> Vec<WavePoint> {
    let level = config.level;

    // The ripple grows with the fill level, floored at one logical unit so
    // the surface stays visibly alive near empty.
    let wave_height = (config.amplitude * level / 100.0).max(1.0);

    // Remap the unit wave signal into the band just above the fill, clamped
    // so the crest cannot escape the drawable square.
    let wave_y = LinearScale::new(
        (-1.0, 1.0),
        ((level - 1.0).max(0.0), (level + wave_height - 1.0).min(101.0)),
    );

    let anchor = match config.closing_edge {
        ClosingEdge::Baseline => 0.0,
        ClosingEdge::NearSurface => level - level.min(5.0),
    };

    let mut points = Vec::with_capacity(WAVE_SAMPLES + 5);
    points.push(WavePoint { x: 0.0, y: anchor });
    points.push(WavePoint { x: 0.0, y: level });
    for x in 0..WAVE_SAMPLES {
        let x = x as f64;
        let signal = (t + config.time_shift).cos() * (config.frequency * x + config.phase).sin();
        points.push(WavePoint {
            x,
            y: wave_y.map(signal),
        });
    }
    points.push(WavePoint { x: 100.0, y: level });
    points.push(WavePoint {
        x: 100.0,
        y: anchor,
    });
    points.push(WavePoint { x: 0.0, y: anchor });
    points
}

/// The corners of the logical square, top-left first. Drawn as an open
/// polyline, which leaves the top edge off and yields the container's three
/// walls.
pub fn contour() -> [WavePoint; 4] {
    [
        WavePoint { x: 0.0, y: 100.0 },
        WavePoint { x: 0.0, y: 0.0 },
        WavePoint { x: 100.0, y: 0.0 },
        WavePoint { x: 100.0, y: 100.0 },
    ]
}

// ============================================================================
// ANIMATION CLOCK
// ============================================================================

/// Milliseconds between animation ticks. Each tick also advances the wave's
/// time parameter by this amount.
pub const TICK_INTERVAL_MS: u64 = 100;

/// Book-keeping for one animation run. Replaced wholesale on every `render`
/// call, so at most one ticking loop is ever live per gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AnimationClock {
    elapsed_ticks: u64,
    generation: u64,
    running: bool,
}

impl AnimationClock {
    fn idle(generation: u64) -> Self {
        Self {
            elapsed_ticks: 0,
            generation,
            running: false,
        }
    }

    fn time(&self) -> f64 {
        (self.elapsed_ticks * TICK_INTERVAL_MS) as f64
    }
}

/// Single-owner handle to a running animation. A `render` call invalidates
/// every handle issued before it; ticks presented with a stale handle are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// An animated liquid level gauge attached to a drawable surface.
#[derive(Debug)]
pub struct Gauge<S: Surface> {
    surface: S,
    config: GaugeConfig,
    transform: Transform,
    contour_px: Vec<PixelPoint>,
    clock: AnimationClock,
}

impl<S: Surface> Gauge<S> {
    /// Attaches a gauge to a drawable surface.
    ///
    /// Unset dimensions resolve against the surface's reported bounds, then
    /// against the 500x350 defaults.
    pub fn attach(surface: S, options: GaugeOptions) -> Result<Self, GaugeError> {
        if !surface.is_drawable() {
            return Err(GaugeError::InvalidSurface);
        }
        let config = options.resolve(surface.bounds());
        let transform = Transform::from_config(&config);
        let contour_px = transform.apply_all(&contour());
        debug!(
            width = config.width,
            height = config.height,
            margin = config.margin,
            "gauge attached"
        );
        Ok(Self {
            surface,
            config,
            transform,
            contour_px,
            clock: AnimationClock::idle(0),
        })
    }

    /// Like [`Gauge::attach`], for hosts that resolve surfaces at runtime and
    /// may come up empty-handed.
    pub fn try_attach(surface: Option<S>, options: GaugeOptions) -> Result<Self, GaugeError> {
        let surface = surface.ok_or(GaugeError::MissingSurface)?;
        Self::attach(surface, options)
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    // ------------------------------------------------------------------
    // Parameter setters. Width, height and margin re-derive the transform;
    // the wave parameters do not.
    // ------------------------------------------------------------------

    pub fn set_width(&mut self, width: f64) -> &mut Self {
        self.config.width = width;
        self.refresh_transform();
        self
    }

    pub fn set_height(&mut self, height: f64) -> &mut Self {
        self.config.height = height;
        self.refresh_transform();
        self
    }

    pub fn set_margin(&mut self, margin: f64) -> &mut Self {
        self.config.margin = margin;
        self.refresh_transform();
        self
    }

    pub fn set_level(&mut self, level: f64) -> &mut Self {
        self.config.level = level;
        self
    }

    pub fn set_phase(&mut self, phase: f64) -> &mut Self {
        self.config.phase = phase;
        self
    }

    pub fn set_frequency(&mut self, frequency: f64) -> &mut Self {
        self.config.frequency = frequency;
        self
    }

    pub fn set_amplitude(&mut self, amplitude: f64) -> &mut Self {
        self.config.amplitude = amplitude;
        self
    }

    pub fn set_time_shift(&mut self, time_shift: f64) -> &mut Self {
        self.config.time_shift = time_shift;
        self
    }

    pub fn set_fill_color(&mut self, fill_color: FillColorFn) -> &mut Self {
        self.config.fill_color = fill_color;
        self
    }

    pub fn set_closing_edge(&mut self, closing_edge: ClosingEdge) -> &mut Self {
        self.config.closing_edge = closing_edge;
        self
    }

    /// Re-derives the logical-to-pixel transform and the cached contour
    /// position. Invoked after any mutation of width, height or margin.
    fn refresh_transform(&mut self) {
        self.transform = Transform::from_config(&self.config);
        self.contour_px = self.transform.apply_all(&contour());
    }

    // ------------------------------------------------------------------
    // Rendering and animation
    // ------------------------------------------------------------------

    /// Performs a full redraw from `t = 0` and restarts the animation.
    ///
    /// Any previously issued [`TickHandle`] is invalidated before the new
    /// clock is handed out. Pass `animate = false` to stop after the first
    /// frame; no handle is returned in that case.
    pub fn render(&mut self, animate: bool) -> Option<TickHandle> {
        self.clock = AnimationClock::idle(self.clock.generation + 1);
        self.surface.clear();
        self.draw(0.0);
        debug!(animate, "full redraw");
        if !animate {
            return None;
        }
        self.clock.running = true;
        Some(TickHandle {
            generation: self.clock.generation,
        })
    }

    /// Advances the animation by one tick and redraws.
    ///
    /// Returns `false`, drawing nothing, when the handle no longer owns the
    /// clock or the clock is idle. Callable from any scheduler: an interval
    /// timer, a frame callback, or a manual test clock.
    pub fn tick(&mut self, handle: &TickHandle) -> bool {
        if !self.clock.running || handle.generation != self.clock.generation {
            return false;
        }
        self.clock.elapsed_ticks += 1;
        let t = self.clock.time();
        trace!(t, "tick");
        self.draw(t);
        true
    }

    pub fn is_animating(&self) -> bool {
        self.clock.running
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.clock.elapsed_ticks
    }

    /// One frame: fill first, contour last so it stays on top.
    fn draw(&mut self, t: f64) {
        let fill = self.transform.apply_all(&wave_vector(&self.config, t));
        let color = (self.config.fill_color)(self.config.level);
        self.surface.fill_path(&fill, color);
        self.surface.stroke_path(&self.contour_px, Stroke::default());
    }
}

// ============================================================================
// FRAMEBUFFER SURFACE
// ============================================================================

/// An owned RGBA framebuffer implementing [`Surface`] with CPU
/// rasterization. Hosts blit [`FrameSurface::frame`] into their presentation
/// layer after each tick.
pub struct FrameSurface {
    frame: Vec<u8>,
    width: usize,
    height: usize,
    background: Color,
}

impl FrameSurface {
    pub fn new(width: usize, height: usize) -> Self {
        let mut surface = Self {
            frame: vec![0; width * height * 4],
            width,
            height,
            background: Color::WHITE,
        };
        surface.clear();
        surface
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocates the buffer for a new pixel size. Previously drawn content
    /// is discarded.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.frame = vec![0; width * height * 4];
        self.clear();
    }
}

impl Surface for FrameSurface {
    fn bounds(&self) -> Option<Bounds> {
        Some(Bounds {
            width: self.width as f64,
            height: self.height as f64,
        })
    }

    fn is_drawable(&self) -> bool {
        !self.frame.is_empty()
    }

    fn clear(&mut self) {
        let (r, g, b) = self.background.as_tuple();
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[r, g, b, 0xff]);
        }
    }

    fn fill_path(&mut self, path: &[PixelPoint], color: Color) {
        fill_polygon(&mut self.frame, self.width, self.height, path, color);
    }

    fn stroke_path(&mut self, path: &[PixelPoint], stroke: Stroke) {
        for pair in path.windows(2) {
            draw_thick_line_aa(
                &mut self.frame,
                self.width,
                pair[0].x.round() as i32,
                pair[0].y.round() as i32,
                pair[1].x.round() as i32,
                pair[1].y.round() as i32,
                stroke.width,
                stroke.color,
            );
        }
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, color: Color, alpha: f32) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let src = [color.r as f32, color.g as f32, color.b as f32, 255.0 * alpha];
        let dst = [
            frame[idx] as f32,
            frame[idx + 1] as f32,
            frame[idx + 2] as f32,
            frame[idx + 3] as f32,
        ];
        let a = src[3] / 255.0;
        let out = [
            (src[0] * a + dst[0] * (1.0 - a)).round() as u8,
            (src[1] * a + dst[1] * (1.0 - a)).round() as u8,
            (src[2] * a + dst[2] * (1.0 - a)).round() as u8,
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}

/// Even-odd scanline fill of a closed polygon. Row centers are tested
/// against every edge; intersection pairs bound the filled spans.
fn fill_polygon(frame: &mut [u8], width: usize, height: usize, path: &[PixelPoint], color: Color) {
    if width == 0 || height == 0 || path.len() < 3 {
        return;
    }
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in path {
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if !min_y.is_finite() || !max_y.is_finite() || max_y < 0.0 || min_y >= height as f64 {
        return;
    }
    let y0 = min_y.floor().max(0.0) as usize;
    let y1 = max_y.ceil().min(height as f64 - 1.0) as usize;

    let mut crossings: Vec<f64> = Vec::new();
    for y in y0..=y1 {
        let scan = y as f64 + 0.5;
        crossings.clear();
        for i in 0..path.len() {
            let a = path[i];
            let b = path[(i + 1) % path.len()];
            if (a.y <= scan && b.y > scan) || (b.y <= scan && a.y > scan) {
                crossings.push(a.x + (scan - a.y) / (b.y - a.y) * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round().max(0.0) as usize;
            let end = pair[1].round().min(width as f64 - 1.0);
            if end < 0.0 {
                continue;
            }
            for x in start..=end as usize {
                set_pixel(frame, width, x, y, color, 1.0);
            }
        }
    }
}

fn draw_thick_line_aa(
    frame: &mut [u8],
    width: usize,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: f32,
    color: Color,
) {
    let min_x = x0.min(x1) - thickness.ceil() as i32 - 1;
    let max_x = x0.max(x1) + thickness.ceil() as i32 + 1;
    let min_y = y0.min(y1) - thickness.ceil() as i32 - 1;
    let max_y = y0.max(y1) + thickness.ceil() as i32 + 1;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(1.0);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if x < 0 || y < 0 {
                continue;
            }
            let px = x as f32 - x0 as f32;
            let py = y as f32 - y0 as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                set_pixel(frame, width, x as usize, y as usize, color, aa);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_scale_maps_endpoints_and_extrapolates() {
        let scale = LinearScale::new((0.0, 100.0), (40.0, 460.0));
        assert_eq!(scale.map(0.0), 40.0);
        assert_eq!(scale.map(100.0), 460.0);
        assert_eq!(scale.map(50.0), 250.0);
        // No clamping: inputs beyond the domain keep going.
        assert_eq!(scale.map(200.0), 880.0);
        assert_eq!(scale.map(-50.0), -170.0);
    }

    #[test]
    fn linear_scale_supports_inverted_ranges() {
        let scale = LinearScale::new((0.0, 100.0), (310.0, 40.0));
        assert_eq!(scale.map(0.0), 310.0);
        assert_eq!(scale.map(100.0), 40.0);
    }

    #[test]
    fn frame_surface_clears_to_white() {
        let mut surface = FrameSurface::new(4, 4);
        surface.clear();
        assert!(surface
            .frame()
            .chunks_exact(4)
            .all(|px| px == [0xff, 0xff, 0xff, 0xff]));
    }

    #[test]
    fn fill_polygon_covers_interior_not_exterior() {
        let mut surface = FrameSurface::new(20, 20);
        let square = [
            PixelPoint { x: 5.0, y: 5.0 },
            PixelPoint { x: 15.0, y: 5.0 },
            PixelPoint { x: 15.0, y: 15.0 },
            PixelPoint { x: 5.0, y: 15.0 },
        ];
        surface.fill_path(&square, Color::GREEN);
        let px = |x: usize, y: usize| {
            let idx = (y * 20 + x) * 4;
            (
                surface.frame()[idx],
                surface.frame()[idx + 1],
                surface.frame()[idx + 2],
            )
        };
        assert_eq!(px(10, 10), Color::GREEN.as_tuple());
        assert_eq!(px(1, 1), Color::WHITE.as_tuple());
        assert_eq!(px(18, 18), Color::WHITE.as_tuple());
    }

    #[test]
    fn zero_sized_frame_surface_is_not_drawable() {
        let surface = FrameSurface::new(0, 0);
        assert!(!surface.is_drawable());
    }
}
