//! Procedural ring/arc rasterizer for player-vitals overlays.
//!
//! Health, shield, barrier and per-ability cooldown state is stamped as
//! annular arc segments into a square RGBA pixel buffer. The buffer is
//! rebuilt only when a tracked input changes and can be uploaded directly
//! as a texture, or displayed in a window through [`VitalsRing`].

// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

// External crate imports
use bon::Builder;
use log::{debug, info, trace};
use palette::{FromColor, Hsv, Srgb};
use pixels::{Pixels, SurfaceTexture};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

// ============================================================================
// COLOR HANDLING
// ============================================================================

/// RGBA color with normalized components.
///
/// Every constructor clamps each component into `[0, 1]`, so a stored color
/// never carries an out-of-range channel or alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    pub const GRAY: Color = Color { r: 0.5, g: 0.5, b: 0.5, a: 1.0 };
    pub const CYAN: Color = Color { r: 0.0, g: 1.0, b: 1.0, a: 1.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Same color with the alpha replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Scales the rgb channels, leaving alpha untouched.
    pub fn dimmed(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    pub fn from_rgba8(bytes: [u8; 4]) -> Self {
        Self {
            r: bytes[0] as f32 / 255.0,
            g: bytes[1] as f32 / 255.0,
            b: bytes[2] as f32 / 255.0,
            a: bytes[3] as f32 / 255.0,
        }
    }
}

/// Maps a health percentage to a hue between red (empty) and green (full).
///
/// The hue is `pct * 120` degrees at full saturation and value; the alpha is
/// always 1.0, callers dim or fade as needed. Input outside `[0, 1]` is
/// clamped first, so the transition stays monotonic.
pub fn health_color(pct: f32) -> Color {
    let pct = pct.clamp(0.0, 1.0);
    let rgb = Srgb::from_color(Hsv::new_srgb(pct * 120.0, 1.0, 1.0));
    Color::new(rgb.red, rgb.green, rgb.blue, 1.0)
}

/// Clamps `value` into the source interval, then remaps it linearly onto the
/// target interval.
///
/// A degenerate source interval (`src_lo == src_hi`) returns `dst_lo` rather
/// than letting a zero division leak NaN into the color pipeline.
pub fn remap(value: f32, src_lo: f32, src_hi: f32, dst_lo: f32, dst_hi: f32) -> f32 {
    if src_lo == src_hi {
        return dst_lo;
    }
    let (lo, hi) = if src_lo <= src_hi {
        (src_lo, src_hi)
    } else {
        (src_hi, src_lo)
    };
    let value = value.clamp(lo, hi);
    let normalized = (value - src_lo) / (src_hi - src_lo);
    dst_lo + normalized * (dst_hi - dst_lo)
}

/// Composites `foreground` over `background` with straight alpha.
///
/// Edge cases are resolved before the general formula, in this order:
/// an opaque foreground or fully transparent background returns the
/// foreground unchanged; a fully transparent foreground returns the
/// background; a combined alpha at or below 0.01 returns transparent black
/// (dividing by a near-zero alpha would amplify channel error).
pub fn blend(background: Color, foreground: Color) -> Color {
    if foreground.a >= 1.0 || background.a <= 0.0 {
        return foreground;
    }
    if foreground.a <= 0.0 {
        return background;
    }

    let alpha = foreground.a + background.a * (1.0 - foreground.a);
    if alpha <= 0.01 {
        return Color::TRANSPARENT;
    }

    let weight = background.a * (1.0 - foreground.a);
    Color::new(
        (foreground.r * foreground.a + background.r * weight) / alpha,
        (foreground.g * foreground.a + background.g * weight) / alpha,
        (foreground.b * foreground.a + background.b * weight) / alpha,
        alpha,
    )
}

// ============================================================================
// ARC GEOMETRY
// ============================================================================

const FULL_CIRCLE_EPSILON: f32 = 1e-4;

/// Angle of the offset `(dx, dy)` in degrees, in `[0, 360)`.
///
/// `dx`/`dy` are buffer-space offsets from the ring center (y grows
/// downward). 0 degrees points straight up on screen and the angle increases
/// counter-clockwise: up 0, left 90, down 180, right 270.
pub fn angle_of_vector(dx: f32, dy: f32) -> f32 {
    // atan2 of the y-up vector, rotated so the zero sits at 12 o'clock.
    let degrees = (-dy).atan2(dx).to_degrees() - 90.0;
    degrees.rem_euclid(360.0)
}

/// Whether `angle` falls inside the closed arc from `start` to `end`.
///
/// When `start > end` the arc wraps through the 0/360 seam and membership
/// becomes `angle >= start || angle <= end`. Raw bounds outside `[0, 360)`
/// are tolerated as given; callers normalize when they care.
pub fn angle_in_arc(angle: f32, start: f32, end: f32) -> bool {
    if start <= end {
        angle >= start && angle <= end
    } else {
        angle >= start || angle <= end
    }
}

/// Integer pixel rectangle enclosing a ring, clipped to the canvas.
///
/// Padded by two pixels beyond the outer radius. A ring entirely outside the
/// canvas produces an empty range (min above max).
pub fn arc_bounding_box(cx: f32, cy: f32, outer_radius: f32, size: usize) -> (i32, i32, i32, i32) {
    let pad = outer_radius + 2.0;
    let limit = size as i32 - 1;
    let min_x = ((cx - pad).floor() as i32).max(0);
    let max_x = ((cx + pad).ceil() as i32).min(limit);
    let min_y = ((cy - pad).floor() as i32).max(0);
    let max_y = ((cy + pad).ceil() as i32).min(limit);
    (min_x, max_x, min_y, max_y)
}

/// Whether the arc bounds describe a complete circle.
///
/// Near-complete arcs (359 degrees and up) count as full so that float noise
/// at the 0/360 seam never punches a one-pixel notch into a closed ring.
pub fn is_full_circle(start_deg: f32, end_deg: f32) -> bool {
    ((end_deg - start_deg).abs() - 360.0).abs() <= FULL_CIRCLE_EPSILON
        || end_deg - start_deg >= 359.0
}

// ============================================================================
// PIXEL CANVAS
// ============================================================================

/// Fixed-size square RGBA8 buffer, row-major, top-left origin.
pub struct Canvas {
    size: usize,
    data: Vec<u8>,
}

impl Canvas {
    /// Allocates a `size` x `size` canvas of transparent black.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0; size * size * 4],
        }
    }

    /// Side length in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Resets every pixel to transparent black. The only erase mechanism.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Read-only view of the buffer, uploadable as an RGBA texture.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Reads one pixel, or `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let idx = self.index(x, y)?;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Overwrites one pixel. Out-of-range coordinates are a no-op; the
    /// bounding box already guards callers but the canvas does not trust it.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx..idx + 4].copy_from_slice(&color.to_rgba8());
        }
    }

    /// Composites `color` over the existing pixel. Out-of-range is a no-op.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            let existing = Color::from_rgba8([
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
                self.data[idx + 3],
            ]);
            let mixed = blend(existing, color);
            self.data[idx..idx + 4].copy_from_slice(&mixed.to_rgba8());
        }
    }

    fn stamp(&mut self, x: i32, y: i32, color: Color, mode: PaintMode) {
        match mode {
            PaintMode::Overwrite => self.set_pixel(x, y, color),
            PaintMode::Blend => self.blend_pixel(x, y, color),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.size || y >= self.size {
            return None;
        }
        Some((y * self.size + x) * 4)
    }
}

// ============================================================================
// RING RASTERIZER
// ============================================================================

/// How the rasterizer writes into the canvas.
///
/// `Overwrite` is the default: later draws fully occlude earlier ones at
/// shared pixels. `Blend` composites each stamp over the existing contents
/// instead, for overlapping translucent rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintMode {
    #[default]
    Overwrite,
    Blend,
}

/// One ring/arc draw request.
///
/// `center_x`/`center_y` are canvas-relative with the origin at the canvas
/// center, x growing right and y growing down. `radius` is the centerline of
/// the band and `width` its thickness; the inner edge is clamped to a
/// one-pixel minimum so the band never collapses into a degenerate hole.
/// `label` is diagnostic only and never keys behavior.
#[derive(Debug, Clone)]
pub struct RingSpec<'a> {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub width: f32,
    pub start_deg: f32,
    pub end_deg: f32,
    pub color: Color,
    pub label: &'a str,
}

/// Stamps one ring/arc segment onto the canvas.
///
/// Scans only the clipped bounding box of the outer radius, classifying each
/// pixel by squared distance (no per-pixel square root) and, unless the arc
/// is a full circle, by angle. A non-positive `width` yields an empty band
/// and paints nothing.
pub fn draw_ring(canvas: &mut Canvas, ring: &RingSpec<'_>, mode: PaintMode) {
    let half = canvas.size() as f32 / 2.0;
    let cx = half + ring.center_x;
    let cy = half + ring.center_y;

    let outer = ring.radius + ring.width / 2.0;
    let inner = (ring.radius - ring.width / 2.0).max(1.0);
    let outer_sq = outer * outer;
    let inner_sq = inner * inner;

    let (min_x, max_x, min_y, max_y) = arc_bounding_box(cx, cy, outer, canvas.size());
    let full = is_full_circle(ring.start_deg, ring.end_deg);

    trace!(
        "ring '{}': center=({:.1}, {:.1}) band={:.1}..{:.1} arc={:.1}..{:.1}",
        ring.label,
        cx,
        cy,
        inner,
        outer,
        ring.start_deg,
        ring.end_deg
    );

    for y in min_y..=max_y {
        let dy = y as f32 - cy;
        let dy_sq = dy * dy;
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dist_sq = dx * dx + dy_sq;
            if dist_sq < inner_sq || dist_sq > outer_sq {
                continue;
            }
            if full || angle_in_arc(angle_of_vector(dx, dy), ring.start_deg, ring.end_deg) {
                canvas.stamp(x, y, ring.color, mode);
            }
        }
    }
}

// ============================================================================
// FRAME INPUTS
// ============================================================================

/// Per-ability indicator state.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityState {
    /// Remaining cooldown over total cooldown, 0 meaning ready.
    pub cooldown_fraction: f32,
    /// Charges currently held.
    pub stock: u32,
    /// Maximum charges. Zero disables the indicator entirely.
    pub max_stock: u32,
    /// Diagnostic name, shows up in trace logs only.
    pub label: String,
    /// Ring color while a charge is available.
    pub color: Color,
}

/// Numeric snapshot of the tracked vitals for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalsSnapshot {
    pub health_pct: f32,
    pub shield_pct: f32,
    pub barrier_pct: f32,
    pub abilities: Vec<AbilityState>,
}

// ============================================================================
// RING CONFIGURATION
// ============================================================================

/// Geometry and palette parameters for the overlay.
///
/// All distances are in pixels of the canvas. Defaults reproduce a 1152px
/// buffer with the main band at radius 150.
#[derive(Debug, Clone, Builder)]
pub struct RingConfig {
    /// Side length of the square pixel buffer.
    #[builder(default = 1152)]
    pub buffer_size: usize,

    // Main ring geometry
    #[builder(default = 150.0)]
    pub ring_radius: f32,
    #[builder(default = 20.0)]
    pub ring_thickness: f32,
    /// Width of the border strokes hugging the main band.
    #[builder(default = 8.0)]
    pub border_inset: f32,

    // Health ring shading
    #[builder(default = 0.7)]
    pub dim_factor: f32,
    #[builder(default = 0.2)]
    pub background_alpha: f32,
    #[builder(default = 0.8)]
    pub fill_alpha: f32,

    // Shield / barrier arcs
    #[builder(default = 8.0)]
    pub shield_thickness: f32,
    #[builder(default = 6.0)]
    pub barrier_thickness: f32,
    #[builder(default = Color::new(0.2, 0.5, 1.0, 1.0))]
    pub shield_color: Color,
    #[builder(default = Color::new(1.0, 0.7, 0.4, 1.0))]
    pub barrier_color: Color,

    // Ability indicators
    #[builder(default = 30.0)]
    pub ability_radius: f32,
    #[builder(default = 10.0)]
    pub ability_spacing: f32,
    /// Gap between the main ring's outer border and the first indicator.
    #[builder(default = 6.0)]
    pub ability_clearance: f32,
    /// Inset trimmed from both ends of every stock segment.
    #[builder(default = 10.0)]
    pub segment_gap_degrees: f32,
    #[builder(default = 5.0)]
    pub stock_thickness: f32,
    #[builder(default = 3.0)]
    pub recharge_thickness: f32,
    #[builder(default = Color::GRAY)]
    pub recharge_color: Color,

    // Rasterization + display behavior
    #[builder(default = PaintMode::Overwrite)]
    pub paint_mode: PaintMode,
    /// Minimum seconds between frame rebuilds, independent of render rate.
    #[builder(default = 0.1)]
    pub update_interval: f64,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    #[builder(default = "".to_string())]
    pub title: String,
}

// ============================================================================
// FRAME BUILDER
// ============================================================================

/// Clamped copy of the scalar inputs that gate a rebuild.
#[derive(Debug, Clone, PartialEq)]
struct TrackedInputs {
    health: f32,
    shield: f32,
    barrier: f32,
    abilities: Vec<(f32, u32, u32)>,
}

impl TrackedInputs {
    fn capture(vitals: &VitalsSnapshot) -> Self {
        Self {
            health: vitals.health_pct.clamp(0.0, 1.0),
            shield: vitals.shield_pct.clamp(0.0, 1.0),
            barrier: vitals.barrier_pct.clamp(0.0, 1.0),
            abilities: vitals
                .abilities
                .iter()
                .map(|a| (a.cooldown_fraction.clamp(0.0, 1.0), a.stock, a.max_stock))
                .collect(),
        }
    }
}

/// Sequences the per-tick ring draws and skips rasterization entirely while
/// no tracked input has changed since the previous build.
///
/// The builder exclusively owns its canvas; the rasterizer borrows it per
/// call and never retains it.
pub struct FrameBuilder {
    config: RingConfig,
    canvas: Canvas,
    last_inputs: Option<TrackedInputs>,
    rebuilds: u64,
}

impl FrameBuilder {
    pub fn new(config: RingConfig) -> Self {
        let canvas = Canvas::new(config.buffer_size);
        Self {
            config,
            canvas,
            last_inputs: None,
            rebuilds: 0,
        }
    }

    /// Rebuilds the frame if any tracked input changed, then returns the
    /// buffer. An unchanged snapshot reuses the previous contents untouched.
    pub fn build(&mut self, vitals: &VitalsSnapshot) -> &[u8] {
        let inputs = TrackedInputs::capture(vitals);
        if self.last_inputs.as_ref() == Some(&inputs) {
            trace!("inputs unchanged, reusing previous frame");
        } else {
            self.rebuild(vitals);
            self.last_inputs = Some(inputs);
        }
        self.canvas.pixels()
    }

    /// Current buffer without touching the dirty state.
    pub fn frame(&self) -> &[u8] {
        self.canvas.pixels()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Number of rasterization passes performed so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Forgets the recorded inputs so the next `build` repaints even if the
    /// snapshot is unchanged. Used on re-initialization and when visibility
    /// is toggled back on.
    pub fn reset(&mut self) {
        self.last_inputs = None;
    }

    /// Empties the canvas and unsets the recorded inputs.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.last_inputs = None;
    }

    /// Swaps configuration, reallocating the canvas if the buffer size
    /// changed. Always forces the next build to repaint.
    pub fn set_config(&mut self, config: RingConfig) {
        if config.buffer_size != self.config.buffer_size {
            self.canvas = Canvas::new(config.buffer_size);
        }
        self.config = config;
        self.last_inputs = None;
    }

    fn stamp(&mut self, ring: &RingSpec<'_>) {
        draw_ring(&mut self.canvas, ring, self.config.paint_mode);
    }

    fn rebuild(&mut self, vitals: &VitalsSnapshot) {
        let health = vitals.health_pct.clamp(0.0, 1.0);
        let shield = vitals.shield_pct.clamp(0.0, 1.0);
        let barrier = vitals.barrier_pct.clamp(0.0, 1.0);

        debug!(
            "rebuilding frame: health={:.3} shield={:.3} barrier={:.3} abilities={}",
            health,
            shield,
            barrier,
            vitals.abilities.len()
        );

        self.canvas.clear();

        let base = health_color(health);
        let radius = self.config.ring_radius;
        let thickness = self.config.ring_thickness;
        let dim = self.config.dim_factor;

        // Dimmed full-circle backdrop behind the health arc.
        self.stamp(&RingSpec {
            center_x: 0.0,
            center_y: 0.0,
            radius,
            width: thickness,
            start_deg: 0.0,
            end_deg: 360.0,
            color: base.dimmed(dim).with_alpha(self.config.background_alpha),
            label: "health-backdrop",
        });

        self.stamp(&RingSpec {
            center_x: 0.0,
            center_y: 0.0,
            radius,
            width: thickness,
            start_deg: 0.0,
            end_deg: health * 360.0,
            color: base.dimmed(dim).with_alpha(self.config.fill_alpha),
            label: "health",
        });

        // Border strokes just inside and outside the main band, undimmed.
        for (label, border_radius) in [
            ("border-inner", radius - thickness / 2.0),
            ("border-outer", radius + thickness / 2.0),
        ] {
            self.stamp(&RingSpec {
                center_x: 0.0,
                center_y: 0.0,
                radius: border_radius,
                width: self.config.border_inset,
                start_deg: 0.0,
                end_deg: 360.0,
                color: base,
                label,
            });
        }

        if shield > 0.0 {
            self.stamp(&RingSpec {
                center_x: 0.0,
                center_y: 0.0,
                radius,
                width: self.config.shield_thickness,
                start_deg: 0.0,
                end_deg: shield * 360.0,
                color: self.config.shield_color,
                label: "shield",
            });
        }

        if barrier > 0.0 {
            self.stamp(&RingSpec {
                center_x: 0.0,
                center_y: 0.0,
                radius,
                width: self.config.barrier_thickness,
                start_deg: 0.0,
                end_deg: barrier * 360.0,
                color: self.config.barrier_color,
                label: "barrier",
            });
        }

        // Ability row below-right of the main ring.
        let step = self.config.ability_radius * 2.0 + self.config.ability_spacing;
        let mut x =
            radius + thickness / 2.0 + self.config.ability_clearance + self.config.ability_radius;
        let y = x;
        for ability in &vitals.abilities {
            self.draw_ability(x, y, ability);
            x += step;
        }

        self.rebuilds += 1;
    }

    fn draw_ability(&mut self, x: f32, y: f32, ability: &AbilityState) {
        if ability.max_stock == 0 {
            return;
        }
        let fraction = ability.cooldown_fraction.clamp(0.0, 1.0);
        let radius = self.config.ability_radius;
        let gap = self.config.segment_gap_degrees;
        let recharge = self.config.recharge_color;
        let thick = self.config.stock_thickness;
        let thin = self.config.recharge_thickness;

        if ability.max_stock == 1 {
            let color = if fraction > 0.0 { recharge } else { ability.color };
            let width = if ability.stock >= 1 { thick } else { thin };
            self.stamp(&RingSpec {
                center_x: x,
                center_y: y,
                radius,
                width,
                start_deg: 0.0,
                end_deg: (1.0 - fraction) * 360.0,
                color,
                label: &ability.label,
            });
            return;
        }

        // One segment per charge slot: held slots fully colored, the slot
        // currently recharging sweeps toward a full segment as the fraction
        // drops, future slots stay empty.
        let segment = 360.0 / ability.max_stock as f32;
        for slot in 0..ability.max_stock {
            let (start, end, color, width) = if slot == ability.stock {
                let start = segment * slot as f32 + gap;
                let end = remap(
                    fraction,
                    0.0,
                    1.0,
                    segment * (slot + 1) as f32 - gap,
                    segment * slot as f32,
                );
                (start, end, recharge, thin)
            } else if slot > ability.stock {
                continue;
            } else {
                (
                    segment * slot as f32 + gap,
                    segment * (slot + 1) as f32 - gap,
                    ability.color,
                    thick,
                )
            };
            if end <= start {
                continue;
            }
            self.stamp(&RingSpec {
                center_x: x,
                center_y: y,
                radius,
                width,
                start_deg: start,
                end_deg: end,
                color,
                label: &ability.label,
            });
        }
    }
}

// ============================================================================
// PUBLIC API - DISPLAY HARNESS
// ============================================================================

/// Command enum for feeding vitals updates across threads.
#[derive(Debug, Clone)]
pub enum VitalsCommand {
    SetHealth(f32),
    SetShield(f32),
    SetBarrier(f32),
    SetVitals(VitalsSnapshot),
    SetAbility(usize, AbilityState),
    SetAbilities(Vec<AbilityState>),
    /// Forces a full repaint on the next build, as after a visibility toggle.
    Reset,
}

/// Errors surfaced by the window harness. The rasterization core itself
/// never fails; it clamps and clips instead.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixel surface error: {0}")]
    Surface(#[from] pixels::Error),
}

/// Main overlay struct - the primary public interface.
///
/// Owns the configuration and the latest vitals snapshot; `show` (or
/// `show_with_commands`) opens a window sized to the buffer and drives the
/// frame builder at the configured cadence.
#[derive(Debug, Clone)]
pub struct VitalsRing {
    config: RingConfig,
    vitals: VitalsSnapshot,
}

impl VitalsRing {
    pub fn new(config: RingConfig) -> Self {
        Self {
            config,
            vitals: VitalsSnapshot::default(),
        }
    }

    pub fn set_health(&mut self, pct: f32) {
        self.vitals.health_pct = pct.clamp(0.0, 1.0);
    }

    pub fn set_shield(&mut self, pct: f32) {
        self.vitals.shield_pct = pct.clamp(0.0, 1.0);
    }

    pub fn set_barrier(&mut self, pct: f32) {
        self.vitals.barrier_pct = pct.clamp(0.0, 1.0);
    }

    pub fn set_abilities(&mut self, abilities: Vec<AbilityState>) {
        self.vitals.abilities = abilities;
    }

    pub fn show(&mut self) -> Result<(), DisplayError> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<VitalsCommand>,
    ) -> Result<(), DisplayError> {
        self.run_window(Some(receiver))
    }

    fn run_window(&self, receiver: Option<Receiver<VitalsCommand>>) -> Result<(), DisplayError> {
        let size = self.config.buffer_size as u32;
        let title = if self.config.title.is_empty() {
            "vitals-ring".to_string()
        } else {
            self.config.title.clone()
        };

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&title)
            .with_inner_size(LogicalSize::new(size as f64, size as f64))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let inner = window.inner_size();
        let surface_texture = SurfaceTexture::new(inner.width, inner.height, &window);
        let mut pixels = Pixels::new(size, size, surface_texture)?;

        let mut builder = FrameBuilder::new(self.config.clone());
        let mut vitals = self.vitals.clone();

        let frame_duration = Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let build_interval = Duration::from_secs_f64(self.config.update_interval);
        let mut last_frame = Instant::now();
        let mut last_build: Option<Instant> = None;

        info!("opening {}x{} vitals ring window", size, size);

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(receiver) = &receiver {
                            apply_commands(receiver, &mut vitals, &mut builder);
                        }
                        let due = last_build.map_or(true, |t| t.elapsed() >= build_interval);
                        if due {
                            builder.build(&vitals);
                            last_build = Some(Instant::now());
                        }
                        pixels.frame_mut().copy_from_slice(builder.frame());
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

fn apply_commands(
    receiver: &Receiver<VitalsCommand>,
    vitals: &mut VitalsSnapshot,
    builder: &mut FrameBuilder,
) {
    while let Ok(command) = receiver.try_recv() {
        match command {
            VitalsCommand::SetHealth(pct) => vitals.health_pct = pct,
            VitalsCommand::SetShield(pct) => vitals.shield_pct = pct,
            VitalsCommand::SetBarrier(pct) => vitals.barrier_pct = pct,
            VitalsCommand::SetVitals(snapshot) => *vitals = snapshot,
            VitalsCommand::SetAbility(index, ability) => {
                if let Some(slot) = vitals.abilities.get_mut(index) {
                    *slot = ability;
                } else {
                    debug!("ignoring ability update for unknown slot {index}");
                }
            }
            VitalsCommand::SetAbilities(abilities) => vitals.abilities = abilities,
            VitalsCommand::Reset => builder.reset(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
