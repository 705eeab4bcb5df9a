//! Star mode: a persistent field of pulsing points.
//!
//! Bodies are scattered once at mount and live for the renderer's whole
//! lifetime; each frame advances every body's intensity and redraws the
//! surface from scratch. The body arena is allocated once, the per-frame
//! step allocates nothing.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    core::{Color, Viewport},
    error::FirstlightResult,
    frame_loop::{self, FrameLoop, LoopHandle},
    surface::{Disc, Surface},
};

pub const DEFAULT_STAR_COUNT: usize = 150;

/// Pulse bounds. Intensity bounces off both ends, it never parks there.
const INTENSITY_FLOOR: f64 = 0.2;
const INTENSITY_CEIL: f64 = 1.0;
const MAX_RADIUS: f64 = 1.5;
const RATE_MIN: f64 = 0.005;
const RATE_SPAN: f64 = 0.01;

#[derive(Clone, Copy, Debug)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub intensity: f64,
    /// Per-step intensity delta; sign flips at the pulse bounds.
    pub rate: f64,
}

/// The simulation alone: positions and pulse phases, no pixels.
pub struct StarField {
    stars: Vec<Star>,
    width: f64,
    height: f64,
}

impl StarField {
    /// Scatters `count` bodies uniformly over the viewport. The same seed
    /// always produces the same field.
    pub fn new(count: usize, viewport: Viewport, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let width = viewport.width_f();
        let height = viewport.height_f();

        let stars = (0..count)
            .map(|_| Star {
                x: rng.gen_range(0.0..1.0) * width,
                y: rng.gen_range(0.0..1.0) * height,
                radius: rng.gen_range(0.0..1.0) * MAX_RADIUS,
                intensity: rng.gen_range(INTENSITY_FLOOR..INTENSITY_CEIL),
                rate: RATE_MIN + rng.gen_range(0.0..1.0) * RATE_SPAN,
            })
            .collect();

        Self {
            stars,
            width,
            height,
        }
    }

    /// Advances every body's pulse by one frame.
    pub fn step(&mut self) {
        for star in &mut self.stars {
            star.intensity += star.rate;
            if star.intensity > INTENSITY_CEIL {
                star.intensity = INTENSITY_CEIL - (star.intensity - INTENSITY_CEIL);
                star.rate = -star.rate;
            } else if star.intensity < INTENSITY_FLOOR {
                star.intensity = INTENSITY_FLOOR + (INTENSITY_FLOOR - star.intensity);
                star.rate = -star.rate;
            }
        }
    }

    /// Adopts new viewport dimensions. Bodies keep their original logical
    /// coordinates; the field is NOT re-scattered (observed behavior of
    /// the production page, preserved for compatibility).
    pub fn resize(&mut self, viewport: Viewport) {
        self.width = viewport.width_f();
        self.height = viewport.height_f();
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Star simulation plus the surface it exclusively owns.
pub struct StarRenderer {
    field: StarField,
    surface: Surface,
}

impl StarRenderer {
    pub fn new(count: usize, viewport: Viewport, seed: u64) -> FirstlightResult<Self> {
        Ok(Self {
            field: StarField::new(count, viewport, seed),
            surface: Surface::new(viewport)?,
        })
    }

    /// Steps the simulation and redraws the surface: full clear, then one
    /// disc per body with alpha = intensity x `master_opacity`.
    pub fn render_frame(&mut self, master_opacity: f64) -> FirstlightResult<()> {
        let master_opacity = master_opacity.clamp(0.0, 1.0);
        self.field.step();
        self.surface.clear_transparent();
        let discs = self.field.stars.iter().map(|star| Disc {
            x: star.x,
            y: star.y,
            radius: star.radius,
            color: Color::WHITE.with_alpha(star.intensity * master_opacity),
        });
        self.surface.draw_discs(discs);
        Ok(())
    }

    /// Resizes the surface to the new viewport. The field keeps its
    /// coordinates (see [`StarField::resize`]).
    pub fn resize(&mut self, viewport: Viewport) -> FirstlightResult<()> {
        self.surface.resize(viewport)?;
        self.field.resize(viewport);
        Ok(())
    }

    pub fn field(&self) -> &StarField {
        &self.field
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

/// A star renderer wired into a frame loop: the mounted form.
///
/// The embedding pumps [`MountedStars::pump`] once per display refresh and
/// forwards resize events; [`MountedStars::unmount`] cancels the loop.
/// After unmount every pump and resize is a no-op, even for callbacks the
/// host had already scheduled.
pub struct MountedStars {
    renderer: Rc<RefCell<StarRenderer>>,
    frame_loop: FrameLoop,
    handle: LoopHandle,
    opacity: Rc<Cell<f64>>,
}

impl MountedStars {
    pub fn mount(renderer: StarRenderer, master_opacity: f64) -> Self {
        let renderer = Rc::new(RefCell::new(renderer));
        let opacity = Rc::new(Cell::new(master_opacity));

        let tick_renderer = renderer.clone();
        let tick_opacity = opacity.clone();
        let (frame_loop, handle) = frame_loop::start(move |_dt| {
            if let Err(e) = tick_renderer.borrow_mut().render_frame(tick_opacity.get()) {
                tracing::warn!("star frame failed: {e}");
            }
        });

        Self {
            renderer,
            frame_loop,
            handle,
            opacity,
        }
    }

    /// Caller-supplied global dimmer, e.g. the skyline-reveal crossfade.
    /// Does not touch any body's own oscillation state.
    pub fn set_opacity(&self, master_opacity: f64) {
        self.opacity.set(master_opacity);
    }

    pub fn pump(&self, dt_secs: f64) -> bool {
        self.frame_loop.pump(dt_secs)
    }

    /// Resize events are ignored once the mount is torn down.
    pub fn resize(&self, viewport: Viewport) -> FirstlightResult<()> {
        if self.handle.is_cancelled() {
            return Ok(());
        }
        self.renderer.borrow_mut().resize(viewport)
    }

    pub fn renderer(&self) -> Rc<RefCell<StarRenderer>> {
        self.renderer.clone()
    }

    pub fn is_mounted(&self) -> bool {
        !self.handle.is_cancelled()
    }

    /// Cancels the frame loop. Idempotent.
    pub fn unmount(&self) {
        self.handle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_scatters_identically() {
        let a = StarField::new(50, Viewport::new(800, 600), 7);
        let b = StarField::new(50, Viewport::new(800, 600), 7);
        for (sa, sb) in a.stars().iter().zip(b.stars()) {
            assert_eq!((sa.x, sa.y, sa.radius), (sb.x, sb.y, sb.radius));
        }
    }

    #[test]
    fn scatter_covers_the_viewport() {
        let field = StarField::new(DEFAULT_STAR_COUNT, Viewport::new(800, 600), 1);
        assert_eq!(field.len(), DEFAULT_STAR_COUNT);
        for star in field.stars() {
            assert!((0.0..800.0).contains(&star.x));
            assert!((0.0..600.0).contains(&star.y));
            assert!((0.0..MAX_RADIUS).contains(&star.radius));
            assert!((INTENSITY_FLOOR..INTENSITY_CEIL).contains(&star.intensity));
        }
    }

    #[test]
    fn intensity_bounces_within_bounds() {
        for seed in 0..8 {
            let mut field = StarField::new(40, Viewport::new(640, 480), seed);
            for _ in 0..5_000 {
                field.step();
                for star in field.stars() {
                    assert!(
                        (INTENSITY_FLOOR..=INTENSITY_CEIL).contains(&star.intensity),
                        "intensity {} escaped bounds (seed {seed})",
                        star.intensity
                    );
                }
            }
        }
    }

    #[test]
    fn rate_sign_flips_at_the_ceiling() {
        let mut field = StarField::new(1, Viewport::new(10, 10), 3);
        let start_rate = field.stars()[0].rate;
        assert!(start_rate > 0.0);

        // Worst case to the ceiling is (1.0 - 0.2) / RATE_MIN = 160 steps.
        let mut flipped = false;
        for _ in 0..200 {
            field.step();
            if field.stars()[0].rate < 0.0 {
                flipped = true;
                break;
            }
        }
        assert!(flipped);
        assert_eq!(field.stars()[0].rate.abs(), start_rate.abs());
    }

    #[test]
    fn resize_keeps_body_coordinates() {
        let mut field = StarField::new(20, Viewport::new(800, 600), 9);
        let before: Vec<(f64, f64)> = field.stars().iter().map(|s| (s.x, s.y)).collect();
        field.resize(Viewport::new(1200, 900));
        let after: Vec<(f64, f64)> = field.stars().iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn master_opacity_zero_renders_nothing() {
        let mut renderer = StarRenderer::new(30, Viewport::new(64, 64), 2).unwrap();
        renderer.render_frame(0.0).unwrap();
        assert!(renderer.surface().data().iter().all(|&b| b == 0));

        renderer.render_frame(1.0).unwrap();
        assert!(renderer.surface().data().iter().any(|&b| b != 0));
    }

    #[test]
    fn unmounted_stars_ignore_resize() {
        let renderer = StarRenderer::new(10, Viewport::new(64, 64), 2).unwrap();
        let mounted = MountedStars::mount(renderer, 1.0);
        mounted.unmount();
        mounted.resize(Viewport::new(128, 128)).unwrap();
        assert_eq!(mounted.renderer().borrow().surface().width(), 64);
    }
}
