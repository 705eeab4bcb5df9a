//! Spark mode: a staggered upward drift of ember points, mounted once the
//! first-light trigger has fired.
//!
//! Each body runs its own repeating traversal from below the bottom edge
//! to above the top edge, with an independently randomized duration, a
//! one-time start delay, and a horizontal drift toward a fresh random
//! target. A body that completes a traversal is reborn in place with new
//! parameters; the pool size never changes.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    core::{Color, Viewport},
    error::FirstlightResult,
    surface::{Disc, Surface},
};

pub const DEFAULT_SPARK_COUNT: usize = 40;

/// How far beyond the vertical edges a traversal starts and ends.
const EDGE_MARGIN: f64 = 100.0;
const PEAK_OPACITY: f64 = 0.8;
const DURATION_MIN_SECS: f64 = 5.0;
const DURATION_SPAN_SECS: f64 = 10.0;
const DELAY_MAX_SECS: f64 = 10.0;
/// Horizontal jitter added to the drift target, +-25 px.
const TARGET_JITTER: f64 = 50.0;
const SPARK_RADIUS: f64 = 2.0;
const SPARK_COLOR: Color = Color {
    r: 0xfe as f64 / 255.0,
    g: 0xf0 as f64 / 255.0,
    b: 0x8a as f64 / 255.0,
    a: 1.0,
};

#[derive(Clone, Copy, Debug)]
pub struct Spark {
    pub start_x: f64,
    pub target_x: f64,
    pub duration: f64,
    /// Seconds before the first traversal begins; zero after rebirth.
    pub delay: f64,
    pub elapsed: f64,
}

/// Position and opacity of a spark mid-traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparkSample {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

pub struct SparkField {
    sparks: Vec<Spark>,
    width: f64,
    height: f64,
    rng: StdRng,
}

impl SparkField {
    pub fn new(count: usize, viewport: Viewport, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let width = viewport.width_f();

        let sparks = (0..count)
            .map(|_| {
                let mut spark = spawn(&mut rng, width);
                spark.delay = rng.gen_range(0.0..1.0) * DELAY_MAX_SECS;
                spark
            })
            .collect();

        Self {
            sparks,
            width,
            height: viewport.height_f(),
            rng,
        }
    }

    /// Advances every body by `dt_secs`; completed traversals are reborn
    /// in place with fresh randomized parameters and no delay.
    pub fn step(&mut self, dt_secs: f64) {
        let dt = dt_secs.max(0.0);
        for spark in &mut self.sparks {
            spark.elapsed += dt;
            if spark.elapsed >= spark.delay + spark.duration {
                *spark = spawn(&mut self.rng, self.width);
            }
        }
    }

    /// New viewport dimensions; in-flight traversals finish against the
    /// new geometry, reborn bodies pick start positions within it.
    pub fn resize(&mut self, viewport: Viewport) {
        self.width = viewport.width_f();
        self.height = viewport.height_f();
    }

    pub fn len(&self) -> usize {
        self.sparks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparks.is_empty()
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    /// Samples the bodies currently mid-traversal (delays not yet elapsed
    /// are skipped).
    pub fn samples(&self) -> impl Iterator<Item = SparkSample> + '_ {
        self.sparks.iter().filter_map(|spark| {
            let t = traversal_phase(spark)?;
            Some(SparkSample {
                x: spark.start_x + (spark.target_x - spark.start_x) * t,
                y: (self.height + EDGE_MARGIN) - t * (self.height + 2.0 * EDGE_MARGIN),
                // Triangular envelope: up to the peak at mid-traversal,
                // back down to zero at the top edge.
                opacity: PEAK_OPACITY * (1.0 - (2.0 * t - 1.0).abs()),
            })
        })
    }
}

fn spawn(rng: &mut StdRng, width: f64) -> Spark {
    Spark {
        start_x: rng.gen_range(0.0..1.0) * width,
        target_x: rng.gen_range(0.0..1.0) * width + (rng.gen_range(0.0..1.0) - 0.5) * TARGET_JITTER,
        duration: DURATION_MIN_SECS + rng.gen_range(0.0..1.0) * DURATION_SPAN_SECS,
        delay: 0.0,
        elapsed: 0.0,
    }
}

fn traversal_phase(spark: &Spark) -> Option<f64> {
    if spark.elapsed < spark.delay {
        return None;
    }
    Some(((spark.elapsed - spark.delay) / spark.duration).clamp(0.0, 1.0))
}

/// Spark simulation plus the surface it exclusively owns. Teardown is
/// dropping the renderer; there is no loop of its own to cancel.
pub struct SparkRenderer {
    field: SparkField,
    surface: Surface,
}

impl SparkRenderer {
    pub fn new(count: usize, viewport: Viewport, seed: u64) -> FirstlightResult<Self> {
        Ok(Self {
            field: SparkField::new(count, viewport, seed),
            surface: Surface::new(viewport)?,
        })
    }

    pub fn tick(&mut self, dt_secs: f64) -> FirstlightResult<()> {
        self.field.step(dt_secs);
        self.surface.clear_transparent();
        let discs = self.field.samples().map(|sample| Disc {
            x: sample.x,
            y: sample.y,
            radius: SPARK_RADIUS,
            color: SPARK_COLOR.with_alpha(sample.opacity),
        });
        self.surface.draw_discs(discs);
        Ok(())
    }

    pub fn resize(&mut self, viewport: Viewport) -> FirstlightResult<()> {
        self.surface.resize(viewport)?;
        self.field.resize(viewport);
        Ok(())
    }

    pub fn field(&self) -> &SparkField {
        &self.field
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}
