//! Firstlight is a scroll-driven visual narrative engine.
//!
//! It turns a raw scroll offset into the visual parameters of a one-page
//! story: a background color, overlay opacities, parallax offsets, one-shot
//! triggers, and two particle fields (pulsing stars, drifting sparks)
//! rendered onto CPU pixmaps.
//!
//! # Pipeline overview
//!
//! 1. **Track**: [`ScrollTracker`] normalizes the scroll offset within a
//!    tracked region to a progress scalar in `[0, 1]`.
//! 2. **Evaluate**: [`Director`] samples every [`Schedule`] of a
//!    [`Narrative`] at that progress and feeds the one-way trigger
//!    latches, producing a [`SceneFrame`] for the view layer.
//! 3. **Simulate/Render**: [`StarRenderer`] / [`SparkRenderer`] step their
//!    body arenas once per display frame and redraw the [`Surface`] each
//!    exclusively owns.
//! 4. **Composite**: premultiplied source-over combines renderer surfaces
//!    over the background (used by the `firstlight` CLI to export PNGs).
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: all randomness flows from explicit
//!   seeds; the same seed and step sequence produce identical frames.
//! - **No IO in the engine**: files and PNG output live in the CLI.
//! - **Explicit teardown**: frame loops stop only through their
//!   cancellation handles; a cancelled loop never touches a surface again.
#![forbid(unsafe_code)]

pub mod composite;
pub mod core;
pub mod ease;
pub mod error;
pub mod frame_loop;
pub mod schedule;
pub mod scroll;
pub mod sparks;
pub mod starfield;
pub mod surface;
pub mod timeline;

pub use self::core::{Color, Point, Vec2, Viewport};
pub use ease::Ease;
pub use error::{FirstlightError, FirstlightResult};
pub use frame_loop::{FrameLoop, LoopHandle};
pub use schedule::{Lerp, Schedule, Stop};
pub use scroll::{Edge, OffsetSpec, RegionGeometry, ScrollTracker};
pub use sparks::{SparkField, SparkRenderer};
pub use starfield::{MountedStars, StarField, StarRenderer};
pub use surface::{Disc, FrameRgba, Surface};
pub use timeline::{Director, Narrative, SceneFrame, ThresholdTrigger};
