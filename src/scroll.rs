//! Scroll-to-progress tracking.
//!
//! A tracked region plus two boundary markers define a scroll-offset span;
//! the current raw offset normalized within that span is the progress
//! scalar every schedule is sampled with. The model is stateless and
//! positional: scrolling back up lowers progress again.

/// Which edge of the region / viewport a boundary marker refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Edge {
    Start,
    End,
}

/// A boundary marker: the scroll offset at which `region` edge lines up
/// with `viewport` edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OffsetSpec {
    pub region: Edge,
    pub viewport: Edge,
}

impl OffsetSpec {
    pub const fn new(region: Edge, viewport: Edge) -> Self {
        Self { region, viewport }
    }
}

/// Measured geometry of the tracked region, in document pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionGeometry {
    /// Document-space y of the region's top edge.
    pub top: f64,
    pub height: f64,
    pub viewport_height: f64,
}

impl RegionGeometry {
    pub fn new(top: f64, height: f64, viewport_height: f64) -> Self {
        Self {
            top,
            height,
            viewport_height,
        }
    }

    fn boundary_offset(&self, spec: OffsetSpec) -> f64 {
        let region_point = match spec.region {
            Edge::Start => self.top,
            Edge::End => self.top + self.height,
        };
        let viewport_point = match spec.viewport {
            Edge::Start => 0.0,
            Edge::End => self.viewport_height,
        };
        region_point - viewport_point
    }
}

/// Continuously-updating progress scalar bound to a scroll region.
///
/// Progress is 0 until the region has been measured. Geometry updates
/// (layout changes, viewport rotation) re-derive the boundaries; whatever
/// jump the new geometry implies is the jump progress takes.
#[derive(Clone, Debug)]
pub struct ScrollTracker {
    start: OffsetSpec,
    end: OffsetSpec,
    geometry: Option<RegionGeometry>,
    offset: f64,
}

impl ScrollTracker {
    pub fn new(start: OffsetSpec, end: OffsetSpec) -> Self {
        Self {
            start,
            end,
            geometry: None,
            offset: 0.0,
        }
    }

    /// Track a region across its full scrollable travel: region start
    /// meeting viewport start through region end meeting viewport end.
    pub fn full_range() -> Self {
        Self::new(
            OffsetSpec::new(Edge::Start, Edge::Start),
            OffsetSpec::new(Edge::End, Edge::End),
        )
    }

    /// Called on mount and on every layout/resize tick.
    pub fn set_geometry(&mut self, geometry: RegionGeometry) {
        self.geometry = Some(geometry);
    }

    /// Region unmounted / no longer measurable; progress reverts to 0.
    pub fn clear_geometry(&mut self) {
        self.geometry = None;
    }

    /// Called on every scroll tick. Returns the progress at this offset.
    pub fn set_offset(&mut self, offset: f64) -> f64 {
        self.offset = offset;
        self.progress()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn progress(&self) -> f64 {
        let Some(g) = self.geometry else {
            return 0.0;
        };

        let start = g.boundary_offset(self.start);
        let end = g.boundary_offset(self.end);
        let span = end - start;
        if span <= f64::EPSILON {
            // Degenerate region (no travel between the boundaries).
            return if self.offset >= start { 1.0 } else { 0.0 };
        }

        ((self.offset - start) / span).clamp(0.0, 1.0)
    }
}
