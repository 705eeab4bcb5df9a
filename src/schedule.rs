use crate::{
    core::{Color, Vec2},
    ease::Ease,
    error::{FirstlightError, FirstlightResult},
};

/// Linear interpolation between two values of a schedule's value type.
pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (f64::from(*a) + (f64::from(*b) - f64::from(*a)) * t) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

/// One keyframe: a progress position in [0,1] and the value there.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Stop<T> {
    pub at: f64,
    pub value: T,
    /// Ease applied toward the next stop.
    #[serde(default)]
    pub ease: Ease,
}

impl<T> Stop<T> {
    pub fn new(at: f64, value: T) -> Self {
        Self {
            at,
            value,
            ease: Ease::Linear,
        }
    }
}

/// One animated property: ordered stops over the progress axis.
///
/// Sampling never extrapolates: below the first stop the first value is
/// returned unchanged, above the last stop the last value.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Schedule<T> {
    pub stops: Vec<Stop<T>>, // sorted by `at`
}

impl<T> Schedule<T>
where
    T: Lerp + Clone,
{
    pub fn new(stops: Vec<Stop<T>>) -> FirstlightResult<Self> {
        let schedule = Self { stops };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn constant(value: T) -> Self {
        Self {
            stops: vec![Stop::new(0.0, value)],
        }
    }

    /// Convenience for plain linear schedules authored as (position, value).
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, T)>) -> FirstlightResult<Self> {
        Self::new(pairs.into_iter().map(|(at, v)| Stop::new(at, v)).collect())
    }

    pub fn validate(&self) -> FirstlightResult<()> {
        if self.stops.is_empty() {
            return Err(FirstlightError::schedule(
                "schedule must have at least one stop",
            ));
        }
        if self.stops.iter().any(|s| !s.at.is_finite()) {
            return Err(FirstlightError::schedule(
                "schedule stop positions must be finite",
            ));
        }
        if !self.stops.windows(2).all(|w| w[0].at <= w[1].at) {
            return Err(FirstlightError::schedule(
                "schedule stops must be sorted by position",
            ));
        }
        Ok(())
    }

    /// Interpolated value at `progress`.
    ///
    /// Duplicate stop positions resolve to the earlier stop's value; the
    /// only error is sampling a schedule with no stops at all.
    pub fn sample(&self, progress: f64) -> FirstlightResult<T> {
        if self.stops.is_empty() {
            return Err(FirstlightError::schedule("schedule has no stops"));
        }

        let idx = self.stops.partition_point(|s| s.at < progress);

        if idx == 0 {
            return Ok(self.stops[0].value.clone());
        }
        if idx >= self.stops.len() {
            return Ok(self.stops[self.stops.len() - 1].value.clone());
        }

        let a = &self.stops[idx - 1];
        let b = &self.stops[idx];
        let denom = b.at - a.at;
        if !(denom > 0.0) {
            return Ok(a.value.clone());
        }

        let t = (progress - a.at) / denom;
        let te = a.ease.apply(t);
        Ok(T::lerp(&a.value, &b.value, te))
    }

    /// Domain covered by the stops, `(first, last)`.
    pub fn domain(&self) -> Option<(f64, f64)> {
        let first = self.stops.first()?;
        let last = self.stops.last()?;
        Some((first.at, last.at))
    }
}
