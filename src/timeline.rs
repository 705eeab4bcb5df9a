use std::collections::BTreeMap;

use crate::{
    core::Color,
    error::{FirstlightError, FirstlightResult},
    schedule::{Schedule, Stop},
};

/// One-way latch: fires the first time progress exceeds its position and
/// never resets, no matter how far back the user scrolls.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct ThresholdTrigger {
    at: f64,
    fired: bool,
}

impl ThresholdTrigger {
    pub fn new(at: f64) -> Self {
        Self { at, fired: false }
    }

    /// Feeds one progress update; returns the latched state.
    pub fn observe(&mut self, progress: f64) -> bool {
        if !self.fired && progress > self.at {
            self.fired = true;
        }
        self.fired
    }

    pub fn fired(&self) -> bool {
        self.fired
    }

    pub fn position(&self) -> f64 {
        self.at
    }
}

/// Immutable configuration of a scroll narrative: what animates, and where
/// on the progress axis. Deserializable from JSON; `validate` before use.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Narrative {
    /// Page background color over progress.
    pub background: Schedule<Color>,
    /// Named overlay opacity schedules (clamped to 0..=1 at evaluation).
    #[serde(default)]
    pub opacities: BTreeMap<String, Schedule<f64>>,
    /// Named parallax pixel-offset schedules.
    #[serde(default)]
    pub offsets: BTreeMap<String, Schedule<f64>>,
    /// Named one-shot trigger positions on the progress axis.
    #[serde(default)]
    pub triggers: BTreeMap<String, f64>,
}

impl Narrative {
    pub fn validate(&self) -> FirstlightResult<()> {
        self.background.validate()?;
        for (name, schedule) in &self.opacities {
            schedule
                .validate()
                .map_err(|e| FirstlightError::validation(format!("opacity '{name}': {e}")))?;
        }
        for (name, schedule) in &self.offsets {
            schedule
                .validate()
                .map_err(|e| FirstlightError::validation(format!("offset '{name}': {e}")))?;
        }
        for (name, at) in &self.triggers {
            if !(0.0..=1.0).contains(at) {
                return Err(FirstlightError::validation(format!(
                    "trigger '{name}' position must be within 0..=1"
                )));
            }
        }
        Ok(())
    }

    /// The production night-to-dawn narrative: a sleeping city darkens
    /// through indigo and breaks into warm daylight, the skyline fades for
    /// the finale, a dawn glow builds, and the city lights come on once a
    /// sixth or so of the story has scrolled by.
    pub fn night_to_dawn() -> Self {
        fn rgb8(r: u8, g: u8, b: u8) -> Color {
            Color::rgb(
                f64::from(r) / 255.0,
                f64::from(g) / 255.0,
                f64::from(b) / 255.0,
            )
        }

        fn stops<T>(pairs: impl IntoIterator<Item = (f64, T)>) -> Schedule<T> {
            Schedule {
                stops: pairs
                    .into_iter()
                    .map(|(at, value)| Stop::new(at, value))
                    .collect(),
            }
        }

        let background = stops([
            (0.0, rgb8(0x02, 0x06, 0x17)),
            (0.2, rgb8(0x0f, 0x17, 0x2a)),
            (0.5, rgb8(0x1e, 0x1b, 0x4b)),
            (0.8, rgb8(0x31, 0x2e, 0x81)),
            (1.0, rgb8(0xff, 0xf8, 0xe1)),
        ]);

        let mut opacities = BTreeMap::new();
        opacities.insert("skyline".to_owned(), stops([(0.8, 1.0), (1.0, 0.2)]));
        opacities.insert("dawn-glow".to_owned(), stops([(0.1, 0.0), (0.8, 0.8)]));
        opacities.insert("stars".to_owned(), Schedule::constant(0.8));

        let mut offsets = BTreeMap::new();
        offsets.insert("skyline-back".to_owned(), stops([(0.0, 0.0), (1.0, 100.0)]));
        offsets.insert(
            "skyline-front".to_owned(),
            stops([(0.0, 0.0), (1.0, -50.0)]),
        );

        let mut triggers = BTreeMap::new();
        triggers.insert("first-light".to_owned(), 0.15);

        Self {
            background,
            opacities,
            offsets,
            triggers,
        }
    }
}

/// Everything the view layer needs for one progress update.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SceneFrame {
    pub progress: f64,
    pub background: Color,
    pub opacities: BTreeMap<String, f64>,
    pub offsets: BTreeMap<String, f64>,
    pub triggers: BTreeMap<String, bool>,
}

/// Evaluates a [`Narrative`] per progress update and owns the trigger
/// latches for the session.
#[derive(Clone, Debug)]
pub struct Director {
    narrative: Narrative,
    latches: BTreeMap<String, ThresholdTrigger>,
}

impl Director {
    pub fn new(narrative: Narrative) -> FirstlightResult<Self> {
        narrative.validate()?;
        let latches = narrative
            .triggers
            .iter()
            .map(|(name, &at)| (name.clone(), ThresholdTrigger::new(at)))
            .collect();
        Ok(Self { narrative, latches })
    }

    pub fn narrative(&self) -> &Narrative {
        &self.narrative
    }

    /// Latched state of a named trigger; false for unknown names.
    pub fn trigger_fired(&self, name: &str) -> bool {
        self.latches.get(name).is_some_and(ThresholdTrigger::fired)
    }

    /// Samples every schedule and feeds every latch.
    ///
    /// Schedules are independent of each other; intermediate progress
    /// values may be coalesced away by the caller, the latches only depend
    /// on whether any observed update exceeded their position.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn evaluate(&mut self, progress: f64) -> FirstlightResult<SceneFrame> {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let background = self.narrative.background.sample(progress)?;

        let mut opacities = BTreeMap::new();
        for (name, schedule) in &self.narrative.opacities {
            opacities.insert(name.clone(), schedule.sample(progress)?.clamp(0.0, 1.0));
        }

        let mut offsets = BTreeMap::new();
        for (name, schedule) in &self.narrative.offsets {
            offsets.insert(name.clone(), schedule.sample(progress)?);
        }

        let mut triggers = BTreeMap::new();
        for (name, latch) in &mut self.latches {
            triggers.insert(name.clone(), latch.observe(progress));
        }

        Ok(SceneFrame {
            progress,
            background,
            opacities,
            offsets,
            triggers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_latch_is_sticky() {
        let mut latch = ThresholdTrigger::new(0.15);
        let observed: Vec<bool> = [0.0, 0.1, 0.16, 0.05, 0.3]
            .iter()
            .map(|&p| latch.observe(p))
            .collect();
        assert_eq!(observed, [false, false, true, true, true]);
    }

    #[test]
    fn trigger_requires_strict_crossing() {
        let mut latch = ThresholdTrigger::new(0.15);
        assert!(!latch.observe(0.15));
        assert!(latch.observe(0.150001));
    }

    #[test]
    fn night_to_dawn_validates_and_evaluates() {
        let mut director = Director::new(Narrative::night_to_dawn()).unwrap();

        let frame = director.evaluate(0.0).unwrap();
        assert_eq!(frame.background.to_hex(), "#020617");
        assert_eq!(frame.opacities["skyline"], 1.0);
        assert_eq!(frame.opacities["stars"], 0.8);
        assert!(!frame.triggers["first-light"]);

        let frame = director.evaluate(1.0).unwrap();
        assert_eq!(frame.background.to_hex(), "#fff8e1");
        assert!((frame.opacities["skyline"] - 0.2).abs() < 1e-12);
        assert_eq!(frame.offsets["skyline-back"], 100.0);
        assert_eq!(frame.offsets["skyline-front"], -50.0);
        assert!(frame.triggers["first-light"]);

        // Scrolling back up: values follow, the latch does not.
        let frame = director.evaluate(0.05).unwrap();
        assert!(frame.triggers["first-light"]);
        assert!(director.trigger_fired("first-light"));
    }

    #[test]
    fn evaluate_clamps_raw_progress() {
        let mut director = Director::new(Narrative::night_to_dawn()).unwrap();
        let frame = director.evaluate(7.5).unwrap();
        assert_eq!(frame.progress, 1.0);
        let frame = director.evaluate(f64::NAN).unwrap();
        assert_eq!(frame.progress, 0.0);
    }

    #[test]
    fn validate_rejects_out_of_range_trigger() {
        let mut narrative = Narrative::night_to_dawn();
        narrative.triggers.insert("bad".to_owned(), 1.5);
        assert!(Director::new(narrative).is_err());
    }

    #[test]
    fn opacity_is_clamped_at_evaluation() {
        let mut narrative = Narrative::night_to_dawn();
        narrative
            .opacities
            .insert("hot".to_owned(), Schedule::constant(2.0));
        let mut director = Director::new(narrative).unwrap();
        assert_eq!(director.evaluate(0.5).unwrap().opacities["hot"], 1.0);
    }
}
