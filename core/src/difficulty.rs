//! Tunable difficulty knobs read by the allocator, the spawner and the world.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_SPEED_SCALING: f32 = 0.1;
const MAX_LOOKAHEAD_QUEUE_SIZE: usize = 64;
const MAX_DROP_PERIOD: f32 = 3_600.0;

/// Difficulty parameters for a session.
///
/// Values loaded from configuration must pass [`Difficulty::validate`]. Runtime
/// edits go through [`Difficulty::apply_edit`], which keeps the last valid value
/// of every field it rejects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Difficulty {
    screen_probability: f32,
    trash_probability: f32,
    unique_items: bool,
    unique_searched_items: bool,
    lookahead_queue_size: usize,
    min_drop_period: f32,
    max_drop_period: f32,
    speed_scaling: f32,
    player_speed_scaling: f32,
    belt_speed: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            screen_probability: 0.5,
            trash_probability: 0.3,
            unique_items: true,
            unique_searched_items: true,
            lookahead_queue_size: 4,
            min_drop_period: 3.0,
            max_drop_period: 5.0,
            speed_scaling: 1.0,
            player_speed_scaling: 1.0,
            belt_speed: 1.0,
        }
    }
}

impl Difficulty {
    /// Probability that a new want is picked from items already on screen.
    #[must_use]
    pub const fn screen_probability(&self) -> f32 {
        self.screen_probability
    }

    /// Probability that a queued item is trash.
    #[must_use]
    pub const fn trash_probability(&self) -> f32 {
        self.trash_probability
    }

    /// Avoids queuing kinds already on screen or queued, and avoids wanting a
    /// kind twice.
    #[must_use]
    pub const fn unique_items(&self) -> bool {
        self.unique_items
    }

    /// Avoids offering a queued kind that another destination already wants.
    #[must_use]
    pub const fn unique_searched_items(&self) -> bool {
        self.unique_searched_items
    }

    /// Target length of the lookahead queue.
    #[must_use]
    pub const fn lookahead_queue_size(&self) -> usize {
        self.lookahead_queue_size
    }

    /// Shortest delay between two drops, in seconds, after speed scaling.
    #[must_use]
    pub fn scaled_min_drop_period(&self) -> f32 {
        self.min_drop_period / self.speed_scaling
    }

    /// Longest delay between two drops, in seconds, after speed scaling.
    #[must_use]
    pub fn scaled_max_drop_period(&self) -> f32 {
        self.max_drop_period / self.speed_scaling
    }

    /// Conveyor speed after speed scaling.
    #[must_use]
    pub fn scaled_belt_speed(&self) -> f32 {
        self.speed_scaling * self.belt_speed
    }

    /// Global speed multiplier.
    #[must_use]
    pub const fn speed_scaling(&self) -> f32 {
        self.speed_scaling
    }

    /// Multiplier applied to the player's movement speed.
    #[must_use]
    pub const fn player_speed_scaling(&self) -> f32 {
        self.player_speed_scaling
    }

    /// Overrides the screen pick probability.
    #[must_use]
    pub fn with_screen_probability(mut self, value: f32) -> Self {
        self.screen_probability = value;
        self
    }

    /// Overrides the trash probability.
    #[must_use]
    pub fn with_trash_probability(mut self, value: f32) -> Self {
        self.trash_probability = value;
        self
    }

    /// Overrides the item uniqueness toggle.
    #[must_use]
    pub fn with_unique_items(mut self, value: bool) -> Self {
        self.unique_items = value;
        self
    }

    /// Overrides the searched item uniqueness toggle.
    #[must_use]
    pub fn with_unique_searched_items(mut self, value: bool) -> Self {
        self.unique_searched_items = value;
        self
    }

    /// Overrides the lookahead queue size.
    #[must_use]
    pub fn with_lookahead_queue_size(mut self, value: usize) -> Self {
        self.lookahead_queue_size = value;
        self
    }

    /// Overrides both unscaled drop periods, in seconds.
    #[must_use]
    pub fn with_drop_periods(mut self, min: f32, max: f32) -> Self {
        self.min_drop_period = min;
        self.max_drop_period = max;
        self
    }

    /// Overrides the global speed multiplier.
    #[must_use]
    pub fn with_speed_scaling(mut self, value: f32) -> Self {
        self.speed_scaling = value;
        self
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), DifficultyError> {
        for field in DifficultyField::ALL {
            self.check(field)?;
        }
        self.check_drop_order()
    }

    /// Applies user-edited values, rejecting unparsable or out-of-range input.
    ///
    /// Every rejected field keeps its previous value. The report lists what was
    /// applied and why the rest was rejected.
    pub fn apply_edit(&mut self, edit: &DifficultyEdit) -> EditReport {
        let mut candidate = *self;
        let mut report = EditReport::default();

        for (field, raw) in edit.entries() {
            let before = candidate;
            let outcome = candidate
                .assign_from_text(*field, raw)
                .and_then(|()| candidate.check(*field));
            match outcome {
                Ok(()) => report.applied.push(*field),
                Err(error) => {
                    candidate = before;
                    report.rejected.push((*field, error));
                }
            }
        }

        if let Err(error) = candidate.check_drop_order() {
            for field in [DifficultyField::MinDropPeriod, DifficultyField::MaxDropPeriod] {
                if report.retract(field) {
                    candidate.copy_field(field, self);
                    report.rejected.push((field, error.clone()));
                }
            }
        }

        *self = candidate;
        report
    }

    fn assign_from_text(&mut self, field: DifficultyField, raw: &str) -> Result<(), DifficultyError> {
        let text = raw.trim();
        match field {
            DifficultyField::ScreenProbability => self.screen_probability = parse(field, text)?,
            DifficultyField::TrashProbability => self.trash_probability = parse(field, text)?,
            DifficultyField::UniqueItems => self.unique_items = parse(field, text)?,
            DifficultyField::UniqueSearchedItems => self.unique_searched_items = parse(field, text)?,
            DifficultyField::LookaheadQueueSize => self.lookahead_queue_size = parse(field, text)?,
            DifficultyField::MinDropPeriod => self.min_drop_period = parse(field, text)?,
            DifficultyField::MaxDropPeriod => self.max_drop_period = parse(field, text)?,
            DifficultyField::SpeedScaling => self.speed_scaling = parse(field, text)?,
            DifficultyField::PlayerSpeedScaling => self.player_speed_scaling = parse(field, text)?,
            DifficultyField::BeltSpeed => self.belt_speed = parse(field, text)?,
        }
        Ok(())
    }

    fn copy_field(&mut self, field: DifficultyField, source: &Self) {
        match field {
            DifficultyField::MinDropPeriod => self.min_drop_period = source.min_drop_period,
            DifficultyField::MaxDropPeriod => self.max_drop_period = source.max_drop_period,
            _ => {}
        }
    }

    fn check(&self, field: DifficultyField) -> Result<(), DifficultyError> {
        let (value, valid) = match field {
            DifficultyField::ScreenProbability => {
                let value = self.screen_probability;
                (f64::from(value), (0.0..=1.0).contains(&value))
            }
            DifficultyField::TrashProbability => {
                let value = self.trash_probability;
                (f64::from(value), (0.0..=1.0).contains(&value))
            }
            DifficultyField::UniqueItems | DifficultyField::UniqueSearchedItems => return Ok(()),
            DifficultyField::LookaheadQueueSize => {
                let value = self.lookahead_queue_size;
                (
                    value as f64,
                    (1..=MAX_LOOKAHEAD_QUEUE_SIZE).contains(&value),
                )
            }
            DifficultyField::MinDropPeriod => {
                let value = self.min_drop_period;
                (f64::from(value), value > 0.0 && value <= MAX_DROP_PERIOD)
            }
            DifficultyField::MaxDropPeriod => {
                let value = self.max_drop_period;
                (f64::from(value), value > 0.0 && value <= MAX_DROP_PERIOD)
            }
            DifficultyField::SpeedScaling => {
                let value = self.speed_scaling;
                (f64::from(value), value > MIN_SPEED_SCALING && value.is_finite())
            }
            DifficultyField::PlayerSpeedScaling => {
                let value = self.player_speed_scaling;
                (f64::from(value), value > MIN_SPEED_SCALING && value.is_finite())
            }
            DifficultyField::BeltSpeed => {
                let value = self.belt_speed;
                (f64::from(value), value > 0.0 && value.is_finite())
            }
        };

        if valid {
            Ok(())
        } else {
            Err(DifficultyError::OutOfRange { field, value })
        }
    }

    fn check_drop_order(&self) -> Result<(), DifficultyError> {
        if self.min_drop_period <= self.max_drop_period {
            Ok(())
        } else {
            Err(DifficultyError::DropPeriodOrder {
                min: self.min_drop_period,
                max: self.max_drop_period,
            })
        }
    }
}

fn parse<T: std::str::FromStr>(field: DifficultyField, text: &str) -> Result<T, DifficultyError> {
    text.parse().map_err(|_| DifficultyError::Unparsable {
        field,
        text: text.to_owned(),
    })
}

/// Names of the editable difficulty fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DifficultyField {
    /// `screen_probability`, in `0.0..=1.0`.
    ScreenProbability,
    /// `trash_probability`, in `0.0..=1.0`.
    TrashProbability,
    /// `unique_items`, a boolean.
    UniqueItems,
    /// `unique_searched_items`, a boolean.
    UniqueSearchedItems,
    /// `lookahead_queue_size`, in `1..=64`.
    LookaheadQueueSize,
    /// `min_drop_period`, in `(0, 3600]` seconds and not above `max_drop_period`.
    MinDropPeriod,
    /// `max_drop_period`, in `(0, 3600]` seconds and not below `min_drop_period`.
    MaxDropPeriod,
    /// `speed_scaling`, above 0.1.
    SpeedScaling,
    /// `player_speed_scaling`, above 0.1.
    PlayerSpeedScaling,
    /// `belt_speed`, positive.
    BeltSpeed,
}

impl DifficultyField {
    /// Every editable field in declaration order.
    pub const ALL: [Self; 10] = [
        Self::ScreenProbability,
        Self::TrashProbability,
        Self::UniqueItems,
        Self::UniqueSearchedItems,
        Self::LookaheadQueueSize,
        Self::MinDropPeriod,
        Self::MaxDropPeriod,
        Self::SpeedScaling,
        Self::PlayerSpeedScaling,
        Self::BeltSpeed,
    ];

    /// Configuration key of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ScreenProbability => "screen_probability",
            Self::TrashProbability => "trash_probability",
            Self::UniqueItems => "unique_items",
            Self::UniqueSearchedItems => "unique_searched_items",
            Self::LookaheadQueueSize => "lookahead_queue_size",
            Self::MinDropPeriod => "min_drop_period",
            Self::MaxDropPeriod => "max_drop_period",
            Self::SpeedScaling => "speed_scaling",
            Self::PlayerSpeedScaling => "player_speed_scaling",
            Self::BeltSpeed => "belt_speed",
        }
    }

    /// Resolves a configuration key back to its field.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for DifficultyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons a difficulty value is refused.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DifficultyError {
    /// The edited text could not be parsed for the field's type.
    #[error("could not parse `{text}` as {field}")]
    Unparsable {
        /// Field being edited.
        field: DifficultyField,
        /// Raw text that failed to parse.
        text: String,
    },
    /// The value parsed but lies outside the field's valid range.
    #[error("{field} value {value} is out of range")]
    OutOfRange {
        /// Field being checked.
        field: DifficultyField,
        /// Offending value.
        value: f64,
    },
    /// The minimum drop period exceeds the maximum drop period.
    #[error("min_drop_period {min} exceeds max_drop_period {max}")]
    DropPeriodOrder {
        /// Minimum drop period in seconds.
        min: f32,
        /// Maximum drop period in seconds.
        max: f32,
    },
}

/// Batch of raw text edits, as typed into editor fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DifficultyEdit {
    entries: Vec<(DifficultyField, String)>,
}

impl DifficultyEdit {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds raw text for the field.
    #[must_use]
    pub fn with(mut self, field: DifficultyField, text: impl Into<String>) -> Self {
        self.push(field, text);
        self
    }

    /// Adds raw text for the field in place.
    pub fn push(&mut self, field: DifficultyField, text: impl Into<String>) {
        self.entries.push((field, text.into()));
    }

    /// Edited fields in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(DifficultyField, String)] {
        &self.entries
    }

    /// Reports whether the edit carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of [`Difficulty::apply_edit`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditReport {
    applied: Vec<DifficultyField>,
    rejected: Vec<(DifficultyField, DifficultyError)>,
}

impl EditReport {
    /// Fields whose new value was accepted.
    #[must_use]
    pub fn applied(&self) -> &[DifficultyField] {
        &self.applied
    }

    /// Fields that kept their previous value, with the reason.
    #[must_use]
    pub fn rejected(&self) -> &[(DifficultyField, DifficultyError)] {
        &self.rejected
    }

    fn retract(&mut self, field: DifficultyField) -> bool {
        let before = self.applied.len();
        self.applied.retain(|applied| *applied != field);
        self.applied.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let difficulty = Difficulty::default();
        assert_eq!(difficulty.validate(), Ok(()));
        assert_eq!(difficulty.lookahead_queue_size(), 4);
        assert!(difficulty.unique_items());
    }

    #[test]
    fn scaled_periods_follow_speed() {
        let difficulty = Difficulty::default().with_speed_scaling(2.0);
        assert_eq!(difficulty.scaled_min_drop_period(), 1.5);
        assert_eq!(difficulty.scaled_max_drop_period(), 2.5);
        assert_eq!(difficulty.scaled_belt_speed(), 2.0);
    }

    #[test]
    fn edit_accepts_valid_values() {
        let mut difficulty = Difficulty::default();
        let report = difficulty.apply_edit(
            &DifficultyEdit::new()
                .with(DifficultyField::ScreenProbability, " 0.75 ")
                .with(DifficultyField::UniqueItems, "false"),
        );

        assert_eq!(
            report.applied(),
            &[DifficultyField::ScreenProbability, DifficultyField::UniqueItems]
        );
        assert!(report.rejected().is_empty());
        assert_eq!(difficulty.screen_probability(), 0.75);
        assert!(!difficulty.unique_items());
    }

    #[test]
    fn edit_reverts_unparsable_and_out_of_range_values() {
        let mut difficulty = Difficulty::default();
        let report = difficulty.apply_edit(
            &DifficultyEdit::new()
                .with(DifficultyField::TrashProbability, "lots")
                .with(DifficultyField::ScreenProbability, "1.5")
                .with(DifficultyField::SpeedScaling, "0.05")
                .with(DifficultyField::LookaheadQueueSize, "0"),
        );

        assert!(report.applied().is_empty());
        assert_eq!(report.rejected().len(), 4);
        assert_eq!(difficulty, Difficulty::default());
    }

    #[test]
    fn edit_rejects_inverted_drop_periods() {
        let mut difficulty = Difficulty::default();
        let report =
            difficulty.apply_edit(&DifficultyEdit::new().with(DifficultyField::MinDropPeriod, "9"));

        assert!(report.applied().is_empty());
        assert!(matches!(
            report.rejected(),
            [(DifficultyField::MinDropPeriod, DifficultyError::DropPeriodOrder { .. })]
        ));
        assert_eq!(difficulty.scaled_min_drop_period(), 3.0);
    }

    #[test]
    fn edit_accepts_drop_periods_moved_together() {
        let mut difficulty = Difficulty::default();
        let report = difficulty.apply_edit(
            &DifficultyEdit::new()
                .with(DifficultyField::MinDropPeriod, "8")
                .with(DifficultyField::MaxDropPeriod, "10"),
        );

        assert!(report.rejected().is_empty());
        assert_eq!(difficulty.scaled_min_drop_period(), 8.0);
        assert_eq!(difficulty.scaled_max_drop_period(), 10.0);
    }

    #[test]
    fn edit_rejects_unbounded_drop_period() {
        let mut difficulty = Difficulty::default();
        let report =
            difficulty.apply_edit(&DifficultyEdit::new().with(DifficultyField::MaxDropPeriod, "1e30"));

        assert!(report.applied().is_empty());
        assert!(matches!(
            report.rejected(),
            [(DifficultyField::MaxDropPeriod, DifficultyError::OutOfRange { .. })]
        ));
        assert_eq!(difficulty, Difficulty::default());
        assert!(Difficulty::default()
            .with_drop_periods(3.0, 1e30)
            .validate()
            .is_err());
    }

    #[test]
    fn validate_rejects_nan_probability() {
        let difficulty = Difficulty::default().with_screen_probability(f32::NAN);
        assert!(matches!(
            difficulty.validate(),
            Err(DifficultyError::OutOfRange {
                field: DifficultyField::ScreenProbability,
                ..
            })
        ));
    }

    #[test]
    fn field_names_round_trip() {
        for field in DifficultyField::ALL {
            assert_eq!(DifficultyField::from_name(field.name()), Some(field));
        }
        assert_eq!(DifficultyField::from_name("gravity"), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let difficulty: Difficulty = toml::from_str("trash_probability = 0.0\n").expect("parses");
        assert_eq!(difficulty.trash_probability(), 0.0);
        assert_eq!(difficulty.screen_probability(), 0.5);
    }
}
