use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ConfigError;

pub const MAX_NEURONS: usize = 128;

pub const GENOME_MIN_LENGTH: usize = 10;
pub const GENOME_MAX_LENGTH: usize = 20;

/// Divides the raw gene weight into its effective multiplier, roughly [-4.0, 4.0].
pub const WEIGHT_DIVISOR: f64 = 8192.0;
pub const MUTATE_GENE_NUDGE: i32 = 1000;

/// An action fires when its accumulated output exceeds this value.
pub const ACTION_THRESHOLD: f64 = 0.5;

pub const RESPONSIVENESS_MIN: f64 = 0.1;
pub const RESPONSIVENESS_MAX: f64 = 10.0;
pub const OSCILLATOR_PERIOD_MIN: f64 = 1.0;
pub const OSCILLATOR_PERIOD_MAX: f64 = 100.0;
pub const INITIAL_OSCILLATOR_PERIOD: f64 = 10.0;
pub const INITIAL_RESPONSIVENESS: f64 = 1.0;

pub const SNAPSHOT_SIGNAL_WEIGHT: f64 = 0.5;

/// What happens when a move would leave the grid.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    #[default]
    Clamp,
    Wrap,
    /// Positions may drift off the grid; sensing and marking degrade to no-ops there.
    Unbounded,
}

/// Where freshly constructed agents are placed.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    #[default]
    Origin,
    Random,
}

/// How the next generation obtains its genomes from the survivor pool.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Inheritance {
    /// Each child receives a mutated copy of a sampled survivor genome.
    #[default]
    MutatedCopy,
    /// Each child gets a freshly generated random genome. The sampled survivor's
    /// copy is still mutated and then discarded, so no heredity takes place.
    Regenerate,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Parameters {
    pub size_x: usize,
    pub size_y: usize,
    pub population: usize,
    pub steps_per_generation: usize,
    /// Per-gene probability of a weight nudge during reproduction.
    pub mutation_rate: f64,
    /// Accepted and validated but not consulted by reproduction: every
    /// survivor seeds the next generation with equal probability.
    pub survivor_fraction: f64,
    pub visualise_interval: usize,
    pub generations: usize,
    pub seed: Option<u64>,
    pub boundary: BoundaryPolicy,
    pub spawn: SpawnMode,
    pub inheritance: Inheritance,
    pub stop_when_extinct: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            size_x: 100,
            size_y: 100,
            population: 100,
            steps_per_generation: 50,
            mutation_rate: 0.01,
            survivor_fraction: 0.2,
            visualise_interval: 2,
            generations: 10,
            seed: None,
            boundary: BoundaryPolicy::default(),
            spawn: SpawnMode::default(),
            inheritance: Inheritance::default(),
            stop_when_extinct: false,
        }
    }
}

impl Parameters {
    pub const MAX_GRID_SIZE: usize = i32::MAX as usize;
    /// Upper bound on `size_x * size_y`; each cell carries a signal counter.
    pub const MAX_GRID_CELLS: usize = 1 << 26;

    /// Merge a JSON object document over the defaults.
    pub fn from_json_str(document: &str) -> Result<Parameters, ConfigError> {
        let value: Value = serde_json::from_str(document)?;
        let Value::Object(overrides) = value else {
            return Err(ConfigError::NotAnObject);
        };
        let mut params = Parameters::default();
        params.apply_overrides(&overrides)?;
        Ok(params)
    }

    /// Override recognized keys in place. A key is recognized only if it is
    /// already one of this record's fields; anything else is skipped.
    /// On error `self` is left untouched.
    pub fn apply_overrides(&mut self, overrides: &Map<String, Value>) -> Result<(), ConfigError> {
        let Value::Object(mut current) = serde_json::to_value(&*self)? else {
            return Err(ConfigError::NotAnObject);
        };

        for (key, value) in overrides {
            match current.get_mut(key) {
                Some(slot) => {
                    debug!(key = key.as_str(), %value, "applying configuration override");
                    *slot = value.clone();
                }
                None => debug!(key = key.as_str(), "ignoring unrecognized configuration key"),
            }
        }

        let merged: Parameters = serde_json::from_value(Value::Object(current))?;
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("size_x", self.size_x), ("size_y", self.size_y)] {
            if value == 0 {
                return Err(ConfigError::Zero { key });
            }
            if value > Self::MAX_GRID_SIZE {
                return Err(ConfigError::TooLarge {
                    key,
                    value,
                    max: Self::MAX_GRID_SIZE,
                });
            }
        }
        let cells = self.size_x.checked_mul(self.size_y).unwrap_or(usize::MAX);
        if cells > Self::MAX_GRID_CELLS {
            return Err(ConfigError::TooLarge {
                key: "size_x * size_y",
                value: cells,
                max: Self::MAX_GRID_CELLS,
            });
        }
        if self.population == 0 {
            return Err(ConfigError::Zero { key: "population" });
        }
        if self.visualise_interval == 0 {
            return Err(ConfigError::Zero {
                key: "visualise_interval",
            });
        }
        for (key, value) in [
            ("mutation_rate", self.mutation_rate),
            ("survivor_fraction", self.survivor_fraction),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(ConfigError::OutOfUnitRange { key, value });
            }
        }
        Ok(())
    }
}
