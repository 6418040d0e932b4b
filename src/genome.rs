use std::fmt::Write;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GeneError;
use crate::params::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    Age,
    BoundaryDist,
    BoundaryDistX,
    BoundaryDistY,
    LastMoveDirX,
    LastMoveDirY,
    LocX,
    LocY,
    LongprobePopFwd,
    LongprobeBarFwd,
    BarrierFwd,
    BarrierLr,
    Osc1,
    Population,
    PopulationFwd,
    PopulationLr,
    Random,
    Signal0,
    Signal0Fwd,
    Signal0Lr,
    GeneticSimFwd,
}

impl Sensor {
    pub const COUNT: usize = 21;
    pub const ALL: [Sensor; Sensor::COUNT] = [
        Sensor::Age,
        Sensor::BoundaryDist,
        Sensor::BoundaryDistX,
        Sensor::BoundaryDistY,
        Sensor::LastMoveDirX,
        Sensor::LastMoveDirY,
        Sensor::LocX,
        Sensor::LocY,
        Sensor::LongprobePopFwd,
        Sensor::LongprobeBarFwd,
        Sensor::BarrierFwd,
        Sensor::BarrierLr,
        Sensor::Osc1,
        Sensor::Population,
        Sensor::PopulationFwd,
        Sensor::PopulationLr,
        Sensor::Random,
        Sensor::Signal0,
        Sensor::Signal0Fwd,
        Sensor::Signal0Lr,
        Sensor::GeneticSimFwd,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveEast,
    MoveWest,
    MoveNorth,
    MoveSouth,
    MoveForward,
    MoveX,
    MoveY,
    SetResponsiveness,
    SetOscillatorPeriod,
    EmitSignal0,
    KillForward,
    MoveReverse,
    MoveLeft,
    MoveRight,
    MoveRl,
    MoveRandom,
    SetLongprobeDist,
}

impl Action {
    pub const COUNT: usize = 17;
    pub const ALL: [Action; Action::COUNT] = [
        Action::MoveEast,
        Action::MoveWest,
        Action::MoveNorth,
        Action::MoveSouth,
        Action::MoveForward,
        Action::MoveX,
        Action::MoveY,
        Action::SetResponsiveness,
        Action::SetOscillatorPeriod,
        Action::EmitSignal0,
        Action::KillForward,
        Action::MoveReverse,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveRl,
        Action::MoveRandom,
        Action::SetLongprobeDist,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

pub const NUM_SENSES: usize = Sensor::COUNT;
pub const NUM_ACTIONS: usize = Action::COUNT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Neuron,
    Sensor,
}

impl SourceKind {
    /// Exclusive upper bound of `source_index` for this kind.
    pub fn index_bound(self) -> usize {
        match self {
            SourceKind::Neuron => MAX_NEURONS,
            SourceKind::Sensor => NUM_SENSES,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SinkKind {
    Neuron,
    Action,
}

impl SinkKind {
    /// Exclusive upper bound of `sink_index` for this kind.
    pub fn index_bound(self) -> usize {
        match self {
            SinkKind::Neuron => MAX_NEURONS,
            SinkKind::Action => NUM_ACTIONS,
        }
    }
}

/// One weighted connection. Indices are validated on construction and never
/// change afterwards; only `weight` is touched by mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gene {
    source_kind: SourceKind,
    source_index: usize,
    sink_kind: SinkKind,
    sink_index: usize,
    pub weight: i16,
}

impl Gene {
    pub fn new(
        source_kind: SourceKind,
        source_index: usize,
        sink_kind: SinkKind,
        sink_index: usize,
        weight: i16,
    ) -> Result<Gene, GeneError> {
        if source_index >= source_kind.index_bound() {
            return Err(GeneError::SourceIndexOutOfRange {
                kind: source_kind,
                index: source_index,
                bound: source_kind.index_bound(),
            });
        }
        if sink_index >= sink_kind.index_bound() {
            return Err(GeneError::SinkIndexOutOfRange {
                kind: sink_kind,
                index: sink_index,
                bound: sink_kind.index_bound(),
            });
        }
        Ok(Gene {
            source_kind,
            source_index,
            sink_kind,
            sink_index,
            weight,
        })
    }

    pub fn sensor_to_action(sensor: Sensor, action: Action, weight: i16) -> Gene {
        Gene {
            source_kind: SourceKind::Sensor,
            source_index: sensor.index(),
            sink_kind: SinkKind::Action,
            sink_index: action.index(),
            weight,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Gene {
        let source_kind = if rng.gen::<bool>() {
            SourceKind::Sensor
        } else {
            SourceKind::Neuron
        };
        let sink_kind = if rng.gen::<bool>() {
            SinkKind::Action
        } else {
            SinkKind::Neuron
        };
        Gene {
            source_kind,
            source_index: rng.gen_range(0..source_kind.index_bound()),
            sink_kind,
            sink_index: rng.gen_range(0..sink_kind.index_bound()),
            weight: rng.gen::<i16>(),
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn sink_kind(&self) -> SinkKind {
        self.sink_kind
    }

    pub fn sink_index(&self) -> usize {
        self.sink_index
    }

    pub fn weight_as_float(&self) -> f64 {
        self.weight as f64 / WEIGHT_DIVISOR
    }

    /// Add `delta` to the weight, saturating at the i16 range.
    pub fn nudge(&mut self, delta: i32) {
        let nudged = self.weight as i32 + delta;
        self.weight = nudged.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
}

/// An ordered gene list. `generate_random` is the only constructor that keeps
/// the length within `GENOME_MIN_LENGTH..=GENOME_MAX_LENGTH`; `Default` (no
/// genes) and `from_genes` build scripted genomes of any length, and
/// reproduction never changes a genome's length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Genome {
    pub genes: Vec<Gene>,
}

impl Genome {
    /// Wrap `genes` as given. The length is not checked.
    pub fn from_genes(genes: Vec<Gene>) -> Genome {
        Genome { genes }
    }

    pub fn generate_random<R: Rng + ?Sized>(rng: &mut R) -> Genome {
        let length = rng.gen_range(GENOME_MIN_LENGTH..=GENOME_MAX_LENGTH);
        Genome {
            genes: (0..length).map(|_| Gene::random(rng)).collect(),
        }
    }

    /// Point-mutate weights in place. Each gene is nudged independently with
    /// probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        for gene in self.genes.iter_mut() {
            if rng.gen::<f64>() < rate {
                gene.nudge(rng.gen_range(-MUTATE_GENE_NUDGE..=MUTATE_GENE_NUDGE));
            }
        }
    }

    /// Independent deep copy; no gene is shared with `self`.
    pub fn copy(&self) -> Genome {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Graphviz rendering of the wiring, one edge per gene.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph genome {\n");
        for gene in &self.genes {
            let source = match gene.source_kind {
                SourceKind::Sensor => format!("{:?}", Sensor::ALL[gene.source_index]),
                SourceKind::Neuron => format!("n{}", gene.source_index),
            };
            let sink = match gene.sink_kind {
                SinkKind::Action => format!("{:?}", Action::ALL[gene.sink_index]),
                SinkKind::Neuron => format!("n{}", gene.sink_index),
            };
            let _ = writeln!(
                dot,
                "    {} -> {} [label=\"{:.2}\"]",
                source,
                sink,
                gene.weight_as_float()
            );
        }
        dot.push('}');
        dot
    }
}
