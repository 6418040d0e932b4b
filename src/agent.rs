use std::f64::consts::PI;

use rand::Rng;

use crate::coord::Coord;
use crate::genome::{Action, Genome, Sensor, NUM_SENSES};
use crate::network::{ActionOutputs, NeuralNet, SensorValues};
use crate::params::*;
use crate::signal::SignalLayer;

#[derive(Clone, Debug)]
pub struct Agent {
    pub genome: Genome,
    pub nnet: NeuralNet,
    pub loc: Coord,
    pub facing: Coord,
    pub alive: bool,
    pub oscillator_phase: f64,
    pub oscillator_period: f64,
    /// Derived from the network every tick; nothing reads it yet.
    pub responsiveness: f64,
}

impl Agent {
    pub fn new<R: Rng + ?Sized>(genome: Genome, loc: Coord, rng: &mut R) -> Agent {
        Agent::with_facing(genome, loc, Coord::random_facing(rng))
    }

    pub fn with_facing(genome: Genome, loc: Coord, facing: Coord) -> Agent {
        let nnet = NeuralNet::from_genome(&genome);
        Agent {
            genome,
            nnet,
            loc,
            facing,
            alive: true,
            oscillator_phase: 0.0,
            oscillator_period: INITIAL_OSCILLATOR_PERIOD,
            responsiveness: INITIAL_RESPONSIVENESS,
        }
    }

    pub fn random<R: Rng + ?Sized>(loc: Coord, rng: &mut R) -> Agent {
        let genome = Genome::generate_random(rng);
        Agent::new(genome, loc, rng)
    }

    /// The cell directly ahead.
    pub fn forward(&self) -> Coord {
        self.loc + self.facing
    }

    pub fn sense<R: Rng + ?Sized>(
        &self,
        signals: &SignalLayer,
        population: &[Agent],
        rng: &mut R,
    ) -> SensorValues {
        let mut values = [0.0; NUM_SENSES];
        for (value, sensor) in values.iter_mut().zip(Sensor::ALL) {
            *value = self.sensor_value(sensor, signals, population, rng);
        }
        values
    }

    /// Only a few sensors are wired to world state; the rest read uniform noise.
    pub fn sensor_value<R: Rng + ?Sized>(
        &self,
        sensor: Sensor,
        signals: &SignalLayer,
        population: &[Agent],
        rng: &mut R,
    ) -> f64 {
        match sensor {
            Sensor::Osc1 => (2.0 * PI * self.oscillator_phase).sin(),
            Sensor::Signal0 => signals.get(self.loc).unwrap_or(0) as f64,
            Sensor::LongprobePopFwd => {
                let probe = self.forward();
                if population.iter().any(|other| other.alive && other.loc == probe) {
                    1.0
                } else {
                    0.0
                }
            }
            _ => rng.gen::<f64>(),
        }
    }

    /// Apply this tick's outputs to the agent's own state and the signal layer.
    /// Returns the cell to strike if the kill action fired; resolving the
    /// victim is left to the owner of the population.
    pub fn act<R: Rng + ?Sized>(
        &mut self,
        actions: &ActionOutputs,
        signals: &mut SignalLayer,
        boundary: BoundaryPolicy,
        rng: &mut R,
    ) -> Option<Coord> {
        let fired = |action: Action| actions[action.index()] > ACTION_THRESHOLD;

        self.responsiveness = actions[Action::SetResponsiveness.index()]
            .clamp(RESPONSIVENESS_MIN, RESPONSIVENESS_MAX);
        self.oscillator_period = actions[Action::SetOscillatorPeriod.index()]
            .clamp(OSCILLATOR_PERIOD_MIN, OSCILLATOR_PERIOD_MAX);

        let mut move_vector = Coord::default();
        if fired(Action::MoveForward) {
            move_vector += self.facing;
        }
        if fired(Action::MoveReverse) {
            move_vector += -self.facing;
        }
        if fired(Action::MoveLeft) {
            move_vector += self.facing.rotate_left();
        }
        if fired(Action::MoveRight) {
            move_vector += self.facing.rotate_right();
        }
        if fired(Action::MoveRandom) {
            move_vector += Coord::random_step(rng);
        }
        self.loc = step(
            self.loc,
            move_vector.clamp_unit(),
            boundary,
            signals.size_x(),
            signals.size_y(),
        );

        if fired(Action::EmitSignal0) {
            signals.increment(self.loc);
        }

        let strike = fired(Action::KillForward).then(|| self.forward());

        self.oscillator_phase =
            (self.oscillator_phase + 1.0 / self.oscillator_period).rem_euclid(1.0);

        strike
    }
}

fn step(
    loc: Coord,
    delta: Coord,
    boundary: BoundaryPolicy,
    size_x: usize,
    size_y: usize,
) -> Coord {
    let moved = loc + delta;
    let (size_x, size_y) = (size_x as i32, size_y as i32);
    match boundary {
        BoundaryPolicy::Clamp => Coord::new(
            moved.x.clamp(0, size_x - 1),
            moved.y.clamp(0, size_y - 1),
        ),
        BoundaryPolicy::Wrap => {
            Coord::new(moved.x.rem_euclid(size_x), moved.y.rem_euclid(size_y))
        }
        BoundaryPolicy::Unbounded => moved,
    }
}
