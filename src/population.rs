use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::agent::Agent;
use crate::coord::Coord;
use crate::error::ConfigError;
use crate::genome::Genome;
use crate::params::*;
use crate::signal::SignalLayer;
use crate::snapshot::{AgentView, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub alive: usize,
    pub population: usize,
}

/// Owns the population, the signal layer and the single random stream, and
/// drives them through ticks and generations.
///
/// Agents act strictly in population order and every effect lands
/// immediately, so an agent sees moves, marks and kills made earlier in the
/// same tick.
pub struct Simulation<R: Rng = ChaCha12Rng> {
    params: Parameters,
    pub agents: Vec<Agent>,
    pub signals: SignalLayer,
    rng: R,
    generation: usize,
}

impl Simulation<ChaCha12Rng> {
    /// Seeded from `params.seed`, or from OS entropy when unset.
    pub fn new(params: Parameters) -> Result<Self, ConfigError> {
        let rng = match params.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_entropy(),
        };
        Simulation::with_rng(params, rng)
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(params: Parameters, mut rng: R) -> Result<Self, ConfigError> {
        params.validate()?;
        let agents = (0..params.population)
            .map(|_| {
                let loc = spawn_location(&params, &mut rng);
                Agent::random(loc, &mut rng)
            })
            .collect();
        Ok(Simulation::assemble(params, agents, rng))
    }

    /// Start from an explicit population, e.g. a scripted scenario.
    pub fn from_agents(
        params: Parameters,
        agents: Vec<Agent>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Simulation::assemble(params, agents, rng))
    }

    fn assemble(params: Parameters, agents: Vec<Agent>, rng: R) -> Self {
        let signals = SignalLayer::new(params.size_x, params.size_y);
        Simulation {
            params,
            agents,
            signals,
            rng,
            generation: 0,
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn tick(&mut self) {
        for i in 0..self.agents.len() {
            if !self.agents[i].alive {
                continue;
            }
            let sensors = self.agents[i].sense(&self.signals, &self.agents, &mut self.rng);
            let agent = &mut self.agents[i];
            let actions = agent.nnet.feed_forward(&sensors);
            let boundary = self.params.boundary;
            if let Some(target) = agent.act(&actions, &mut self.signals, boundary, &mut self.rng) {
                self.kill_first_at(i, target);
            }
        }
        self.signals.fade();
        trace!(generation = self.generation, alive = self.alive_count(), "tick");
    }

    fn kill_first_at(&mut self, killer: usize, target: Coord) {
        let victim = self
            .agents
            .iter_mut()
            .enumerate()
            .find(|(_, other)| other.alive && other.loc == target);
        if let Some((victim, other)) = victim {
            other.alive = false;
            debug!(killer, victim, x = target.x, y = target.y, "agent killed");
        }
    }

    /// Run the tick phase of the current generation.
    pub fn run_generation(&mut self) -> GenerationReport {
        for _ in 0..self.params.steps_per_generation {
            self.tick();
        }
        let report = self.stats();
        info!(
            generation = report.generation,
            alive = report.alive,
            population = report.population,
            "generation complete"
        );
        report
    }

    /// Replace the population with offspring of the living agents. Every
    /// survivor is equally likely to parent each child; `survivor_fraction`
    /// is not applied.
    pub fn reproduce(&mut self) {
        let mut survivors: Vec<&Genome> = self
            .agents
            .iter()
            .filter(|a| a.alive)
            .map(|a| &a.genome)
            .collect();
        if survivors.is_empty() {
            warn!(
                generation = self.generation,
                "no survivors, seeding from a random individual"
            );
            if let Some(agent) = self.agents.choose(&mut self.rng) {
                survivors.push(&agent.genome);
            }
        }

        let mut next = Vec::with_capacity(self.params.population);
        for _ in 0..self.params.population {
            let genome = match survivors.choose(&mut self.rng) {
                Some(parent) => {
                    let mut child = parent.copy();
                    child.mutate(self.params.mutation_rate, &mut self.rng);
                    match self.params.inheritance {
                        Inheritance::MutatedCopy => child,
                        Inheritance::Regenerate => Genome::generate_random(&mut self.rng),
                    }
                }
                None => Genome::generate_random(&mut self.rng),
            };
            let loc = spawn_location(&self.params, &mut self.rng);
            next.push(Agent::new(genome, loc, &mut self.rng));
        }

        debug!(
            generation = self.generation,
            parents = survivors.len(),
            children = next.len(),
            "reproduced"
        );
        self.agents = next;
        self.generation += 1;
    }

    /// Alternate tick phase and reproduction. `observer` sees the world at the
    /// end of every tick phase, before the population is replaced.
    pub fn run<F>(&mut self, generations: usize, mut observer: F) -> Vec<GenerationReport>
    where
        F: FnMut(&Simulation<R>, &GenerationReport),
    {
        let mut reports = Vec::with_capacity(generations);
        for _ in 0..generations {
            let report = self.run_generation();
            observer(&*self, &report);
            reports.push(report);
            if self.params.stop_when_extinct && report.alive == 0 {
                info!(generation = report.generation, "population extinct, stopping");
                break;
            }
            self.reproduce();
        }
        reports
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    pub fn stats(&self) -> GenerationReport {
        GenerationReport {
            generation: self.generation,
            alive: self.alive_count(),
            population: self.params.population,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            size_x: self.signals.size_x(),
            size_y: self.signals.size_y(),
            agents: self
                .agents
                .iter()
                .map(|a| AgentView {
                    loc: a.loc,
                    alive: a.alive,
                })
                .collect(),
            signals: self.signals.grid().to_vec(),
        }
    }
}

fn spawn_location<R: Rng + ?Sized>(params: &Parameters, rng: &mut R) -> Coord {
    match params.spawn {
        SpawnMode::Origin => Coord::default(),
        SpawnMode::Random => Coord::new(
            rng.gen_range(0..params.size_x) as i32,
            rng.gen_range(0..params.size_y) as i32,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> Parameters {
        Parameters {
            size_x: 12,
            size_y: 8,
            population: 20,
            steps_per_generation: 5,
            seed: Some(21),
            ..Parameters::default()
        }
    }

    #[test]
    fn new_population_matches_configuration() {
        let sim = Simulation::new(small_params()).unwrap();
        assert_eq!(sim.agents.len(), 20);
        assert_eq!(sim.signals.size_x(), 12);
        assert_eq!(sim.signals.size_y(), 8);
        for agent in &sim.agents {
            assert!(agent.alive);
            assert_eq!(agent.loc, Coord::default());
            assert!((GENOME_MIN_LENGTH..=GENOME_MAX_LENGTH).contains(&agent.genome.len()));
        }
    }

    #[test]
    fn invalid_parameters_fail_fast() {
        let params = Parameters {
            population: 0,
            ..small_params()
        };
        assert!(matches!(
            Simulation::new(params),
            Err(ConfigError::Zero { key: "population" })
        ));
    }

    #[test]
    fn random_spawn_stays_on_grid() {
        let params = Parameters {
            spawn: SpawnMode::Random,
            ..small_params()
        };
        let sim = Simulation::new(params).unwrap();
        for agent in &sim.agents {
            assert!(sim.signals.contains(agent.loc));
        }
    }

    #[test]
    fn clamped_agents_never_leave_the_grid() {
        let params = Parameters {
            spawn: SpawnMode::Random,
            steps_per_generation: 40,
            ..small_params()
        };
        let mut sim = Simulation::new(params).unwrap();
        sim.run_generation();
        for agent in &sim.agents {
            assert!(sim.signals.contains(agent.loc));
        }
    }

    #[test]
    fn same_seed_same_history() {
        let run = || {
            let mut sim = Simulation::new(small_params()).unwrap();
            let reports = sim.run(4, |_, _| {});
            let locs: Vec<Coord> = sim.agents.iter().map(|a| a.loc).collect();
            (reports, locs)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn run_reports_each_generation_and_observes_before_reproduction() {
        let mut sim = Simulation::new(small_params()).unwrap();
        let mut observed = Vec::new();
        let reports = sim.run(3, |world, report| {
            assert_eq!(world.alive_count(), report.alive);
            observed.push(world.snapshot().generation);
        });
        assert_eq!(reports.len(), 3);
        assert_eq!(observed, vec![0, 1, 2]);
        assert_eq!(sim.generation(), 3);
        assert!(reports.iter().all(|r| r.population == 20));
    }

    #[test]
    fn stop_when_extinct_ends_the_run() {
        let params = Parameters {
            stop_when_extinct: true,
            steps_per_generation: 0,
            ..small_params()
        };
        let mut sim = Simulation::new(params).unwrap();
        for agent in sim.agents.iter_mut() {
            agent.alive = false;
        }
        let reports = sim.run(5, |_, _| {});
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].alive, 0);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn empty_population_regenerates_from_scratch() {
        let mut sim = Simulation::from_agents(
            small_params(),
            Vec::new(),
            ChaCha12Rng::seed_from_u64(2),
        )
        .unwrap();
        sim.reproduce();
        assert_eq!(sim.agents.len(), 20);
    }
}
