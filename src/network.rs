use rulinalg::vector::Vector;

use crate::genome::{Gene, Genome, SinkKind, SourceKind, NUM_ACTIONS, NUM_SENSES};
use crate::params::MAX_NEURONS;

pub type SensorValues = [f64; NUM_SENSES];
pub type ActionOutputs = [f64; NUM_ACTIONS];

/// Recurrent evaluator with a fixed bank of internal neurons. Neuron outputs
/// survive between calls, so a neuron feeding another neuron (or an action)
/// contributes the value it settled on during the previous evaluation.
#[derive(Clone, Debug)]
pub struct NeuralNet {
    connections: Vec<Gene>,
    // neuron outputs, tanh of last evaluation's input
    outputs: Vector<f64>,
    driven: Vec<bool>,
}

impl NeuralNet {
    pub fn from_genome(genome: &Genome) -> NeuralNet {
        NeuralNet {
            connections: genome.genes.clone(),
            outputs: Vector::zeros(MAX_NEURONS),
            driven: vec![true; MAX_NEURONS],
        }
    }

    pub fn feed_forward(&mut self, sensors: &SensorValues) -> ActionOutputs {
        let mut neuron_inputs: Vector<f64> = Vector::zeros(MAX_NEURONS);
        let mut actions = [0.0; NUM_ACTIONS];

        for conn in &self.connections {
            let value = match conn.source_kind() {
                SourceKind::Sensor => sensors[conn.source_index()],
                SourceKind::Neuron => self.outputs[conn.source_index()],
            };
            let weighted = value * conn.weight_as_float();
            match conn.sink_kind() {
                SinkKind::Action => actions[conn.sink_index()] += weighted,
                SinkKind::Neuron => neuron_inputs[conn.sink_index()] += weighted,
            }
        }

        // all contributions gathered, now settle neuron state
        let activated = neuron_inputs.apply(&f64::tanh);
        for (i, driven) in self.driven.iter().enumerate() {
            if *driven {
                self.outputs[i] = activated[i];
            }
        }

        actions
    }

    pub fn connections(&self) -> &[Gene] {
        &self.connections
    }

    pub fn neuron_outputs(&self) -> &[f64] {
        self.outputs.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Action, Sensor};

    fn neuron_gene(
        source: SourceKind,
        source_index: usize,
        sink: SinkKind,
        sink_index: usize,
        weight: i16,
    ) -> Gene {
        Gene::new(source, source_index, sink, sink_index, weight).unwrap()
    }

    #[test]
    fn zero_sensors_without_self_loops_yield_zero_outputs() {
        let genome = Genome::from_genes(vec![
            Gene::sensor_to_action(Sensor::Osc1, Action::MoveForward, 30000),
            neuron_gene(SourceKind::Sensor, 3, SinkKind::Neuron, 4, -12000),
            neuron_gene(SourceKind::Neuron, 4, SinkKind::Action, 2, 20000),
        ]);
        let mut net = NeuralNet::from_genome(&genome);
        let actions = net.feed_forward(&[0.0; NUM_SENSES]);
        assert!(actions.iter().all(|a| *a == 0.0));
        assert!(net.neuron_outputs().iter().all(|o| *o == 0.0));
    }

    #[test]
    fn actions_are_raw_sums() {
        let genome = Genome::from_genes(vec![
            Gene::sensor_to_action(Sensor::Osc1, Action::MoveForward, 16384),
            Gene::sensor_to_action(Sensor::Random, Action::MoveForward, 16384),
        ]);
        let mut net = NeuralNet::from_genome(&genome);
        let mut sensors = [0.0; NUM_SENSES];
        sensors[Sensor::Osc1.index()] = 3.0;
        sensors[Sensor::Random.index()] = 1.0;
        let actions = net.feed_forward(&sensors);
        assert_eq!(actions[Action::MoveForward.index()], 8.0);
    }

    #[test]
    fn neuron_contributions_lag_by_one_evaluation() {
        // sensor 0 -> neuron 7 -> action MoveEast
        let genome = Genome::from_genes(vec![
            neuron_gene(SourceKind::Neuron, 7, SinkKind::Action, Action::MoveEast.index(), 8192),
            neuron_gene(SourceKind::Sensor, 0, SinkKind::Neuron, 7, 8192),
        ]);
        let mut net = NeuralNet::from_genome(&genome);

        let mut first = [0.0; NUM_SENSES];
        first[0] = 0.5;
        let actions = net.feed_forward(&first);
        assert_eq!(actions[Action::MoveEast.index()], 0.0);
        assert_eq!(net.neuron_outputs()[7], 0.5f64.tanh());

        let mut second = [0.0; NUM_SENSES];
        second[0] = -2.0;
        let actions = net.feed_forward(&second);
        assert_eq!(actions[Action::MoveEast.index()], 0.5f64.tanh());
        assert_eq!(net.neuron_outputs()[7], (-2.0f64).tanh());
    }

    #[test]
    fn self_loop_reads_previous_state() {
        let genome = Genome::from_genes(vec![
            neuron_gene(SourceKind::Sensor, 0, SinkKind::Neuron, 1, 8192),
            neuron_gene(SourceKind::Neuron, 1, SinkKind::Neuron, 1, 8192),
        ]);
        let mut net = NeuralNet::from_genome(&genome);
        let mut sensors = [0.0; NUM_SENSES];
        sensors[0] = 1.0;
        net.feed_forward(&sensors);
        let after_first = 1.0f64.tanh();
        assert_eq!(net.neuron_outputs()[1], after_first);
        net.feed_forward(&sensors);
        assert_eq!(net.neuron_outputs()[1], (1.0 + after_first).tanh());
    }

    #[test]
    fn evaluator_is_a_snapshot_of_the_genome() {
        let mut genome = Genome::from_genes(vec![Gene::sensor_to_action(
            Sensor::Osc1,
            Action::MoveForward,
            100,
        )]);
        let net = NeuralNet::from_genome(&genome);
        genome.genes[0].weight = 9000;
        assert_eq!(net.connections()[0].weight, 100);
    }
}
