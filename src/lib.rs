pub mod agent;
pub mod coord;
pub mod error;
pub mod genome;
pub mod network;
pub mod params;
pub mod population;
pub mod signal;
pub mod snapshot;
