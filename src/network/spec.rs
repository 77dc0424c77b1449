use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::grad::method::GradientMethod;
use crate::network::architecture::Architecture;
use crate::network::network::Network;
use crate::train::train_config::TrainingSpec;

/// Bounds of the uniform distribution used to initialize parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitRange {
    pub low: f64,
    pub high: f64,
}

impl Default for InitRange {
    fn default() -> Self {
        InitRange { low: -1.0, high: 1.0 }
    }
}

/// A fully serializable description of a network architecture plus how to
/// initialize and train it.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights, so a run can be described before it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Layer widths, input first.
    pub architecture: Architecture,
    #[serde(default)]
    pub init: InitRange,
    #[serde(default)]
    pub training: TrainingSpec,
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>, architecture: Architecture) -> NetworkSpec {
        NetworkSpec {
            name: name.into(),
            architecture,
            init: InitRange::default(),
            training: TrainingSpec::default(),
        }
    }

    /// Checks values that serde cannot: ranges and rates.
    pub fn validate(&self) -> Result<()> {
        if !(self.init.low < self.init.high) {
            return Err(Error::InvalidConfig(format!(
                "init range [{}, {}) is empty",
                self.init.low, self.init.high
            )));
        }
        if !(self.training.learning_rate.is_finite() && self.training.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.training.learning_rate
            )));
        }
        if let GradientMethod::FiniteDifference { eps, .. } = self.training.method {
            if !(eps.is_finite() && eps > 0.0) {
                return Err(Error::InvalidConfig(format!("finite difference eps must be positive, got {eps}")));
            }
        }
        Ok(())
    }

    /// Random source for initialization: seeded when the spec names a seed.
    pub fn rng(&self) -> StdRng {
        match self.training.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Allocates a network for this architecture and randomises it within
    /// `init`.
    pub fn build(&self, rng: &mut StdRng) -> Network {
        let mut net = Network::alloc(self.architecture.widths());
        net.randomise(rng, self.init.low, self.init.high);
        net
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        info!(path, name = %spec.name, architecture = %spec.architecture, "loaded network spec");
        Ok(spec)
    }
}
