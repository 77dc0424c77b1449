use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::error::{contract, ContractViolation, Error, Result};
use crate::math::matrix::Matrix;
use crate::network::architecture::Architecture;

/// Selects one of the two parameter matrices of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Weights,
    Biases,
}

impl ParamKind {
    pub const ALL: [ParamKind; 2] = [ParamKind::Weights, ParamKind::Biases];
}

/// A stack of fully connected sigmoid layers.
///
/// Layer `i` maps `activations[i]` to `activations[i + 1]` through
/// `weights[i]` (`arch[i] × arch[i+1]`) and `biases[i]` (`1 × arch[i+1]`).
/// `activations[0]` is the input buffer and the last activation is the output
/// buffer; both are single rows. Shapes are fixed at allocation.
///
/// A gradient has exactly the same layout, so gradients are `Network`s too.
#[derive(Debug, Clone)]
pub struct Network {
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
    activations: Vec<Matrix>,
}

impl Network {
    /// Allocates a zero-initialized network for the given layer widths.
    ///
    /// Parameters are meaningless until [`Network::randomise`] or training
    /// sets them.
    pub fn alloc(architecture: &[usize]) -> Network {
        Architecture::check(architecture);

        let layer_count = architecture.len() - 1;
        let mut weights = Vec::with_capacity(layer_count);
        let mut biases = Vec::with_capacity(layer_count);
        let mut activations = Vec::with_capacity(architecture.len());

        activations.push(Matrix::zeros(1, architecture[0]));
        for pair in architecture.windows(2) {
            let (fan_in, width) = (pair[0], pair[1]);
            weights.push(Matrix::zeros(fan_in, width));
            biases.push(Matrix::zeros(1, width));
            activations.push(Matrix::zeros(1, width));
        }

        debug!(?architecture, "allocated network");
        Network { weights, biases, activations }
    }

    /// Fresh zeroed network with the same architecture as `self`.
    pub fn alloc_like(&self) -> Network {
        Network::alloc(&self.architecture())
    }

    pub fn is_released(&self) -> bool {
        self.activations.is_empty()
    }

    pub(crate) fn ensure_live(&self) {
        contract!(!self.is_released(), ContractViolation::Released);
    }

    /// Frees every buffer and leaves the network in a released state.
    /// Releasing twice, or using the network afterwards, is a contract
    /// violation.
    pub fn release(&mut self) {
        self.ensure_live();
        self.weights = Vec::new();
        self.biases = Vec::new();
        self.activations = Vec::new();
    }

    pub fn architecture(&self) -> Vec<usize> {
        self.ensure_live();
        self.activations.iter().map(Matrix::cols).collect()
    }

    pub fn layer_count(&self) -> usize {
        self.ensure_live();
        self.weights.len()
    }

    pub fn input_width(&self) -> usize {
        self.input().cols()
    }

    pub fn output_width(&self) -> usize {
        self.output().cols()
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.ensure_live();
        self.weights
            .iter()
            .chain(&self.biases)
            .map(|m| m.rows() * m.cols())
            .sum()
    }

    pub fn weights(&self, layer: usize) -> &Matrix {
        self.params(layer, ParamKind::Weights)
    }

    pub fn biases(&self, layer: usize) -> &Matrix {
        self.params(layer, ParamKind::Biases)
    }

    /// Post-activation row `i`; `0` is the input, `layer_count()` the output.
    pub fn activation(&self, i: usize) -> &Matrix {
        self.ensure_live();
        contract!(
            i < self.activations.len(),
            ContractViolation::OutOfBounds { op: "activation", index: i, len: self.activations.len() }
        );
        &self.activations[i]
    }

    pub fn params(&self, layer: usize, kind: ParamKind) -> &Matrix {
        self.ensure_live();
        contract!(
            layer < self.weights.len(),
            ContractViolation::OutOfBounds { op: "params", index: layer, len: self.weights.len() }
        );
        match kind {
            ParamKind::Weights => &self.weights[layer],
            ParamKind::Biases => &self.biases[layer],
        }
    }

    pub(crate) fn params_mut(&mut self, layer: usize, kind: ParamKind) -> &mut Matrix {
        self.ensure_live();
        contract!(
            layer < self.weights.len(),
            ContractViolation::OutOfBounds { op: "params", index: layer, len: self.weights.len() }
        );
        match kind {
            ParamKind::Weights => &mut self.weights[layer],
            ParamKind::Biases => &mut self.biases[layer],
        }
    }

    /// Every parameter matrix in layer order, weights before biases.
    pub(crate) fn param_matrices_mut(&mut self) -> impl Iterator<Item = &mut Matrix> {
        self.ensure_live();
        self.weights
            .iter_mut()
            .zip(self.biases.iter_mut())
            .flat_map(|(w, b)| [w, b])
    }

    pub(crate) fn param_matrices(&self) -> impl Iterator<Item = &Matrix> {
        self.ensure_live();
        self.weights
            .iter()
            .zip(self.biases.iter())
            .flat_map(|(w, b)| [w, b])
    }

    /// Panics unless `other` was allocated from the same architecture.
    pub(crate) fn check_paired(&self, other: &Network) {
        let (net, grad) = (self.architecture(), other.architecture());
        contract!(net == grad, ContractViolation::ArchitectureMismatch { net, grad });
    }

    /// Sets every weight and bias to a uniform sample from `[low, high)`.
    pub fn randomise<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) {
        for m in self.param_matrices_mut() {
            m.randomise(rng, low, high);
        }
    }

    pub(crate) fn zero(&mut self) {
        for m in self.param_matrices_mut() {
            m.fill(0.0);
        }
    }

    pub fn input(&self) -> &Matrix {
        self.activation(0)
    }

    /// The input buffer. Write a row here, then call [`Network::forward`].
    pub fn input_mut(&mut self) -> &mut Matrix {
        self.ensure_live();
        &mut self.activations[0]
    }

    pub fn output(&self) -> &Matrix {
        self.ensure_live();
        &self.activations[self.activations.len() - 1]
    }

    /// Propagates the input buffer through every layer, overwriting all
    /// intermediate activations.
    pub fn forward(&mut self) {
        self.ensure_live();
        for i in 0..self.weights.len() {
            let (prev, next) = self.activations.split_at_mut(i + 1);
            let out = &mut next[0];
            out.multiply(&prev[i], &self.weights[i]);
            out.add(&self.biases[i]);
            out.sigmoid();
        }
    }

    /// Writes `input` into the input buffer, runs [`Network::forward`] and
    /// returns the output row.
    pub fn predict(&mut self, input: &[f64]) -> &[f64] {
        let buf = self.input_mut().row_slice_mut(0);
        contract!(
            buf.len() == input.len(),
            ContractViolation::ShapeMismatch { op: "predict", left: (1, buf.len()), right: (1, input.len()) }
        );
        buf.copy_from_slice(input);
        self.forward();
        self.output().row_slice(0)
    }

    /// Serializes architecture, weights and biases to a pretty-printed JSON
    /// file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let saved = SavedNetwork {
            architecture: self.architecture(),
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        };
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &saved)?;
        info!(path, parameters = self.parameter_count(), "saved network");
        Ok(())
    }

    /// Loads a network written by [`Network::save_json`]. Activations are
    /// rebuilt from the architecture.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let saved: SavedNetwork = serde_json::from_reader(reader)?;
        let net = saved.into_network()?;
        info!(path, architecture = ?net.architecture(), "loaded network");
        Ok(net)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_released() {
            return write!(f, "<released network>");
        }
        for (i, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            writeln!(f, "ws{i} = {w}")?;
            writeln!(f, "bs{i} = {b}")?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SavedNetwork {
    architecture: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

impl SavedNetwork {
    fn into_network(self) -> Result<Network> {
        let arch = Architecture::new(self.architecture)
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        let layer_count = arch.layer_count();
        if self.weights.len() != layer_count || self.biases.len() != layer_count {
            return Err(Error::InvalidData(format!(
                "architecture {arch} needs {layer_count} layers, file has {} weight and {} bias matrices",
                self.weights.len(),
                self.biases.len()
            )));
        }

        let mut net = Network::alloc(arch.widths());
        for (layer, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            for (kind, src) in [(ParamKind::Weights, w), (ParamKind::Biases, b)] {
                let dest = net.params_mut(layer, kind);
                if dest.shape() != src.shape() {
                    return Err(Error::InvalidData(format!(
                        "layer {layer} {kind:?}: expected {:?}, found {:?}",
                        dest.shape(),
                        src.shape()
                    )));
                }
                dest.copy_from(src);
            }
        }
        Ok(net)
    }
}
