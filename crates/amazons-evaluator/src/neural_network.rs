//! Feedforward neural network with tanh activations.
//!
//! The network is a stack of fully connected layers: one input layer,
//! `hidden_count` hidden layers of `hidden_size` nodes and one output layer.
//! Each destination node owns a row of weights, one per source node plus a
//! trailing bias weight applied to a constant input of `1.0`:
//!
//! ```text
//! node = tanh(w₀·x₀ + w₁·x₁ + … + wₙ₋₁·xₙ₋₁ + wₙ·1)
//! ```
//!
//! # Training
//!
//! [`NeuralNetwork::train`] performs one step of online backpropagation on a
//! single sample. The output delta is `target - output`; every delta is
//! scaled by the tanh derivative `1 - value²`, then propagated to the source
//! layer through the weights as they were before this step's update.
//!
//! # File Format
//!
//! Weights are written layer by layer, destination node by destination node,
//! each as a 4-byte big-endian IEEE-754 float. There is no header: the reader
//! supplies the [`Topology`] and the byte length must match it exactly.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    iter,
    path::Path,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board_feature::FEATURE_COUNT;

const WEIGHT_BYTES: usize = 4;

/// Failure to evaluate, train, or load a network.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum NetworkError {
    /// Input or target vector has the wrong length for the network.
    #[display("expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Weight file does not hold exactly the weights the topology needs.
    #[display("weight file of {byte_len} bytes does not hold {expected_weights} weights")]
    CorruptOrIncompatibleFile {
        byte_len: usize,
        expected_weights: usize,
    },
    #[display("weight file I/O failed: {_0}")]
    #[from]
    Io(io::Error),
}

/// Where [`NeuralNetwork::load_or_initialize`] got its weights from.
#[derive(Debug, derive_more::IsVariant)]
pub enum WeightOrigin {
    Loaded,
    /// No file existed; fresh weights were saved.
    Created,
    /// The file did not fit the topology and was overwritten with fresh
    /// weights.
    Replaced(NetworkError),
}

/// Layer sizes of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub input_size: usize,
    pub hidden_size: usize,
    pub hidden_count: usize,
    pub output_size: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            input_size: FEATURE_COUNT,
            hidden_size: 5,
            hidden_count: 1,
            output_size: 1,
        }
    }
}

impl Topology {
    /// Node count of every layer, input first.
    pub fn layer_sizes(&self) -> impl Iterator<Item = usize> + use<> {
        iter::once(self.input_size)
            .chain(iter::repeat_n(self.hidden_size, self.hidden_count))
            .chain(iter::once(self.output_size))
    }

    /// Total number of weights, bias weights included.
    #[must_use]
    pub fn weight_count(&self) -> usize {
        let sizes = self.layer_sizes().collect::<Vec<_>>();
        sizes
            .windows(2)
            .map(|pair| (pair[0] + 1) * pair[1])
            .sum()
    }
}

/// Weights between two adjacent layers, stored row by row.
#[derive(Debug, Clone, PartialEq)]
struct WeightLayer {
    input_size: usize,
    weights: Vec<f32>,
}

impl WeightLayer {
    fn row_len(&self) -> usize {
        self.input_size + 1
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.weights.chunks_exact(self.row_len())
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let row_len = self.row_len();
        self.weights.chunks_exact_mut(row_len)
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.rows()
            .map(|row| {
                let (weights, bias) = row.split_at(self.input_size);
                let sum = iter::zip(weights, input).map(|(w, x)| w * x).sum::<f32>() + bias[0];
                sum.tanh()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    topology: Topology,
    layers: Vec<WeightLayer>,
}

impl NeuralNetwork {
    /// Creates a network with weights drawn uniformly from
    /// `[-1, 1] / sqrt(row length)`.
    pub fn random<R>(topology: Topology, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        #[expect(clippy::cast_precision_loss)]
        let mut next = |row_len: usize| rng.random_range(-1.0..=1.0) / (row_len as f32).sqrt();
        let layers = layer_shapes(topology)
            .map(|(input_size, output_size)| WeightLayer {
                input_size,
                weights: (0..(input_size + 1) * output_size)
                    .map(|_| next(input_size + 1))
                    .collect(),
            })
            .collect();
        Self { topology, layers }
    }

    /// Creates a network from weights in file order.
    pub fn from_weights(topology: Topology, weights: &[f32]) -> Result<Self, NetworkError> {
        let expected = topology.weight_count();
        if weights.len() != expected {
            return Err(NetworkError::DimensionMismatch {
                expected,
                actual: weights.len(),
            });
        }
        let mut rest = weights;
        let layers = layer_shapes(topology)
            .map(|(input_size, output_size)| {
                let (head, tail) = rest.split_at((input_size + 1) * output_size);
                rest = tail;
                WeightLayer {
                    input_size,
                    weights: head.to_vec(),
                }
            })
            .collect();
        Ok(Self { topology, layers })
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// All weights in file order.
    pub fn weights(&self) -> impl Iterator<Item = f32> + '_ {
        self.layers.iter().flat_map(|layer| layer.weights.iter().copied())
    }

    /// Computes the output layer for `input`.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NetworkError> {
        let mut activations = self.activations(input)?;
        Ok(activations.pop().unwrap_or_default())
    }

    /// Runs one backpropagation step and returns the root-mean-square output
    /// error measured before the update.
    ///
    /// Nothing is modified when `input` or `target` has the wrong length.
    pub fn train(
        &mut self,
        input: &[f32],
        target: &[f32],
        learning_rate: f32,
    ) -> Result<f32, NetworkError> {
        if target.len() != self.topology.output_size {
            return Err(NetworkError::DimensionMismatch {
                expected: self.topology.output_size,
                actual: target.len(),
            });
        }
        let activations = self.activations(input)?;
        let output = &activations[activations.len() - 1];

        let mut deltas = iter::zip(target, output)
            .map(|(t, o)| t - o)
            .collect::<Vec<_>>();
        let squared_error = deltas.iter().map(|d| d * d).sum::<f32>();

        for (layer, pair) in iter::zip(&mut self.layers, activations.windows(2)).rev() {
            let (source, destination) = (&pair[0], &pair[1]);
            for (delta, value) in iter::zip(&mut deltas, destination) {
                *delta *= 1.0 - value * value;
            }
            let mut upstream = vec![0.0; source.len()];
            for (row, delta) in iter::zip(layer.rows_mut(), &deltas) {
                for (k, weight) in row.iter_mut().enumerate() {
                    let activation = match source.get(k) {
                        Some(value) => {
                            upstream[k] += *weight * delta;
                            *value
                        }
                        None => 1.0,
                    };
                    *weight += learning_rate * activation * delta;
                }
            }
            deltas = upstream;
        }

        #[expect(clippy::cast_precision_loss)]
        let mean = squared_error / output.len() as f32;
        Ok(mean.sqrt())
    }

    fn activations(&self, input: &[f32]) -> Result<Vec<Vec<f32>>, NetworkError> {
        if input.len() != self.topology.input_size {
            return Err(NetworkError::DimensionMismatch {
                expected: self.topology.input_size,
                actual: input.len(),
            });
        }
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.to_vec());
        for layer in &self.layers {
            let next = layer.forward(&activations[activations.len() - 1]);
            activations.push(next);
        }
        Ok(activations)
    }

    /// Writes the weights in the raw big-endian format.
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        for weight in self.weights() {
            writer.write_all(&weight.to_be_bytes())?;
        }
        Ok(())
    }

    /// Reads weights written by [`write_to`](Self::write_to) for `topology`.
    pub fn read_from<R>(reader: &mut R, topology: Topology) -> Result<Self, NetworkError>
    where
        R: Read + ?Sized,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let expected_weights = topology.weight_count();
        if bytes.len() % WEIGHT_BYTES != 0 || bytes.len() / WEIGHT_BYTES != expected_weights {
            return Err(NetworkError::CorruptOrIncompatibleFile {
                byte_len: bytes.len(),
                expected_weights,
            });
        }
        let weights = bytes
            .chunks_exact(WEIGHT_BYTES)
            .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect::<Vec<_>>();
        Self::from_weights(topology, &weights)
    }

    pub fn save<P>(&self, path: P) -> Result<(), NetworkError>
    where
        P: AsRef<Path>,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P>(path: P, topology: Topology) -> Result<Self, NetworkError>
    where
        P: AsRef<Path>,
    {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, topology)
    }

    /// Loads the network at `path`, or starts over with random weights.
    ///
    /// A missing or mismatched file is replaced by freshly initialized
    /// weights, which are saved to `path` right away. Other I/O failures are
    /// returned.
    pub fn load_or_initialize<P, R>(
        path: P,
        topology: Topology,
        rng: &mut R,
    ) -> Result<(Self, WeightOrigin), NetworkError>
    where
        P: AsRef<Path>,
        R: Rng + ?Sized,
    {
        let path = path.as_ref();
        let origin = match Self::load(path, topology) {
            Ok(network) => return Ok((network, WeightOrigin::Loaded)),
            Err(NetworkError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                WeightOrigin::Created
            }
            Err(e @ NetworkError::CorruptOrIncompatibleFile { .. }) => WeightOrigin::Replaced(e),
            Err(e) => return Err(e),
        };
        let network = Self::random(topology, rng);
        network.save(path)?;
        Ok((network, origin))
    }
}

fn layer_shapes(topology: Topology) -> impl Iterator<Item = (usize, usize)> {
    let sizes = topology.layer_sizes().collect::<Vec<_>>();
    (1..sizes.len()).map(move |i| (sizes[i - 1], sizes[i]))
}
