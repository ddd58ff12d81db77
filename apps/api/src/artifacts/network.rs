//! Feed-forward classifier restored from exported dense-layer weights.
//!
//! Kernels use the `(input_dim, units)` layout of the training framework's
//! weight export. Dropout layers are training-only and never appear here.
//! The final layer must produce a single unit, read as the fraud probability.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::{read_json, ArtifactError, FeatureVector, ModelError, ProbabilityModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LayerArtifact {
    kernel: Vec<Vec<f32>>,
    bias: Vec<f32>,
    activation: Activation,
}

#[derive(Debug, Deserialize)]
struct NetworkArtifact {
    layers: Vec<LayerArtifact>,
}

/// One dense layer; `kernel` is stored row-major, `input_dim * units` long.
#[derive(Debug, Clone)]
struct DenseLayer {
    input_dim: usize,
    units: usize,
    kernel: Vec<f32>,
    bias: Vec<f32>,
    activation: Activation,
}

impl DenseLayer {
    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out = self.bias.clone();
        // TF-IDF rows are mostly zeros; skip them.
        for (i, &x) in input.iter().enumerate().filter(|(_, x)| **x != 0.0) {
            let row = &self.kernel[i * self.units..(i + 1) * self.units];
            for (o, w) in out.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        out.into_iter().map(|v| self.activation.apply(v)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_artifact(read_json::<NetworkArtifact>(path)?)
    }

    #[cfg(test)]
    pub(crate) fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: NetworkArtifact = serde_json::from_str(json)
            .map_err(|e| ArtifactError::Invalid(format!("network JSON: {e}")))?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: NetworkArtifact) -> Result<Self, ArtifactError> {
        if artifact.layers.is_empty() {
            return Err(ArtifactError::Invalid("network has no layers".to_string()));
        }

        let mut layers = Vec::with_capacity(artifact.layers.len());
        for (n, layer) in artifact.layers.into_iter().enumerate() {
            let input_dim = layer.kernel.len();
            let units = layer.bias.len();
            if input_dim == 0 || units == 0 {
                return Err(ArtifactError::Invalid(format!("layer {n} has an empty kernel or bias")));
            }
            if let Some(row) = layer.kernel.iter().position(|r| r.len() != units) {
                return Err(ArtifactError::Invalid(format!(
                    "layer {n}: kernel row {row} has {} columns, expected {units}",
                    layer.kernel[row].len()
                )));
            }
            if let Some(prev) = layers.last().map(|l: &DenseLayer| l.units) {
                if prev != input_dim {
                    return Err(ArtifactError::Invalid(format!(
                        "layer {n} expects {input_dim} inputs but layer {} produces {prev}",
                        n - 1
                    )));
                }
            }
            layers.push(DenseLayer {
                input_dim,
                units,
                kernel: layer.kernel.into_iter().flatten().collect(),
                bias: layer.bias,
                activation: layer.activation,
            });
        }

        let output_units = layers.last().map_or(0, |l| l.units);
        if output_units != 1 {
            return Err(ArtifactError::Invalid(format!(
                "output layer has {output_units} units, expected 1"
            )));
        }

        Ok(Self { layers })
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].input_dim
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn forward(&self, features: &FeatureVector) -> Result<f32, ModelError> {
        if features.dimension() != self.input_dim() {
            return Err(ModelError::DimensionMismatch {
                expected: self.input_dim(),
                actual: features.dimension(),
            });
        }
        let output = self
            .layers
            .iter()
            .fold(features.as_slice().to_vec(), |activations, layer| layer.forward(&activations));
        Ok(output[0])
    }
}

#[async_trait]
impl ProbabilityModel for DenseNetwork {
    fn input_dimension(&self) -> Option<usize> {
        Some(self.input_dim())
    }

    async fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.forward(features).map(f64::from)
    }

    fn backend(&self) -> &'static str {
        "dense"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[tokio::test]
    async fn test_logistic_layer() {
        // sigmoid(0.5*1 + 1.5*0 - 0.5) = sigmoid(0) = 0.5
        let net = DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[0.5], [1.5]], "bias": [-0.5], "activation": "sigmoid"}]}"#,
        )
        .unwrap();
        let p = net.predict_proba(&FeatureVector::new(vec![1.0, 0.0])).await.unwrap();
        assert!(approx(p, 0.5));
    }

    #[tokio::test]
    async fn test_hidden_relu_layer() {
        // hidden = relu([1*1 + 0*-1, 1*-1 + 0*1]) = [1, 0]
        // out = sigmoid(2*1 + 3*0 + 0) = sigmoid(2)
        let net = DenseNetwork::from_json(
            r#"{"layers": [
                {"kernel": [[1.0, -1.0], [-1.0, 1.0]], "bias": [0.0, 0.0], "activation": "relu"},
                {"kernel": [[2.0], [3.0]], "bias": [0.0], "activation": "sigmoid"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(net.layer_count(), 2);
        assert_eq!(net.input_dim(), 2);
        let p = net.predict_proba(&FeatureVector::new(vec![1.0, 0.0])).await.unwrap();
        let expected = 1.0 / (1.0 + (-2.0_f64).exp());
        assert!(approx(p, expected), "got {p}");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_error() {
        let net = DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[1.0], [1.0]], "bias": [0.0], "activation": "sigmoid"}]}"#,
        )
        .unwrap();
        let err = net
            .predict_proba(&FeatureVector::new(vec![1.0, 0.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_rejects_empty_network() {
        assert!(DenseNetwork::from_json(r#"{"layers": []}"#).is_err());
    }

    #[test]
    fn test_rejects_ragged_kernel() {
        let err = DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[1.0, 2.0], [1.0]], "bias": [0.0, 0.0], "activation": "relu"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("kernel row 1"));
    }

    #[test]
    fn test_rejects_unchained_layers() {
        let err = DenseNetwork::from_json(
            r#"{"layers": [
                {"kernel": [[1.0, 1.0]], "bias": [0.0, 0.0], "activation": "relu"},
                {"kernel": [[1.0], [1.0], [1.0]], "bias": [0.0], "activation": "sigmoid"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("layer 1 expects 3 inputs"));
    }

    #[test]
    fn test_rejects_multi_unit_output() {
        let err = DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[1.0, 1.0]], "bias": [0.0, 0.0], "activation": "sigmoid"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn test_rejects_unknown_activation() {
        assert!(DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[1.0]], "bias": [0.0], "activation": "softplus"}]}"#,
        )
        .is_err());
    }

    #[test]
    fn test_activations() {
        assert_eq!(Activation::Relu.apply(-2.0), 0.0);
        assert_eq!(Activation::Linear.apply(-2.0), -2.0);
        assert!((Activation::Tanh.apply(0.5) - 0.5_f32.tanh()).abs() < 1e-7);
        assert!((Activation::Sigmoid.apply(0.0) - 0.5).abs() < 1e-7);
    }
}
