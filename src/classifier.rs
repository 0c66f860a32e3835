//! The inference executor: runs a forward pass over a preprocessed image and
//! maps the highest score to a class label

use crate::config::{CHANNELS, IMAGE_SIZE};
use crate::vision;
use std::fmt::Debug;
use std::path::PathBuf;
use tch::{Device, Kind, Tensor};
use thiserror::Error;
use tracing::debug;

/// Why a single image could not be classified
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The uploaded bytes are not an image we can read
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Preprocessing or the forward pass failed
    #[error("{0}")]
    Processing(String),
}

impl From<tch::TchError> for ClassifyError {
    fn from(err: tch::TchError) -> Self {
        ClassifyError::Processing(err.to_string())
    }
}

/// Errors that keep the service from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load model from {path:?}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: tch::TchError,
    },

    #[error("the class label table is empty")]
    NoLabels,

    #[error("model produces {outputs} scores but {labels} class labels are configured")]
    ClassCountMismatch { outputs: usize, labels: usize },

    #[error("model failed on a warm-up input: {0}")]
    WarmUp(#[source] ClassifyError),
}

/// A loaded, read-only classification network
pub trait Model: Debug + Send + Sync {
    /// Run one forward pass over a `[1, 3, 224, 224]` input and return the
    /// raw score (logit) of every class
    fn forward(&self, input: &Tensor) -> Result<Vec<f32>, ClassifyError>;
}

/// A model paired with the labels of its outputs
#[derive(Debug)]
pub struct Classifier {
    model: Box<dyn Model>,
    labels: Vec<String>,
}

impl Classifier {
    /// Pair `model` with `labels`. Runs one forward pass over a blank input
    /// to check that the model emits exactly one score per label.
    pub fn new(model: Box<dyn Model>, labels: Vec<String>) -> Result<Self, StartupError> {
        if labels.is_empty() {
            return Err(StartupError::NoLabels);
        }

        let side = IMAGE_SIZE as i64;
        let blank = Tensor::zeros(
            [1, CHANNELS as i64, side, side],
            (Kind::Float, Device::Cpu),
        );
        let outputs = model.forward(&blank).map_err(StartupError::WarmUp)?.len();
        if outputs != labels.len() {
            return Err(StartupError::ClassCountMismatch {
                outputs,
                labels: labels.len(),
            });
        }

        Ok(Classifier { model, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify an encoded image
    pub fn classify(&self, image: &[u8]) -> Result<&str, ClassifyError> {
        let input = vision::load(image)?;
        self.predict(&input)
    }

    /// Classify an already preprocessed input tensor
    pub fn predict(&self, input: &Tensor) -> Result<&str, ClassifyError> {
        let scores = self.model.forward(input)?;
        if scores.len() != self.labels.len() {
            return Err(ClassifyError::Processing(format!(
                "model returned {} scores, expected {}",
                scores.len(),
                self.labels.len()
            )));
        }

        let index = argmax(&scores).ok_or_else(|| {
            ClassifyError::Processing("model returned no comparable scores".into())
        })?;
        debug!(?scores, index, "forward pass finished");

        Ok(&self.labels[index])
    }
}

/// Index of the largest score. Ties go to the lowest index and NaN never
/// wins; `None` if there is nothing to compare.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
