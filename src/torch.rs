//! Code for loading and running the trained PyTorch classifier.
//!
//! The checkpoint is expected as a TorchScript export of the network, so no
//! architecture code is needed on this side.

use crate::classifier::{ClassifyError, Model, StartupError};
use serde::Deserialize;
use std::path::Path;
use tch::{no_grad, Device, Kind, Tensor};
use tracing::info;

/// Where to run the model. Picked once at startup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    /// The first CUDA device if there is one, otherwise the CPU
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl DeviceChoice {
    pub fn resolve(self) -> Device {
        match self {
            DeviceChoice::Auto => Device::cuda_if_available(),
            DeviceChoice::Cpu => Device::Cpu,
            DeviceChoice::Cuda => Device::Cuda(0),
        }
    }
}

/// A TorchScript module in eval mode, pinned to one device
#[derive(Debug)]
pub struct TorchModel {
    /// The loaded torch model
    model: tch::CModule,
    device: Device,
}

impl TorchModel {
    #[tracing::instrument]
    pub fn load(path: &Path, device: Device) -> Result<Self, StartupError> {
        let mut model =
            tch::CModule::load_on_device(path, device).map_err(|source| StartupError::ModelLoad {
                path: path.to_path_buf(),
                source,
            })?;
        model.set_eval();

        info!("loaded TorchScript model");
        Ok(TorchModel { model, device })
    }
}

impl Model for TorchModel {
    fn forward(&self, input: &Tensor) -> Result<Vec<f32>, ClassifyError> {
        let input = input.to_device(self.device);
        let output = no_grad(|| self.model.forward_ts(&[input]))?;

        let scores = output
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .flatten(0, -1);
        Ok(Vec::<f32>::try_from(&scores)?)
    }
}
