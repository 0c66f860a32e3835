//! Decoding uploaded images and turning them into model input tensors.
//!
//! The steps here have to reproduce the transforms the classifier was trained
//! with: an exact (distorting) resize to 224x224, scaling to [0, 1] and
//! per-channel normalization with the ImageNet statistics.

use crate::classifier::ClassifyError;
use crate::config::{CHANNELS, IMAGE_SIZE, MEAN, STD};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tch::Tensor;

/// Decode an encoded image (JPEG, PNG, ...) into an 8-bit RGB pixel grid.
/// Grayscale, palette and 16-bit sources are expanded, alpha is dropped.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, ClassifyError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

/// Resize, scale and normalize a decoded image into a `[1, 3, 224, 224]`
/// float tensor laid out channel-first.
pub fn preprocess(image: &RgbImage) -> Result<Tensor, ClassifyError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ClassifyError::Processing(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let resized = imageops::resize(image, IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle);

    let side = IMAGE_SIZE as usize;
    let plane = side * side;
    let mut data = vec![0f32; CHANNELS * plane];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = y as usize * side + x as usize;
        for c in 0..CHANNELS {
            let value = f32::from(pixel[c]) / 255.0;
            data[c * plane + offset] = (value - MEAN[c]) / STD[c];
        }
    }

    let side = side as i64;
    Ok(Tensor::from_slice(&data).view([1, CHANNELS as i64, side, side]))
}

/// Decode and preprocess in one step
pub fn load(bytes: &[u8]) -> Result<Tensor, ClassifyError> {
    preprocess(&decode(bytes)?)
}
