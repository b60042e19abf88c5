use crate::error::PipelineError;
use image::{DynamicImage, ImageReader, Rgb, RgbImage, imageops::FilterType};
use std::path::Path;

/// Spatial size expected by the classifier (square input).
pub const INPUT_SIZE: u32 = 224;

/// Channel depth expected by the classifier.
pub const CHANNELS: usize = 3;

/// A single preprocessed image laid out as NHWC with a batch of one.
///
/// Values are row-major in `[0.0, 1.0]`; `shape` is `[1, height, width, 3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    shape: [usize; 4],
}

impl InputTensor {
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// RGB values of the pixel at row `y`, column `x`.
    pub fn pixel(&self, y: usize, x: usize) -> Option<[f32; 3]> {
        let [_, height, width, _] = self.shape;
        if y >= height || x >= width {
            return None;
        }
        let idx = (y * width + x) * CHANNELS;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }
}

/// Opens and decodes an image file. The format is sniffed from the content,
/// so a PNG saved under a `.jpg` name still loads.
pub fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    let decode = || -> Result<DynamicImage, image::ImageError> {
        Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
    };
    decode().map_err(|source| PipelineError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes `path` and normalizes it to the classifier input.
pub fn preprocess_path(path: &Path) -> Result<InputTensor, PipelineError> {
    let image = load_image(path)?;
    Ok(preprocess(&image))
}

/// Normalizes an image to a `(1, 224, 224, 3)` tensor in `[0, 1]`.
pub fn preprocess(image: &DynamicImage) -> InputTensor {
    preprocess_with_size(image, INPUT_SIZE, INPUT_SIZE)
}

/// Same as [`preprocess`] with an explicit target size.
///
/// Steps, in order:
/// 1. resize to exactly `width x height` (bicubic, Catmull-Rom) in the source color type;
/// 2. bring the channel count to 3 (gray is replicated, alpha is dropped);
/// 3. divide every 8-bit sample by 255;
/// 4. prepend a batch dimension of one.
pub fn preprocess_with_size(image: &DynamicImage, width: u32, height: u32) -> InputTensor {
    let resized = if image.width() == width && image.height() == height {
        image.clone()
    } else {
        image.resize_exact(width, height, FilterType::CatmullRom)
    };

    let rgb = to_three_channels(resized);
    let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for pixel in rgb.pixels() {
        for c in 0..CHANNELS {
            data.push(pixel[c] as f32 / 255.0);
        }
    }

    InputTensor {
        data,
        shape: [1, height as usize, width as usize, CHANNELS],
    }
}

fn to_three_channels(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => {
            let luma = image.to_luma8();
            RgbImage::from_fn(luma.width(), luma.height(), |x, y| {
                let v = luma.get_pixel(x, y)[0];
                Rgb([v, v, v])
            })
        }
        // RGBA keeps the first three channels; 16-bit and float inputs are narrowed to 8 bits.
        other => other.to_rgb8(),
    }
}
