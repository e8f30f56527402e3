use anyhow::{Context, Result};
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

const IMAGE_SIZE: u32 = 28;
const NUM_CLASSES: usize = 10;

/// Result of classifying one drawn digit.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub digit: usize,
    /// Class probabilities for digits 0 through 9, summing to 1.
    pub probabilities: Vec<f32>,
}

/// Handwritten-digit classifier backed by an ONNX export of a small
/// MNIST convolutional network.
pub struct DigitClassifier {
    session: Mutex<Session>,
    input_name: String,
}

impl DigitClassifier {
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load ONNX model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .context("Model has no inputs")?;

        info!(model = %model_path.display(), input = %input_name, "digit classifier loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Classifies a PNG or similar encoded image of a drawn digit.
    pub fn predict(&self, image_bytes: &[u8]) -> Result<Prediction> {
        let input = preprocess(image_bytes)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Classifier session lock poisoned"))?;

        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => Value::from_array(input)?
        ])?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        let scores: Vec<f32> = output.iter().copied().collect();

        if scores.len() != NUM_CLASSES {
            anyhow::bail!(
                "Model produced {} scores, expected {}",
                scores.len(),
                NUM_CLASSES
            );
        }

        let probabilities = normalize_probabilities(&scores);
        let digit = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);

        Ok(Prediction {
            digit,
            probabilities,
        })
    }
}

/// Decodes the image, scales it to 28x28 grayscale and maps pixel
/// values into [0, 1], shaped as the network expects: (1, 28, 28, 1).
fn preprocess(image_bytes: &[u8]) -> Result<Array4<f32>> {
    let image = image::load_from_memory(image_bytes).context("Failed to decode image")?;
    let gray = image
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Lanczos3)
        .to_luma8();

    let mut input = Array4::<f32>::zeros((1, IMAGE_SIZE as usize, IMAGE_SIZE as usize, 1));
    for (x, y, pixel) in gray.enumerate_pixels() {
        input[[0, y as usize, x as usize, 0]] = pixel.0[0] as f32 / 255.0;
    }

    Ok(input)
}

/// Passes through an already valid probability distribution, otherwise
/// applies softmax. Lets the same code serve models exported with or
/// without a final softmax layer.
fn normalize_probabilities(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    let all_non_negative = scores.iter().all(|&s| s >= 0.0);
    if all_non_negative && (sum - 1.0).abs() < 1e-3 {
        return scores.to_vec();
    }

    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn should_pass_through_valid_distribution() {
        let scores = vec![0.1, 0.0, 0.0, 0.0, 0.0, 0.9, 0.0, 0.0, 0.0, 0.0];

        let probabilities = normalize_probabilities(&scores);

        assert_eq!(probabilities, scores);
    }

    #[test]
    fn should_softmax_raw_logits() {
        let scores = vec![2.0, -1.0, 0.5, 0.0, 1.0, -2.0, 0.0, 3.0, -0.5, 0.25];

        let probabilities = normalize_probabilities(&scores);

        let sum: f32 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probabilities.iter().all(|&p| p > 0.0));
        let argmax = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(argmax, 7);
    }

    #[test]
    fn should_preprocess_image_to_unit_range() {
        let mut image = image::GrayImage::new(100, 100);
        image.put_pixel(50, 50, image::Luma([255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let input = preprocess(&bytes).unwrap();

        assert_eq!(input.shape(), &[1, 28, 28, 1]);
        assert!(input.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn should_reject_invalid_image_bytes() {
        assert!(preprocess(b"not an image").is_err());
    }

    #[test]
    fn should_fail_to_load_missing_model() {
        let result = DigitClassifier::load(Path::new("/non/existent/model.onnx"));

        assert!(result.is_err());
    }
}
