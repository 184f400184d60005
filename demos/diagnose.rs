//! Skin lesion diagnosis example using the derm-triage library.
//!
//! This example demonstrates how to run the full diagnosis pipeline on one
//! or more lesion photographs. It covers preprocessing, inference, triage
//! classification, and clinical record lookup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example diagnose -- \
//!     --model-path path/to/skin_disease_model.onnx \
//!     lesion1.jpg lesion2.png
//! ```
//!
//! Without a model artifact the pipeline falls back to the deterministic
//! placeholder backend:
//!
//! ```bash
//! cargo run --example diagnose -- --age 42 --location back lesion.jpg
//! ```
//!
//! To emit the full result as JSON:
//!
//! ```bash
//! cargo run --example diagnose -- --json lesion.jpg
//! ```

use clap::Parser;
use derm_triage::core::init_tracing;
use derm_triage::prelude::*;
use std::path::Path;
use tracing::{error, info, warn};

/// Command-line arguments for the diagnosis example.
#[derive(Parser)]
#[command(name = "diagnose")]
#[command(about = "Derm Triage Example - skin lesion classification and triage")]
struct Args {
    /// List of lesion image files to diagnose.
    ///
    /// At least one image file must be provided. The pipeline will process
    /// each image in sequence.
    #[arg(required = true)]
    images: Vec<String>,

    /// Path to the ONNX classification model file.
    ///
    /// When omitted or missing, the pipeline falls back to the deterministic
    /// placeholder backend so the example stays runnable end to end.
    #[arg(long)]
    model_path: Option<String>,

    /// Patient age in years, echoed back in the result.
    #[arg(long)]
    age: Option<u32>,

    /// Lesion location on the body (e.g. face, back, arms).
    #[arg(long)]
    location: Option<LesionLocation>,

    /// Print the full diagnosis result as pretty JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

/// Main function for the diagnosis example.
///
/// This function builds the pipeline from the provided arguments, diagnoses
/// each input image, and prints the results.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    init_tracing();

    // Parse command-line arguments
    let args = Args::parse();

    info!("Derm Triage Example");

    // Filter out non-existent image files and log errors for missing files
    let existing_images: Vec<String> = args
        .images
        .iter()
        .filter(|path| {
            let exists = Path::new(path).exists();
            if !exists {
                error!("Image file not found: {}", path);
            }
            exists
        })
        .cloned()
        .collect();

    // Exit early if no valid images were provided
    if existing_images.is_empty() {
        error!("No valid image files found");
        return Err("No valid image files found".into());
    }

    // Build the diagnosis pipeline
    let mut builder = DiagnosisPipeline::builder();
    if let Some(model_path) = args.model_path {
        builder = builder.model_path(model_path);
    }
    let pipeline = builder.build()?;

    if pipeline.is_placeholder() {
        warn!("No model artifact loaded, predictions come from the placeholder backend");
    }

    // Assemble the patient metadata shared by all requests
    let mut metadata = PatientMetadata::new();
    if let Some(age) = args.age {
        metadata = metadata.with_age(age);
    }
    if let Some(location) = args.location {
        metadata = metadata.with_lesion_location(location);
    }

    // Diagnose each image in sequence
    for (i, image_path) in existing_images.iter().enumerate() {
        info!(
            "Diagnosing image {} of {}: {}",
            i + 1,
            existing_images.len(),
            image_path
        );

        let bytes = std::fs::read(image_path)?;

        match pipeline.diagnose(&bytes, metadata.clone()) {
            Ok(outcome) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                    continue;
                }

                match outcome {
                    DiagnosisOutcome::Report(result) => {
                        info!("Diagnosis completed for {}!", image_path);
                        println!(
                            "{}: {} (confidence: {:.1}%)",
                            image_path,
                            result.predicted_class,
                            result.confidence * 100.0
                        );
                        println!("  Triage: {} - {}", result.triage.level, result.triage.message);
                        println!("  Severity: {}", result.clinical_details.severity);
                        for (class, probability) in result.class_probabilities.iter() {
                            println!("    {}: {:.1}%", class, probability * 100.0);
                        }
                    }
                    DiagnosisOutcome::LowConfidence(report) => {
                        warn!(
                            "Low confidence result for {} ({:.1}%)",
                            image_path,
                            report.confidence * 100.0
                        );
                        println!("{}: {} {}", image_path, report.message, report.suggestion);
                    }
                }
            }
            Err(e) => {
                error!("Diagnosis failed for {}: {}", image_path, e);
                continue;
            }
        }
    }

    info!("Example completed!");
    Ok(())
}
