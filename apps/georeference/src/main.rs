use argh::FromArgs;
use serde::Serialize;
use std::path::PathBuf;

use georef::io::{csv, pipeline, report};
use georef::transform::{self, ControlPointSet, TransformError, TransformModel, TransformResult};

#[derive(FromArgs)]
/// Compute georeferencing transformations of a point cloud from control points
struct Args {
    /// path to the control point CSV with columns Name, E, N, H, X, Y, Z
    #[argh(option)]
    gcp_path: PathBuf,

    /// name of a control point to leave out of the fit, may be repeated
    #[argh(option)]
    exclude: Vec<String>,

    /// transformation model: translation_only (tr), 2d_conformal (2d) or 3d_affine (3d).
    /// All models are computed when omitted.
    #[argh(option)]
    model: Option<TransformModel>,

    /// export the CSV report of the selected model to this path
    #[argh(option)]
    export_csv: Option<PathBuf>,

    /// point cloud to transform with the selected model, a PDAL pipeline is written for it
    #[argh(option)]
    input_cloud: Option<PathBuf>,

    /// path of the PDAL pipeline JSON, next to the output cloud by default
    #[argh(option)]
    pipeline_path: Option<PathBuf>,

    /// print the results as JSON instead of text reports
    #[argh(switch)]
    json: bool,
}

#[derive(Serialize)]
struct ModelOutput<'a> {
    model: TransformModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a TransformResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let table = csv::read_control_points(&args.gcp_path)?;
    if !table.rejected.is_empty() {
        eprintln!(
            "Skipped {} invalid control point rows (lines {:?})",
            table.rejected.len(),
            table.rejected.iter().map(|r| r.line).collect::<Vec<_>>()
        );
    }

    let points = table.points.excluding(&args.exclude);
    if points.is_empty() {
        return Err("At least one point must be selected.".into());
    }
    log::info!(
        "Using {} of {} control points",
        points.len(),
        table.points.len()
    );

    let models = match args.model {
        Some(model) => vec![model],
        None => TransformModel::ALL.to_vec(),
    };
    let results = models
        .into_iter()
        .map(|model| (model, transform::estimate(model, &points)))
        .collect::<Vec<_>>();

    if args.json {
        print_json(&results)?;
    } else {
        print_reports(&results, &points);
    }

    if args.export_csv.is_none() && args.input_cloud.is_none() {
        return Ok(());
    }

    let Some(selected) = args.model else {
        return Err("--model is required with --export-csv or --input-cloud".into());
    };
    let result = match results.iter().find(|(m, _)| *m == selected) {
        Some((_, Ok(result))) => result,
        _ => {
            return Err(format!(
                "No valid matrix for '{}'. Please ensure calculation succeeded.",
                selected.name()
            )
            .into())
        }
    };

    if let Some(path) = &args.export_csv {
        report::export_csv_report(path, result, &points)?;
        println!("Results exported to: {}", path.display());
    }

    if let Some(input_cloud) = &args.input_cloud {
        if !input_cloud.is_file() {
            return Err("Please select a valid input point cloud file.".into());
        }
        let output =
            pipeline::laz_output_filename(input_cloud, &format!("_{}", selected.abbreviation()));
        let pipeline_path = args
            .pipeline_path
            .clone()
            .unwrap_or_else(|| output.with_extension("json"));

        let stages = pipeline::build_transform_pipeline(input_cloud, &output, result);
        pipeline::write_pipeline(&pipeline_path, &stages)?;

        println!("Input: {}", input_cloud.display());
        println!("Output: {}", output.display());
        println!("Run: pdal pipeline {}", pipeline_path.display());
    }

    Ok(())
}

fn print_reports(
    results: &[(TransformModel, Result<TransformResult, TransformError>)],
    points: &ControlPointSet,
) {
    for (model, result) in results {
        println!("=== {} ===", model.title());
        match result {
            Ok(result) => println!("{}", report::format_report(result, points)),
            Err(e) => println!("Could not perform {} calculation.\n\nError: {}", model.title(), e),
        }
        println!();
    }
}

fn print_json(
    results: &[(TransformModel, Result<TransformResult, TransformError>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let outputs = results
        .iter()
        .map(|(model, result)| ModelOutput {
            model: *model,
            result: result.as_ref().ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        })
        .collect::<Vec<_>>();
    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}
