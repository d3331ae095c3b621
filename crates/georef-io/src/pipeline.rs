use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use georef_transform::TransformResult;
use serde_json::{json, Value};

use crate::GeorefIoError;

/// Scale of the LAS writer coordinates, in metres.
const LAS_SCALE: f64 = 0.001;

/// Build a PDAL pipeline that applies a transformation to a point cloud.
///
/// The pipeline reads `input` with `readers.las`, applies the matrix with
/// `filters.transformation` and writes LAS 1.2 point format 3 with millimetre
/// scale and automatic offsets to `output`.
///
/// # Arguments
///
/// * `input` - The point cloud to transform.
/// * `output` - The destination of the transformed point cloud.
/// * `result` - The transformation to apply.
///
/// # Returns
///
/// The pipeline as a JSON array of stages.
pub fn build_transform_pipeline(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    result: &TransformResult,
) -> Value {
    json!([
        {
            "type": "readers.las",
            "filename": input.as_ref().to_string_lossy(),
        },
        {
            "type": "filters.transformation",
            "matrix": result.matrix_string(),
        },
        {
            "type": "writers.las",
            "filename": output.as_ref().to_string_lossy(),
            "minor_version": 2,
            "dataformat_id": 3,
            "forward": "all",
            "scale_x": LAS_SCALE,
            "scale_y": LAS_SCALE,
            "scale_z": LAS_SCALE,
            "offset_x": "auto",
            "offset_y": "auto",
            "offset_z": "auto",
        }
    ])
}

/// Write a pipeline as pretty-printed JSON.
pub fn write_pipeline(path: impl AsRef<Path>, pipeline: &Value) -> Result<(), GeorefIoError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, pipeline)?;
    writer.flush()?;
    log::info!("PDAL pipeline written to {}", path.as_ref().display());
    Ok(())
}

/// Generate a unique `.laz` output filename next to the input.
///
/// The name is `<stem><suffix>.laz`. If that file exists, `_1`, `_2`, ... is
/// appended to the stem until a free name is found.
///
/// Example:
///
/// ```no_run
/// use georef_io::pipeline::laz_output_filename;
///
/// let output = laz_output_filename("/data/flight.las", "_3d");
/// assert_eq!(output.to_str(), Some("/data/flight_3d.laz"));
/// ```
pub fn laz_output_filename(input: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut counter = 0;
    loop {
        let name = match counter {
            0 => format!("{}{}.laz", stem, suffix),
            _ => format!("{}{}_{}.laz", stem, suffix, counter),
        };
        let candidate = input.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
