use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use georef_transform::{ControlPointSet, TransformResult};

use crate::GeorefIoError;

/// Width of the point name column in text reports.
const NAME_WIDTH: usize = 15;

/// Shorten a point name to fit the name column of text reports.
fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_WIDTH {
        let head = name.chars().take(NAME_WIDTH - 3).collect::<String>();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Format a transformation result as a human-readable text report.
///
/// # Arguments
///
/// * `result` - The transformation result.
/// * `points` - The control points the result was computed from, used for names.
///
/// # Returns
///
/// The report with the matrix string, residual tables and RMSE statistics.
pub fn format_report(result: &TransformResult, points: &ControlPointSet) -> String {
    let mut out = format!(
        "PDAL Transformation Matrix:\n\"{}\"\n\n--- DELTAS BEFORE TRANSFORMATION ---\n",
        result.matrix_string()
    );

    out.push_str(&format!(
        "{:<15} {:>12} {:>12} {:>12}\n",
        "Point", "dX", "dY", "dZ"
    ));
    out.push_str(&"-".repeat(51));
    out.push('\n');
    for (p, d) in points.iter().zip(result.residuals_before()) {
        out.push_str(&format!(
            "{:<15} {:>12.4} {:>12.4} {:>12.4}\n",
            truncate_name(&p.name),
            d[0],
            d[1],
            d[2]
        ));
    }

    out.push_str("\n--- DELTAS AFTER TRANSFORMATION ---\n");
    out.push_str(&format!(
        "{:<15} {:>12} {:>12} {:>12} {:>12}\n",
        "Point", "dX", "dY", "dZ", "TE"
    ));
    out.push_str(&"-".repeat(63));
    out.push('\n');
    for ((p, d), te) in points
        .iter()
        .zip(result.residuals_after())
        .zip(result.total_errors())
    {
        out.push_str(&format!(
            "{:<15} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            truncate_name(&p.name),
            d[0],
            d[1],
            d[2],
            te
        ));
    }

    out.push_str(&format!(
        "\n--- STATISTICS ---\nVertical RMSE (VRMSE): {:.4}\nTotal RMSE (TRMSE):     {:.4}\n",
        result.vertical_rmse(),
        result.total_rmse()
    ));
    out.push_str(
        "\n**These values are just estimates. Please still check the point cloud coordinates after transformation.**",
    );

    out
}

/// Quote a CSV field when it contains a separator, a quote or a line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write a transformation result as a CSV report.
///
/// The report holds the matrix as a 4x4 table, the residuals before and after
/// the transformation indexed by point name, and the RMSE statistics.
///
/// # Arguments
///
/// * `writer` - The destination.
/// * `result` - The transformation result.
/// * `points` - The control points the result was computed from, used for names.
pub fn write_csv_report<W: Write>(
    writer: &mut W,
    result: &TransformResult,
    points: &ControlPointSet,
) -> std::io::Result<()> {
    write!(
        writer,
        "Georeferencing Report - {}\n\nPDAL Transformation Matrix\n",
        result.model.title()
    )?;
    for row in result.matrix.iter() {
        let row = row.iter().map(|v| format!("{:?}", v)).collect::<Vec<_>>();
        writeln!(writer, "{}", row.join(","))?;
    }

    write!(writer, "\n\nDeltas Before Transformation\nName,dX,dY,dZ\n")?;
    for (p, d) in points.iter().zip(result.residuals_before()) {
        writeln!(
            writer,
            "{},{:?},{:?},{:?}",
            csv_field(&p.name),
            d[0],
            d[1],
            d[2]
        )?;
    }

    write!(writer, "\n\nDeltas After Transformation\nName,dX,dY,dZ,TE\n")?;
    for ((p, d), te) in points
        .iter()
        .zip(result.residuals_after())
        .zip(result.total_errors())
    {
        writeln!(
            writer,
            "{},{:?},{:?},{:?},{:?}",
            csv_field(&p.name),
            d[0],
            d[1],
            d[2],
            te
        )?;
    }

    write!(writer, "\n\nStatistics\nMetric,Value\n")?;
    writeln!(writer, "Vertical RMSE (VRMSE),{:?}", result.vertical_rmse())?;
    writeln!(writer, "Total RMSE (TRMSE),{:?}", result.total_rmse())?;

    Ok(())
}

/// Export a transformation result as a CSV report file.
///
/// See [`write_csv_report`].
pub fn export_csv_report(
    path: impl AsRef<Path>,
    result: &TransformResult,
    points: &ControlPointSet,
) -> Result<(), GeorefIoError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_csv_report(&mut writer, result, points)?;
    writer.flush()?;
    log::info!("Georeferencing report written to {}", path.as_ref().display());
    Ok(())
}
