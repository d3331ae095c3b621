use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use georef_transform::{ControlPoint, ControlPointSet};

use crate::GeorefIoError;

/// Number of columns of a control point row: `Name, E, N, H, X, Y, Z`.
const NUM_COLUMNS: usize = 7;

/// A data row that was excluded from the control point set.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based line number in the input.
    pub line: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// The outcome of reading a control point table.
#[derive(Debug, Clone)]
pub struct ControlPointTable {
    /// The valid control points in input order.
    pub points: ControlPointSet,
    /// The rows that were excluded, in input order.
    pub rejected: Vec<RejectedRow>,
}

/// Read a control point table from a CSV file.
///
/// The first line is a header and is skipped. Every following row holds the
/// columns `Name, E, N, H, X, Y, Z` in that order. Rows with missing or
/// non-numeric values are excluded and reported in
/// [`ControlPointTable::rejected`].
///
/// # Arguments
///
/// * `path` - The path to the CSV file.
///
/// # Returns
///
/// The valid control points and the rejected rows.
pub fn read_control_points(path: impl AsRef<Path>) -> Result<ControlPointTable, GeorefIoError> {
    let file = File::open(path)?;
    parse_control_points(BufReader::new(file))
}

/// Parse a control point table from any buffered reader.
///
/// See [`read_control_points`].
pub fn parse_control_points<R: BufRead>(reader: R) -> Result<ControlPointTable, GeorefIoError> {
    let mut lines = reader.lines().enumerate();

    // the header names are not interpreted, columns are positional
    match lines.next() {
        Some((_, header)) => {
            header?;
        }
        None => return Err(GeorefIoError::MissingHeader),
    }

    let mut points = Vec::new();
    let mut rejected = Vec::new();

    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let line_number = idx + 1;
        match parse_control_point_line(&line) {
            Ok(point) => points.push(point),
            Err(reason) => {
                log::warn!("Skipping control point row {}: {}", line_number, reason);
                rejected.push(RejectedRow {
                    line: line_number,
                    reason,
                });
            }
        }
    }

    if points.is_empty() {
        return Err(GeorefIoError::NoValidRows {
            rejected: rejected.len(),
        });
    }

    if !rejected.is_empty() {
        log::warn!(
            "{} control point rows rejected, {} kept",
            rejected.len(),
            points.len()
        );
    }

    Ok(ControlPointTable {
        points: ControlPointSet::new(points),
        rejected,
    })
}

/// Parse a control point line.
///       NAME, E, N, H, X, Y, Z
fn parse_control_point_line(line: &str) -> Result<ControlPoint, String> {
    let mut fields = split_fields(line);

    // spreadsheet exports often carry trailing empty columns
    while fields.len() > NUM_COLUMNS && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }

    if fields.len() != NUM_COLUMNS {
        return Err(format!(
            "expected {} columns, got {}",
            NUM_COLUMNS,
            fields.len()
        ));
    }

    let name = fields[0].clone();
    if name.is_empty() {
        return Err("missing point name".to_string());
    }

    let mut values = [0.0; 6];
    for (value, (field, column)) in values
        .iter_mut()
        .zip(fields[1..].iter().zip(["E", "N", "H", "X", "Y", "Z"]))
    {
        *value = parse_coordinate(field, column)?;
    }

    Ok(ControlPoint::new(
        name,
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
    ))
}

fn parse_coordinate(field: &str, column: &str) -> Result<f64, String> {
    if field.is_empty() {
        return Err(format!("missing value in column {}", column));
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("non-finite value '{}' in column {}", field, column)),
        Err(e) => Err(format!("invalid value '{}' in column {}: {}", field, column, e)),
    }
}

/// Split a CSV line into trimmed fields, honoring double-quoted fields.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}
