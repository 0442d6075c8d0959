//! Window ingestion: CSV files and synthetic motion.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

use crate::core::window::SensorWindow;

/// Load a dense window from a CSV file.
///
/// Expected layout: one row per sample, columns
/// `time, x0, y0, z0, x1, y1, z1, ...` with one axis triple per body part,
/// matching `body_parts` order. A leading header row is skipped if its
/// first field does not parse as a number.
pub fn load_window_from_csv(path: impl AsRef<Path>, body_parts: Vec<String>) -> Result<SensorWindow> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("could not open CSV {path:?}"))?;

    let expected_cols = 3 * body_parts.len() + 1;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("row {} unreadable in {path:?}", row_idx + 1))?;

        // header detection: a non-numeric first field on the first row
        if row_idx == 0 && record.get(0).map(|f| f.trim().parse::<f64>().is_err()) == Some(true) {
            continue;
        }

        if record.len() != expected_cols {
            bail!(
                "row {} has {} columns, expected {} (time + 3 per body part)",
                row_idx + 1,
                record.len(),
                expected_cols
            );
        }

        let mut row = Vec::with_capacity(expected_cols);
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field.trim().parse().with_context(|| {
                format!("row {}, column {} is not a number", row_idx + 1, col + 1)
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("CSV {path:?} contains no samples");
    }

    SensorWindow::from_rows(&rows, body_parts)
        .with_context(|| format!("CSV {path:?} is not a valid sensor window"))
}

/// Generate a synthetic window of sinusoidal motion, one phase-shifted
/// oscillation per body part, riding on gravity along z.
pub fn synthetic_window(body_parts: Vec<String>, samples: usize, rate_hz: f64) -> SensorWindow {
    let dt = 1.0 / rate_hz;
    let parts = body_parts.len();

    let rows: Vec<Vec<f64>> = (0..samples)
        .map(|k| {
            let t = k as f64 * dt;
            let mut row = vec![t];
            for p in 0..parts {
                let phase = p as f64 * std::f64::consts::FRAC_PI_3;
                let swing = (2.0 * std::f64::consts::PI * 1.2 * t + phase).sin();
                row.extend([3.0 * swing, 1.5 * swing.abs(), 9.81 + 2.0 * swing]);
            }
            row
        })
        .collect();

    // always valid: time is strictly increasing and columns line up
    SensorWindow::from_rows(&rows, body_parts).expect("synthetic window is always valid")
}
