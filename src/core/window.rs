//! Dense sensor windows and per-body-part channel views.
//!
//! A window holds one time column plus three accelerometer axes per body
//! part, all sharing the same time axis. Channels are stored column-wise so
//! each body part can hand out borrowed slices to its simulation worker.

use serde::{Deserialize, Serialize};

/// A dense recording: T samples of one time column plus 3 axes per body part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorWindow {
    /// Time in seconds for each sample, strictly increasing, uniform step
    time: Vec<f64>,
    /// Axis columns, 3 per body part, in body-part order (x, y, z)
    axes: Vec<Vec<f64>>,
    /// Ordered body part labels matching the axis column groups
    body_parts: Vec<String>,
}

/// Borrowed view of the 4-column (time, x, y, z) slice for one body part.
#[derive(Debug, Clone, Copy)]
pub struct BodyPartChannel<'a> {
    pub time: &'a [f64],
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
}

impl<'a> BodyPartChannel<'a> {
    /// Number of samples in the channel.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Sample period in seconds, taken from the first two time stamps.
    pub fn dt(&self) -> f64 {
        self.time[1] - self.time[0]
    }

    /// One (x, y, z) sample.
    pub fn sample(&self, k: usize) -> [f64; 3] {
        [self.x[k], self.y[k], self.z[k]]
    }
}

impl SensorWindow {
    /// Build a window from row-major samples: each row is
    /// `[time, x0, y0, z0, x1, y1, z1, ...]` with one axis triple per body part.
    pub fn from_rows(rows: &[Vec<f64>], body_parts: Vec<String>) -> Result<Self, WindowError> {
        let expected_cols = 3 * body_parts.len() + 1;

        let mut time = Vec::with_capacity(rows.len());
        let mut axes = vec![Vec::with_capacity(rows.len()); expected_cols - 1];

        for row in rows {
            if row.len() != expected_cols {
                return Err(WindowError::ChannelMismatch {
                    expected: expected_cols,
                    found: row.len(),
                });
            }
            time.push(row[0]);
            for (col, value) in row[1..].iter().enumerate() {
                axes[col].push(*value);
            }
        }

        Self::from_columns(time, axes, body_parts)
    }

    /// Build a window from a pre-split time column and axis columns.
    pub fn from_columns(
        time: Vec<f64>,
        axes: Vec<Vec<f64>>,
        body_parts: Vec<String>,
    ) -> Result<Self, WindowError> {
        if axes.len() != 3 * body_parts.len() {
            return Err(WindowError::ChannelMismatch {
                expected: 3 * body_parts.len() + 1,
                found: axes.len() + 1,
            });
        }
        if let Some(bad) = axes.iter().position(|a| a.len() != time.len()) {
            return Err(WindowError::RaggedColumn {
                column: bad + 1,
                expected: time.len(),
                found: axes[bad].len(),
            });
        }
        for pair in time.windows(2) {
            if pair[1] <= pair[0] {
                return Err(WindowError::NonIncreasingTime {
                    at: pair[0],
                    next: pair[1],
                });
            }
        }

        Ok(Self {
            time,
            axes,
            body_parts,
        })
    }

    /// Number of samples T.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Ordered body part labels.
    pub fn body_parts(&self) -> &[String] {
        &self.body_parts
    }

    /// The shared time column.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// The (time, x, y, z) view for body part `index`.
    pub fn channel(&self, index: usize) -> BodyPartChannel<'_> {
        let j = 3 * index;
        BodyPartChannel {
            time: &self.time,
            x: &self.axes[j],
            y: &self.axes[j + 1],
            z: &self.axes[j + 2],
        }
    }

    /// Check the window is long enough to hold at least one full packet
    /// plus the trailing transmit slot.
    pub fn check_min_len(&self, packet_size: usize) -> Result<(), WindowError> {
        let required = packet_size + 2;
        if self.len() < required {
            return Err(WindowError::TooShort {
                len: self.len(),
                required,
            });
        }
        Ok(())
    }
}

/// Window validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowError {
    /// Fewer samples than one packet plus its transmit slot
    TooShort { len: usize, required: usize },
    /// Time column is not strictly increasing
    NonIncreasingTime { at: f64, next: f64 },
    /// Column count does not match `3 * body_parts + 1`
    ChannelMismatch { expected: usize, found: usize },
    /// An axis column has a different length than the time column
    RaggedColumn {
        column: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::TooShort { len, required } => {
                write!(f, "window too short: {len} samples, need at least {required}")
            }
            WindowError::NonIncreasingTime { at, next } => {
                write!(f, "time column not strictly increasing: {at} -> {next}")
            }
            WindowError::ChannelMismatch { expected, found } => {
                write!(f, "expected {expected} columns, found {found}")
            }
            WindowError::RaggedColumn {
                column,
                expected,
                found,
            } => {
                write!(
                    f,
                    "column {column} has {found} samples, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for WindowError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize, parts: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|k| {
                let mut row = vec![k as f64 * 0.04];
                for p in 0..parts {
                    row.extend([p as f64, 1.0, -1.0]);
                }
                row
            })
            .collect()
    }

    #[test]
    fn test_from_rows_valid() {
        let window = SensorWindow::from_rows(&rows(20, 2), vec!["arm".into(), "leg".into()])
            .expect("valid window");
        assert_eq!(window.len(), 20);
        assert_eq!(window.body_parts(), &["arm".to_string(), "leg".to_string()]);

        let leg = window.channel(1);
        assert_eq!(leg.len(), 20);
        assert_eq!(leg.sample(3), [1.0, 1.0, -1.0]);
        assert!((leg.dt() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_channel_mismatch() {
        let err = SensorWindow::from_rows(&rows(10, 2), vec!["arm".into()]).unwrap_err();
        assert!(matches!(err, WindowError::ChannelMismatch { expected: 4, found: 7 }));
    }

    #[test]
    fn test_non_increasing_time() {
        let mut data = rows(10, 1);
        data[5][0] = data[4][0]; // duplicate timestamp
        let err = SensorWindow::from_rows(&data, vec!["arm".into()]).unwrap_err();
        assert!(matches!(err, WindowError::NonIncreasingTime { .. }));
    }

    #[test]
    fn test_min_len_check() {
        let window = SensorWindow::from_rows(&rows(10, 1), vec!["arm".into()]).unwrap();
        assert!(window.check_min_len(8).is_ok());
        let err = window.check_min_len(16).unwrap_err();
        assert!(matches!(err, WindowError::TooShort { len: 10, required: 18 }));
    }
}
