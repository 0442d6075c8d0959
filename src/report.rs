//! Run summaries for CLI output and JSON export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use uuid::Uuid;

use crate::core::policy::Policy;
use crate::core::sparsify::SparseStream;
use crate::core::window::SensorWindow;

/// Summary of one body part's sparse stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyPartReport {
    pub body_part: String,
    /// Number of extracted packets
    pub packet_count: usize,
    /// Payload samples captured across all packets
    pub samples_captured: usize,
    /// Captured samples over dense samples, 0..1
    pub coverage: f64,
    /// Mean packet inter-arrival time in seconds (two or more packets)
    pub mean_iat_s: Option<f64>,
    /// Sample standard deviation of inter-arrival times (three or more)
    pub std_iat_s: Option<f64>,
    /// Per-packet energy threshold, when diagnostics were requested
    pub threshold: Option<f64>,
}

/// A full simulation run, ready for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub policy: String,
    pub packet_size: usize,
    pub leakage: f64,
    pub window_samples: usize,
    pub body_parts: Vec<BodyPartReport>,
}

impl RunReport {
    pub fn new(
        window: &SensorWindow,
        streams: &[SparseStream],
        policy: Policy,
        packet_size: usize,
        leakage: f64,
    ) -> Self {
        let body_parts = streams
            .iter()
            .map(|s| summarize_stream(s, window.len()))
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            policy: policy.label(),
            packet_size,
            leakage,
            window_samples: window.len(),
            body_parts,
        }
    }
}

fn summarize_stream(stream: &SparseStream, dense_samples: usize) -> BodyPartReport {
    let samples_captured = stream.packets.sample_count();
    let coverage = if dense_samples > 0 {
        samples_captured as f64 / dense_samples as f64
    } else {
        0.0
    };

    let iats: Vec<f64> = stream
        .packets
        .arrival_times
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect();

    let mean_iat_s = (!iats.is_empty()).then(|| iats.iter().mean());
    let std_iat_s = (iats.len() > 1).then(|| iats.iter().std_dev());

    BodyPartReport {
        body_part: stream.body_part.clone(),
        packet_count: stream.packets.len(),
        samples_captured,
        coverage,
        mean_iat_s,
        std_iat_s,
        threshold: stream.diagnostics.as_ref().map(|d| d.threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::PacketSet;

    fn stream(arrivals: Vec<f64>, payload_len: usize, mask_len: usize) -> SparseStream {
        let payloads = arrivals
            .iter()
            .map(|_| vec![[0.0, 0.0, 0.0]; payload_len])
            .collect();
        SparseStream {
            body_part: "arm".to_string(),
            packets: PacketSet {
                arrival_times: arrivals,
                payloads,
            },
            valid_mask: vec![false; mask_len],
            diagnostics: None,
        }
    }

    #[test]
    fn test_coverage_and_counts() {
        let report = summarize_stream(&stream(vec![1.0, 2.0, 4.0], 16, 200), 200);
        assert_eq!(report.packet_count, 3);
        assert_eq!(report.samples_captured, 48);
        assert!((report.coverage - 0.24).abs() < 1e-12);
    }

    #[test]
    fn test_iat_statistics() {
        let report = summarize_stream(&stream(vec![1.0, 2.0, 4.0], 4, 100), 100);
        // gaps of 1.0 and 2.0 seconds
        assert!((report.mean_iat_s.unwrap() - 1.5).abs() < 1e-12);
        assert!(report.std_iat_s.is_some());
    }

    #[test]
    fn test_no_packets_no_stats() {
        let report = summarize_stream(&stream(vec![], 0, 50), 50);
        assert_eq!(report.packet_count, 0);
        assert_eq!(report.coverage, 0.0);
        assert!(report.mean_iat_s.is_none());
        assert!(report.std_iat_s.is_none());
    }
}
