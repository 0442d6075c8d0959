//! Passive loss model and per-packet energy ramps.

/// Per-sample leakage and the linear debit ramps applied over one packet.
///
/// Usage is assumed linear over the course of a packet: `thresh /
/// packet_size` Joules per sample. Both ramps hold `packet_size + 1` values
/// because a dispatch spans the sampled packet plus one transmit slot.
#[derive(Debug, Clone)]
pub struct LeakageModel {
    /// Passive loss per sample period, `leakage_rate * dt`
    pub leakage_per_sample: f64,
    /// Energy drawn over a packet span, interpolated 0 -> thresh
    pub linear_usage: Vec<f64>,
    /// Passive loss over a packet span, interpolated 0 -> leakage_per_sample * packet_size
    pub linear_leakage: Vec<f64>,
}

impl LeakageModel {
    pub fn new(leakage_rate: f64, dt: f64, packet_size: usize, thresh: f64) -> Self {
        let leakage_per_sample = leakage_rate * dt;
        Self {
            leakage_per_sample,
            linear_usage: linspace(thresh, packet_size + 1),
            linear_leakage: linspace(leakage_per_sample * packet_size as f64, packet_size + 1),
        }
    }
}

/// `n` values linearly interpolated from 0 to `end` inclusive.
fn linspace(end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![0.0];
    }
    let step = end / (n - 1) as f64;
    (0..n).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leakage_per_sample() {
        let model = LeakageModel::new(6e-6, 0.04, 16, 480e-6);
        assert!((model.leakage_per_sample - 2.4e-7).abs() < 1e-18);
    }

    #[test]
    fn test_ramp_shapes() {
        let model = LeakageModel::new(6e-6, 0.04, 16, 480e-6);
        assert_eq!(model.linear_usage.len(), 17);
        assert_eq!(model.linear_leakage.len(), 17);

        assert_eq!(model.linear_usage[0], 0.0);
        assert!((model.linear_usage[16] - 480e-6).abs() < 1e-15);
        assert_eq!(model.linear_leakage[0], 0.0);
        assert!((model.linear_leakage[16] - 2.4e-7 * 16.0).abs() < 1e-18);
    }

    #[test]
    fn test_ramp_is_linear() {
        let model = LeakageModel::new(1e-6, 0.1, 4, 100e-6);
        let per_sample = 100e-6 / 4.0;
        for (i, v) in model.linear_usage.iter().enumerate() {
            assert!((v - i as f64 * per_sample).abs() < 1e-15);
        }
    }
}
