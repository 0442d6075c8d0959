//! The energy model boundary.
//!
//! The simulator core never assumes a concrete power model; it only needs a
//! collaborator that can turn one body part's motion into a cumulative
//! energy curve and a per-packet threshold. `KineticHarvester` is a small
//! reference implementation so the CLI and demos run end to end.

use crate::core::window::BodyPartChannel;

/// Standard gravity, m/s^2.
const GRAVITY: f64 = 9.81;

/// Converts one body part's motion into harvested-energy estimates.
///
/// Implementations must return curves the same length as the input channel.
pub trait EnergyTraceProvider: Sync {
    /// Instantaneous harvested power per sample: `(t_out, p_out)`.
    fn power(&self, channel: &BodyPartChannel<'_>) -> (Vec<f64>, Vec<f64>);

    /// Cumulative energy in Joules from a power trace.
    fn energy(&self, t_out: &[f64], p_out: &[f64]) -> Vec<f64>;

    /// Initial validity estimate plus the per-packet energy threshold.
    ///
    /// The simulator consumes only the threshold; the mask is recomputed
    /// from scratch by the duty-cycle scan.
    fn generate_valid_mask(&self, e_out: &[f64], packet_size: usize) -> (Vec<bool>, f64);
}

/// Reference inertial harvester model.
///
/// Power is proportional to the dynamic acceleration magnitude (gravity
/// removed) acting on a proof mass at a characteristic velocity; energy is
/// the trapezoidal running integral. Deliberately simple: replace it with a
/// device-specific provider for real evaluations.
#[derive(Debug, Clone)]
pub struct KineticHarvester {
    /// Proof mass in kg
    pub mass_kg: f64,
    /// Electromechanical conversion efficiency, 0..1
    pub efficiency: f64,
    /// Characteristic proof-mass velocity, m/s
    pub proof_velocity: f64,
    /// Energy needed to sample and transmit one payload sample, Joules
    pub sample_cost: f64,
}

impl Default for KineticHarvester {
    fn default() -> Self {
        Self {
            mass_kg: 0.01,
            efficiency: 0.2,
            proof_velocity: 0.5,
            sample_cost: 30e-6,
        }
    }
}

impl EnergyTraceProvider for KineticHarvester {
    fn power(&self, channel: &BodyPartChannel<'_>) -> (Vec<f64>, Vec<f64>) {
        let gain = self.efficiency * self.mass_kg * self.proof_velocity;
        let p_out = (0..channel.len())
            .map(|k| {
                let [x, y, z] = channel.sample(k);
                let magnitude = (x * x + y * y + z * z).sqrt();
                gain * (magnitude - GRAVITY).abs()
            })
            .collect();
        (channel.time.to_vec(), p_out)
    }

    fn energy(&self, t_out: &[f64], p_out: &[f64]) -> Vec<f64> {
        let mut e_out = Vec::with_capacity(p_out.len());
        let mut total = 0.0;
        for k in 0..p_out.len() {
            if k > 0 {
                total += 0.5 * (p_out[k] + p_out[k - 1]) * (t_out[k] - t_out[k - 1]);
            }
            e_out.push(total);
        }
        e_out
    }

    fn generate_valid_mask(&self, e_out: &[f64], packet_size: usize) -> (Vec<bool>, f64) {
        let thresh = packet_size as f64 * self.sample_cost;
        let mask = e_out.iter().map(|&e| e >= thresh).collect();
        (mask, thresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_channel_data(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        // device at rest: gravity only on the z axis
        let time = (0..n).map(|k| k as f64 * 0.04).collect();
        (time, vec![0.0; n], vec![0.0; n], vec![GRAVITY; n])
    }

    #[test]
    fn test_still_device_harvests_nothing() {
        let data = still_channel_data(10);
        let channel = BodyPartChannel {
            time: &data.0,
            x: &data.1,
            y: &data.2,
            z: &data.3,
        };
        let harvester = KineticHarvester::default();
        let (t_out, p_out) = harvester.power(&channel);
        let e_out = harvester.energy(&t_out, &p_out);

        assert_eq!(e_out.len(), 10);
        assert!(e_out.iter().all(|&e| e.abs() < 1e-12));
    }

    #[test]
    fn test_energy_is_cumulative_and_monotonic() {
        let time: Vec<f64> = (0..6).map(|k| k as f64).collect();
        let power = vec![1.0, 1.0, 2.0, 2.0, 0.0, 0.0];
        let harvester = KineticHarvester::default();
        let energy = harvester.energy(&time, &power);

        assert_eq!(energy[0], 0.0);
        assert!((energy[1] - 1.0).abs() < 1e-12);
        assert!((energy[3] - 4.5).abs() < 1e-12);
        assert!(energy.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_threshold_scales_with_packet_size() {
        let harvester = KineticHarvester::default();
        let (_, thresh) = harvester.generate_valid_mask(&[0.0; 4], 16);
        assert!((thresh - 480e-6).abs() < 1e-12);
        let (_, thresh) = harvester.generate_valid_mask(&[0.0; 4], 32);
        assert!((thresh - 960e-6).abs() < 1e-12);
    }
}
