//! Packet extraction from a validity mask.
//!
//! Turns the per-sample mask produced by the duty-cycle scan into discrete
//! timestamped packets. Run boundaries are found by edge detection against
//! a one-sample shift of the mask, with the sample before index 0 treated
//! as absent so a run starting at 0 is still detected.

use serde::{Deserialize, Serialize};

use super::window::BodyPartChannel;

/// Ordered packets recovered for one body part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacketSet {
    /// Arrival time of each packet, in seconds. Reported at the sample
    /// after the packet's last payload sample, modeling the transmit
    /// confirmation landing one tick late.
    pub arrival_times: Vec<f64>,
    /// Payloads, one `len x 3` block of raw (x, y, z) samples per packet
    pub payloads: Vec<Vec<[f64; 3]>>,
}

impl PacketSet {
    pub fn len(&self) -> usize {
        self.arrival_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrival_times.is_empty()
    }

    /// Total payload samples across all packets.
    pub fn sample_count(&self) -> usize {
        self.payloads.iter().map(|p| p.len()).sum()
    }
}

/// Extract packets from a body part's channel and its validity mask.
///
/// Rising edges open a packet, falling edges close it, and the two lists
/// are paired by position. A run still open at the end of the array has no
/// falling edge and is dropped, never synthesized.
pub fn extract_packets(channel: &BodyPartChannel<'_>, valid: &[bool]) -> PacketSet {
    let mut starts = Vec::new();
    let mut ends = Vec::new();

    let mut prev = false; // sentinel: sample before index 0 is absent
    for (k, &v) in valid.iter().enumerate() {
        if v && !prev {
            starts.push(k);
        } else if !v && prev {
            ends.push(k);
        }
        prev = v;
    }

    let mut packets = PacketSet::default();
    for (&start, &end) in starts.iter().zip(ends.iter()) {
        packets
            .payloads
            .push((start..end).map(|k| channel.sample(k)).collect());
        packets.arrival_times.push(channel.time[end]);
    }
    packets
}
