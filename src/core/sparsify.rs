//! End-to-end sparsification of a dense sensor window.
//!
//! Each body part is an independent, uncoupled energy reservoir: its scan
//! reads only its own channel slice and writes only its own outputs, so the
//! body parts run on scoped worker threads with a channel collecting
//! results. Output order follows the window's body-part order regardless of
//! which worker finishes first.

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use std::thread;

use super::duty_cycle::DutyCycleSim;
use super::extractor::{extract_packets, PacketSet};
use super::leakage::LeakageModel;
use super::policy::{Policy, PolicyError};
use super::window::{SensorWindow, WindowError};
use crate::harvester::EnergyTraceProvider;

/// Optional per-body-part energy trace for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyDiagnostics {
    /// The energy curve after all simulation debits
    pub energy_trace: Vec<f64>,
    /// Per-packet energy threshold in Joules
    pub threshold: f64,
}

/// The sparse, energy-gated stream recovered for one body part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseStream {
    pub body_part: String,
    pub packets: PacketSet,
    /// Per-sample validity: true where the sample was captured
    pub valid_mask: Vec<bool>,
    /// Present when diagnostics were requested
    pub diagnostics: Option<EnergyDiagnostics>,
}

/// Simulate energy-gated sampling over a dense window and extract the
/// surviving packets per body part.
///
/// `packet_size` is the number of payload samples per packet and must be
/// positive; `leakage` is the passive loss rate in Watts. The result is
/// ordered like `window.body_parts()`. The simulation is a pure function of
/// its inputs: every body part starts cold in `Off` at sample 0 and no
/// state survives across calls.
pub fn sparsify_data<P: EnergyTraceProvider>(
    window: &SensorWindow,
    packet_size: usize,
    leakage: f64,
    provider: &P,
    policy: Policy,
    diagnostics: bool,
) -> Result<Vec<SparseStream>, SparsifyError> {
    if packet_size == 0 {
        return Err(SparsifyError::ZeroPacketSize);
    }
    policy.validate()?;
    window.check_min_len(packet_size)?;

    let parts = window.body_parts().len();
    let mut streams: Vec<Option<SparseStream>> = (0..parts).map(|_| None).collect();

    let (tx, rx) = unbounded();
    thread::scope(|s| {
        for (index, body_part) in window.body_parts().iter().enumerate() {
            let tx = tx.clone();
            s.spawn(move || {
                let stream = simulate_body_part(
                    window,
                    index,
                    body_part,
                    packet_size,
                    leakage,
                    provider,
                    policy,
                    diagnostics,
                );
                let _ = tx.send((index, stream));
            });
        }
        drop(tx);
        for (index, stream) in rx {
            streams[index] = Some(stream);
        }
    });

    Ok(streams.into_iter().flatten().collect())
}

#[allow(clippy::too_many_arguments)]
fn simulate_body_part<P: EnergyTraceProvider>(
    window: &SensorWindow,
    index: usize,
    body_part: &str,
    packet_size: usize,
    leakage: f64,
    provider: &P,
    policy: Policy,
    diagnostics: bool,
) -> SparseStream {
    let channel = window.channel(index);

    let (t_out, p_out) = provider.power(&channel);
    let e_out = provider.energy(&t_out, &p_out);
    // the provider's mask is advisory only; the scan recomputes validity
    let (_initial_mask, thresh) = provider.generate_valid_mask(&e_out, packet_size);

    let model = LeakageModel::new(leakage, channel.dt(), packet_size, thresh);
    let result = DutyCycleSim::new(e_out, thresh, packet_size, model, policy).run();
    let packets = extract_packets(&channel, &result.valid);

    SparseStream {
        body_part: body_part.to_string(),
        packets,
        valid_mask: result.valid,
        diagnostics: diagnostics.then_some(EnergyDiagnostics {
            energy_trace: result.energy,
            threshold: thresh,
        }),
    }
}

/// Errors from `sparsify_data`.
#[derive(Debug, Clone, PartialEq)]
pub enum SparsifyError {
    InvalidWindow(WindowError),
    InvalidPolicy(PolicyError),
    ZeroPacketSize,
}

impl std::fmt::Display for SparsifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SparsifyError::InvalidWindow(e) => write!(f, "invalid window: {e}"),
            SparsifyError::InvalidPolicy(e) => write!(f, "invalid policy: {e}"),
            SparsifyError::ZeroPacketSize => write!(f, "packet size must be positive"),
        }
    }
}

impl std::error::Error for SparsifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SparsifyError::InvalidWindow(e) => Some(e),
            SparsifyError::InvalidPolicy(e) => Some(e),
            SparsifyError::ZeroPacketSize => None,
        }
    }
}

impl From<WindowError> for SparsifyError {
    fn from(e: WindowError) -> Self {
        SparsifyError::InvalidWindow(e)
    }
}

impl From<PolicyError> for SparsifyError {
    fn from(e: PolicyError) -> Self {
        SparsifyError::InvalidPolicy(e)
    }
}
