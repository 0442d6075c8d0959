//! Core simulation pipeline.
//!
//! This module contains:
//! - Sensor window and per-body-part channel views
//! - Dispatch policy parsing
//! - The leakage model and per-packet energy ramps
//! - The duty-cycle state machine (the heart of the simulator)
//! - Packet extraction from validity masks
//! - The `sparsify_data` orchestration entry point

pub mod duty_cycle;
pub mod extractor;
pub mod leakage;
pub mod policy;
pub mod sparsify;
pub mod window;

// Re-export commonly used types
pub use duty_cycle::{DeviceState, DutyCycleSim, SimResult, INIT_OVERHEAD};
pub use extractor::{extract_packets, PacketSet};
pub use leakage::LeakageModel;
pub use policy::{Policy, PolicyError};
pub use sparsify::{sparsify_data, EnergyDiagnostics, SparseStream, SparsifyError};
pub use window::{BodyPartChannel, SensorWindow, WindowError};
