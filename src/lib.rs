//! Harvestgate - energy-harvesting duty-cycle simulator for wearable
//! sensor streams.
//!
//! Given a dense multi-body-part accelerometer recording, harvestgate
//! simulates how a battery-less sensor node on each body part decides,
//! sample by sample, when it has harvested enough energy to power on,
//! sample, and transmit a fixed-size packet, and reconstructs the sparse,
//! energy-gated stream that survives.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         harvestgate                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────┐   ┌────────────┐            │
//! │  │ Harvester │──▶│ Duty-cycle │──▶│  Packet    │            │
//! │  │ (energy)  │   │   scan     │   │ extraction │            │
//! │  └───────────┘   └────────────┘   └────────────┘            │
//! │        ▲                │                 │                  │
//! │        │                ▼                 ▼                  │
//! │  ┌───────────┐   ┌────────────┐   ┌────────────┐            │
//! │  │  Sensor   │   │  Energy    │   │   Run      │            │
//! │  │  window   │   │  trace     │   │  report    │            │
//! │  └───────────┘   └────────────┘   └────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each body part is an independent energy reservoir: there is no shared
//! power budget across body parts (a documented simplification), so the
//! per-body-part scans run in parallel.
//!
//! # Example
//!
//! ```
//! use harvestgate::core::{sparsify_data, Policy};
//! use harvestgate::harvester::KineticHarvester;
//! use harvestgate::loader::synthetic_window;
//!
//! let window = synthetic_window(vec!["arm".to_string()], 500, 25.0);
//! let harvester = KineticHarvester::default();
//! let streams = sparsify_data(&window, 16, 6e-6, &harvester, Policy::Opportunistic, false)
//!     .expect("valid window and policy");
//! assert_eq!(streams.len(), 1);
//! ```

pub mod config;
pub mod core;
pub mod harvester;
pub mod loader;
pub mod report;

// Re-export key types at crate root for convenience
pub use config::SimConfig;
pub use core::{
    sparsify_data, DeviceState, PacketSet, Policy, SensorWindow, SparseStream, SparsifyError,
};
pub use harvester::{EnergyTraceProvider, KineticHarvester};
pub use report::{BodyPartReport, RunReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
