//! Simulation driver module.
//!
//! Provides a software bed that answers status requests, records every
//! command it receives and can be told to drop connections or reject
//! base movements.

mod driver;

pub use driver::{Movement, SimulatedConnection, SimulatedPod};
