//! Device driver implementations.
//!
//! - [`simulation`] - Software bed for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `DeviceConnector`, `DeviceControl` and `BaseActuator`
//!    from `slumber_common`
//! 3. Wire it into the binary

pub mod simulation;
