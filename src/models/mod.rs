//! LogicMonitor API model types.

mod device;
mod module;

pub use device::*;
pub use module::*;
