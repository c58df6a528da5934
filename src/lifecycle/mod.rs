//! Process lifecycle: interrupt signals and shutdown

mod shutdown;

pub use shutdown::{Interrupt, ShutdownSignal};
