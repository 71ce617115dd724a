//! Handle-based facade over an incremental CDCL SAT solver.
//!
//! [`Instance`] is the Rust-side API; [`ffi`] exposes the same operations to
//! C callers through opaque handles.

pub mod codec;
pub mod config;
pub mod error;
pub mod ffi;
pub mod instance;
pub mod registry;
pub mod solver;
pub mod types;

pub use config::{SimpStrategy, SolverConfig};
pub use error::{Error, Result};
pub use instance::Instance;
pub use registry::{Handle, Registry};
pub use solver::Stats;
pub use types::{LBool, Lit};
