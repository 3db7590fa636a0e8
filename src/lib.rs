//! Conformance harness for sparse linear-algebra routines.
//!
//! Every registered (operation, type combination) is driven through a
//! status-returning boundary, [`SparseBackend`], and must answer `Success`;
//! every bad-argument case must answer its declared failure status.

pub mod backend;
pub mod bad_arg;
pub mod config;
pub mod error;
pub mod reference;
pub mod registry;
pub mod runner;
pub mod scalar;
pub mod sparse;
pub mod status;
pub mod suite;

#[cfg(test)]
mod tests;

pub use backend::gpu::WgpuBackend;
pub use backend::host::HostBackend;
pub use backend::{HandleGuard, HandleId, SparseBackend};
pub use config::{BackendKind, HarnessConfig};
pub use error::HarnessError;
pub use registry::{OperationDescriptor, OperationKind};
pub use status::Status;
pub use suite::{run_suite, Report, Verdict};
