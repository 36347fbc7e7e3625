//! Reconciliation engine: restore/adopt, filesystem primitives, and
//! package installation dispatch.
pub mod fs;
pub mod package;
pub mod restore;

pub use package::{InstallMethod, PackageDispatcher};
pub use restore::RestoreEngine;
