// Application layer - use cases and orchestration.
// The service resolves accounts through the registry, lets the account apply
// its own rules, and writes the ledger only after a successful operation.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
