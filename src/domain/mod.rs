mod account;
mod business;
mod checking;
mod error;
mod money;
mod registry;
mod savings;
mod transaction;

pub use account::*;
pub use business::*;
pub use checking::*;
pub use error::*;
pub use money::*;
pub use registry::*;
pub use savings::*;
pub use transaction::*;
