// Application layer: the dispenser ledger and the policies around it
// (price fallback, receipt retry). Front-ends only talk to this layer.

pub mod error;
pub mod retry;
pub mod service;

pub use error::*;
pub use retry::*;
pub use service::*;
