//! loc-core - Domain model for the GNSS location engine adapter
//!
//! This crate holds the normalized types the adapter produces (position,
//! satellite, raw measurement and polynomial reports, NI and ATL requests),
//! the fix criteria and configuration values it consumes, the error taxonomy
//! shared by every public operation, and the upward [`LocationReporter`]
//! interface used to deliver reports to the location middleware.

pub mod error;
pub mod models;
pub mod reporter;

pub use error::{LocError, LocResult};
pub use models::*;
pub use reporter::{ChannelReporter, LocationEvent, LocationReporter};
