//! Data models for the location engine adapter

mod agps;
mod aiding;
mod fix;
mod location;
mod mask;
mod measurement;
mod ni;
mod polynomial;
mod satellite;
mod sensors;
mod status;

pub use agps::*;
pub use aiding::*;
pub use fix::*;
pub use location::*;
pub use mask::*;
pub use measurement::*;
pub use ni::*;
pub use polynomial::*;
pub use satellite::*;
pub use sensors::*;
pub use status::*;
