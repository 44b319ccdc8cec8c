//! Transport layer to the remote positioning service

mod adapter;
mod client;
mod error;
pub mod mock;

pub use adapter::{ClientErrorKind, ClientHandle, EventSink, LocTransport, TransportEvent};
pub use client::TransportClient;
pub use error::TransportError;
pub use mock::{MockEngine, MockReply};
