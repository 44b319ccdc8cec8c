//! loc-modem - Protocol adapter for a modem-resident GNSS location engine
//!
//! This crate drives a remote positioning engine over an asynchronous
//! request/indication transport and turns its indications into the
//! normalized reports of `loc-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        LocAdapter                           │
//! │                                                             │
//! │  ┌──────────────┐  ┌─────────────┐  ┌────────────────────┐  │
//! │  │SessionManager│  │ LocService  │  │ CapabilityCache    │  │
//! │  │ (state/mask) │  │ (requests)  │  │ (probed support)   │  │
//! │  └──────┬───────┘  └──────┬──────┘  └────────────────────┘  │
//! │         │                 │                                 │
//! │  ┌──────┴───────┐  ┌──────┴──────┐                          │
//! │  │TransportClnt │  │ SyncClient  │◄─── SyncRequestTable     │
//! │  │ (handle)     │  │ (wait/time) │            ▲             │
//! │  └──────┬───────┘  └──────┬──────┘            │             │
//! │         └────────┬────────┘          ┌────────┴─────────┐   │
//! │           ┌──────┴──────┐  events    │ EventDispatcher  │   │
//! │           │LocTransport │──────────► │ (convert/report) │   │
//! │           └─────────────┘            └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod capability;
pub mod clock;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod fallback;
pub mod mask;
pub mod services;
pub mod session;
pub mod sync_req;
pub mod transport;
pub mod wire;

pub use adapter::LocAdapter;
pub use capability::{CapabilityCache, MeasurementSupport, SupportedMessages};
pub use clock::{ManualClock, StdClock, SystemClock};
pub use config::{AdapterConfig, ConfigError};
pub use dispatch::ControlMessage;
pub use fallback::{DeleteAidingStrategy, DeleteApi};
pub use services::{LocService, XtraInjectError};
pub use session::{SessionManager, SessionState};
pub use sync_req::{SyncClient, SyncRequestTable};
pub use transport::{
    ClientErrorKind, ClientHandle, LocTransport, MockEngine, MockReply, TransportClient,
    TransportError, TransportEvent,
};

// Re-export for convenience
pub use loc_core::{
    AppEventMask, FixCriteria, GnssStatus, LocError, LocResult, LocationEvent, LocationReporter,
    PositionMode, Recurrence,
};
