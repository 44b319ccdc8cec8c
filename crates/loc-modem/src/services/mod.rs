//! Configuration and query operations on an open engine connection
//!
//! Every operation here is a single synchronous round trip (or a short,
//! fixed sequence of them) built on [`SyncClient`]. Session state lives in
//! the session manager; the service layer only needs the handle.

mod agps;
mod assist;
mod engine;

pub use assist::XtraInjectError;

use std::sync::Arc;

use crate::clock::SystemClock;
use crate::sync_req::SyncClient;

/// Default predicted-orbits chunk size
pub const DEFAULT_XTRA_PART_LEN: usize = 1024;

/// Engine service layer
#[derive(Clone)]
pub struct LocService {
    sync: SyncClient,
    clock: Arc<dyn SystemClock>,
    xtra_part_len: usize,
}

impl LocService {
    pub fn new(sync: SyncClient, clock: Arc<dyn SystemClock>) -> Self {
        Self {
            sync,
            clock,
            xtra_part_len: DEFAULT_XTRA_PART_LEN,
        }
    }

    pub fn with_xtra_part_len(mut self, part_len: usize) -> Self {
        self.xtra_part_len = part_len.max(1);
        self
    }

    pub fn sync(&self) -> &SyncClient {
        &self.sync
    }

    pub fn xtra_part_len(&self) -> usize {
        self.xtra_part_len
    }
}
