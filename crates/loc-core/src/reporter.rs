//! Upward report interface
//!
//! The adapter delivers every converted report and engine request through a
//! [`LocationReporter`]. Implementations must not block: calls are made from
//! the adapter's event dispatch task.

use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{
    AtlRequest, GnssData, GnssStatus, NiNotification, PositionReport, SvMeasurementSet,
    SvPolynomial, SvStatus, XtraServers,
};

/// Receiver of reports and requests produced by the adapter
///
/// All methods default to no-ops so consumers only implement what they use.
pub trait LocationReporter: Send + Sync {
    fn report_position(&self, _report: PositionReport) {}

    fn report_sv(&self, _status: SvStatus) {}

    fn report_sv_measurement(&self, _set: SvMeasurementSet) {}

    /// Second sink fed from the same raw measurement indication
    fn report_gnss_measurement(&self, _data: GnssData) {}

    fn report_sv_polynomial(&self, _poly: SvPolynomial) {}

    fn report_nmea(&self, _sentence: String) {}

    fn report_status(&self, _status: GnssStatus) {}

    fn report_ni_request(&self, _notification: NiNotification) {}

    fn report_atl_request(&self, _request: AtlRequest) {}

    fn report_xtra_server_url(&self, _servers: XtraServers) {}

    fn request_xtra_data(&self) {}

    fn request_time(&self) {}

    fn request_location(&self) {}
}

/// A report or request emitted by the adapter
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Position(PositionReport),
    Sv(SvStatus),
    SvMeasurement(SvMeasurementSet),
    GnssMeasurement(GnssData),
    SvPolynomial(SvPolynomial),
    Nmea(String),
    Status(GnssStatus),
    NiRequest(NiNotification),
    AtlRequest(AtlRequest),
    XtraServerUrl(XtraServers),
    XtraDataRequest,
    TimeRequest,
    LocationRequest,
}

/// Reporter that forwards every call into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<LocationEvent>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LocationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: LocationEvent) {
        if self.tx.send(event).is_err() {
            debug!("Report receiver dropped, discarding event");
        }
    }
}

impl LocationReporter for ChannelReporter {
    fn report_position(&self, report: PositionReport) {
        self.forward(LocationEvent::Position(report));
    }

    fn report_sv(&self, status: SvStatus) {
        self.forward(LocationEvent::Sv(status));
    }

    fn report_sv_measurement(&self, set: SvMeasurementSet) {
        self.forward(LocationEvent::SvMeasurement(set));
    }

    fn report_gnss_measurement(&self, data: GnssData) {
        self.forward(LocationEvent::GnssMeasurement(data));
    }

    fn report_sv_polynomial(&self, poly: SvPolynomial) {
        self.forward(LocationEvent::SvPolynomial(poly));
    }

    fn report_nmea(&self, sentence: String) {
        self.forward(LocationEvent::Nmea(sentence));
    }

    fn report_status(&self, status: GnssStatus) {
        self.forward(LocationEvent::Status(status));
    }

    fn report_ni_request(&self, notification: NiNotification) {
        self.forward(LocationEvent::NiRequest(notification));
    }

    fn report_atl_request(&self, request: AtlRequest) {
        self.forward(LocationEvent::AtlRequest(request));
    }

    fn report_xtra_server_url(&self, servers: XtraServers) {
        self.forward(LocationEvent::XtraServerUrl(servers));
    }

    fn request_xtra_data(&self) {
        self.forward(LocationEvent::XtraDataRequest);
    }

    fn request_time(&self) {
        self.forward(LocationEvent::TimeRequest);
    }

    fn request_location(&self) {
        self.forward(LocationEvent::LocationRequest);
    }
}
