//! Assisted-GNSS plumbing: servers, data connections, protocols and
//! network-initiated responses

use std::net::Ipv4Addr;

use bytes::Bytes;
use loc_core::{
    AgpsType, AtlBearer, GpsLockMask, LocError, LocResult, NiResponse, NmeaTypes, ServerKind,
    SuplVersion, AGPS_CERTIFICATE_MAX_SLOTS,
};
use tracing::{debug, info, warn};

use super::LocService;
use crate::transport::ClientHandle;
use crate::wire::{
    ApnProfile, EngineLock, EngineRequest, NiNotifyVerifyInd, NiUserResponse,
    NiUserResponseRequest, PdnType, ProtocolConfig, ResponsePayload, ServerConnStatus,
    ServerConnStatusRequest, ServerRequestType, ServerType, SetServerRequest, WireSuplVersion,
    MAX_SERVER_ADDR_LENGTH,
};

/// Stand-in certificate injected into an empty slot before deleting it
const PLACEHOLDER_CERT: [u8; 1] = [1];

pub(crate) fn engine_lock(mask: GpsLockMask) -> EngineLock {
    if mask.contains(GpsLockMask::MO | GpsLockMask::NI) {
        EngineLock::All
    } else if mask.contains(GpsLockMask::MO) {
        EngineLock::Mi
    } else if mask.contains(GpsLockMask::NI) {
        EngineLock::Mt
    } else {
        EngineLock::None
    }
}

pub(crate) fn lock_mask(lock: EngineLock) -> GpsLockMask {
    match lock {
        EngineLock::None => GpsLockMask::empty(),
        EngineLock::Mi => GpsLockMask::MO,
        EngineLock::Mt => GpsLockMask::NI,
        EngineLock::All => GpsLockMask::MO | GpsLockMask::NI,
    }
}

fn wire_supl_version(version: SuplVersion) -> WireSuplVersion {
    match version {
        SuplVersion::V1_0 => WireSuplVersion::V1_0,
        SuplVersion::V2_0 => WireSuplVersion::V2_0,
        SuplVersion::V2_0_2 => WireSuplVersion::V2_0_2,
    }
}

fn pdn_type(bearer: AtlBearer) -> Option<PdnType> {
    match bearer {
        AtlBearer::Ipv4 => Some(PdnType::Ipv4),
        AtlBearer::Ipv6 => Some(PdnType::Ipv6),
        AtlBearer::Ipv4v6 => Some(PdnType::Ipv4v6),
        AtlBearer::Invalid => None,
    }
}

/// Build the user response, echoing every payload of the request
pub(crate) fn ni_user_response(
    response: NiResponse,
    request: &NiNotifyVerifyInd,
) -> NiUserResponseRequest {
    let user_response = match response {
        NiResponse::Accept => NiUserResponse::Accept,
        NiResponse::Deny => NiUserResponse::Deny,
        NiResponse::NoResponse => NiUserResponse::NoResponse,
    };
    NiUserResponseRequest {
        user_response,
        notification_type: request.notification_type,
        vx: request.vx.clone(),
        supl: request.supl.clone(),
        umts_cp: request.umts_cp.clone(),
        vx_service_interaction: request.vx_service_interaction.clone(),
        supl_ver2_ext: request.supl_ver2_ext.clone(),
        supl_emergency: request.supl_emergency.clone(),
    }
}

impl LocService {
    pub async fn inform_ni_response(
        &self,
        handle: ClientHandle,
        response: NiResponse,
        request: &NiNotifyVerifyInd,
    ) -> LocResult<()> {
        debug!(?response, "Sending NI user response");
        let payload = ni_user_response(response, request);
        self.sync
            .request(handle, EngineRequest::NiUserResponse(Box::new(payload)))
            .await
            .map(|_| ())
    }

    /// Set the UMTS SLP server by URL
    pub async fn set_server_url(&self, handle: ClientHandle, url: &str) -> LocResult<()> {
        if url.len() > MAX_SERVER_ADDR_LENGTH {
            warn!(len = url.len(), "Server URL too long");
            return Err(LocError::invalid(format!(
                "server URL longer than {} bytes",
                MAX_SERVER_ADDR_LENGTH
            )));
        }
        let request = SetServerRequest {
            server_type: ServerType::UmtsSlp,
            ipv4: None,
            url: Some(url.to_string()),
        };
        self.sync
            .request(handle, EngineRequest::SetServer(request))
            .await
            .map(|_| ())
    }

    pub async fn set_server_addr(
        &self,
        handle: ClientHandle,
        ip: Ipv4Addr,
        port: u16,
        kind: ServerKind,
    ) -> LocResult<()> {
        let server_type = match kind {
            ServerKind::Mpc => ServerType::CdmaMpc,
            ServerKind::CustomPde => ServerType::CustomPde,
            ServerKind::CdmaPde => ServerType::CdmaPde,
        };
        let request = SetServerRequest {
            server_type,
            ipv4: Some((ip, port)),
            url: None,
        };
        self.sync
            .request(handle, EngineRequest::SetServer(request))
            .await
            .map(|_| ())
    }

    /// Report the outcome of a data connection the engine asked to open
    pub async fn atl_open_status(
        &self,
        handle: ClientHandle,
        conn_handle: u32,
        success: bool,
        apn: Option<&str>,
        bearer: AtlBearer,
        agps_type: AgpsType,
    ) -> LocResult<()> {
        debug!(conn_handle, success, ?apn, ?bearer, ?agps_type, "ATL open status");
        let (status, apn_profile) = if success {
            let profile = pdn_type(bearer).map(|pdn_type| ApnProfile {
                pdn_type,
                apn_name: apn.unwrap_or_default().to_string(),
            });
            (ServerConnStatus::Success, profile)
        } else {
            (ServerConnStatus::Failure, None)
        };
        let request = ServerConnStatusRequest {
            conn_handle,
            request_type: ServerRequestType::Open,
            status,
            apn_profile,
        };
        self.sync
            .request(handle, EngineRequest::InformLocationServerConnStatus(request))
            .await
            .map(|_| ())
    }

    pub async fn atl_close_status(
        &self,
        handle: ClientHandle,
        conn_handle: u32,
        success: bool,
    ) -> LocResult<()> {
        debug!(conn_handle, success, "ATL close status");
        let request = ServerConnStatusRequest {
            conn_handle,
            request_type: ServerRequestType::Close,
            status: if success {
                ServerConnStatus::Success
            } else {
                ServerConnStatus::Failure
            },
            apn_profile: None,
        };
        self.sync
            .request(handle, EngineRequest::InformLocationServerConnStatus(request))
            .await
            .map(|_| ())
    }

    async fn set_protocol(&self, handle: ClientHandle, config: ProtocolConfig) -> LocResult<()> {
        self.sync
            .request(handle, EngineRequest::SetProtocolConfigParameters(config))
            .await
            .map(|_| ())
    }

    /// Set the SUPL version from its packed `0x00MMmmss` representation
    pub async fn set_supl_version(&self, handle: ClientHandle, version: u32) -> LocResult<()> {
        let version = SuplVersion::from(version);
        info!(?version, "Setting SUPL version");
        self.set_protocol(
            handle,
            ProtocolConfig {
                supl_version: Some(wire_supl_version(version)),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_lpp_config(&self, handle: ClientHandle, profile: u32) -> LocResult<()> {
        self.set_protocol(
            handle,
            ProtocolConfig {
                lpp_config: Some(profile),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_aglonass_protocol(&self, handle: ClientHandle, mask: u32) -> LocResult<()> {
        self.set_protocol(
            handle,
            ProtocolConfig {
                assisted_glo_protocol_mask: Some(mask),
                ..Default::default()
            },
        )
        .await
    }

    /// Configure LPPe: control plane first, then user plane. Both requests
    /// are always sent.
    pub async fn set_lppe_protocol(&self, handle: ClientHandle, cp: u64, up: u64) -> LocResult<()> {
        let cp_result = self
            .set_protocol(
                handle,
                ProtocolConfig {
                    lppe_cp_config: Some(cp),
                    ..Default::default()
                },
            )
            .await;
        if let Err(e) = &cp_result {
            warn!(error = %e, "LPPe control plane configuration failed");
        }
        let up_result = self
            .set_protocol(
                handle,
                ProtocolConfig {
                    lppe_up_config: Some(up),
                    ..Default::default()
                },
            )
            .await;
        cp_result.and(up_result)
    }

    pub async fn set_nmea_types(&self, handle: ClientHandle, types: NmeaTypes) -> LocResult<()> {
        self.sync
            .request(handle, EngineRequest::SetNmeaTypes(types))
            .await
            .map(|_| ())
    }

    pub async fn set_gps_lock(&self, handle: ClientHandle, mask: GpsLockMask) -> LocResult<()> {
        let lock = engine_lock(mask);
        info!(?lock, "Setting engine lock");
        self.sync
            .request(handle, EngineRequest::SetEngineLock(lock))
            .await
            .map(|_| ())
    }

    pub async fn get_gps_lock(&self, handle: ClientHandle) -> LocResult<GpsLockMask> {
        let response = self.sync.request(handle, EngineRequest::GetEngineLock).await?;
        match response.payload {
            ResponsePayload::EngineLock(Some(lock)) => Ok(lock_mask(lock)),
            _ => Err(LocError::failure("engine lock not reported")),
        }
    }

    /// Install SUPL certificates into the writable slots of `slot_mask`.
    ///
    /// Certificates are consumed in order, one per writable slot. Writable
    /// slots left without a certificate are cleared. All slots are
    /// processed; the first failure is returned.
    pub async fn install_agps_cert(
        &self,
        handle: ClientHandle,
        certs: &[Bytes],
        slot_mask: u32,
    ) -> LocResult<()> {
        let mut first_error = None;
        let mut cert_index = 0;

        for slot in 0..AGPS_CERTIFICATE_MAX_SLOTS as u8 {
            if slot_mask & (1 << slot) == 0 {
                continue;
            }

            let result = match certs.get(cert_index).filter(|c| !c.is_empty()) {
                Some(cert) => {
                    debug!(slot, len = cert.len(), "Injecting SUPL certificate");
                    cert_index += 1;
                    self.inject_cert(handle, slot, cert.clone()).await
                }
                None => self.clear_cert_slot(handle, slot).await,
            };

            if let Err(e) = result {
                warn!(slot, error = %e, "SUPL certificate slot update failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn inject_cert(&self, handle: ClientHandle, slot: u8, data: Bytes) -> LocResult<()> {
        self.sync
            .request(handle, EngineRequest::InjectSuplCertificate { id: slot, data })
            .await
            .map(|_| ())
    }

    /// Deleting an empty slot fails on some engines, so a placeholder is
    /// written first
    async fn clear_cert_slot(&self, handle: ClientHandle, slot: u8) -> LocResult<()> {
        debug!(slot, "Clearing SUPL certificate slot");
        if let Err(e) = self
            .inject_cert(handle, slot, Bytes::from_static(&PLACEHOLDER_CERT))
            .await
        {
            warn!(slot, error = %e, "Placeholder certificate injection failed");
        }
        self.sync
            .request(handle, EngineRequest::DeleteSuplCertificate { id: slot })
            .await
            .map(|_| ())
    }
}
