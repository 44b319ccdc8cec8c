//! Network-initiated request conversion

use loc_core::{NiEncoding, NiNotification, NiNotifyFlags, NiResponse, NiType};
use tracing::debug;

use crate::wire::{DataCodingScheme, NiNotifyVerifyInd, NiNotifyVerifyType};

/// Buffer sizes of the upward NI strings, including the terminator slot
const REQUESTOR_ID_SIZE: usize = 256;
const TEXT_SIZE: usize = 2048;
const CLIENT_ADDRESS_SIZE: usize = 32;

const EXTRAS_ADDRESS_KEY: &str = "Address";

/// BCD type-of-number octet for an international number
const TON_INTERNATIONAL: u8 = 0x91;

/// Upper-case hex of `data`, truncated to what fits in a `buf_size` buffer
pub fn hexcode(data: &[u8], buf_size: usize) -> String {
    let max_bytes = buf_size.saturating_sub(1) / 2;
    hex::encode_upper(&data[..data.len().min(max_bytes)])
}

/// Decode a BCD-packed client address into its digits.
///
/// A leading international type-of-number octet becomes `+`. Each octet
/// holds the earlier digit in its low nibble; filler nibbles are skipped.
pub fn decode_bcd_address(data: &[u8]) -> String {
    let max_len = CLIENT_ADDRESS_SIZE - 1;
    let (mut out, digits) = match data.split_first() {
        Some((&TON_INTERNATIONAL, rest)) => (String::from("+"), rest),
        _ => (String::new(), data),
    };

    for &octet in digits {
        for nibble in [octet & 0x0F, octet >> 4] {
            if nibble <= 9 && out.len() < max_len {
                out.push(char::from(b'0' + nibble));
            }
        }
    }
    out
}

pub fn convert_encoding(scheme: DataCodingScheme) -> NiEncoding {
    match scheme {
        DataCodingScheme::SuplUtf8 => NiEncoding::Utf8,
        DataCodingScheme::SuplUcs2 => NiEncoding::Ucs2,
        DataCodingScheme::SuplGsmDefault | DataCodingScheme::SsLanguageUnspec => {
            NiEncoding::Gsm7Bit
        }
        DataCodingScheme::Other(_) => NiEncoding::Unknown,
    }
}

fn apply_notify_type(notif: &mut NiNotification, kind: NiNotifyVerifyType) {
    let (flags, response) = match kind {
        NiNotifyVerifyType::NoNotifyNoVerify => (NiNotifyFlags::empty(), NiResponse::NoResponse),
        NiNotifyVerifyType::NotifyOnly => (NiNotifyFlags::NEED_NOTIFY, NiResponse::NoResponse),
        NiNotifyVerifyType::NotifyVerifyAllowNoResp => (
            NiNotifyFlags::NEED_NOTIFY | NiNotifyFlags::NEED_VERIFY,
            NiResponse::Accept,
        ),
        NiNotifyVerifyType::NotifyVerifyNotAllowNoResp => (
            NiNotifyFlags::NEED_NOTIFY | NiNotifyFlags::NEED_VERIFY,
            NiResponse::Deny,
        ),
        NiNotifyVerifyType::PrivacyOverride => {
            (NiNotifyFlags::PRIVACY_OVERRIDE, NiResponse::NoResponse)
        }
    };
    notif.notify_flags = flags;
    notif.default_response = response;
}

/// Convert an NI indication into the notification presented upward.
///
/// Returns `None` when the indication carries no Vx, UMTS control-plane or
/// SUPL payload.
pub fn convert_ni_request(id: u32, ind: &NiNotifyVerifyInd) -> Option<NiNotification> {
    let mut notif;

    if let Some(vx) = &ind.vx {
        notif = NiNotification::new(id, NiType::Voice);
        notif.requestor_id = hexcode(&vx.requestor_id, REQUESTOR_ID_SIZE);
        notif.requestor_id_encoding = NiEncoding::Unknown;
    } else if let Some(cp) = &ind.umts_cp {
        notif = NiNotification::new(id, NiType::UmtsCtrlPlane);
        notif.text = hexcode(&cp.notification_text, TEXT_SIZE);
        notif.requestor_id = hexcode(&cp.requestor_id, REQUESTOR_ID_SIZE);
        notif.text_encoding = convert_encoding(cp.data_coding_scheme);
        notif.requestor_id_encoding = convert_encoding(cp.requestor_id_dcs);
        if !cp.client_address.is_empty() {
            notif.extras = format!(
                "{} = {}",
                EXTRAS_ADDRESS_KEY,
                decode_bcd_address(&cp.client_address)
            );
        }
    } else if let Some(supl) = &ind.supl {
        let ni_type = if ind.supl_emergency.is_some() {
            NiType::EmergencySupl
        } else {
            NiType::UmtsSupl
        };
        notif = NiNotification::new(id, ni_type);
        if let Some(name) = &supl.client_name {
            notif.text = hexcode(&name.data, TEXT_SIZE);
        }
        if let Some(requestor) = &supl.requestor_id {
            notif.requestor_id = hexcode(&requestor.data, REQUESTOR_ID_SIZE);
        }
        let encoding = supl
            .data_coding_scheme
            .map(convert_encoding)
            .unwrap_or(NiEncoding::Unknown);
        notif.text_encoding = encoding;
        notif.requestor_id_encoding = encoding;
    } else {
        debug!("NI request without a supported payload");
        return None;
    }

    apply_notify_type(&mut notif, ind.notification_type);
    Some(notif)
}
