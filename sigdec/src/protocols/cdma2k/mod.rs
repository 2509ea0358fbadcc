//! CDMA2000 layer 3 signalling (C.S0004 / C.S0005).
//!
//! A message is a bit-packed TLAC header followed by the PDU. The header's channel and message
//! type together select the body grammar.

mod digits;
mod header;
mod messages;
mod orders;
mod vals;

pub use digits::{dtmf, imsi_11_12, imsi_s, mcc};
pub use vals::{Channel, ForwardOrder, HeaderRecordType, InfoRecordType, ReverseOrder};

use crate::error::Step;
use crate::{
    DecodeContext, DecodeResult, DecodeState, Decoder, DiagnosticKind, Dispatch, Grammar,
    Payload, Protocol,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cdma2kMessage {
    Registration,
    OrderIndication,
    DataBurstIndication,
    Origination,
    PageResponse,
    AuthChallengeResponse,
    OrderCommand,
    DataBurstCommand,
    AuthChallengeRequest,
    GeneralPageRequest,
    AlertWithInfo,
    HandoffDirection,
    Unknown,
}

impl Cdma2kMessage {
    /// The message carried as `msg_type` on `channel`.
    pub fn resolve(channel: Channel, msg_type: u64) -> Self {
        use Cdma2kMessage::*;

        match (channel, msg_type) {
            (Channel::RCsch, 1) => Registration,
            (Channel::RCsch, 2) | (Channel::RDsch, 1) => OrderIndication,
            (Channel::RCsch, 3) | (Channel::RDsch, 4) => DataBurstIndication,
            (Channel::RCsch, 4) => Origination,
            (Channel::RCsch, 5) => PageResponse,
            (Channel::RCsch, 6) | (Channel::RDsch, 2) => AuthChallengeResponse,
            (Channel::FCsch, 7) | (Channel::FDsch, 1) => OrderCommand,
            (Channel::FCsch, 9) | (Channel::FDsch, 4) => DataBurstCommand,
            (Channel::FCsch, 10) | (Channel::FDsch, 2) => AuthChallengeRequest,
            (Channel::FCsch, 17) => GeneralPageRequest,
            (Channel::FDsch, 3) => AlertWithInfo,
            (Channel::FDsch, 17) => HandoffDirection,
            _ => Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Cdma2kMessage::Registration => "Registration Message",
            Cdma2kMessage::OrderIndication | Cdma2kMessage::OrderCommand => "Order Message",
            Cdma2kMessage::DataBurstIndication | Cdma2kMessage::DataBurstCommand => {
                "Data Burst Message"
            }
            Cdma2kMessage::Origination => "Origination Message",
            Cdma2kMessage::PageResponse => "Page Response Message",
            Cdma2kMessage::AuthChallengeResponse => "Authentication Challenge Response Message",
            Cdma2kMessage::AuthChallengeRequest => "Authentication Challenge Message",
            Cdma2kMessage::GeneralPageRequest => "General Page Message",
            Cdma2kMessage::AlertWithInfo => "Alert With Information Message",
            Cdma2kMessage::HandoffDirection => "Handoff Direction Message",
            Cdma2kMessage::Unknown => "Unknown Message",
        }
    }
}

pub struct Cdma2k;

impl Grammar for Cdma2k {
    type Message = Cdma2kMessage;

    const PROTOCOL: Protocol = Protocol::Cdma2k;

    fn decode(buffer: &[u8], hint: Option<Cdma2kMessage>, ctx: &DecodeContext) -> DecodeResult {
        let span = tracing::debug_span!("cdma2k", len = buffer.len());
        let _guard = span.enter();

        let mut dec = Decoder::new(Protocol::Cdma2k, buffer, ctx, "CDMA2000");
        let mut message = None;
        let mut payload = None;
        let outcome = decode_message(&mut dec, hint, &mut message, &mut payload);
        dec.conclude(outcome);
        dec.into_result(message.map(Into::into), payload, None)
    }
}

fn decode_message(
    dec: &mut Decoder,
    hint: Option<Cdma2kMessage>,
    message: &mut Option<Cdma2kMessage>,
    payload: &mut Option<Payload>,
) -> Step<()> {
    let mut tlac = None;
    let header = dec.subtree("TLAC Header", |dec| {
        let fixed = header::decode_fixed(dec)?;
        tlac = Some(fixed);
        header::decode_records(dec, &fixed)
    });
    let Some(tlac) = tlac else {
        return header;
    };

    let decoded = Cdma2kMessage::resolve(tlac.channel, tlac.msg_type);
    tracing::debug!(
        channel = tlac.channel.label(),
        p_rev = tlac.p_rev,
        msg_type = tlac.msg_type,
        message = ?decoded,
        "resolved message type"
    );
    let resolved = match hint {
        Some(hinted) if hinted != decoded => {
            dec.diag(
                DiagnosticKind::TypeHintMismatch {
                    hinted: hinted.label().to_string(),
                    decoded: decoded.label().to_string(),
                },
                "decoding as the hinted type",
            );
            hinted
        }
        _ => decoded,
    };
    *message = Some(resolved);
    header?;
    dec.set_state(DecodeState::HeaderDecoded);

    dec.set_state(DecodeState::BodyDecoding);
    if resolved == Cdma2kMessage::Unknown {
        let msg = format!("message type {} on {}", tlac.msg_type, tlac.channel.label());
        dec.diag(DiagnosticKind::UnsupportedMessageType(tlac.msg_type), msg);
        dec.rest("PDU")?;
    } else {
        *payload = dec.subtree(resolved.label(), |dec| {
            messages::decode_body(dec, &tlac, resolved)
        })?;
    }
    let pad = dec.remaining_bits();
    dec.reserved(pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodedField, Failure, FieldKind, PayloadSelector};
    use tracing_test::traced_test;

    /// Packs `(width, value)` pairs MSB first, zero-padding the last byte.
    fn pack(fields: &[(usize, u64)]) -> Vec<u8> {
        let mut bits = Vec::new();
        for &(width, value) in fields {
            for i in (0..width).rev() {
                bits.push((value >> i) & 1 == 1);
            }
        }
        let mut out = vec![0u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.into_iter().enumerate() {
            if bit {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
        out
    }

    fn decode(buffer: &[u8]) -> DecodeResult {
        Cdma2k::decode(buffer, None, &DecodeContext::default())
    }

    fn rendering<'a>(result: &'a DecodeResult, name: &str) -> Option<&'a str> {
        result
            .root
            .find_field(name)
            .map(|f: &DecodedField| f.rendering.as_str())
    }

    #[test]
    fn registration_selector_from_two_bytes() {
        let result = decode(&[0x06, 0x42]);
        assert_eq!(result.message, Some(Cdma2kMessage::Registration.into()));
        assert_eq!(rendering(&result, "CHANNEL"), Some("r-csch (0)"));
        assert_eq!(rendering(&result, "P_REV"), Some("25"));
        assert!(result.root.node("Registration Message").is_some());
        assert!(!result.has_diagnostic(|k| matches!(k, DiagnosticKind::UnsupportedMessageType(_))));
        // The body itself needs more bytes than two.
        assert_eq!(result.state, DecodeState::Failed(Failure::Truncated));
    }

    #[test]
    fn full_registration() {
        let buffer = pack(&[
            (2, 0),
            (8, 7),
            (5, 1),
            (1, 0),
            (4, 1),
            (3, 2),
            (8, 7),
            (8, 0xEA),
            (1, 1),
            (4, 0),
            (1, 1),
            (1, 0),
            (1, 1),
            (16, 0x1234),
            (1, 1),
            (3, 2),
        ]);
        let result = decode(&buffer);
        assert_eq!(result.state, DecodeState::Done);
        assert!(result.diagnostics.is_empty());
        assert_eq!(rendering(&result, "REG_TYPE"), Some("Power-up (1)"));
        assert_eq!(rendering(&result, "UZID"), Some("4660"));
        assert_eq!(rendering(&result, "GEO_LOC_TYPE"), Some("2"));
        assert_eq!(result.root.bit_width, buffer.len() * 8);
    }

    #[test]
    fn low_revision_skips_later_fields() {
        let buffer = pack(&[
            (2, 0),
            (8, 3),
            (5, 1),
            (1, 0),
            (4, 0),
            (3, 0),
            (8, 3),
            (8, 0),
            (1, 0),
            (4, 0),
        ]);
        let result = decode(&buffer);
        assert_eq!(result.state, DecodeState::Done);
        assert!(result.root.find_field("QPCH_SUPPORTED").is_none());
    }

    #[test]
    fn addressing_header_record_with_imsi() {
        let mut fields = vec![
            (2, 0),
            (8, 7),
            (5, 6),
            (1, 1),
            (4, 0),
            (4, 0),
            // Addressing record: 2 + 5 bytes.
            (8, 0),
            (8, 5),
            (3, 2),
            (4, 5),
            // IMSI class 0 type 3: MCC + IMSI_11_12 + IMSI_S.
            (1, 0),
            (2, 3),
            (2, 0),
            (10, 209),
            (7, 36),
        ];
        let s1 = (345 << 14) | (7 << 10) | 789;
        fields.push((34, (12 << 24) | s1));
        fields.push((1, 0));
        let buffer = pack(&fields);
        let result = decode(&buffer);
        // An IMSI with MCC and IMSI_11_12 needs seven octets, not five.
        assert!(result.has_diagnostic(|k| matches!(k, DiagnosticKind::LengthMismatch { .. })));
        assert!(result.root.find_node("MSID").is_some());
    }

    #[test]
    fn imsi_digits_render() {
        let s1 = (345u64 << 14) | (7 << 10) | 789;
        let buffer = pack(&[
            (2, 0),
            (8, 7),
            (5, 6),
            (1, 1),
            (4, 0),
            (4, 0),
            (8, 0),
            (8, 8),
            (3, 2),
            (4, 7),
            (1, 0),
            (2, 3),
            (2, 0),
            (10, 209),
            (7, 36),
            (34, (12 << 24) | s1),
            (1, 0),
            // AUTHU
            (18, 0x2_AAAA),
        ]);
        let result = decode(&buffer);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(rendering(&result, "MCC"), Some("310"));
        assert_eq!(rendering(&result, "IMSI_11_12"), Some("47"));
        assert_eq!(rendering(&result, "IMSI_S"), Some("1234567890"));
        assert_eq!(
            result.message,
            Some(Cdma2kMessage::AuthChallengeResponse.into())
        );
        let authu = result.root.find_field("AUTHU").unwrap();
        assert_eq!(authu.value(), Some(0x2_AAAA));
    }

    #[test]
    fn unknown_header_record_is_kept_as_bytes() {
        let buffer = pack(&[
            (2, 0),
            (8, 7),
            (5, 6),
            (1, 1),
            (4, 0),
            (4, 0),
            (8, 9),
            (8, 2),
            (16, 0xBEEF),
            (18, 1),
        ]);
        let result = decode(&buffer);
        assert!(result.has_diagnostic(|k| *k == DiagnosticKind::UnsupportedRecordType(9)));
        assert_eq!(rendering(&result, "Record Value"), Some("beef"));
        assert_eq!(result.state, DecodeState::Done);
    }

    #[test]
    fn order_with_additional_record_bitmap() {
        // f-dsch Release Order with two octets of order-specific fields.
        let buffer = pack(&[
            (2, 3),
            (8, 7),
            (5, 1),
            (1, 0),
            (1, 0),
            (6, 0),
            (6, 21),
            (3, 2),
            (8, 0x02),
            (8, 0xA5),
        ]);
        let result = decode(&buffer);
        assert_eq!(result.message, Some(Cdma2kMessage::OrderCommand.into()));
        assert_eq!(rendering(&result, "ORDER"), Some("Release Order (21)"));
        assert_eq!(rendering(&result, "ORDQ"), Some("2"));
        let extra = result.root.find_field("Additional Record").unwrap();
        assert_eq!((extra.bit_width, extra.kind), (8, FieldKind::Bitmap));
        assert_eq!(extra.rendering, "10100101");
    }

    #[test]
    fn mobile_station_reject_reads_qualifier_first() {
        let buffer = pack(&[
            (2, 2),
            (8, 7),
            (5, 1),
            (1, 0),
            (6, 12),
            (3, 4),
            (8, 1),
            (8, 1),
            (8, 21),
            (8, 0),
        ]);
        let result = decode(&buffer);
        assert_eq!(rendering(&result, "REJECTED_TYPE"), Some("Order Message (1)"));
        assert_eq!(rendering(&result, "REJECTED_ORDER"), Some("Release Order (21)"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn bcmc_order_programs_and_flows() {
        let body = [
            (8, 0),
            (6, 1),
            (5, 3),
            (4, 0b1010),
            (3, 2),
            (1, 0),
            (8, 2),
            (2, 1),
            (2, 2),
        ];
        let body_bits: usize = body.iter().map(|(w, _)| w).sum();
        let mut fields = vec![
            (2, 3),
            (8, 7),
            (5, 1),
            (1, 0),
            (1, 0),
            (6, 0),
            (6, 34),
            (3, body_bits.div_ceil(8) as u64),
        ];
        fields.extend(body);
        let result = decode(&pack(&fields));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let program = result.root.find_node("BCMC Program [1]").unwrap();
        assert_eq!(program.field("BCMC_PROGRAM_ID").unwrap().rendering, "1010");
        assert_eq!(program.nodes().count(), 2);
        assert_eq!(
            program.node("Flow [2]").unwrap().field("FLOW_DISCRIMINATOR").unwrap().rendering,
            "10"
        );
    }

    #[test]
    fn data_burst_exposes_payload() {
        let buffer = pack(&[
            (2, 0),
            (8, 7),
            (5, 3),
            (1, 0),
            (8, 1),
            (6, 3),
            (8, 1),
            (8, 3),
            (8, b'a' as u64),
            (8, b'b' as u64),
            (8, b'c' as u64),
        ]);
        let result = decode(&buffer);
        let payload = result.payload.unwrap();
        assert_eq!(payload.selector, Some(PayloadSelector::BurstType(3)));
        assert_eq!(payload.bytes, b"abc");
        assert!(!payload.reassembled);
    }

    #[test]
    fn origination_dtmf_digits() {
        let buffer = pack(&[
            (2, 0),
            (8, 7),
            (5, 4),
            (1, 0),
            (1, 0),
            (3, 0),
            (8, 7),
            (8, 0),
            (3, 1),
            (1, 0),
            (1, 0),
            (1, 0),
            (1, 0),
            (8, 4),
            (4, 9),
            (4, 10),
            (4, 11),
            (4, 1),
            (1, 1),
            (1, 0),
            (1, 1),
        ]);
        let result = decode(&buffer);
        assert_eq!(rendering(&result, "CHARi"), Some("90*1"));
        assert_eq!(result.state, DecodeState::Done);
    }

    #[test]
    fn general_page_records_until_terminator() {
        let buffer = pack(&[
            (2, 1),
            (8, 7),
            (5, 17),
            (1, 0),
            (6, 1),
            (6, 2),
            (5, 0),
            (4, 0),
            (3, 0),
            // TMSI, 16-bit code
            (2, 2),
            (2, 0),
            (3, 5),
            (16, 0xCAFE),
            (1, 0),
            // broadcast
            (2, 3),
            (2, 0),
            (6, 3),
            (4, 1),
            (8, 0x42),
            // terminator
            (2, 3),
            (2, 3),
        ]);
        let result = decode(&buffer);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let records: Vec<_> = result
            .root
            .find_node("General Page Message")
            .unwrap()
            .nodes()
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(records, ["Page Record [1]", "Page Record [2]"]);
        assert_eq!(rendering(&result, "TMSI_CODE_ADDR"), Some("51966"));
        assert_eq!(rendering(&result, "BC_ADDR"), Some("42"));
    }

    #[test]
    fn alert_with_info_records() {
        let buffer = pack(&[
            (2, 3),
            (8, 7),
            (5, 3),
            (1, 0),
            // Display "Hi"
            (8, 1),
            (8, 2),
            (8, b'H' as u64),
            (8, b'i' as u64),
            // Signal
            (8, 5),
            (8, 2),
            (2, 1),
            (2, 0),
            (6, 3),
            (6, 0),
            // Unknown
            (8, 0x7F),
            (8, 1),
            (8, 0xEE),
        ]);
        let result = decode(&buffer);
        let body = result.root.find_node("Alert With Information Message").unwrap();
        assert_eq!(body.nodes().count(), 3);
        assert_eq!(
            body.node("Information Record [1]").unwrap().find_field("CHARi").unwrap().rendering,
            "Hi"
        );
        assert_eq!(rendering(&result, "SIGNAL_TYPE"), Some("ISDN Alerting (1)"));
        assert!(result.has_diagnostic(|k| *k == DiagnosticKind::UnsupportedRecordType(0x7F)));
        assert_eq!(result.state, DecodeState::Done);
    }

    #[test]
    fn handoff_direction_active_set() {
        let buffer = pack(&[
            (2, 3),
            (8, 6),
            (5, 17),
            (1, 0),
            (1, 0),
            (2, 1),
            (1, 0),
            (1, 0),
            (3, 2),
            (9, 100),
            (1, 0),
            (8, 5),
            (1, 1),
            (3, 0),
            (2, 1),
            (2, 2),
            (9, 200),
            (1, 1),
            (8, 6),
            (1, 0),
        ]);
        let result = decode(&buffer);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let second = result.root.find_node("Active Set Record [2]").unwrap();
        assert_eq!(second.field("PILOT_PN").unwrap().value(), Some(200));
        let first = result.root.find_node("Active Set Record [1]").unwrap();
        assert_eq!(first.field("TD_MODE").unwrap().value(), Some(2));
    }

    #[test]
    fn unknown_message_is_opaque() {
        let buffer = pack(&[(2, 1), (8, 7), (5, 31), (1, 0), (16, 0xABCD)]);
        let result = decode(&buffer);
        assert_eq!(result.message, Some(Cdma2kMessage::Unknown.into()));
        assert!(result.has_diagnostic(|k| *k == DiagnosticKind::UnsupportedMessageType(31)));
        assert_eq!(rendering(&result, "PDU"), Some("abcd"));
    }

    #[test]
    fn hint_overrides_and_is_flagged() {
        let ctx = DecodeContext::default();
        let buffer = pack(&[(2, 0), (8, 7), (5, 6), (1, 0), (18, 5), (6, 0)]);
        let result = Cdma2k::decode(&buffer, Some(Cdma2kMessage::AuthChallengeRequest), &ctx);
        assert_eq!(
            result.message,
            Some(Cdma2kMessage::AuthChallengeRequest.into())
        );
        assert!(result.has_diagnostic(|k| matches!(k, DiagnosticKind::TypeHintMismatch { .. })));
        assert!(result.root.find_field("RANDU").is_some());
    }

    #[test]
    #[traced_test]
    fn diagnostics_are_logged() {
        decode(&[0x06]);
        assert!(logs_contain("diagnostic"));
        assert!(logs_contain("bits requested"));
    }
}
