//! GSM short message transfer layer (3GPP TS 23.040).
//!
//! TP-MTI in the two low bits of the first octet only names the TPDU together with the direction
//! of transfer: the same code is SMS-DELIVER towards the mobile and SMS-DELIVER-REPORT from it.

mod fields;
mod text;
mod tpdu;
mod udh;
mod vals;

pub use text::{gsm7_to_string, ucs2_to_string, unpack_septets};
pub use vals::InformationElement;

use crate::error::Step;
use crate::{
    ConversationKey, DecodeContext, DecodeResult, DecodeState, Decoder, DiagnosticKind,
    Direction, Fragment, FragmentKey, FragmentParams, Grammar, Payload, PayloadSelector,
    Protocol, ReassemblyResult,
};

use tpdu::UserData;
use udh::Concat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmsMessage {
    Deliver,
    DeliverReport,
    Submit,
    SubmitReport,
    StatusReport,
    Command,
    Reserved,
}

impl SmsMessage {
    pub fn resolve(mti: u8, direction: Direction) -> Self {
        match (direction, mti & 0x03) {
            (Direction::Downlink, 0) => SmsMessage::Deliver,
            (Direction::Downlink, 1) => SmsMessage::SubmitReport,
            (Direction::Downlink, 2) => SmsMessage::StatusReport,
            (Direction::Uplink, 0) => SmsMessage::DeliverReport,
            (Direction::Uplink, 1) => SmsMessage::Submit,
            (Direction::Uplink, 2) => SmsMessage::Command,
            _ => SmsMessage::Reserved,
        }
    }

    /// The direction this TPDU travels in.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            SmsMessage::Deliver | SmsMessage::SubmitReport | SmsMessage::StatusReport => {
                Some(Direction::Downlink)
            }
            SmsMessage::DeliverReport | SmsMessage::Submit | SmsMessage::Command => {
                Some(Direction::Uplink)
            }
            SmsMessage::Reserved => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmsMessage::Deliver => "SMS-DELIVER",
            SmsMessage::DeliverReport => "SMS-DELIVER-REPORT",
            SmsMessage::Submit => "SMS-SUBMIT",
            SmsMessage::SubmitReport => "SMS-SUBMIT-REPORT",
            SmsMessage::StatusReport => "SMS-STATUS-REPORT",
            SmsMessage::Command => "SMS-COMMAND",
            SmsMessage::Reserved => "Reserved",
        }
    }
}

pub struct GsmSms;

impl Grammar for GsmSms {
    type Message = SmsMessage;

    const PROTOCOL: Protocol = Protocol::GsmSms;

    fn decode(buffer: &[u8], hint: Option<SmsMessage>, ctx: &DecodeContext) -> DecodeResult {
        let span = tracing::debug_span!("gsm_sms", len = buffer.len());
        let _guard = span.enter();

        let mut dec = Decoder::new(Protocol::GsmSms, buffer, ctx, "GSM SMS");
        let mut message = None;
        let mut payload = None;
        let outcome = decode_message(&mut dec, hint, &mut message, &mut payload);
        dec.conclude(outcome);
        dec.into_result(message.map(Into::into), payload, None)
    }
}

fn decode_message(
    dec: &mut Decoder,
    hint: Option<SmsMessage>,
    message: &mut Option<SmsMessage>,
    payload: &mut Option<Payload>,
) -> Step<()> {
    let ctx = dec.context();
    let direction = ctx
        .direction
        .unwrap_or(ctx.options.gsm_sms.default_direction);
    let mti = dec.peek(8)? as u8 & 0x03;
    let decoded = SmsMessage::resolve(mti, direction);
    tracing::debug!(mti, ?direction, message = ?decoded, "resolved message type");

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
    dec.set_state(DecodeState::HeaderDecoded);

    dec.set_state(DecodeState::BodyDecoding);
    let body: fn(&mut Decoder) -> Step<Option<UserData>> = match resolved {
        SmsMessage::Deliver => tpdu::deliver,
        SmsMessage::DeliverReport => tpdu::deliver_report,
        SmsMessage::Submit => tpdu::submit,
        SmsMessage::SubmitReport => tpdu::submit_report,
        SmsMessage::StatusReport => tpdu::status_report,
        SmsMessage::Command => tpdu::command,
        SmsMessage::Reserved => {
            dec.diag(
                DiagnosticKind::UnsupportedMessageType(u64::from(mti)),
                format!("TP-MTI {mti} is reserved"),
            );
            dec.rest("TPDU")?;
            return Ok(());
        }
    };
    if let Some(ud) = dec.subtree(resolved.label(), body)? {
        let direction = resolved.direction().unwrap_or(direction);
        *payload = user_payload(dec, direction, ud);
    }
    Ok(())
}

fn user_payload(dec: &mut Decoder, direction: Direction, ud: UserData) -> Option<Payload> {
    let selector = ud
        .header
        .and_then(|h| h.ports)
        .map(|(destination, _)| PayloadSelector::Port(destination));
    match ud.header.and_then(|h| h.concat) {
        Some(concat) if concat.total > 1 && dec.context().options.gsm_sms.reassemble => {
            let bytes = reassemble(dec, direction, &ud, concat)?;
            Some(Payload {
                selector,
                bytes,
                reassembled: true,
            })
        }
        _ => Some(Payload {
            selector,
            bytes: ud.body,
            reassembled: false,
        }),
    }
}

/// Adds one part of a concatenated message. Once every part is in, the text of each part is
/// rendered with its own parameters and joined.
fn reassemble(
    dec: &mut Decoder,
    direction: Direction,
    ud: &UserData,
    concat: Concat,
) -> Option<Vec<u8>> {
    let ctx = dec.context();
    let key = FragmentKey {
        protocol: Protocol::GsmSms,
        conversation: ConversationKey {
            endpoints: ctx.endpoints,
            direction: Some(direction),
            association: None,
        },
        message_reference: u32::from(concat.reference),
    };
    let sequence = u32::from(concat.number) - 1;
    let fragment = Fragment {
        sequence,
        payload: &ud.body,
        is_last: concat.number == concat.total,
        total_hint: Some(u32::from(concat.total)),
        params: Some(FragmentParams {
            user_data_length: ud.length as u32,
            fill_bits: ud.fill_bits,
            encoding: ud.encoding,
        }),
    };
    let outcome = ctx.reassembly.add_fragment_with_params(key, fragment);
    if let Some((previous, current)) = outcome.inconsistent_total {
        dec.diag(
            DiagnosticKind::InconsistentTotalHint { previous, current },
            format!("message reference {}", concat.reference),
        );
    }

    match outcome.result {
        ReassemblyResult::Complete(bytes) => {
            let rendered: String = ctx
                .reassembly
                .lookup_params(&key)
                .map(|entry| {
                    entry
                        .received_fragments
                        .values()
                        .filter_map(|part| {
                            let params = part.params?;
                            text::render(
                                params.encoding,
                                &part.payload,
                                params.fill_bits,
                                params.user_data_length as usize,
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            if !rendered.is_empty() {
                let at = dec.position();
                dec.annotate("Reassembled Text", at, rendered);
            }
            Some(bytes)
        }
        ReassemblyResult::Incomplete => None,
        ReassemblyResult::DuplicateSequence => {
            dec.diag(
                DiagnosticKind::DuplicateSequence(sequence),
                format!("part {} of {}", concat.number, concat.total),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeOptions, GsmSmsOptions, TextEncoding};

    const SCTS: [u8; 7] = [0x62, 0x01, 0x61, 0x21, 0x43, 0x65, 0x80];

    fn rendering<'a>(result: &'a DecodeResult, name: &str) -> &'a str {
        result.root.find_field(name).unwrap().rendering.as_str()
    }

    fn uplink() -> DecodeContext {
        DecodeContext::default().with_direction(Direction::Uplink)
    }

    #[test]
    fn deliver_with_text_and_timestamp() {
        let mut tpdu = vec![0x04, 0x0B, 0x91, 0x44, 0x77, 0x00, 0x09, 0x10, 0xF2, 0x00, 0x00];
        tpdu.extend(SCTS);
        tpdu.extend([0x05, 0xE8, 0x32, 0x9B, 0xFD, 0x06]);

        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        assert_eq!(result.message, Some(SmsMessage::Deliver.into()));
        assert_eq!(rendering(&result, "TP-MMS"), "No more messages waiting");
        assert_eq!(rendering(&result, "Address"), "+44 770090012");
        assert_eq!(rendering(&result, "Hour"), "12");
        assert_eq!(rendering(&result, "Timestamp"), "26-10-16 12:34:56 +02:00");
        assert_eq!(rendering(&result, "Text"), "hello");

        let payload = result.payload.unwrap();
        assert_eq!(payload.bytes, [0xE8, 0x32, 0x9B, 0xFD, 0x06]);
        assert_eq!(payload.selector, None);
        assert!(!payload.reassembled);
    }

    #[test]
    fn submit_with_ucs2_and_relative_validity() {
        let tpdu = [
            0x11, 0x05, 0x04, 0x81, 0x21, 0x43, 0x00, 0x08, 0xA7, 0x04, 0x00, 0x48, 0x00, 0x69,
        ];
        let result = GsmSms::decode(&tpdu, None, &uplink());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        assert_eq!(result.message, Some(SmsMessage::Submit.into()));
        assert_eq!(rendering(&result, "Address"), "1234");
        assert_eq!(rendering(&result, "Character Set"), "UCS2 (16 bit) (2)");
        assert_eq!(rendering(&result, "TP-VP"), "24 hours");
        assert_eq!(rendering(&result, "Text"), "Hi");
    }

    #[test]
    fn direction_selects_the_tpdu() {
        let mut tpdu = vec![0x01, 0x00];
        tpdu.extend(SCTS);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert_eq!(result.message, Some(SmsMessage::SubmitReport.into()));
        assert!(result.is_done(), "{:?}", result.diagnostics);

        let opts = DecodeOptions {
            gsm_sms: GsmSmsOptions {
                default_direction: Direction::Uplink,
                ..GsmSmsOptions::default()
            },
            ..DecodeOptions::default()
        };
        let ctx = DecodeContext::default().with_options(opts);
        let result = GsmSms::decode(&tpdu, None, &ctx);
        assert_eq!(result.message, Some(SmsMessage::Submit.into()));
    }

    #[test]
    fn report_failure_cause_is_detected_by_its_high_bit() {
        let mut tpdu = vec![0x01, 0xC0, 0x00];
        tpdu.extend(SCTS);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        assert_eq!(rendering(&result, "TP-FCS"), "SC busy (192)");
    }

    fn concatenated_deliver(reference: u8, total: u8, number: u8, data: &[u8]) -> Vec<u8> {
        let mut tpdu = vec![0x44, 0x04, 0x81, 0x21, 0x43, 0x00, 0x04];
        tpdu.extend(SCTS);
        tpdu.push(6 + data.len() as u8);
        tpdu.extend([0x05, 0x00, 0x03, reference, total, number]);
        tpdu.extend(data);
        tpdu
    }

    #[test]
    fn concatenated_parts_reassemble_in_part_order() {
        let ctx = DecodeContext::default();
        let part = |n: u8| {
            let tpdu = concatenated_deliver(7, 3, n, &[n * 0x10, n * 0x10 + 1]);
            GsmSms::decode(&tpdu, None, &ctx)
        };

        let second = part(2);
        assert!(second.is_done(), "{:?}", second.diagnostics);
        assert!(second.payload.is_none());
        assert_eq!(rendering(&second, "Message Part Number"), "2");
        assert!(part(1).payload.is_none());

        let third = part(3);
        let payload = third.payload.unwrap();
        assert!(payload.reassembled);
        assert_eq!(payload.bytes, [0x10, 0x11, 0x20, 0x21, 0x30, 0x31]);

        let key = FragmentKey {
            protocol: Protocol::GsmSms,
            conversation: ConversationKey {
                endpoints: ctx.endpoints,
                direction: Some(Direction::Downlink),
                association: None,
            },
            message_reference: 7,
        };
        let entry = ctx.reassembly.lookup_params(&key).unwrap();
        assert!(entry.is_complete);
        assert_eq!(entry.expected_total_fragments, Some(3));
        let params = entry.received_fragments[&0].params.unwrap();
        assert_eq!(params.encoding, TextEncoding::Octet);
        assert_eq!(params.user_data_length, 2);
    }

    #[test]
    fn single_part_message_skips_the_tracker() {
        let ctx = DecodeContext::default();
        let result = GsmSms::decode(&concatenated_deliver(4, 1, 1, &[0xAB]), None, &ctx);
        let payload = result.payload.unwrap();
        assert_eq!(payload.bytes, [0xAB]);
        assert!(!payload.reassembled);
        assert!(ctx.reassembly.is_empty());
    }

    #[test]
    fn duplicate_part_is_flagged() {
        let ctx = DecodeContext::default();
        let tpdu = concatenated_deliver(9, 2, 1, &[0xAA]);
        GsmSms::decode(&tpdu, None, &ctx);
        let again = GsmSms::decode(&tpdu, None, &ctx);
        assert!(again.has_diagnostic(|k| *k == DiagnosticKind::DuplicateSequence(0)));
        assert!(again.payload.is_none());
    }

    fn gsm7_part(number: u8, chars: &str) -> Vec<u8> {
        let septets: Vec<u8> = chars.bytes().collect();
        let mut tpdu = vec![0x44, 0x04, 0x81, 0x21, 0x43, 0x00, 0x00];
        tpdu.extend(SCTS);
        // Six header octets take seven septets, the last one holding a single fill bit.
        tpdu.push(7 + septets.len() as u8);
        tpdu.extend([0x05, 0x00, 0x03, 0x2A, 0x02, number]);
        tpdu.extend(text::pack_septets(&septets, 1));
        tpdu
    }

    #[test]
    fn gsm7_parts_are_rendered_with_their_own_fill_bits() {
        let ctx = DecodeContext::default();
        let first = GsmSms::decode(&gsm7_part(1, "Hel"), None, &ctx);
        assert!(first.is_done(), "{:?}", first.diagnostics);
        assert_eq!(rendering(&first, "Text"), "Hel");

        let last = GsmSms::decode(&gsm7_part(2, "lo!"), None, &ctx);
        assert_eq!(rendering(&last, "Text"), "lo!");
        assert_eq!(rendering(&last, "Reassembled Text"), "Hello!");
        assert!(last.payload.unwrap().reassembled);
    }

    #[test]
    fn application_port_selects_the_payload() {
        let mut tpdu = vec![0x44, 0x04, 0x81, 0x21, 0x43, 0x00, 0x04];
        tpdu.extend(SCTS);
        tpdu.extend([0x08, 0x06, 0x05, 0x04, 0x0B, 0x84, 0x23, 0xF0, 0xAA]);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        let payload = result.payload.unwrap();
        assert_eq!(payload.selector, Some(PayloadSelector::Port(2948)));
        assert_eq!(payload.bytes, [0xAA]);
    }

    #[test]
    fn alphanumeric_originator() {
        let name = text::pack_septets(b"Info", 0);
        let mut tpdu = vec![0x04, 0x07, 0xD0];
        tpdu.extend(&name);
        tpdu.extend([0x00, 0x04]);
        tpdu.extend(SCTS);
        tpdu.push(0x00);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        assert_eq!(rendering(&result, "Address"), "Info");
        assert_eq!(rendering(&result, "Type of Number"), "Alphanumeric (5)");
    }

    #[test]
    fn status_report_without_parameter_indicator() {
        let mut tpdu = vec![0x06, 0x2A, 0x04, 0x81, 0x21, 0x43];
        tpdu.extend(SCTS);
        tpdu.extend(SCTS);
        tpdu.push(0x00);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        assert_eq!(result.message, Some(SmsMessage::StatusReport.into()));
        assert_eq!(rendering(&result, "TP-ST"), "Short message received by the SME (0)");
        assert!(result.payload.is_none());
    }

    #[test]
    fn command_data_is_kept() {
        let tpdu = [0x02, 0x01, 0x00, 0x02, 0x2A, 0x02, 0x81, 0x21, 0x02, 0xCA, 0xFE];
        let result = GsmSms::decode(&tpdu, None, &uplink());
        assert!(result.is_done(), "{:?}", result.diagnostics);
        assert_eq!(
            rendering(&result, "TP-CT"),
            "Delete previously submitted Short Message (2)"
        );
        let data = result.root.find_field("TP-CD").unwrap();
        assert_eq!(data.raw.as_bytes(), Some(&[0xCA, 0xFE][..]));
    }

    #[test]
    fn malformed_timestamp_digit_is_flagged() {
        let mut tpdu = vec![0x04, 0x02, 0x81, 0x21, 0x00, 0x04];
        tpdu.extend([0xA2, 0x01, 0x61, 0x21, 0x43, 0x65, 0x80]);
        tpdu.push(0x00);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done());
        assert!(result.has_diagnostic(|k| *k == DiagnosticKind::MalformedBcd));
        assert_eq!(rendering(&result, "Year"), "2a");
    }

    #[test]
    fn filler_inside_originator_is_flagged() {
        // Four digits announced, the second octet's low nibble is a filler.
        let mut tpdu = vec![0x04, 0x04, 0x81, 0x21, 0x4F, 0x00, 0x04];
        tpdu.extend(SCTS);
        tpdu.push(0x00);
        let result = GsmSms::decode(&tpdu, None, &DecodeContext::default());
        assert!(result.is_done());
        assert!(result.has_diagnostic(|k| *k == DiagnosticKind::MalformedBcd));
        assert_eq!(rendering(&result, "Address"), "12?4");
    }

    #[test]
    fn reserved_mti_is_unsupported() {
        let result = GsmSms::decode(&[0x03, 0x01], None, &DecodeContext::default());
        assert!(result.is_done());
        assert_eq!(result.message, Some(SmsMessage::Reserved.into()));
        assert!(result.has_diagnostic(|k| *k == DiagnosticKind::UnsupportedMessageType(3)));
    }

    #[test]
    fn hint_wins_over_direction() {
        let mut tpdu = vec![0x01, 0x00];
        tpdu.extend(SCTS);
        let result = GsmSms::decode(&tpdu, Some(SmsMessage::Submit), &DecodeContext::default());
        assert_eq!(result.message, Some(SmsMessage::Submit.into()));
        assert!(result.has_diagnostic(|k| matches!(k, DiagnosticKind::TypeHintMismatch { .. })));
    }
}
