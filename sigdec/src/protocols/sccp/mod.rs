//! Signalling Connection Control Part (Q.713, T1.112).
//!
//! A message is its type octet, the fixed mandatory part, one pointer per mandatory variable
//! parameter, an optional-part pointer where the type has one, and then the variable parameters
//! themselves. Pointers count octets from the pointer itself.

mod address;
mod params;
mod vals;

pub use vals::{Parameter, SccpMessage};

use crate::error::Step;
use crate::{
    AssociationId, ConnectionEvent, ConversationKey, DecodeContext, DecodeError, DecodeResult,
    DecodeState, Decoder, DiagnosticKind, Dispatch, Failure, Fragment, FragmentKey, Grammar,
    LocalReferences, Payload, PayloadSelector, Protocol, ReassemblyResult,
};

use params::{Collected, Segmentation};

/// Parameter layout of one message type.
struct Layout {
    fixed: &'static [Parameter],
    variable: &'static [Parameter],
    optional: bool,
    /// Two-octet pointers and long data length.
    long: bool,
}

impl Layout {
    const fn new(
        fixed: &'static [Parameter],
        variable: &'static [Parameter],
        optional: bool,
        long: bool,
    ) -> Self {
        Layout {
            fixed,
            variable,
            optional,
            long,
        }
    }
}

impl SccpMessage {
    fn layout(&self) -> Layout {
        use Parameter::*;

        const ADDRESSES_AND_DATA: &[Parameter] = &[CalledPartyAddress, CallingPartyAddress, Data];
        const ADDRESSES_AND_LONG_DATA: &[Parameter] =
            &[CalledPartyAddress, CallingPartyAddress, LongData];
        const REFERENCES: &[Parameter] = &[DestinationLocalReference, SourceLocalReference];

        match self {
            SccpMessage::Cr => Layout::new(
                &[SourceLocalReference, ProtocolClass],
                &[CalledPartyAddress],
                true,
                false,
            ),
            SccpMessage::Cc => Layout::new(
                &[DestinationLocalReference, SourceLocalReference, ProtocolClass],
                &[],
                true,
                false,
            ),
            SccpMessage::Cref => {
                Layout::new(&[DestinationLocalReference, RefusalCause], &[], true, false)
            }
            SccpMessage::Rlsd => Layout::new(
                &[DestinationLocalReference, SourceLocalReference, ReleaseCause],
                &[],
                true,
                false,
            ),
            SccpMessage::Rlc | SccpMessage::Rsc => Layout::new(REFERENCES, &[], false, false),
            SccpMessage::Dt1 => Layout::new(
                &[DestinationLocalReference, SegmentingReassembling],
                &[Data],
                false,
                false,
            ),
            SccpMessage::Dt2 => Layout::new(
                &[DestinationLocalReference, SequencingSegmenting],
                &[Data],
                false,
                false,
            ),
            SccpMessage::Ak => Layout::new(
                &[DestinationLocalReference, ReceiveSequenceNumber, Credit],
                &[],
                false,
                false,
            ),
            SccpMessage::Udt => Layout::new(&[ProtocolClass], ADDRESSES_AND_DATA, false, false),
            SccpMessage::Udts => Layout::new(&[ReturnCause], ADDRESSES_AND_DATA, false, false),
            SccpMessage::Ed => Layout::new(&[DestinationLocalReference], &[Data], false, false),
            SccpMessage::Ea => Layout::new(&[DestinationLocalReference], &[], false, false),
            SccpMessage::Rsr => Layout::new(
                &[DestinationLocalReference, SourceLocalReference, ResetCause],
                &[],
                false,
                false,
            ),
            SccpMessage::Err => {
                Layout::new(&[DestinationLocalReference, ErrorCause], &[], false, false)
            }
            SccpMessage::It => Layout::new(
                &[
                    DestinationLocalReference,
                    SourceLocalReference,
                    ProtocolClass,
                    SequencingSegmenting,
                    Credit,
                ],
                &[],
                false,
                false,
            ),
            SccpMessage::Xudt => {
                Layout::new(&[ProtocolClass, HopCounter], ADDRESSES_AND_DATA, true, false)
            }
            SccpMessage::Xudts => {
                Layout::new(&[ReturnCause, HopCounter], ADDRESSES_AND_DATA, true, false)
            }
            SccpMessage::Ludt => {
                Layout::new(&[ProtocolClass, HopCounter], ADDRESSES_AND_LONG_DATA, true, true)
            }
            SccpMessage::Ludts => {
                Layout::new(&[ReturnCause, HopCounter], ADDRESSES_AND_LONG_DATA, true, true)
            }
            SccpMessage::Unknown => Layout::new(&[], &[], false, false),
        }
    }

    /// How the message affects its connection, for connection-oriented types.
    pub fn connection_event(&self) -> Option<ConnectionEvent> {
        match self {
            SccpMessage::Cr => Some(ConnectionEvent::Open),
            SccpMessage::Cc => Some(ConnectionEvent::Confirm),
            SccpMessage::Cref | SccpMessage::Rlsd | SccpMessage::Rlc => {
                Some(ConnectionEvent::Release)
            }
            SccpMessage::Dt1
            | SccpMessage::Dt2
            | SccpMessage::Ak
            | SccpMessage::Ed
            | SccpMessage::Ea
            | SccpMessage::Rsr
            | SccpMessage::Rsc
            | SccpMessage::Err
            | SccpMessage::It => Some(ConnectionEvent::Continue),
            _ => None,
        }
    }

    /// Whether the message may carry a Segmentation parameter.
    pub fn is_segmentable(&self) -> bool {
        matches!(
            self,
            SccpMessage::Xudt | SccpMessage::Xudts | SccpMessage::Ludt | SccpMessage::Ludts
        )
    }
}

pub struct Sccp;

#[derive(Debug, Default)]
struct Outcome {
    message: Option<SccpMessage>,
    payload: Option<Payload>,
    association: Option<AssociationId>,
}

impl Grammar for Sccp {
    type Message = SccpMessage;

    const PROTOCOL: Protocol = Protocol::Sccp;

    fn decode(buffer: &[u8], hint: Option<SccpMessage>, ctx: &DecodeContext) -> DecodeResult {
        let span = tracing::debug_span!("sccp", len = buffer.len());
        let _guard = span.enter();

        let mut dec = Decoder::new(Protocol::Sccp, buffer, ctx, "SCCP");
        let mut out = Outcome::default();
        let outcome = decode_message(&mut dec, hint, &mut out);
        dec.conclude(outcome);
        dec.into_result(out.message.map(Into::into), out.payload, out.association)
    }
}

fn decode_message(dec: &mut Decoder, hint: Option<SccpMessage>, out: &mut Outcome) -> Step<()> {
    let code = dec.uint_vals("Message Type", 8, SccpMessage::VALUES)?;
    let decoded = SccpMessage::classify(code).unwrap_or(SccpMessage::Unknown);
    tracing::debug!(code, message = ?decoded, "resolved message type");
    let message = match hint {
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
    out.message = Some(message);
    dec.set_state(DecodeState::HeaderDecoded);

    if message == SccpMessage::Unknown {
        dec.diag(
            DiagnosticKind::UnsupportedMessageType(code),
            format!("message type {code:#04x}"),
        );
        dec.rest("Message Body")?;
        return Ok(());
    }

    let variant = dec.context().options.sccp.variant;
    let layout = message.layout();
    let mut st = Collected::default();
    dec.set_state(DecodeState::BodyDecoding);

    for &param in layout.fixed {
        dec.subtree(param.label(), |dec| {
            params::value(dec, param, param.fixed_len(), variant, &mut st)
        })?;
    }

    let mut targets = Vec::with_capacity(layout.variable.len());
    for &param in layout.variable {
        let at = pointer(dec, param.pointer_name(), layout.long)?;
        targets.push((param, at));
    }
    let optional = if layout.optional {
        pointer(dec, "Pointer to Optional Parameters", layout.long)?
    } else {
        None
    };

    for (param, at) in targets {
        let Some(at) = at else {
            tracing::debug!(?param, "mandatory parameter pointer is zero");
            continue;
        };
        let ret = dec.detour(param.label(), at, |dec| {
            let len = if param == Parameter::LongData {
                dec.uint_le("Length", 2)?
            } else {
                dec.uint("Length", 8)?
            } as usize;
            dec.bounded(len, |dec| params::value(dec, param, len, variant, &mut st))
        });
        tolerate(ret.map(drop), &mut st)?;
    }

    if let Some(at) = optional {
        dec.set_state(DecodeState::OptionalParametersDecoding);
        let ret = dec.detour("Optional Parameters", at, |dec| {
            params::optional_part(dec, variant, &mut st)
        });
        tolerate(ret, &mut st)?;
    }

    out.association = associate(dec, message, &st);
    out.payload = payload(dec, message, &mut st, out.association);
    if st.truncated {
        dec.set_state(DecodeState::Failed(Failure::Truncated));
    }
    Ok(())
}

/// Reads a pointer and returns the bit offset it points at, or `None` for a zero pointer.
fn pointer(dec: &mut Decoder, name: &'static str, long: bool) -> Step<Option<usize>> {
    let start = dec.position();
    let value = if long {
        dec.uint_le(name, 2)?
    } else {
        dec.uint(name, 8)?
    } as usize;
    Ok((value != 0).then(|| start + value * 8))
}

/// A parameter that ran off the buffer only spoils itself.
fn tolerate(ret: Step<()>, st: &mut Collected) -> Step<()> {
    match ret {
        Err(DecodeError::Truncated) => {
            st.truncated = true;
            Ok(())
        }
        other => other,
    }
}

fn associate(dec: &Decoder, message: SccpMessage, st: &Collected) -> Option<AssociationId> {
    let event = message.connection_event()?;
    let refs = LocalReferences {
        source: st.source_reference,
        destination: st.destination_reference,
    };
    if refs.source.is_none() && refs.destination.is_none() {
        return None;
    }
    let ctx = dec.context();
    Some(ctx.associations.resolve(&ctx.endpoints, refs, event))
}

fn payload(
    dec: &mut Decoder,
    message: SccpMessage,
    st: &mut Collected,
    association: Option<AssociationId>,
) -> Option<Payload> {
    let resolver = &dec.context().associations;
    let mut ssn = st
        .called
        .as_ref()
        .and_then(|a| a.ssn)
        .or_else(|| st.calling.as_ref().and_then(|a| a.ssn));
    if let Some(id) = association {
        match ssn {
            Some(ssn) => resolver.record_ssn(id, ssn),
            None => ssn = resolver.ssn(id),
        }
    }
    let selector = ssn.map(PayloadSelector::Ssn);
    let data = st.data.take()?;

    let reassemble = dec.context().options.sccp.reassemble;
    let (bytes, reassembled) = match st.segmentation {
        Some(seg) if seg.first && seg.remaining == 0 => (data, false),
        Some(seg) if reassemble && message.is_segmentable() => {
            (reassemble_segment(dec, seg, &data, association)?, true)
        }
        _ => (data, false),
    };
    Some(Payload {
        selector,
        bytes,
        reassembled,
    })
}

/// Feeds one segment to the tracker. Returns the whole message once the last segment is in.
fn reassemble_segment(
    dec: &mut Decoder,
    seg: Segmentation,
    data: &[u8],
    association: Option<AssociationId>,
) -> Option<Vec<u8>> {
    let ctx = dec.context();
    let key = FragmentKey {
        protocol: Protocol::Sccp,
        conversation: ConversationKey {
            endpoints: ctx.endpoints,
            direction: ctx.direction,
            association,
        },
        message_reference: seg.reference,
    };
    let remaining = u32::from(seg.remaining);
    let (sequence, total_hint) = if seg.first {
        (0, Some(remaining + 1))
    } else {
        let total = ctx
            .reassembly
            .lookup_params(&key)
            .and_then(|entry| entry.expected_total_fragments)
            .and_then(|total| total.checked_sub(remaining + 1));
        match total {
            Some(sequence) => (sequence, None),
            None => {
                let msg = format!("reference {:#08x}, {remaining} remaining", seg.reference);
                dec.diag(DiagnosticKind::UnplacedSegment, msg);
                return None;
            }
        }
    };
    tracing::debug!(
        reference = seg.reference,
        class = seg.class,
        sequence,
        remaining,
        "segment"
    );

    let fragment = Fragment {
        sequence,
        payload: data,
        is_last: remaining == 0,
        total_hint,
        params: None,
    };
    let outcome = ctx.reassembly.add_fragment_with_params(key, fragment);
    if let Some((previous, current)) = outcome.inconsistent_total {
        dec.diag(
            DiagnosticKind::InconsistentTotalHint { previous, current },
            "segment count changed",
        );
    }
    match outcome.result {
        ReassemblyResult::Complete(bytes) => Some(bytes),
        ReassemblyResult::Incomplete => None,
        ReassemblyResult::DuplicateSequence => {
            dec.diag(DiagnosticKind::DuplicateSequence(sequence), "segment");
            None
        }
    }
}
