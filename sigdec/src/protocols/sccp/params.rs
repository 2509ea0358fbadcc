use crate::error::Step;
use crate::{Decoder, DiagnosticKind, Dispatch, SccpVariant};

use super::address::{address, Address};
use super::vals::*;

/// What the rest of the message needs from the parameters decoded so far.
#[derive(Debug, Default)]
pub(super) struct Collected {
    pub destination_reference: Option<u32>,
    pub source_reference: Option<u32>,
    pub called: Option<Address>,
    pub calling: Option<Address>,
    pub data: Option<Vec<u8>>,
    pub segmentation: Option<Segmentation>,
    /// A parameter reached through a pointer ran off the buffer.
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Segmentation {
    pub first: bool,
    pub class: u8,
    pub remaining: u8,
    pub reference: u32,
}

/// Decodes the value of `param`, which occupies `len` octets.
pub(super) fn value(
    dec: &mut Decoder,
    param: Parameter,
    len: usize,
    variant: SccpVariant,
    st: &mut Collected,
) -> Step<()> {
    match param {
        Parameter::DestinationLocalReference => {
            st.destination_reference = Some(dec.uint_le("Destination Local Reference", 3)? as u32);
        }
        Parameter::SourceLocalReference => {
            st.source_reference = Some(dec.uint_le("Source Local Reference", 3)? as u32);
        }
        Parameter::CalledPartyAddress => st.called = Some(address(dec, variant)?),
        Parameter::CallingPartyAddress => st.calling = Some(address(dec, variant)?),
        Parameter::ProtocolClass => {
            dec.uint_vals("Message Handling", 4, MESSAGE_HANDLING)?;
            dec.uint("Class", 4)?;
        }
        Parameter::SegmentingReassembling => {
            dec.reserved(7)?;
            dec.flag_labelled("More Data", ("More data follows", "No more data"))?;
        }
        Parameter::ReceiveSequenceNumber => {
            dec.uint("P(R)", 7)?;
            dec.reserved(1)?;
        }
        Parameter::SequencingSegmenting => {
            dec.uint("P(S)", 7)?;
            dec.reserved(1)?;
            dec.uint("P(R)", 7)?;
            dec.flag_labelled("More Data", ("More data follows", "No more data"))?;
        }
        Parameter::Credit => {
            dec.uint("Credit", 8)?;
        }
        Parameter::ReleaseCause => {
            dec.uint_vals("Release Cause", 8, RELEASE_CAUSES)?;
        }
        Parameter::ReturnCause => {
            dec.uint_vals("Return Cause", 8, RETURN_CAUSES)?;
        }
        Parameter::ResetCause => {
            dec.uint_vals("Reset Cause", 8, RESET_CAUSES)?;
        }
        Parameter::ErrorCause => {
            dec.uint_vals("Error Cause", 8, ERROR_CAUSES)?;
        }
        Parameter::RefusalCause => {
            dec.uint_vals("Refusal Cause", 8, REFUSAL_CAUSES)?;
        }
        Parameter::Data | Parameter::LongData => {
            st.data = Some(dec.bytes("Data", len)?);
        }
        Parameter::Segmentation => {
            let first = dec.flag_labelled("First Segment", ("First", "Not first"))?;
            let class = dec.uint("Class", 1)? as u8;
            dec.reserved(2)?;
            let remaining = dec.uint("Remaining Segments", 4)? as u8;
            let reference = dec.uint_le("Segmentation Local Reference", 3)? as u32;
            st.segmentation = Some(Segmentation {
                first,
                class,
                remaining,
                reference,
            });
        }
        Parameter::HopCounter => {
            dec.uint("Hop Counter", 8)?;
        }
        Parameter::Importance => {
            dec.reserved(5)?;
            dec.uint("Importance", 3)?;
        }
        Parameter::EndOfOptionalParameters => {}
        Parameter::Unknown => {
            dec.rest("Value")?;
        }
    }
    Ok(())
}

/// `TAG LEN VALUE` triples up to the end-of-optional-parameters tag.
pub(super) fn optional_part(dec: &mut Decoder, variant: SccpVariant, st: &mut Collected) -> Step<()> {
    let mut index = 0;
    while dec.remaining_bits() >= 8 {
        let tag = dec.peek(8)?;
        if tag == 0 {
            dec.uint_vals("Parameter Name", 8, Parameter::VALUES)?;
            return Ok(());
        }
        index += 1;
        let param = Parameter::classify(tag).unwrap_or(Parameter::Unknown);
        tracing::trace!(index, ?param, "optional parameter");
        dec.subtree(param.label(), |dec| {
            dec.uint_vals("Parameter Name", 8, Parameter::VALUES)?;
            let len = dec.uint("Length", 8)? as usize;
            if param == Parameter::Unknown {
                dec.diag(DiagnosticKind::UnsupportedRecordType(tag), "optional parameter");
            }
            dec.bounded(len, |dec| value(dec, param, len, variant, st))
        })?;
    }
    Ok(())
}
