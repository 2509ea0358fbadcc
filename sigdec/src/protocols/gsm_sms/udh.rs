//! User data header information elements.

use crate::error::Step;
use crate::{Decoder, Dispatch};

use super::vals::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Concat {
    pub reference: u16,
    pub total: u8,
    /// 1-based.
    pub number: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Header {
    /// Octets taken by the header including the length octet.
    pub octets: usize,
    pub concat: Option<Concat>,
    /// Destination and originator ports.
    pub ports: Option<(u16, u16)>,
}

pub(super) fn header(dec: &mut Decoder) -> Step<Header> {
    let udhl = dec.uint("UDHL", 8)? as usize;
    let mut header = Header {
        octets: udhl + 1,
        ..Header::default()
    };
    dec.record("User Data Header", udhl, |dec| {
        let mut index = 0;
        while dec.remaining_bits() >= 16 {
            index += 1;
            element(dec, index, &mut header)?;
        }
        Ok(())
    })?;
    Ok(header)
}

fn element(dec: &mut Decoder, index: usize, header: &mut Header) -> Step<()> {
    let code = dec.peek(8)?;
    let iei = InformationElement::classify(code).unwrap_or(InformationElement::Other);
    tracing::trace!(index, ?iei, "information element");

    dec.subtree(iei.label(), |dec| {
        dec.uint_vals("IEI", 8, InformationElement::VALUES)?;
        let len = dec.uint("IEDL", 8)? as usize;
        dec.bounded(len, |dec| match iei {
            InformationElement::Concat8 | InformationElement::Concat16 => {
                let width = if iei == InformationElement::Concat8 { 8 } else { 16 };
                let reference = dec.uint("Message Reference", width)? as u16;
                let total = dec.uint("Message Parts", 8)? as u8;
                let number = dec.uint("Message Part Number", 8)? as u8;
                if number == 0 || number > total {
                    tracing::debug!(total, number, "ignoring invalid concatenation element");
                } else {
                    header.concat = Some(Concat {
                        reference,
                        total,
                        number,
                    });
                }
                Ok(())
            }
            InformationElement::Ports8 | InformationElement::Ports16 => {
                let width = if iei == InformationElement::Ports8 { 8 } else { 16 };
                let destination = dec.uint("Destination Port", width)? as u16;
                let originator = dec.uint("Originator Port", width)? as u16;
                header.ports = Some((destination, originator));
                Ok(())
            }
            InformationElement::SpecialIndication => {
                dec.flag_labelled("Storage", ("Store message", "Discard message"))?;
                dec.uint_vals("Message Indication Type", 7, SPECIAL_INDICATIONS)?;
                dec.uint("Message Count", 8).map(drop)
            }
            InformationElement::SingleShift | InformationElement::LockingShift => {
                dec.uint("National Language Identifier", 8).map(drop)
            }
            InformationElement::Other => dec.rest("IE Data").map(drop),
        })?;
        Ok(())
    })
}
