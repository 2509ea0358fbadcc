//! Called and calling party addresses.

use crate::e164;
use crate::error::Step;
use crate::{Decoder, DiagnosticKind, SccpVariant};

use super::vals::*;

/// Routing information found in one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Address {
    pub point_code: Option<u32>,
    pub ssn: Option<u8>,
    pub digits: Option<String>,
}

struct Indicator {
    gti: u64,
    ssn: bool,
    point_code: bool,
}

pub(super) fn address(dec: &mut Decoder, variant: SccpVariant) -> Step<Address> {
    let ind = dec.subtree("Address Indicator", |dec| indicator(dec, variant))?;
    let mut addr = Address::default();
    match variant {
        SccpVariant::Itu => {
            if ind.point_code {
                addr.point_code = Some(itu_point_code(dec)?);
            }
            if ind.ssn {
                addr.ssn = Some(subsystem(dec)?);
            }
        }
        SccpVariant::Ansi => {
            if ind.ssn {
                addr.ssn = Some(subsystem(dec)?);
            }
            if ind.point_code {
                addr.point_code = Some(ansi_point_code(dec)?);
            }
        }
    }
    if ind.gti != 0 {
        addr.digits = dec.subtree("Global Title", |dec| global_title(dec, variant, ind.gti))?;
    }
    Ok(addr)
}

fn indicator(dec: &mut Decoder, variant: SccpVariant) -> Step<Indicator> {
    dec.flag("Reserved for National Use")?;
    dec.flag_labelled("Routing Indicator", ROUTING_INDICATORS)?;
    let gti = dec.uint_vals("Global Title Indicator", 4, gti_values(variant))?;
    let (ssn, point_code) = match variant {
        SccpVariant::Itu => {
            let ssn = dec.flag("SSN Indicator")?;
            (ssn, dec.flag("Point Code Indicator")?)
        }
        SccpVariant::Ansi => {
            let point_code = dec.flag("Point Code Indicator")?;
            (dec.flag("SSN Indicator")?, point_code)
        }
    };
    Ok(Indicator {
        gti,
        ssn,
        point_code,
    })
}

fn subsystem(dec: &mut Decoder) -> Step<u8> {
    Ok(dec.uint_vals("Subsystem Number", 8, SUBSYSTEMS)? as u8)
}

/// 14 bits, least significant octet first.
fn itu_point_code(dec: &mut Decoder) -> Step<u32> {
    let start = dec.position();
    let lo = dec.take(8)?;
    let hi = dec.take(8)?;
    let pc = ((hi & 0x3F) << 8) | lo;
    dec.computed("Point Code", start, pc);
    Ok(pc as u32)
}

fn ansi_point_code(dec: &mut Decoder) -> Step<u32> {
    let start = dec.position();
    let member = dec.uint("PC Member", 8)?;
    let cluster = dec.uint("PC Cluster", 8)?;
    let network = dec.uint("PC Network", 8)?;
    dec.annotate("Point Code", start, format!("{network}-{cluster}-{member}"));
    Ok(((network << 16) | (cluster << 8) | member) as u32)
}

fn global_title(dec: &mut Decoder, variant: SccpVariant, gti: u64) -> Step<Option<String>> {
    let mut odd = false;
    let mut bcd = true;
    let mut e164 = false;
    match (variant, gti) {
        (SccpVariant::Itu, 1) => {
            odd = dec.flag_labelled("Odd/Even Indicator", ("Odd", "Even"))?;
            e164 = dec.uint_vals("Nature of Address Indicator", 7, NATURE_OF_ADDRESS)? == 4;
        }
        (_, 2) => {
            dec.uint("Translation Type", 8)?;
        }
        (SccpVariant::Itu, 3) | (SccpVariant::Itu, 4) | (SccpVariant::Ansi, 1) => {
            dec.uint("Translation Type", 8)?;
            e164 = dec.uint_vals("Numbering Plan", 4, NUMBERING_PLANS)? == 1;
            let scheme = dec.uint_vals("Encoding Scheme", 4, ENCODING_SCHEMES)?;
            odd = scheme == 1;
            bcd = matches!(scheme, 1 | 2);
            if gti == 4 && variant == SccpVariant::Itu {
                dec.reserved(1)?;
                dec.uint_vals("Nature of Address Indicator", 7, NATURE_OF_ADDRESS)?;
            }
        }
        _ => {
            dec.diag(
                DiagnosticKind::UnsupportedRecordType(gti),
                "global title indicator",
            );
            dec.rest("Global Title Value")?;
            return Ok(None);
        }
    }

    let n = dec.remaining_bytes();
    if n == 0 {
        return Ok(None);
    }
    if !bcd {
        dec.rest("Address Information")?;
        return Ok(None);
    }
    let start = dec.position();
    let mut octets = Vec::with_capacity(n);
    for _ in 0..n {
        octets.push(dec.take(8)? as u8);
    }
    let count = 2 * n - usize::from(odd);
    let digits = dec.tbcd_digits("Global Title", start, &octets, count);
    dec.annotate("Digits", start, digits.clone());
    if e164 {
        dec.annotate("E.164 Number", start, e164::render(&digits));
    }
    Ok(Some(digits))
}
