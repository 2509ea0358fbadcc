//! TPDU layouts, one procedure per message type.

use crate::error::Step;
use crate::{Decoder, TextEncoding, ValueStrings};

use super::fields::{self, Dcs, Indicators};
use super::text;
use super::udh::{self, Header};
use super::vals::*;

/// TP-UD split into header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct UserData {
    pub header: Option<Header>,
    /// Octets after the header, still packed for 7-bit text.
    pub body: Vec<u8>,
    pub encoding: TextEncoding,
    pub fill_bits: u8,
    /// Length of the body in septets for 7-bit text, octets otherwise.
    pub length: usize,
}

pub(super) fn deliver(dec: &mut Decoder) -> Step<Option<UserData>> {
    dec.flag_labelled("TP-RP", ("Reply path exists", "No reply path"))?;
    let udhi = dec.flag("TP-UDHI")?;
    dec.flag_labelled("TP-SRI", ("Status report requested", "No status report"))?;
    dec.reserved(1)?;
    dec.flag_labelled("TP-LP", ("Forwarded or spawned", "Not forwarded"))?;
    dec.flag_labelled("TP-MMS", ("No more messages waiting", "More messages waiting"))?;
    dec.uint_vals("TP-MTI", 2, MTI_DOWNLINK)?;

    fields::address(dec, "TP-OA")?;
    fields::pid(dec)?;
    let dcs = fields::dcs(dec)?;
    fields::timestamp(dec, "TP-SCTS")?;
    user_data(dec, udhi, dcs).map(Some)
}

pub(super) fn submit(dec: &mut Decoder) -> Step<Option<UserData>> {
    dec.flag_labelled("TP-RP", ("Reply path exists", "No reply path"))?;
    let udhi = dec.flag("TP-UDHI")?;
    dec.flag_labelled("TP-SRR", ("Status report requested", "No status report"))?;
    let vpf = dec.uint_vals("TP-VPF", 2, VP_FORMATS)?;
    dec.flag_labelled("TP-RD", ("Reject duplicates", "Accept duplicates"))?;
    dec.uint_vals("TP-MTI", 2, MTI_UPLINK)?;

    dec.uint("TP-MR", 8)?;
    fields::address(dec, "TP-DA")?;
    fields::pid(dec)?;
    let dcs = fields::dcs(dec)?;
    fields::validity_period(dec, vpf)?;
    user_data(dec, udhi, dcs).map(Some)
}

pub(super) fn status_report(dec: &mut Decoder) -> Step<Option<UserData>> {
    dec.reserved(1)?;
    let udhi = dec.flag("TP-UDHI")?;
    dec.flag_labelled("TP-SRQ", ("Result of a COMMAND", "Result of a SUBMIT"))?;
    dec.reserved(1)?;
    dec.flag_labelled("TP-LP", ("Forwarded or spawned", "Not forwarded"))?;
    dec.flag_labelled("TP-MMS", ("No more messages waiting", "More messages waiting"))?;
    dec.uint_vals("TP-MTI", 2, MTI_DOWNLINK)?;

    dec.uint("TP-MR", 8)?;
    fields::address(dec, "TP-RA")?;
    fields::timestamp(dec, "TP-SCTS")?;
    fields::timestamp(dec, "TP-DT")?;
    dec.uint_vals("TP-ST", 8, STATUSES)?;
    if dec.remaining_bits() < 8 {
        return Ok(None);
    }
    let pi = fields::indicators(dec)?;
    announced(dec, pi, udhi)
}

pub(super) fn command(dec: &mut Decoder) -> Step<Option<UserData>> {
    dec.reserved(1)?;
    dec.flag("TP-UDHI")?;
    dec.flag_labelled("TP-SRR", ("Status report requested", "No status report"))?;
    dec.reserved(3)?;
    dec.uint_vals("TP-MTI", 2, MTI_UPLINK)?;

    dec.uint("TP-MR", 8)?;
    fields::pid(dec)?;
    dec.uint_vals("TP-CT", 8, COMMAND_TYPES)?;
    dec.uint("TP-MN", 8)?;
    fields::address(dec, "TP-DA")?;
    let cdl = dec.uint("TP-CDL", 8)? as usize;
    dec.bytes("TP-CD", cdl)?;
    Ok(None)
}

pub(super) fn deliver_report(dec: &mut Decoder) -> Step<Option<UserData>> {
    let udhi = report_first_octet(dec, MTI_UPLINK)?;
    fields::failure_cause(dec)?;
    if dec.remaining_bits() < 8 {
        return Ok(None);
    }
    let pi = fields::indicators(dec)?;
    announced(dec, pi, udhi)
}

pub(super) fn submit_report(dec: &mut Decoder) -> Step<Option<UserData>> {
    let udhi = report_first_octet(dec, MTI_DOWNLINK)?;
    fields::failure_cause(dec)?;
    let pi = fields::indicators(dec)?;
    fields::timestamp(dec, "TP-SCTS")?;
    announced(dec, pi, udhi)
}

fn report_first_octet(dec: &mut Decoder, mti: ValueStrings) -> Step<bool> {
    dec.reserved(1)?;
    let udhi = dec.flag("TP-UDHI")?;
    dec.reserved(4)?;
    dec.uint_vals("TP-MTI", 2, mti)?;
    Ok(udhi)
}

/// The parameters TP-PI says are present, in wire order.
fn announced(dec: &mut Decoder, pi: Indicators, udhi: bool) -> Step<Option<UserData>> {
    if pi.pid {
        fields::pid(dec)?;
    }
    let dcs = if pi.dcs { fields::dcs(dec)? } else { Dcs::default() };
    if pi.udl {
        user_data(dec, udhi, dcs).map(Some)
    } else {
        Ok(None)
    }
}

/// TP-UDL and TP-UD. For 7-bit text the header is followed by fill bits up to the next septet.
pub(super) fn user_data(dec: &mut Decoder, udhi: bool, dcs: Dcs) -> Step<UserData> {
    let udl = dec.uint("TP-UDL", 8)? as usize;
    let encoding = if dcs.compressed {
        TextEncoding::Octet
    } else {
        dcs.encoding
    };
    tracing::trace!(udl, ?encoding, class = ?dcs.class, "user data");
    let octets = match encoding {
        TextEncoding::Gsm7 => (udl * 7).div_ceil(8),
        _ => udl,
    };

    let ud = dec.record("TP-UD", octets, |dec| {
        let header = if udhi { Some(udh::header(dec)?) } else { None };
        let header_octets = header.map_or(0, |h| h.octets);
        let (fill_bits, length) = match encoding {
            TextEncoding::Gsm7 => {
                let header_bits = header_octets * 8;
                let fill = (7 - header_bits % 7) % 7;
                (fill as u8, udl.saturating_sub((header_bits + fill) / 7))
            }
            _ => (0, udl.saturating_sub(header_octets)),
        };

        let n = dec.remaining_bytes();
        let body = if encoding == TextEncoding::Octet {
            dec.bytes("Data", n)?
        } else {
            let start = dec.position();
            let mut body = Vec::with_capacity(n);
            for _ in 0..n {
                body.push(dec.take(8)? as u8);
            }
            let rendering = text::render(encoding, &body, fill_bits, length).unwrap_or_default();
            dec.annotate("Text", start, rendering);
            body
        };
        Ok(UserData {
            header,
            body,
            encoding,
            fill_bits,
            length,
        })
    })?;

    Ok(ud.unwrap_or(UserData {
        header: None,
        body: Vec::new(),
        encoding,
        fill_bits: 0,
        length: 0,
    }))
}
