use crate::error::Step;
use crate::{Decoder, DiagnosticKind, Dispatch};

use super::digits::{decode_imsi_11_12, decode_imsi_s, decode_mcc};
use super::vals::*;

/// Header values the message body depends on.
#[derive(Debug, Clone, Copy)]
pub(super) struct Tlac {
    pub channel: Channel,
    pub p_rev: u8,
    pub msg_type: u64,
    pub hdr_recs_incl: bool,
}

pub(super) fn decode_fixed(dec: &mut Decoder) -> Step<Tlac> {
    let channel = Channel::from_bits(dec.uint_vals("CHANNEL", 2, Channel::VALUES)?);
    let p_rev = dec.uint("P_REV", 8)? as u8;
    let msg_type = dec.uint_vals("MSG_TYPE", 5, channel.message_types())?;
    let hdr_recs_incl = dec.flag("HDR_RECS_INCL")?;
    Ok(Tlac {
        channel,
        p_rev,
        msg_type,
        hdr_recs_incl,
    })
}

pub(super) fn decode_records(dec: &mut Decoder, tlac: &Tlac) -> Step<()> {
    if !tlac.hdr_recs_incl {
        return Ok(());
    }
    let count = dec.uint("NUM_HDR_RECS", 4)? + 1;
    dec.align()?;
    for index in 1..=count {
        dec.subtree(format!("Header Record [{index}]"), header_record)?;
    }
    Ok(())
}

fn header_record(dec: &mut Decoder) -> Step<()> {
    let rec_type = dec.uint_vals("REC_TYPE", 8, HeaderRecordType::VALUES)?;
    let rec_len = dec.uint("REC_LEN", 8)? as usize;
    let kind = HeaderRecordType::classify(rec_type).unwrap_or(HeaderRecordType::Unknown);
    tracing::trace!(?kind, rec_len, "header record");

    dec.record(kind.label(), rec_len, |dec| match kind {
        HeaderRecordType::Addressing => addressing(dec),
        HeaderRecordType::Authentication => authentication(dec),
        HeaderRecordType::MessageIntegrity => integrity(dec),
        HeaderRecordType::Arq => arq(dec),
        HeaderRecordType::Unknown => {
            dec.diag(
                DiagnosticKind::UnsupportedRecordType(rec_type),
                "unknown header record",
            );
            dec.rest("Record Value").map(drop)
        }
    })?;
    Ok(())
}

fn addressing(dec: &mut Decoder) -> Step<()> {
    let msid_type = dec.uint_vals("MSID_TYPE", 3, MSID_TYPES)?;
    let msid_len = dec.uint("MSID_LEN", 4)? as usize;
    dec.record("MSID", msid_len, |dec| msid(dec, msid_type, msid_len))?;
    Ok(())
}

fn msid(dec: &mut Decoder, msid_type: u64, msid_len: usize) -> Step<()> {
    match msid_type {
        0 => {
            dec.uint("ESN", 32)?;
            decode_imsi_s(dec).map(drop)
        }
        1 => dec.uint("ESN", 32).map(drop),
        2 => imsi(dec),
        3 => {
            dec.uint("ESN", 32)?;
            imsi(dec)
        }
        4 => {
            dec.bytes("TMSI_ZONE", msid_len.saturating_sub(4))?;
            dec.uint("TMSI_CODE_ADDR", 32).map(drop)
        }
        5 => extended_msid(dec),
        7 => dec.bytes("BC_ADDR", msid_len).map(drop),
        other => {
            dec.diag(DiagnosticKind::UnsupportedRecordType(other), "reserved MSID type");
            let width = dec.remaining_bits();
            dec.bitmap("MSID", width)
        }
    }
}

fn extended_msid(dec: &mut Decoder) -> Step<()> {
    match dec.uint_vals("EXT_MSID_TYPE", 3, EXT_MSID_TYPES)? {
        0 => dec.uint("MEID", 56).map(drop),
        1 => {
            dec.uint("MEID", 56)?;
            imsi(dec)
        }
        2 => {
            dec.uint("ESN", 32)?;
            imsi(dec)
        }
        other => {
            dec.diag(
                DiagnosticKind::UnsupportedRecordType(other),
                "reserved extended MSID type",
            );
            let width = dec.remaining_bits();
            dec.bitmap("EXT_MSID", width)
        }
    }
}

/// IMSI class and class-specific sub-fields.
pub(super) fn imsi(dec: &mut Decoder) -> Step<()> {
    if dec.uint_vals("IMSI_CLASS", 1, IMSI_CLASSES)? == 0 {
        let class_type = dec.uint("IMSI_CLASS_0_TYPE", 2)?;
        let reserved = match class_type {
            0 => 3,
            1 => 4,
            2 => 1,
            _ => 2,
        };
        dec.reserved(reserved)?;
        if class_type >= 2 {
            decode_mcc(dec)?;
        }
        if class_type % 2 == 1 {
            decode_imsi_11_12(dec)?;
        }
    } else {
        let class_type = dec.uint("IMSI_CLASS_1_TYPE", 1)?;
        dec.reserved(if class_type == 0 { 2 } else { 1 })?;
        dec.uint("IMSI_ADDR_NUM", 3)?;
        if class_type == 1 {
            decode_mcc(dec)?;
        }
        decode_imsi_11_12(dec)?;
    }
    decode_imsi_s(dec).map(drop)
}

fn authentication(dec: &mut Decoder) -> Step<()> {
    if dec.uint_vals("AUTH_MODE", 2, AUTH_MODES)? == 1 {
        dec.uint("AUTHR", 18)?;
        dec.uint("RANDC", 8)?;
        dec.uint("COUNT", 6)?;
    }
    Ok(())
}

fn integrity(dec: &mut Decoder) -> Step<()> {
    if dec.flag("MACI_INCL")? {
        dec.uint("SDU_KEY_ID", 2)?;
        dec.uint("SDU_INTEGRITY_ALGO", 3)?;
        if dec.flag("SDU_SSEQ_OR_SSEQH")? {
            dec.uint("SDU_SSEQ_H", 24)?;
        } else {
            dec.uint("SDU_SSEQ", 8)?;
        }
    }
    Ok(())
}

fn arq(dec: &mut Decoder) -> Step<()> {
    dec.flag("VALID_ACK")?;
    dec.uint("ACK_SEQ", 3)?;
    dec.uint("MSG_SEQ", 3)?;
    dec.flag("ACK_REQ")?;
    Ok(())
}
