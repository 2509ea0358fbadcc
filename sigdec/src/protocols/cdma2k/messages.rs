use crate::error::Step;
use crate::{Decoder, DiagnosticKind, Dispatch, Payload, PayloadSelector};

use super::digits::{self, decode_chars, decode_imsi_11_12, decode_imsi_s, decode_mcc};
use super::header::Tlac;
use super::orders;
use super::vals::*;
use super::Cdma2kMessage;

pub(super) fn decode_body(
    dec: &mut Decoder,
    tlac: &Tlac,
    message: Cdma2kMessage,
) -> Step<Option<Payload>> {
    use Cdma2kMessage::*;

    let p_rev = tlac.p_rev;
    match message {
        Registration => registration(dec, p_rev)?,
        OrderIndication | OrderCommand => orders::order(dec, tlac)?,
        DataBurstIndication | DataBurstCommand => return data_burst(dec).map(Some),
        Origination => origination(dec, p_rev)?,
        PageResponse => page_response(dec, p_rev)?,
        AuthChallengeResponse => {
            dec.uint("AUTHU", 18)?;
        }
        AuthChallengeRequest => {
            dec.uint("RANDU", 24)?;
            if p_rev >= 6 {
                dec.flag("GEN_CMEA_KEY")?;
            }
        }
        GeneralPageRequest => general_page(dec)?,
        AlertWithInfo => alert_with_info(dec)?,
        HandoffDirection => handoff_direction(dec, p_rev)?,
        Unknown => {}
    }
    Ok(None)
}

fn mobile_info(dec: &mut Decoder) -> Step<()> {
    dec.flag("MOB_TERM")?;
    dec.uint("SLOT_CYCLE_INDEX", 3)?;
    dec.uint("MOB_P_REV", 8)?;
    dec.uint("SCM", 8)?;
    Ok(())
}

fn registration(dec: &mut Decoder, p_rev: u8) -> Step<()> {
    dec.uint_vals("REG_TYPE", 4, REG_TYPES)?;
    dec.uint("SLOT_CYCLE_INDEX", 3)?;
    dec.uint("MOB_P_REV", 8)?;
    dec.uint("SCM", 8)?;
    dec.flag("MOB_TERM")?;
    dec.uint_vals("RETURN_CAUSE", 4, RETURN_CAUSES)?;
    if p_rev >= 6 {
        dec.flag("QPCH_SUPPORTED")?;
        dec.flag("ENHANCED_RC")?;
        if dec.flag("UZID_INCL")? {
            dec.uint("UZID", 16)?;
        }
    }
    if p_rev >= 7 && dec.flag("GEO_LOC_INCL")? {
        dec.uint("GEO_LOC_TYPE", 3)?;
    }
    Ok(())
}

fn data_burst(dec: &mut Decoder) -> Step<Payload> {
    dec.uint("MSG_NUMBER", 8)?;
    let burst_type = dec.uint_vals("BURST_TYPE", 6, BURST_TYPES)? as u8;
    dec.uint("NUM_MSGS", 8)?;
    let count = dec.uint("NUM_FIELDS", 8)? as usize;
    let bytes = dec.bytes("CHARi", count)?;
    Ok(Payload {
        selector: Some(PayloadSelector::BurstType(burst_type)),
        bytes,
        reassembled: false,
    })
}

fn origination(dec: &mut Decoder, p_rev: u8) -> Step<()> {
    mobile_info(dec)?;
    dec.uint_vals("REQUEST_MODE", 3, REQUEST_MODES)?;
    if dec.flag("SPECIAL_SERVICE")? {
        dec.uint("SERVICE_OPTION", 16)?;
    }
    dec.flag("PM")?;
    let ascii = dec.uint_vals("DIGIT_MODE", 1, DIGIT_MODES)? == 1;
    if ascii {
        dec.uint_vals("NUMBER_TYPE", 3, NUMBER_TYPES)?;
        dec.uint_vals("NUMBER_PLAN", 4, NUMBER_PLANS)?;
    }
    dec.flag("MORE_FIELDS")?;
    let count = dec.uint("NUM_FIELDS", 8)? as usize;
    if ascii {
        decode_chars(dec, "CHARi", count)?;
    } else {
        let start = dec.position();
        let mut dialled = String::with_capacity(count);
        for _ in 0..count {
            dialled.push(digits::dtmf(dec.take(4)?));
        }
        dec.annotate("CHARi", start, dialled);
    }
    dec.flag("NAR_AN_CAP")?;
    if p_rev >= 6 {
        dec.flag("QPCH_SUPPORTED")?;
        dec.flag("ENHANCED_RC")?;
    }
    Ok(())
}

fn page_response(dec: &mut Decoder, p_rev: u8) -> Step<()> {
    mobile_info(dec)?;
    dec.uint_vals("REQUEST_MODE", 3, REQUEST_MODES)?;
    dec.uint("SERVICE_OPTION", 16)?;
    dec.flag("PM")?;
    dec.flag("NAR_AN_CAP")?;
    if p_rev >= 6 {
        dec.flag("QPCH_SUPPORTED")?;
        if dec.flag("UZID_INCL")? {
            dec.uint("UZID", 16)?;
        }
    }
    Ok(())
}

fn general_page(dec: &mut Decoder) -> Step<()> {
    dec.uint("CONFIG_MSG_SEQ", 6)?;
    dec.uint("ACC_MSG_SEQ", 6)?;
    dec.flag("CLASS_0_DONE")?;
    dec.flag("CLASS_1_DONE")?;
    dec.flag("TMSI_DONE")?;
    dec.flag("ORDERED_TMSIS")?;
    dec.flag("BROADCAST_DONE")?;
    dec.reserved(4)?;
    let add_len = dec.uint("ADD_LENGTH", 3)? as usize;
    if add_len > 0 {
        dec.bitmap("ADD_PFIELD", add_len * 8)?;
    }

    let mut index = 1;
    while dec.remaining_bits() >= 4 {
        if dec.peek(4)? == 0b1111 {
            dec.uint_vals("PAGE_CLASS", 2, PAGE_CLASSES)?;
            dec.uint("PAGE_SUBCLASS", 2)?;
            break;
        }
        let more = dec.subtree(format!("Page Record [{index}]"), page_record)?;
        if !more {
            break;
        }
        index += 1;
    }
    Ok(())
}

fn service_option(dec: &mut Decoder) -> Step<()> {
    if dec.flag("SPECIAL_SERVICE")? {
        dec.uint("SERVICE_OPTION", 16)?;
    }
    Ok(())
}

/// Returns whether another page record can follow.
fn page_record(dec: &mut Decoder) -> Step<bool> {
    let class = dec.uint_vals("PAGE_CLASS", 2, PAGE_CLASSES)?;
    let subclass = dec.uint("PAGE_SUBCLASS", 2)?;
    match (class, subclass) {
        (0, _) => {
            dec.uint("MSG_SEQ", 3)?;
            if subclass >= 2 {
                decode_mcc(dec)?;
            }
            if subclass % 2 == 1 {
                decode_imsi_11_12(dec)?;
            }
            decode_imsi_s(dec)?;
            service_option(dec)?;
        }
        (1, 0 | 1) => {
            dec.uint("MSG_SEQ", 3)?;
            dec.uint("IMSI_ADDR_NUM", 3)?;
            if subclass == 1 {
                decode_mcc(dec)?;
            }
            decode_imsi_11_12(dec)?;
            decode_imsi_s(dec)?;
            service_option(dec)?;
        }
        (2, 0..=2) => {
            dec.uint("MSG_SEQ", 3)?;
            dec.uint("TMSI_CODE_ADDR", 16 + 8 * subclass as usize)?;
            service_option(dec)?;
        }
        (2, _) => {
            dec.uint("MSG_SEQ", 3)?;
            let zone_len = dec.uint("TMSI_ZONE_LEN", 4)? as usize;
            dec.bytes("TMSI_ZONE", zone_len)?;
            dec.uint("TMSI_CODE_ADDR", 32)?;
            service_option(dec)?;
        }
        (3, 0) => {
            dec.uint_vals("BURST_TYPE", 6, BURST_TYPES)?;
            let addr_len = dec.uint("ADDR_LEN", 4)? as usize;
            dec.bytes("BC_ADDR", addr_len)?;
        }
        _ => {
            dec.diag(
                DiagnosticKind::UnsupportedRecordType((class << 2) | subclass),
                "reserved page class",
            );
            return Ok(false);
        }
    }
    Ok(true)
}

fn alert_with_info(dec: &mut Decoder) -> Step<()> {
    let mut index = 1;
    while dec.remaining_bits() >= 16 {
        dec.subtree(format!("Information Record [{index}]"), info_record)?;
        index += 1;
    }
    Ok(())
}

fn info_record(dec: &mut Decoder) -> Step<()> {
    let code = dec.uint_vals("RECORD_TYPE", 8, InfoRecordType::VALUES)?;
    let len = dec.uint("RECORD_LEN", 8)? as usize;
    let kind = InfoRecordType::classify(code).unwrap_or(InfoRecordType::Unknown);
    tracing::trace!(?kind, len, "information record");

    dec.record(kind.label(), len, |dec| {
        match kind {
            InfoRecordType::Display => {
                digits::decode_remaining_chars(dec, "CHARi")?;
            }
            InfoRecordType::CalledPartyNumber => {
                number_type_and_plan(dec)?;
                digits::decode_remaining_chars(dec, "CHARi")?;
            }
            InfoRecordType::CallingPartyNumber | InfoRecordType::ConnectedNumber => {
                number_type_and_plan(dec)?;
                presentation_and_screening(dec)?;
                digits::decode_remaining_chars(dec, "CHARi")?;
            }
            InfoRecordType::RedirectingNumber => redirecting_number(dec)?,
            InfoRecordType::Signal => {
                dec.uint_vals("SIGNAL_TYPE", 2, SIGNAL_TYPES)?;
                dec.uint_vals("ALERT_PITCH", 2, ALERT_PITCHES)?;
                dec.uint("SIGNAL", 6)?;
            }
            InfoRecordType::MessageWaiting => {
                dec.uint("MSG_COUNT", 8)?;
            }
            InfoRecordType::CalledPartySubaddress => {
                dec.flag("EXTENSION_BIT")?;
                dec.uint("SUBADD_TYPE", 3)?;
                dec.flag("ODD/EVEN_IND")?;
                dec.reserved(3)?;
                dec.rest("CHARi")?;
            }
            InfoRecordType::LineControl => {
                if dec.flag("POLARITY_INCLUDED")? && !dec.flag("TOGGLE_MODE")? {
                    dec.flag("REVERSE_POLARITY")?;
                }
                dec.uint("POWER_DENIAL_TIME", 8)?;
            }
            InfoRecordType::ExtendedDisplay => extended_display(dec)?,
            InfoRecordType::Unknown => {
                dec.diag(
                    DiagnosticKind::UnsupportedRecordType(code),
                    "unknown information record",
                );
                dec.rest("Record Value")?;
            }
        }
        Ok(())
    })?;
    Ok(())
}

fn number_type_and_plan(dec: &mut Decoder) -> Step<()> {
    dec.uint_vals("NUMBER_TYPE", 3, NUMBER_TYPES)?;
    dec.uint_vals("NUMBER_PLAN", 4, NUMBER_PLANS)?;
    Ok(())
}

fn presentation_and_screening(dec: &mut Decoder) -> Step<()> {
    dec.uint_vals("PI", 2, PRESENTATION_INDICATORS)?;
    dec.uint_vals("SI", 2, SCREENING_INDICATORS)?;
    Ok(())
}

fn redirecting_number(dec: &mut Decoder) -> Step<()> {
    let ext1 = dec.flag("EXTENSION_BIT1")?;
    number_type_and_plan(dec)?;
    if !ext1 {
        let ext2 = dec.flag("EXTENSION_BIT2")?;
        dec.uint_vals("PI", 2, PRESENTATION_INDICATORS)?;
        dec.reserved(3)?;
        dec.uint_vals("SI", 2, SCREENING_INDICATORS)?;
        if !ext2 {
            dec.flag("EXTENSION_BIT3")?;
            dec.reserved(3)?;
            dec.uint("REDIRECTING_REASON", 4)?;
        }
    }
    digits::decode_remaining_chars(dec, "CHARi").map(drop)
}

fn extended_display(dec: &mut Decoder) -> Step<()> {
    dec.flag("EXT_DISPLAY_IND")?;
    dec.uint("DISPLAY_TYPE", 7)?;
    let mut index = 1;
    while dec.remaining_bits() >= 16 {
        dec.subtree(format!("Display Record [{index}]"), |dec| {
            dec.uint("DISPLAY_TAG", 8)?;
            let len = dec.uint("DISPLAY_LEN", 8)? as usize;
            dec.record("Display Text", len, |dec| {
                digits::decode_remaining_chars(dec, "CHARi").map(drop)
            })?;
            Ok(())
        })?;
        index += 1;
    }
    Ok(())
}

fn handoff_direction(dec: &mut Decoder, p_rev: u8) -> Step<()> {
    if dec.flag("USE_TIME")? {
        dec.uint("ACTION_TIME", 6)?;
    }
    dec.uint("HDM_SEQ", 2)?;
    if dec.flag("SEARCH_INCLUDED")? {
        dec.uint("SRCH_WIN_A", 4)?;
        dec.uint("T_ADD", 6)?;
        dec.uint("T_DROP", 6)?;
        dec.uint("T_COMP", 4)?;
        dec.uint("T_TDROP", 4)?;
    }
    if dec.flag("EXTRA_PARMS")? {
        dec.uint("PACKET_ZONE_ID", 8)?;
        dec.uint("FRAME_OFFSET", 4)?;
        dec.flag("PRIVATE_LCM")?;
        dec.flag("RESET_L2")?;
        dec.flag("RESET_FPC")?;
        dec.uint_vals("ENCRYPT_MODE", 2, ENCRYPT_MODES)?;
        dec.uint("NOM_PWR", 4)?;
        dec.uint("NUM_PREAMBLE", 3)?;
        dec.uint("BAND_CLASS", 5)?;
        dec.uint("CDMA_FREQ", 11)?;
    }
    if p_rev >= 9 && dec.flag("PLCM_TYPE_INCL")? {
        if dec.uint_vals("PLCM_TYPE", 4, PLCM_TYPES)? == 1 {
            dec.uint("PLCM_39", 39)?;
        }
    }
    let pilots = dec.uint("NUM_PILOTS", 3)?;
    for index in 1..=pilots {
        dec.subtree(format!("Active Set Record [{index}]"), |dec| {
            dec.uint("PILOT_PN", 9)?;
            dec.flag("PWR_COMB_IND")?;
            dec.uint("CODE_CHAN", 8)?;
            if p_rev >= 6 && dec.flag("ADD_PILOT_REC_INCL")? {
                pilot_record(dec)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn pilot_record(dec: &mut Decoder) -> Step<()> {
    match dec.uint_vals("PILOT_REC_TYPE", 3, PILOT_REC_TYPES)? {
        0 => {
            dec.uint("TD_POWER_LEVEL", 2)?;
            dec.uint("TD_MODE", 2)?;
        }
        1 => {
            dec.uint("AUX_PILOT_QOF", 8)?;
            let walsh_len = dec.uint("AUX_WALSH_LEN", 3)? as usize;
            dec.uint("AUX_PILOT_WALSH", walsh_len + 6)?;
        }
        other => {
            dec.diag(
                DiagnosticKind::UnsupportedRecordType(other),
                "unknown pilot record type",
            );
        }
    }
    Ok(())
}
