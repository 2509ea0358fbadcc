use crate::error::Step;
use crate::{Decoder, DiagnosticKind, Dispatch};

use super::header::Tlac;
use super::vals::*;

pub(super) fn order(dec: &mut Decoder, tlac: &Tlac) -> Step<()> {
    if tlac.channel == Channel::FDsch {
        dec.flag("USE_TIME")?;
        dec.uint("ACTION_TIME", 6)?;
    }
    let forward = tlac.channel.is_forward();
    let table = if forward {
        ForwardOrder::VALUES
    } else {
        ReverseOrder::VALUES
    };
    let code = dec.uint_vals("ORDER", 6, table)?;
    let len = dec.uint("ADD_RECORD_LEN", 3)? as usize;

    dec.record("Order Specific Fields", len, |dec| {
        if dec.remaining_bits() == 0 {
            return Ok(());
        }
        if forward {
            let order = ForwardOrder::classify(code).unwrap_or(ForwardOrder::Unknown);
            forward_order(dec, order, code)?;
        } else {
            let order = ReverseOrder::classify(code).unwrap_or(ReverseOrder::Unknown);
            reverse_order(dec, order, code)?;
        }
        let rest = dec.remaining_bits();
        if rest > 0 {
            dec.bitmap("Additional Record", rest)?;
        }
        Ok(())
    })?;
    Ok(())
}

fn ordq(dec: &mut Decoder) -> Step<u64> {
    dec.uint("ORDQ", 8)
}

fn unknown_order(dec: &mut Decoder, code: u64) -> Step<()> {
    dec.diag(DiagnosticKind::UnsupportedRecordType(code), "unknown order code");
    ordq(dec).map(drop)
}

fn reverse_order(dec: &mut Decoder, order: ReverseOrder, code: u64) -> Step<()> {
    match order {
        ReverseOrder::BaseStationChallenge => {
            ordq(dec)?;
            dec.uint("RANDBS", 32)?;
        }
        ReverseOrder::MobileStationReject => {
            // The qualifier decides which of the rejected-message fields follow.
            let qualifier = dec.peek(8)?;
            ordq(dec)?;
            if qualifier != 0 {
                let rejected = dec.uint_vals(
                    "REJECTED_TYPE",
                    8,
                    Channel::FDsch.message_types(),
                )?;
                if rejected == 1 {
                    dec.uint_vals("REJECTED_ORDER", 8, ForwardOrder::VALUES)?;
                    dec.uint("REJECTED_ORDQ", 8)?;
                }
            }
        }
        ReverseOrder::ServiceOptionRequest | ReverseOrder::ServiceOptionResponse => {
            ordq(dec)?;
            dec.uint("SERVICE_OPTION", 16)?;
        }
        ReverseOrder::Unknown => unknown_order(dec, code)?,
        _ => {
            ordq(dec)?;
        }
    }
    Ok(())
}

fn forward_order(dec: &mut Decoder, order: ForwardOrder, code: u64) -> Step<()> {
    match order {
        ForwardOrder::BaseStationChallengeConfirmation => {
            ordq(dec)?;
            dec.uint("AUTHBS", 18)?;
        }
        ForwardOrder::ServiceOptionRequest | ForwardOrder::ServiceOptionResponse => {
            ordq(dec)?;
            dec.uint("SERVICE_OPTION", 16)?;
        }
        ForwardOrder::Retry => {
            ordq(dec)?;
            if dec.uint_vals("RETRY_TYPE", 3, RETRY_TYPES)? != 0 {
                dec.uint("RETRY_DELAY", 8)?;
            }
        }
        ForwardOrder::Bcmc => {
            ordq(dec)?;
            bcmc(dec)?;
        }
        ForwardOrder::Unknown => unknown_order(dec, code)?,
        _ => {
            ordq(dec)?;
        }
    }
    Ok(())
}

fn bcmc(dec: &mut Decoder) -> Step<()> {
    let programs = dec.uint("NUM_BCMC_PROGRAMS", 6)?;
    for index in 1..=programs {
        dec.subtree(format!("BCMC Program [{index}]"), bcmc_program)?;
    }
    Ok(())
}

fn bcmc_program(dec: &mut Decoder) -> Step<()> {
    let id_len = dec.uint("BCMC_PROGRAM_ID_LEN", 5)? as usize + 1;
    dec.bitmap("BCMC_PROGRAM_ID", id_len)?;
    let flow_len = dec.uint("BCMC_FLOW_DISCRIMINATOR_LEN", 3)? as usize;
    if !dec.flag("ALL_FLOWS_INCL")? {
        let flows = dec.uint("NUM_FLOW_DISCRIMINATOR", 8)?;
        for index in 1..=flows {
            dec.subtree(format!("Flow [{index}]"), |dec| {
                dec.bitmap("FLOW_DISCRIMINATOR", flow_len)
            })?;
        }
    }
    Ok(())
}
