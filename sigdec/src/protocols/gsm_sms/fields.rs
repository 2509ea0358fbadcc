use crate::error::Step;
use crate::{e164, Decoder, TextEncoding};

use super::text::{gsm7_to_string, unpack_septets};
use super::vals::*;

/// What TP-DCS says about the user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Dcs {
    pub encoding: TextEncoding,
    pub compressed: bool,
    pub class: Option<u8>,
}

impl Default for Dcs {
    fn default() -> Self {
        Dcs {
            encoding: TextEncoding::Gsm7,
            compressed: false,
            class: None,
        }
    }
}

/// Which optional parameters TP-PI announces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Indicators {
    pub pid: bool,
    pub dcs: bool,
    pub udl: bool,
}

/// TP-OA, TP-DA or TP-RA. The length counts useful semi-octets.
pub(super) fn address(dec: &mut Decoder, label: &'static str) -> Step<String> {
    dec.subtree(label, |dec| {
        let len = dec.uint("Length", 8)? as usize;
        dec.flag("Extension")?;
        let ton = dec.uint_vals("Type of Number", 3, TYPES_OF_NUMBER)?;
        dec.uint_vals("Numbering Plan", 4, NUMBERING_PLANS)?;

        let start = dec.position();
        let mut octets = Vec::with_capacity(len.div_ceil(2));
        for _ in 0..len.div_ceil(2) {
            octets.push(dec.take(8)? as u8);
        }
        let text = match ton {
            5 => gsm7_to_string(&unpack_septets(&octets, 0, len * 4 / 7)),
            1 => {
                let digits = dec.tbcd_digits(label, start, &octets, len);
                match e164::split_country_code(&digits) {
                    Some((cc, national)) => format!("+{cc} {national}"),
                    None => format!("+{digits}"),
                }
            }
            _ => dec.tbcd_digits(label, start, &octets, len),
        };
        dec.annotate("Address", start, text.clone());
        Ok(text)
    })
}

pub(super) fn pid(dec: &mut Decoder) -> Step<u64> {
    dec.uint_vals("TP-PID", 8, PROTOCOL_IDS)
}

fn alphabet(code: u64) -> TextEncoding {
    match code {
        1 => TextEncoding::Octet,
        2 => TextEncoding::Ucs2,
        _ => TextEncoding::Gsm7,
    }
}

pub(super) fn dcs(dec: &mut Decoder) -> Step<Dcs> {
    let octet = dec.peek(8)?;
    dec.subtree("TP-DCS", |dec| {
        if octet >> 6 <= 1 {
            dec.uint_vals("Coding Group", 2, GENERAL_CODING_GROUPS)?;
            let compressed = dec.flag_labelled("Compression", ("Compressed", "Uncompressed"))?;
            let has_class = dec.flag("Message Class Present")?;
            let encoding = alphabet(dec.uint_vals("Character Set", 2, ALPHABETS)?);
            let class = dec.uint_vals("Message Class", 2, MESSAGE_CLASSES)? as u8;
            return Ok(Dcs {
                encoding,
                compressed,
                class: has_class.then_some(class),
            });
        }
        let group = dec.uint_vals("Coding Group", 4, CODING_GROUPS)?;
        match group {
            0xC..=0xE => {
                dec.flag_labelled("Indication Sense", ("Active", "Inactive"))?;
                dec.reserved(1)?;
                dec.uint_vals("Indication Type", 2, INDICATION_TYPES)?;
                let encoding = if group == 0xE {
                    TextEncoding::Ucs2
                } else {
                    TextEncoding::Gsm7
                };
                Ok(Dcs {
                    encoding,
                    ..Dcs::default()
                })
            }
            0xF => {
                dec.reserved(1)?;
                let octets =
                    dec.flag_labelled("Message Coding", ("8 bit data", "GSM 7 bit default alphabet"))?;
                let class = dec.uint_vals("Message Class", 2, MESSAGE_CLASSES)? as u8;
                Ok(Dcs {
                    encoding: if octets {
                        TextEncoding::Octet
                    } else {
                        TextEncoding::Gsm7
                    },
                    compressed: false,
                    class: Some(class),
                })
            }
            _ => {
                dec.reserved(4)?;
                Ok(Dcs::default())
            }
        }
    })
}

/// Swapped BCD date and time followed by a signed quarter-hour time zone.
pub(super) fn timestamp(dec: &mut Decoder, label: &'static str) -> Step<()> {
    dec.subtree(label, |dec| {
        let start = dec.position();
        let mut parts = [0u8; 6];
        for (part, name) in parts
            .iter_mut()
            .zip(["Year", "Month", "Day", "Hour", "Minute", "Second"])
        {
            let octet = dec.bcd_pair(name)?;
            *part = (octet & 0x0F) * 10 + (octet >> 4);
        }
        let zone_start = dec.position();
        let zone = time_zone(dec.take(8)? as u8);
        dec.annotate("Time Zone", zone_start, zone.clone());

        let [year, month, day, hour, minute, second] = parts;
        let rendering =
            format!("{year:02}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} {zone}");
        dec.annotate("Timestamp", start, rendering);
        Ok(())
    })
}

pub(super) fn time_zone(octet: u8) -> String {
    let quarters = u32::from(octet & 0x07) * 10 + u32::from(octet >> 4);
    let sign = if octet & 0x08 != 0 { '-' } else { '+' };
    let minutes = quarters * 15;
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// The relative TP-VP encoding.
pub(super) fn relative_period(value: u8) -> String {
    let minutes = match value {
        0..=143 => (u32::from(value) + 1) * 5,
        144..=167 => 720 + (u32::from(value) - 143) * 30,
        168..=196 => return count(u32::from(value) - 166, "day"),
        _ => return count(u32::from(value) - 192, "week"),
    };
    if minutes % 60 == 0 {
        count(minutes / 60, "hour")
    } else {
        count(minutes, "minute")
    }
}

fn count(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

fn relative(dec: &mut Decoder, name: &'static str) -> Step<()> {
    let start = dec.position();
    let value = dec.take(8)? as u8;
    dec.annotate(name, start, relative_period(value));
    Ok(())
}

/// TP-VP in the format selected by TP-VPF.
pub(super) fn validity_period(dec: &mut Decoder, vpf: u64) -> Step<()> {
    match vpf {
        1 => {
            dec.record("TP-VP", 7, |dec| {
                dec.flag("Extension")?;
                dec.flag("Single Shot")?;
                dec.reserved(3)?;
                match dec.uint_vals("Validity Period Format", 3, ENHANCED_VP_FORMATS)? {
                    1 => relative(dec, "Validity Period")?,
                    2 => {
                        dec.uint("Seconds", 8)?;
                    }
                    3 => {
                        dec.bcd_pair("Hours")?;
                        dec.bcd_pair("Minutes")?;
                        dec.bcd_pair("Seconds")?;
                    }
                    _ => {}
                }
                Ok(())
            })?;
        }
        2 => relative(dec, "TP-VP")?,
        3 => timestamp(dec, "TP-VP")?,
        _ => {}
    }
    Ok(())
}

pub(super) fn indicators(dec: &mut Decoder) -> Step<Indicators> {
    dec.subtree("TP-PI", |dec| {
        dec.flag("Extension")?;
        dec.reserved(4)?;
        let udl = dec.flag("TP-UDL Present")?;
        let dcs = dec.flag("TP-DCS Present")?;
        let pid = dec.flag("TP-PID Present")?;
        Ok(Indicators { pid, dcs, udl })
    })
}

/// TP-FCS is present in a report exactly when the next octet has its high bit set.
pub(super) fn failure_cause(dec: &mut Decoder) -> Step<Option<u64>> {
    if dec.remaining_bits() < 8 || dec.peek(8)? & 0x80 == 0 {
        return Ok(None);
    }
    dec.uint_vals("TP-FCS", 8, FAILURE_CAUSES).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_zone_is_signed_quarter_hours() {
        assert_eq!(time_zone(0x80), "+02:00");
        assert_eq!(time_zone(0x4A), "-06:00");
        assert_eq!(time_zone(0x12), "+05:15");
    }

    #[test]
    fn relative_validity_periods() {
        assert_eq!(relative_period(0), "5 minutes");
        assert_eq!(relative_period(11), "1 hour");
        assert_eq!(relative_period(144), "750 minutes");
        assert_eq!(relative_period(167), "24 hours");
        assert_eq!(relative_period(168), "2 days");
        assert_eq!(relative_period(255), "63 weeks");
    }
}
