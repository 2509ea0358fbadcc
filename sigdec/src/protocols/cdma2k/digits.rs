//! Mobile identity digit encodings.
//!
//! IMSI_S, MCC and IMSI_11_12 pack each group of decimal digits as one binary number: every digit
//! is first mapped to 1..=10 (0 becomes 10) and the group is then encoded as
//! `100 * D1 + 10 * D2 + D3 - 111`. The thousands digit inside IMSI_S1 is a plain 4-bit value,
//! again with 10 standing for 0.

use crate::error::Step;
use crate::{DecodedField, Decoder, FieldKind, RawValue};

fn group(value: u64, digits: u32) -> String {
    (0..digits)
        .rev()
        .map(|i| {
            let d = (value / 10u64.pow(i)) % 10;
            char::from(b'0' + ((d + 1) % 10) as u8)
        })
        .collect()
}

fn thousands(value: u64) -> char {
    match value {
        1..=9 => char::from(b'0' + value as u8),
        10 => '0',
        _ => '?',
    }
}

pub fn mcc(value: u64) -> String {
    group(value, 3)
}

pub fn imsi_11_12(value: u64) -> String {
    group(value, 2)
}

/// The ten digits of a 34-bit IMSI_S (IMSI_S2 followed by IMSI_S1).
pub fn imsi_s(value: u64) -> String {
    let s2 = (value >> 24) & 0x3FF;
    let s1 = value & 0xFF_FFFF;
    let mut digits = group(s2, 3);
    digits.push_str(&group(s1 >> 14, 3));
    digits.push(thousands((s1 >> 10) & 0xF));
    digits.push_str(&group(s1 & 0x3FF, 3));
    digits
}

/// A 4-bit DTMF digit as dialled.
pub fn dtmf(value: u64) -> char {
    match value {
        1..=9 => char::from(b'0' + value as u8),
        10 => '0',
        11 => '*',
        12 => '#',
        _ => '?',
    }
}

pub(crate) fn ascii(value: u8) -> char {
    if value.is_ascii_graphic() || value == b' ' {
        value as char
    } else {
        '.'
    }
}

fn digit_field(
    dec: &mut Decoder,
    name: &'static str,
    width: usize,
    render: fn(u64) -> String,
) -> Step<u64> {
    let bit_offset = dec.position();
    let value = dec.take(width)?;
    dec.push_field(DecodedField {
        name,
        bit_offset,
        bit_width: width,
        raw: RawValue::UInt(value),
        rendering: render(value),
        kind: FieldKind::Text,
    });
    Ok(value)
}

pub(super) fn decode_mcc(dec: &mut Decoder) -> Step<u64> {
    digit_field(dec, "MCC", 10, mcc)
}

pub(super) fn decode_imsi_11_12(dec: &mut Decoder) -> Step<u64> {
    digit_field(dec, "IMSI_11_12", 7, imsi_11_12)
}

pub(super) fn decode_imsi_s(dec: &mut Decoder) -> Step<u64> {
    digit_field(dec, "IMSI_S", 34, imsi_s)
}

/// `count` 8-bit characters rendered as one text field.
pub(super) fn decode_chars(dec: &mut Decoder, name: &'static str, count: usize) -> Step<String> {
    let start = dec.position();
    let mut text = String::with_capacity(count);
    for _ in 0..count {
        text.push(ascii(dec.take(8)? as u8));
    }
    dec.annotate(name, start, text.clone());
    Ok(text)
}

/// Every whole character left in the enclosing record.
pub(super) fn decode_remaining_chars(dec: &mut Decoder, name: &'static str) -> Step<String> {
    let count = dec.remaining_bytes();
    decode_chars(dec, name, count)
}
