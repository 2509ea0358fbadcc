//! Primitive field decoders. Each one reads at the cursor, advances it, and returns a typed value
//! with its rendering.

use crate::vals::render_labelled;
use crate::{BitCursor, CursorError, DecodedField, FieldKind, RawValue, ValueStrings};

pub fn decode_uint(
    cursor: &mut BitCursor,
    name: &'static str,
    width: usize,
    lookup: Option<ValueStrings>,
) -> Result<DecodedField, CursorError> {
    let bit_offset = cursor.bit_position();
    let value = cursor.read_bits(width)?;
    let rendering = render_labelled(lookup.and_then(|vals| vals.get(value)), value);
    Ok(DecodedField {
        name,
        bit_offset,
        bit_width: width,
        raw: RawValue::UInt(value),
        rendering,
        kind: FieldKind::UInt,
    })
}

/// A single bit, rendered with the `(true, false)` label pair.
pub fn decode_flag(
    cursor: &mut BitCursor,
    name: &'static str,
    labels: (&str, &str),
) -> Result<DecodedField, CursorError> {
    let bit_offset = cursor.bit_position();
    let set = cursor.read_bool()?;
    Ok(DecodedField {
        name,
        bit_offset,
        bit_width: 1,
        raw: RawValue::UInt(set as u64),
        rendering: if set { labels.0 } else { labels.1 }.to_string(),
        kind: FieldKind::Boolean,
    })
}

/// Splits an octet into its two BCD digits, low nibble first.
pub fn bcd_digits(octet: u8) -> [u8; 2] {
    [octet & 0x0F, octet >> 4]
}

pub fn is_valid_bcd(octet: u8) -> bool {
    bcd_digits(octet).iter().all(|d| *d <= 9)
}

/// Decodes one octet of swapped-nibble BCD. The low nibble is the first (tens) digit. A nibble
/// above 9 is rendered as its hex digit.
pub fn decode_bcd_digit_pair(
    cursor: &mut BitCursor,
    name: &'static str,
) -> Result<DecodedField, CursorError> {
    let bit_offset = cursor.bit_position();
    let octet = cursor.read_bits(8)? as u8;
    let rendering = bcd_digits(octet)
        .iter()
        .map(|d| char::from_digit(*d as u32, 16).unwrap_or('?'))
        .collect();
    Ok(DecodedField {
        name,
        bit_offset,
        bit_width: 8,
        raw: RawValue::UInt(octet as u64),
        rendering,
        kind: FieldKind::Bcd,
    })
}

/// Reads a bitmap whose width was decoded at runtime. Widths above 64 bits keep the raw bits as
/// bytes.
pub fn decode_signed_variable_length_bitmap(
    cursor: &mut BitCursor,
    name: &'static str,
    width: usize,
) -> Result<DecodedField, CursorError> {
    let bit_offset = cursor.bit_position();
    let (raw, rendering) = if width <= 64 {
        let value = cursor.read_bits(width)?;
        let rendering = if width == 0 {
            String::new()
        } else {
            format!("{value:0width$b}")
        };
        (RawValue::UInt(value), rendering)
    } else {
        let bits = cursor.read_bit_run(width)?;
        let rendering = hex(&bits);
        (RawValue::Bytes(bits), rendering)
    };
    Ok(DecodedField {
        name,
        bit_offset,
        bit_width: width,
        raw,
        rendering,
        kind: FieldKind::Bitmap,
    })
}

pub fn decode_byte_run(
    cursor: &mut BitCursor,
    name: &'static str,
    n_bytes: usize,
) -> Result<DecodedField, CursorError> {
    let bit_offset = cursor.bit_position();
    let bytes = if cursor.is_byte_aligned() {
        cursor.read_bytes(n_bytes)?.to_vec()
    } else {
        cursor.read_bit_run(n_bytes.saturating_mul(8))?
    };
    Ok(DecodedField {
        name,
        bit_offset,
        bit_width: n_bytes * 8,
        rendering: hex(&bytes),
        raw: RawValue::Bytes(bytes),
        kind: FieldKind::Bytes,
    })
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
