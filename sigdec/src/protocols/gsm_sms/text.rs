//! User data alphabets.

use crate::TextEncoding;

const ESCAPE: u8 = 0x1B;

#[rustfmt::skip]
const DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', ' ', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

fn extension(septet: u8) -> Option<char> {
    let c = match septet {
        0x0A => '\u{c}',
        0x14 => '^',
        0x28 => '{',
        0x29 => '}',
        0x2F => '\\',
        0x3C => '[',
        0x3D => '~',
        0x3E => ']',
        0x40 => '|',
        0x65 => '€',
        _ => return None,
    };
    Some(c)
}

/// Splits `octets` into `count` septets packed least significant bit first, after skipping
/// `skip_bits` fill bits.
pub fn unpack_septets(octets: &[u8], skip_bits: usize, count: usize) -> Vec<u8> {
    let available = (octets.len() * 8).saturating_sub(skip_bits) / 7;
    (0..count.min(available))
        .map(|k| {
            let start = skip_bits + 7 * k;
            (0..7).fold(0u8, |acc, i| {
                let bit = start + i;
                acc | (((octets[bit / 8] >> (bit % 8)) & 1) << i)
            })
        })
        .collect()
}

/// Maps septets of the default alphabet to text, resolving escapes into the extension table. An
/// escape without a known extension falls back to the base character.
pub fn gsm7_to_string(septets: &[u8]) -> String {
    let mut text = String::with_capacity(septets.len());
    let mut iter = septets.iter().map(|s| s & 0x7F);
    while let Some(septet) = iter.next() {
        if septet == ESCAPE {
            match iter.next() {
                Some(next) => text.push(extension(next).unwrap_or(DEFAULT_ALPHABET[next as usize])),
                None => text.push(' '),
            }
        } else {
            text.push(DEFAULT_ALPHABET[septet as usize]);
        }
    }
    text
}

pub fn ucs2_to_string(octets: &[u8]) -> String {
    let units = octets
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Renders user data octets that follow the header. `length` is in septets for
/// [`TextEncoding::Gsm7`] and in octets otherwise. 8-bit data has no text rendering.
pub fn render(encoding: TextEncoding, octets: &[u8], fill_bits: u8, length: usize) -> Option<String> {
    match encoding {
        TextEncoding::Gsm7 => {
            let septets = unpack_septets(octets, fill_bits as usize, length);
            Some(gsm7_to_string(&septets))
        }
        TextEncoding::Ucs2 => Some(ucs2_to_string(&octets[..length.min(octets.len())])),
        TextEncoding::Octet => None,
    }
}

#[cfg(test)]
pub(super) fn pack_septets(septets: &[u8], skip_bits: usize) -> Vec<u8> {
    let bits = skip_bits + septets.len() * 7;
    let mut out = vec![0u8; bits.div_ceil(8)];
    for (k, septet) in septets.iter().enumerate() {
        for i in 0..7 {
            if (septet >> i) & 1 == 1 {
                let bit = skip_bits + 7 * k + i;
                out[bit / 8] |= 1 << (bit % 8);
            }
        }
    }
    out
}
