//! Telephony digit strings: swapped-nibble BCD unpacking and the E.164 country-code split.

/// The character for one telephony BCD nibble. `0xF` is the filler and has none.
pub fn tbcd_char(nibble: u8) -> Option<char> {
    match nibble {
        0..=9 => Some(char::from(b'0' + nibble)),
        0xA => Some('*'),
        0xB => Some('#'),
        0xC => Some('a'),
        0xD => Some('b'),
        0xE => Some('c'),
        _ => None,
    }
}

/// Unpacks swapped-nibble BCD, low nibble first.
///
/// With a `count` exactly that many digits are taken. Without one, unpacking stops at the first
/// filler nibble.
pub fn unpack_digits(octets: &[u8], count: Option<usize>) -> String {
    let nibbles = octets.iter().flat_map(|o| [o & 0x0F, o >> 4]);
    match count {
        Some(n) => nibbles.take(n).map(|d| tbcd_char(d).unwrap_or('?')).collect(),
        None => nibbles.map_while(tbcd_char).collect(),
    }
}

/// The index of the first filler nibble among the first `count` digits.
pub fn filler_position(octets: &[u8], count: usize) -> Option<usize> {
    octets
        .iter()
        .flat_map(|o| [o & 0x0F, o >> 4])
        .take(count)
        .position(|d| tbcd_char(d).is_none())
}

// Country codes shorter than three digits.
const ONE_DIGIT: &[&str] = &["1", "7"];
const TWO_DIGIT: &[&str] = &[
    "20", "27", "30", "31", "32", "33", "34", "36", "39", "40", "41", "43", "44", "45", "46", "47",
    "48", "49", "51", "52", "53", "54", "55", "56", "57", "58", "60", "61", "62", "63", "64", "65",
    "66", "81", "82", "84", "86", "90", "91", "92", "93", "94", "95", "98",
];

/// The length of the country code `digits` starts with.
pub fn country_code_len(digits: &str) -> Option<usize> {
    if !digits.bytes().take(3).all(|b| b.is_ascii_digit()) || digits.len() < 3 {
        return None;
    }
    let len = if ONE_DIGIT.contains(&&digits[..1]) {
        1
    } else if TWO_DIGIT.contains(&&digits[..2]) {
        2
    } else {
        3
    };
    Some(len)
}

/// Splits an international number into country code and national number.
pub fn split_country_code(digits: &str) -> Option<(&str, &str)> {
    country_code_len(digits).map(|len| digits.split_at(len))
}

/// `"+44 7700900123"` style rendering, or the bare digits when there is no country code.
pub fn render(digits: &str) -> String {
    match split_country_code(digits) {
        Some((cc, national)) => format!("+{cc} {national}"),
        None => digits.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_low_nibble_first() {
        assert_eq!(unpack_digits(&[0x21, 0x43, 0xF5], None), "12345");
        assert_eq!(unpack_digits(&[0x21, 0x43, 0xF5], Some(4)), "1234");
        assert_eq!(unpack_digits(&[0xBA], None), "*#");
        assert_eq!(unpack_digits(&[], None), "");
    }

    #[test]
    fn explicit_count_keeps_odd_nibbles() {
        assert_eq!(unpack_digits(&[0xF1], Some(2)), "1?");
    }

    #[test]
    fn filler_inside_the_count_is_found() {
        assert_eq!(filler_position(&[0x21, 0xF3], 4), Some(3));
        assert_eq!(filler_position(&[0x21, 0xF3], 3), None);
        assert_eq!(filler_position(&[0x2F, 0x43], 4), Some(0));
    }

    #[test]
    fn country_codes() {
        let cases = [
            ("14155550100", Some(("1", "4155550100"))),
            ("447700900123", Some(("44", "7700900123"))),
            ("85212345678", Some(("852", "12345678"))),
            ("79161234567", Some(("7", "9161234567"))),
            ("12", None),
            ("*12345", None),
        ];
        for (digits, expected) in cases {
            assert_eq!(split_country_code(digits), expected, "{digits}");
        }
    }

    #[test]
    fn renders_with_plus() {
        assert_eq!(render("447700900123"), "+44 7700900123");
        assert_eq!(render("12"), "12");
    }
}
