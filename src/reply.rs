//! Parsing of the replies sent back by the PSU.

/// Parse a decimal reply such as `12.34` or `1.234` into milli-units. (E.g. volts -> millivolts.)
///
/// Surrounding whitespace and NUL padding are ignored. Digits beyond the third decimal place are truncated.
/// Returns `None` for anything that is not a plain unsigned decimal number.
pub fn parse_milli(text: &str) -> Option<u32> {
    let text = trim_text(text);
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut value: u32 = 0;
    for digit in whole.bytes() {
        value = value
            .checked_mul(10)?
            .checked_add(decimal_digit(digit)?)?;
    }

    let mut scale = 1000;
    let mut milli = 0;
    for digit in fraction.bytes() {
        // Validate every digit, even the truncated ones.
        let digit = decimal_digit(digit)?;
        scale /= 10;
        milli += digit * scale;
    }

    value.checked_mul(1000)?.checked_add(milli)
}

fn decimal_digit(byte: u8) -> Option<u32> {
    byte.is_ascii_digit().then(|| (byte - b'0') as u32)
}

/// Trim line endings and padding from a text reply.
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0')
}
