use crate::error::{QuoteError, QuoteResult};

/// Parse a `#RRGGBB` or `#RRGGBBAA` hex color into straight-alpha RGBA8.
pub(crate) fn parse_hex(s: &str) -> QuoteResult<[u8; 4]> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> QuoteResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| QuoteError::render(format!("invalid hex byte \"{pair}\"")))
    }

    match s.len() {
        6 => Ok([
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ]),
        8 => Ok([
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ]),
        _ => Err(QuoteError::render(
            "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(parse_hex("#ff0000").unwrap(), [255, 0, 0, 255]);
        assert_eq!(parse_hex("0000ff80").unwrap(), [0, 0, 255, 128]);
        assert_eq!(parse_hex("#DED7D7").unwrap(), [222, 215, 215, 255]);
    }

    #[test]
    fn rejects_bad_lengths_and_digits() {
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("#zzzzzz").is_err());
    }
}
