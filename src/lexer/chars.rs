//! Character classification for the scanner
//!
//! Pure predicates over code points following the ECMAScript lexical grammar.

use unicode_xid::UnicodeXID;

/// Zero width non-joiner, allowed inside identifiers
const ZWNJ: char = '\u{200C}';
/// Zero width joiner, allowed inside identifiers
const ZWJ: char = '\u{200D}';

/// Check if a character can start an identifier
pub fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_ascii_alphabetic() || (!c.is_ascii() && c.is_xid_start())
}

/// Check if a character can continue an identifier
pub fn is_identifier_part(c: char) -> bool {
    c == '$'
        || c == '_'
        || c.is_ascii_alphanumeric()
        || c == ZWNJ
        || c == ZWJ
        || (!c.is_ascii() && c.is_xid_continue())
}

/// Check if a character is white space (excluding line terminators)
pub fn is_white_space(c: char) -> bool {
    matches!(
        c,
        '\u{0009}' | '\u{000B}' | '\u{000C}' | '\u{0020}' | '\u{00A0}' | '\u{FEFF}'
    ) || (!c.is_ascii() && is_space_separator(c))
}

/// Unicode `Zs` category
fn is_space_separator(c: char) -> bool {
    matches!(
        c,
        '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Check if a character terminates a line
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Check if a character is a decimal digit
pub fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Check if a character is an octal digit
pub fn is_octal_digit(c: char) -> bool {
    matches!(c, '0'..='7')
}

/// Check if a character is a hexadecimal digit
pub fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Check if a character is a binary digit
pub fn is_binary_digit(c: char) -> bool {
    matches!(c, '0' | '1')
}

/// Numeric value of a hex digit
pub fn hex_value(c: char) -> Option<u32> {
    c.to_digit(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_start() {
        assert!(is_identifier_start('a'));
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('_'));
        assert!(is_identifier_start('ñ'));
        assert!(is_identifier_start('π'));
        assert!(!is_identifier_start('1'));
        assert!(!is_identifier_start('-'));
        assert!(!is_identifier_start(ZWJ));
    }

    #[test]
    fn test_identifier_part() {
        assert!(is_identifier_part('1'));
        assert!(is_identifier_part(ZWNJ));
        assert!(is_identifier_part('\u{0301}'));
        assert!(!is_identifier_part('.'));
    }

    #[test]
    fn test_white_space_and_line_terminators() {
        assert!(is_white_space(' '));
        assert!(is_white_space('\t'));
        assert!(is_white_space('\u{00A0}'));
        assert!(is_white_space('\u{3000}'));
        assert!(!is_white_space('\n'));
        assert!(is_line_terminator('\n'));
        assert!(is_line_terminator('\u{2028}'));
        assert!(!is_line_terminator(' '));
    }

    #[test]
    fn test_digits() {
        assert!(is_decimal_digit('9'));
        assert!(is_octal_digit('7'));
        assert!(!is_octal_digit('8'));
        assert!(is_hex_digit('f'));
        assert!(is_hex_digit('F'));
        assert!(!is_hex_digit('g'));
        assert!(is_binary_digit('1'));
        assert!(!is_binary_digit('2'));
        assert_eq!(hex_value('a'), Some(10));
    }
}
