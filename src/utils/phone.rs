//! 电话号码归一化
//!
//! 黑名单比对使用号码的后 11 位数字，兼容 "+88 017..."、"0017..."
//! 等不同前缀写法。

/// Normalize a phone number to its last 11 digits
///
/// Strips every non-digit character first. Numbers shorter than
/// 11 digits are returned as-is (digits only).
pub fn normalize_phone(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(11);
    digits[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_characters() {
        assert_eq!(normalize_phone("+88 017-1234-5678"), "01712345678");
    }

    #[test]
    fn keeps_last_eleven_digits() {
        assert_eq!(normalize_phone("+8801712345678"), "01712345678");
        assert_eq!(normalize_phone("8801712345678"), "01712345678");
    }

    #[test]
    fn short_numbers_pass_through() {
        assert_eq!(normalize_phone("12345"), "12345");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn non_digits_are_dropped() {
        assert_eq!(normalize_phone("(017) 1234-5678"), "01712345678");
    }
}
