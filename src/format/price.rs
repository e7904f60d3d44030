//! Locale-aware number formatting.
//!
//! Output follows the default decimal style of the platform number formatter:
//! integer digits grouped by three, at most three fraction digits, trailing
//! zeros dropped, ties rounded away from zero, no currency symbol.

/// Locale symbols used when rendering a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub digits: [char; 10],
    pub group: char,
    pub decimal: char,
    pub minus: &'static str,
    pub nan: &'static str,
    pub infinity: &'static str,
}

/// Persian (Iran).
pub const FA_IR: Symbols = Symbols {
    digits: ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'],
    group: '\u{066C}',
    decimal: '\u{066B}',
    minus: "\u{200E}\u{2212}",
    nan: "ناعدد",
    infinity: "∞",
};

/// English (United States).
pub const EN_US: Symbols = Symbols {
    digits: ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'],
    group: ',',
    decimal: '.',
    minus: "-",
    nan: "NaN",
    infinity: "∞",
};

const DEFAULT_MAX_FRACTION_DIGITS: usize = 3;
const MAX_FRACTION_DIGITS_LIMIT: usize = 20;

/// Format a price for display with the Persian locale.
///
/// `format_price(1234567.0)` yields `۱٬۲۳۴٬۵۶۷`.
pub fn format_price(price: f64) -> String {
    NumberFormat::persian().format(price)
}

/// A reusable number formatter for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    symbols: Symbols,
    max_fraction_digits: usize,
}

impl NumberFormat {
    pub fn new(symbols: Symbols) -> Self {
        Self {
            symbols,
            max_fraction_digits: DEFAULT_MAX_FRACTION_DIGITS,
        }
    }

    pub fn persian() -> Self {
        Self::new(FA_IR)
    }

    /// Look a formatter up by BCP-47 tag (`fa-IR`, `fa`, `en-US`, `en`).
    pub fn for_locale(tag: &str) -> Option<Self> {
        let language = tag.split(['-', '_']).next().unwrap_or(tag);
        match language.to_ascii_lowercase().as_str() {
            "fa" => Some(Self::new(FA_IR)),
            "en" => Some(Self::new(EN_US)),
            _ => None,
        }
    }

    /// Cap the number of fraction digits (clamped to 20).
    pub fn with_max_fraction_digits(mut self, digits: usize) -> Self {
        self.max_fraction_digits = digits.min(MAX_FRACTION_DIGITS_LIMIT);
        self
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Render `value` with this locale's digits and separators.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return self.symbols.nan.to_string();
        }

        let mut out = String::new();
        if value.is_sign_negative() {
            out.push_str(self.symbols.minus);
        }

        if value.is_infinite() {
            out.push_str(self.symbols.infinity);
            return out;
        }

        let plain = round_fixed(value.abs(), self.max_fraction_digits);
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, f.trim_end_matches('0')),
            None => (plain.as_str(), ""),
        };

        let len = int_part.len();
        for (i, b) in int_part.bytes().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.symbols.group);
            }
            out.push(self.digit(b));
        }

        if !frac_part.is_empty() {
            out.push(self.symbols.decimal);
            for b in frac_part.bytes() {
                out.push(self.digit(b));
            }
        }

        out
    }

    fn digit(&self, ascii: u8) -> char {
        self.symbols.digits[usize::from(ascii - b'0')]
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::persian()
    }
}

/// Fixed-point rendering of a non-negative finite value, ties away from zero.
///
/// Rounding works on the shortest decimal that round-trips to `abs`, not on
/// its exact binary expansion, so `1.0005` rounds to `1.001`.
fn round_fixed(abs: f64, digits: usize) -> String {
    // f64 Display never switches to exponent notation
    let shortest = abs.to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    if frac_part.len() <= digits {
        return shortest;
    }

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();
    if frac_part.as_bytes()[digits] >= b'5' {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let (int_digits, frac_digits) = kept.split_at(split);
    let mut out = String::from_utf8_lossy(int_digits).into_owned();
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(frac_digits));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LRM_MINUS: &str = "\u{200E}\u{2212}";

    #[test]
    fn test_grouped_persian_digits() {
        assert_eq!(format_price(1234567.0), "۱٬۲۳۴٬۵۶۷");
        assert_eq!(format_price(1000.0), "۱٬۰۰۰");
        assert_eq!(format_price(999.0), "۹۹۹");
        assert_eq!(format_price(0.0), "۰");
        assert_eq!(format_price(120_000_000.0), "۱۲۰٬۰۰۰٬۰۰۰");
    }

    #[test]
    fn test_fraction_digits() {
        assert_eq!(format_price(1234.5), "۱٬۲۳۴٫۵");
        assert_eq!(format_price(1234.5678), "۱٬۲۳۴٫۵۶۸");
        assert_eq!(format_price(2.10), "۲٫۱");
        assert_eq!(format_price(999.9999), "۱٬۰۰۰");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        // Exact ties
        assert_eq!(format_price(0.0625), "۰٫۰۶۳");
        assert_eq!(
            NumberFormat::new(EN_US).with_max_fraction_digits(0).format(2.5),
            "3"
        );
        // Decimal ties round up even when the binary value sits just below
        assert_eq!(format_price(1.0005), "۱٫۰۰۱");
        assert_eq!(format_price(2.0005), "۲٫۰۰۱");
        assert_eq!(format_price(1.0015), "۱٫۰۰۲");
        assert_eq!(format_price(123.4565), "۱۲۳٫۴۵۷");
    }

    #[test]
    fn test_rounding_carries_into_integer_part() {
        assert_eq!(format_price(9.9995), "۱۰");
        assert_eq!(format_price(99_999.9999), "۱۰۰٬۰۰۰");
        assert_eq!(format_price(0.0004), "۰");
    }

    #[test]
    fn test_large_values_use_shortest_decimal() {
        assert_eq!(
            format_price(1e23),
            "۱۰۰٬۰۰۰٬۰۰۰٬۰۰۰٬۰۰۰٬۰۰۰٬۰۰۰٬۰۰۰"
        );
        assert_eq!(
            NumberFormat::new(EN_US).format(1e21),
            "1,000,000,000,000,000,000,000"
        );
    }

    #[test]
    fn test_negative_and_special_values() {
        assert_eq!(format_price(-1500.0), format!("{}۱٬۵۰۰", LRM_MINUS));
        assert_eq!(format_price(-0.0), format!("{}۰", LRM_MINUS));
        assert_eq!(format_price(f64::NAN), "ناعدد");
        assert_eq!(format_price(f64::INFINITY), "∞");
        assert_eq!(format_price(f64::NEG_INFINITY), format!("{}∞", LRM_MINUS));
    }

    #[test]
    fn test_deterministic() {
        let first = format_price(987654.321);
        assert_eq!(first, format_price(987654.321));
        assert_eq!(first, "۹۸۷٬۶۵۴٫۳۲۱");
    }

    #[test]
    fn test_locale_lookup() {
        let en = NumberFormat::for_locale("en-US").unwrap();
        assert_eq!(en.format(1234567.891), "1,234,567.891");
        assert_eq!(en.format(-42.0), "-42");

        assert_eq!(NumberFormat::for_locale("fa-IR"), Some(NumberFormat::persian()));
        assert_eq!(NumberFormat::for_locale("FA"), Some(NumberFormat::persian()));
        assert_eq!(NumberFormat::for_locale("de-DE"), None);
    }
}
