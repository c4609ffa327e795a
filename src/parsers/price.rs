use once_cell::sync::Lazy;
use regex::Regex;

// A digit run that may contain thousands/decimal separators, including the
// no-break spaces the site puts between thousands.
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d[\d \u{00A0}\u{202F}\u{2009}.,]*")
        .expect("Invalid number regex")
});

static RANGE_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[-–—]\s*").expect("Invalid range regex")
});

static ROOMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+").expect("Invalid rooms regex")
});

/// Parse the first number in `text` into a plain value.
///
/// `"1 234,56 zł"` → `1234.56`, `"350 000 PLN"` → `350000`,
/// `"1.234.567"` → `1234567`, `"54,3 m²"` → `54.3`.
pub fn parse_number(text: &str) -> Option<f64> {
    let raw = NUMBER_REGEX.find(text)?.as_str();

    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202F}')
        .collect();
    let compact = compact.trim_end_matches(['.', ',']);

    normalize_separators(compact)?.parse::<f64>().ok()
}

/// Decide which of `.`/`,` is the decimal separator and drop the other.
fn normalize_separators(digits: &str) -> Option<String> {
    let last_dot = digits.rfind('.');
    let last_comma = digits.rfind(',');

    let decimal = match (last_dot, last_comma) {
        (None, None) => return Some(digits.to_string()),
        // Mixed: whichever comes last is the decimal mark.
        (Some(d), Some(c)) => Some(d.max(c)),
        (Some(i), None) | (None, Some(i)) => {
            let sep = digits[i..].chars().next()?;
            let occurrences = digits.matches(sep).count();
            let fraction_len = digits.len() - i - 1;
            if occurrences == 1 && fraction_len != 3 {
                Some(i)
            } else {
                None
            }
        }
    };

    let mut out = String::with_capacity(digits.len());
    for (i, c) in digits.char_indices() {
        match c {
            '.' | ',' if Some(i) == decimal => out.push('.'),
            '.' | ',' => {}
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Parse a price that must be positive. Currency marks are ignored.
pub fn parse_price(text: &str) -> Option<f64> {
    parse_number(text).filter(|p| p.is_finite() && *p > 0.0)
}

/// Parse `"350 000 - 420 000 zł"` into `(350000, Some(420000))`, or a single
/// price into `(price, None)`. Bounds given in the wrong order are swapped.
pub fn parse_price_range(text: &str) -> Option<(f64, Option<f64>)> {
    let mut parts = RANGE_SPLIT_REGEX
        .split(text.trim())
        .filter(|p| !p.trim().is_empty());

    let low = parse_price(parts.next()?)?;
    match parts.next().and_then(parse_price) {
        Some(high) if high < low => Some((high, Some(low))),
        Some(high) if high == low => Some((low, None)),
        Some(high) => Some((low, Some(high))),
        None => Some((low, None)),
    }
}

/// Area in square metres, e.g. `"54,30 m²"`.
pub fn parse_area(text: &str) -> Option<f64> {
    parse_number(text).filter(|a| a.is_finite() && *a > 0.0)
}

/// Room count from labels like `"2 pokoje"` or `"3-pokojowe"`.
pub fn parse_rooms(text: &str) -> Option<u32> {
    ROOMS_REGEX
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|r| *r > 0)
}

/// Format a PLN amount with spaces between thousands, e.g. `1 234 567 zł`.
pub fn format_price_pln_display(price: f64) -> String {
    let whole = price.round() as u64;
    let digits = whole.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    format!("{} zł", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_polish_currency_strings() {
        assert_eq!(parse_number("1 234,56 zł"), Some(1234.56));
        assert_eq!(parse_number("1\u{00A0}234,56\u{00A0}zł"), Some(1234.56));
        assert_eq!(parse_number("1\u{202F}234,56 PLN"), Some(1234.56));
        assert_eq!(parse_number("350 000"), Some(350000.0));
        assert_eq!(parse_number("od 412 900 zł"), Some(412900.0));
        assert_eq!(parse_number("12 500 zł/m²"), Some(12500.0));
    }

    #[test]
    fn disambiguates_separators() {
        assert_eq!(parse_number("1.234.567 PLN"), Some(1234567.0));
        assert_eq!(parse_number("1,234,567"), Some(1234567.0));
        assert_eq!(parse_number("1.234,50"), Some(1234.5));
        assert_eq!(parse_number("1,234.50"), Some(1234.5));
        assert_eq!(parse_number("350.000 zł"), Some(350000.0));
        assert_eq!(parse_number("54,3 m²"), Some(54.3));
        assert_eq!(parse_number("54.30"), Some(54.3));
        assert_eq!(parse_number("600 000,- zł"), Some(600000.0));
    }

    #[test]
    fn rejects_text_without_numbers() {
        assert_eq!(parse_number("Cena"), None);
        assert_eq!(parse_price("zapytaj o cenę"), None);
        assert_eq!(parse_price("0 zł"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn parses_price_ranges() {
        assert_eq!(
            parse_price_range("350 000 - 420 000 zł"),
            Some((350000.0, Some(420000.0)))
        );
        assert_eq!(
            parse_price_range("350 000 zł – 420 000 zł"),
            Some((350000.0, Some(420000.0)))
        );
        assert_eq!(
            parse_price_range("420 000 - 350 000"),
            Some((350000.0, Some(420000.0)))
        );
        assert_eq!(parse_price_range("399 000 zł"), Some((399000.0, None)));
        assert_eq!(parse_price_range("-"), None);
    }

    #[test]
    fn parses_rooms_and_area() {
        assert_eq!(parse_rooms("2 pokoje"), Some(2));
        assert_eq!(parse_rooms("4-pokojowe"), Some(4));
        assert_eq!(parse_rooms("kawalerka"), None);
        assert_eq!(parse_area("54,30 m²"), Some(54.3));
        assert_eq!(parse_area("brak"), None);
    }

    #[test]
    fn formats_prices_with_grouping() {
        assert_eq!(format_price_pln_display(1234567.0), "1 234 567 zł");
        assert_eq!(format_price_pln_display(999.4), "999 zł");
        assert_eq!(format_price_pln_display(350000.0), "350 000 zł");
    }
}
