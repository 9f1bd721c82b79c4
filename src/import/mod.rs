//! Inbound data imports: scraped booking emails and payout report CSVs.

pub mod airbnb_email;
pub mod payout_report;

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a money string as found in emails and CSV exports.
///
/// Strips currency symbols and thousands separators, and accepts the European
/// "1.234,56" form.
pub(crate) fn parse_money(raw: &str) -> Option<Decimal> {
    let mut v: String = raw
        .replace(['$', ' '], "")
        .replace("MXN", "")
        .replace("USD", "");

    // European decimals: exactly one comma followed by two digits at the end
    let looks_european = v
        .rsplit_once(',')
        .is_some_and(|(head, tail)| tail.len() == 2 && tail.chars().all(|c| c.is_ascii_digit()) && !head.contains(','));
    if looks_european {
        v = v.replace('.', "").replace(',', ".");
    } else {
        v = v.replace(',', "");
    }

    if v.is_empty() {
        return None;
    }
    Decimal::from_str(&v).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_formats() {
        assert_eq!(parse_money("$1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_money("810.00"), Some(Decimal::new(81000, 2)));
        assert_eq!(parse_money("1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_money("MXN 2,000.00"), Some(Decimal::new(200000, 2)));
        assert_eq!(parse_money("-45.10"), Some(Decimal::new(-4510, 2)));
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("n/a"), None);
    }
}
