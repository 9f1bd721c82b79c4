//! Text extraction from forwarded Airbnb confirmation emails.
//!
//! The email body arrives as plain text; Airbnb has shipped at least two
//! layouts over the years ("GUEST PAID" vs "Accommodation" for the room fee),
//! so every field is scraped independently and missing fields degrade to
//! `None` rather than failing the import. Only the confirmation code is
//! mandatory.

use crate::import::parse_money;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static CONFIRMATION_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)CONFIRMATION CODE\s+([A-Z0-9]+)").unwrap());
static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})\s+([A-Za-z]{3,9})\b").unwrap());
static YOU_EARN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)YOU EARN\s+\$?([0-9.,]+)").unwrap());
static CLEANING_FEE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Cleaning fee\s+\$?([0-9.,]+)").unwrap());
static DOLLAR_AMOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([0-9.,]+)").unwrap());
static FIRST_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Everything scraped from one confirmation email.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBookingEmail {
    pub confirmation_code: String,
    pub listing_name: Option<String>,
    pub guests: Option<i32>,
    /// "Day Month" as printed in the email, e.g. "5 May"
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub payout: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub room_fee: Option<Decimal>,
}

/// Errors the parser reports to the API layer.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseEmailError {
    #[error("Could not extract reservation code")]
    MissingConfirmationCode,
}

/// Scrape an Airbnb confirmation email body.
pub fn parse_airbnb_email(body: &str) -> Result<ParsedBookingEmail, ParseEmailError> {
    let lines: Vec<&str> = body.lines().collect();

    let confirmation_code = CONFIRMATION_CODE
        .captures(body)
        .map(|c| c[1].trim().to_string())
        .ok_or(ParseEmailError::MissingConfirmationCode)?;

    // Listing name: the closest non-blank line above the room-type marker
    let mut listing_name = None;
    for (i, line) in lines.iter().enumerate() {
        if contains_ignore_case(line, "Entire home/flat") {
            for j in (i.saturating_sub(4)..i).rev() {
                if !lines[j].trim().is_empty() {
                    listing_name = Some(lines[j].trim().to_string());
                    break;
                }
            }
            break;
        }
    }

    // Guest count: the value sits two lines below the "GUESTS" label
    let mut guests = None;
    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "GUESTS" {
            if let Some(value_line) = lines.get(i + 2) {
                guests = FIRST_INT.captures(value_line).and_then(|c| c[1].parse::<i32>().ok());
            }
            break;
        }
    }

    let check_in = find_date_below(&lines, "Check-in");
    let check_out = find_date_below(&lines, "Checkout");

    let payout = YOU_EARN.captures(body).and_then(|c| parse_money(&c[1]));
    let cleaning_fee = CLEANING_FEE.captures(body).and_then(|c| parse_money(&c[1]));

    // Room fee: old layout puts it under "GUEST PAID", the new one under
    // "Accommodation"; both print the amount two lines below the label.
    let mut room_fee = None;
    for (i, line) in lines.iter().enumerate() {
        if contains_ignore_case(line, "GUEST PAID") {
            if let Some(amount) = lines.get(i + 2).and_then(|l| DOLLAR_AMOUNT.captures(l)).and_then(|c| parse_money(&c[1])) {
                room_fee = Some(amount);
                break;
            }
        }
        if contains_ignore_case(line, "Accommodation") {
            if let Some(amount) = lines.get(i + 2).and_then(|l| DOLLAR_AMOUNT.captures(l)).and_then(|c| parse_money(&c[1])) {
                room_fee = Some(amount);
                break;
            }
        }
    }

    Ok(ParsedBookingEmail {
        confirmation_code,
        listing_name,
        guests,
        check_in,
        check_out,
        payout,
        cleaning_fee,
        room_fee,
    })
}

/// "Check-in" / "Checkout" labels carry their "D Month" value two lines below.
fn find_date_below(lines: &[&str], label: &str) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        if contains_ignore_case(line, label) {
            if let Some(value_line) = lines.get(i + 2) {
                if let Some(c) = DAY_MONTH.captures(value_line) {
                    return Some(format!("{} {}", &c[1], &c[2]));
                }
            }
        }
    }
    None
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD_FORMAT: &str = "\
New booking confirmed! Dana arrives 5 May.

Sea View Loft
Entire home/flat
2 bedrooms

CONFIRMATION CODE HMABCD1234

GUESTS

2 guests

Check-in

Mon, 5 May

Checkout

Sat, 10 May

GUEST PAID

$810.00 x 5 nights
Cleaning fee  $65.00

YOU EARN  $3,890.50
";

    const NEW_FORMAT: &str = "\
Reservation confirmed

Palm Garden Suite

Entire home/flat hosted by Ana

CONFIRMATION CODE  HMWXYZ9876

Check-in

Wed, 1 April

Checkout

Fri, 3 April

Accommodation

$2,000.00

Cleaning fee $80.00
YOU EARN $1,950.00
";

    #[test]
    fn test_parses_old_format() {
        let parsed = parse_airbnb_email(OLD_FORMAT).unwrap();
        assert_eq!(parsed.confirmation_code, "HMABCD1234");
        assert_eq!(parsed.listing_name.as_deref(), Some("Sea View Loft"));
        assert_eq!(parsed.guests, Some(2));
        assert_eq!(parsed.check_in.as_deref(), Some("5 May"));
        assert_eq!(parsed.check_out.as_deref(), Some("10 May"));
        assert_eq!(parsed.payout, Some(rust_decimal::Decimal::new(389050, 2)));
        assert_eq!(parsed.cleaning_fee, Some(rust_decimal::Decimal::new(6500, 2)));
        assert_eq!(parsed.room_fee, Some(rust_decimal::Decimal::new(81000, 2)));
    }

    #[test]
    fn test_parses_new_accommodation_format() {
        let parsed = parse_airbnb_email(NEW_FORMAT).unwrap();
        assert_eq!(parsed.confirmation_code, "HMWXYZ9876");
        assert_eq!(parsed.listing_name.as_deref(), Some("Palm Garden Suite"));
        assert_eq!(parsed.check_in.as_deref(), Some("1 April"));
        assert_eq!(parsed.check_out.as_deref(), Some("3 April"));
        assert_eq!(parsed.room_fee, Some(rust_decimal::Decimal::new(200000, 2)));
        // No GUESTS block in this layout
        assert_eq!(parsed.guests, None);
    }

    #[test]
    fn test_missing_confirmation_code_is_an_error() {
        let err = parse_airbnb_email("Hello, a booking happened.").unwrap_err();
        assert_eq!(err, ParseEmailError::MissingConfirmationCode);
    }

    #[test]
    fn test_listing_skips_blank_lines() {
        let body = "CONFIRMATION CODE HM12345678\n\nCasa Roca\n\n\nEntire home/flat\n";
        let parsed = parse_airbnb_email(body).unwrap();
        assert_eq!(parsed.listing_name.as_deref(), Some("Casa Roca"));
    }

    #[test]
    fn test_windows_line_endings() {
        let body = "CONFIRMATION CODE HM0000AAAA\r\nCheck-in\r\n\r\nTue, 12 August\r\n";
        let parsed = parse_airbnb_email(body).unwrap();
        assert_eq!(parsed.check_in.as_deref(), Some("12 August"));
    }
}
