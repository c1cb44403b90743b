//! Maps availability cell text onto a [`SeatCount`].

use crate::availability::error::AvailabilityError;
use crate::model::SeatCount;

const WAITLIST_TOKEN: &str = "waitlist";
const FULL_TOKENS: [&str; 2] = ["full", "closed"];

/// Parses the text of one availability cell.
///
/// A "waitlist" token always wins: the first digit run is the number of
/// filled waitlist slots and is returned negated. Otherwise a cell with no
/// digits that reads as full yields zero, and any other cell yields its
/// first digit run as the open seat count.
pub fn parse_seats(text: &str) -> Result<SeatCount, AvailabilityError> {
    let text = text.to_lowercase();
    let unparseable = || AvailabilityError::UnparseableAvailability {
        text: text.trim().to_string(),
    };

    if text.contains(WAITLIST_TOKEN) {
        let filled = first_number(&text).ok_or_else(unparseable)?;
        return Ok(SeatCount(-filled));
    }

    match first_number(&text) {
        Some(open) => Ok(SeatCount(open)),
        None if FULL_TOKENS.iter().any(|t| text.contains(t)) => Ok(SeatCount(0)),
        None => Err(unparseable()),
    }
}

/// First run of ASCII digits in `text`, if it fits an `i32`.
fn first_number(text: &str) -> Option<i32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let run = &text[start..];
    let end = run
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(run.len());
    run[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waitlist_is_negated() {
        assert_eq!(parse_seats("waitlist: 3 of 5").unwrap(), SeatCount(-3));
        assert_eq!(parse_seats("Waitlist 12").unwrap(), SeatCount(-12));
    }

    #[test]
    fn test_waitlist_takes_precedence_over_full() {
        assert_eq!(
            parse_seats("class full, waitlist 2 of 5 filled").unwrap(),
            SeatCount(-2)
        );
    }

    #[test]
    fn test_waitlist_without_digits_fails() {
        assert!(matches!(
            parse_seats("waitlist open"),
            Err(AvailabilityError::UnparseableAvailability { .. })
        ));
    }

    #[test]
    fn test_full_without_digits_is_zero() {
        assert_eq!(parse_seats("class full").unwrap(), SeatCount(0));
        assert_eq!(parse_seats("  Closed ").unwrap(), SeatCount(0));
    }

    #[test]
    fn test_open_seats_use_first_digit_run() {
        assert_eq!(parse_seats("24 seats available").unwrap(), SeatCount(24));
        assert_eq!(parse_seats("seats: 7 (of 30)").unwrap(), SeatCount(7));
        assert_eq!(parse_seats("0 seats").unwrap(), SeatCount(0));
    }

    #[test]
    fn test_unrecognised_text_fails() {
        let err = parse_seats("  see instructor ").unwrap_err();
        match err {
            AvailabilityError::UnparseableAvailability { text } => {
                assert_eq!(text, "see instructor")
            }
            _ => panic!("Expected UnparseableAvailability error"),
        }
        assert!(parse_seats("").is_err());
    }

    #[test]
    fn test_oversized_number_fails() {
        assert!(parse_seats("99999999999 seats").is_err());
    }
}
