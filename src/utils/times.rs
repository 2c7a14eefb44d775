use chrono::NaiveTime;

/// Minimum connection time for a same-day round trip, in minutes.
pub const MIN_CONNECTION_MINUTES: i64 = 90;

/// Parse a scheduled time in the 4-digit "HHMM" form flights are stored with.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: u32 = value[..2].parse().ok()?;
    let minutes: u32 = value[2..].parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Minutes between arriving on one leg and departing on the next, both on
/// the same calendar day. Negative when the departure is before the arrival.
pub fn connection_gap_minutes(arrival: NaiveTime, departure: NaiveTime) -> i64 {
    (departure - arrival).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("0905"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_hhmm("2359"), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_hhmm("2400"), None);
        assert_eq!(parse_hhmm("905"), None);
        assert_eq!(parse_hhmm("09:05"), None);
        assert_eq!(parse_hhmm(""), None);
    }

    #[test]
    fn test_connection_gap() {
        let arr = parse_hhmm("1000").unwrap();
        let dep = parse_hhmm("1130").unwrap();
        assert_eq!(connection_gap_minutes(arr, dep), 90);

        // Return departing before the outbound lands
        let dep = parse_hhmm("0930").unwrap();
        assert_eq!(connection_gap_minutes(arr, dep), -30);
    }
}
