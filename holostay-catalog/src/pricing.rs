use chrono::NaiveDate;

/// Number of nights between two stay dates; zero or negative for an empty
/// or inverted interval.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Nightly price × night count, rounded to the cent
pub fn quote_total(price_per_night: f64, nights: i64) -> f64 {
    if nights <= 0 {
        return 0.0;
    }
    (price_per_night * nights as f64 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_night_stay() {
        let check_in = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let check_out = NaiveDate::from_ymd_opt(2024, 2, 18).unwrap();

        let nights = nights_between(check_in, check_out);
        assert_eq!(nights, 3);
        assert_eq!(quote_total(150.0, nights), 450.0);
    }

    #[test]
    fn test_inverted_interval_quotes_zero() {
        let check_in = NaiveDate::from_ymd_opt(2024, 2, 18).unwrap();
        let check_out = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();

        assert_eq!(nights_between(check_in, check_out), -3);
        assert_eq!(quote_total(150.0, -3), 0.0);
    }
}
