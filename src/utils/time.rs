use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in hourfit.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Returns the calendar day before `date`.
pub fn yesterday(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_key, parse_date_key, yesterday};

    #[test]
    fn test_date_key_padding() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_key(date), "2024-03-05");
        assert_eq!(parse_date_key("2024-03-05"), Some(date));
        assert_eq!(parse_date_key("05/03/2024"), None);
    }

    #[test]
    fn test_yesterday_crosses_year() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(yesterday(date), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
