use chrono::NaiveDate;
use log::warn;

/// Parse a scraped count ("1,234", " 12 pts") into a number.
///
/// Failures are a data-quality issue, not an extraction failure: the value is
/// logged and left absent so the rest of the record survives.
pub fn parse_count(field: &str, raw: &str, owner: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .trim_end_matches("pts")
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | ' '))
        .collect();

    match digits.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Data quality: {} of {} is not a number: {:?}", field, owner, raw.trim());
            None
        }
    }
}

/// Parse a `dd/mm/yyyy` date
pub fn parse_day_month_year(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

/// Like [`parse_day_month_year`], logging a data-quality warning on failure
pub fn parse_date_field(field: &str, raw: &str, owner: &str) -> Option<NaiveDate> {
    let date = parse_day_month_year(raw);
    if date.is_none() && !raw.trim().is_empty() {
        warn!("Data quality: {} of {} is not a date: {:?}", field, owner, raw.trim());
    }
    date
}

/// Empty strings become `None`
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
