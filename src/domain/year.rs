use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use super::pattern;
use crate::errors::YearError;

static TRAILING_YEAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern::compile("trailing year", r"((?:19|20)\d{2})\s*$"));

/// Tell the season of a tournament.
///
/// A year at the end of the name ("Menorca Open 2022") wins. Otherwise the
/// dates decide, as long as both ends fall in the same year.
pub fn resolve_year(name: &str, date_from: NaiveDate, date_to: NaiveDate) -> Result<i32, YearError> {
    let named = TRAILING_YEAR
        .as_ref()
        .and_then(|re| re.captures(name.trim()))
        .and_then(|caps| caps.get(1))
        .and_then(|year| year.as_str().parse::<i32>().ok());

    if let Some(year) = named {
        return Ok(year);
    }

    if date_from.year() == date_to.year() {
        return Ok(date_from.year());
    }

    Err(YearError::UnknownYear { name: name.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(TRAILING_YEAR.is_some());
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_from_name() {
        let year = resolve_year("Estrella Damm Menorca Open 2022", day(2021, 12, 30), day(2022, 1, 3));
        assert_eq!(year, Ok(2022));
    }

    #[test]
    fn test_year_from_dates() {
        assert_eq!(resolve_year("Swedish Padel Open", day(2022, 4, 1), day(2022, 4, 9)), Ok(2022));
    }

    #[test]
    fn test_unknown_year_across_new_year() {
        let result = resolve_year("Winter Exhibition", day(2021, 12, 30), day(2022, 1, 3));
        assert_eq!(
            result,
            Err(YearError::UnknownYear {
                name: "Winter Exhibition".to_string()
            })
        );
    }
}
