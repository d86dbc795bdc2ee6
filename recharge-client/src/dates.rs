use time::{macros::format_description, Date, Month};

use crate::error::DomainError;

/// Parse an ISO `YYYY-MM-DD` date. A trailing time component
/// (`2024-03-01 00:00:00`, `2024-03-01T00:00:00`) is ignored.
pub fn parse_iso_date(s: &str) -> Result<Date, DomainError> {
    let trimmed = s.trim();
    let day_part = trimmed
        .split(|c| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    Date::parse(day_part, format_description!("[year]-[month]-[day]"))
        .map_err(|_| DomainError::Date(trimmed.to_string()))
}

/// Parse a reading period date.
///
/// Accepts `MM/DD/YY` (years below 69 pivot into the 2000s), `MM/DD/YYYY`
/// and ISO dates.
pub fn parse_period_date(s: &str) -> Result<Date, DomainError> {
    let trimmed = s.trim();
    if !trimmed.contains('/') {
        return parse_iso_date(trimmed);
    }

    let err = || DomainError::Date(trimmed.to_string());
    let parts: Vec<&str> = trimmed.split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return Err(err());
    };

    let month: u8 = month.trim().parse().map_err(|_| err())?;
    let day: u8 = day.trim().parse().map_err(|_| err())?;
    let year_str = year.trim();
    let mut year: i32 = year_str.parse().map_err(|_| err())?;
    if year_str.len() == 2 {
        year += if year < 69 { 2000 } else { 1900 };
    }

    let month = Month::try_from(month).map_err(|_| err())?;
    Date::from_calendar_date(year, month, day).map_err(|_| err())
}

pub fn format_iso(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Same day in the following month, clamped to that month's last day.
pub fn add_one_month(date: Date) -> Date {
    let month = date.month().next();
    let year = if month == Month::January { date.year() + 1 } else { date.year() };
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}
