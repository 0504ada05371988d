use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a lifecycle date string in `YYYY-MM-DD` form.
///
/// Surrounding whitespace is ignored and only the first ten characters are
/// considered, so `2024-01-15T00:00:00` is accepted as `2024-01-15`. The date
/// part must have the exact `dddd-dd-dd` shape and format back to the same
/// text; anything else yields `None` and is treated by the engine as absent.
pub fn parse_lifecycle_date(input: &str) -> Option<NaiveDate> {
    let date_part = input.trim().get(..10)?;

    if !has_iso_shape(date_part) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == date_part).then_some(date)
}

/// Same as [`parse_lifecycle_date`] for the optional fields of a record.
pub fn parse_optional_date(input: Option<&str>) -> Option<NaiveDate> {
    input.and_then(parse_lifecycle_date)
}

fn has_iso_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
