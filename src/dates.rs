//! Partial release dates and track ages.
//!
//! The catalog reports release dates with varying precision: `"1998"`,
//! `"2020-03"` or `"2020-05-01"`. Year-only dates are normalized to July 1
//! (mid-year) so that age calculations stay stable regardless of precision.
//! Note that the raw strings still compare correctly with plain `<`/`>`:
//! they are consistent prefixes of the full ISO form.

use chrono::NaiveDate;

/// Parse a partial ISO release date into a concrete day.
/// `"1998"` → 1998-07-01, `"2020-03"` → 2020-03-01, full dates parse as-is.
pub fn normalize_release_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    let full = match date.matches('-').count() {
        0 => format!("{}-07-01", date),
        1 => format!("{}-01", date),
        _ => date.to_string(),
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d").ok()
}

/// Whole years elapsed from `from` to `on` (0 if `on` is before the
/// anniversary, negative for future dates).
pub fn whole_years(on: NaiveDate, from: NaiveDate) -> i32 {
    use chrono::Datelike;
    let mut years = on.year() - from.year();
    if (on.month(), on.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// Whole months elapsed from `from` to `on`.
pub fn whole_months(on: NaiveDate, from: NaiveDate) -> i32 {
    use chrono::Datelike;
    let mut months = (on.year() - from.year()) * 12 + on.month() as i32 - from.month() as i32;
    if on.day() < from.day() {
        months -= 1;
    }
    months
}
