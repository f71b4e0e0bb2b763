//! Calendar-month window helpers for aggregation.
//!
//! Budget spending and monthly statistics are always computed over the
//! current local calendar month. This is a fixed window, not a rolling one:
//! a transaction dated the 1st of the month counts, one dated the last day
//! of the prior month does not, even if only hours apart.

use time::Date;

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first date in the range.
    pub start: Date,
    /// The last date in the range.
    pub end: Date,
}

/// The first and last day of the calendar month containing `anchor`.
pub fn month_bounds(anchor: Date) -> DateRange {
    let year = anchor.year();
    let month = anchor.month();

    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end =
        Date::from_calendar_date(year, month, month.length(year)).expect("invalid month end date");

    DateRange { start, end }
}

/// Whether `date` falls in the same calendar month as `anchor`.
pub fn is_in_month(date: Date, anchor: Date) -> bool {
    date.year() == anchor.year() && date.month() == anchor.month()
}
