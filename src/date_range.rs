//! Date-range query parameters shared by the listing and statistics endpoints.

use serde::Deserialize;
use time::{Date, Duration};

use crate::Error;

/// The longest span a date range may cover, in days.
pub const MAX_RANGE_DAYS: i64 = 366;

/// An optional, inclusive date range taken from the query string, e.g.
/// `?from=2025-01-01&to=2025-01-31`.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct DateRangeQuery {
    /// The first day of the range. Defaults to the first day of the current month.
    pub from: Option<Date>,
    /// The last day of the range. Defaults to today.
    pub to: Option<Date>,
}

/// An inclusive date range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Date,
    pub to: Date,
}

impl DateRangeQuery {
    /// Fill in missing bounds relative to `today` and check the result.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `from` is after `to` or the range
    /// spans more than [MAX_RANGE_DAYS] days.
    pub fn resolve(self, today: Date) -> Result<DateRange, Error> {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| first_of_month(to));

        if from > to {
            return Err(Error::InvalidDateRange {
                from,
                to,
                reason: "the start date is after the end date",
            });
        }

        if (to - from).whole_days() > MAX_RANGE_DAYS {
            return Err(Error::InvalidDateRange {
                from,
                to,
                reason: "ranges can span at most 366 days",
            });
        }

        Ok(DateRange { from, to })
    }
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        date_range::{DateRange, DateRangeQuery},
    };

    #[test]
    fn defaults_to_month_to_date() {
        let range = DateRangeQuery::default()
            .resolve(date!(2025 - 03 - 17))
            .unwrap();

        assert_eq!(
            range,
            DateRange {
                from: date!(2025 - 03 - 01),
                to: date!(2025 - 03 - 17)
            }
        );
    }

    #[test]
    fn missing_start_uses_first_of_end_month() {
        let query = DateRangeQuery {
            from: None,
            to: Some(date!(2024 - 02 - 29)),
        };

        let range = query.resolve(date!(2025 - 03 - 17)).unwrap();

        assert_eq!(range.from, date!(2024 - 02 - 01));
    }

    #[test]
    fn single_day_range_is_valid() {
        let day = date!(2025 - 01 - 01);
        let query = DateRangeQuery {
            from: Some(day),
            to: Some(day),
        };

        assert!(query.resolve(day).is_ok());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let query = DateRangeQuery {
            from: Some(date!(2025 - 02 - 01)),
            to: Some(date!(2025 - 01 - 01)),
        };

        let result = query.resolve(date!(2025 - 03 - 01));

        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));
    }

    #[test]
    fn leap_year_span_is_allowed_but_longer_is_not() {
        let full_year = DateRangeQuery {
            from: Some(date!(2024 - 01 - 01)),
            to: Some(date!(2025 - 01 - 01)),
        };
        let too_long = DateRangeQuery {
            from: Some(date!(2024 - 01 - 01)),
            to: Some(date!(2025 - 01 - 02)),
        };

        assert!(full_year.resolve(date!(2025 - 06 - 01)).is_ok());
        assert!(too_long.resolve(date!(2025 - 06 - 01)).is_err());
    }
}
