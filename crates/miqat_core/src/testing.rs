//! Deterministic oracles for unit tests.

use chrono::{Duration, NaiveDate};

use crate::oracle::{HijriDate, HijriOracle};

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A simple arithmetic lunar calendar: odd months have 30 days, even months
/// 29, and Dhu al-Hijjah gains a day every third year.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TabularOracle {
    epoch: NaiveDate,
    epoch_year: i32,
}

impl Default for TabularOracle {
    fn default() -> Self {
        Self {
            epoch: date(2000, 1, 1),
            epoch_year: 1421,
        }
    }
}

impl TabularOracle {
    pub(crate) fn month_len(year: i32, month: u32) -> i64 {
        if month % 2 == 1 || (month == 12 && year % 3 == 0) {
            30
        } else {
            29
        }
    }

    pub(crate) fn year_len(year: i32) -> i64 {
        354 + i64::from(year % 3 == 0)
    }

    pub(crate) fn first_day_of(&self, year: i32) -> NaiveDate {
        let mut offset = 0;
        if year >= self.epoch_year {
            for y in self.epoch_year..year {
                offset += Self::year_len(y);
            }
        } else {
            for y in year..self.epoch_year {
                offset -= Self::year_len(y);
            }
        }
        self.epoch + Duration::days(offset)
    }
}

impl HijriOracle for TabularOracle {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        let mut remaining = (date - self.epoch).num_days();
        let mut year = self.epoch_year;
        while remaining < 0 {
            year -= 1;
            remaining += Self::year_len(year);
        }
        while remaining >= Self::year_len(year) {
            remaining -= Self::year_len(year);
            year += 1;
        }
        let mut month = 1;
        while remaining >= Self::month_len(year, month) {
            remaining -= Self::month_len(year, month);
            month += 1;
        }
        HijriDate::from_parts(remaining as u32 + 1, month, year)
    }
}

/// Adapts a closure into an oracle.
pub(crate) struct FnOracle<F>(pub F);

impl<F: Fn(NaiveDate) -> Option<HijriDate>> HijriOracle for FnOracle<F> {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        (self.0)(date)
    }
}

/// Reports day 2 where `inner` would report day 1 of `month`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SkipsMonthStart<O> {
    pub inner: O,
    pub month: u32,
}

impl<O: HijriOracle> HijriOracle for SkipsMonthStart<O> {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        let hijri = self.inner.to_hijri(date)?;
        if hijri.month() == self.month && hijri.day() == 1 {
            return HijriDate::from_parts(2, hijri.month(), hijri.year());
        }
        Some(hijri)
    }
}
