use chrono::{Datelike, NaiveDate};
use hijri_date::HijriDate as UmmAlQuraDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// A position in the Hijri calendar as reported by a [`HijriOracle`].
///
/// All three parts always come from a single conversion. Values are only
/// built through [`HijriDate::from_parts`], which oracle implementations use
/// to validate what their engine returned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawHijriDate")]
pub struct HijriDate {
    year: i32,
    month: u32,
    day: u32,
}

#[derive(Deserialize)]
struct RawHijriDate {
    year: i32,
    month: u32,
    day: u32,
}

impl TryFrom<RawHijriDate> for HijriDate {
    type Error = CalendarError;

    fn try_from(raw: RawHijriDate) -> Result<Self, Self::Error> {
        HijriDate::from_parts(raw.day, raw.month, raw.year).ok_or(CalendarError::InvalidHijriDate {
            day: raw.day,
            month: raw.month,
            year: raw.year,
        })
    }
}

impl HijriDate {
    /// Substituted when an oracle cannot convert a date.
    pub const FALLBACK: HijriDate = HijriDate {
        year: 1,
        month: 1,
        day: 1,
    };

    pub fn from_parts(day: u32, month: u32, year: i32) -> Option<Self> {
        if !(1..=30).contains(&day) || !(1..=12).contains(&month) || year < 1 {
            return None;
        }
        Some(Self { year, month, day })
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Zero-based month index, as used by navigation and year maps.
    pub fn month_index(&self) -> usize {
        self.month as usize - 1
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn is_year_start(&self) -> bool {
        self.day == 1 && self.month == 1
    }
}

impl Default for HijriDate {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Point conversion from a Gregorian day to a Hijri position.
///
/// Implementations must return the same answer for the same calendar day.
/// Nothing else is assumed: no inverse and no arithmetic relation between the
/// two calendars.
pub trait HijriOracle {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate>;

    /// Converts `date`, substituting [`HijriDate::FALLBACK`] for failed
    /// conversions so a single malformed day cannot break a whole scan.
    fn hijri_or_fallback(&self, date: NaiveDate) -> HijriDate {
        match self.to_hijri(date) {
            Some(hijri) => hijri,
            None => {
                tracing::warn!(%date, "hijri conversion failed; using fallback date");
                HijriDate::FALLBACK
            }
        }
    }
}

impl<O: HijriOracle + ?Sized> HijriOracle for &O {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        (**self).to_hijri(date)
    }
}

impl<O: HijriOracle + ?Sized> HijriOracle for Box<O> {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        (**self).to_hijri(date)
    }
}

impl<O: HijriOracle + ?Sized> HijriOracle for std::sync::Arc<O> {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        (**self).to_hijri(date)
    }
}

/// Umm al-Qura civil calendar, backed by the `hijri_date` tables.
///
/// The tables cover roughly 1356-1500 AH; dates outside that window convert
/// to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UmmAlQuraOracle;

impl UmmAlQuraOracle {
    pub fn new() -> Self {
        Self
    }
}

impl HijriOracle for UmmAlQuraOracle {
    fn to_hijri(&self, date: NaiveDate) -> Option<HijriDate> {
        let year = usize::try_from(date.year()).ok()?;
        let converted =
            UmmAlQuraDate::from_gr(year, date.month() as usize, date.day() as usize).ok()?;
        let day = u32::try_from(converted.day()).ok()?;
        let month = u32::try_from(converted.month()).ok()?;
        let year = i32::try_from(converted.year()).ok()?;
        HijriDate::from_parts(day, month, year)
    }
}
