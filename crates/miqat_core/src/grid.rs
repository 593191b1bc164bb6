use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::CalendarResult;
use crate::oracle::HijriOracle;
use crate::progress::{HabitGroups, HabitRecord};
use crate::resolver::{BoundaryResolver, HijriYearMap};
use crate::special::{self, RangeTags, SpecialDay};

/// Read access to persisted habit completion, keyed by Gregorian date.
pub trait DayLookup {
    fn record_for(&self, date: NaiveDate) -> Option<HabitRecord>;
}

impl<F> DayLookup for F
where
    F: Fn(NaiveDate) -> Option<HabitRecord>,
{
    fn record_for(&self, date: NaiveDate) -> Option<HabitRecord> {
        self(date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub gregorian_date: NaiveDate,
    pub hijri_day: u32,
    pub hijri_month: u32,
    /// `None` when no record exists for the day, as opposed to `Some(0)`.
    pub required_progress: Option<u8>,
    pub optional_progress: Option<u8>,
    pub special: Option<SpecialDay>,
    pub special_label: Option<String>,
    pub ranges: RangeTags,
}

impl CalendarDay {
    pub fn has_record(&self) -> bool {
        self.required_progress.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    /// 1-based Hijri month.
    pub month: u32,
    pub label: String,
    /// Blank cells before the first day, counted from the first day of week.
    pub leading_blank_count: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthGrid {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|day| day.gregorian_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|day| day.gregorian_date)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|day| day.gregorian_date == date)
    }

    /// Rows of seven cells, `None` for leading and trailing blanks.
    pub fn weeks(&self) -> Vec<[Option<&CalendarDay>; 7]> {
        let mut cells: Vec<Option<&CalendarDay>> = Vec::new();
        cells.extend((0..self.leading_blank_count).map(|_| None));
        cells.extend(self.days.iter().map(Some));
        cells
            .chunks(7)
            .map(|row| std::array::from_fn(|idx| row.get(idx).copied().flatten()))
            .collect()
    }
}

/// Weekday position of `date` counted from `week_start` (0..=6).
pub fn weekday_offset(date: NaiveDate, week_start: Weekday) -> u32 {
    (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7
}

/// Assembles month grids from a resolved year map.
pub struct MonthGridBuilder<'a, O, L: ?Sized> {
    resolver: &'a BoundaryResolver<O>,
    lookup: &'a L,
    habits: &'a HabitGroups,
    week_start: Weekday,
}

impl<'a, O, L> MonthGridBuilder<'a, O, L>
where
    O: HijriOracle,
    L: DayLookup + ?Sized,
{
    pub fn new(
        resolver: &'a BoundaryResolver<O>,
        lookup: &'a L,
        habits: &'a HabitGroups,
        week_start: Weekday,
    ) -> Self {
        Self {
            resolver,
            lookup,
            habits,
            week_start,
        }
    }

    pub fn build(
        &self,
        year_map: &HijriYearMap,
        month_index: usize,
        next_year: Option<&HijriYearMap>,
    ) -> CalendarResult<MonthGrid> {
        let (start, end) = year_map.month_range(month_index, next_year)?;
        let locale = self.resolver.locale();
        let days: Vec<CalendarDay> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| self.annotate(date))
            .collect();
        debug!(
            year = year_map.year(),
            month = month_index + 1,
            %start,
            %end,
            days = days.len(),
            "built month grid"
        );

        let label = match year_map.month_label(month_index) {
            "" => locale.month_label(month_index as u32 + 1, year_map.year()),
            label => label.to_string(),
        };
        Ok(MonthGrid {
            year: year_map.year(),
            month: month_index as u32 + 1,
            label,
            leading_blank_count: weekday_offset(start, self.week_start),
            days,
        })
    }

    fn annotate(&self, date: NaiveDate) -> CalendarDay {
        let hijri = self.resolver.hijri(date);
        let classification = special::classify(hijri.month(), hijri.day());
        let (required_progress, optional_progress) = match self.lookup.record_for(date) {
            Some(record) => {
                let (required, optional) = self.habits.score(&record);
                (Some(required), Some(optional))
            }
            None => (None, None),
        };
        CalendarDay {
            gregorian_date: date,
            hijri_day: hijri.day(),
            hijri_month: hijri.month(),
            required_progress,
            optional_progress,
            special: classification.special,
            special_label: classification
                .special
                .map(|special| special.label(self.resolver.locale()).to_string()),
            ranges: classification.ranges,
        }
    }
}
