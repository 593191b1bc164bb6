use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::error::{CalendarError, CalendarResult};
use crate::locale::Locale;
use crate::oracle::{HijriDate, HijriOracle};

/// Rough Hijri year length used to place the first probe of a boundary scan.
pub const APPROX_YEAR_DAYS: i64 = 354;

/// Default per-scan step budget. A full year walk needs at most 355 steps.
pub const DEFAULT_MAX_SCAN_STEPS: u32 = 400;

/// Gregorian start dates of the twelve months of one Hijri year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HijriYearMap {
    year: i32,
    first_day: NaiveDate,
    month_starts: [Option<NaiveDate>; 12],
    month_labels: [String; 12],
}

impl HijriYearMap {
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Gregorian date of 1 Muharram.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn month_starts(&self) -> &[Option<NaiveDate>; 12] {
        &self.month_starts
    }

    pub fn month_start(&self, month_index: usize) -> Option<NaiveDate> {
        self.month_starts.get(month_index).copied().flatten()
    }

    pub fn month_labels(&self) -> &[String; 12] {
        &self.month_labels
    }

    /// Locale label for the month, empty when its start was never observed.
    pub fn month_label(&self, month_index: usize) -> &str {
        self.month_labels
            .get(month_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The next present month start after `month_index` within this year.
    pub fn next_start_after(&self, month_index: usize) -> Option<NaiveDate> {
        self.month_starts
            .iter()
            .skip(month_index + 1)
            .find_map(|start| *start)
    }

    /// True when closing `month_index` requires the following year's map.
    pub fn needs_next_year(&self, month_index: usize) -> bool {
        self.next_start_after(month_index).is_none()
    }

    /// Inclusive Gregorian range covered by `month_index`.
    ///
    /// A missing start slot falls back to the first day of the year. The
    /// range ends the day before the next present month start, or the day
    /// before `next_year` begins when no later month of this year is known.
    pub fn month_range(
        &self,
        month_index: usize,
        next_year: Option<&HijriYearMap>,
    ) -> CalendarResult<(NaiveDate, NaiveDate)> {
        if month_index >= 12 {
            return Err(CalendarError::InvalidMonthIndex(month_index));
        }
        let start = match self.month_start(month_index) {
            Some(start) => start,
            None => {
                warn!(
                    year = self.year,
                    month = month_index + 1,
                    "month start unknown; falling back to year start"
                );
                self.first_day
            }
        };
        let following = match self.next_start_after(month_index) {
            Some(next) => next,
            None => next_year
                .filter(|next| next.year == self.year + 1)
                .map(|next| next.first_day)
                .ok_or(CalendarError::MissingNextYear(self.year + 1))?,
        };
        let end = following
            .pred_opt()
            .ok_or(CalendarError::DateOutOfRange(following))?;
        if end < start {
            warn!(
                year = self.year,
                month = month_index + 1,
                %start,
                %end,
                "month boundaries out of order; collapsing to a single day"
            );
            return Ok((start, start));
        }
        Ok((start, end))
    }
}

/// Finds Gregorian boundaries of Hijri years and months by walking an oracle
/// one day at a time.
#[derive(Debug, Clone)]
pub struct BoundaryResolver<O> {
    oracle: O,
    max_steps: u32,
    locale: Locale,
}

impl<O: HijriOracle> BoundaryResolver<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            max_steps: DEFAULT_MAX_SCAN_STEPS,
            locale: Locale::default(),
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> CalendarResult<Self> {
        if max_steps == 0 {
            return Err(CalendarError::ZeroScanBudget);
        }
        self.max_steps = max_steps;
        Ok(self)
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn hijri(&self, date: NaiveDate) -> HijriDate {
        self.oracle.hijri_or_fallback(date)
    }

    /// Gregorian date of 1 Muharram of `target_year`.
    #[instrument(skip(self), fields(max_steps = self.max_steps))]
    pub fn year_start(&self, target_year: i32, anchor: NaiveDate) -> CalendarResult<NaiveDate> {
        let anchor_year = self.hijri(anchor).year();
        let offset = i64::from(target_year) - i64::from(anchor_year);
        let estimate = anchor
            .checked_add_signed(Duration::days(offset * APPROX_YEAR_DAYS))
            .ok_or(CalendarError::DateOutOfRange(anchor))?;

        let mut cursor = estimate;
        let mut steps = 0;
        loop {
            let year = self.hijri(cursor).year();
            if year == target_year {
                break;
            }
            self.charge(&mut steps, target_year, estimate)?;
            cursor = step(cursor, year < target_year)?;
        }
        debug!(steps, %estimate, %cursor, "landed inside target year");

        let inside = cursor;
        let mut steps = 0;
        loop {
            let previous = step(cursor, false)?;
            if self.hijri(previous).year() != target_year {
                break;
            }
            self.charge(&mut steps, target_year, inside)?;
            cursor = previous;
        }
        debug!(steps, start = %cursor, "resolved year start");
        Ok(cursor)
    }

    /// Walks the whole of `target_year` once, recording where each month
    /// begins.
    #[instrument(skip(self), fields(max_steps = self.max_steps))]
    pub fn month_starts(&self, target_year: i32, anchor: NaiveDate) -> CalendarResult<HijriYearMap> {
        let first_day = self.year_start(target_year, anchor)?;
        let mut month_starts: [Option<NaiveDate>; 12] = [None; 12];

        let mut cursor = first_day;
        let mut steps = 0;
        loop {
            match self.oracle.to_hijri(cursor) {
                Some(hijri) if hijri.year() != target_year => break,
                Some(hijri) => {
                    if hijri.day() == 1 {
                        let slot = &mut month_starts[hijri.month_index()];
                        if slot.is_none() {
                            *slot = Some(cursor);
                        }
                    }
                }
                // An unconvertible day neither starts a month nor ends the year.
                None => warn!(%cursor, "hijri conversion failed during year scan; day skipped"),
            }
            self.charge(&mut steps, target_year, first_day)?;
            cursor = step(cursor, true)?;
        }
        debug!(days = steps, "scanned hijri year");

        let month_labels: [String; 12] = std::array::from_fn(|idx| match month_starts[idx] {
            Some(_) => self.locale.month_label(idx as u32 + 1, target_year),
            None => {
                warn!(year = target_year, month = idx + 1, "no first day observed for month");
                String::new()
            }
        });

        Ok(HijriYearMap {
            year: target_year,
            first_day,
            month_starts,
            month_labels,
        })
    }

    fn charge(&self, steps: &mut u32, target_year: i32, from: NaiveDate) -> CalendarResult<()> {
        *steps += 1;
        if *steps > self.max_steps {
            error!(
                target_year,
                %from,
                max_steps = self.max_steps,
                "boundary scan exhausted; oracle is inconsistent"
            );
            return Err(CalendarError::ScanLimitExceeded {
                target_year,
                from,
                max_steps: self.max_steps,
            });
        }
        Ok(())
    }
}

fn step(date: NaiveDate, forward: bool) -> CalendarResult<NaiveDate> {
    let next = if forward {
        date.succ_opt()
    } else {
        date.pred_opt()
    };
    next.ok_or(CalendarError::DateOutOfRange(date))
}
