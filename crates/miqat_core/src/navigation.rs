use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};
use crate::oracle::HijriDate;

/// The Hijri year and month currently on display.
///
/// `selected_year` never drops below `floor_year`, the Hijri year containing
/// today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCursor")]
pub struct NavigationCursor {
    selected_year: i32,
    selected_month: usize,
    floor_year: i32,
}

#[derive(Deserialize)]
struct RawCursor {
    selected_year: i32,
    selected_month: usize,
    floor_year: i32,
}

impl TryFrom<RawCursor> for NavigationCursor {
    type Error = CalendarError;

    fn try_from(raw: RawCursor) -> Result<Self, Self::Error> {
        if raw.selected_month >= 12 {
            return Err(CalendarError::InvalidMonthIndex(raw.selected_month));
        }
        if raw.selected_year < raw.floor_year {
            return Err(CalendarError::SelectionBelowFloor {
                selected: raw.selected_year,
                floor: raw.floor_year,
            });
        }
        Ok(Self {
            selected_year: raw.selected_year,
            selected_month: raw.selected_month,
            floor_year: raw.floor_year,
        })
    }
}

impl NavigationCursor {
    /// Starts on the month containing `today`.
    pub fn new(today: HijriDate) -> Self {
        Self {
            selected_year: today.year(),
            selected_month: today.month_index(),
            floor_year: today.year(),
        }
    }

    pub fn selected_year(&self) -> i32 {
        self.selected_year
    }

    /// Zero-based month index.
    pub fn selected_month(&self) -> usize {
        self.selected_month
    }

    pub fn floor_year(&self) -> i32 {
        self.floor_year
    }

    /// Returns false when already at the floor.
    pub fn prev_year(&mut self) -> bool {
        if self.selected_year <= self.floor_year {
            return false;
        }
        self.selected_year -= 1;
        true
    }

    pub fn next_year(&mut self) -> bool {
        self.selected_year += 1;
        true
    }

    pub fn select_month(&mut self, month_index: usize) -> CalendarResult<bool> {
        if month_index >= 12 {
            return Err(CalendarError::InvalidMonthIndex(month_index));
        }
        let changed = self.selected_month != month_index;
        self.selected_month = month_index;
        Ok(changed)
    }

    /// Steps back one month, wrapping into the previous year unless that
    /// would cross the floor.
    pub fn prev_month(&mut self) -> bool {
        if self.selected_month > 0 {
            self.selected_month -= 1;
            return true;
        }
        if self.prev_year() {
            self.selected_month = 11;
            return true;
        }
        false
    }

    pub fn next_month(&mut self) -> bool {
        if self.selected_month < 11 {
            self.selected_month += 1;
        } else {
            self.selected_year += 1;
            self.selected_month = 0;
        }
        true
    }

    /// Applies a new floor after "today" moved. Returns true if the selected
    /// year had to be clamped upward.
    pub fn set_floor(&mut self, floor_year: i32) -> bool {
        self.floor_year = floor_year;
        if self.selected_year < floor_year {
            self.selected_year = floor_year;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(day: u32, month: u32, year: i32) -> NavigationCursor {
        NavigationCursor::new(HijriDate::from_parts(day, month, year).unwrap())
    }

    #[test]
    fn prev_year_stops_at_floor() {
        let mut nav = cursor(10, 3, 1446);
        assert!(!nav.prev_year());
        assert_eq!(nav.selected_year(), 1446);

        assert!(nav.next_year());
        assert!(nav.next_year());
        assert_eq!(nav.selected_year(), 1448);
        assert!(nav.prev_year());
        assert_eq!(nav.selected_year(), 1447);
    }

    #[test]
    fn deserialization_keeps_floor_and_month_bounds() {
        let nav: NavigationCursor = serde_json::from_str(
            r#"{"selected_year":1447,"selected_month":3,"floor_year":1446}"#,
        )
        .unwrap();
        assert_eq!((nav.selected_year(), nav.selected_month()), (1447, 3));
        assert!(serde_json::from_str::<NavigationCursor>(
            r#"{"selected_year":1445,"selected_month":3,"floor_year":1446}"#
        )
        .is_err());
        assert!(serde_json::from_str::<NavigationCursor>(
            r#"{"selected_year":1446,"selected_month":12,"floor_year":1446}"#
        )
        .is_err());
    }

    #[test]
    fn select_month_validates_index() {
        let mut nav = cursor(1, 1, 1446);
        assert_eq!(nav.selected_month(), 0);
        assert!(nav.select_month(11).unwrap());
        assert!(!nav.select_month(11).unwrap());
        assert_eq!(
            nav.select_month(12).unwrap_err(),
            CalendarError::InvalidMonthIndex(12)
        );
        assert_eq!(nav.selected_month(), 11);
    }

    #[test]
    fn month_steps_wrap_years_but_respect_floor() {
        let mut nav = cursor(29, 12, 1446);
        assert!(nav.next_month());
        assert_eq!((nav.selected_year(), nav.selected_month()), (1447, 0));
        assert!(nav.prev_month());
        assert_eq!((nav.selected_year(), nav.selected_month()), (1446, 11));

        nav.select_month(0).unwrap();
        assert!(!nav.prev_month());
        assert_eq!((nav.selected_year(), nav.selected_month()), (1446, 0));
    }

    #[test]
    fn raising_the_floor_clamps_selection() {
        let mut nav = cursor(29, 12, 1446);
        assert!(!nav.set_floor(1446));
        assert!(nav.set_floor(1447));
        assert_eq!(nav.selected_year(), 1447);
        assert!(!nav.prev_year());

        nav.next_year();
        assert!(!nav.set_floor(1447));
        assert_eq!(nav.selected_year(), 1448);
    }
}
