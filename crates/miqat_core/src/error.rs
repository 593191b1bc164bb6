use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// A boundary scan for `target_year` ran past its step budget. This points
    /// at a misconfigured oracle and is not retried.
    #[error("scan for hijri year {target_year} from {from} exceeded {max_steps} steps")]
    ScanLimitExceeded {
        target_year: i32,
        from: NaiveDate,
        max_steps: u32,
    },
    #[error("gregorian date arithmetic left the supported range near {0}")]
    DateOutOfRange(NaiveDate),
    #[error("month index {0} is outside 0..=11")]
    InvalidMonthIndex(usize),
    #[error("year map for {0} is needed to close the last month of the previous year")]
    MissingNextYear(i32),
    #[error("habit `{0}` is listed as both required and optional")]
    OverlappingHabit(String),
    #[error("unsupported locale `{0}`")]
    UnknownLocale(String),
    #[error("max scan steps must be positive")]
    ZeroScanBudget,
    #[error("{day}/{month}/{year} is not a valid hijri date")]
    InvalidHijriDate { day: u32, month: u32, year: i32 },
    #[error("selected year {selected} is below the floor year {floor}")]
    SelectionBelowFloor { selected: i32, floor: i32 },
}

pub type CalendarResult<T> = Result<T, CalendarError>;
