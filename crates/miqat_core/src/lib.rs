//! Hijri calendar navigation and habit-progress aggregation.
//!
//! Month and year boundaries are found by scanning a Gregorian->Hijri
//! [`HijriOracle`] one day at a time; no closed-form conversion is assumed.
//! [`CalendarSession`] ties the pieces together for a host UI.

pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod locale;
pub mod navigation;
pub mod oracle;
pub mod progress;
pub mod resolver;
pub mod session;
pub mod special;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::{CalendarConfig, ConfigError};
pub use crate::error::{CalendarError, CalendarResult};
pub use crate::grid::{CalendarDay, DayLookup, MonthGrid, MonthGridBuilder};
pub use crate::locale::{Locale, TextDirection};
pub use crate::navigation::NavigationCursor;
pub use crate::oracle::{HijriDate, HijriOracle, UmmAlQuraOracle};
pub use crate::progress::{progress, HabitGroups, HabitRecord};
pub use crate::resolver::{BoundaryResolver, HijriYearMap};
pub use crate::session::CalendarSession;
pub use crate::special::{classify, RangeTag, RangeTags, SpecialDay};
