use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use tracing::{debug, info};

use crate::config::CalendarConfig;
use crate::error::CalendarResult;
use crate::grid::{DayLookup, MonthGrid, MonthGridBuilder};
use crate::locale::Locale;
use crate::navigation::NavigationCursor;
use crate::oracle::{HijriDate, HijriOracle};
use crate::progress::HabitGroups;
use crate::resolver::{BoundaryResolver, HijriYearMap};

/// Navigation cursor plus the year map and grid it currently selects.
///
/// Every change replaces the shared `Arc`s rather than editing them, so a
/// renderer holding an older grid keeps a consistent snapshot.
pub struct CalendarSession<O, L> {
    resolver: BoundaryResolver<O>,
    lookup: L,
    habits: HabitGroups,
    week_start: Weekday,
    today: NaiveDate,
    cursor: NavigationCursor,
    year_map: Arc<HijriYearMap>,
    next_year_map: Option<Arc<HijriYearMap>>,
    grid: Arc<MonthGrid>,
}

impl<O, L> CalendarSession<O, L>
where
    O: HijriOracle,
    L: DayLookup,
{
    pub fn new(oracle: O, lookup: L, config: &CalendarConfig, today: NaiveDate) -> CalendarResult<Self> {
        let resolver = BoundaryResolver::new(oracle)
            .with_max_steps(config.max_scan_steps)?
            .with_locale(config.locale);
        let habits = config.habit_groups()?;
        let cursor = NavigationCursor::new(resolver.hijri(today));
        let year_map = Arc::new(resolver.month_starts(cursor.selected_year(), today)?);
        let mut next_year_map = None;
        let grid = build_grid(
            &resolver,
            &lookup,
            &habits,
            config.week_start,
            &year_map,
            &mut next_year_map,
            cursor.selected_month(),
        )?;

        Ok(Self {
            resolver,
            lookup,
            habits,
            week_start: config.week_start,
            today,
            cursor,
            year_map,
            next_year_map,
            grid: Arc::new(grid),
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_hijri(&self) -> HijriDate {
        self.resolver.hijri(self.today)
    }

    pub fn cursor(&self) -> NavigationCursor {
        self.cursor
    }

    pub fn locale(&self) -> Locale {
        self.resolver.locale()
    }

    pub fn weekday_initials(&self) -> [&'static str; 7] {
        self.locale().weekday_initials(self.week_start)
    }

    pub fn year_map(&self) -> Arc<HijriYearMap> {
        Arc::clone(&self.year_map)
    }

    pub fn grid(&self) -> Arc<MonthGrid> {
        Arc::clone(&self.grid)
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn prev_year(&mut self) -> CalendarResult<bool> {
        if !self.cursor.prev_year() {
            return Ok(false);
        }
        self.reload_year()?;
        Ok(true)
    }

    pub fn next_year(&mut self) -> CalendarResult<bool> {
        self.cursor.next_year();
        self.reload_year()?;
        Ok(true)
    }

    pub fn select_month(&mut self, month_index: usize) -> CalendarResult<bool> {
        if !self.cursor.select_month(month_index)? {
            return Ok(false);
        }
        self.rebuild_grid()?;
        Ok(true)
    }

    pub fn prev_month(&mut self) -> CalendarResult<bool> {
        let year = self.cursor.selected_year();
        if !self.cursor.prev_month() {
            return Ok(false);
        }
        self.sync_after_move(year)?;
        Ok(true)
    }

    pub fn next_month(&mut self) -> CalendarResult<bool> {
        let year = self.cursor.selected_year();
        self.cursor.next_month();
        self.sync_after_move(year)?;
        Ok(true)
    }

    /// Applies a new reference day. Returns true when the day actually
    /// changed; the floor is recomputed and the selection clamped upward.
    pub fn refresh_today(&mut self, today: NaiveDate) -> CalendarResult<bool> {
        if today == self.today {
            return Ok(false);
        }
        self.today = today;
        let floor = self.resolver.hijri(today).year();
        info!(%today, floor, "reference day refreshed");
        if self.cursor.set_floor(floor) {
            self.reload_year()?;
        } else {
            // Month boundaries do not move, but the grid may now include
            // records for the new day.
            self.rebuild_grid()?;
        }
        Ok(true)
    }

    /// Rebuilds the current grid, for instance after habit records changed.
    pub fn rebuild_grid(&mut self) -> CalendarResult<()> {
        let grid = build_grid(
            &self.resolver,
            &self.lookup,
            &self.habits,
            self.week_start,
            &self.year_map,
            &mut self.next_year_map,
            self.cursor.selected_month(),
        )?;
        self.grid = Arc::new(grid);
        Ok(())
    }

    fn sync_after_move(&mut self, previous_year: i32) -> CalendarResult<()> {
        if self.cursor.selected_year() != previous_year {
            self.reload_year()
        } else {
            self.rebuild_grid()
        }
    }

    fn reload_year(&mut self) -> CalendarResult<()> {
        let year = self.cursor.selected_year();
        let reuse_next = self
            .next_year_map
            .as_ref()
            .filter(|next| next.year() == year)
            .cloned();
        self.year_map = match reuse_next {
            Some(next) => next,
            None => Arc::new(self.resolver.month_starts(year, self.today)?),
        };
        self.next_year_map = None;
        self.rebuild_grid()
    }
}

/// Builds one month, resolving the following year first when the month
/// runs up to the year boundary.
fn build_grid<O: HijriOracle, L: DayLookup>(
    resolver: &BoundaryResolver<O>,
    lookup: &L,
    habits: &HabitGroups,
    week_start: Weekday,
    year_map: &HijriYearMap,
    next_year_map: &mut Option<Arc<HijriYearMap>>,
    month_index: usize,
) -> CalendarResult<MonthGrid> {
    if year_map.needs_next_year(month_index) && next_year_map.is_none() {
        let next_year = year_map.year() + 1;
        debug!(next_year, "resolving following year to close month");
        let next = resolver.month_starts(next_year, year_map.first_day())?;
        *next_year_map = Some(Arc::new(next));
    }
    MonthGridBuilder::new(resolver, lookup, habits, week_start).build(
        year_map,
        month_index,
        next_year_map.as_deref(),
    )
}
