use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use miqat_core::{
    clock::{Clock, DayTicker, SystemClock},
    CalendarConfig, CalendarSession, DayLookup, HijriOracle, Locale, MonthGrid, UmmAlQuraOracle,
};
use miqat_store::HabitStore;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub(crate) calendar: CalendarConfig,
    pub(crate) store_root: Option<PathBuf>,
    pub(crate) follow: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("MIQAT_CONFIG") {
            config.calendar = CalendarConfig::load(&path)
                .with_context(|| format!("loading calendar config from {path}"))?;
        }
        if let Ok(root) = std::env::var("MIQAT_STORE") {
            info!(path = %root, "using habit store");
            config.store_root = Some(PathBuf::from(root));
        }
        if let Ok(tag) = std::env::var("MIQAT_LOCALE") {
            config.calendar.locale = Locale::from_tag(&tag)?;
        }
        if let Ok(flag) = std::env::var("MIQAT_FOLLOW") {
            config.follow = matches!(flag.trim(), "1" | "true" | "yes");
        }
        Ok(config)
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    let mut builder = HabitStore::builder();
    if let Some(root) = &config.store_root {
        builder = builder.add_root(root);
    }
    let mut store = builder.build()?;
    let changes = if config.follow && config.store_root.is_some() {
        Some(store.watch()?)
    } else {
        None
    };
    let store = Arc::new(store);
    let lookup_store = Arc::clone(&store);

    let clock = SystemClock;
    let today = clock.today();
    let mut session = CalendarSession::new(
        UmmAlQuraOracle::new(),
        move |date: NaiveDate| lookup_store.record(date),
        &config.calendar,
        today,
    )?;
    print!("{}", render_month(&session.grid(), &session.weekday_initials()));

    if !config.follow {
        return Ok(());
    }

    let interval = config.calendar.refresh_interval();
    let (ticker, days) = DayTicker::spawn(clock, interval, today);
    info!(?interval, "following calendar day changes");
    loop {
        let day = match days.recv_timeout(POLL_INTERVAL) {
            Ok(day) => Some(day),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let changed: Vec<PathBuf> = changes
            .as_ref()
            .map(|changes| changes.try_iter().collect())
            .unwrap_or_default();
        if follow_step(&mut session, &store, day, &changed)? {
            print!("{}", render_month(&session.grid(), &session.weekday_initials()));
        } else {
            debug!("calendar unchanged");
        }
    }
    ticker.stop();
    Ok(())
}

/// Applies one poll's worth of events: changed record files first, then a new
/// reference day. The grid is rebuilt at most once. Returns true when it was.
pub fn follow_step<O, L>(
    session: &mut CalendarSession<O, L>,
    store: &HabitStore,
    day: Option<NaiveDate>,
    changed: &[PathBuf],
) -> Result<bool>
where
    O: HijriOracle,
    L: DayLookup,
{
    let mut records_changed = false;
    for path in changed {
        match store.reload_path(path) {
            Ok(date) => {
                debug!(%date, "habit record reloaded");
                records_changed = true;
            }
            Err(err) => warn!(path = %path.display(), %err, "unable to reload habit record"),
        }
    }
    let day_changed = match day {
        Some(day) => session.refresh_today(day)?,
        None => false,
    };
    if records_changed && !day_changed {
        session.rebuild_grid()?;
    }
    Ok(records_changed || day_changed)
}

/// Plain-text month preview: header, weekday initials, then one row per week.
/// Each cell shows the Hijri day and, when a record exists, the required
/// completion percentage.
pub fn render_month(grid: &MonthGrid, initials: &[&str; 7]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", grid.label);
    for initial in initials {
        let _ = write!(out, "{initial:>9}");
    }
    out.push('\n');
    for week in grid.weeks() {
        for cell in week {
            let text = match cell {
                Some(day) => {
                    let marker = if day.special.is_some() { "*" } else { "" };
                    match day.required_progress {
                        Some(pct) => format!("{}{} {:>3}%", day.hijri_day, marker, pct),
                        None => format!("{}{}", day.hijri_day, marker),
                    }
                }
                None => String::new(),
            };
            let _ = write!(out, "{text:>9}");
        }
        out.push('\n');
    }
    for day in grid.days.iter().filter(|day| day.special_label.is_some()) {
        let _ = writeln!(
            out,
            "* {} ({}): {}",
            day.hijri_day,
            day.gregorian_date,
            day.special_label.as_deref().unwrap_or_default()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use miqat_core::HabitRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn follow_step_rebuilds_the_grid_once_per_poll() {
        let temp = tempfile::tempdir().unwrap();
        let store = Arc::new(HabitStore::builder().add_root(temp.path()).build().unwrap());
        let lookups = Arc::new(AtomicUsize::new(0));
        let (counter, lookup_store) = (Arc::clone(&lookups), Arc::clone(&store));
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut session = CalendarSession::new(
            UmmAlQuraOracle::new(),
            move |date: NaiveDate| {
                counter.fetch_add(1, Ordering::SeqCst);
                lookup_store.record(date)
            },
            &CalendarConfig::default(),
            today,
        )
        .unwrap();
        let month_len = session.grid().len();

        let record = temp.path().join("2025-06-02.json");
        std::fs::write(&record, r#"{ "fajr": true }"#).unwrap();
        let tomorrow = today.succ_opt().unwrap();

        lookups.store(0, Ordering::SeqCst);
        assert!(follow_step(&mut session, &store, Some(tomorrow), &[record.clone()]).unwrap());
        assert_eq!(lookups.load(Ordering::SeqCst), month_len);
        let day = session.grid().day(tomorrow).cloned().unwrap();
        assert_eq!(day.required_progress, Some(20));

        lookups.store(0, Ordering::SeqCst);
        assert!(follow_step(&mut session, &store, None, &[record]).unwrap());
        assert_eq!(lookups.load(Ordering::SeqCst), month_len);

        lookups.store(0, Ordering::SeqCst);
        assert!(!follow_step(&mut session, &store, Some(tomorrow), &[]).unwrap());
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn renders_dhul_hijjah_with_progress_and_occasions() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let session = CalendarSession::new(
            UmmAlQuraOracle::new(),
            move |date: NaiveDate| {
                (date == today).then(|| HabitRecord::new().with("fajr", true))
            },
            &CalendarConfig::default(),
            today,
        )
        .unwrap();
        let text = render_month(&session.grid(), &Locale::English.weekday_initials(chrono::Weekday::Sun));
        assert!(text.starts_with("Dhu al-Hijjah 1446\n"));
        assert!(text.contains("20%"));
        assert!(text.contains("Day of Arafah"));
        assert!(text.contains("Eid al-Adha"));
    }
}
