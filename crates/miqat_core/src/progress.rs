use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Completion flags for one calendar day, keyed by habit name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitRecord {
    habits: BTreeMap<String, bool>,
}

impl HabitRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, habit: impl Into<String>, done: bool) -> Self {
        self.set(habit, done);
        self
    }

    pub fn set(&mut self, habit: impl Into<String>, done: bool) {
        self.habits.insert(habit.into(), done);
    }

    pub fn is_done(&self, habit: &str) -> bool {
        self.habits.get(habit).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.habits.iter().map(|(name, done)| (name.as_str(), *done))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for HabitRecord {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut record = HabitRecord::new();
        for (habit, done) in iter {
            record.set(habit, done);
        }
        record
    }
}

/// Percentage of `habit_names` marked done in `record`, rounded half up.
/// An empty name list yields 0.
pub fn progress(record: &HabitRecord, habit_names: &[String]) -> u8 {
    let total = habit_names.len();
    if total == 0 {
        return 0;
    }
    let done = habit_names
        .iter()
        .filter(|name| record.is_done(name))
        .count();
    ((200 * done + total) / (2 * total)) as u8
}

/// The two disjoint habit groups whose completion is tracked per day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HabitGroups {
    required: Vec<String>,
    optional: Vec<String>,
}

impl HabitGroups {
    pub fn new(required: Vec<String>, optional: Vec<String>) -> CalendarResult<Self> {
        if let Some(shared) = required.iter().find(|name| optional.contains(name)) {
            return Err(CalendarError::OverlappingHabit(shared.clone()));
        }
        Ok(Self { required, optional })
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// `(required, optional)` percentages for one day's record.
    pub fn score(&self, record: &HabitRecord) -> (u8, u8) {
        (
            progress(record, &self.required),
            progress(record, &self.optional),
        )
    }
}
