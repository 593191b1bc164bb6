use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

const MONTHS_EN: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

const MONTHS_AR: [&str; 12] = [
    "محرم",
    "صفر",
    "ربيع الأول",
    "ربيع الآخر",
    "جمادى الأولى",
    "جمادى الآخرة",
    "رجب",
    "شعبان",
    "رمضان",
    "شوال",
    "ذو القعدة",
    "ذو الحجة",
];

// Indexed from Monday, matching `Weekday::num_days_from_monday`.
const WEEKDAY_INITIALS_EN: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];
const WEEKDAY_INITIALS_AR: [&str; 7] = ["ن", "ث", "ر", "خ", "ج", "س", "ح"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Label language for month names, weekday initials and occasion names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    #[default]
    English,
    Arabic,
}

impl Locale {
    /// Parses a BCP 47 style tag; only the primary language subtag matters.
    pub fn from_tag(tag: &str) -> Result<Self, CalendarError> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Ok(Locale::English),
            "ar" => Ok(Locale::Arabic),
            _ => Err(CalendarError::UnknownLocale(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Arabic => "ar",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Locale::English => TextDirection::LeftToRight,
            Locale::Arabic => TextDirection::RightToLeft,
        }
    }

    /// Name of Hijri month `month` (1-based); empty for anything outside 1..=12.
    pub fn month_name(&self, month: u32) -> &'static str {
        let table = match self {
            Locale::English => &MONTHS_EN,
            Locale::Arabic => &MONTHS_AR,
        };
        month
            .checked_sub(1)
            .and_then(|idx| table.get(idx as usize))
            .copied()
            .unwrap_or("")
    }

    /// "Muharram 1446" or "محرم ١٤٤٦".
    pub fn month_label(&self, month: u32, year: i32) -> String {
        let name = self.month_name(month);
        if name.is_empty() {
            return String::new();
        }
        format!("{} {}", name, self.format_number(i64::from(year)))
    }

    /// Seven weekday initials ordered from `week_start`.
    pub fn weekday_initials(&self, week_start: Weekday) -> [&'static str; 7] {
        let table = match self {
            Locale::English => &WEEKDAY_INITIALS_EN,
            Locale::Arabic => &WEEKDAY_INITIALS_AR,
        };
        let offset = week_start.num_days_from_monday() as usize;
        std::array::from_fn(|i| table[(offset + i) % 7])
    }

    pub fn format_number(&self, value: i64) -> String {
        let digits = value.to_string();
        match self {
            Locale::English => digits,
            Locale::Arabic => digits
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
                    None => c,
                })
                .collect(),
        }
    }
}

impl FromStr for Locale {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::from_tag(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag().to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
