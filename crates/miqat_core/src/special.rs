//! Recurring occasions in the Hijri year.
//!
//! Two independent questions are answered for a (month, day) pair: whether it
//! is one of a handful of named single-day occasions, and which recurring day
//! ranges it falls in. A day may have a label, range tags, both, or neither.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

const RAMADAN: u32 = 9;
const DHU_AL_HIJJAH: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialDay {
    Ashura,
    EidAlFitr,
    DayOfArafah,
    EidAlAdha,
}

const SPECIAL_DAYS: [(u32, u32, SpecialDay); 4] = [
    (1, 10, SpecialDay::Ashura),
    (10, 1, SpecialDay::EidAlFitr),
    (DHU_AL_HIJJAH, 9, SpecialDay::DayOfArafah),
    (DHU_AL_HIJJAH, 10, SpecialDay::EidAlAdha),
];

impl SpecialDay {
    pub fn lookup(month: u32, day: u32) -> Option<Self> {
        SPECIAL_DAYS
            .iter()
            .find(|(m, d, _)| *m == month && *d == day)
            .map(|(_, _, special)| *special)
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SpecialDay::Ashura, Locale::English) => "Day of Ashura",
            (SpecialDay::Ashura, Locale::Arabic) => "يوم عاشوراء",
            (SpecialDay::EidAlFitr, Locale::English) => "Eid al-Fitr",
            (SpecialDay::EidAlFitr, Locale::Arabic) => "عيد الفطر",
            (SpecialDay::DayOfArafah, Locale::English) => "Day of Arafah",
            (SpecialDay::DayOfArafah, Locale::Arabic) => "يوم عرفة",
            (SpecialDay::EidAlAdha, Locale::English) => "Eid al-Adha",
            (SpecialDay::EidAlAdha, Locale::Arabic) => "عيد الأضحى",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeTag {
    /// Days 13-15 of any month but Ramadan.
    WhiteDay,
    /// Days 1-10 of Dhu al-Hijjah.
    FirstTenDhulHijjah,
    /// Days 21-30 of Ramadan.
    LastTenRamadan,
}

impl RangeTag {
    pub const ALL: [RangeTag; 3] = [
        RangeTag::WhiteDay,
        RangeTag::FirstTenDhulHijjah,
        RangeTag::LastTenRamadan,
    ];

    pub fn applies(&self, month: u32, day: u32) -> bool {
        match self {
            RangeTag::WhiteDay => month != RAMADAN && (13..=15).contains(&day),
            RangeTag::FirstTenDhulHijjah => month == DHU_AL_HIJJAH && (1..=10).contains(&day),
            RangeTag::LastTenRamadan => month == RAMADAN && (21..=30).contains(&day),
        }
    }
}

/// The set of [`RangeTag`]s a day belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeTags {
    white_day: bool,
    first_ten_dhul_hijjah: bool,
    last_ten_ramadan: bool,
}

impl RangeTags {
    pub fn for_day(month: u32, day: u32) -> Self {
        let mut tags = Self::default();
        for tag in RangeTag::ALL {
            if tag.applies(month, day) {
                tags.insert(tag);
            }
        }
        tags
    }

    fn slot(&mut self, tag: RangeTag) -> &mut bool {
        match tag {
            RangeTag::WhiteDay => &mut self.white_day,
            RangeTag::FirstTenDhulHijjah => &mut self.first_ten_dhul_hijjah,
            RangeTag::LastTenRamadan => &mut self.last_ten_ramadan,
        }
    }

    pub fn insert(&mut self, tag: RangeTag) {
        *self.slot(tag) = true;
    }

    pub fn contains(&self, tag: RangeTag) -> bool {
        match tag {
            RangeTag::WhiteDay => self.white_day,
            RangeTag::FirstTenDhulHijjah => self.first_ten_dhul_hijjah,
            RangeTag::LastTenRamadan => self.last_ten_ramadan,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.white_day || self.first_ten_dhul_hijjah || self.last_ten_ramadan)
    }

    pub fn iter(&self) -> impl Iterator<Item = RangeTag> + '_ {
        RangeTag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClassification {
    pub special: Option<SpecialDay>,
    pub ranges: RangeTags,
}

pub fn classify(month: u32, day: u32) -> DayClassification {
    DayClassification {
        special: SpecialDay::lookup(month, day),
        ranges: RangeTags::for_day(month, day),
    }
}
