//! Activity heatmap and header statistics.
//!
//! Everything here is a pure view over the map returned by
//! `days::list`; nothing touches the store.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use daybook_shared::DayDate;
use daybook_store::DayRecord;

/// One cell of the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: DayDate,
    pub count: u32,
}

impl CalendarDay {
    pub fn intensity(&self) -> Intensity {
        Intensity::from_count(self.count)
    }
}

/// Heatmap shade of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Total posts and the current daily streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_posts: u32,
    pub current_streak: u32,
}

/// Every date of `year` with its entry count.
pub fn year_days(year: i32, days: &BTreeMap<DayDate, DayRecord>) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.year() == year)
        .map(|d| {
            let date = DayDate::from_naive(d);
            CalendarDay {
                date,
                count: count_on(days, date),
            }
        })
        .collect()
}

/// Fold consecutive days into Sunday-first columns of seven.
///
/// The first column is padded in front up to the weekday of the first day,
/// the last one padded at the back.
pub fn weeks(days: &[CalendarDay]) -> Vec<[Option<CalendarDay>; 7]> {
    let Some(first) = days.first() else {
        return Vec::new();
    };

    let lead = first.date.naive().weekday().num_days_from_sunday() as usize;
    let slots: Vec<Option<CalendarDay>> = std::iter::repeat(None)
        .take(lead)
        .chain(days.iter().copied().map(Some))
        .collect();

    slots
        .chunks(7)
        .map(|chunk| {
            let mut week = [None; 7];
            week[..chunk.len()].copy_from_slice(chunk);
            week
        })
        .collect()
}

/// Column labels: the short month name where a month starts, else `None`.
pub fn month_labels(weeks: &[[Option<CalendarDay>; 7]]) -> Vec<Option<&'static str>> {
    weeks
        .iter()
        .map(|week| {
            let first = week.iter().flatten().next()?;
            let date = first.date.naive();
            (date.day() <= 7).then(|| month_name(date.month0()))
        })
        .collect()
}

/// `"Mon, Jan 6, 2025"`
pub fn format_date_for_tooltip(date: DayDate) -> String {
    date.naive().format("%a, %b %-d, %Y").to_string()
}

/// Sum of all counts plus the run of consecutive posting days ending
/// today, or yesterday when nothing was written today yet.
pub fn stats(days: &BTreeMap<DayDate, DayRecord>, today: DayDate) -> Stats {
    let total_posts: u32 = days.values().map(|d| d.entry_count).sum();

    let mut cursor = Some(today);
    if count_on(days, today) == 0 {
        cursor = today.pred();
    }

    let mut current_streak = 0;
    while let Some(date) = cursor {
        if count_on(days, date) == 0 {
            break;
        }
        current_streak += 1;
        cursor = date.pred();
    }

    Stats {
        total_posts,
        current_streak,
    }
}

/// Years offered by the selector: `base_years` plus every year holding
/// data, newest first.
pub fn available_years(days: &BTreeMap<DayDate, DayRecord>, base_years: &[i32]) -> Vec<i32> {
    let years: BTreeSet<i32> = base_years
        .iter()
        .copied()
        .chain(days.keys().map(DayDate::year))
        .collect();
    years.into_iter().rev().collect()
}

fn count_on(days: &BTreeMap<DayDate, DayRecord>, date: DayDate) -> u32 {
    days.get(&date).map_or(0, |d| d.entry_count)
}

fn month_name(month0: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS[month0 as usize % 12]
}
