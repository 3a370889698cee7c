use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A weekly recurring timetable: one ordered subject list per weekday.
///
/// Subject names are case-sensitive free text and may repeat within a day
/// (a double lab block, say). Days are only ever mutated by whole-day
/// replacement. The wire shape is `{ "Monday": [..], ..., "Sunday": [..] }`
/// with empty days omitted; Saturday and Sunday keys exist for compatibility
/// with stored timetables, but no session on them ever counts (the percentage
/// engine discards weekend dates).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(rename = "Monday", default, skip_serializing_if = "Vec::is_empty")]
    monday: Vec<String>,
    #[serde(rename = "Tuesday", default, skip_serializing_if = "Vec::is_empty")]
    tuesday: Vec<String>,
    #[serde(rename = "Wednesday", default, skip_serializing_if = "Vec::is_empty")]
    wednesday: Vec<String>,
    #[serde(rename = "Thursday", default, skip_serializing_if = "Vec::is_empty")]
    thursday: Vec<String>,
    #[serde(rename = "Friday", default, skip_serializing_if = "Vec::is_empty")]
    friday: Vec<String>,
    #[serde(rename = "Saturday", default, skip_serializing_if = "Vec::is_empty")]
    saturday: Vec<String>,
    #[serde(rename = "Sunday", default, skip_serializing_if = "Vec::is_empty")]
    sunday: Vec<String>,
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default timetable injected when a user is created. This is the one
    /// place the default lives; no other layer carries a copy.
    pub fn default_weekly() -> Self {
        let mut timetable = Self::new();
        timetable.replace_day(
            Weekday::Mon,
            subjects(&["operating systems", "UHV", "maths", "java lab"]),
        );
        timetable.replace_day(
            Weekday::Tue,
            subjects(&["java", "maths", "operating systems", "ARM", "os lab"]),
        );
        timetable.replace_day(
            Weekday::Wed,
            subjects(&["operating systems", "maths", "ARM", "java", "ARM lab"]),
        );
        timetable.replace_day(
            Weekday::Thu,
            subjects(&["maths", "c++ lab", "c++", "ARM", "java"]),
        );
        timetable.replace_day(
            Weekday::Fri,
            subjects(&["UI/UX lab", "operating systems", "java", "ARM", "c++"]),
        );
        timetable
    }

    /// The stored subject list for a weekday, empty when the day is unset.
    pub fn subjects_on(&self, weekday: Weekday) -> &[String] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// Atomically replaces one weekday's subject list; other days untouched.
    /// Subject name content is not validated.
    pub fn replace_day(&mut self, weekday: Weekday, new_subjects: Vec<String>) {
        let day = match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *day = new_subjects;
    }

    /// Deduplicated union of subjects across all weekdays.
    pub fn all_subjects(&self) -> BTreeSet<String> {
        let mut all = BTreeSet::new();
        for weekday in ALL_WEEKDAYS {
            for subject in self.subjects_on(weekday) {
                all.insert(subject.clone());
            }
        }
        all
    }

    pub fn is_scheduled_on(&self, subject: &str, weekday: Weekday) -> bool {
        self.subjects_on(weekday).iter().any(|s| s == subject)
    }

    pub fn is_empty(&self) -> bool {
        ALL_WEEKDAYS
            .iter()
            .all(|weekday| self.subjects_on(*weekday).is_empty())
    }
}

fn subjects(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Resolves a full English day name ("Monday", case-insensitive) to a weekday.
/// Used by the HTTP path segments and CLI arguments.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// The full English name for a weekday, matching the wire keys.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
