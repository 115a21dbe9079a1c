use serde::{Deserialize, Serialize};

/// Days a post can be scheduled on, in lookup-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
        }
    }

    /// Case-insensitive; accepts full names and three-letter abbreviations.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        WeekDay::ALL.into_iter().find(|day| {
            let name = day.as_str().to_lowercase();
            name == lower || name[..3] == lower
        })
    }

    /// Identifier of the day in the seeded `week_days` lookup table (1-based).
    pub fn lookup_id(&self) -> i64 {
        *self as i64 + 1
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        WeekDay::ALL[day.num_days_from_monday() as usize]
    }
}

impl std::fmt::Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `create_post` treats failures after the post row itself was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Commit the post row, then log and report each failed media file or
    /// association without rolling anything back.
    #[default]
    BestEffort,
    /// One transaction for the post and every dependent row; any failure
    /// rolls the whole post back.
    AllOrNothing,
}

impl CreatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreatePolicy::BestEffort => "best_effort",
            CreatePolicy::AllOrNothing => "all_or_nothing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Some(CreatePolicy::BestEffort),
            "all_or_nothing" | "atomic" => Some(CreatePolicy::AllOrNothing),
            _ => None,
        }
    }
}
