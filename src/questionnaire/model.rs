//! Question records and their strongly-typed answers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::counter::Counter;

/// Label shown for the free-text choice on select/multiselect questions.
pub const OTHER_LABEL: &str = "Other";

/// Stable identity of each catalog question. Declaration order is the
/// question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionId {
    Destination,
    Dates,
    Travelers,
    Experience,
    Difficulty,
    Duration,
    Scenery,
    Terrain,
    TripFeatures,
    MustHaves,
    TimeOfDay,
}

impl QuestionId {
    /// Every question id, in question order.
    pub const ALL: [QuestionId; 11] = [
        Self::Destination,
        Self::Dates,
        Self::Travelers,
        Self::Experience,
        Self::Difficulty,
        Self::Duration,
        Self::Scenery,
        Self::Terrain,
        Self::TripFeatures,
        Self::MustHaves,
        Self::TimeOfDay,
    ];
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Destination => "destination",
            Self::Dates => "dates",
            Self::Travelers => "travelers",
            Self::Experience => "experience",
            Self::Difficulty => "difficulty",
            Self::Duration => "duration",
            Self::Scenery => "scenery",
            Self::Terrain => "terrain",
            Self::TripFeatures => "trip_features",
            Self::MustHaves => "must_haves",
            Self::TimeOfDay => "time_of_day",
        };
        write!(f, "{s}")
    }
}

/// The input widget a question is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    Date,
    Number,
    Select,
    Multiselect,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Date => write!(f, "date"),
            Self::Number => write!(f, "number"),
            Self::Select => write!(f, "select"),
            Self::Multiselect => write!(f, "multiselect"),
        }
    }
}

/// One picked choice on a select or multiselect question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Choice {
    /// One of the question's listed options.
    Preset(String),
    /// The free-text "Other" choice and what the user typed for it.
    Other(String),
}

impl Choice {
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

/// Destination text plus search radius in miles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationAnswer {
    pub location: String,
    pub radius: u32,
}

impl Default for LocationAnswer {
    fn default() -> Self {
        Self {
            location: String::new(),
            radius: 25,
        }
    }
}

/// A possibly partial calendar range.
///
/// `end` is only ever set together with `start`, and never before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// One traveler category on the "who's joining" question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerGroup {
    pub label: String,
    pub subtitle: String,
    pub count: u32,
}

impl TravelerGroup {
    pub fn new(label: &str, subtitle: &str, count: u32) -> Self {
        Self {
            label: label.to_string(),
            subtitle: subtitle.to_string(),
            count,
        }
    }

    /// Map key: lower-cased label with every whitespace character removed.
    pub fn key(&self) -> String {
        self.label
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Singular noun used in summaries ("Older kids" -> "older kid").
    pub fn noun(&self) -> String {
        let lower = self.label.to_lowercase();
        match lower.strip_suffix('s') {
            Some(stem) => stem.to_string(),
            None => lower,
        }
    }

    /// Smallest count the counter allows: at least one adult travels.
    pub fn floor(&self) -> u32 {
        if self.key() == "adults" { 1 } else { 0 }
    }
}

/// The value of a question, one variant per input shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Location(LocationAnswer),
    Dates(DateRange),
    Travelers(Vec<TravelerGroup>),
    Count(u32),
    Single(Option<Choice>),
    Multi(Vec<Choice>),
}

impl Answer {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Location(_) => QuestionKind::Text,
            Self::Dates(_) => QuestionKind::Date,
            Self::Travelers(_) | Self::Count(_) => QuestionKind::Number,
            Self::Single(_) => QuestionKind::Select,
            Self::Multi(_) => QuestionKind::Multiselect,
        }
    }

    /// Whether the user has answered enough for "Next" instead of "Skip".
    pub fn has_value(&self) -> bool {
        match self {
            Self::Location(l) => !l.location.trim().is_empty(),
            Self::Dates(range) => range.is_complete(),
            Self::Travelers(groups) => groups.iter().any(|g| g.count > 0),
            Self::Count(n) => *n > 0,
            Self::Single(None) => false,
            Self::Single(Some(Choice::Preset(s))) => !s.trim().is_empty(),
            Self::Single(Some(Choice::Other(text))) => !text.is_empty(),
            Self::Multi(choices) => match choices.iter().find(|c| c.is_other()) {
                Some(Choice::Other(text)) => !text.is_empty(),
                _ => !choices.is_empty(),
            },
        }
    }

    /// Group counts keyed by [`TravelerGroup::key`], in group order.
    pub fn group_counts(&self) -> Option<Vec<(String, u32)>> {
        match self {
            Self::Travelers(groups) => Some(groups.iter().map(|g| (g.key(), g.count)).collect()),
            _ => None,
        }
    }
}

/// A single page of the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub icon: String,
    /// Listed options for select/multiselect questions, excluding "Other".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Whether the free-text "Other" choice is offered.
    #[serde(default)]
    pub allows_other: bool,
    pub answer: Answer,
}

impl Question {
    pub fn new(id: QuestionId, prompt: &str, icon: &str, answer: Answer) -> Self {
        Self {
            id,
            prompt: prompt.to_string(),
            icon: icon.to_string(),
            options: Vec::new(),
            allows_other: false,
            answer,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_other(mut self) -> Self {
        self.allows_other = true;
        self
    }

    pub fn kind(&self) -> QuestionKind {
        self.answer.kind()
    }

    pub fn has_value(&self) -> bool {
        self.answer.has_value()
    }

    /// Whether `answer` is a value this question's widget could have
    /// produced: same shape, counters on their grid, a forward date range,
    /// and choices drawn from the listed options.
    pub fn admits(&self, answer: &Answer) -> bool {
        if std::mem::discriminant(&self.answer) != std::mem::discriminant(answer) {
            return false;
        }
        match answer {
            Answer::Location(loc) => {
                loc.radius >= Counter::RADIUS.floor && loc.radius % Counter::RADIUS.step == 0
            }
            Answer::Dates(range) => match (range.start, range.end) {
                (_, None) => true,
                (Some(start), Some(end)) => start <= end,
                (None, Some(_)) => false,
            },
            Answer::Travelers(groups) => groups.iter().all(|g| g.count >= g.floor()),
            Answer::Count(n) => *n >= Counter::SINGLE.floor,
            Answer::Single(None) => true,
            Answer::Single(Some(choice)) => self.offers(choice),
            Answer::Multi(choices) => {
                choices.iter().all(|c| self.offers(c))
                    && choices.iter().filter(|c| c.is_other()).count() <= 1
                    && choices
                        .iter()
                        .enumerate()
                        .all(|(i, c)| !choices[..i].contains(c))
            }
        }
    }

    fn offers(&self, choice: &Choice) -> bool {
        match choice {
            Choice::Preset(option) => self.options.contains(option),
            Choice::Other(_) => self.allows_other,
        }
    }

    /// Options as displayed, with "Other" last when offered.
    pub fn display_options(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.options.iter().map(String::as_str).collect();
        if self.allows_other {
            out.push(OTHER_LABEL);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn display_matches_serde() {
        for id in QuestionId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(format!("\"{id}\""), json);
        }
    }

    #[test]
    fn has_value_false_cases() {
        assert!(!Answer::Single(Some(Choice::Preset(String::new()))).has_value());
        assert!(!Answer::Single(Some(Choice::Preset("   ".into()))).has_value());
        assert!(!Answer::Single(None).has_value());
        assert!(!Answer::Multi(vec![]).has_value());
        assert!(!Answer::Multi(vec![Choice::Other(String::new())]).has_value());
        assert!(
            !Answer::Travelers(vec![
                TravelerGroup::new("Adults", "", 0),
                TravelerGroup::new("Pets", "", 0),
            ])
            .has_value()
        );
        assert!(!Answer::Location(LocationAnswer::default()).has_value());
        assert!(!Answer::Dates(DateRange::default()).has_value());
        assert!(
            !Answer::Dates(DateRange {
                start: Some(date("2024-06-01")),
                end: None,
            })
            .has_value()
        );
    }

    #[test]
    fn has_value_true_cases() {
        assert!(Answer::Single(Some(Choice::Preset(" Hilly ".into()))).has_value());
        assert!(Answer::Single(Some(Choice::Other("Canyon trails".into()))).has_value());
        assert!(Answer::Multi(vec![Choice::Preset("Snow trails".into())]).has_value());
        assert!(
            Answer::Multi(vec![
                Choice::Preset("Snow trails".into()),
                Choice::Other("Hot springs".into()),
            ])
            .has_value()
        );
        assert!(Answer::Travelers(vec![TravelerGroup::new("Pets", "", 2)]).has_value());
        assert!(
            Answer::Location(LocationAnswer {
                location: "Boulder, CO".into(),
                radius: 5,
            })
            .has_value()
        );
        assert!(
            Answer::Dates(DateRange {
                start: Some(date("2024-06-01")),
                end: Some(date("2024-06-03")),
            })
            .has_value()
        );
    }

    #[test]
    fn empty_other_masks_other_selections() {
        let answer = Answer::Multi(vec![
            Choice::Preset("Snow trails".into()),
            Choice::Other(String::new()),
        ]);
        assert!(!answer.has_value());
    }

    #[test]
    fn group_keys_drop_every_space() {
        let group = TravelerGroup::new("Older  kids now", "", 0);
        assert_eq!(group.key(), "olderkidsnow");
        assert_eq!(TravelerGroup::new("Young kids", "", 0).key(), "youngkids");
    }

    #[test]
    fn group_nouns_and_floors() {
        assert_eq!(TravelerGroup::new("Older kids", "", 0).noun(), "older kid");
        assert_eq!(TravelerGroup::new("Toddlers", "", 0).noun(), "toddler");
        assert_eq!(TravelerGroup::new("Adults", "", 1).floor(), 1);
        assert_eq!(TravelerGroup::new("Pets", "", 0).floor(), 0);
    }

    #[test]
    fn display_options_append_other() {
        let q = Question::new(QuestionId::Terrain, "?", "map", Answer::Single(None))
            .with_options(&["Flat", "Hilly"])
            .with_other();
        assert_eq!(q.display_options(), vec!["Flat", "Hilly", "Other"]);
    }

    #[test]
    fn admits_follows_counter_floors() {
        let hikers = Question::new(QuestionId::Travelers, "?", "people", Answer::Count(1));
        assert!(hikers.admits(&Answer::Count(4)));
        assert!(!hikers.admits(&Answer::Count(0)));
        assert!(!hikers.admits(&Answer::Travelers(vec![TravelerGroup::new("Adults", "", 1)])));

        let place = Question::new(
            QuestionId::Destination,
            "?",
            "location",
            Answer::Location(LocationAnswer::default()),
        );
        let radius = |radius| {
            Answer::Location(LocationAnswer {
                location: "Zion".into(),
                radius,
            })
        };
        assert!(place.admits(&radius(5)));
        assert!(place.admits(&radius(100)));
        assert!(!place.admits(&radius(0)));
        assert!(!place.admits(&radius(12)));
    }

    #[test]
    fn admits_other_only_when_offered() {
        let closed = Question::new(QuestionId::Duration, "?", "time", Answer::Multi(Vec::new()))
            .with_options(&["1-2 hours"]);
        let open = closed.clone().with_other();
        let other = Answer::Multi(vec![Choice::Other("All day".into())]);
        assert!(!closed.admits(&other));
        assert!(open.admits(&other));
        assert!(open.admits(&Answer::Multi(Vec::new())));
    }

    #[test]
    fn answer_serde_roundtrip() {
        let answer = Answer::Multi(vec![
            Choice::Preset("Lakes and waterfalls".into()),
            Choice::Other("Geysers".into()),
        ]);
        let json = serde_json::to_string(&answer).unwrap();
        let parsed: Answer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, answer);
    }
}
