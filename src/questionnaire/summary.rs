//! Turning answered questions into the submitted answer set and the
//! plain-text trip summary sent to the recommendation generator.

use serde::{Deserialize, Serialize};

use crate::error::SummaryError;

use super::calendar::format_us_date;
use super::model::{
    Answer, Choice, DateRange, LocationAnswer, Question, QuestionId, QuestionKind, TravelerGroup,
};

/// A question's final value with "Other" folded into plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAnswer {
    pub id: QuestionId,
    pub prompt: String,
    pub value: ResolvedValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResolvedValue {
    Location(LocationAnswer),
    Dates(DateRange),
    Travelers(Vec<TravelerGroup>),
    Count(u32),
    Text(Option<String>),
    List(Vec<String>),
}

impl ResolvedValue {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Location(_) => QuestionKind::Text,
            Self::Dates(_) => QuestionKind::Date,
            Self::Travelers(_) | Self::Count(_) => QuestionKind::Number,
            Self::Text(_) => QuestionKind::Select,
            Self::List(_) => QuestionKind::Multiselect,
        }
    }
}

/// Fold "Other" choices into their free text.
///
/// A selected "Other" becomes its text. In a multiselect the plain
/// selections keep their order and the text, if any, goes last.
pub fn normalize(questions: &[Question]) -> Vec<ResolvedAnswer> {
    questions
        .iter()
        .map(|q| ResolvedAnswer {
            id: q.id,
            prompt: q.prompt.clone(),
            value: resolve(&q.answer),
        })
        .collect()
}

fn resolve(answer: &Answer) -> ResolvedValue {
    match answer {
        Answer::Location(loc) => ResolvedValue::Location(loc.clone()),
        Answer::Dates(range) => ResolvedValue::Dates(*range),
        Answer::Travelers(groups) => ResolvedValue::Travelers(groups.clone()),
        Answer::Count(n) => ResolvedValue::Count(*n),
        Answer::Single(choice) => ResolvedValue::Text(choice.as_ref().map(|c| match c {
            Choice::Preset(s) | Choice::Other(s) => s.clone(),
        })),
        Answer::Multi(choices) => {
            let mut values: Vec<String> = choices
                .iter()
                .filter_map(|c| match c {
                    Choice::Preset(s) => Some(s.clone()),
                    Choice::Other(_) => None,
                })
                .collect();
            let other = choices.iter().find_map(|c| match c {
                Choice::Other(text) if !text.is_empty() => Some(text.clone()),
                _ => None,
            });
            values.extend(other);
            ResolvedValue::List(values)
        }
    }
}

/// Render the trip summary.
///
/// Fragments appear in question order and each one depends only on its own
/// answer, so filling in a skipped question adds one fragment and leaves the
/// rest untouched.
pub fn render_summary(answers: &[ResolvedAnswer]) -> Result<String, SummaryError> {
    let mut fragments = Vec::new();

    let location = expect_location(answers, QuestionId::Destination)?;
    let dates = expect_dates(answers, QuestionId::Dates)?;
    fragments.extend(trip_fragment(location, dates));

    fragments.extend(traveler_fragment(answers)?);

    if let Some(v) = expect_text(answers, QuestionId::Experience)? {
        fragments.push(format!("My hiking experience is: {v}."));
    }
    if let Some(v) = expect_text(answers, QuestionId::Difficulty)? {
        fragments.push(format!("I prefer my trail to be {}.", headline(v)));
    }
    if let Some(v) = expect_text(answers, QuestionId::Duration)? {
        fragments.push(format!("I want to hike for {v}."));
    }
    if let Some(v) = expect_list(answers, QuestionId::Scenery)? {
        fragments.push(format!("I enjoy {v} scenery."));
    }
    if let Some(v) = expect_text(answers, QuestionId::Terrain)? {
        fragments.push(format!("I prefer {} terrain.", v.to_lowercase()));
    }
    if let Some(v) = expect_list(answers, QuestionId::TripFeatures)? {
        fragments.push(format!("I'm looking for trips with {v}."));
    }
    if let Some(v) = expect_list(answers, QuestionId::MustHaves)? {
        fragments.push(format!("My trip must-haves are: {v}."));
    }
    if let Some(v) = expect_text(answers, QuestionId::TimeOfDay)? {
        fragments.push(format!("I prefer hiking during the {}.", headline(v)));
    }

    Ok(fragments.join(" "))
}

fn trip_fragment(location: &LocationAnswer, dates: &DateRange) -> Option<String> {
    let span = match (dates.start, dates.end) {
        (Some(start), Some(end)) => Some(format!(
            " from {} to {}",
            format_us_date(start),
            format_us_date(end)
        )),
        _ => None,
    };
    let place = location.location.trim();
    match (place.is_empty(), span) {
        (false, span) => Some(format!(
            "I would like to go within {} miles of {}{}.",
            location.radius,
            place,
            span.unwrap_or_default()
        )),
        (true, Some(span)) => Some(format!("I would like to go{span}.")),
        (true, None) => None,
    }
}

fn traveler_fragment(answers: &[ResolvedAnswer]) -> Result<Option<String>, SummaryError> {
    let parts: Vec<String> = match find(answers, QuestionId::Travelers)? {
        ResolvedValue::Travelers(groups) => groups
            .iter()
            .filter(|g| g.count > 0)
            .map(|g| plural(g.count, &g.noun()))
            .collect(),
        ResolvedValue::Count(n) if *n > 0 => vec![plural(*n, "hiker")],
        ResolvedValue::Count(_) => Vec::new(),
        other => return Err(mismatch(QuestionId::Travelers, QuestionKind::Number, other)),
    };
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(format!("There will be {}.", parts.join(", "))))
}

fn plural(count: u32, noun: &str) -> String {
    if count > 1 {
        format!("{count} {noun}s")
    } else {
        format!("{count} {noun}")
    }
}

/// "Easy - Gentle paths" -> "easy".
fn headline(option: &str) -> String {
    option
        .split(" - ")
        .next()
        .unwrap_or(option)
        .to_lowercase()
}

fn find(answers: &[ResolvedAnswer], id: QuestionId) -> Result<&ResolvedValue, SummaryError> {
    answers
        .iter()
        .find(|a| a.id == id)
        .map(|a| &a.value)
        .ok_or(SummaryError::MissingQuestion(id))
}

fn mismatch(id: QuestionId, expected: QuestionKind, found: &ResolvedValue) -> SummaryError {
    SummaryError::ShapeMismatch {
        id,
        expected,
        found: found.kind(),
    }
}

fn expect_location(
    answers: &[ResolvedAnswer],
    id: QuestionId,
) -> Result<&LocationAnswer, SummaryError> {
    match find(answers, id)? {
        ResolvedValue::Location(loc) => Ok(loc),
        other => Err(mismatch(id, QuestionKind::Text, other)),
    }
}

fn expect_dates(answers: &[ResolvedAnswer], id: QuestionId) -> Result<&DateRange, SummaryError> {
    match find(answers, id)? {
        ResolvedValue::Dates(range) => Ok(range),
        other => Err(mismatch(id, QuestionKind::Date, other)),
    }
}

/// Select answer, `None` when unanswered or blank.
fn expect_text(answers: &[ResolvedAnswer], id: QuestionId) -> Result<Option<&str>, SummaryError> {
    match find(answers, id)? {
        ResolvedValue::Text(v) => Ok(v.as_deref().filter(|s| !s.is_empty())),
        other => Err(mismatch(id, QuestionKind::Select, other)),
    }
}

/// Multiselect answer joined with ", ", `None` when empty.
fn expect_list(answers: &[ResolvedAnswer], id: QuestionId) -> Result<Option<String>, SummaryError> {
    match find(answers, id)? {
        ResolvedValue::List(items) if items.is_empty() => Ok(None),
        ResolvedValue::List(items) => Ok(Some(items.join(", "))),
        other => Err(mismatch(id, QuestionKind::Multiselect, other)),
    }
}
