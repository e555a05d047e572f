//! Terminal front end, one question per screen on stdin/stdout.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::questionnaire::calendar::format_us_date;
use crate::questionnaire::model::{Answer, Choice, OTHER_LABEL, Question, QuestionKind};
use crate::questionnaire::{Action, Navigator, QuestionnaireSession, StepDirection, WizardView};
use crate::store::{HandoffStore, handoff_keys};

/// What one input line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Dispatch these actions in order.
    Actions(Vec<Action>),
    Quit,
}

/// An input line that makes no sense for the question on screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("No option number {0}")]
    UnknownOption(usize),

    #[error("No traveler group number {0}")]
    UnknownGroup(usize),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("This question has no \"Other\" choice")]
    NoOther,

    #[error("Didn't understand '{0}'")]
    Unrecognized(String),
}

/// Parse one input line against the question on screen.
pub fn parse_input(question: &Question, line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    match line {
        "" => return Ok(Command::Actions(vec![Action::Advance])),
        "b" | "back" => return Ok(Command::Actions(vec![Action::Retreat])),
        "q" | "quit" => return Ok(Command::Quit),
        _ => {}
    }

    let id = question.id;
    let actions = match question.kind() {
        QuestionKind::Text => match line {
            "+" => vec![Action::StepRadius {
                id,
                direction: StepDirection::Up,
            }],
            "-" => vec![Action::StepRadius {
                id,
                direction: StepDirection::Down,
            }],
            text => vec![Action::EditLocation {
                id,
                text: text.to_string(),
            }],
        },
        QuestionKind::Date => match line.split_once("..") {
            Some((a, b)) => vec![
                Action::TapDate {
                    id,
                    day: parse_date(a)?,
                },
                Action::TapDate {
                    id,
                    day: parse_date(b)?,
                },
            ],
            None => vec![Action::TapDate {
                id,
                day: parse_date(line)?,
            }],
        },
        QuestionKind::Number => parse_step(question, line)?,
        QuestionKind::Select => parse_select(question, line)?,
        QuestionKind::Multiselect => parse_multiselect(question, line)?,
    };
    Ok(Command::Actions(actions))
}

fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(s.trim().to_string()))
}

fn parse_step(question: &Question, line: &str) -> Result<Vec<Action>, InputError> {
    let id = question.id;
    let (head, direction) = if let Some(head) = line.strip_suffix('+') {
        (head.trim(), StepDirection::Up)
    } else if let Some(head) = line.strip_suffix('-') {
        (head.trim(), StepDirection::Down)
    } else {
        return Err(InputError::Unrecognized(line.to_string()));
    };

    match &question.answer {
        Answer::Count(_) if head.is_empty() => Ok(vec![Action::StepCount { id, direction }]),
        Answer::Travelers(groups) => {
            let n: usize = head
                .parse()
                .map_err(|_| InputError::Unrecognized(line.to_string()))?;
            if n == 0 || n > groups.len() {
                return Err(InputError::UnknownGroup(n));
            }
            Ok(vec![Action::StepGroup {
                id,
                group: n - 1,
                direction,
            }])
        }
        _ => Err(InputError::Unrecognized(line.to_string())),
    }
}

/// Either a listed option or the "Other" entry.
enum Picked {
    Option(String),
    Other,
}

fn pick(question: &Question, token: &str) -> Result<Picked, InputError> {
    if token == "o" {
        return if question.allows_other {
            Ok(Picked::Other)
        } else {
            Err(InputError::NoOther)
        };
    }
    let n: usize = token
        .parse()
        .map_err(|_| InputError::Unrecognized(token.to_string()))?;
    match n.checked_sub(1).and_then(|i| question.options.get(i)) {
        Some(option) => Ok(Picked::Option(option.clone())),
        None if question.allows_other && n == question.options.len() + 1 => Ok(Picked::Other),
        None => Err(InputError::UnknownOption(n)),
    }
}

fn other_text(line: &str) -> Option<&str> {
    line.strip_prefix("o:").map(str::trim)
}

fn parse_select(question: &Question, line: &str) -> Result<Vec<Action>, InputError> {
    let id = question.id;
    if let Some(text) = other_text(line) {
        if !question.allows_other {
            return Err(InputError::NoOther);
        }
        return Ok(vec![
            Action::SelectOther { id },
            Action::SetOtherText {
                id,
                text: text.to_string(),
            },
        ]);
    }
    Ok(match pick(question, line)? {
        Picked::Option(option) => vec![Action::SelectOption { id, option }],
        Picked::Other => vec![Action::SelectOther { id }],
    })
}

fn parse_multiselect(question: &Question, line: &str) -> Result<Vec<Action>, InputError> {
    let id = question.id;
    if let Some(text) = other_text(line) {
        if !question.allows_other {
            return Err(InputError::NoOther);
        }
        let has_other = matches!(&question.answer, Answer::Multi(c) if c.iter().any(Choice::is_other));
        let mut actions = Vec::new();
        if !has_other {
            actions.push(Action::ToggleOther { id });
        }
        actions.push(Action::SetOtherText {
            id,
            text: text.to_string(),
        });
        return Ok(actions);
    }

    line.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            pick(question, token).map(|picked| match picked {
                Picked::Option(option) => Action::ToggleOption { id, option },
                Picked::Other => Action::ToggleOther { id },
            })
        })
        .collect()
}

// ── Rendering ───────────────────────────────────────────────────────

/// Render the page on screen.
pub fn render_view(view: &WizardView) -> String {
    let bar: String = view
        .segments
        .iter()
        .map(|filled| if *filled { '■' } else { '□' })
        .collect();
    let mut lines = vec![
        format!("{bar}  {}/{}", view.index + 1, view.total),
        String::new(),
        view.question.prompt.clone(),
        String::new(),
    ];

    let question = &view.question;
    match &question.answer {
        Answer::Location(loc) => {
            let place = if loc.location.trim().is_empty() {
                "(type a place)"
            } else {
                loc.location.as_str()
            };
            lines.push(format!("  Location: {place}"));
            lines.push(format!("  Radius:   {} miles   (+ / -)", loc.radius));
        }
        Answer::Dates(_) => {
            if let Some(caption) = &view.date_caption {
                lines.push(format!("  {caption}"));
            }
            if !view.marked_dates.is_empty() {
                let days: Vec<String> = view
                    .marked_dates
                    .iter()
                    .map(|(day, _)| format_us_date(*day))
                    .collect();
                lines.push(format!("  Marked: {}", days.join(", ")));
            }
            lines.push("  Enter YYYY-MM-DD or YYYY-MM-DD..YYYY-MM-DD".to_string());
        }
        Answer::Travelers(groups) => {
            for (i, group) in groups.iter().enumerate() {
                let subtitle = if group.subtitle.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", group.subtitle)
                };
                lines.push(format!(
                    "  {}. {}{}: {}",
                    i + 1,
                    group.label,
                    subtitle,
                    group.count
                ));
            }
            lines.push("  Enter <n>+ or <n>-".to_string());
        }
        Answer::Count(n) => lines.push(format!("  {n}   (+ / -)")),
        Answer::Single(current) => {
            for (i, option) in question.display_options().iter().enumerate() {
                let selected = match current {
                    Some(Choice::Preset(s)) => s == option,
                    Some(Choice::Other(_)) => *option == OTHER_LABEL,
                    None => false,
                };
                let mark = if selected { "(•)" } else { "( )" };
                lines.push(format!("  {mark} {}. {option}", i + 1));
            }
            if let Some(Choice::Other(text)) = current {
                lines.push(format!("      Other: {text}"));
            }
        }
        Answer::Multi(choices) => {
            for (i, option) in question.display_options().iter().enumerate() {
                let selected = if *option == OTHER_LABEL {
                    choices.iter().any(Choice::is_other)
                } else {
                    choices.iter().any(|c| matches!(c, Choice::Preset(s) if s == option))
                };
                let mark = if selected { "[x]" } else { "[ ]" };
                lines.push(format!("  {mark} {}. {option}", i + 1));
            }
            if let Some(Choice::Other(text)) = choices.iter().find(|c| c.is_other()) {
                lines.push(format!("      Other: {text}"));
            }
        }
    }

    let back = if view.show_back { "[b] Back   " } else { "" };
    lines.push(String::new());
    lines.push(format!("{back}[enter] {}   [q] Quit", view.button));
    lines.join("\n")
}

/// Render the results screen from what the submission left behind.
pub fn render_results(
    summary: Option<&str>,
    error: Option<&str>,
    plan_id: Option<&str>,
) -> String {
    let mut out = String::from("── Your trip ──\n");
    if let Some(error) = error {
        out.push_str(&format!("{error}\n"));
    }
    if let Some(summary) = summary {
        out.push_str(&format!("\n{summary}\n"));
    }
    if let Some(id) = plan_id {
        out.push_str(&format!("\nSaved plan: {id}\n"));
    }
    if summary.is_none() && error.is_none() && plan_id.is_none() {
        out.push_str("No trip has been planned yet.\n");
    }
    out
}

/// Results screen printed to stdout when the pipeline navigates to it.
pub struct ResultsScreen {
    handoff: Arc<dyn HandoffStore>,
}

impl ResultsScreen {
    pub fn new(handoff: Arc<dyn HandoffStore>) -> Self {
        Self { handoff }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.handoff.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read trip result");
                None
            }
        }
    }
}

#[async_trait]
impl Navigator for ResultsScreen {
    async fn show_results(&self) {
        let summary = self.read(handoff_keys::TRIP_SUMMARY).await;
        let error = self.read(handoff_keys::TRIP_ERROR).await;
        let plan_id = self.read(handoff_keys::LAST_PLAN_ID).await;
        println!(
            "\n{}",
            render_results(summary.as_deref(), error.as_deref(), plan_id.as_deref())
        );
    }
}

/// Drive the session from stdin until it finishes, the user quits, or
/// input ends. Returns whether the questionnaire was submitted.
pub async fn run_terminal(session: &QuestionnaireSession) -> std::io::Result<bool> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(view) = session.view().await {
        println!("\n{}", render_view(&view));
        eprint!("> ");

        let Some(line) = lines.next_line().await? else {
            tracing::info!("Input closed before the questionnaire was finished");
            return Ok(false);
        };

        match parse_input(&view.question, &line) {
            Ok(Command::Quit) => {
                tracing::info!(index = view.index, "Questionnaire abandoned");
                return Ok(false);
            }
            Ok(Command::Actions(actions)) => {
                for action in actions {
                    let dispatched = session.dispatch(action).await;
                    if dispatched.outcome.is_some() {
                        return Ok(true);
                    }
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(session.phase().await.is_terminal())
}
