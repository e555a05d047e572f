//! Wizard state machine.
//!
//! Every user interaction is an [`Action`]. [`reduce`] maps the current state
//! and an action to a new state without touching the input, plus the page
//! transition to animate and any side effect the driver has to run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::calendar::DayMarking;
use super::counter::{Counter, StepDirection};
use super::model::{Answer, Choice, DateRange, Question, QuestionId};

/// Where the wizard is.
///
/// Progresses: Browsing(0) ⇄ … ⇄ Browsing(last) → Submitting → Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "index", rename_all = "snake_case")]
pub enum WizardPhase {
    Browsing(usize),
    Submitting,
    Done,
}

impl WizardPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl Default for WizardPhase {
    fn default() -> Self {
        Self::Browsing(0)
    }
}

impl std::fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browsing(i) => write!(f, "browsing({i})"),
            Self::Submitting => write!(f, "submitting"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Direction of the page slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Current page leaves to the left, next one enters from the right.
    Forward,
    /// The mirror image of `Forward`.
    Backward,
}

/// Work the driver must do after a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Run the submission pipeline over the current answers.
    Submit,
}

/// A user interaction or pipeline event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Advance,
    Retreat,
    /// Replace a question's answer wholesale. Must match the question kind.
    SetAnswer { id: QuestionId, answer: Answer },
    /// Set the free text of the question's "Other" choice.
    SetOtherText { id: QuestionId, text: String },
    EditLocation { id: QuestionId, text: String },
    StepRadius { id: QuestionId, direction: StepDirection },
    TapDate { id: QuestionId, day: NaiveDate },
    /// Step the count of the `group`-th traveler group.
    StepGroup {
        id: QuestionId,
        group: usize,
        direction: StepDirection,
    },
    StepCount { id: QuestionId, direction: StepDirection },
    SelectOption { id: QuestionId, option: String },
    SelectOther { id: QuestionId },
    ToggleOption { id: QuestionId, option: String },
    ToggleOther { id: QuestionId },
    /// The submission pipeline finished, successfully or not.
    SubmissionFinished,
}

/// Result of one reduction.
#[derive(Debug, Clone)]
pub struct Step {
    pub state: WizardState,
    pub transition: Option<Transition>,
    pub effect: Option<Effect>,
}

impl Step {
    fn unchanged(state: &WizardState) -> Self {
        Self {
            state: state.clone(),
            transition: None,
            effect: None,
        }
    }
}

/// Full wizard state: the phase and the question list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub phase: WizardPhase,
    pub questions: Vec<Question>,
}

impl WizardState {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            phase: WizardPhase::default(),
            questions,
        }
    }

    /// Index of the page on screen, if browsing.
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            WizardPhase::Browsing(i) => Some(i),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    /// Derived presentation state, or `None` when no page is shown.
    pub fn view(&self) -> Option<WizardView> {
        let index = self.current_index()?;
        let question = self.questions.get(index)?.clone();
        let total = self.questions.len();
        let progress = if total > 1 {
            index as f32 / (total - 1) as f32
        } else {
            1.0
        };
        let button = if index == self.last_index() {
            ButtonLabel::Finish
        } else if question.has_value() {
            ButtonLabel::Next
        } else {
            ButtonLabel::Skip
        };
        let (date_caption, marked_dates) = match &question.answer {
            Answer::Dates(range) => (
                Some(range.caption()),
                range.marked_dates().into_iter().collect(),
            ),
            _ => (None, Vec::new()),
        };
        Some(WizardView {
            index,
            total,
            progress,
            segments: (0..total).map(|k| k <= index).collect(),
            button,
            show_back: index > 0,
            date_caption,
            marked_dates,
            question,
        })
    }
}

/// Label of the forward button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonLabel {
    Skip,
    Next,
    Finish,
}

impl std::fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "Skip"),
            Self::Next => write!(f, "Next"),
            Self::Finish => write!(f, "Finish"),
        }
    }
}

/// What the screen shows for the current page.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub question: Question,
    pub index: usize,
    pub total: usize,
    /// 0.0 on the first page, 1.0 on the last.
    pub progress: f32,
    /// One flag per page; pages up to the current one are filled.
    pub segments: Vec<bool>,
    pub button: ButtonLabel,
    pub show_back: bool,
    pub date_caption: Option<String>,
    pub marked_dates: Vec<(NaiveDate, DayMarking)>,
}

/// Apply `action` to `state`.
pub fn reduce(state: &WizardState, action: Action) -> Step {
    match (state.phase, action) {
        (WizardPhase::Browsing(i), Action::Advance) => {
            let mut next = state.clone();
            if i < state.last_index() {
                next.phase = WizardPhase::Browsing(i + 1);
                Step {
                    state: next,
                    transition: Some(Transition::Forward),
                    effect: None,
                }
            } else {
                next.phase = WizardPhase::Submitting;
                Step {
                    state: next,
                    transition: None,
                    effect: Some(Effect::Submit),
                }
            }
        }
        (WizardPhase::Browsing(i), Action::Retreat) => {
            if i == 0 {
                return Step::unchanged(state);
            }
            let mut next = state.clone();
            next.phase = WizardPhase::Browsing(i - 1);
            Step {
                state: next,
                transition: Some(Transition::Backward),
                effect: None,
            }
        }
        (WizardPhase::Submitting, Action::SubmissionFinished) => {
            let mut next = state.clone();
            next.phase = WizardPhase::Done;
            Step {
                state: next,
                transition: None,
                effect: None,
            }
        }
        (WizardPhase::Browsing(_), action) => match edit(state, &action) {
            Some(questions) => Step {
                state: WizardState {
                    phase: state.phase,
                    questions,
                },
                transition: None,
                effect: None,
            },
            None => {
                warn!(phase = %state.phase, ?action, "Ignoring inapplicable action");
                Step::unchanged(state)
            }
        },
        (phase, action) => {
            warn!(%phase, ?action, "Action not allowed in this phase");
            Step::unchanged(state)
        }
    }
}

/// Produce the new question list for an answer-editing action, or `None`
/// when the action does not apply to the target question.
fn edit(state: &WizardState, action: &Action) -> Option<Vec<Question>> {
    let id = action_target(action)?;
    let position = state.questions.iter().position(|q| q.id == id)?;
    let question = &state.questions[position];
    let answer = edited_answer(question, action)?;

    let mut questions = state.questions.clone();
    questions[position].answer = answer;
    Some(questions)
}

fn action_target(action: &Action) -> Option<QuestionId> {
    match action {
        Action::SetAnswer { id, .. }
        | Action::SetOtherText { id, .. }
        | Action::EditLocation { id, .. }
        | Action::StepRadius { id, .. }
        | Action::TapDate { id, .. }
        | Action::StepGroup { id, .. }
        | Action::StepCount { id, .. }
        | Action::SelectOption { id, .. }
        | Action::SelectOther { id }
        | Action::ToggleOption { id, .. }
        | Action::ToggleOther { id } => Some(*id),
        Action::Advance | Action::Retreat | Action::SubmissionFinished => None,
    }
}

fn edited_answer(question: &Question, action: &Action) -> Option<Answer> {
    match (&question.answer, action) {
        (_, Action::SetAnswer { answer, .. }) => question.admits(answer).then(|| answer.clone()),
        (Answer::Single(Some(Choice::Other(_))), Action::SetOtherText { text, .. }) => {
            Some(Answer::Single(Some(Choice::Other(text.clone()))))
        }
        (Answer::Multi(choices), Action::SetOtherText { text, .. }) => {
            choices.iter().any(Choice::is_other).then(|| {
                Answer::Multi(
                    choices
                        .iter()
                        .map(|c| match c {
                            Choice::Other(_) => Choice::Other(text.clone()),
                            preset => preset.clone(),
                        })
                        .collect(),
                )
            })
        }
        (Answer::Location(loc), Action::EditLocation { text, .. }) => {
            let mut loc = loc.clone();
            loc.location = text.clone();
            Some(Answer::Location(loc))
        }
        (Answer::Location(loc), Action::StepRadius { direction, .. }) => {
            let mut loc = loc.clone();
            loc.radius = Counter::RADIUS.apply(loc.radius, *direction);
            Some(Answer::Location(loc))
        }
        (Answer::Dates(range), Action::TapDate { day, .. }) => {
            Some(Answer::Dates(DateRange::tap(range, *day)))
        }
        (
            Answer::Travelers(groups),
            Action::StepGroup {
                group, direction, ..
            },
        ) => {
            let target = groups.get(*group)?;
            let count = Counter::group(target.floor()).apply(target.count, *direction);
            let mut groups = groups.clone();
            groups[*group].count = count;
            Some(Answer::Travelers(groups))
        }
        (Answer::Count(n), Action::StepCount { direction, .. }) => {
            Some(Answer::Count(Counter::SINGLE.apply(*n, *direction)))
        }
        (Answer::Single(_), Action::SelectOption { option, .. }) => question
            .options
            .contains(option)
            .then(|| Answer::Single(Some(Choice::Preset(option.clone())))),
        (Answer::Single(current), Action::SelectOther { .. }) if question.allows_other => {
            match current {
                Some(Choice::Other(_)) => Some(Answer::Single(current.clone())),
                _ => Some(Answer::Single(Some(Choice::Other(String::new())))),
            }
        }
        (Answer::Multi(choices), Action::ToggleOption { option, .. }) => {
            if !question.options.contains(option) {
                return None;
            }
            let picked = Choice::Preset(option.clone());
            let mut choices = choices.clone();
            match choices.iter().position(|c| *c == picked) {
                Some(pos) => {
                    choices.remove(pos);
                }
                None => choices.push(picked),
            }
            Some(Answer::Multi(choices))
        }
        (Answer::Multi(choices), Action::ToggleOther { .. }) if question.allows_other => {
            let mut choices = choices.clone();
            match choices.iter().position(Choice::is_other) {
                Some(pos) => {
                    choices.remove(pos);
                }
                None => choices.push(Choice::Other(String::new())),
            }
            Some(Answer::Multi(choices))
        }
        _ => None,
    }
}
