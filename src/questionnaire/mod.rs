//! The trip-planning questionnaire.
//!
//! A fixed list of questions walked one page at a time. Answers live in a
//! [`WizardState`] updated only through [`reduce`]; finishing the last page
//! runs the [`SubmissionPipeline`].

pub mod calendar;
pub mod catalog;
pub mod counter;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod summary;

pub use counter::{Counter, StepDirection};
pub use model::{
    Answer, Choice, DateRange, LocationAnswer, Question, QuestionId, QuestionKind, TravelerGroup,
};
pub use pipeline::{Navigator, SubmissionOutcome, SubmissionPipeline};
pub use session::{Dispatched, QuestionnaireSession};
pub use state::{
    Action, ButtonLabel, Effect, Step, Transition, WizardPhase, WizardState, WizardView, reduce,
};
pub use summary::{ResolvedAnswer, ResolvedValue, normalize, render_summary};
