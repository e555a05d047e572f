//! QuestionnaireSession: owns the wizard state and runs the submission
//! pipeline when the last page is finished.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::store::handoff_keys;

use super::catalog::default_questions;
use super::model::Question;
use super::pipeline::{SubmissionOutcome, SubmissionPipeline};
use super::state::{Action, Effect, Transition, WizardPhase, WizardState, WizardView, reduce};

/// What a dispatched action did.
#[derive(Debug)]
pub struct Dispatched {
    pub phase: WizardPhase,
    pub transition: Option<Transition>,
    /// Set when the action finished the questionnaire.
    pub outcome: Option<SubmissionOutcome>,
}

/// One run through the questionnaire.
pub struct QuestionnaireSession {
    state: RwLock<WizardState>,
    pipeline: SubmissionPipeline,
}

impl QuestionnaireSession {
    /// Session over the default trip-planning questions.
    pub fn new(pipeline: SubmissionPipeline) -> Self {
        Self::with_questions(default_questions(), pipeline)
    }

    pub fn with_questions(questions: Vec<Question>, pipeline: SubmissionPipeline) -> Self {
        Self {
            state: RwLock::new(WizardState::new(questions)),
            pipeline,
        }
    }

    /// Forget the previous submission's results.
    pub async fn start(&self) {
        if let Err(e) = self.pipeline.handoff().remove_many(&handoff_keys::ALL).await {
            warn!(error = %e, "Failed to clear previous trip results");
        }
        info!(
            questions = self.state.read().await.questions.len(),
            "Questionnaire started"
        );
    }

    pub async fn phase(&self) -> WizardPhase {
        self.state.read().await.phase
    }

    pub async fn snapshot(&self) -> WizardState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> Option<WizardView> {
        self.state.read().await.view()
    }

    /// Apply one action. When it submits, the pipeline runs before this
    /// returns and the session ends in `Done`.
    pub async fn dispatch(&self, action: Action) -> Dispatched {
        let step = {
            let mut state = self.state.write().await;
            let before = state.phase;
            let step = reduce(&state, action);
            *state = step.state.clone();
            if before != state.phase {
                info!(from = %before, to = %state.phase, "Wizard phase changed");
            } else {
                debug!(phase = %state.phase, "Answer updated");
            }
            step
        };

        let Some(Effect::Submit) = step.effect else {
            return Dispatched {
                phase: step.state.phase,
                transition: step.transition,
                outcome: None,
            };
        };

        // Actions arriving while this runs are rejected by the reducer.
        let outcome = self.pipeline.run(&step.state.questions).await;

        let mut state = self.state.write().await;
        *state = reduce(&state, Action::SubmissionFinished).state;
        info!(saved = outcome.is_saved(), "Questionnaire finished");

        Dispatched {
            phase: state.phase,
            transition: None,
            outcome: Some(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::StaticIdentity;
    use crate::questionnaire::model::QuestionId;
    use crate::questionnaire::pipeline::test_support::{CountingNavigator, StubGenerator};
    use crate::questionnaire::state::ButtonLabel;
    use crate::store::{HandoffStore, LibSqlBackend, MemoryHandoffStore};

    async fn session(
        identity: StaticIdentity,
    ) -> (QuestionnaireSession, Arc<CountingNavigator>, Arc<LibSqlBackend>) {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let navigator = Arc::new(CountingNavigator::default());
        let pipeline = SubmissionPipeline::new(
            Arc::new(StubGenerator::ok()),
            Arc::new(identity),
            db.clone(),
            db.clone(),
            navigator.clone(),
        );
        (QuestionnaireSession::new(pipeline), navigator, db)
    }

    #[tokio::test]
    async fn start_clears_previous_results() {
        let handoff = Arc::new(MemoryHandoffStore::new());
        for key in handoff_keys::ALL {
            handoff.set(key, "stale").await.unwrap();
        }
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let pipeline = SubmissionPipeline::new(
            Arc::new(StubGenerator::ok()),
            Arc::new(StaticIdentity::anonymous()),
            db,
            handoff.clone(),
            Arc::new(CountingNavigator::default()),
        );

        QuestionnaireSession::new(pipeline).start().await;

        for key in handoff_keys::ALL {
            assert_eq!(handoff.get(key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn skipping_every_page_submits_once() {
        let (session, navigator, _db) = session(StaticIdentity::signed_in("u1")).await;
        session.start().await;

        let total = session.snapshot().await.questions.len();
        for i in 0..total - 1 {
            let view = session.view().await.unwrap();
            assert_eq!(view.index, i);
            let dispatched = session.dispatch(Action::Advance).await;
            assert_eq!(dispatched.transition, Some(Transition::Forward));
            assert!(dispatched.outcome.is_none());
        }

        let view = session.view().await.unwrap();
        assert_eq!(view.button, ButtonLabel::Finish);

        let finished = session.dispatch(Action::Advance).await;
        assert_eq!(finished.phase, WizardPhase::Done);
        assert!(finished.outcome.unwrap().is_saved());
        assert_eq!(navigator.count(), 1);
        assert!(session.view().await.is_none());
    }

    #[tokio::test]
    async fn actions_after_done_are_ignored() {
        let (session, navigator, _db) = session(StaticIdentity::signed_in("u1")).await;
        let total = session.snapshot().await.questions.len();
        for _ in 0..total {
            session.dispatch(Action::Advance).await;
        }
        assert_eq!(session.phase().await, WizardPhase::Done);

        let again = session.dispatch(Action::Advance).await;
        assert_eq!(again.phase, WizardPhase::Done);
        assert!(again.outcome.is_none());
        assert_eq!(navigator.count(), 1);
    }

    #[tokio::test]
    async fn failed_submission_still_ends_done() {
        let (session, navigator, db) = session(StaticIdentity::anonymous()).await;
        let total = session.snapshot().await.questions.len();
        for _ in 0..total {
            session.dispatch(Action::Advance).await;
        }

        assert_eq!(session.phase().await, WizardPhase::Done);
        assert_eq!(navigator.count(), 1);
        assert!(db.get(handoff_keys::TRIP_ERROR).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn edits_are_visible_in_view() {
        let (session, _navigator, _db) = session(StaticIdentity::anonymous()).await;

        let view = session.view().await.unwrap();
        assert_eq!(view.button, ButtonLabel::Skip);
        assert!(!view.show_back);

        session
            .dispatch(Action::EditLocation {
                id: QuestionId::Destination,
                text: "Moab, UT".into(),
            })
            .await;
        let view = session.view().await.unwrap();
        assert_eq!(view.button, ButtonLabel::Next);
    }
}
