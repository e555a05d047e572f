//! Submission pipeline: answers in, saved plan (or a user-facing error) out.
//!
//! Runs as one sequential chain of awaited collaborator calls. Every failure
//! is caught here; the caller always gets an outcome and the results screen
//! is always shown exactly once.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::SubmitError;
use crate::identity::IdentityProvider;
use crate::llm::RecommendationGenerator;
use crate::store::{HandoffStore, PlanStore, SavedPlan, handoff_keys};

use super::model::Question;
use super::summary::{ResolvedAnswer, normalize, render_summary};

/// Moves the user to the results screen.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn show_results(&self);
}

/// How a submission ended.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Saved(SavedPlan),
    Failed {
        error: SubmitError,
        /// The rendered summary, when rendering got that far.
        summary: Option<String>,
    },
}

impl SubmissionOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// Message for the results screen, if the submission failed.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Saved(_) => None,
            Self::Failed { error, .. } => Some(error.user_message()),
        }
    }
}

/// The collaborators a submission talks to.
#[derive(Clone)]
pub struct SubmissionPipeline {
    generator: Arc<dyn RecommendationGenerator>,
    identity: Arc<dyn IdentityProvider>,
    plans: Arc<dyn PlanStore>,
    handoff: Arc<dyn HandoffStore>,
    navigator: Arc<dyn Navigator>,
}

impl SubmissionPipeline {
    pub fn new(
        generator: Arc<dyn RecommendationGenerator>,
        identity: Arc<dyn IdentityProvider>,
        plans: Arc<dyn PlanStore>,
        handoff: Arc<dyn HandoffStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            generator,
            identity,
            plans,
            handoff,
            navigator,
        }
    }

    pub fn handoff(&self) -> &Arc<dyn HandoffStore> {
        &self.handoff
    }

    /// Submit the questionnaire.
    ///
    /// 1. Fold "Other" choices into text.
    /// 2. Render the trip summary.
    /// 3. Generate recommendations (one call).
    /// 4. Resolve the signed-in user.
    /// 5. Hand everything to the plan store.
    /// 6. Update the hand-off store, then navigate to results.
    pub async fn run(&self, questions: &[Question]) -> SubmissionOutcome {
        let answers = normalize(questions);
        let mut summary = None;

        let outcome = match self.submit(&answers, &mut summary).await {
            Ok(plan) => {
                info!(plan_id = %plan.id, user_id = %plan.user_id, "Trip plan submitted");
                self.record_success(&plan).await;
                SubmissionOutcome::Saved(plan)
            }
            Err(e) => {
                error!(error = %e, "Trip submission failed");
                self.record_failure(&e, summary.as_deref()).await;
                SubmissionOutcome::Failed { error: e, summary }
            }
        };

        self.navigator.show_results().await;
        outcome
    }

    async fn submit(
        &self,
        answers: &[ResolvedAnswer],
        summary: &mut Option<String>,
    ) -> Result<SavedPlan, SubmitError> {
        let text = render_summary(answers)?;
        info!(chars = text.len(), "Trip summary rendered");
        *summary = Some(text.clone());

        let recommendations = self.generator.generate(&text).await?;
        info!(model = %recommendations.model, "Recommendations generated");

        let user_id = self
            .identity
            .current_user_id()
            .ok_or(SubmitError::Unauthenticated)?;

        Ok(self
            .plans
            .process(&user_id, answers, &text, &recommendations)
            .await?)
    }

    /// Point the results screen at the saved plan.
    async fn record_success(&self, plan: &SavedPlan) {
        if let Err(e) = self
            .handoff
            .set(handoff_keys::LAST_PLAN_ID, &plan.id.to_string())
            .await
        {
            warn!(error = %e, plan_id = %plan.id, "Failed to store last plan id");
        }
        if let Err(e) = self
            .handoff
            .set(handoff_keys::TRIP_SUMMARY, &plan.summary)
            .await
        {
            warn!(error = %e, plan_id = %plan.id, "Failed to store trip summary");
        }
    }

    /// Leave the error (and the summary, if any) for the results screen.
    async fn record_failure(&self, error: &SubmitError, summary: Option<&str>) {
        if let Err(e) = self
            .handoff
            .set(handoff_keys::TRIP_ERROR, error.user_message())
            .await
        {
            warn!(error = %e, "Failed to store trip error");
        }
        if let Some(summary) = summary
            && let Err(e) = self.handoff.set(handoff_keys::TRIP_SUMMARY, summary).await
        {
            warn!(error = %e, "Failed to store trip summary");
        }
        if let Err(e) = self.handoff.remove(handoff_keys::LAST_PLAN_ID).await {
            warn!(error = %e, "Failed to clear last plan id");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Stub collaborators shared by the pipeline and session tests.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::LlmError;
    use crate::llm::Recommendations;

    /// Generator that records every summary and replies from a script.
    pub struct StubGenerator {
        pub calls: Mutex<Vec<String>>,
        reply: Box<dyn Fn() -> Result<Recommendations, LlmError> + Send + Sync>,
    }

    impl StubGenerator {
        pub fn ok() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Box::new(|| {
                    Ok(Recommendations::new(
                        "stub",
                        serde_json::json!({"trails": ["Mesa Trail"]}),
                    ))
                }),
            }
        }

        pub fn failing(make: impl Fn() -> LlmError + Send + Sync + 'static) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Box::new(move || Err(make())),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RecommendationGenerator for StubGenerator {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, summary: &str) -> Result<Recommendations, LlmError> {
            self.calls.lock().unwrap().push(summary.to_string());
            (self.reply)()
        }
    }

    /// Counts navigations.
    #[derive(Default)]
    pub struct CountingNavigator {
        pub count: AtomicUsize,
    }

    impl CountingNavigator {
        pub fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Navigator for CountingNavigator {
        async fn show_results(&self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{CountingNavigator, StubGenerator};
    use super::*;
    use crate::error::{
        CAPACITY_FAILURE_MESSAGE, DatabaseError, FORMAT_FAILURE_MESSAGE, GENERIC_FAILURE_MESSAGE,
        LlmError,
    };
    use crate::identity::StaticIdentity;
    use crate::llm::Recommendations;
    use crate::questionnaire::catalog::default_questions;
    use crate::questionnaire::model::{Answer, LocationAnswer, QuestionId};
    use crate::store::{LibSqlBackend, MemoryHandoffStore};

    /// Plan store whose writes always fail.
    struct FailingPlanStore;

    #[async_trait]
    impl PlanStore for FailingPlanStore {
        async fn process(
            &self,
            _user_id: &str,
            _answers: &[ResolvedAnswer],
            _summary: &str,
            _recommendations: &Recommendations,
        ) -> Result<SavedPlan, DatabaseError> {
            Err(DatabaseError::Query("disk I/O error".into()))
        }

        async fn get_plan(&self, _id: uuid::Uuid) -> Result<Option<SavedPlan>, DatabaseError> {
            Ok(None)
        }
    }

    struct Harness {
        pipeline: SubmissionPipeline,
        generator: Arc<StubGenerator>,
        navigator: Arc<CountingNavigator>,
        db: Arc<LibSqlBackend>,
    }

    async fn harness(generator: StubGenerator, identity: StaticIdentity) -> Harness {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let generator = Arc::new(generator);
        let navigator = Arc::new(CountingNavigator::default());
        let pipeline = SubmissionPipeline::new(
            generator.clone(),
            Arc::new(identity),
            db.clone(),
            db.clone(),
            navigator.clone(),
        );
        Harness {
            pipeline,
            generator,
            navigator,
            db,
        }
    }

    fn questions_in_boulder() -> Vec<Question> {
        let mut questions = default_questions();
        questions[0].answer = Answer::Location(LocationAnswer {
            location: "Boulder, CO".into(),
            radius: 25,
        });
        questions
    }

    #[tokio::test]
    async fn success_saves_plan_and_navigates_once() {
        let h = harness(StubGenerator::ok(), StaticIdentity::signed_in("hiker-1")).await;

        let outcome = h.pipeline.run(&questions_in_boulder()).await;

        let SubmissionOutcome::Saved(plan) = outcome else {
            panic!("expected a saved plan");
        };
        assert_eq!(plan.user_id, "hiker-1");
        assert!(plan.summary.starts_with("I would like to go within 25 miles of Boulder, CO."));
        assert_eq!(h.generator.call_count(), 1);
        assert_eq!(h.navigator.count(), 1);
        assert_eq!(
            h.db.get(handoff_keys::LAST_PLAN_ID).await.unwrap(),
            Some(plan.id.to_string())
        );
        assert_eq!(
            h.db.get(handoff_keys::TRIP_SUMMARY).await.unwrap(),
            Some(plan.summary.clone())
        );
        assert_eq!(h.db.get(handoff_keys::TRIP_ERROR).await.unwrap(), None);
    }

    #[tokio::test]
    async fn success_hands_off_through_separate_store() {
        let plans = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let handoff = Arc::new(MemoryHandoffStore::new());
        let navigator = Arc::new(CountingNavigator::default());
        let pipeline = SubmissionPipeline::new(
            Arc::new(StubGenerator::ok()),
            Arc::new(StaticIdentity::signed_in("hiker-1")),
            plans.clone(),
            handoff.clone(),
            navigator.clone(),
        );

        let SubmissionOutcome::Saved(plan) = pipeline.run(&questions_in_boulder()).await else {
            panic!("expected a saved plan");
        };

        assert_eq!(
            handoff.get(handoff_keys::LAST_PLAN_ID).await.unwrap(),
            Some(plan.id.to_string())
        );
        assert_eq!(
            handoff.get(handoff_keys::TRIP_SUMMARY).await.unwrap(),
            Some(plan.summary.clone())
        );
        assert_eq!(handoff.get(handoff_keys::TRIP_ERROR).await.unwrap(), None);
        assert_eq!(plans.get(handoff_keys::LAST_PLAN_ID).await.unwrap(), None);
        assert!(plans.get_plan(plan.id).await.unwrap().is_some());
        assert_eq!(navigator.count(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_gets_generic_message() {
        let handoff = Arc::new(MemoryHandoffStore::new());
        handoff.set(handoff_keys::LAST_PLAN_ID, "stale").await.unwrap();
        let generator = Arc::new(StubGenerator::ok());
        let navigator = Arc::new(CountingNavigator::default());
        let pipeline = SubmissionPipeline::new(
            generator.clone(),
            Arc::new(StaticIdentity::signed_in("hiker-1")),
            Arc::new(FailingPlanStore),
            handoff.clone(),
            navigator.clone(),
        );

        let outcome = pipeline.run(&questions_in_boulder()).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed {
                error: SubmitError::Persistence(_),
                ..
            }
        ));
        assert_eq!(outcome.user_message(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(
            handoff.get(handoff_keys::TRIP_ERROR).await.unwrap().as_deref(),
            Some(GENERIC_FAILURE_MESSAGE)
        );
        assert!(
            handoff
                .get(handoff_keys::TRIP_SUMMARY)
                .await
                .unwrap()
                .is_some_and(|s| s.starts_with("I would like to go within 25 miles of Boulder, CO."))
        );
        assert_eq!(handoff.get(handoff_keys::LAST_PLAN_ID).await.unwrap(), None);
        assert_eq!(generator.call_count(), 1);
        assert_eq!(navigator.count(), 1);
    }

    #[tokio::test]
    async fn missing_identity_fails_after_generation() {
        let h = harness(StubGenerator::ok(), StaticIdentity::anonymous()).await;
        h.db.set(handoff_keys::LAST_PLAN_ID, "stale").await.unwrap();

        let outcome = h.pipeline.run(&questions_in_boulder()).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed {
                error: SubmitError::Unauthenticated,
                ..
            }
        ));
        assert_eq!(h.generator.call_count(), 1);
        assert_eq!(h.navigator.count(), 1);
        assert_eq!(
            h.db.get(handoff_keys::TRIP_ERROR).await.unwrap().as_deref(),
            Some(GENERIC_FAILURE_MESSAGE)
        );
        assert!(
            h.db.get(handoff_keys::TRIP_SUMMARY)
                .await
                .unwrap()
                .is_some_and(|s| s.contains("Boulder, CO"))
        );
        assert_eq!(h.db.get(handoff_keys::LAST_PLAN_ID).await.unwrap(), None);
    }

    #[tokio::test]
    async fn quota_error_gets_capacity_message() {
        let generator = StubGenerator::failing(|| LlmError::RateLimited {
            provider: "gemini".into(),
            retry_after: None,
        });
        let h = harness(generator, StaticIdentity::signed_in("hiker-1")).await;

        let outcome = h.pipeline.run(&default_questions()).await;

        assert_eq!(outcome.user_message(), Some(CAPACITY_FAILURE_MESSAGE));
        assert_eq!(
            h.db.get(handoff_keys::TRIP_ERROR).await.unwrap().as_deref(),
            Some(CAPACITY_FAILURE_MESSAGE)
        );
        assert_eq!(h.navigator.count(), 1);
    }

    #[tokio::test]
    async fn other_generation_errors_get_generic_message() {
        let generator = StubGenerator::failing(|| LlmError::RequestFailed {
            provider: "gemini".into(),
            reason: "HTTP 500: backend unavailable".into(),
        });
        let h = harness(generator, StaticIdentity::signed_in("hiker-1")).await;

        let outcome = h.pipeline.run(&default_questions()).await;

        assert_eq!(outcome.user_message(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(h.navigator.count(), 1);
    }

    #[tokio::test]
    async fn unrenderable_answers_skip_generation() {
        let h = harness(StubGenerator::ok(), StaticIdentity::signed_in("hiker-1")).await;
        let questions: Vec<Question> = default_questions()
            .into_iter()
            .filter(|q| q.id != QuestionId::Terrain)
            .collect();

        let outcome = h.pipeline.run(&questions).await;

        assert_eq!(outcome.user_message(), Some(FORMAT_FAILURE_MESSAGE));
        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed { summary: None, .. }
        ));
        assert_eq!(h.generator.call_count(), 0);
        assert_eq!(h.navigator.count(), 1);
        assert_eq!(h.db.get(handoff_keys::TRIP_SUMMARY).await.unwrap(), None);
    }
}
