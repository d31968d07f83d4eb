//! `Workflow`: the chainable builder that owns a plan, its shared store and
//! the run state.
//!
//! Step-adding calls append to the plan. Handler calls (`on_success`,
//! `on_fail`) attach to whichever step is last at call time; with an empty
//! plan they log a warning and do nothing.

use serde_json::Value;
use stepwise_types::config::WorkflowConfig;
use tokio_util::sync::CancellationToken;

use crate::executor::BoxExecutor;

use super::error::WorkflowError;
use super::plan::{ExecutionPlan, ExecutionStep, IterateSource, StepPayload};
use super::runner::{PlanRunner, RunOutcome, RunState};
use super::store::SharedStore;

/// A workflow instance: plan, shared store, prompt state and bookkeeping.
///
/// A workflow may be run many times. The prompt, store and dispatcher persist
/// across runs.
#[derive(Debug)]
pub struct Workflow {
    config: WorkflowConfig,
    state: RunState,
    plan: ExecutionPlan,
    store: SharedStore,
    agents: Vec<BoxExecutor>,
    dispatcher: Option<BoxExecutor>,
}

impl Workflow {
    pub fn new(config: WorkflowConfig) -> Self {
        let state = RunState::new(config.prompt.clone());
        Self {
            config,
            state,
            plan: ExecutionPlan::new(),
            store: SharedStore::new(),
            agents: Vec::new(),
            dispatcher: None,
        }
    }

    // ---- Plan construction ----

    /// Append a step with an explicit description.
    pub fn add_step(&mut self, payload: StepPayload, description: impl Into<String>) -> &mut Self {
        let step = ExecutionStep::new(payload, description);
        tracing::trace!(
            workflow = %self.config.name,
            index = self.plan.len() + 1,
            kind = %step.kind(),
            "step added"
        );
        self.plan.push(step);
        self
    }

    fn add_described(&mut self, payload: StepPayload) -> &mut Self {
        let description = payload.describe();
        self.add_step(payload, description)
    }

    /// Replace the current prompt when the step runs; the prompt text becomes
    /// the step output.
    pub fn prompt(&mut self, text: impl Into<String>) -> &mut Self {
        self.add_described(StepPayload::Prompt(text.into()))
    }

    pub fn sequence(&mut self, executors: Vec<BoxExecutor>) -> &mut Self {
        self.add_described(StepPayload::Sequence(executors))
    }

    pub fn parallel(&mut self, executors: Vec<BoxExecutor>) -> &mut Self {
        self.add_described(StepPayload::Parallel(executors))
    }

    /// Fan `agent` out over literal items or the array stored under a key.
    ///
    /// A `&str`/`String` source is a shared store key, resolved when the step
    /// runs, not when it is added.
    pub fn iterate(&mut self, items: impl Into<IterateSource>, agent: BoxExecutor) -> &mut Self {
        self.add_described(StepPayload::Iterate {
            items: items.into(),
            agent,
        })
    }

    /// Attach a success handler to the last step. Overwrites an earlier one.
    pub fn on_success(&mut self, handler: BoxExecutor) -> &mut Self {
        match self.plan.last_mut() {
            Some(step) => step.on_success = Some(handler),
            None => tracing::warn!(
                workflow = %self.config.name,
                handler = handler.name(),
                "on_success called with no preceding step, handler dropped"
            ),
        }
        self
    }

    /// Attach a failure handler to the last step. Overwrites an earlier one.
    pub fn on_fail(&mut self, handler: BoxExecutor) -> &mut Self {
        match self.plan.last_mut() {
            Some(step) => step.on_fail = Some(handler),
            None => tracing::warn!(
                workflow = %self.config.name,
                handler = handler.name(),
                "on_fail called with no preceding step, handler dropped"
            ),
        }
        self
    }

    /// Seed (or overwrite) a shared store entry.
    pub fn shared_store(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.store.set(key, value);
        self
    }

    // ---- Bookkeeping ----

    /// Record an agent. Not consulted when running.
    pub fn register_agent(&mut self, agent: BoxExecutor) -> &mut Self {
        self.agents.push(agent);
        self
    }

    /// Record the dispatcher. Not consulted when running.
    pub fn dispatcher(&mut self, dispatcher: BoxExecutor) -> &mut Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn agents(&self) -> &[BoxExecutor] {
        &self.agents
    }

    pub fn dispatcher_ref(&self) -> Option<&BoxExecutor> {
        self.dispatcher.as_ref()
    }

    // ---- Accessors ----

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.state.prompt.as_deref()
    }

    /// Handle to the shared store. Clones share entries, so executors can
    /// capture it before the workflow runs.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    // ---- Running ----

    /// Run the plan once.
    pub async fn run(&mut self) -> Result<RunOutcome, WorkflowError> {
        self.run_with_cancel(&CancellationToken::new()).await
    }

    /// Run the plan once, stopping early if `cancel` fires.
    pub async fn run_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, WorkflowError> {
        let runner = PlanRunner::new(&self.config.name, &self.plan, &self.store);
        runner.run(&mut self.state, cancel).await
    }

    /// Log the plan, prompt and store keys at info level. Runs nothing.
    pub fn debug(&mut self) -> &mut Self {
        tracing::info!(
            workflow = %self.config.name,
            prompt = ?self.state.prompt,
            steps = self.plan.len(),
            store_keys = ?self.store.keys(),
            agents = self.agents.len(),
            dispatcher = self.dispatcher.as_ref().map(BoxExecutor::name),
            "workflow state"
        );
        tracing::info!(workflow = %self.config.name, "plan:\n{}", self.plan);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::executor_fn;
    use serde_json::json;
    use stepwise_types::error::ExecutorError;
    use stepwise_types::step::StepKind;

    fn echo(name: &str) -> BoxExecutor {
        executor_fn(name, |input: Value| async move { Ok::<_, ExecutorError>(input) })
    }

    fn constant(name: &str, value: &'static str) -> BoxExecutor {
        executor_fn(name, move |_input: Value| async move { Ok::<_, ExecutorError>(json!(value)) })
    }

    fn boom() -> BoxExecutor {
        executor_fn("boom", |_input: Value| async move {
            Err::<Value, _>(ExecutorError::failed("boom"))
        })
    }

    fn workflow() -> Workflow {
        Workflow::new(WorkflowConfig::new("test"))
    }

    #[test]
    fn test_new_takes_prompt_from_config() {
        let wf = Workflow::new(WorkflowConfig::new("named").with_prompt("start"));
        assert_eq!(wf.name(), "named");
        assert_eq!(wf.current_prompt(), Some("start"));
        assert!(wf.plan().is_empty());
        assert!(wf.store().is_empty());
    }

    #[test]
    fn test_builder_appends_steps_in_call_order() {
        let mut wf = workflow();
        wf.prompt("p")
            .sequence(vec![echo("a")])
            .parallel(vec![echo("b")])
            .iterate("xs", echo("c"));

        let kinds: Vec<StepKind> = wf.plan().steps().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Prompt, StepKind::Sequence, StepKind::Parallel, StepKind::Iterate]
        );
        assert_eq!(wf.plan().steps()[1].description, "sequence: a");
    }

    #[test]
    fn test_add_step_keeps_description() {
        let mut wf = workflow();
        wf.add_step(StepPayload::Sequence(vec![echo("a")]), "custom");
        assert_eq!(wf.plan().steps()[0].description, "custom");
    }

    #[test]
    fn test_handler_on_empty_plan_is_noop() {
        let mut wf = workflow();
        wf.on_success(echo("s")).on_fail(echo("f"));
        assert!(wf.plan().is_empty());
    }

    #[test]
    fn test_handlers_attach_to_last_step_and_overwrite() {
        let first = echo("first");
        let second = echo("second");
        let mut wf = workflow();
        wf.sequence(vec![echo("a")])
            .sequence(vec![echo("b")])
            .on_success(first)
            .on_success(second.clone());

        let steps = wf.plan().steps();
        assert!(steps[0].on_success.is_none());
        let attached = steps[1].on_success.as_ref().unwrap();
        assert!(attached.ptr_eq(&second));
    }

    #[test]
    fn test_bookkeeping_is_recorded() {
        let agent = echo("agent");
        let dispatcher = echo("dispatcher");
        let mut wf = workflow();
        wf.register_agent(agent.clone()).dispatcher(dispatcher.clone());

        assert_eq!(wf.agents().len(), 1);
        assert!(wf.agents()[0].ptr_eq(&agent));
        assert!(wf.dispatcher_ref().unwrap().ptr_eq(&dispatcher));
    }

    #[tokio::test]
    async fn test_empty_plan_run() {
        let outcome = workflow().run().await.unwrap();
        assert_eq!(outcome.final_output, None);
        assert!(outcome.shared_store.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_matches_seeded_store_last_write_wins() {
        let mut wf = workflow();
        wf.shared_store("a", 1)
            .shared_store("b", "two")
            .shared_store("a", 3)
            .sequence(vec![echo("e")]);

        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.shared_store.len(), 2);
        assert_eq!(outcome.shared_store.get("a"), Some(&json!(3)));
        assert_eq!(outcome.shared_store.get("b"), Some(&json!("two")));
    }

    #[tokio::test]
    async fn test_iterate_over_store_key() {
        let mut wf = workflow();
        wf.shared_store("xs", json!([1, 2, 3])).iterate("xs", echo("echo"));
        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_iterate_over_non_array_rejects_naming_key() {
        let mut wf = workflow();
        wf.shared_store("xs", "not-an-array").iterate("xs", echo("echo"));
        let err = wf.run().await.unwrap_err();
        assert!(err.to_string().contains("xs"));
    }

    #[tokio::test]
    async fn test_on_fail_absorbs_boom() {
        let mut wf = workflow();
        wf.sequence(vec![boom()]).on_fail(constant("h", "handled"));
        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!("handled")));
    }

    #[tokio::test]
    async fn test_failure_without_handler_rejects_with_boom() {
        let mut wf = workflow();
        wf.sequence(vec![boom()]);
        let err = wf.run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_prompt_on_success_override() {
        let mut wf = workflow();
        wf.prompt("X")
            .on_success(constant("h", "Y"))
            .sequence(vec![echo("next")]);
        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!("Y")));
        assert_eq!(wf.current_prompt(), Some("X"));
    }

    #[tokio::test]
    async fn test_state_persists_across_runs() {
        let mut wf = workflow();
        let handle = wf.store().clone();
        let counter = executor_fn("count", move |_input: Value| {
            let store = handle.clone();
            async move {
                let n = store.get("runs").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
                store.set("runs", n);
                Ok::<_, ExecutorError>(json!(n))
            }
        });
        wf.sequence(vec![counter]);

        wf.run().await.unwrap();
        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!(2)));
        assert_eq!(outcome.shared_store.get("runs"), Some(&json!(2)));
    }

    #[test]
    fn test_debug_returns_self_without_running() {
        let mut wf = workflow();
        wf.sequence(vec![boom()]).debug().shared_store("k", "v");
        assert_eq!(wf.plan().len(), 1);
        assert!(wf.store().contains_key("k"));
    }
}
