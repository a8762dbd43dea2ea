//! Sequential contract test suites.
//!
//! A [`Suite`] runs its cases one after another, in declaration order,
//! against one shared context (usually a session plus the contract clients).
//! Cases share on-chain state, so later cases see what earlier ones did.
//!
//! ```no_run
//! # use aleo_sandbox::runner::Suite;
//! # async fn demo() -> anyhow::Result<()> {
//! let report = Suite::new("token", 0u64)
//!     .case("adds", |_ctx| async { Ok(()) })
//!     .failing("rejects", |_ctx| async { Err(anyhow::anyhow!("rejected")) })
//!     .todo("transfer private")
//!     .run()
//!     .await?;
//! report.assert_passed();
//! # Ok(())
//! # }
//! ```

use crate::client::ProgramClient;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-case wall-clock limit unless overridden.
pub const DEFAULT_CASE_TIMEOUT: Duration = Duration::from_millis(200_000);

type CaseFn<C> = Box<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<()>> + Send + Sync>;
type SetupFn<C> = Box<dyn FnOnce(Arc<C>) -> BoxFuture<'static, Result<()>> + Send>;

/// What happens when `before_all` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupFailure {
    /// Log the error and exit the process with status 1.
    #[default]
    Exit,
    /// Return the error from [`Suite::run`].
    ReturnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Normal,
    /// Passes only when the body fails or panics.
    Failing,
    /// Placeholder; never run.
    Todo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    TimedOut,
    Todo,
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub kind: CaseKind,
    pub outcome: CaseOutcome,
    pub elapsed: Duration,
}

impl CaseReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Failed(_) | CaseOutcome::TimedOut)
    }
}

#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite: String,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Passed))
    }

    pub fn todo(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Todo))
    }

    pub fn failures(&self) -> Vec<&CaseReport> {
        self.cases.iter().filter(|c| c.is_failure()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// `Err` listing every failed case.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(anyhow!("{}", self))
        }
    }

    /// Panic with the report if any case failed.
    pub fn assert_passed(&self) {
        if !self.is_success() {
            panic!("{}", self);
        }
    }

    fn count(&self, f: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.cases.iter().filter(|c| f(&c.outcome)).count()
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} passed, {} failed, {} todo",
            self.suite,
            self.passed(),
            self.failures().len(),
            self.todo()
        )?;
        for case in &self.cases {
            let status = match &case.outcome {
                CaseOutcome::Passed => "ok".to_string(),
                CaseOutcome::Todo => "todo".to_string(),
                CaseOutcome::TimedOut => "TIMED OUT".to_string(),
                CaseOutcome::Failed(reason) => format!("FAILED: {}", reason),
            };
            writeln!(f, "  {} ... {} ({} ms)", case.name, status, case.elapsed.as_millis())?;
        }
        Ok(())
    }
}

struct Case<C> {
    name: String,
    kind: CaseKind,
    body: Option<CaseFn<C>>,
}

pub struct Suite<C> {
    name: String,
    context: Arc<C>,
    setup: Option<SetupFn<C>>,
    on_setup_failure: SetupFailure,
    timeout: Duration,
    cases: Vec<Case<C>>,
}

impl<C: Send + Sync + 'static> Suite<C> {
    pub fn new(name: impl Into<String>, context: C) -> Self {
        Self {
            name: name.into(),
            context: Arc::new(context),
            setup: None,
            on_setup_failure: SetupFailure::default(),
            timeout: DEFAULT_CASE_TIMEOUT,
            cases: Vec::new(),
        }
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// Per-case timeout; also bounds `before_all`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn on_setup_failure(mut self, policy: SetupFailure) -> Self {
        self.on_setup_failure = policy;
        self
    }

    /// Runs once before the first case. Not retried.
    pub fn before_all<F, Fut>(mut self, setup: F) -> Self
    where
        F: FnOnce(Arc<C>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.setup = Some(Box::new(move |ctx| setup(ctx).boxed()));
        self
    }

    pub fn case<F, Fut>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.push(name, CaseKind::Normal, body)
    }

    /// A case that is expected to fail, e.g. a call the contract must reject.
    pub fn failing<F, Fut>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.push(name, CaseKind::Failing, body)
    }

    pub fn todo(mut self, name: impl Into<String>) -> Self {
        self.cases.push(Case {
            name: name.into(),
            kind: CaseKind::Todo,
            body: None,
        });
        self
    }

    fn push<F, Fut>(mut self, name: impl Into<String>, kind: CaseKind, body: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.cases.push(Case {
            name: name.into(),
            kind,
            body: Some(Box::new(move |ctx| body(ctx).boxed())),
        });
        self
    }

    /// Run setup, then every case in order.
    pub async fn run(self) -> Result<SuiteReport> {
        let Suite {
            name,
            context,
            setup,
            on_setup_failure,
            timeout,
            cases,
        } = self;

        if let Some(setup) = setup {
            if let Err(err) = run_guarded(setup(Arc::clone(&context)), timeout).await {
                let err = anyhow!("{}: before_all failed: {}", name, err.describe());
                match on_setup_failure {
                    SetupFailure::Exit => {
                        tracing::error!(suite = %name, "{:#}", err);
                        std::process::exit(1);
                    }
                    SetupFailure::ReturnError => return Err(err),
                }
            }
        }

        let mut reports = Vec::with_capacity(cases.len());
        for case in cases {
            let started = Instant::now();
            let outcome = match (&case.kind, &case.body) {
                (CaseKind::Todo, _) | (_, None) => CaseOutcome::Todo,
                (CaseKind::Normal, Some(body)) => {
                    match run_guarded(body(Arc::clone(&context)), timeout).await {
                        Ok(()) => CaseOutcome::Passed,
                        Err(CaseError::TimedOut) => CaseOutcome::TimedOut,
                        Err(err) => CaseOutcome::Failed(err.describe()),
                    }
                }
                (CaseKind::Failing, Some(body)) => {
                    match run_guarded(body(Arc::clone(&context)), timeout).await {
                        Ok(()) => CaseOutcome::Failed("expected failure, but the case passed".to_string()),
                        Err(CaseError::TimedOut) => CaseOutcome::TimedOut,
                        Err(err) => {
                            tracing::debug!(case = %case.name, reason = %err.describe(), "failed as expected");
                            CaseOutcome::Passed
                        }
                    }
                }
            };
            let elapsed = started.elapsed();
            match &outcome {
                CaseOutcome::Passed => tracing::info!(suite = %name, case = %case.name, ms = elapsed.as_millis() as u64, "ok"),
                CaseOutcome::Todo => tracing::info!(suite = %name, case = %case.name, "todo"),
                CaseOutcome::TimedOut => tracing::error!(suite = %name, case = %case.name, "timed out"),
                CaseOutcome::Failed(reason) => tracing::error!(suite = %name, case = %case.name, %reason, "failed"),
            }
            reports.push(CaseReport {
                name: case.name,
                kind: case.kind,
                outcome,
                elapsed,
            });
        }

        Ok(SuiteReport {
            suite: name,
            cases: reports,
        })
    }
}

enum CaseError {
    Error(anyhow::Error),
    Panic(String),
    TimedOut,
}

impl CaseError {
    fn describe(&self) -> String {
        match self {
            CaseError::Error(err) => format!("{:#}", err),
            CaseError::Panic(message) => format!("panicked: {}", message),
            CaseError::TimedOut => "timed out".to_string(),
        }
    }
}

async fn run_guarded(body: BoxFuture<'static, Result<()>>, timeout: Duration) -> Result<(), CaseError> {
    match tokio::time::timeout(timeout, AssertUnwindSafe(body).catch_unwind()).await {
        Err(_) => Err(CaseError::TimedOut),
        Ok(Err(payload)) => Err(CaseError::Panic(panic_message(payload.as_ref()))),
        Ok(Ok(Err(err))) => Err(CaseError::Error(err)),
        Ok(Ok(Ok(()))) => Ok(()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Deploy every program in `clients` that is not deployed yet, in order,
/// waiting for each deployment before the next. Imports must come first.
pub async fn ensure_deployed(clients: &[&ProgramClient]) -> Result<()> {
    for client in clients {
        if client.is_deployed().await? {
            tracing::debug!(program = %client.program(), "already deployed");
            continue;
        }
        client.deploy().await?.wait().await?;
        tracing::info!(program = %client.program(), "deployed");
    }
    Ok(())
}
