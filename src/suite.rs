//! Drives the registry and the bad-argument tables against one backend and
//! collects a named outcome per case.

use std::fmt;

use itertools::Itertools;

use crate::backend::SparseBackend;
use crate::bad_arg;
use crate::config::HarnessConfig;
use crate::registry::{self, OperationDescriptor, OperationKind};
use crate::runner::{self, RunOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    Skipped,
}

impl Verdict {
    fn tag(self) -> &'static str {
        match self {
            Verdict::Passed => "PASS",
            Verdict::Failed => "FAIL",
            Verdict::Skipped => "SKIP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: String,
    pub verdict: Verdict,
    pub detail: Option<String>,
}

impl CaseOutcome {
    fn passed(name: String) -> Self {
        Self {
            name,
            verdict: Verdict::Passed,
            detail: None,
        }
    }

    fn failed(name: String, detail: String) -> Self {
        Self {
            name,
            verdict: Verdict::Failed,
            detail: Some(detail),
        }
    }

    fn skipped(name: String, detail: String) -> Self {
        Self {
            name,
            verdict: Verdict::Skipped,
            detail: Some(detail),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub backend: String,
    pub outcomes: Vec<CaseOutcome>,
}

impl Report {
    pub fn count(&self, verdict: Verdict) -> usize {
        self.outcomes.iter().filter(|o| o.verdict == verdict).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|o| o.verdict == Verdict::Failed)
    }

    pub fn outcome(&self, name: &str) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn is_success(&self) -> bool {
        self.count(Verdict::Failed) == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            write!(f, "[{}] {}", outcome.verdict.tag(), outcome.name)?;
            if let Some(detail) = &outcome.detail {
                write!(f, ": {}", detail)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{}: {} passed, {} failed, {} skipped",
            self.backend,
            self.count(Verdict::Passed),
            self.count(Verdict::Failed),
            self.count(Verdict::Skipped)
        )
    }
}

/// Runs one registered descriptor `config.repeat` times. Every repetition has
/// to return `Success`.
pub fn run_valid<B: SparseBackend>(
    backend: &B,
    desc: &OperationDescriptor,
    config: &HarnessConfig,
) -> CaseOutcome {
    let name = format!("{}/{}", desc.kind().name(), desc.name());
    if !backend.supports(desc) {
        log::warn!("{}: skipping {}", backend.name(), name);
        return CaseOutcome::skipped(name, format!("not supported by {}", backend.name()));
    }

    let opts = RunOptions::from(config);
    let mut statuses = Vec::with_capacity(config.repeat as usize);
    for _ in 0..config.repeat.max(1) {
        match runner::run_descriptor(backend, desc, &opts) {
            Ok(status) => statuses.push(status),
            Err(err) => return CaseOutcome::failed(name, err.to_string()),
        }
    }

    if !statuses.iter().all_equal() {
        return CaseOutcome::failed(
            name,
            format!("status changed between calls: {}", statuses.iter().join(", ")),
        );
    }
    match statuses.first() {
        Some(status) if status.is_success() => CaseOutcome::passed(name),
        Some(status) => CaseOutcome::failed(name, format!("returned {}", status)),
        None => CaseOutcome::failed(name, "no call was made".to_string()),
    }
}

/// Runs the bad-argument table of `op` against its target instantiation.
pub fn run_bad_args<B: SparseBackend>(
    backend: &B,
    op: OperationKind,
    config: &HarnessConfig,
) -> Vec<CaseOutcome> {
    let target = op.bad_arg_target();
    let prefix = format!("{}_bad_arg/{}", op.name(), target.name());
    if !backend.supports(&target) {
        log::warn!("{}: skipping {}", backend.name(), prefix);
        return vec![CaseOutcome::skipped(
            prefix,
            format!("not supported by {}", backend.name()),
        )];
    }

    bad_arg::validate(backend, op, config.seed)
        .into_iter()
        .map(|outcome| {
            let name = format!("{}/{}", prefix, outcome.case.name());
            match outcome.diagnostic() {
                None => CaseOutcome::passed(name),
                Some(detail) => CaseOutcome::failed(name, detail),
            }
        })
        .collect()
}

pub fn run_suite<B: SparseBackend>(backend: &B, config: &HarnessConfig) -> Report {
    log::info!("{}: running conformance suite", backend.name());
    let mut outcomes: Vec<CaseOutcome> = registry::registered()
        .iter()
        .map(|desc| run_valid(backend, desc, config))
        .collect();
    for op in OperationKind::ALL {
        outcomes.extend(run_bad_args(backend, op, config));
    }

    for outcome in outcomes.iter().filter(|o| o.verdict == Verdict::Failed) {
        log::error!(
            "{}: {} failed: {}",
            backend.name(),
            outcome.name,
            outcome.detail.as_deref().unwrap_or("")
        );
    }
    let report = Report {
        backend: backend.name().to_string(),
        outcomes,
    };
    log::info!(
        "{}: {} passed, {} failed, {} skipped",
        report.backend,
        report.count(Verdict::Passed),
        report.count(Verdict::Failed),
        report.count(Verdict::Skipped)
    );
    report
}
