//! Drives action dispatch for install, update and uninstall events.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use super::plan::{LifecycleOperation, plan_install, plan_uninstall, plan_update};
use crate::action::{
    ActionEnvironment, ActionExecutionError, ActionMap, ActionRegistry, Operation,
    UnresolvedActionKind,
};
use crate::types::{ActionKind, PackageIdentity, UpdateDirection};

/// One side of a lifecycle event: who the package is, where it lives, and
/// what it declares.
#[derive(Debug, Clone, Copy)]
pub struct PackageState<'a> {
    pub identity: &'a PackageIdentity,
    pub path: &'a Path,
    pub actions: &'a ActionMap,
}

#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error(transparent)]
    Unresolved(#[from] UnresolvedActionKind),

    #[error(transparent)]
    Execution(#[from] ActionExecutionError),
}

impl OrchestrateError {
    /// The action kind the orchestration stopped at.
    pub fn kind(&self) -> &ActionKind {
        match self {
            OrchestrateError::Unresolved(err) => &err.kind,
            OrchestrateError::Execution(err) => &err.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchedOperation {
    pub kind: ActionKind,
    pub operation: Operation,
    pub package: String,
}

/// Operations that ran to completion, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub dispatched: Vec<DispatchedOperation>,
}

impl DispatchReport {
    pub fn count(&self, operation: Operation) -> usize {
        self.dispatched
            .iter()
            .filter(|d| d.operation == operation)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatched.is_empty()
    }
}

/// Computes operation sets and dispatches them through the registry.
///
/// There is no rollback: when an action fails, operations that already ran
/// stay applied and the remaining ones are not attempted.
#[derive(Debug, Default)]
pub struct Orchestrator {
    registry: ActionRegistry,
}

impl Orchestrator {
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Install every declared action of `package` in declaration order.
    pub fn install(
        &self,
        env: &ActionEnvironment,
        package: PackageState<'_>,
    ) -> Result<DispatchReport, OrchestrateError> {
        let ops = plan_install(package.actions);
        tracing::info!(package = %package.identity, install = ops.len(), "installing actions");

        let mut report = DispatchReport::default();
        for op in &ops {
            self.dispatch(env, op, package.identity, package.path, &mut report)?;
        }
        Ok(report)
    }

    /// Uninstall every declared action of `package` in declaration order.
    pub fn uninstall(
        &self,
        env: &ActionEnvironment,
        package: PackageState<'_>,
    ) -> Result<DispatchReport, OrchestrateError> {
        let ops = plan_uninstall(package.actions);
        tracing::info!(package = %package.identity, uninstall = ops.len(), "uninstalling actions");

        let mut report = DispatchReport::default();
        for op in &ops {
            self.dispatch(env, op, package.identity, package.path, &mut report)?;
        }
        Ok(report)
    }

    /// Move a package's side effects from `initial` to `target`.
    ///
    /// Removed kinds are uninstalled against the initial package; new kinds
    /// are installed and shared kinds updated against the target package.
    pub fn update(
        &self,
        env: &ActionEnvironment,
        initial: PackageState<'_>,
        target: PackageState<'_>,
    ) -> Result<DispatchReport, OrchestrateError> {
        let plan = plan_update(initial.actions, target.actions);
        let direction =
            UpdateDirection::between(initial.identity.reference(), target.identity.reference());
        tracing::info!(
            from = %initial.identity,
            to = %target.identity,
            direction = direction.as_str(),
            uninstall = plan.uninstall.len(),
            install = plan.install.len(),
            update = plan.update.len(),
            "updating actions"
        );

        let mut report = DispatchReport::default();
        for op in &plan.uninstall {
            self.dispatch(env, op, initial.identity, initial.path, &mut report)?;
        }
        for op in &plan.install {
            self.dispatch(env, op, target.identity, target.path, &mut report)?;
        }
        for op in &plan.update {
            self.dispatch(env, op, target.identity, target.path, &mut report)?;
        }
        Ok(report)
    }

    fn dispatch(
        &self,
        env: &ActionEnvironment,
        op: &LifecycleOperation,
        identity: &PackageIdentity,
        path: &Path,
        report: &mut DispatchReport,
    ) -> Result<(), OrchestrateError> {
        let kind = op.kind();
        let operation = op.operation();
        let action = self.registry.resolve(kind, env.context_for(path))?;
        tracing::debug!(%kind, %operation, package = %identity, "dispatching action");

        let result = match op {
            LifecycleOperation::Install { config, .. } => action.install(identity, config),
            LifecycleOperation::Update {
                old_config,
                new_config,
                ..
            } => action.update(identity, old_config, new_config),
            LifecycleOperation::Uninstall { config, .. } => action.uninstall(identity, config),
        };

        result.map_err(|source| ActionExecutionError {
            kind: kind.clone(),
            operation,
            package: identity.name().to_string(),
            source,
        })?;

        report.dispatched.push(DispatchedOperation {
            kind: kind.clone(),
            operation,
            package: identity.name().to_string(),
        });
        Ok(())
    }
}
