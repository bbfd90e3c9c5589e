//! Action-diffing lifecycle orchestration.

pub mod orchestrator;
pub mod plan;

pub use orchestrator::{
    DispatchReport, DispatchedOperation, OrchestrateError, Orchestrator, PackageState,
};
pub use plan::{LifecycleOperation, UpdatePlan, plan_install, plan_uninstall, plan_update};
