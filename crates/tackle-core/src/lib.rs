//! Tackle Core Library
//!
//! Lifecycle orchestration for package-declared post-install actions: a
//! package lists the actions it needs under `extra.actions`, and on install,
//! update and uninstall the orchestrator diffs the declared action sets and
//! dispatches the matching operations.

pub mod action;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod fs;
pub mod host;
pub mod installer;
pub mod orchestration;
pub mod package;
pub mod parser;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Actions
    pub use crate::action::{
        Action, ActionContext, ActionEnvironment, ActionExecutionError, ActionMap,
        ActionRegistry, Operation, UnresolvedActionKind,
    };

    // Configuration
    pub use crate::config::{ConfigStore, SharedConfig, TackleConfig};
    pub use crate::context::AppContext;

    // Diagnostics
    pub use crate::diagnostics::{CollectedDiagnostics, Diagnostics, Level, TracingDiagnostics};

    // Host
    pub use crate::host::{
        ActionInstaller, FileRepository, HostContext, InstalledPackage, InstalledRepository,
        LifecycleError, LifecycleOutcome, MemoryRepository, PackageInstaller,
    };
    pub use crate::installer::ConfigInstaller;

    // Orchestration
    pub use crate::orchestration::{
        DispatchReport, OrchestrateError, Orchestrator, PackageState, UpdatePlan,
    };

    // Packages
    pub use crate::package::{Package, PackageDescriptor};
    pub use crate::parser::{ParseError, parse};
    pub use crate::types::{ActionConfig, ActionKind, PackageIdentity, PackageReference};
}
