//! Tackle - package action lifecycle manager
//!
//! Usage:
//!   tackle init                 # Write tackle.toml with a shared area
//!   tackle install <dir>        # Install the package found in <dir>
//!   tackle update <dir>         # Update an installed package from <dir>
//!   tackle uninstall <name>     # Uninstall an installed package
//!   tackle plan <dir>           # Show the action operations an install/update would run

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tackle_core::config::TackleConfig;
use tackle_core::context::AppContext;
use tackle_core::diagnostics::{CollectedDiagnostics, Diagnostic, Level};
use tackle_core::host::{
    InstalledPackage, InstalledRepository, LifecycleOutcome, PackageInstaller,
};
use tackle_core::orchestration::{LifecycleOperation, UpdatePlan, plan_install, plan_update};
use tackle_core::package::Package;
use tackle_core::parser::parse;

#[derive(Parser)]
#[command(name = "tackle")]
#[command(about = "Package action lifecycle manager", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a tackle.toml with default paths and a shared area
    Init {
        /// Overwrite an existing tackle.toml
        #[arg(long, short)]
        force: bool,
    },

    /// Install the package in a directory containing tackle.json
    Install {
        /// Package source directory
        dir: PathBuf,
    },

    /// Update an installed package from a new source directory
    Update {
        /// Package source directory
        dir: PathBuf,
    },

    /// Uninstall an installed package
    #[command(alias = "rm")]
    Uninstall {
        /// Package name, e.g. acme/blog
        name: String,
    },

    /// Show the action operations an install or update would dispatch
    Plan {
        /// Package source directory
        dir: PathBuf,
    },

    /// List installed packages
    List,

    /// List registered action kinds
    Kinds,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tackle=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let project = match cli.project {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("Failed to resolve project root: {}", dir.display()))?,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    run_cli(cli.command, project, cli.format)
}

fn run_cli(command: Commands, project: PathBuf, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Init { force } => run_init(&project, force, format),
        Commands::Install { dir } => run_install(&project, &dir, format),
        Commands::Update { dir } => run_update(&project, &dir, format),
        Commands::Uninstall { name } => run_uninstall(&project, &name, format),
        Commands::Plan { dir } => run_plan(&project, &dir, format),
        Commands::List => run_list(&project, format),
        Commands::Kinds => run_kinds(&project, format),
    }
}

fn run_init(project: &Path, force: bool, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::new(project.to_path_buf(), TackleConfig::initial());
    let store = ctx.config_store();
    if store.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            store.config_path().display()
        );
    }
    store.save(ctx.config())?;

    match format {
        OutputFormat::Table => println!("✓ Wrote {}", store.config_path().display()),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "config_path": store.config_path(),
                "config": ctx.config(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn run_install(project: &Path, dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(project.to_path_buf())?;
    let package = Package::from_dir(dir)?;
    let mut repo = ctx.repository();
    if repo.has(package.name())? {
        anyhow::bail!(
            "Package '{}' is already installed (use `tackle update` instead)",
            package.name()
        );
    }

    let diagnostics = Arc::new(CollectedDiagnostics::new());
    let installer = ctx.action_installer(diagnostics.clone());
    let result = installer.install(&mut repo, &package);
    print_diagnostics(&diagnostics.entries(), format);
    let outcome = result?;

    print_outcome("Installed", &package.identity().to_string(), &outcome, format)
}

fn run_update(project: &Path, dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(project.to_path_buf())?;
    let target = Package::from_dir(dir)?;
    let mut repo = ctx.repository();
    let initial = installed(&repo, target.name())?;

    let diagnostics = Arc::new(CollectedDiagnostics::new());
    let installer = ctx.action_installer(diagnostics.clone());
    let result = installer.update(&mut repo, &initial.package, &target);
    print_diagnostics(&diagnostics.entries(), format);
    let outcome = result?;

    let label = format!("{} -> {}", initial.package.identity(), target.identity().reference());
    print_outcome("Updated", &label, &outcome, format)
}

fn run_uninstall(project: &Path, name: &str, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(project.to_path_buf())?;
    let mut repo = ctx.repository();
    let record = installed(&repo, name)?;

    let diagnostics = Arc::new(CollectedDiagnostics::new());
    let installer = ctx.action_installer(diagnostics.clone());
    let result = installer.uninstall(&mut repo, &record.package);
    print_diagnostics(&diagnostics.entries(), format);
    let outcome = result?;

    print_outcome(
        "Uninstalled",
        &record.package.identity().to_string(),
        &outcome,
        format,
    )
}

fn run_plan(project: &Path, dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(project.to_path_buf())?;
    let target = Package::from_dir(dir)?;
    let target_actions = parse(&target.descriptor)?;

    let plan = match ctx.repository().find(target.name())? {
        Some(record) => {
            let initial_actions = parse(&record.package.descriptor)?;
            plan_update(&initial_actions, &target_actions)
        }
        None => UpdatePlan {
            install: plan_install(&target_actions),
            ..UpdatePlan::default()
        },
    };

    match format {
        OutputFormat::Table => print_plan_table(&target, &plan),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    }
    Ok(())
}

fn run_list(project: &Path, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(project.to_path_buf())?;
    let packages = ctx.repository().packages()?;

    match format {
        OutputFormat::Table => print_packages_table(&packages),
        OutputFormat::Json => {
            let output: Vec<_> = packages
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name(),
                        "version": p.package.descriptor.version,
                        "type": p.package.package_type(),
                        "install_path": p.install_path,
                        "installed_at": p.installed_at.to_rfc3339(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn run_kinds(project: &Path, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(project.to_path_buf())?;
    let installer = ctx.action_installer(Arc::new(CollectedDiagnostics::new()));
    let registry = installer.orchestrator().registry();
    match format {
        OutputFormat::Table => {
            for kind in registry.kinds() {
                println!("{kind}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&registry.kinds())?),
    }
    Ok(())
}

fn installed(repo: &dyn InstalledRepository, name: &str) -> Result<InstalledPackage> {
    repo.find(name)?
        .ok_or_else(|| anyhow::anyhow!("Package '{}' is not installed", name))
}

fn print_diagnostics(entries: &[Diagnostic], format: OutputFormat) {
    // JSON output stays parseable; diagnostics go to stderr there.
    for entry in entries {
        let line = match entry.level {
            Level::Info => format!("  {}", entry.message),
            Level::Warning => format!("  ⚠ {}", entry.message),
            Level::Error => format!("  ✗ {}", entry.message),
        };
        match format {
            OutputFormat::Table => println!("{line}"),
            OutputFormat::Json => eprintln!("{line}"),
        }
    }
}

fn print_outcome(
    verb: &str,
    label: &str,
    outcome: &LifecycleOutcome,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => match outcome {
            LifecycleOutcome::Applied(report) => {
                println!("✓ {verb} {label}");
                for op in &report.dispatched {
                    println!("  {:<10} {}", op.operation, op.kind);
                }
            }
            LifecycleOutcome::Skipped => {
                println!("✓ {verb} {label} (actions skipped)");
            }
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "package": label,
                "outcome": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_plan_table(target: &Package, plan: &UpdatePlan) {
    println!("Plan for {}", target.identity());
    if plan.is_empty() {
        println!("  (no actions)");
        return;
    }
    for op in plan.operations() {
        let detail = match op {
            LifecycleOperation::Update {
                old_config,
                new_config,
                ..
            } if old_config == new_config => "unchanged config",
            LifecycleOperation::Update { .. } => "config changed",
            _ => "",
        };
        println!("  {:<10} {:<12} {}", op.operation(), op.kind(), detail);
    }
}

fn print_packages_table(packages: &[InstalledPackage]) {
    if packages.is_empty() {
        println!("No packages installed.");
        return;
    }

    println!("{:<30} {:<12} {:<16} Installed", "Name", "Version", "Type");
    println!("{}", "-".repeat(80));
    for p in packages {
        println!(
            "{:<30} {:<12} {:<16} {}",
            p.name(),
            p.package.descriptor.version,
            p.package.package_type(),
            p.installed_at.format("%Y-%m-%d %H:%M")
        );
    }
}
