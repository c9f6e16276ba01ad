//! Dry-run of a single move on the in-memory status bar.
//!
//! Useful for checking how the engine targets and verifies a drag without
//! touching the real status bar.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::types::CliZone;
use crate::cli::output;
use crate::config::VeilConfig;
use crate::error::VeilError;
use crate::menubar::{
    ControllerDeps, HidingState, HostedIcon, IconIdentity, MarkerKind, MemoryPinStore,
    MenuBarController, Zone,
};
use crate::platform::ManualClock;
use crate::platform::sim::{RecordingNotifier, ScriptedAuthenticator, SimulatedStatusBar};

/// Arguments for `veil simulate`.
#[derive(Args, Debug)]
#[command(after_long_help = r#"Examples:
  veil simulate --icon-x 700 --to hidden --hidden
  veil simulate --icon-x 450 --to always-hidden --ignore-drags 1 --json"#)]
pub struct SimulateArgs {
    /// Left edge of the icon.
    #[arg(long, default_value_t = 700.0)]
    pub icon_x: f64,

    /// Width of the icon.
    #[arg(long, default_value_t = 22.0)]
    pub width: f64,

    /// Zone to move the icon into.
    #[arg(long, value_enum)]
    pub to: CliZone,

    /// Start with hidden icons collapsed.
    #[arg(long)]
    pub hidden: bool,

    /// Number of drags that leave the icon in place.
    #[arg(long, default_value_t = 0)]
    pub ignore_drags: usize,

    /// Separator position.
    #[arg(long, default_value_t = 600.0)]
    pub separator: f64,

    /// Always-hidden separator position.
    #[arg(long, default_value_t = 300.0)]
    pub always_hidden: f64,

    /// Output in JSON format.
    #[arg(long, short)]
    pub json: bool,
}

/// What happened during a simulated move.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub success: bool,
    pub attempts: usize,
    pub start_zone: Option<Zone>,
    pub final_zone: Option<Zone>,
    pub final_x: Option<f64>,
    pub final_state: HidingState,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created or the markers cannot
/// be installed.
pub fn execute(args: &SimulateArgs) -> Result<(), VeilError> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    let outcome = runtime.block_on(simulate(args, crate::config::get_config().clone()))?;

    if args.json {
        output::print_highlighted_json(&serde_json::to_value(&outcome)?);
        return Ok(());
    }

    let status = if outcome.success { "moved".green() } else { "failed".red() };
    let label = |zone: Option<Zone>| zone.map_or_else(|| "unknown".to_string(), |z| z.to_string());
    println!("{status} after {} attempt(s)", outcome.attempts);
    println!("  zone:  {} -> {}", label(outcome.start_zone), label(outcome.final_zone));
    if let Some(x) = outcome.final_x {
        println!("  x:     {} -> {x}", args.icon_x);
    }
    println!("  state: {:?}", outcome.final_state);
    Ok(())
}

/// Runs one move against a fresh simulated bar configured with `config`.
///
/// # Errors
///
/// Returns an error if the markers cannot be installed or the initial hide
/// is rejected.
pub async fn simulate(
    args: &SimulateArgs,
    config: VeilConfig,
) -> Result<SimulationOutcome, VeilError> {
    let bar = Arc::new(SimulatedStatusBar::new());
    bar.place_marker(MarkerKind::Separator, args.separator);
    bar.place_marker(MarkerKind::AlwaysHiddenSeparator, args.always_hidden);
    bar.ignore_drags(args.ignore_drags);

    let controller = MenuBarController::new(
        ControllerDeps {
            shell: bar.clone(),
            accessibility: bar.clone(),
            pointer: bar.clone(),
            authenticator: Arc::new(ScriptedAuthenticator::answering(true)),
            notifier: Arc::new(RecordingNotifier::default()),
            clock: Arc::new(ManualClock::auto()),
            pin_store: Arc::new(MemoryPinStore::default()),
        },
        config,
    );
    controller.install()?;

    let icon = HostedIcon::new(IconIdentity::owner("com.example.simulated"), args.icon_x, args.width);
    bar.add_icon(icon.clone());
    let start_zone = controller.classify(&icon);

    if args.hidden {
        controller.hide().await?;
    }

    let success = controller.move_icon(icon.clone(), args.to.into()).await;
    let landed = bar.icon(&icon.identity);

    Ok(SimulationOutcome {
        success,
        attempts: bar.drags().len(),
        start_zone,
        final_zone: landed.as_ref().and_then(|icon| controller.classify(icon)),
        final_x: landed.map(|icon| icon.x),
        final_state: controller.state(),
    })
}
