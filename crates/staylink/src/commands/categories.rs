//! Category activation handlers.
//!
//! Every invocation restores the provider's persisted snapshot, refreshes
//! it from the backend when reachable, runs the command, and writes the
//! snapshot back. Offline changes are replayed on the next refresh that
//! reaches the backend, or on demand with `categories sync`.

use std::fmt::Write;
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use staylink_core::{
    ActivationOrigin, ActivationOutcome, ActivationSnapshot, Capability, CategoryManager,
    CategoryScope, CoreError, FailureKind, Marketplace, Notice, NoticeLevel, ReconcileReport,
};

use crate::cli::{CategoriesArgs, CategoriesCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryState {
    key: String,
    name: String,
    scope: CategoryScope,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<ActivationOrigin>,
    pending_removal: bool,
    coming_soon: bool,
}

#[derive(Tabled)]
struct CategoryStateRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Sync")]
    sync: String,
}

impl From<&CategoryState> for CategoryStateRow {
    fn from(s: &CategoryState) -> Self {
        let sync = if s.coming_soon {
            "coming soon"
        } else if s.pending_removal {
            "removal pending"
        } else if s.origin == Some(ActivationOrigin::LocalPending) {
            "local only"
        } else {
            ""
        };
        Self {
            key: s.key.clone(),
            name: s.name.clone(),
            active: util::yes_no(s.active).into(),
            sync: sync.into(),
        }
    }
}

fn states(manager: &CategoryManager) -> Vec<CategoryState> {
    let snapshot = manager.snapshot();
    manager
        .catalog()
        .iter()
        .map(|c| CategoryState {
            key: c.key.clone(),
            name: c.name.clone(),
            scope: c.scope,
            active: manager.is_active(&c.key),
            origin: manager.origin(&c.key),
            pending_removal: snapshot.pending_removals.contains(&c.key),
            coming_soon: c.coming_soon,
        })
        .collect()
}

fn pending_detail(snapshot: &ActivationSnapshot) -> String {
    if !snapshot.has_pending_changes() {
        return "No local changes waiting for the backend".into();
    }
    let mut lines = Vec::new();
    for entry in &snapshot.active {
        if entry.origin == ActivationOrigin::LocalPending {
            lines.push(format!("+ {} (activated offline)", entry.key));
        }
    }
    for key in &snapshot.pending_removals {
        lines.push(format!("- {key} (deactivated offline)"));
    }
    lines.join("\n")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeView {
    key: String,
    status: &'static str,
    message: String,
    active: bool,
}

impl OutcomeView {
    fn new(outcome: &ActivationOutcome, manager: &CategoryManager) -> Self {
        Self {
            key: outcome.key().to_owned(),
            status: match outcome {
                ActivationOutcome::Confirmed { .. } => "confirmed",
                ActivationOutcome::Offline { .. } => "offline",
                ActivationOutcome::Busy { .. } => "busy",
            },
            message: outcome.message(),
            active: manager.is_active(outcome.key()),
        }
    }
}

fn report_detail(report: &ReconcileReport) -> String {
    output::detail_lines(&[
        ("Synced", join_or_dash(&report.synced)),
        ("Reverted", join_or_dash(&report.reverted)),
        ("Still pending", join_or_dash(&report.still_pending)),
    ])
}

fn join_or_dash(keys: &[String]) -> String {
    if keys.is_empty() {
        "-".into()
    } else {
        keys.join(", ")
    }
}

// ── Session plumbing ────────────────────────────────────────────────

fn manager_for(
    marketplace: &Marketplace,
    provider: Option<&str>,
) -> Result<Arc<CategoryManager>, CliError> {
    match provider {
        Some(id) => {
            marketplace.session().require(Capability::ManageCategories)?;
            Ok(marketplace.activations_for(id))
        }
        None => Ok(marketplace.my_categories()?),
    }
}

/// Pull the backend's state on top of the restored snapshot. An
/// unreachable backend leaves the command running on local state.
async fn refresh(
    manager: &CategoryManager,
    replay_pending: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let pb = util::spinner("Loading categories...", global);
    let loaded = manager.load().await;
    pb.finish_and_clear();

    match loaded {
        Ok(message) => {
            if let Some(message) = message {
                output::notify(&Notice::new(NoticeLevel::Info, message), global);
            }
            // Inside-hotel services live on a separate route some backends lack.
            if let Err(e) = manager.load_inside_services().await {
                debug!(error = %e, "inside-hotel services unavailable");
            }
            if replay_pending && manager.snapshot().has_pending_changes() {
                let pb = util::spinner("Replaying offline changes...", global);
                let report = manager.reconcile().await;
                pb.finish_and_clear();
                if let Some(notice) = replay_notice(&report) {
                    output::notify(&notice, global);
                }
            }
            Ok(())
        }
        Err(e) if e.kind() == FailureKind::NotFoundOrUnreachable => {
            output::notify(&offline_notice(&e), global);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// One-line summary of an automatic replay; `None` when nothing changed.
fn replay_notice(report: &ReconcileReport) -> Option<Notice> {
    if !report.still_pending.is_empty() {
        return Some(Notice::warning(format!(
            "{} offline change(s) still waiting for the backend",
            report.still_pending.len()
        )));
    }
    let settled = report.synced.len() + report.reverted.len();
    (settled > 0).then(|| {
        let mut message = format!("Synced {} offline change(s)", report.synced.len());
        if !report.reverted.is_empty() {
            let _ = write!(message, "; reverted {}", report.reverted.join(", "));
        }
        Notice::success(message)
    })
}

fn offline_notice(err: &CoreError) -> Notice {
    Notice::warning(format!("{}; working from local state", Notice::from(err).message))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    marketplace: &Marketplace,
    args: CategoriesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let manager = manager_for(marketplace, args.provider.as_deref())?;

    let state_path = config::state_path();
    let mut ledger = config::load_ledger(&state_path)?;
    manager.restore(ledger.provider(manager.provider_id()));

    // `sync` replays explicitly and reports in full.
    let replay_pending = !matches!(args.command, CategoriesCommand::Sync);
    refresh(&manager, replay_pending, global).await?;
    let result = run(&manager, args.command, global).await;

    ledger.record(manager.provider_id(), manager.snapshot());
    config::save_ledger(&state_path, &ledger)?;
    debug!(path = %state_path.display(), "activation state saved");
    result
}

async fn run(
    manager: &CategoryManager,
    command: CategoriesCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        CategoriesCommand::List => {
            let states = states(manager);
            let out = output::render_list(&global.output, &states, |s| CategoryStateRow::from(s), |s| {
                s.key.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CategoriesCommand::Status => {
            let snapshot = manager.snapshot();
            let out = output::render_single(&global.output, &snapshot, pending_detail, |s| {
                s.active_keys().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CategoriesCommand::Activate { key } => {
            let outcome = manager.activate(&key).await?;
            print_outcome(&outcome, manager, global)
        }

        CategoriesCommand::Deactivate { key } => {
            let outcome = manager.deactivate(&key).await?;
            print_outcome(&outcome, manager, global)
        }

        CategoriesCommand::Toggle { key } => {
            let outcome = manager.toggle(&key).await?;
            print_outcome(&outcome, manager, global)
        }

        CategoriesCommand::Sync => {
            if !manager.snapshot().has_pending_changes() {
                output::notify(&Notice::success("Nothing to sync"), global);
                return Ok(());
            }
            let pb = util::spinner("Replaying offline changes...", global);
            let report = manager.reconcile().await;
            pb.finish_and_clear();

            let out = output::render_single(&global.output, &report, report_detail, |r| {
                r.synced.join("\n")
            })?;
            output::print_output(&out, global.quiet);
            if !report.still_pending.is_empty() {
                output::notify(
                    &Notice::warning(format!(
                        "{} change(s) still waiting for the backend",
                        report.still_pending.len()
                    )),
                    global,
                );
            }
            Ok(())
        }
    }
}

fn print_outcome(
    outcome: &ActivationOutcome,
    manager: &CategoryManager,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    output::notify(&Notice::from(outcome), global);
    if !matches!(global.output, OutputFormat::Table) {
        let view = OutcomeView::new(outcome, manager);
        let out = output::render_single(&global.output, &view, |v| v.message.clone(), |v| {
            v.key.clone()
        })?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
