//! Loyalty command handler.

use staylink_core::{LoyaltyOverview, Marketplace, format_currency};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(overview: &LoyaltyOverview, currency: &str) -> String {
    let progress = &overview.progress;
    let next = match progress.next_tier {
        Some(tier) => format!(
            "{tier} in {} points ({:.0}%)",
            progress.points_to_next_tier, progress.progress_percentage
        ),
        None => "Top tier reached".into(),
    };
    output::detail_lines(&[
        ("Tier", overview.membership.current_tier.to_string()),
        ("Tier points", overview.membership.tier_points.to_string()),
        (
            "Available",
            format!(
                "{} points ({})",
                overview.membership.available_points,
                format_currency(overview.redeemable_value, currency)
            ),
        ),
        ("Next tier", next),
    ])
}

pub async fn handle(marketplace: &Marketplace, global: &GlobalOpts) -> Result<(), CliError> {
    let pb = util::spinner("Loading membership...", global);
    let overview = marketplace.loyalty().await;
    pb.finish_and_clear();
    let overview = overview?;

    let currency = marketplace.config().currency.clone();
    let out = output::render_single(
        &global.output,
        &overview,
        |o| detail(o, &currency),
        |o| o.membership.current_tier.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
