//! Markup command handlers.

use serde::Serialize;
use tabled::Tabled;

use staylink_core::{Marketplace, MarkupEngine, MarkupSetting, Notice, format_currency};

use crate::cli::{GlobalOpts, MarkupArgs, MarkupCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MarkupRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Overrides")]
    overrides: String,
}

impl From<&MarkupSetting> for MarkupRow {
    fn from(s: &MarkupSetting) -> Self {
        Self {
            category: s.category_id.clone(),
            default: format!("{}%", s.default_markup_percent),
            overrides: s
                .provider_overrides
                .iter()
                .map(|(provider, pct)| format!("{provider}: {pct}%"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceView {
    category_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    provider_id: String,
    base_price: f64,
    markup_percent: f64,
    markup_amount: f64,
    final_price: f64,
    currency: String,
}

fn price_detail(v: &PriceView) -> String {
    output::detail_lines(&[
        ("Category", v.category_id.clone()),
        ("Base price", format_currency(v.base_price, &v.currency)),
        (
            "Markup",
            format!(
                "{}% ({})",
                v.markup_percent,
                format_currency(v.markup_amount, &v.currency)
            ),
        ),
        ("Final price", format_currency(v.final_price, &v.currency)),
    ])
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn load(marketplace: &Marketplace, global: &GlobalOpts) -> Result<MarkupEngine, CliError> {
    let pb = util::spinner("Loading markup settings...", global);
    let engine = marketplace.load_markup().await;
    pb.finish_and_clear();
    Ok(engine?)
}

async fn save(
    marketplace: &Marketplace,
    engine: &mut MarkupEngine,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let pb = util::spinner("Saving markup settings...", global);
    let saved = marketplace.save_markup(engine).await;
    pb.finish_and_clear();
    Ok(saved?)
}

fn warn_if_clamped(requested: f64, stored: f64, global: &GlobalOpts) {
    if (requested - stored).abs() > f64::EPSILON || requested.is_nan() {
        output::notify(
            &Notice::warning(format!("{requested}% is out of range; stored {stored}%")),
            global,
        );
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    marketplace: &Marketplace,
    args: MarkupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MarkupCommand::Show => {
            let engine = load(marketplace, global).await?;
            let settings: Vec<MarkupSetting> = engine.iter().cloned().collect();
            let out = output::render_list(&global.output, &settings, |s| MarkupRow::from(s), |s| {
                s.category_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MarkupCommand::Set { category, percent } => {
            let mut engine = load(marketplace, global).await?;
            let stored = engine.set_default_markup(&category, percent);
            warn_if_clamped(percent, stored, global);
            save(marketplace, &mut engine, global).await?;
            output::notify(
                &Notice::success(format!("Default markup for {category} set to {stored}%")),
                global,
            );
            Ok(())
        }

        MarkupCommand::Override {
            category,
            provider,
            percent,
        } => {
            let mut engine = load(marketplace, global).await?;
            let stored = engine
                .set_provider_override(&category, &provider, Some(percent))
                .unwrap_or_default();
            warn_if_clamped(percent, stored, global);
            save(marketplace, &mut engine, global).await?;
            output::notify(
                &Notice::success(format!(
                    "Markup for {provider} on {category} set to {stored}%"
                )),
                global,
            );
            Ok(())
        }

        MarkupCommand::Clear { category, provider } => {
            let mut engine = load(marketplace, global).await?;
            engine.set_provider_override(&category, &provider, None);
            save(marketplace, &mut engine, global).await?;
            output::notify(
                &Notice::success(format!(
                    "{provider} now uses the default markup on {category}"
                )),
                global,
            );
            Ok(())
        }

        MarkupCommand::Price {
            category,
            base_price,
            provider,
            currency,
        } => {
            let engine = load(marketplace, global).await?;
            let view = PriceView {
                markup_percent: engine.effective_markup(&category, &provider),
                markup_amount: engine.markup_amount(base_price, &category, &provider),
                final_price: engine.compute_final_price(base_price, &category, &provider),
                currency: currency.unwrap_or_else(|| marketplace.config().currency.clone()),
                category_id: category,
                provider_id: provider,
                base_price,
            };
            let out = output::render_single(&global.output, &view, price_detail, |v| {
                format!("{:.2}", v.final_price)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
