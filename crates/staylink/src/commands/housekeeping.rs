//! Housekeeping service command handlers.

use tabled::Tabled;

use staylink_core::{HousekeepingService, Marketplace, Notice, format_currency};

use crate::cli::{GlobalOpts, HousekeepingArgs, HousekeepingCommand, HousekeepingFields};
use crate::error::CliError;
use crate::output;

use super::{schedule, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Hours")]
    hours: String,
}

struct RowContext<'a> {
    currency: &'a str,
}

impl RowContext<'_> {
    fn row(&self, s: &HousekeepingService) -> ServiceRow {
        ServiceRow {
            id: s.id.clone().unwrap_or_default(),
            name: s.name.clone(),
            category: s.category.clone(),
            price: format_currency(s.base_price, s.currency.as_deref().unwrap_or(self.currency)),
            active: util::yes_no(s.is_active).into(),
            hours: s.schedule_summary(),
        }
    }

    fn detail(&self, s: &HousekeepingService) -> String {
        let mut pairs = vec![
            ("ID", s.id.clone().unwrap_or_else(|| "-".into())),
            ("Name", s.name.clone()),
            ("Category", s.category.clone()),
            (
                "Price",
                format_currency(s.base_price, s.currency.as_deref().unwrap_or(self.currency)),
            ),
            ("Active", util::yes_no(s.is_active).into()),
            ("Hours", s.schedule_summary()),
        ];
        if let Some(ref description) = s.description {
            pairs.push(("Description", description.clone()));
        }
        output::detail_lines(&pairs)
    }
}

// ── Field application ───────────────────────────────────────────────

fn apply_fields(service: &mut HousekeepingService, fields: HousekeepingFields) {
    if let Some(description) = fields.description {
        service.description = Some(description);
    }
    if let Some(category) = fields.category {
        service.category = category;
    }
    if let Some(currency) = fields.currency {
        service.currency = Some(currency);
    }
    if let Some(active) = fields.active {
        service.is_active = active;
    }
    if let Some(available) = fields.available {
        service.availability.is_available = available;
    }
}

fn print_service(
    service: &HousekeepingService,
    ctx: &RowContext<'_>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = output::render_single(&global.output, service, |s| ctx.detail(s), |s| {
        s.id.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    marketplace: &Marketplace,
    args: HousekeepingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctx = RowContext {
        currency: &marketplace.config().currency,
    };

    match args.command {
        HousekeepingCommand::List => {
            let pb = util::spinner("Loading housekeeping services...", global);
            let services = marketplace.list_housekeeping().await;
            pb.finish_and_clear();
            let services = services?;

            let out = output::render_list(
                &global.output,
                &services,
                |s| ctx.row(s),
                |s| s.id.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HousekeepingCommand::Get { id } => {
            let service = marketplace.get_housekeeping(&id).await?;
            print_service(&service, &ctx, global)
        }

        HousekeepingCommand::Create {
            name,
            price,
            fields,
            schedule: edits,
        } => {
            let mut service = HousekeepingService::new(name, price);
            apply_fields(&mut service, fields);
            service.availability.schedule =
                schedule::apply_edits(service.availability.schedule, &edits)?;
            schedule::warn_inverted(&service.availability.schedule, global);

            let created = marketplace.create_housekeeping(&service).await?;
            output::notify(
                &Notice::success(format!("Housekeeping service '{}' created", created.name)),
                global,
            );
            print_service(&created, &ctx, global)
        }

        HousekeepingCommand::Update {
            id,
            name,
            price,
            fields,
            schedule: edits,
        } => {
            let mut service = marketplace.get_housekeeping(&id).await?;
            service.id = Some(id);
            if let Some(name) = name {
                service.name = name;
            }
            if let Some(price) = price {
                service.base_price = price;
            }
            apply_fields(&mut service, fields);
            if schedule::has_edits(&edits) {
                service.availability.schedule =
                    schedule::apply_edits(service.availability.schedule, &edits)?;
                schedule::warn_inverted(&service.availability.schedule, global);
            }

            let updated = marketplace.update_housekeeping(&service).await?;
            output::notify(
                &Notice::success(format!("Housekeeping service '{}' updated", updated.name)),
                global,
            );
            print_service(&updated, &ctx, global)
        }

        HousekeepingCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete housekeeping service '{id}'?"),
                "housekeeping delete",
                global.yes,
            )? {
                return Ok(());
            }
            marketplace.delete_housekeeping(&id).await?;
            output::notify(&Notice::success("Housekeeping service deleted"), global);
            Ok(())
        }
    }
}
