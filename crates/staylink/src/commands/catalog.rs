//! Catalog command handlers (built-in definitions, no backend round trip).

use std::fmt::Write;

use tabled::Tabled;

use staylink_core::{CategoryCatalog, CategoryScope, ServiceCategory};

use crate::cli::{CatalogArgs, CatalogCommand, GlobalOpts, ScopeFilter};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&ServiceCategory> for CategoryRow {
    fn from(c: &ServiceCategory) -> Self {
        Self {
            key: c.key.clone(),
            name: c.name.clone(),
            scope: c.scope.to_string(),
            status: if c.coming_soon {
                "coming soon".into()
            } else {
                "available".into()
            },
        }
    }
}

fn detail(c: &ServiceCategory) -> String {
    let mut pairs = vec![
        ("Key", c.key.clone()),
        ("Name", c.name.clone()),
        ("Scope", c.scope.to_string()),
        ("Description", c.description.clone()),
    ];
    if c.coming_soon {
        pairs.push(("Status", "coming soon".into()));
    }
    if !c.vehicle_types.is_empty() {
        pairs.push(("Vehicles", c.vehicle_types.join(", ")));
    }
    if !c.tour_types.is_empty() {
        pairs.push(("Tours", c.tour_types.join(", ")));
    }
    let mut out = output::detail_lines(&pairs);
    if !c.sample_items.is_empty() {
        out.push_str("\n\nSample items:");
        for item in &c.sample_items {
            let _ = write!(out, "\n  - {} ({})", item.name, item.category);
        }
    }
    out
}

impl From<ScopeFilter> for CategoryScope {
    fn from(filter: ScopeFilter) -> Self {
        match filter {
            ScopeFilter::Outside => CategoryScope::Outside,
            ScopeFilter::InsideHotel => CategoryScope::InsideHotel,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: CatalogArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let catalog = CategoryCatalog::builtin();

    match args.command {
        CatalogCommand::List { scope } => {
            let categories: Vec<ServiceCategory> = match scope {
                Some(filter) => catalog.in_scope(filter.into()).cloned().collect(),
                None => catalog.iter().cloned().collect(),
            };
            let out = output::render_list(
                &global.output,
                &categories,
                |c| CategoryRow::from(c),
                |c| c.key.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CatalogCommand::Show { key } => {
            let category = catalog.get(&key).ok_or_else(|| CliError::NotFound {
                resource_type: "category".into(),
                identifier: key.clone(),
                list_command: "catalog list".into(),
            })?;
            let out = output::render_single(&global.output, category, detail, |c| c.key.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
