//! Category activation and pricing model shared by every staylink view.
//!
//! This crate owns the business logic between `staylink-api` and the
//! consumers (the CLI today):
//!
//! - **[`Marketplace`]**: Facade owning the HTTP client, the session and one
//!   [`ActivationManager`] per provider. Every method returns [`CoreError`];
//!   consumers never see HTTP status codes.
//!
//! - **[`ActivationManager`]**: Per-provider activation state machine with
//!   per-key busy markers, offline fallback tagged by [`ActivationOrigin`],
//!   [`reconcile()`](ActivationManager::reconcile), request timeouts and
//!   cancellation, and `watch`-channel snapshots.
//!
//! - **[`CategoryCatalog`]**: Built-in category definitions, merged with
//!   whatever the backend serves.
//!
//! - **[`MarkupEngine`]**, **[`OperatingSchedule`]**, loyalty
//!   ([`compute_progress`]) and [`format_currency`]: pure models and
//!   helpers that views render directly.

pub mod activation;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod gateway;
pub mod housekeeping;
pub mod loyalty;
pub mod markup;
pub mod marketplace;
pub mod schedule;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activation::{
    ActivationLedger, ActivationManager, ActivationOrigin, ActivationOutcome, ActivationPhase,
    ActivationSnapshot, ActiveCategory, ReconcileReport,
};
pub use catalog::{CategoryCatalog, CategoryScope, SampleItem, ServiceCategory};
pub use config::{MarketplaceConfig, TlsVerification};
pub use error::{CoreError, FailureKind};
pub use format::{Notice, NoticeLevel, format_currency};
pub use gateway::{ApiResult, CategoryGateway, MarkupGateway};
pub use housekeeping::{Availability, HousekeepingService};
pub use loyalty::{
    LoyaltyMembership, Tier, TierProgress, TierThresholds, compute_progress, redeemable_value,
};
pub use markup::{MarkupEngine, MarkupSetting};
pub use marketplace::{CategoryManager, LoyaltyOverview, Marketplace};
pub use schedule::{
    ClockTime, DayEdit, DaySchedule, OperatingSchedule, ScheduleGroup, ScheduleSummary, Weekday,
    summarize,
};
pub use session::{Capability, Role, Session, SessionContext, SessionSlot};
