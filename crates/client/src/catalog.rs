//! Page definitions for the built-in admin resources.

use adminlist_core::{EntityKind, FieldKind};

use crate::controller::PageConfig;
use crate::pipeline::{PipelineConfig, SortOrder, SortState};

impl PageConfig {
    /// The stock list page of `entity`: searchable columns, filter bar and
    /// sort kinds as the admin UI shows them.
    pub fn for_entity(entity: EntityKind) -> Self {
        let base = PageConfig::new(entity.as_str(), entity.cache_key());
        match entity {
            EntityKind::Companies => base
                .field("status", "Status")
                .field("country", "Country")
                .pipeline(
                    PipelineConfig::new(["name", "email", "phone", "country"])
                        .column("created_at", FieldKind::Date),
                )
                .sort(SortState::ascending("name")),
            EntityKind::Customers | EntityKind::Vendors => base
                .field("status", "Status")
                .field("city", "City")
                .pipeline(
                    PipelineConfig::new(["name", "email", "phone", "city"])
                        .column("balance", FieldKind::Number)
                        .column("created_at", FieldKind::Date),
                )
                .sort(SortState::ascending("name")),
            EntityKind::Taxes => base
                .field("status", "Status")
                .pipeline(PipelineConfig::new(["name", "code"]).column("rate", FieldKind::Number))
                .sort(SortState::ascending("name")),
            EntityKind::Categories => base
                .field("status", "Status")
                .field("parent", "Parent")
                .pipeline(PipelineConfig::new(["name", "description"]))
                .sort(SortState::ascending("name")),
            EntityKind::Items => base
                .field("status", "Status")
                .field("category", "Category")
                .field("unit", "Unit")
                .pipeline(
                    PipelineConfig::new(["name", "sku", "category"])
                        .column("price", FieldKind::Number)
                        .column("stock", FieldKind::Number),
                )
                .sort(SortState::ascending("name")),
            EntityKind::Parties => base
                .field("type", "Type")
                .field("status", "Status")
                .pipeline(
                    PipelineConfig::new(["name", "email", "phone"])
                        .column("balance", FieldKind::Number),
                )
                .sort(SortState::ascending("name")),
            EntityKind::Users => base
                .field("role", "Role")
                .field("status", "Status")
                .pipeline(
                    PipelineConfig::new(["name", "email", "role"])
                        .column("last_login", FieldKind::Date),
                )
                .sort(SortState::ascending("email")),
            EntityKind::Invoices => base
                .field("status", "Status")
                .field("customer", "Customer")
                .pipeline(
                    PipelineConfig::new(["number", "customer", "status"])
                        .column("total", FieldKind::Number)
                        .column("issue_date", FieldKind::Date)
                        .column("due_date", FieldKind::Date),
                )
                .sort(SortState {
                    order_by: "issue_date".to_string(),
                    order: SortOrder::Descending,
                }),
        }
    }
}
