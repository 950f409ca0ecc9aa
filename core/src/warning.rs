//! Non-fatal run diagnostics.
//!
//! RULE: A warning never aborts a run. The offending record is excluded
//! from the affected computation and the warning is returned to the caller
//! alongside the reports.

use crate::types::{EntityKey, OrderNumber};
use serde::{Deserialize, Serialize};

/// Every warning the engine can raise during a run.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunWarning {
    // ── Referential integrity ──────────────────────
    /// Fact references a customer missing from the customer dimension.
    UnknownCustomer {
        order_number: OrderNumber,
        customer_key: EntityKey,
    },
    /// Fact references a product missing from the product dimension.
    UnknownProduct {
        order_number: OrderNumber,
        product_key:  EntityKey,
    },

    // ── Record quality ─────────────────────────────
    UndatedFact {
        order_number: OrderNumber,
    },
    BirthDateAfterReference {
        customer_key: EntityKey,
    },
    ReferenceBeforeLastOrder {
        entity: WarningEntity,
        key:    EntityKey,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningEntity {
    Customer,
    Product,
}

impl RunWarning {
    /// Stable name used for the warning_type column of the run log.
    pub fn type_name(&self) -> &'static str {
        match self {
            RunWarning::UnknownCustomer { .. }          => "unknown_customer",
            RunWarning::UnknownProduct { .. }           => "unknown_product",
            RunWarning::UndatedFact { .. }              => "undated_fact",
            RunWarning::BirthDateAfterReference { .. }  => "birth_date_after_reference",
            RunWarning::ReferenceBeforeLastOrder { .. } => "reference_before_last_order",
        }
    }

    /// True for the referential-gap family of warnings.
    pub fn is_referential_gap(&self) -> bool {
        matches!(
            self,
            RunWarning::UnknownCustomer { .. } | RunWarning::UnknownProduct { .. }
        )
    }
}
