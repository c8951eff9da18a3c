//! Medication catalog entry

use chrono::{DateTime, Utc};

pub const DEFAULT_REORDER_LEVEL: i32 = 10;

/// A stocked medication. Names are unique across the catalog.
#[derive(Debug, Clone)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: Option<String>,
    /// Tablet, syrup, injection and so on.
    pub form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    /// Minor currency units per dispensed unit.
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medication {
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone)]
pub struct NewMedication {
    pub name: String,
    pub generic_name: Option<String>,
    pub category: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub unit_price: i64,
}

/// Absent fields are left unchanged. Stock moves through [`StockChange`].
#[derive(Debug, Clone, Default)]
pub struct MedicationChanges {
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub category: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub reorder_level: Option<i32>,
    pub unit_price: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    /// Replace the on-hand count (stock take).
    Set(i32),
    /// Receive (positive) or issue (negative) units. Never goes below zero.
    Adjust(i32),
}
