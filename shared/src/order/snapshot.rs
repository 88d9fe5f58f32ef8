//! Order snapshot - immutable input to campaign evaluation
//!
//! Evaluation is a pure computation over this snapshot; nothing here is
//! mutated by the engine.

use serde::{Deserialize, Serialize};

/// A single order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: i64,
    pub category_id: i64,
    /// Always positive
    pub quantity: i32,
    /// Always non-negative
    pub unit_price: f64,
}

impl OrderLine {
    pub fn new(product_id: i64, category_id: i64, quantity: i32, unit_price: f64) -> Self {
        Self {
            product_id,
            category_id,
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Order snapshot handed to the evaluation engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    pub lines: Vec<OrderLine>,
    /// Sum of line totals, fixed at snapshot time
    pub subtotal: f64,
}

impl OrderSnapshot {
    /// Build a snapshot, computing the subtotal from the lines
    pub fn new(lines: Vec<OrderLine>) -> Self {
        let subtotal = lines.iter().map(OrderLine::line_total).sum();
        Self { lines, subtotal }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines
    pub fn item_quantity(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Summed line totals for a single category
    pub fn category_total(&self, category_id: i64) -> f64 {
        self.lines
            .iter()
            .filter(|l| l.category_id == category_id)
            .map(OrderLine::line_total)
            .sum()
    }
}
