//! Basket summaries.

use crate::ids::{BasketId, ItemKey, ProductId};
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Snapshot of a basket's lines and totals, ready to render or serialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasketSummary {
    /// Basket the snapshot was taken from.
    pub basket: BasketId,
    /// Total before tax.
    pub subtotal: f64,
    /// Total tax.
    pub tax: f64,
    /// Total including tax.
    pub total: f64,
    /// Total weight.
    pub weight: f64,
    /// Sum of quantities.
    pub total_items: i64,
    /// Number of distinct lines.
    pub unique_items: usize,
    /// Per-line breakdown in insertion order.
    pub lines: Vec<LineSummary>,
}

impl BasketSummary {
    /// Summarize a basket's items.
    pub fn from_items(basket: &BasketId, items: &[Item]) -> Self {
        let lines: Vec<LineSummary> = items.iter().map(LineSummary::from_item).collect();
        Self {
            basket: basket.clone(),
            subtotal: lines.iter().map(|l| l.subtotal).sum(),
            tax: lines.iter().map(|l| l.tax).sum(),
            total: lines.iter().map(|l| l.total).sum(),
            weight: lines.iter().map(|l| l.weight).sum(),
            total_items: lines
                .iter()
                .fold(0i64, |acc, l| acc.saturating_add(l.quantity)),
            unique_items: lines.len(),
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Tax as a percentage of the subtotal.
    pub fn effective_tax_percentage(&self) -> f64 {
        if self.subtotal == 0.0 {
            return 0.0;
        }
        (self.tax / self.subtotal) * 100.0
    }
}

/// Breakdown of a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSummary {
    pub identifier: Option<ItemKey>,
    pub id: ProductId,
    pub name: String,
    pub quantity: i64,
    /// Unit price with options, before tax.
    pub unit_price: f64,
    /// Unit price with options and tax.
    pub unit_price_with_tax: f64,
    /// Line total before tax.
    pub subtotal: f64,
    pub tax: f64,
    /// Line total including tax.
    pub total: f64,
    pub weight: f64,
}

impl LineSummary {
    pub fn from_item(item: &Item) -> Self {
        Self {
            identifier: item.identifier().cloned(),
            id: item.id().clone(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            unit_price: item.single(false),
            unit_price_with_tax: item.single(true),
            subtotal: item.total(false),
            tax: item.tax(),
            total: item.total(true),
            weight: item.weight(),
        }
    }
}
