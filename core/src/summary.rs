//! Dashboard aggregation over a mirrored collection.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::types::{Category, ExpenseCollection};

/// Totals shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub total: Decimal,
    /// Only categories with at least one record appear.
    pub by_category: BTreeMap<Category, Decimal>,
}

impl Summary {
    pub fn of(collection: &ExpenseCollection) -> Self {
        let mut by_category = BTreeMap::new();
        let mut total = Decimal::ZERO;
        for record in collection.iter() {
            total += record.amount;
            *by_category.entry(record.category).or_insert(Decimal::ZERO) += record.amount;
        }
        Self {
            count: collection.len(),
            total,
            by_category,
        }
    }

    /// The category with the highest spend; ties go to the earlier category.
    pub fn top_category(&self) -> Option<(Category, Decimal)> {
        self.by_category
            .iter()
            .fold(None, |best: Option<(Category, Decimal)>, (&category, &amount)| match best {
                Some((_, best_amount)) if best_amount >= amount => best,
                _ => Some((category, amount)),
            })
    }

    pub fn share_of(&self, category: Category) -> Option<Decimal> {
        if self.total.is_zero() {
            return None;
        }
        self.by_category
            .get(&category)
            .map(|amount| *amount / self.total)
    }
}
