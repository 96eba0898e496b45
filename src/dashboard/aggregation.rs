//! Aggregation of the active period's transactions for the dashboard.

use std::{cmp::Ordering, collections::HashMap};

use crate::{category::Category, dashboard::entries::DashboardEntry, transaction::TransactionKind};

/// Income and expense totals for a period. Transfers move money between the
/// user's own accounts, so they count towards neither total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PeriodTotals {
    pub income: f64,
    pub expense: f64,
}

impl PeriodTotals {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

pub(super) fn period_totals(entries: &[DashboardEntry]) -> PeriodTotals {
    let mut totals = PeriodTotals {
        income: 0.0,
        expense: 0.0,
    };

    for entry in entries {
        match entry.kind {
            TransactionKind::Income => totals.income += entry.amount,
            TransactionKind::Expense => totals.expense += entry.amount,
            TransactionKind::Transfer => {}
        }
    }

    totals
}

/// The label for expenses without a category.
pub(super) const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Sums expenses per top-level category, largest first.
///
/// Subcategory spending rolls up under the parent category.
pub(super) fn expenses_by_category(
    entries: &[DashboardEntry],
    categories: &[Category],
) -> Vec<(String, f64)> {
    let categories_by_id: HashMap<_, _> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let top_level_name = |category_id| {
        let category = categories_by_id.get(&category_id)?;

        match category.parent_id.and_then(|id| categories_by_id.get(&id)) {
            Some(parent) => Some(parent.name.as_str()),
            None => Some(category.name.as_str()),
        }
    };

    let mut totals: HashMap<&str, f64> = HashMap::new();

    for entry in entries {
        if entry.kind != TransactionKind::Expense {
            continue;
        }

        let label = entry
            .category_id
            .and_then(|id| top_level_name(id))
            .unwrap_or(UNCATEGORIZED_LABEL);
        *totals.entry(label).or_insert(0.0) += entry.amount;
    }

    let mut breakdown: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(label, total)| (label.to_owned(), total))
        .collect();
    breakdown.sort_by(|left, right| {
        right
            .1
            .partial_cmp(&left.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.0.cmp(&right.0))
    });

    breakdown
}
