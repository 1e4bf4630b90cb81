//! Which breakdown categories are expanded in a collapsible view.

use std::collections::BTreeSet;

use crate::financial::{FinancialBreakdown, FinancialCategory};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSections {
    expanded: BTreeSet<FinancialCategory>,
}

impl ExpandedSections {
    /// Start with every category that has at least one item expanded.
    pub fn from_breakdowns(breakdowns: &[FinancialBreakdown]) -> Self {
        Self {
            expanded: breakdowns
                .iter()
                .filter(|b| !b.items.is_empty())
                .map(|b| b.category)
                .collect(),
        }
    }

    /// Flip one category; returns whether it is now expanded.
    pub fn toggle(&mut self, category: FinancialCategory) -> bool {
        if self.expanded.remove(&category) {
            false
        } else {
            self.expanded.insert(category);
            true
        }
    }

    pub fn is_expanded(&self, category: FinancialCategory) -> bool {
        self.expanded.contains(&category)
    }

    pub fn expand_all(&mut self) {
        self.expanded.extend(FinancialCategory::ALL);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expanded categories in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = FinancialCategory> + '_ {
        self.expanded.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::extract_financial_breakdown;
    use crate::record::ReservationDetails;
    use serde_json::json;

    #[test]
    fn starts_with_populated_categories() {
        let r = ReservationDetails::from_value(json!({
            "ACCOMODATION_HT": 450,
            "CITY_TAX": 12
        }));
        let sections = ExpandedSections::from_breakdowns(&extract_financial_breakdown(&r));
        assert!(sections.is_expanded(FinancialCategory::Accommodation));
        assert!(sections.is_expanded(FinancialCategory::TaxesAndFees));
        assert!(!sections.is_expanded(FinancialCategory::Cleaning));
    }

    #[test]
    fn toggle_flips_state() {
        let mut sections = ExpandedSections::default();
        assert!(sections.toggle(FinancialCategory::Cleaning));
        assert!(sections.is_expanded(FinancialCategory::Cleaning));
        assert!(!sections.toggle(FinancialCategory::Cleaning));
        assert!(!sections.is_expanded(FinancialCategory::Cleaning));
    }

    #[test]
    fn expand_and_collapse_all() {
        let mut sections = ExpandedSections::default();
        sections.expand_all();
        assert_eq!(sections.iter().collect::<Vec<_>>(), FinancialCategory::ALL.to_vec());
        sections.collapse_all();
        assert_eq!(sections.iter().count(), 0);
    }
}
