//! Criteria matching
//!
//! A lender describes the deals it funds with a [`LenderCriteria`] record.
//! [`matches`] is the single predicate used in both directions: listing the
//! pending deals a lender can see, and fanning a new deal out to the
//! lenders whose criteria accept it.

mod model;

pub use model::*;

use uuid::Uuid;

use crate::deal::Deal;

/// Whether `deal` satisfies every clause of `criteria`. Bounds are inclusive.
pub fn matches(deal: &Deal, criteria: &LenderCriteria) -> bool {
    criteria.loan_types.iter().any(|t| *t == deal.loan_type)
        && criteria.min_amount <= deal.amount
        && deal.amount <= criteria.max_amount
        && criteria.regions.iter().any(|r| *r == deal.region)
        && deal.borrower_credit_score >= criteria.credit_score_min
        && deal.ltv_ratio <= criteria.ltv_max
}

/// Deals from `deals` visible to a lender holding `criteria`
pub fn matching_deals(criteria: &LenderCriteria, deals: Vec<Deal>) -> Vec<Deal> {
    deals
        .into_iter()
        .filter(|deal| matches(deal, criteria))
        .collect()
}

/// Lender ids whose criteria accept `deal`
pub fn matching_lenders<'a, I>(deal: &'a Deal, criteria: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = &'a LenderCriteria>,
{
    criteria
        .into_iter()
        .filter(|c| matches(deal, c))
        .map(|c| c.lender_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{CreateDealRequest, DealStatus};
    use chrono::Utc;

    fn criteria() -> LenderCriteria {
        LenderCriteria {
            lender_id: Uuid::new_v4(),
            loan_types: vec!["residential".to_string(), "commercial".to_string()],
            min_amount: 100_000.0,
            max_amount: 500_000.0,
            regions: vec!["CA".to_string(), "NV".to_string()],
            credit_score_min: 650,
            ltv_max: 0.8,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn deal() -> Deal {
        Deal::new(
            Uuid::new_v4(),
            "Broker".to_string(),
            CreateDealRequest {
                title: "Duplex refinance".to_string(),
                loan_type: "residential".to_string(),
                amount: 250_000.0,
                region: "CA".to_string(),
                borrower_credit_score: 700,
                ltv_ratio: 0.7,
                property_type: "duplex".to_string(),
                description: "Cash-out refinance".to_string(),
            },
        )
    }

    #[test]
    fn test_all_clauses_hold() {
        assert!(matches(&deal(), &criteria()));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let c = criteria();

        let mut d = deal();
        d.amount = c.min_amount;
        assert!(matches(&d, &c));

        d.amount = c.max_amount;
        assert!(matches(&d, &c));

        d.ltv_ratio = c.ltv_max;
        assert!(matches(&d, &c));

        d.borrower_credit_score = c.credit_score_min;
        assert!(matches(&d, &c));
    }

    #[test]
    fn test_each_clause_can_reject() {
        let c = criteria();

        let mut d = deal();
        d.loan_type = "construction".to_string();
        assert!(!matches(&d, &c));

        let mut d = deal();
        d.amount = 99_999.99;
        assert!(!matches(&d, &c));

        let mut d = deal();
        d.amount = 500_000.01;
        assert!(!matches(&d, &c));

        let mut d = deal();
        d.region = "TX".to_string();
        assert!(!matches(&d, &c));

        let mut d = deal();
        d.borrower_credit_score = 649;
        assert!(!matches(&d, &c));

        let mut d = deal();
        d.ltv_ratio = 0.81;
        assert!(!matches(&d, &c));
    }

    #[test]
    fn test_empty_sets_match_nothing() {
        let mut c = criteria();
        c.regions.clear();
        assert!(!matches(&deal(), &c));
    }

    #[test]
    fn test_matching_is_independent_of_status() {
        // Status filtering belongs to the lender view, not the predicate
        let mut d = deal();
        d.status = DealStatus::Completed;
        assert!(matches(&d, &criteria()));
    }

    #[test]
    fn test_both_directions_agree() {
        let accepting = criteria();
        let mut rejecting = criteria();
        rejecting.credit_score_min = 750;

        let d = deal();
        let lenders = matching_lenders(&d, [&accepting, &rejecting]);
        assert_eq!(lenders, vec![accepting.lender_id]);

        assert_eq!(matching_deals(&accepting, vec![d.clone()]).len(), 1);
        assert!(matching_deals(&rejecting, vec![d]).is_empty());
    }
}
