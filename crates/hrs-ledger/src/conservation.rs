//! Conservation check for distributions.
//!
//! The referral split must pay out exactly the policy price: no unit created,
//! no unit lost to integer truncation. The splitter routes truncation residue
//! to the root, so this check passes by construction; it runs before every
//! escrow commit so that a future change to the split rule cannot silently
//! mint or burn funds.

use hrs_types::{Amount, Credit};

use crate::DistributionAnomaly;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Credits sum to the distributed amount.
    Balanced,
    /// Credits do not sum to the distributed amount.
    Anomaly(DistributionAnomaly),
}

impl ConservationResult {
    /// Whether the distribution balanced.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Sum the credit amounts, `None` on overflow.
pub fn total(credits: &[Credit]) -> Option<Amount> {
    credits
        .iter()
        .try_fold(Amount::MIN, |acc, credit| acc.checked_add(credit.amount))
}

/// Verify that `credits` distribute exactly `amount`.
pub fn verify_distribution(amount: Amount, credits: &[Credit]) -> ConservationResult {
    match total(credits) {
        Some(sum) if sum == amount => ConservationResult::Balanced,
        Some(sum) => ConservationResult::Anomaly(DistributionAnomaly {
            expected: amount,
            actual: Some(sum),
            message: format!(
                "DISTRIBUTION_ANOMALY: credits sum to {sum}, expected {amount}",
            ),
        }),
        None => ConservationResult::Anomaly(DistributionAnomaly {
            expected: amount,
            actual: None,
            message: format!(
                "DISTRIBUTION_ANOMALY: arithmetic overflow summing credits for {amount}",
            ),
        }),
    }
}
