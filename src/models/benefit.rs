//! Benefit model for the claimable-benefits grid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed set of benefit categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenefitCategory {
    Discount,
    Voucher,
    Cashback,
    Exclusive,
}

impl BenefitCategory {
    pub const ALL: [BenefitCategory; 4] = [
        BenefitCategory::Discount,
        BenefitCategory::Voucher,
        BenefitCategory::Cashback,
        BenefitCategory::Exclusive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenefitCategory::Discount => "discount",
            BenefitCategory::Voucher => "voucher",
            BenefitCategory::Cashback => "cashback",
            BenefitCategory::Exclusive => "exclusive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "discount" => Some(BenefitCategory::Discount),
            "voucher" => Some(BenefitCategory::Voucher),
            "cashback" => Some(BenefitCategory::Cashback),
            "exclusive" => Some(BenefitCategory::Exclusive),
            _ => None,
        }
    }
}

/// A benefit the member can claim once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benefit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub value: String,
    pub category: BenefitCategory,
    pub claimed: bool,
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

/// Returns a new collection where the benefit with `benefit_id` is claimed.
///
/// The input is left untouched. `None` when no entry carries that id.
pub fn with_benefit_claimed(benefits: &[Benefit], benefit_id: &str) -> Option<Vec<Benefit>> {
    if !benefits.iter().any(|b| b.id == benefit_id) {
        return None;
    }

    Some(
        benefits
            .iter()
            .map(|b| {
                if b.id == benefit_id {
                    Benefit {
                        claimed: true,
                        ..b.clone()
                    }
                } else {
                    b.clone()
                }
            })
            .collect(),
    )
}

/// Claim status used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    Claimed,
    Available,
}

impl ClaimStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "claimed" => Some(ClaimStatus::Claimed),
            "available" => Some(ClaimStatus::Available),
            _ => None,
        }
    }
}

/// Filter for the benefits listing.
#[derive(Debug, Clone, Default)]
pub struct BenefitFilter {
    pub category: Option<BenefitCategory>,
    pub status: Option<ClaimStatus>,
}

impl BenefitFilter {
    pub fn matches(&self, benefit: &Benefit) -> bool {
        if let Some(category) = self.category {
            if benefit.category != category {
                return false;
            }
        }
        match self.status {
            Some(ClaimStatus::Claimed) => benefit.claimed,
            Some(ClaimStatus::Available) => !benefit.claimed,
            None => true,
        }
    }

    pub fn apply(&self, benefits: &[Benefit]) -> Vec<Benefit> {
        benefits.iter().filter(|b| self.matches(b)).cloned().collect()
    }
}
