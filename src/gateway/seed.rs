//! Fixture data served by the mock gateway and used to seed SQLite.

use chrono::NaiveDate;

use crate::models::{Benefit, BenefitCategory, DashboardSnapshot, RewardPoints, Trend, User};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

pub fn user() -> User {
    User {
        id: "user-001".to_string(),
        name: "Alex Morgan".to_string(),
        email: "alex.morgan@example.com".to_string(),
        avatar: "https://i.pravatar.cc/150?u=alex.morgan".to_string(),
        level: 12,
        current_xp: 2_450,
        target_xp: 3_000,
        title: "Gold Member".to_string(),
        member_since: date(2022, 3, 15),
    }
}

pub fn reward_points() -> RewardPoints {
    RewardPoints {
        current: 12_450,
        lifetime: 48_200,
        this_month: 2_340,
        last_month: 1_890,
        trend: Trend::Up,
        next_milestone: 15_000,
    }
}

pub fn benefits() -> Vec<Benefit> {
    vec![
        Benefit {
            id: "1".to_string(),
            title: "20% Off Dining".to_string(),
            description: "Save on your next meal at partner restaurants".to_string(),
            icon: "utensils".to_string(),
            value: "20%".to_string(),
            category: BenefitCategory::Discount,
            claimed: false,
            expiry_date: date(2026, 12, 31),
            terms: Some("Valid at participating restaurants only".to_string()),
        },
        Benefit {
            id: "2".to_string(),
            title: "$50 Shopping Voucher".to_string(),
            description: "Redeemable at any partner store".to_string(),
            icon: "shopping-bag".to_string(),
            value: "$50".to_string(),
            category: BenefitCategory::Voucher,
            claimed: false,
            expiry_date: date(2026, 11, 30),
            terms: Some("Minimum purchase of $100 required".to_string()),
        },
        Benefit {
            id: "3".to_string(),
            title: "5% Cashback".to_string(),
            description: "Earn cashback on all travel bookings".to_string(),
            icon: "plane".to_string(),
            value: "5%".to_string(),
            category: BenefitCategory::Cashback,
            claimed: true,
            expiry_date: date(2027, 1, 31),
            terms: None,
        },
        Benefit {
            id: "4".to_string(),
            title: "VIP Lounge Access".to_string(),
            description: "Complimentary access to airport lounges".to_string(),
            icon: "crown".to_string(),
            value: "2 visits".to_string(),
            category: BenefitCategory::Exclusive,
            claimed: false,
            expiry_date: date(2027, 3, 31),
            terms: Some("Subject to lounge capacity".to_string()),
        },
        Benefit {
            id: "5".to_string(),
            title: "Free Movie Tickets".to_string(),
            description: "Two tickets for any standard screening".to_string(),
            icon: "film".to_string(),
            value: "2 tickets".to_string(),
            category: BenefitCategory::Voucher,
            claimed: false,
            expiry_date: date(2026, 12, 15),
            terms: None,
        },
        Benefit {
            id: "6".to_string(),
            title: "10% Off Electronics".to_string(),
            description: "Discount on gadgets at partner retailers".to_string(),
            icon: "smartphone".to_string(),
            value: "10%".to_string(),
            category: BenefitCategory::Discount,
            claimed: false,
            expiry_date: date(2027, 2, 28),
            terms: Some("Maximum discount of $200".to_string()),
        },
    ]
}

/// The full snapshot, ready to serve.
pub fn dashboard_snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        user: user(),
        benefits: benefits(),
        reward_points: reward_points(),
        is_loading: false,
    }
}
