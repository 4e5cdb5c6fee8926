use std::collections::HashSet;

use serde::Serialize;

/// Compact summary of a user's recent behavior
///
/// Derived fresh per request from the most recent interaction window and never
/// persisted. Absence of a profile (a user with zero interactions) is modeled
/// as `Option<BehaviorProfile>` at the call sites; the `Default` value is the
/// "empty profile" handed to the explanation generator for guests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BehaviorProfile {
    /// Category with the most interactions in the window; ties go to the
    /// category encountered first
    pub top_category: Option<String>,
    /// Mean price over VIEW and ADD_TO_CART interactions, if any
    pub avg_price: Option<f64>,
    /// Number of VIEW interactions in the window
    pub total_views: u32,
    /// Up to three most recent search queries, most recent first
    pub recent_searches: Vec<String>,
    /// Distinct product ids the user has viewed
    pub viewed_product_ids: HashSet<i32>,
}

impl BehaviorProfile {
    /// Viewed product ids as a sorted vec, for stable query parameters
    pub fn viewed_ids_sorted(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.viewed_product_ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
