use std::collections::HashSet;

use crate::models::{ActionKind, BehaviorProfile, InteractionEvent};

/// Reduces a user's behavior window into a compact profile
///
/// Pure function of the fetched window: no side effects and nothing cached.
/// The window must be ordered newest first — recency of searches depends on
/// it. Zero interactions yield `None`, which callers treat as the cold-start
/// signal rather than an error.
pub fn summarize(events: &[InteractionEvent]) -> Option<BehaviorProfile> {
    if events.is_empty() {
        return None;
    }

    // First-encounter order so category ties resolve deterministically
    let mut category_counts: Vec<(&str, u32)> = Vec::new();
    let mut prices: Vec<f64> = Vec::new();
    let mut total_views: u32 = 0;
    let mut recent_searches: Vec<String> = Vec::new();
    let mut viewed_product_ids: HashSet<i32> = HashSet::new();

    for event in events {
        match category_counts
            .iter_mut()
            .find(|(category, _)| *category == event.category)
        {
            Some((_, count)) => *count += 1,
            None => category_counts.push((&event.category, 1)),
        }

        if matches!(event.action, ActionKind::View | ActionKind::AddToCart) {
            prices.push(event.price);
        }

        match event.action {
            ActionKind::View => {
                total_views += 1;
                viewed_product_ids.insert(event.product_id);
            }
            ActionKind::Search => {
                if let Some(query) = event
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get("query"))
                    .and_then(|q| q.as_str())
                {
                    recent_searches.push(query.to_string());
                }
            }
            _ => {}
        }
    }

    let top_category = top_category(&category_counts).map(str::to_string);

    let avg_price = if prices.is_empty() {
        None
    } else {
        Some(prices.iter().sum::<f64>() / prices.len() as f64)
    };

    recent_searches.truncate(3);

    Some(BehaviorProfile {
        top_category,
        avg_price,
        total_views,
        recent_searches,
        viewed_product_ids,
    })
}

/// Highest count wins; on equal counts the earlier entry is kept
fn top_category<'a>(counts: &[(&'a str, u32)]) -> Option<&'a str> {
    let mut best: Option<(&str, u32)> = None;
    for &(category, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((category, count)),
        }
    }
    best.map(|(category, _)| category)
}
