use std::collections::BTreeMap;

use chron_core::entities::Episode;

/// Bare episode with slug `ep-<n>`, a feed title, and a publish date.
pub fn episode(number: u32, title: &str, date: &str) -> Episode {
    Episode {
        episode: number,
        slug: format!("ep-{number}"),
        title_feed: Some(title.to_string()),
        title_sheet: None,
        description: String::new(),
        pub_date: Some(date.to_string()),
        year_primary: None,
        year_from: None,
        year_to: None,
        scope: None,
        year_confidence: None,
        extra: BTreeMap::new(),
    }
}
