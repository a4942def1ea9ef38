use crate::models::Advertisement;

/// Route prefixes that must never show advertisements.
const AD_FREE_PATHS: [&str; 2] = ["/cms", "/api/admin"];

/// Deterministic hash of a route path: the wrapping sum of its char codes.
/// Cheap, stable across processes, and spreads nearby routes over different
/// rotation offsets.
pub fn path_hash(path: &str) -> u32 {
    path.chars().fold(0u32, |acc, c| acc.wrapping_add(c as u32))
}

/// Picks up to `per_slot` active ads for a page by rotating through the
/// collection: offset = hash(path) % active_count, wrapping around the end.
/// Inactive ads are excluded before the offset is computed, and the admin CMS
/// never shows ads at all.
pub fn ads_for_path(
    ads: &[Advertisement],
    path: &str,
    per_slot: usize,
) -> Vec<Advertisement> {
    let path = path.trim();
    if AD_FREE_PATHS.iter().any(|prefix| path.starts_with(prefix)) {
        return Vec::new();
    }

    let active: Vec<&Advertisement> = ads.iter().filter(|ad| ad.is_active).collect();
    if active.is_empty() {
        return Vec::new();
    }

    let offset = (path_hash(path) as usize) % active.len();
    let take = per_slot.min(active.len());

    (0..take)
        .map(|i| active[(offset + i) % active.len()].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str, is_active: bool) -> Advertisement {
        Advertisement {
            id: id.to_string(),
            restaurant_name: format!("Restaurant {}", id),
            content: "Great food.".to_string(),
            offer: "10% off".to_string(),
            address: "1 Test St".to_string(),
            menu_link: "https://example.com/menu".to_string(),
            button_label: "View Menu".to_string(),
            is_active,
        }
    }

    /// Builds a path whose char-code sum lands on the wanted offset for the
    /// given active count.
    fn path_with_offset(offset: u32, active_count: u32) -> String {
        // '/' is 47; pad with SOH (code 1) until the sum mod count matches.
        let mut path = String::from("/");
        while path_hash(&path) % active_count != offset {
            path.push('\u{1}');
        }
        path
    }

    #[test]
    fn offset_two_of_five_returns_indices_two_three_four() {
        let ads: Vec<Advertisement> = (0..5).map(|i| ad(&i.to_string(), true)).collect();
        let path = path_with_offset(2, 5);

        let picked = ads_for_path(&ads, &path, 3);
        let ids: Vec<&str> = picked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
    }

    #[test]
    fn rotation_wraps_around_the_end() {
        let ads: Vec<Advertisement> = (0..5).map(|i| ad(&i.to_string(), true)).collect();
        let path = path_with_offset(4, 5);

        let picked = ads_for_path(&ads, &path, 3);
        let ids: Vec<&str> = picked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "0", "1"]);
    }

    #[test]
    fn inactive_ads_are_excluded_before_selection() {
        let ads = vec![ad("0", true), ad("1", false), ad("2", true), ad("3", false)];
        let picked = ads_for_path(&ads, "/", 3);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|a| a.is_active));
    }

    #[test]
    fn fewer_active_ads_than_slot_size_returns_them_all_once() {
        let ads = vec![ad("0", true), ad("1", true)];
        let picked = ads_for_path(&ads, "/about", 3);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn no_ads_on_the_cms_route() {
        let ads: Vec<Advertisement> = (0..5).map(|i| ad(&i.to_string(), true)).collect();
        assert!(ads_for_path(&ads, "/cms", 3).is_empty());
        assert!(ads_for_path(&ads, "/api/admin/stories", 3).is_empty());
    }

    #[test]
    fn empty_collection_yields_empty() {
        assert!(ads_for_path(&[], "/", 3).is_empty());
    }

    #[test]
    fn same_path_always_gets_the_same_ads() {
        let ads: Vec<Advertisement> = (0..7).map(|i| ad(&i.to_string(), true)).collect();
        let first = ads_for_path(&ads, "/contact", 3);
        let second = ads_for_path(&ads, "/contact", 3);
        let first_ids: Vec<&str> = first.iter().map(|a| a.id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
