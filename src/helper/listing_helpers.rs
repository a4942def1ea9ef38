use crate::models::{Category, Story, StorySummary};

/// Category selector as it arrives from the query string. `All` passes
/// everything; a label that is not in the fixed set matches nothing (an empty
/// page, not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    One(Category),
    Unknown,
}

impl CategoryFilter {
    pub fn parse(raw: Option<&str>) -> CategoryFilter {
        match raw.map(str::trim) {
            None | Some("") | Some("All") => CategoryFilter::All,
            Some(label) => match Category::from_label(label) {
                Some(category) => CategoryFilter::One(category),
                None => CategoryFilter::Unknown,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Recent,
    Views,
    Likes,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> SortOrder {
        match raw.map(str::trim) {
            Some("views") => SortOrder::Views,
            Some("likes") => SortOrder::Likes,
            _ => SortOrder::Recent,
        }
    }
}

pub fn filter_by_category(stories: Vec<Story>, filter: CategoryFilter) -> Vec<Story> {
    match filter {
        CategoryFilter::All => stories,
        CategoryFilter::One(category) => stories
            .into_iter()
            .filter(|s| s.metadata.category == category)
            .collect(),
        CategoryFilter::Unknown => Vec::new(),
    }
}

/// Case-insensitive substring match over title, derived excerpt, and content.
/// An empty or whitespace query matches everything.
pub fn search(stories: Vec<Story>, query: &str) -> Vec<Story> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return stories;
    }
    stories
        .into_iter()
        .filter(|s| {
            s.metadata.title.to_lowercase().contains(&needle)
                || s.excerpt().to_lowercase().contains(&needle)
                || s.content.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Newest first. Records with unparseable timestamps decoded as the epoch end
/// up last. Stable, so re-sorting an already sorted list is a no-op.
pub fn sort_by_recency(mut stories: Vec<Story>) -> Vec<Story> {
    stories.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
    stories
}

/// Most viewed first; ties keep the incoming collection order.
pub fn sort_by_views(mut stories: Vec<Story>) -> Vec<Story> {
    stories.sort_by(|a, b| b.metadata.views.cmp(&a.metadata.views));
    stories
}

pub fn sort_by_likes(mut stories: Vec<Story>) -> Vec<Story> {
    stories.sort_by(|a, b| b.metadata.likes.cmp(&a.metadata.likes));
    stories
}

pub fn apply_sort(stories: Vec<Story>, order: SortOrder) -> Vec<Story> {
    match order {
        SortOrder::Recent => sort_by_recency(stories),
        SortOrder::Views => sort_by_views(stories),
        SortOrder::Likes => sort_by_likes(stories),
    }
}

/// Converts to summaries and flags the first `free_limit` entries of the
/// collection order as readable without an account.
pub fn summarize_with_free_tier(stories: &[Story], free_limit: usize) -> Vec<StorySummary> {
    stories
        .iter()
        .enumerate()
        .map(|(index, story)| {
            let mut summary = story.summary();
            summary.free = index < free_limit;
            summary
        })
        .collect()
}

/// Whether a particular story is readable by a guest: it must sit inside the
/// free window of the collection order.
pub fn is_free_for_guests(stories: &[Story], story_id: &str, free_limit: usize) -> bool {
    stories
        .iter()
        .position(|s| s.id == story_id)
        .map(|index| index < free_limit)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoryMetadata, StoryStatus};
    use chrono::{DateTime, TimeZone, Utc};

    fn story(id: &str, category: Category, created_at: DateTime<Utc>) -> Story {
        Story {
            id: id.to_string(),
            metadata: StoryMetadata {
                title: format!("Story {}", id),
                excerpt: None,
                created_at,
                views: 0,
                likes: 0,
                category,
                status: StoryStatus::Approved,
                image_url: None,
                video_url: None,
                external_link: None,
                author_name: None,
                author_email: None,
            },
            content: format!("Content of story {}", id),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn ids(stories: &[Story]) -> Vec<&str> {
        stories.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn category_filter_is_idempotent() {
        let stories = vec![
            story("1", Category::RoadTestTips, day(2024, 1, 1)),
            story("2", Category::Checklists, day(2024, 2, 1)),
            story("3", Category::RoadTestTips, day(2024, 3, 1)),
        ];
        let filter = CategoryFilter::One(Category::RoadTestTips);

        let once = filter_by_category(stories, filter);
        let twice = filter_by_category(once.clone(), filter);
        assert_eq!(ids(&once), vec!["1", "3"]);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn all_filter_passes_everything() {
        let stories = vec![
            story("1", Category::Other, day(2024, 1, 1)),
            story("2", Category::LessonPlans, day(2024, 2, 1)),
        ];
        assert_eq!(filter_by_category(stories, CategoryFilter::All).len(), 2);
    }

    #[test]
    fn unknown_category_yields_empty_not_error() {
        let stories = vec![story("1", Category::Other, day(2024, 1, 1))];
        let filter = CategoryFilter::parse(Some("Knitting"));
        assert_eq!(filter, CategoryFilter::Unknown);
        assert!(filter_by_category(stories, filter).is_empty());
    }

    #[test]
    fn empty_collection_filters_to_empty() {
        assert!(filter_by_category(Vec::new(), CategoryFilter::All).is_empty());
        assert!(search(Vec::new(), "anything").is_empty());
        assert!(sort_by_recency(Vec::new()).is_empty());
    }

    #[test]
    fn recency_sort_is_idempotent_and_orders_newest_first() {
        let stories = vec![
            story("1", Category::RoadTestTips, day(2024, 1, 1)),
            story("2", Category::RoadTestTips, day(2024, 6, 1)),
        ];
        let sorted = sort_by_recency(stories);
        assert_eq!(ids(&sorted), vec!["2", "1"]);
        let resorted = sort_by_recency(sorted.clone());
        assert_eq!(ids(&sorted), ids(&resorted));
    }

    #[test]
    fn invalid_timestamps_sort_as_epoch_earliest() {
        let stories = vec![
            story("old", Category::Other, DateTime::<Utc>::UNIX_EPOCH),
            story("new", Category::Other, day(2024, 6, 1)),
        ];
        assert_eq!(ids(&sort_by_recency(stories)), vec!["new", "old"]);
    }

    #[test]
    fn popularity_ties_keep_collection_order() {
        let mut a = story("a", Category::Other, day(2024, 1, 1));
        let mut b = story("b", Category::Other, day(2024, 1, 2));
        let mut c = story("c", Category::Other, day(2024, 1, 3));
        a.metadata.views = 5;
        b.metadata.views = 9;
        c.metadata.views = 5;

        let sorted = sort_by_views(vec![a, b, c]);
        assert_eq!(ids(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_search_matches_everything() {
        let stories = vec![
            story("1", Category::Other, day(2024, 1, 1)),
            story("2", Category::Other, day(2024, 2, 1)),
        ];
        let unfiltered = stories.clone();
        assert_eq!(ids(&search(stories, "   ")), ids(&unfiltered));
    }

    #[test]
    fn search_is_case_insensitive_over_title_excerpt_and_content() {
        let mut with_title = story("1", Category::Other, day(2024, 1, 1));
        with_title.metadata.title = "Parallel Parking Secrets".to_string();
        let mut with_excerpt = story("2", Category::Other, day(2024, 1, 1));
        with_excerpt.metadata.excerpt = Some("A tale about PARKING".to_string());
        let mut with_content = story("3", Category::Other, day(2024, 1, 1));
        with_content.content = "we practiced parking all day".to_string();
        let unrelated = story("4", Category::Other, day(2024, 1, 1));

        let found = search(vec![with_title, with_excerpt, with_content, unrelated], "parking");
        assert_eq!(ids(&found), vec!["1", "2", "3"]);
    }

    #[test]
    fn free_tier_marks_first_n_stories() {
        let stories: Vec<Story> = (0..6)
            .map(|i| story(&i.to_string(), Category::Other, day(2024, 1, 1 + i as u32)))
            .collect();

        let summaries = summarize_with_free_tier(&stories, 4);
        let free: Vec<bool> = summaries.iter().map(|s| s.free).collect();
        assert_eq!(free, vec![true, true, true, true, false, false]);

        assert!(is_free_for_guests(&stories, "3", 4));
        assert!(!is_free_for_guests(&stories, "4", 4));
        assert!(!is_free_for_guests(&stories, "missing", 4));
    }

    #[test]
    fn excerpt_derives_from_content_when_absent() {
        let mut long = story("1", Category::Other, day(2024, 1, 1));
        long.content = "x".repeat(400);
        let derived = long.excerpt();
        assert_eq!(derived.chars().count(), crate::models::EXCERPT_CHARS + 1);
        assert!(derived.ends_with('…'));

        let mut explicit = story("2", Category::Other, day(2024, 1, 1));
        explicit.metadata.excerpt = Some("Short and sweet.".to_string());
        assert_eq!(explicit.excerpt(), "Short and sweet.");
    }
}
