use serde::Serialize;

/// Display metadata for a listing slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

impl CategoryInfo {
    /// Every slug a listing page can be opened with.
    pub const ALL: &[CategoryInfo] = &[
        CategoryInfo::entry("action", "Action Games", "text-red-500"),
        CategoryInfo::entry("adventure", "Adventure Games", "text-green-500"),
        CategoryInfo::entry("clicker", "Clicker Games", "text-orange-500"),
        CategoryInfo::entry("io", ".io Games", "text-violet-500"),
        CategoryInfo {
            slug: "new",
            title: "New Games",
            description: "The latest games added to the catalog.",
            color: "text-green-400",
        },
        CategoryInfo {
            slug: "popular",
            title: "Popular Games",
            description: "The most popular games in the catalog.",
            color: "text-indigo-400",
        },
        CategoryInfo::entry("puzzle", "Puzzle Games", "text-purple-500"),
        CategoryInfo::entry("racing", "Racing Games", "text-green-500"),
        CategoryInfo::entry("shooting", "Shooting Games", "text-red-500"),
        CategoryInfo::entry("simulation", "Simulation Games", "text-cyan-500"),
        CategoryInfo::entry("sports", "Sports Games", "text-blue-500"),
        CategoryInfo::entry("strategy", "Strategy Games", "text-amber-500"),
        CategoryInfo {
            slug: "trending",
            title: "Trending Games",
            description: "The most played games right now.",
            color: "text-pink-500",
        },
    ];

    const fn entry(slug: &'static str, title: &'static str, color: &'static str) -> Self {
        Self {
            slug,
            title,
            description: "Browse the best games in this category.",
            color,
        }
    }

    pub fn lookup(slug: &str) -> Option<&'static CategoryInfo> {
        Self::ALL.iter().find(|c| c.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(CategoryInfo::lookup("io").unwrap().title, ".io Games");
        assert!(CategoryInfo::lookup("trending").is_some());
        assert!(CategoryInfo::lookup("IO").is_none());
        assert!(CategoryInfo::lookup("cooking").is_none());
    }

    #[test]
    fn slugs_are_unique() {
        for (i, a) in CategoryInfo::ALL.iter().enumerate() {
            for b in &CategoryInfo::ALL[i + 1..] {
                assert_ne!(a.slug, b.slug);
            }
        }
    }
}
