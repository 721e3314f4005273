use serde::{Deserialize, Serialize};

use crate::category::CategoryInfo;
use crate::game::{Game, GameId};

/// Maximum number of games returned by [`Catalog::trending`].
pub const TRENDING_LIMIT: usize = 15;

/// Maximum number of games returned by [`Catalog::related`].
pub const RELATED_LIMIT: usize = 6;

/// Maximum number of entries returned by [`Catalog::suggestions`].
pub const SUGGESTION_LIMIT: usize = 8;

/// Queries shorter than this (in characters) produce no suggestions.
pub const MIN_SUGGESTION_QUERY_CHARS: usize = 2;

/// Per-section cap for the home grid.
pub const HOME_SECTION_LIMIT: usize = 10;

/// Category reported for a suggestion whose game lists none.
const SUGGESTION_FALLBACK_CATEGORY: &str = "game";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownGame(GameId),
    UnknownCategory(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownGame(id) => write!(f, "game {id} not found"),
            Self::UnknownCategory(slug) => write!(f, "category {slug} not found"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Compact record served to the search box while the user types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: GameId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: String,
}

/// A resolved listing page: its display metadata plus matching games.
#[derive(Debug, Serialize)]
pub struct Collection<'a> {
    pub category: &'static CategoryInfo,
    pub games: Vec<&'a Game>,
}

/// Sections of the home grid.
#[derive(Debug, Serialize)]
pub struct HomeSections<'a> {
    pub featured: Vec<&'a Game>,
    #[serde(rename = "new")]
    pub new_games: Vec<&'a Game>,
    pub popular: Vec<&'a Game>,
    pub trending: Vec<&'a Game>,
}

/// The static, read-only game catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<Game>,
}

impl Catalog {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// Catalog seeded with the built-in dataset.
    pub fn seeded() -> Self {
        Self::new(seed_games())
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn all(&self) -> &[Game] {
        &self.games
    }

    pub fn get(&self, id: &GameId) -> Option<&Game> {
        self.games.iter().find(|g| &g.id == id)
    }

    /// Like [`Catalog::get`], reporting a miss as an error.
    pub fn require(&self, id: &GameId) -> Result<&Game, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownGame(id.clone()))
    }

    pub fn by_category(&self, slug: &str) -> Vec<&Game> {
        self.games.iter().filter(|g| g.in_category(slug)).collect()
    }

    pub fn featured(&self) -> Vec<&Game> {
        self.games.iter().filter(|g| g.featured).collect()
    }

    pub fn new_games(&self) -> Vec<&Game> {
        self.games.iter().filter(|g| g.is_new).collect()
    }

    pub fn popular(&self) -> Vec<&Game> {
        self.by_category("popular")
    }

    pub fn embedded(&self) -> Vec<&Game> {
        self.games.iter().filter(|g| g.has_embed()).collect()
    }

    /// Most played games, descending. Ties keep catalog order.
    pub fn trending(&self) -> Vec<&Game> {
        let mut games: Vec<&Game> = self.games.iter().collect();
        games.sort_by(|a, b| b.plays.cmp(&a.plays));
        games.truncate(TRENDING_LIMIT);
        games
    }

    /// Case-insensitive substring match over title, description and tags.
    pub fn search(&self, query: &str) -> Vec<&Game> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.games
            .iter()
            .filter(|g| matches_query(g, &needle))
            .collect()
    }

    /// Other games sharing the primary category of `game`.
    pub fn related(&self, game: &Game) -> Vec<&Game> {
        let primary = game.primary_category();
        self.games
            .iter()
            .filter(|g| g.id != game.id && g.in_category(primary))
            .take(RELATED_LIMIT)
            .collect()
    }

    /// Resolve a listing slug. `new`, `popular` and `trending` map to their
    /// dedicated queries; other known slugs filter by category membership.
    pub fn collection(&self, slug: &str) -> Result<Collection<'_>, CatalogError> {
        let category = CategoryInfo::lookup(slug)
            .ok_or_else(|| CatalogError::UnknownCategory(slug.to_string()))?;
        let games = match category.slug {
            "new" => self.new_games(),
            "popular" => self.popular(),
            "trending" => self.trending(),
            other => self.by_category(other),
        };
        Ok(Collection { category, games })
    }

    pub fn suggestions(&self, query: &str) -> Vec<Suggestion> {
        if query.trim().chars().count() < MIN_SUGGESTION_QUERY_CHARS {
            return Vec::new();
        }
        self.search(query)
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|g| Suggestion {
                id: g.id.clone(),
                title: g.title.clone(),
                image: g.image.clone(),
                category: g
                    .category
                    .first()
                    .cloned()
                    .unwrap_or_else(|| SUGGESTION_FALLBACK_CATEGORY.to_string()),
            })
            .collect()
    }

    pub fn home(&self) -> HomeSections<'_> {
        HomeSections {
            featured: capped(self.featured()),
            new_games: capped(self.new_games()),
            popular: capped(self.popular()),
            trending: self.trending(),
        }
    }
}

fn capped(mut games: Vec<&Game>) -> Vec<&Game> {
    games.truncate(HOME_SECTION_LIMIT);
    games
}

fn matches_query(game: &Game, needle: &str) -> bool {
    game.title.to_lowercase().contains(needle)
        || game
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || game.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// One row of the built-in catalog.
struct Seed {
    id: u64,
    title: &'static str,
    slug: &'static str,
    color: &'static str,
    categories: &'static [&'static str],
    rating: f32,
    plays: u64,
    description: &'static str,
    featured: bool,
    is_new: bool,
    tags: &'static [&'static str],
    embed: Option<&'static str>,
}

impl Seed {
    const BLANK: Seed = Seed {
        id: 0,
        title: "",
        slug: "",
        color: "",
        categories: &[],
        rating: 0.0,
        plays: 0,
        description: "",
        featured: false,
        is_new: false,
        tags: &[],
        embed: None,
    };

    fn to_game(&self) -> Game {
        let mut game = Game::new(self.id, self.title);
        game.image = Some(format!("/images/{}.jpg", self.slug));
        game.color = self.color.to_string();
        game.category = self.categories.iter().map(|c| c.to_string()).collect();
        game.tags = self.tags.iter().map(|t| t.to_string()).collect();
        game.rating = self.rating;
        game.plays = self.plays;
        game.description = Some(self.description.to_string());
        game.featured = self.featured;
        game.is_new = self.is_new;
        game.embed = self.embed.map(str::to_string);
        game
    }
}

const PIXEL_DEFENDER_EMBED: &str = "<div><canvas id=\"pixel-defender\"></canvas></div>\
    <script src=\"https://games.gamedeck.example/pixel-defender/loader.js\"></script>";

const SEEDS: &[Seed] = &[
    Seed {
        id: 1,
        title: "WorldGuessr",
        slug: "worldguessr",
        color: "bg-blue-600",
        categories: &["popular", "puzzle", "adventure"],
        rating: 4.8,
        plays: 125_000,
        description: "Test your geography knowledge by guessing locations around the world.",
        featured: true,
        tags: &["geography", "multiplayer"],
        ..Seed::BLANK
    },
    Seed {
        id: 2,
        title: "PolyTrack",
        slug: "polytrack",
        color: "bg-green-600",
        categories: &["popular", "racing", "action"],
        rating: 4.6,
        plays: 98_000,
        description: "Race through dynamic polygonal tracks in this fast-paced racing game.",
        featured: true,
        ..Seed::BLANK
    },
    Seed {
        id: 3,
        title: "BlueRun",
        slug: "bluerun",
        color: "bg-purple-600",
        categories: &["popular", "adventure", "action"],
        rating: 4.7,
        plays: 110_000,
        description: "Navigate through challenging obstacles in this endless runner.",
        featured: true,
        ..Seed::BLANK
    },
    Seed {
        id: 4,
        title: "Bloxd.io",
        slug: "bloxdio",
        color: "bg-red-600",
        categories: &["popular", "io", "strategy"],
        rating: 4.9,
        plays: 150_000,
        description: "Build, compete, and survive in this multiplayer block-building game.",
        featured: true,
        tags: &["multiplayer", "building"],
        ..Seed::BLANK
    },
    Seed {
        id: 5,
        title: "RPG Rush",
        slug: "rpgrush",
        color: "bg-yellow-600",
        categories: &["popular", "adventure", "action"],
        rating: 4.5,
        plays: 85_000,
        description: "Quick RPG adventures with fast-paced combat and progression.",
        ..Seed::BLANK
    },
    Seed {
        id: 6,
        title: "DragonFlight",
        slug: "dragonflight",
        color: "bg-indigo-600",
        categories: &["action", "adventure", "shooting"],
        rating: 4.3,
        plays: 75_000,
        description: "Soar through the skies on a dragon and battle enemies.",
        ..Seed::BLANK
    },
    Seed {
        id: 7,
        title: "BubbleRoll",
        slug: "bubbleroll",
        color: "bg-pink-600",
        categories: &["puzzle", "casual"],
        rating: 4.2,
        plays: 65_000,
        description: "Match and pop bubbles in this addictive puzzle game.",
        ..Seed::BLANK
    },
    Seed {
        id: 8,
        title: "Empire Clash",
        slug: "empireclash",
        color: "bg-teal-600",
        categories: &["strategy", "simulation"],
        rating: 4.4,
        plays: 80_000,
        description: "Build your empire and clash with rivals in this strategy game.",
        ..Seed::BLANK
    },
    Seed {
        id: 9,
        title: "OceanDive",
        slug: "oceandive",
        color: "bg-cyan-600",
        categories: &["adventure", "simulation"],
        rating: 4.1,
        plays: 60_000,
        description: "Explore the depths of the ocean in this immersive diving simulator.",
        ..Seed::BLANK
    },
    Seed {
        id: 10,
        title: "SpeedClick",
        slug: "speedclick",
        color: "bg-orange-600",
        categories: &["clicker", "casual"],
        rating: 4.0,
        plays: 50_000,
        description: "Test your clicking speed and reflexes.",
        is_new: true,
        ..Seed::BLANK
    },
    Seed {
        id: 11,
        title: "TowerDefense",
        slug: "towerdefense",
        color: "bg-lime-600",
        categories: &["strategy", "action"],
        rating: 4.7,
        plays: 90_000,
        description: "Defend your territory by strategically placing towers.",
        is_new: true,
        ..Seed::BLANK
    },
    Seed {
        id: 12,
        title: "ZombieCrush",
        slug: "zombiecrush",
        color: "bg-amber-600",
        categories: &["action", "shooting"],
        rating: 4.6,
        plays: 85_000,
        description: "Survive the zombie apocalypse in this action-packed shooter.",
        is_new: true,
        tags: &["zombie", "shooter"],
        ..Seed::BLANK
    },
    Seed {
        id: 13,
        title: "PuzzleMaster",
        slug: "puzzlemaster",
        color: "bg-emerald-600",
        categories: &["puzzle"],
        rating: 4.5,
        plays: 70_000,
        description: "Challenge your mind with intricate puzzles.",
        is_new: true,
        ..Seed::BLANK
    },
    Seed {
        id: 14,
        title: "SpaceShooter",
        slug: "spaceshooter",
        color: "bg-violet-600",
        categories: &["shooting", "action"],
        rating: 4.3,
        plays: 65_000,
        description: "Defend the galaxy in this classic space shooter.",
        is_new: true,
        tags: &["space", "retro"],
        ..Seed::BLANK
    },
    Seed {
        id: 15,
        title: "RacingStars",
        slug: "racingstars",
        color: "bg-rose-600",
        categories: &["racing", "sports"],
        rating: 4.4,
        plays: 75_000,
        description: "Compete in high-speed races against other players.",
        ..Seed::BLANK
    },
    Seed {
        id: 16,
        title: "Slope Rider",
        slug: "sloperider",
        color: "bg-sky-600",
        categories: &["action", "racing"],
        rating: 4.2,
        plays: 40_000,
        description: "Steer a rolling ball down an endless neon slope.",
        tags: &["ball", "endless"],
        embed: Some("https://games.gamedeck.example/slope-rider/index.html"),
        ..Seed::BLANK
    },
    Seed {
        id: 17,
        title: "Pixel Defender",
        slug: "pixeldefender",
        color: "bg-fuchsia-600",
        categories: &["shooting", "casual"],
        rating: 3.9,
        plays: 22_000,
        description: "Hold the line against waves of pixel invaders.",
        embed: Some(PIXEL_DEFENDER_EMBED),
        ..Seed::BLANK
    },
];

fn seed_games() -> Vec<Game> {
    SEEDS.iter().map(Seed::to_game).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with_plays(id: u64, plays: u64) -> Game {
        let mut g = Game::new(id, format!("Game {id}"));
        g.plays = plays;
        g
    }

    #[test]
    fn seeded_catalog_ids_are_unique() {
        let catalog = Catalog::seeded();
        for (i, a) in catalog.all().iter().enumerate() {
            for b in &catalog.all()[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate id {}", a.id);
            }
        }
    }

    #[test]
    fn get_normalizes_ids() {
        let catalog = Catalog::seeded();
        let by_text = catalog.get(&GameId::parse("4")).unwrap();
        assert_eq!(by_text.title, "Bloxd.io");
        assert!(catalog.get(&GameId::parse("404")).is_none());
        assert_eq!(
            catalog.require(&GameId::parse("nope")).unwrap_err(),
            CatalogError::UnknownGame(GameId::parse("nope"))
        );
    }

    #[test]
    fn trending_returns_fifteen_by_plays_desc() {
        let games: Vec<Game> = (1..=20).map(|i| game_with_plays(i, (i * 37) % 23)).collect();
        let catalog = Catalog::new(games);
        let trending = catalog.trending();
        assert_eq!(trending.len(), 15);
        for pair in trending.windows(2) {
            assert!(pair[0].plays >= pair[1].plays);
        }
    }

    #[test]
    fn trending_keeps_catalog_order_on_ties() {
        let catalog = Catalog::new(vec![
            game_with_plays(1, 5),
            game_with_plays(2, 9),
            game_with_plays(3, 5),
        ]);
        let ids: Vec<_> = catalog.trending().iter().map(|g| g.id.clone()).collect();
        assert_eq!(
            ids,
            vec![GameId::Numeric(2), GameId::Numeric(1), GameId::Numeric(3)]
        );
    }

    #[test]
    fn search_matches_each_game_once() {
        let mut zombie = Game::new(1u64, "Zombie Apocalypse");
        zombie.tags = vec!["zombie".to_string()];
        zombie.description = Some("Zombies everywhere".to_string());
        let catalog = Catalog::new(vec![zombie, Game::new(2u64, "PolyTrack")]);

        let hits = catalog.search("zombie");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Zombie Apocalypse");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let catalog = Catalog::seeded();
        let titles: Vec<_> = catalog.search("ZOMBIE").iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["ZombieCrush"]);

        let by_tag: Vec<_> = catalog
            .search("Multiplayer")
            .iter()
            .map(|g| g.title.as_str())
            .collect();
        assert!(by_tag.contains(&"WorldGuessr"));
        assert!(by_tag.contains(&"Bloxd.io"));

        assert!(catalog.search("   ").is_empty());
        assert!(catalog.search("no such game").is_empty());
    }

    #[test]
    fn flag_and_category_filters() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.featured().len(), 4);
        assert!(catalog.new_games().iter().all(|g| g.is_new));
        assert!(catalog.popular().iter().all(|g| g.in_category("popular")));
        assert!(catalog.by_category("io").iter().any(|g| g.title == "Bloxd.io"));
        assert!(catalog.by_category("cooking").is_empty());
        assert_eq!(catalog.embedded().len(), 2);
    }

    #[test]
    fn related_excludes_self_and_caps() {
        let catalog = Catalog::seeded();
        let game = catalog.get(&GameId::Numeric(1)).unwrap();
        let related = catalog.related(game);
        assert!(related.len() <= RELATED_LIMIT);
        assert!(related.iter().all(|g| g.id != game.id));
        assert!(related.iter().all(|g| g.in_category("popular")));
    }

    #[test]
    fn uncategorized_game_relates_to_popular() {
        let catalog = Catalog::seeded();
        let loner = Game::new(999u64, "Loner");
        let related = catalog.related(&loner);
        assert!(!related.is_empty());
        assert!(related.iter().all(|g| g.in_category("popular")));
    }

    #[test]
    fn collection_resolves_special_slugs() {
        let catalog = Catalog::seeded();
        let trending = catalog.collection("trending").unwrap();
        assert_eq!(trending.games.len(), TRENDING_LIMIT);
        assert_eq!(trending.games[0].title, "Bloxd.io");

        let new = catalog.collection("new").unwrap();
        assert!(new.games.iter().all(|g| g.is_new));

        let puzzle = catalog.collection("puzzle").unwrap();
        assert_eq!(puzzle.category.slug, "puzzle");
        assert!(puzzle.games.iter().all(|g| g.in_category("puzzle")));

        assert_eq!(
            catalog.collection("cooking").unwrap_err(),
            CatalogError::UnknownCategory("cooking".to_string())
        );
    }

    #[test]
    fn suggestions_need_two_chars_and_cap_at_eight() {
        let catalog = Catalog::seeded();
        assert!(catalog.suggestions("a").is_empty());
        assert!(catalog.suggestions(" a ").is_empty());

        let many = catalog.suggestions("in");
        assert!(many.len() <= SUGGESTION_LIMIT);
        assert!(!many.is_empty());

        let zombie = catalog.suggestions("zo");
        assert_eq!(zombie.len(), 1);
        assert_eq!(zombie[0].category, "action");
    }

    #[test]
    fn suggestion_category_falls_back_to_game() {
        let catalog = Catalog::new(vec![Game::new(1u64, "Chess")]);
        let s = catalog.suggestions("chess");
        assert_eq!(s[0].category, "game");
        assert!(s[0].image.is_none());
    }

    #[test]
    fn home_sections_are_capped() {
        let catalog = Catalog::seeded();
        let home = catalog.home();
        assert!(home.featured.len() <= HOME_SECTION_LIMIT);
        assert!(home.new_games.len() <= HOME_SECTION_LIMIT);
        assert!(home.popular.len() <= HOME_SECTION_LIMIT);
        assert_eq!(home.trending.len(), TRENDING_LIMIT);
        let json = serde_json::to_value(&home).unwrap();
        assert!(json.get("new").is_some());
    }
}
