use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Color token used when a record does not carry one.
pub const DEFAULT_COLOR: &str = "bg-blue-600";

/// Category a game falls back to when it lists none.
pub const FALLBACK_CATEGORY: &str = "popular";

/// Identifier of a game in the catalog.
///
/// Ids arrive either as JSON numbers or as strings (path segments, stored
/// records). Both forms are normalized on the way in, so `1`, `"1"` and
/// `" 1 "` all become `Numeric(1)` and compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameId {
    Numeric(u64),
    Text(String),
}

impl GameId {
    /// Normalize a raw textual id.
    ///
    /// Only canonical decimal strings (no sign, no leading zero, fits in
    /// `u64`) become `Numeric`; `"007"` stays text so it never collides
    /// with `7`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let canonical_digits = !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && (raw == "0" || !raw.starts_with('0'));
        if canonical_digits && let Ok(n) = raw.parse::<u64>() {
            return Self::Numeric(n);
        }
        Self::Text(raw.to_string())
    }

    /// True for an empty text id, which identifies nothing.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for GameId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<u64> for GameId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for GameId {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl Serialize for GameId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(n) => serializer.serialize_u64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for GameId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => Self::Numeric(n),
            RawId::Signed(n) => Self::Text(n.to_string()),
            RawId::Text(s) => Self::parse(&s),
        })
    }
}

/// A catalog entry. Records are immutable once the catalog is seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Playable URL or raw HTML/script fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub plays: u64,
    #[serde(default, rename = "new")]
    pub is_new: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "tags_from_list_or_csv",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Tags are stored either as a list or as one comma-separated string.
fn tags_from_list_or_csv<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        List(Vec<String>),
        Csv(String),
    }

    let tags = match Option::<RawTags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawTags::List(list)) => list,
        Some(RawTags::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

impl Game {
    pub fn new(id: impl Into<GameId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: default_color(),
            image: None,
            embed: None,
            category: Vec::new(),
            rating: 0.0,
            plays: 0,
            is_new: false,
            featured: false,
            description: None,
            tags: Vec::new(),
        }
    }

    /// Letter shown in place of the cover image when it is missing or fails
    /// to load.
    pub fn placeholder_letter(&self) -> char {
        self.title.trim().chars().next().unwrap_or('?')
    }

    pub fn primary_category(&self) -> &str {
        self.category
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    pub fn in_category(&self, slug: &str) -> bool {
        self.category.iter().any(|c| c == slug)
    }

    /// True when the record carries a non-blank embed payload.
    pub fn has_embed(&self) -> bool {
        self.embed.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}
