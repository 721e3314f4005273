use crate::game::{Game, GameId};
use crate::persistence::Persistence;

/// Storage key holding the JSON array of favorited games.
pub const FAVORITES_KEY: &str = "gamesFavorites";

/// Storage key holding the JSON array of recently played games.
pub const HISTORY_KEY: &str = "gamesHistory";

/// Number of entries kept in the play history.
pub const HISTORY_CAPACITY: usize = 20;

/// The user's favorites and play history for one browser session.
///
/// Built once per session and handed to every view by reference. Each
/// mutation is written through to `storage` immediately; a failed write is
/// logged and the in-memory state stays authoritative. Nothing reconciles
/// writes from other tabs sharing the same storage (last write wins).
pub struct Library<P: Persistence> {
    favorites: Vec<Game>,
    /// Most recent first, unique by id, at most `HISTORY_CAPACITY` long.
    history: Vec<Game>,
    storage: P,
}

impl<P: Persistence> Library<P> {
    /// Hydrate both collections from `storage`. Missing or unreadable data
    /// yields an empty collection, never an error.
    pub fn open(storage: P) -> Self {
        let mut favorites = hydrate(&storage, FAVORITES_KEY);
        dedup_by_id(&mut favorites);

        let mut history = hydrate(&storage, HISTORY_KEY);
        dedup_by_id(&mut history);
        history.truncate(HISTORY_CAPACITY);

        Self {
            favorites,
            history,
            storage,
        }
    }

    pub fn favorites(&self) -> &[Game] {
        &self.favorites
    }

    pub fn history(&self) -> &[Game] {
        &self.history
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    pub fn is_favorite(&self, id: &GameId) -> bool {
        self.favorites.iter().any(|g| &g.id == id)
    }

    /// Returns `false` when the game was already a favorite.
    pub fn add_favorite(&mut self, game: Game) -> bool {
        if self.is_favorite(&game.id) {
            return false;
        }
        self.favorites.push(game);
        self.flush_favorites();
        true
    }

    /// Returns `false` when no favorite had this id.
    pub fn remove_favorite(&mut self, id: &GameId) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|g| &g.id != id);
        if self.favorites.len() == before {
            return false;
        }
        self.flush_favorites();
        true
    }

    /// Flip membership and return whether the game is now a favorite.
    pub fn toggle_favorite(&mut self, game: Game) -> bool {
        if self.remove_favorite(&game.id) {
            false
        } else {
            self.add_favorite(game)
        }
    }

    /// Move (or insert) `game` to the front of the history.
    pub fn record_play(&mut self, game: Game) {
        self.history.retain(|g| g.id != game.id);
        self.history.insert(0, game);
        self.history.truncate(HISTORY_CAPACITY);
        self.flush_history();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.flush_history();
    }

    fn flush_favorites(&mut self) {
        flush(&mut self.storage, FAVORITES_KEY, &self.favorites);
    }

    fn flush_history(&mut self) {
        flush(&mut self.storage, HISTORY_KEY, &self.history);
    }
}

fn hydrate<P: Persistence>(storage: &P, key: &str) -> Vec<Game> {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, "Failed to load library data: {e}");
            return Vec::new();
        },
    };
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(key, "Discarding unreadable library data: {e}");
            return Vec::new();
        },
    };
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Game>(record) {
            Ok(game) => Some(game),
            Err(e) => {
                tracing::warn!(key, "Dropping unreadable library record: {e}");
                None
            },
        })
        .collect()
}

fn flush<P: Persistence>(storage: &mut P, key: &str, games: &[Game]) {
    let json = match serde_json::to_string(games) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, "Failed to serialize library data: {e}");
            return;
        },
    };
    if let Err(e) = storage.save(key, &json) {
        tracing::warn!(key, "Failed to save library data: {e}");
    }
}

/// Keep the first occurrence of each id.
fn dedup_by_id(games: &mut Vec<Game>) {
    let mut seen: Vec<GameId> = Vec::with_capacity(games.len());
    games.retain(|g| {
        if seen.contains(&g.id) {
            false
        } else {
            seen.push(g.id.clone());
            true
        }
    });
}
