use gamedeck_core::catalog::Catalog;
use gamedeck_core::embed::{EmbedHost, EmbedPlatform};
use gamedeck_core::game::{Game, GameId};
use gamedeck_core::library::Library;
use gamedeck_core::persistence::Persistence;

/// Path prefix of a player page, e.g. `/games/12`.
pub const GAME_PATH_PREFIX: &str = "/games/";

/// Extract the raw game id from a player page path.
pub fn game_id_from_path(path: &str) -> Option<&str> {
    let id = path.strip_prefix(GAME_PATH_PREFIX)?.trim_end_matches('/');
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

/// Session state for one page load.
pub struct App<P: EmbedPlatform> {
    pub catalog: Catalog,
    pub library: Library<Box<dyn Persistence>>,
    pub host: EmbedHost<P>,
    pub current: Option<GameId>,
    /// Set when the last requested id was not in the catalog.
    pub not_found: bool,
}

impl<P: EmbedPlatform> App<P> {
    pub fn new(catalog: Catalog, storage: Box<dyn Persistence>, platform: P) -> Self {
        Self {
            catalog,
            library: Library::open(storage),
            host: EmbedHost::new(platform),
            current: None,
            not_found: false,
        }
    }

    pub fn current_game(&self) -> Option<&Game> {
        self.current.as_ref().and_then(|id| self.catalog.get(id))
    }

    /// Open the player for `raw_id`, recording the play. Unknown ids hide
    /// the player and raise the not-found flag.
    pub fn open_game(&mut self, raw_id: &str) {
        let id = GameId::parse(raw_id);
        match self.catalog.get(&id).cloned() {
            Some(game) => {
                self.host.mount(Some(&game));
                self.library.record_play(game);
                self.current = Some(id);
                self.not_found = false;
            },
            None => {
                self.host.mount(None);
                self.current = None;
                self.not_found = true;
            },
        }
    }

    pub fn close_game(&mut self) {
        self.host.mount(None);
        self.current = None;
        self.not_found = false;
    }

    /// Flip favorite membership and return the new state. A stored favorite
    /// that has since left the catalog can still be removed by id.
    pub fn toggle_favorite(&mut self, raw_id: &str) -> bool {
        let id = GameId::parse(raw_id);
        match self.catalog.get(&id) {
            Some(game) => self.library.toggle_favorite(game.clone()),
            None => {
                self.library.remove_favorite(&id);
                false
            },
        }
    }

    pub fn clear_history(&mut self) {
        self.library.clear_history();
    }

    pub fn toggle_fullscreen(&mut self) {
        self.host.toggle_fullscreen();
    }

    pub fn on_fullscreen_change(&mut self) {
        self.host.on_fullscreen_change();
    }
}
