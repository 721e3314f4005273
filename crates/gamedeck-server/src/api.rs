use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use gamedeck_core::catalog::{Catalog, Suggestion};
use gamedeck_core::category::CategoryInfo;
use gamedeck_core::game::{Game, GameId};

use crate::error::AppError;
use crate::state::AppState;

/// Number of popular games shown alongside search results.
pub const SEARCH_POPULAR_LIMIT: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct GameDetailResponse {
    pub game: Game,
    pub related: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub featured: Vec<Game>,
    #[serde(rename = "new")]
    pub new_games: Vec<Game>,
    pub popular: Vec<Game>,
    pub trending: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub category: &'static CategoryInfo,
    pub games: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub games: Vec<Game>,
    pub popular: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

fn owned(games: Vec<&Game>) -> Vec<Game> {
    games.into_iter().cloned().collect()
}

fn validate_query(state: &AppState, query: &str) -> Result<(), AppError> {
    let max = state.config.limits.max_query_len;
    if query.chars().count() > max {
        return Err(AppError::BadRequest(format!("query exceeds {max} chars")));
    }
    Ok(())
}

/// GET /api/v1/games
pub async fn list_games(State(state): State<AppState>) -> Json<GamesResponse> {
    Json(GamesResponse {
        games: state.catalog.all().to_vec(),
    })
}

/// GET /api/v1/games/{id}
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameDetailResponse>, AppError> {
    let catalog: &Catalog = &state.catalog;
    let game = catalog.require(&GameId::parse(&id))?;
    Ok(Json(GameDetailResponse {
        game: game.clone(),
        related: owned(catalog.related(game)),
    }))
}

/// GET /api/v1/home
pub async fn home(State(state): State<AppState>) -> Json<HomeResponse> {
    let sections = state.catalog.home();
    Json(HomeResponse {
        featured: owned(sections.featured),
        new_games: owned(sections.new_games),
        popular: owned(sections.popular),
        trending: owned(sections.trending),
    })
}

/// GET /api/v1/collections/{slug}
pub async fn get_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CollectionResponse>, AppError> {
    let collection = state.catalog.collection(&slug)?;
    Ok(Json(CollectionResponse {
        category: collection.category,
        games: owned(collection.games),
    }))
}

/// GET /api/v1/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    validate_query(&state, &params.q)?;
    let mut popular = state.catalog.popular();
    popular.truncate(SEARCH_POPULAR_LIMIT);
    Ok(Json(SearchResponse {
        games: owned(state.catalog.search(&params.q)),
        popular: owned(popular),
        query: params.q,
    }))
}

/// GET /api/v1/search/suggestions?q=
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    validate_query(&state, &params.q)?;
    Ok(Json(SuggestionsResponse {
        suggestions: state.catalog.suggestions(&params.q),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitsConfig, ServerConfig};
    use gamedeck_core::test_helpers::{make_catalog, make_game};

    fn seeded_state() -> AppState {
        AppState::new(ServerConfig::default())
    }

    fn params(q: &str) -> Query<SearchParams> {
        Query(SearchParams { q: q.to_string() })
    }

    #[tokio::test]
    async fn list_returns_whole_catalog() {
        let state = AppState::with_catalog(ServerConfig::default(), make_catalog(7));
        let Json(resp) = list_games(State(state)).await;
        assert_eq!(resp.games.len(), 7);
    }

    #[tokio::test]
    async fn get_game_accepts_text_ids() {
        let Json(resp) = get_game(State(seeded_state()), Path("4".to_string()))
            .await
            .unwrap();
        assert_eq!(resp.game.title, "Bloxd.io");
        assert!(resp.related.iter().all(|g| g.id != resp.game.id));
        assert!(resp.related.len() <= 6);
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let err = get_game(State(seeded_state()), Path("999".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn collection_lookup() {
        let Json(resp) = get_collection(State(seeded_state()), Path("trending".to_string()))
            .await
            .unwrap();
        assert_eq!(resp.category.slug, "trending");
        assert_eq!(resp.games.len(), 15);

        let err = get_collection(State(seeded_state()), Path("cooking".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_includes_popular_shortlist() {
        let Json(resp) = search(State(seeded_state()), params("zombie")).await.unwrap();
        assert_eq!(resp.query, "zombie");
        assert_eq!(resp.games.len(), 1);
        assert_eq!(resp.popular.len(), SEARCH_POPULAR_LIMIT);
    }

    #[tokio::test]
    async fn empty_search_returns_no_games() {
        let Json(resp) = search(State(seeded_state()), params("")).await.unwrap();
        assert!(resp.games.is_empty());
        assert!(!resp.popular.is_empty());
    }

    #[tokio::test]
    async fn overlong_query_rejected() {
        let config = ServerConfig {
            limits: LimitsConfig {
                max_query_len: 4,
                ..LimitsConfig::default()
            },
            ..ServerConfig::default()
        };
        let state = AppState::new(config);
        let err = suggestions(State(state), params("zombies")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn suggestions_respect_minimum_length() {
        let catalog = Catalog::new(vec![
            make_game(1, "Alpha Strike", &["action"], 10),
            make_game(2, "Alpine Ski", &[], 5),
        ]);
        let state = AppState::with_catalog(ServerConfig::default(), catalog);

        let Json(short) = suggestions(State(state.clone()), params("a")).await.unwrap();
        assert!(short.suggestions.is_empty());

        let Json(resp) = suggestions(State(state), params("alp")).await.unwrap();
        let categories: Vec<_> = resp.suggestions.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["action", "game"]);
    }

    #[tokio::test]
    async fn home_uses_new_key() {
        let Json(resp) = home(State(seeded_state())).await;
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["new"].is_array());
        assert_eq!(json["featured"].as_array().unwrap().len(), 4);
    }
}
