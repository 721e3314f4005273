use gamedeck_core::embed::EmbedPlatform;
use gamedeck_core::game::Game;

use crate::app::App;

#[cfg(target_family = "wasm")]
use wasm_bindgen::JsCast;

#[cfg(target_family = "wasm")]
use crate::dom::DomPlatform;

/// Card data for the favorites/history rails. `letter` is the placeholder
/// shown when the cover image fails to load.
fn card(game: &Game) -> serde_json::Value {
    serde_json::json!({
        "id": game.id,
        "title": game.title,
        "image": game.image,
        "color": game.color,
        "letter": game.placeholder_letter().to_string(),
    })
}

/// Snapshot of everything the page renders from.
pub fn build_ui_state<P: EmbedPlatform>(app: &App<P>) -> serde_json::Value {
    let current = app.current_game();
    serde_json::json!({
        "favorites": app.library.favorites().iter().map(card).collect::<Vec<_>>(),
        "history": app.library.history().iter().map(card).collect::<Vec<_>>(),
        "current": current.map(|g| serde_json::json!({
            "game": g,
            "letter": g.placeholder_letter().to_string(),
            "isFavorite": app.library.is_favorite(&g.id),
            "related": app.catalog.related(g).into_iter().map(card).collect::<Vec<_>>(),
        })),
        "embed": app.host.view(),
        "fullscreen": app.host.is_fullscreen(),
        "notFound": app.not_found,
    })
}

/// Push UI state to JavaScript after every change.
pub fn push_ui_state<P: EmbedPlatform>(app: &App<P>) {
    #[cfg(target_family = "wasm")]
    {
        match serde_json::to_string(&build_ui_state(app)) {
            Ok(json_str) => call_window_fn("_gamedeckUpdate", &json_str),
            Err(e) => crate::diag::console_warn!("Failed to serialize UI state: {e}"),
        }
    }
    #[cfg(not(target_family = "wasm"))]
    let _ = app;
}

/// Call a window function with a parsed JSON argument, without eval().
#[cfg(target_family = "wasm")]
fn call_window_fn(name: &str, json_arg: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(val) = js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str(name)) else {
        return;
    };
    if !val.is_function() {
        return;
    }
    let func: js_sys::Function = val.unchecked_into();
    let parsed = match js_sys::JSON::parse(json_arg) {
        Ok(parsed) => parsed,
        Err(e) => {
            crate::diag::console_warn!("JSON parse failed for {name}: {e:?}");
            return;
        },
    };
    if let Err(e) = func.call1(&wasm_bindgen::JsValue::NULL, &parsed) {
        crate::diag::console_warn!("JS bridge {name} failed: {e:?}");
    }
}

#[cfg(target_family = "wasm")]
fn set_window_fn(window: &web_sys::Window, name: &str, func: &wasm_bindgen::JsValue) {
    if js_sys::Reflect::set(window, &name.into(), func).is_err() {
        crate::diag::console_warn!("Failed to register {name}");
    }
}

/// Attach JS->Rust bridge callbacks via global functions on window.
#[cfg(target_family = "wasm")]
pub fn attach_ui_callbacks(app: &std::rc::Rc<std::cell::RefCell<App<DomPlatform>>>) {
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;

    let Some(window) = web_sys::window() else {
        return;
    };

    // _gdOpenGame(id)
    {
        let app = Rc::clone(app);
        let closure = Closure::<dyn FnMut(String)>::new(move |id: String| {
            let mut app = app.borrow_mut();
            app.open_game(&id);
            push_ui_state(&app);
        });
        set_window_fn(&window, "_gdOpenGame", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // _gdCloseGame()
    {
        let app = Rc::clone(app);
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut app = app.borrow_mut();
            app.close_game();
            push_ui_state(&app);
        });
        set_window_fn(&window, "_gdCloseGame", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // _gdToggleFavorite(id)
    {
        let app = Rc::clone(app);
        let closure = Closure::<dyn FnMut(String)>::new(move |id: String| {
            let mut app = app.borrow_mut();
            app.toggle_favorite(&id);
            push_ui_state(&app);
        });
        set_window_fn(&window, "_gdToggleFavorite", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // _gdClearHistory()
    {
        let app = Rc::clone(app);
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut app = app.borrow_mut();
            app.clear_history();
            push_ui_state(&app);
        });
        set_window_fn(&window, "_gdClearHistory", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // _gdToggleFullscreen()
    {
        let app = Rc::clone(app);
        let closure = Closure::<dyn FnMut()>::new(move || {
            app.borrow_mut().toggle_fullscreen();
        });
        set_window_fn(&window, "_gdToggleFullscreen", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Keep the fullscreen indicator in sync, including exits via Escape.
#[cfg(target_family = "wasm")]
pub fn attach_fullscreen_listener(app: &std::rc::Rc<std::cell::RefCell<App<DomPlatform>>>) {
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;

    let app_ref = Rc::clone(app);
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_evt: web_sys::Event| {
        let mut app = app_ref.borrow_mut();
        app.on_fullscreen_change();
        push_ui_state(&app);
    });
    let document = app.borrow().host.platform().document().clone();
    if document
        .add_event_listener_with_callback("fullscreenchange", closure.as_ref().unchecked_ref())
        .is_err()
    {
        crate::diag::console_warn!("Failed to listen for fullscreenchange");
    }
    closure.forget();
}
