pub mod app;
pub mod bridge;
mod diag;
#[cfg(target_family = "wasm")]
pub mod dom;
pub mod storage;

use wasm_bindgen::prelude::*;

/// Id of the element the player mounts games into.
pub const MOUNT_ID: &str = "game-embed";

/// WASM entry point.
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        launch();
    }
}

#[cfg(target_family = "wasm")]
fn launch() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gamedeck_core::catalog::Catalog;

    let Some(platform) = dom::DomPlatform::attach(MOUNT_ID) else {
        diag::console_warn!("Gamedeck: no #{MOUNT_ID} element, player disabled");
        return;
    };
    let catalog = Catalog::seeded();
    diag::console_log!("Gamedeck: {} games loaded", catalog.len());

    let app = Rc::new(RefCell::new(app::App::new(
        catalog,
        Box::new(storage::LocalStorage),
        platform,
    )));
    bridge::attach_ui_callbacks(&app);
    bridge::attach_fullscreen_listener(&app);

    let path = web_sys::window().and_then(|w| w.location().pathname().ok());
    if let Some(id) = path.as_deref().and_then(app::game_id_from_path) {
        app.borrow_mut().open_game(id);
    }
    bridge::push_ui_state(&app.borrow());
}
