use gamedeck_core::persistence::{Persistence, StorageError};

/// [`Persistence`] over `window.localStorage`. Every call reports
/// [`StorageError::Unavailable`] outside the browser or when storage is
/// disabled (private browsing, sandboxed frames).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_family = "wasm")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}

impl Persistence for LocalStorage {
    #[allow(unused_variables)]
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_family = "wasm")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|e| StorageError::Read(format!("{e:?}")))
        }
        #[cfg(not(target_family = "wasm"))]
        {
            Err(StorageError::Unavailable)
        }
    }

    #[allow(unused_variables)]
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(target_family = "wasm")]
        {
            local_storage()?
                .set_item(key, value)
                .map_err(|e| StorageError::Write(format!("{e:?}")))
        }
        #[cfg(not(target_family = "wasm"))]
        {
            Err(StorageError::Unavailable)
        }
    }
}
