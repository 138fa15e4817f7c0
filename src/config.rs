use engine::{tracing, Luminance, DEFAULT_SIZE_LIMIT, MAX_SIZE_LIMIT};
use serde::{Deserialize, Serialize};

/// Application instance specific config.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LocalConfig {
    /// Largest `n` permutations will be generated for.
    #[serde(default = "default_size_limit")]
    pub max_permutation_size: u32,
    /// Weighting used when converting images to grayscale.
    #[serde(default)]
    pub luminance: Luminance,
    /// Log filter directives, used when `RUST_LOG` isn't set.
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_size_limit() -> u32 {
    DEFAULT_SIZE_LIMIT
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            max_permutation_size: DEFAULT_SIZE_LIMIT,
            luminance: Luminance::default(),
            log_filter: None,
        }
    }
}

impl LocalConfig {
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        get_local_config::<Self>("config")
            .map(Self::sanitized)
            .unwrap_or_default()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn store(&self) {
        set_local_config("config", self)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_from(&ContentStore::default())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn store(&self) {
        if let Err(err) = self.store_in(&ContentStore::default()) {
            tracing::error!("failed to store config: {}", err);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(store: &ContentStore) -> Self {
        store
            .read_config::<Self>("config")
            .map(Self::sanitized)
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn store_in(&self, store: &ContentStore) -> std::io::Result<()> {
        store.write_config("config", self)
    }

    /// Log filter directives to use when `RUST_LOG` isn't set.
    pub fn log_directives(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("info")
    }

    /// Permutation limit actually enforced by the engine.
    pub fn permutation_limit(&self) -> u32 {
        self.max_permutation_size.min(MAX_SIZE_LIMIT)
    }

    fn sanitized(mut self) -> Self {
        if self.max_permutation_size > MAX_SIZE_LIMIT {
            tracing::warn!(
                "max_permutation_size {} is above {}, clamping",
                self.max_permutation_size,
                MAX_SIZE_LIMIT
            );
            self.max_permutation_size = MAX_SIZE_LIMIT;
        }
        self
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

#[cfg(target_arch = "wasm32")]
pub mod web {
    use gloo_storage::{LocalStorage, Storage};
    use serde::{de::DeserializeOwned, Serialize};

    pub fn get_local_config<T: DeserializeOwned>(name: &str) -> Option<T> {
        <LocalStorage as Storage>::get(name).ok()
    }

    pub fn set_local_config<T: Serialize>(name: &str, val: &T) {
        let _ = <LocalStorage as Storage>::set(name, val);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use engine::tracing;
    use serde::{de::DeserializeOwned, Serialize};
    use std::path::{Path, PathBuf};

    pub const LOG_FILENAME: &str = "log";

    #[derive(Debug, Clone)]
    pub struct ContentStore {
        config_dir: PathBuf,
        log_file: PathBuf,
    }

    impl Default for ContentStore {
        fn default() -> Self {
            let (config_dir, data_dir) = match directories_next::ProjectDirs::from("", "", "offload") {
                Some(app_dirs) => (
                    app_dirs.config_dir().to_path_buf(),
                    app_dirs.data_dir().to_path_buf(),
                ),
                None => {
                    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                    (dir.join("config"), dir.join("data"))
                }
            };

            Self::new(config_dir, data_dir)
        }
    }

    impl ContentStore {
        pub fn new(config_dir: PathBuf, data_dir: PathBuf) -> Self {
            Self {
                log_file: data_dir.join(LOG_FILENAME),
                config_dir,
            }
        }

        pub fn create_req_dirs(&self) -> std::io::Result<()> {
            std::fs::create_dir_all(&self.config_dir)?;
            if let Some(parent) = self.log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Ok(())
        }

        #[inline(always)]
        pub fn log_file(&self) -> &Path {
            &self.log_file
        }

        #[inline(always)]
        pub fn config_file(&self, name: &str) -> PathBuf {
            self.config_dir.join(format!("{}.json", name))
        }

        pub fn read_config<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
            let path = self.config_file(name);
            let raw = std::fs::read(&path).ok()?;
            match serde_json::from_slice(&raw) {
                Ok(config) => Some(config),
                Err(err) => {
                    tracing::warn!("ignoring invalid config at {}: {}", path.display(), err);
                    None
                }
            }
        }

        pub fn write_config<T: Serialize>(&self, name: &str, val: &T) -> std::io::Result<()> {
            let serialized = serde_json::to_vec_pretty(val)?;
            std::fs::create_dir_all(&self.config_dir)?;
            std::fs::write(self.config_file(name), serialized)
        }
    }
}
