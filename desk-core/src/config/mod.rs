use crate::error::CoreError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment prefix shared by every pdf-desk binary (`APP_BACKEND__URL`, ...).
pub const ENV_PREFIX: &str = "APP";

/// Locate the `config` directory of a crate.
///
/// Works both when the process runs from the workspace root and from inside
/// the crate directory itself.
pub fn config_directory(crate_dir: &str) -> Result<PathBuf, CoreError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}

/// Load `<dir>/base.yaml` and overlay `APP_*` environment variables.
///
/// Nested keys use `__` as separator, e.g. `APP_LIST__DEBOUNCE_MS=250`.
pub fn load_layered<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, CoreError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
