//! Built-in defaults, the lowest configuration layer.

use crate::config::{
    default_alias_prefix, default_cdn_base, default_entry_candidates, default_packages,
    default_root_element_id, default_title,
};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
///
/// Package pins are set key by key so a file adding one package keeps the
/// built-in pins.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = Config::builder()
        .set_default("preview.cdn_base", default_cdn_base())?
        .set_default("preview.entry_candidates", default_entry_candidates())?
        .set_default("preview.alias_prefix", default_alias_prefix())?
        .set_default("preview.root_element_id", default_root_element_id())?
        .set_default("preview.title", default_title())?
        .set_default("storage.store_path", ".sketchvfs/store")?
        .set_default("generation.backend", "mock")?;

    for (name, version) in default_packages() {
        builder = builder.set_default(format!("preview.packages.{}", name), version)?;
    }
    Ok(builder)
}
