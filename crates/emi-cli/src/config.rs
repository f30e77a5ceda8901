use std::path::Path;

use emi_core::EngineConfig;

use crate::input;

/// Load an engine configuration file. `.json` files are parsed as JSON,
/// anything else as YAML.
pub fn load_engine_config(path: &str) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let contents = input::file::read_to_string(path)?;

    let is_json = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: EngineConfig = if is_json {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?
    };

    config.validate()?;
    tracing::debug!(path, ?config, "loaded engine configuration");
    Ok(config)
}
