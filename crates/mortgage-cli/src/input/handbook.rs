use mortgage_core::handbook::{Handbook, HandbookOverride};
use tracing::{debug, info};

use crate::input::file;

/// Effective handbook: the built-in defaults, with the overrides from `path`
/// merged on top when one is given. YAML is accepted for `.yaml`/`.yml`
/// files, JSON otherwise.
pub fn load(path: Option<&str>) -> Result<Handbook, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        debug!("no handbook file; using defaults");
        return Ok(Handbook::default());
    };

    let (resolved, contents) = file::read_text(path)?;
    let is_yaml = resolved
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let overrides: HandbookOverride = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?
    };

    let handbook = Handbook::merged_over_defaults(overrides);
    handbook.validate()?;
    info!(path = %resolved.display(), "loaded handbook overrides");
    Ok(handbook)
}
