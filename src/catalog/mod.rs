//! Premade prompt catalog.
//!
//! The backend owns the catalog. When it answers with an empty list the
//! bundled table in `premade_prompts.json` is used instead; its ids and
//! titles must stay byte-identical to what the backend seeds.

use serde::Deserialize;

use crate::entity::PremadePrompt;
use crate::error::Result;

const FALLBACK_ASSET: &str = include_str!("premade_prompts.json");

/// Parsed form of the bundled asset.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogAsset {
    pub version: u32,
    pub prompts: Vec<PremadePrompt>,
}

pub fn fallback_asset() -> Result<CatalogAsset> {
    Ok(serde_json::from_str(FALLBACK_ASSET)?)
}

pub fn fallback_prompts() -> Result<Vec<PremadePrompt>> {
    Ok(fallback_asset()?.prompts)
}

/// Server catalog, or the bundled table when the server has none.
pub fn with_fallback(server: Vec<PremadePrompt>) -> Result<Vec<PremadePrompt>> {
    if server.is_empty() {
        tracing::debug!("premade prompt catalog empty, using bundled table");
        return fallback_prompts();
    }
    Ok(server)
}

pub fn title_for(prompts: &[PremadePrompt], id: i64) -> Option<&str> {
    prompts
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.title.as_str())
}
