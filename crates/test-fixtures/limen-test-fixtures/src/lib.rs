//! Canned pages and scripted hosts for exercising the Limen engine.
//!
//! Page fixtures live under `fixtures/pages/` at the repository root and are
//! listed in `fixtures/manifest.json`. Each fixture is a serialized node
//! tree that [`dom::build_stage`] turns into a real stage, rects included,
//! so integration tests and benches run against layouts shaped like the
//! production site instead of hand-rolled minimal trees.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use limen_orchestrator::{EngineConfig, HostBundle, Orchestrator};
use limen_stage_core::Viewport;

pub mod dom;
pub mod hosts;

pub use hosts::{
    PlayerState, RecordingWidgetHost, ScriptedFetcher, ScriptedPlayer, SharedPlayerState,
};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: HashMap<String, PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    file: String,
    page_id: String,
    route: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup(name: &str) -> Result<&'static PageEntry> {
    MANIFEST
        .pages
        .get(name)
        .ok_or_else(|| anyhow!("unknown page fixture '{name}'"))
}

pub mod pages {
    use super::*;
    use limen_orchestrator::FetchedDocument;
    use limen_stage_core::Stage;

    pub fn keys() -> Vec<String> {
        MANIFEST.pages.keys().cloned().collect()
    }

    /// Raw node tree as authored in the fixture file.
    pub fn spec(name: &str) -> Result<dom::NodeSpec> {
        let entry = lookup(name)?;
        super::load_json(&entry.file)
    }

    /// Fixture built into a stage.
    pub fn stage(name: &str) -> Result<Stage> {
        let spec = spec(name)?;
        dom::build_stage(&spec)
    }

    /// Fixture wrapped the way a fetch delivers it.
    pub fn document(name: &str) -> Result<FetchedDocument> {
        Ok(FetchedDocument {
            page_id: page_id(name)?,
            stage: stage(name)?,
        })
    }

    pub fn page_id(name: &str) -> Result<String> {
        Ok(lookup(name)?.page_id.clone())
    }

    pub fn route(name: &str) -> Result<String> {
        Ok(lookup(name)?.route.clone())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(name)?;
        Ok(resolve_path(&entry.file))
    }
}

/// Desktop viewport used by [`boot`]; wide enough for the hover layer.
pub const VIEWPORT_WIDTH: f32 = 1440.0;
pub const VIEWPORT_HEIGHT: f32 = 800.0;

/// Engine booted on a fixture page at the desktop viewport, with a scripted
/// fetcher serving every manifest page and a recording widget host. The
/// returned handles steer and inspect the hosts the engine now owns.
pub fn boot(page: &str) -> Result<(Orchestrator, ScriptedFetcher, RecordingWidgetHost)> {
    boot_with(page, EngineConfig::default())
}

pub fn boot_with(
    page: &str,
    config: EngineConfig,
) -> Result<(Orchestrator, ScriptedFetcher, RecordingWidgetHost)> {
    let fetcher = ScriptedFetcher::new();
    let widgets = RecordingWidgetHost::new();
    let stage = pages::stage(page)?;
    let route = pages::route(page)?;
    let bundle = HostBundle::new(Box::new(fetcher.clone()), Box::new(widgets.clone()));
    let viewport = Viewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    let engine = Orchestrator::new(stage, viewport, &route, bundle, config)
        .context("engine construction failed")?;
    Ok((engine, fetcher, widgets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use limen_stage_core::SelectorList;

    #[test]
    fn every_manifest_page_builds() {
        let mut keys = pages::keys();
        keys.sort();
        assert_eq!(keys, ["contact", "home", "portfolio"]);
        let container = SelectorList::parse(".page-container").unwrap();
        for name in keys {
            let stage = pages::stage(&name).expect("fixture builds");
            assert!(container.first(&stage).is_some(), "{name} has a view root");
            assert!(stage.rect(stage.root()).is_some(), "{name} root has a rect");
        }
    }

    #[test]
    fn routes_round_trip_through_the_scripted_fetcher() {
        use limen_orchestrator::DocumentFetcher;

        let fetcher = ScriptedFetcher::new();
        let mut serving = fetcher.clone();
        let doc = serving.fetch("/portfolio").expect("portfolio served");
        assert_eq!(doc.page_id, "wf-portfolio");
        assert_eq!(fetcher.requests(), ["/portfolio"]);
    }
}
