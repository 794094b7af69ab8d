use anyhow::{Context, bail};
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::PathBuf;

use lognormal_propagation::common::{LinkMatrix, load_scene, resolve_propagation};
use lognormal_propagation::propagation::LogNormalShadowingModel;

fn main() -> anyhow::Result<()> {
    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("lognormal_propagation"), LevelFilter::Debug)
        .filter(Some("link_budget"), LevelFilter::Debug)
        .parse_default_env()
        .init();

    let scene_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: link-budget <scene.json>"),
    };
    info!("Using provided scene path: {}", scene_path.display());

    let scene = load_scene(&scene_path).with_context(|| format!("loading scene {}", scene_path.display()))?;
    let config = resolve_propagation(&scene, &scene_path).context("loading propagation configuration")?;
    let mut model = LogNormalShadowingModel::from_config(&config).context("building loss model")?;
    let streams = model.seed_random_source(scene.stream);
    info!("Seeded loss model with stream {} ({} stream consumed)", scene.stream, streams);

    let matrix = LinkMatrix::compute(&scene, &mut model);
    for link in &matrix.links {
        println!("{}", link);
    }
    if scene.rx_sensitivity.is_some() {
        info!("{} of {} links reachable", matrix.reachable_count(), matrix.links.len());
    }
    Ok(())
}
