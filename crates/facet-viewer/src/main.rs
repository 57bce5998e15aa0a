use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use glam::Vec3;

use facet_engine::asset::{ImageCrateDecoder, TobjImporter};
use facet_engine::logging::{init_logging, LoggingConfig};
use facet_engine::render::STANDARD_PIPELINE;
use facet_engine::scene::Model;
use facet_engine::{Engine, EngineConfig, Renderer};

const SUN_MODEL: &str = "Beach_Ball_v2_L3/13517_Beach_Ball_v2_L3.obj";

/// (model path relative to the asset directory, position)
const PROPS: &[(&str, [f32; 3])] = &[
    ("teapot.obj", [0.0, 0.0, 0.0]),
    ("teapot.obj", [10.0, 0.0, 0.0]),
    ("capsule/capsule.obj", [10.0, 10.0, 0.0]),
    ("SMG/smg.obj", [10.0, 10.0, 10.0]),
    ("backpack/backpack.obj", [0.0, 20.0, 10.0]),
];

fn main() {
    init_logging(LoggingConfig {
        env_filter: None,
        fallback_filter: "facet_engine=info,facet_viewer=info,wgpu=warn".to_string(),
        ..LoggingConfig::default()
    });

    let assets = std::env::var_os("FACET_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/"));
    log::info!("asset directory: {}", assets.display());

    let config = EngineConfig {
        title: "facet".to_string(),
        ..EngineConfig::default()
    };

    if let Err(e) = Engine::run(config, |renderer| build_scene(renderer, &assets)) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn build_scene(renderer: &mut Renderer<'_>, assets: &Path) -> Result<()> {
    let mut loaded: Vec<(&str, Arc<Model>)> = Vec::new();

    for &(file, position) in PROPS {
        let cached = loaded
            .iter()
            .find(|(f, _)| *f == file)
            .map(|(_, model)| Arc::clone(model));
        let model = cached.or_else(|| {
            let model = load(renderer, &assets.join(file))?;
            loaded.push((file, Arc::clone(&model)));
            Some(model)
        });
        if let Some(model) = model {
            renderer.add_renderable(STANDARD_PIPELINE, model, Vec3::from(position), None)?;
        }
    }

    if let Some(sun) = load(renderer, &assets.join(SUN_MODEL)) {
        let id = renderer.add_renderable(
            STANDARD_PIPELINE,
            sun,
            Vec3::new(30.0, 30.0, 0.0),
            Some("Sun"),
        )?;
        renderer.scene_mut().set_light_source(id)?;
    }

    Ok(())
}

/// Missing or broken models are skipped so a partial asset set still runs.
fn load(renderer: &Renderer<'_>, path: &Path) -> Option<Arc<Model>> {
    match renderer.load_model(path, &TobjImporter, &ImageCrateDecoder) {
        Ok(model) => Some(model),
        Err(e) => {
            log::warn!("skipping model: {e}");
            None
        }
    }
}
