use anyhow::{Context, Result};
use glam::Vec4;
use kestrel_ibl::cli::{required, ShadeArgs, SHADE_USAGE};
use kestrel_ibl::{HdrBuffer, IblConfig, ImageSource, ShadingKernel, SurfaceLayers};
use std::path::PathBuf;

/// Loads an optional layer, or fills one the size of the normals with `fallback`.
fn load_layer(path: &Option<PathBuf>, name: &str, normals: &HdrBuffer, fallback: Vec4) -> Result<HdrBuffer> {
    let Some(path) = path else {
        log::debug!("No {name} layer given, using {fallback:?}");
        return Ok(HdrBuffer::filled(normals.width(), normals.height(), fallback));
    };
    let layer = HdrBuffer::load(path).with_context(|| format!("Loading {name} layer"))?;
    if layer.bounds() != normals.bounds() {
        log::warn!(
            "{name} layer is {:?} but normals are {:?}; lookups are clamped to its edges",
            layer.bounds(),
            normals.bounds()
        );
    }
    Ok(layer)
}

fn main() -> Result<()> {
    kestrel_ibl::init_logging();
    let args = ShadeArgs::parse_from_env()?;
    if args.help {
        eprintln!("{SHADE_USAGE}");
        return Ok(());
    }
    let hdri_path = required(&args.hdri, "--hdri")?;
    let normals_path = required(&args.normals, "--normals")?;
    let out_path = required(&args.out, "--out")?;

    let mut config = match &args.config {
        Some(path) => IblConfig::load(path)?,
        None => IblConfig::default(),
    };
    config.apply_overrides(&args.config_overrides());
    let mut params = config.shading.params();
    if params.use_precomputed_irradiance && args.irradiance.is_none() {
        log::warn!("No --irradiance map given, sampling the diffuse bounce from the environment");
        params.use_precomputed_irradiance = false;
    }

    let hdri = HdrBuffer::load(hdri_path).context("Loading environment")?;
    let irradiance = match &args.irradiance {
        Some(path) if params.use_precomputed_irradiance => {
            Some(HdrBuffer::load(path).context("Loading irradiance map")?)
        }
        _ => None,
    };
    let normals = HdrBuffer::load(normals_path).context("Loading normals layer")?;
    let seeds = load_layer(&args.seeds, "seeds", &normals, Vec4::ZERO)?;
    let diffuse = load_layer(&args.diffuse, "diffuse", &normals, Vec4::ONE)?;
    let specular = load_layer(&args.specular, "specular", &normals, Vec4::ZERO)?;
    let transmission = load_layer(&args.transmission, "transmission", &normals, Vec4::ZERO)?;
    let material = load_layer(&args.material, "material", &normals, Vec4::ZERO)?;

    let kernel = ShadingKernel::new(params, &hdri, irradiance.as_ref())?;
    let layers = SurfaceLayers {
        normals: &normals,
        seeds: &seeds,
        diffuse: &diffuse,
        specular: &specular,
        transmission: &transmission,
        material: &material,
    };
    let output = kernel.render(&layers);

    if let Some(parent) = out_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Creating directory {}", parent.display()))?;
    }
    output.save(out_path)
}
