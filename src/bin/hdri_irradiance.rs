use anyhow::{Context, Result};
use kestrel_ibl::cli::{required, IrradianceArgs, IRRADIANCE_USAGE};
use kestrel_ibl::{HdrBuffer, IblConfig};

fn main() -> Result<()> {
    kestrel_ibl::init_logging();
    let args = IrradianceArgs::parse_from_env()?;
    if args.help {
        eprintln!("{IRRADIANCE_USAGE}");
        return Ok(());
    }
    let hdri_path = required(&args.hdri, "--hdri")?;
    let out_path = required(&args.out, "--out")?;

    let mut config = match &args.config {
        Some(path) => IblConfig::load(path)?,
        None => IblConfig::default(),
    };
    config.apply_overrides(&args.config_overrides());
    let kernel = config.irradiance.kernel()?;

    let hdri = HdrBuffer::load(hdri_path)?;
    let irradiance = kernel.convolve(&hdri);

    if let Some(parent) = out_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Creating directory {}", parent.display()))?;
    }
    irradiance.save(out_path)
}
