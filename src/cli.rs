use crate::config::IblConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use glam::UVec2;
use std::env;
use std::path::PathBuf;

pub const IRRADIANCE_USAGE: &str = "Usage: hdri_irradiance --hdri <path> --out <path> [options]\n\n\
     Options:\n  --hdri <path>         Equirectangular environment to convolve (required)\n  \
     --out <path>          Destination irradiance map, format from the extension (required)\n  \
     --config <path>       JSON config file\n  \
     --samples <T>x<P>     Theta and phi step counts, e.g. 100x50\n  \
     --legacy-lookup       Use the rounded nearest-texel environment lookup\n  \
     -h, --help            Show this message";

pub const SHADE_USAGE: &str = "Usage: ibl_shade --hdri <path> --normals <path> --out <path> [options]\n\n\
     Options:\n  --hdri <path>          Equirectangular environment (required)\n  \
     --normals <path>       World-space normal layer, zero normal means background (required)\n  \
     --out <path>           Destination image (required)\n  \
     --irradiance <path>    Precomputed irradiance map\n  \
     --seeds <path>         Random seed layer (default: zero)\n  \
     --diffuse <path>       Diffuse colour layer (default: white)\n  \
     --specular <path>      Specular colour, weight in alpha (default: none)\n  \
     --transmission <path>  Transmission colour, weight in alpha (default: none)\n  \
     --material <path>      Specular and transmission roughness in x/y (default: zero)\n  \
     --config <path>        JSON config file\n  \
     --samples <n>          Samples per pixel\n  \
     -h, --help             Show this message";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrradianceArgs {
    pub help: bool,
    pub hdri: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub samples: Option<UVec2>,
    pub legacy_lookup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShadeArgs {
    pub help: bool,
    pub hdri: Option<PathBuf>,
    pub irradiance: Option<PathBuf>,
    pub normals: Option<PathBuf>,
    pub seeds: Option<PathBuf>,
    pub diffuse: Option<PathBuf>,
    pub specular: Option<PathBuf>,
    pub transmission: Option<PathBuf>,
    pub material: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub samples: Option<u32>,
}

impl IrradianceArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = IrradianceArgs::default();
        let mut iter = args.into_iter().map(|arg| arg.as_ref().to_string());
        let _ = iter.next(); // skip program name if present
        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "-h" | "--help" => {
                    parsed.help = true;
                    return Ok(parsed);
                }
                "--legacy-lookup" => parsed.legacy_lookup = true,
                "--hdri" => parsed.hdri = Some(path_value(&flag, iter.next())?),
                "--out" => parsed.out = Some(path_value(&flag, iter.next())?),
                "--config" => parsed.config = Some(path_value(&flag, iter.next())?),
                "--samples" => {
                    let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?;
                    parsed.samples = Some(parse_sample_grid(&value)?);
                }
                other => bail!("Unknown flag '{other}'. Use --help for usage."),
            }
        }
        Ok(parsed)
    }

    pub fn config_overrides(&self) -> IblConfigOverrides {
        IblConfigOverrides {
            irradiance_samples: self.samples,
            legacy_lookup: self.legacy_lookup,
            shading_samples: None,
        }
    }
}

impl ShadeArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ShadeArgs::default();
        let mut iter = args.into_iter().map(|arg| arg.as_ref().to_string());
        let _ = iter.next(); // skip program name if present
        while let Some(flag) = iter.next() {
            if flag == "-h" || flag == "--help" {
                parsed.help = true;
                return Ok(parsed);
            }
            if flag == "--samples" {
                let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?;
                let samples =
                    value.parse::<u32>().with_context(|| format!("Invalid sample count '{value}'"))?;
                if samples == 0 {
                    bail!("--samples must be at least 1");
                }
                parsed.samples = Some(samples);
                continue;
            }
            let slot = match flag.as_str() {
                "--hdri" => &mut parsed.hdri,
                "--irradiance" => &mut parsed.irradiance,
                "--normals" => &mut parsed.normals,
                "--seeds" => &mut parsed.seeds,
                "--diffuse" => &mut parsed.diffuse,
                "--specular" => &mut parsed.specular,
                "--transmission" => &mut parsed.transmission,
                "--material" => &mut parsed.material,
                "--out" => &mut parsed.out,
                "--config" => &mut parsed.config,
                other => bail!("Unknown flag '{other}'. Use --help for usage."),
            };
            *slot = Some(path_value(&flag, iter.next())?);
        }
        Ok(parsed)
    }

    pub fn config_overrides(&self) -> IblConfigOverrides {
        IblConfigOverrides { shading_samples: self.samples, ..IblConfigOverrides::default() }
    }
}

/// Returns the path for a required flag or an error naming it.
pub fn required<'a>(value: &'a Option<PathBuf>, flag: &str) -> Result<&'a PathBuf> {
    value.as_ref().ok_or_else(|| anyhow!("{flag} is required. Use --help for usage."))
}

fn path_value(flag: &str, value: Option<String>) -> Result<PathBuf> {
    let value = value.ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?;
    if value.starts_with("--") {
        bail!("Expected a path after '{flag}', found flag '{value}'");
    }
    Ok(PathBuf::from(value))
}

/// Parses `<theta>x<phi>` step counts such as `100x50`.
fn parse_sample_grid(value: &str) -> Result<UVec2> {
    let (theta, phi) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Invalid sample grid '{value}'. Expected <theta>x<phi>, e.g. 100x50"))?;
    let theta = theta.trim().parse::<u32>().with_context(|| format!("Invalid theta samples '{theta}'"))?;
    let phi = phi.trim().parse::<u32>().with_context(|| format!("Invalid phi samples '{phi}'"))?;
    if theta == 0 || phi == 0 {
        bail!("Sample grid '{value}' must be non-zero in both dimensions");
    }
    Ok(UVec2::new(theta, phi))
}
