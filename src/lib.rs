//! Image based lighting kernels: diffuse irradiance pre-convolution of equirectangular HDR
//! environments and single-bounce shading of per-pixel surface layers.

pub mod buffer;
pub mod camera;
pub mod cli;
pub mod config;
pub mod environment;
pub mod irradiance;
pub mod random;
pub mod shading;
pub mod spherical;
pub mod surface;
pub mod transform;

pub use buffer::{HdrBuffer, ImageSource};
pub use config::{IblConfig, IblConfigOverrides};
pub use environment::{EnvironmentSampler, LookupMode};
pub use irradiance::IrradianceKernel;
pub use shading::{ShadingKernel, ShadingParams, SurfaceLayers};

/// Installs the `env_logger` backend used by the binaries, defaulting to `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
