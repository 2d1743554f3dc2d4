pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{CliConfig, RelayConfig};
pub use core::{
    params::build_params,
    relay::{router, RelayState},
    shaper::shape_result,
    upstream::Gov24Client,
};
pub use utils::error::{RelayError, Result};
