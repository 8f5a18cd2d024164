//! Run options for the DLP-GAN image-translation pipeline.
//!
//! [`BaseOptions`] declares the option schema, parses the command line,
//! selects the compute device from `--gpu_ids`, derives the checkpoint
//! directory from the loss weights and records the resolved options in
//! `<checkpoints_dir>/opt.txt`. Training and translation entry points receive
//! the result as a [`Resolved`] value.

pub mod backend;
pub mod config;
mod error;
mod resolver;
pub mod snapshot;


pub use backend::{
    get_backend_name, BackendSelector, DeviceSelector, SelectedBackend, SelectedDevice,
};
pub use config::{format_float, GpuIds, ModelKind, Options, Phase};
pub use error::{ErrorKind, OptionsError, OptionsResult};
pub use resolver::{BaseOptions, Resolved};
pub use snapshot::{read_snapshot, render_listing};
