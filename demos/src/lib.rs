//! DLP-GAN pipeline entry points
//!
//! Each binary resolves the run options for its phase and hands the result,
//! including the selected compute device, to the pipeline stage.
//!
//! ## Available binaries
//!
//! - `train`: resolves options with `isTrain = true`
//! - `translate`: resolves options with `isTrain = false`
//!
//! ## Usage
//!
//! ```bash
//! # Train DLP-GAN on the default dataset using GPU 0
//! cargo run --bin train --features cuda -- --gpu_ids 0
//!
//! # Translate test images on the CPU
//! cargo run --bin translate -- --gpu_ids -1 --model test
//! ```

use anyhow::{Context, Result};
use dlpgan_options::{
    get_backend_name, BaseOptions, OptionsError, Phase, Resolved, SelectedDevice,
};
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber, honouring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an embedding process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolves the options for `phase` from the process arguments.
///
/// Usage errors (including `--help`) print the clap message and exit the
/// process with clap's status code. Device and filesystem failures are
/// returned with context.
pub fn resolve(phase: Phase) -> Result<Resolved<SelectedDevice>> {
    tracing::info!(backend = get_backend_name(), ?phase, "resolving run options");

    match BaseOptions::new(phase).parse() {
        Ok(resolved) => Ok(resolved),
        Err(OptionsError::Usage(err)) => err.exit(),
        Err(err) => Err(err).with_context(|| format!("Failed to resolve {phase:?} options")),
    }
}

/// Logs what the pipeline stage will consume from the resolved options.
pub fn log_summary(resolved: &Resolved<SelectedDevice>) {
    let opt = &resolved.options;
    tracing::info!(
        model = %opt.model,
        dataroot = %opt.dataroot.display(),
        dataset_mode = %opt.dataset_mode,
        batch_size = opt.batch_size,
        threads = opt.n_threads,
        "data pipeline settings",
    );
    tracing::info!(
        netG = %opt.which_model_net_g,
        netD = %opt.which_model_net_d,
        ngf = opt.ngf,
        ndf = opt.ndf,
        norm = %opt.norm,
        init = %opt.init_type,
        "network settings",
    );
    match &resolved.device {
        Some(device) => tracing::info!(?device, gpu_ids = %opt.gpu_ids, "using GPU"),
        None => tracing::info!("using CPU"),
    }
    tracing::info!(
        checkpoints = %opt.checkpoints_dir.display(),
        "run options recorded",
    );
}
