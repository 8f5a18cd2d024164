//! DLP-GAN translation (test phase) entry point
//!
//! ```bash
//! cargo run --bin translate -- --model test --which_direction BtoA --gpu_ids -1
//! ```

use anyhow::Result;
use dlpgan_demos::{init_tracing, log_summary, resolve};
use dlpgan_options::Phase;

fn main() -> Result<()> {
    init_tracing();

    let resolved = resolve(Phase::Test)?;
    log_summary(&resolved);

    tracing::info!(
        direction = %resolved.options.which_direction,
        weights = %resolved.options.model_dir.display(),
        "translation options ready",
    );

    Ok(())
}
