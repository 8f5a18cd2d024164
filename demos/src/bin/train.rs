//! DLP-GAN training entry point
//!
//! Resolves the training options, records them next to the checkpoints and
//! prepares the run for the training loop.
//!
//! ```bash
//! cargo run --bin train -- --dataroot ./datasets/dstn_dataset/Landscape --gpu_ids -1
//! ```

use anyhow::Result;
use dlpgan_demos::{init_tracing, log_summary, resolve};
use dlpgan_options::Phase;

fn main() -> Result<()> {
    init_tracing();

    let resolved = resolve(Phase::Train)?;
    log_summary(&resolved);

    tracing::info!(
        lambda_gan = resolved.options.lambda_gan,
        lambda_dual = resolved.options.lambda_dual,
        lambda_id = resolved.options.lambda_id,
        serial_batches = resolved.options.serial_batches,
        no_flip = resolved.options.no_flip,
        "training options ready",
    );

    Ok(())
}
