//! The option schema and the resolved option record.
//!
//! `Options` is both: clap derives the command-line schema from it, and after
//! resolution the same struct carries the parsed, transformed values handed to
//! the pipeline.

use std::{collections::BTreeMap, fmt, ops::Deref, path::PathBuf};

use clap::Parser;

use super::enums::ModelKind;

/// Ordered list of GPU ids with CPU sentinels (negative ids) removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GpuIds(Vec<usize>);

impl GpuIds {
    /// Parses a comma separated id list, keeping the non-negative ids in order.
    ///
    /// Every token must be an integer; negative values mean "CPU" and are
    /// dropped. Duplicates are preserved.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut ids = Vec::new();
        for token in raw.split(',') {
            let token = token.trim();
            let id: i64 = token
                .parse()
                .map_err(|_| format!("`{token}` is not an integer gpu id"))?;
            match usize::try_from(id) {
                Ok(id) => ids.push(id),
                Err(_) => tracing::debug!(id, "dropping negative gpu id"),
            }
        }
        Ok(Self(ids))
    }

    /// The device that becomes active, if any.
    #[must_use]
    pub fn primary(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Consumes the list, returning the ids.
    #[must_use]
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for GpuIds {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for GpuIds {
    fn from(ids: Vec<usize>) -> Self {
        Self(ids)
    }
}

impl fmt::Display for GpuIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Accepts `inf` or a non-negative whole number of samples.
fn parse_dataset_size(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a sample count"))?;
    if value == f64::INFINITY || (value >= 0.0 && value.fract() == 0.0) {
        Ok(value)
    } else {
        Err(format!("`{raw}` must be a non-negative integer or `inf`"))
    }
}

/// Rejects values that would break the one-line-per-option listing.
fn parse_single_line(raw: &str) -> Result<String, String> {
    if raw.contains(['\n', '\r']) {
        Err("value must not contain line breaks".to_string())
    } else {
        Ok(raw.to_string())
    }
}

fn parse_single_line_path(raw: &str) -> Result<PathBuf, String> {
    parse_single_line(raw).map(PathBuf::from)
}

/// Formats a float the way it appears in listings and checkpoint paths.
///
/// Shortest round-trip decimal with a mandatory fractional digit
/// (`1.0`, `0.5`, `1e-5`, `inf`), independent of platform and locale.
#[must_use]
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Run options for the image-translation pipeline.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "dlpgan",
    about = "Options for the DLP-GAN image-translation pipeline",
    long_about = None
)]
pub struct Options {
    /// Path to images (should have subfolders trainA, trainB, valA, valB, etc)
    #[arg(
        long,
        default_value = "./datasets/dstn_dataset/Landscape",
        value_parser = parse_single_line_path
    )]
    pub dataroot: PathBuf,

    /// Input batch size
    #[arg(long = "batchSize", default_value_t = 1)]
    pub batch_size: usize,

    /// Scale images to this size
    #[arg(long = "loadSize", default_value_t = 286)]
    pub load_size: usize,

    /// Then crop to this size
    #[arg(long = "fineSize", default_value_t = 256)]
    pub fine_size: usize,

    /// Number of input image channels
    #[arg(long = "input_nc", default_value_t = 3)]
    pub input_nc: usize,

    /// Number of output image channels
    #[arg(long = "output_nc", default_value_t = 3)]
    pub output_nc: usize,

    /// Number of generator filters in the first conv layer
    #[arg(long, default_value_t = 64)]
    pub ngf: usize,

    /// Number of discriminator filters in the first conv layer
    #[arg(long, default_value_t = 64)]
    pub ndf: usize,

    /// Discriminator architecture
    #[arg(long = "which_model_netD", default_value = "basic", value_parser = parse_single_line)]
    pub which_model_net_d: String,

    /// Generator architecture
    #[arg(
        long = "which_model_netG",
        default_value = "resnet_9blocks",
        value_parser = parse_single_line
    )]
    pub which_model_net_g: String,

    /// Only used if which_model_netD is n_layers
    #[arg(long = "n_layers_D", default_value_t = 3)]
    pub n_layers_d: usize,

    /// GPU ids, e.g. 0 or 0,1,2 or 0,2; use -1 for CPU
    #[arg(
        long = "gpu_ids",
        default_value = "0",
        allow_hyphen_values = true,
        value_parser = GpuIds::parse
    )]
    pub gpu_ids: GpuIds,

    /// How datasets are loaded [unaligned | aligned | single]
    #[arg(long = "dataset_mode", default_value = "unaligned", value_parser = parse_single_line)]
    pub dataset_mode: String,

    /// Which model to use
    #[arg(long, value_enum, default_value_t = ModelKind::DlpGan)]
    pub model: ModelKind,

    /// AtoB or BtoA
    #[arg(long = "which_direction", default_value = "AtoB", value_parser = parse_single_line)]
    pub which_direction: String,

    /// Number of threads for loading data
    #[arg(long = "nThreads", default_value_t = 2)]
    pub n_threads: usize,

    /// Models are saved here; replaced by the derived checkpoint directory
    #[arg(
        long = "checkpoints_dir",
        default_value = "./checkpoints",
        value_parser = parse_single_line_path
    )]
    pub checkpoints_dir: PathBuf,

    /// Instance normalization or batch normalization
    #[arg(long, default_value = "instance", value_parser = parse_single_line)]
    pub norm: String,

    /// Take images in order to make batches instead of randomly
    #[arg(long = "serial_batches")]
    pub serial_batches: bool,

    /// Display window size
    #[arg(long = "display_winsize", default_value_t = 256)]
    pub display_winsize: usize,

    /// Window id of the web display
    #[arg(long = "display_id", default_value_t = 0, allow_negative_numbers = true)]
    pub display_id: i32,

    /// Port of the web display
    #[arg(long = "display_port", default_value_t = 8097)]
    pub display_port: u16,

    /// No dropout for the generator
    #[arg(long = "no_dropout")]
    pub no_dropout: bool,

    /// Maximum number of samples loaded per dataset
    #[arg(
        long = "max_dataset_size",
        default_value_t = f64::INFINITY,
        value_parser = parse_dataset_size
    )]
    pub max_dataset_size: f64,

    /// Scaling and cropping of images at load time [resize_and_crop | crop | scale_width | scale_width_and_crop]
    #[arg(
        long = "resize_or_crop",
        default_value = "resize_and_crop",
        value_parser = parse_single_line
    )]
    pub resize_or_crop: String,

    /// Do not flip the images for data augmentation
    #[arg(long = "no_flip")]
    pub no_flip: bool,

    /// Network initialization [normal | xavier | kaiming | orthogonal]
    #[arg(long = "init_type", default_value = "xavier", value_parser = parse_single_line)]
    pub init_type: String,

    /// The path to the model directory
    #[arg(long = "model_dir", default_value = "./weights", value_parser = parse_single_line_path)]
    pub model_dir: PathBuf,

    /// Weight for the cycle loss (A -> B -> A)
    #[arg(long = "alpha_G", default_value_t = 1.0, allow_negative_numbers = true)]
    pub alpha_g: f64,

    /// Weight for the cycle loss (B -> A -> B)
    #[arg(long = "alpha_F", default_value_t = 0.5, allow_negative_numbers = true)]
    pub alpha_f: f64,

    /// Weight for the content loss (A -> B)
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub beta: f64,

    /// Weight for the content loss (B -> A)
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub gamma: f64,

    /// Weight for the GAN loss
    #[arg(long = "lambda_GAN", default_value_t = 1.0, allow_negative_numbers = true)]
    pub lambda_gan: f64,

    /// Weight for the LPIPS loss
    #[arg(long = "lambda_Dual", default_value_t = 10.0, allow_negative_numbers = true)]
    pub lambda_dual: f64,

    /// Weight for the DexiNed loss
    #[arg(long = "lambda_id", default_value_t = 5.0, allow_negative_numbers = true)]
    pub lambda_id: f64,

    /// Set from the resolver's phase, never from arguments.
    #[arg(skip)]
    pub is_train: bool,
}

impl Options {
    /// Name of the directory holding this run's checkpoints and snapshot.
    ///
    /// `A_<alpha_G>_B_<alpha_F>_C_<beta>_D_<gamma>`, floats written with
    /// [`format_float`].
    #[must_use]
    pub fn run_name(&self) -> String {
        format!(
            "A_{}_B_{}_C_{}_D_{}",
            format_float(self.alpha_g),
            format_float(self.alpha_f),
            format_float(self.beta),
            format_float(self.gamma),
        )
    }

    /// `dataroot/checkpoints/<model>/<run name>`.
    #[must_use]
    pub fn derived_checkpoints_dir(&self) -> PathBuf {
        self.dataroot
            .join("checkpoints")
            .join(self.model.as_str())
            .join(self.run_name())
    }

    /// Option name to display value, sorted by name.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<&'static str, String> {
        let path = |p: &PathBuf| p.display().to_string();
        BTreeMap::from([
            ("dataroot", path(&self.dataroot)),
            ("batchSize", self.batch_size.to_string()),
            ("loadSize", self.load_size.to_string()),
            ("fineSize", self.fine_size.to_string()),
            ("input_nc", self.input_nc.to_string()),
            ("output_nc", self.output_nc.to_string()),
            ("ngf", self.ngf.to_string()),
            ("ndf", self.ndf.to_string()),
            ("which_model_netD", self.which_model_net_d.clone()),
            ("which_model_netG", self.which_model_net_g.clone()),
            ("n_layers_D", self.n_layers_d.to_string()),
            ("gpu_ids", self.gpu_ids.to_string()),
            ("dataset_mode", self.dataset_mode.clone()),
            ("model", self.model.to_string()),
            ("which_direction", self.which_direction.clone()),
            ("nThreads", self.n_threads.to_string()),
            ("checkpoints_dir", path(&self.checkpoints_dir)),
            ("norm", self.norm.clone()),
            ("serial_batches", self.serial_batches.to_string()),
            ("display_winsize", self.display_winsize.to_string()),
            ("display_id", self.display_id.to_string()),
            ("display_port", self.display_port.to_string()),
            ("no_dropout", self.no_dropout.to_string()),
            // Whole sample count: `1000`, `inf`.
            ("max_dataset_size", self.max_dataset_size.to_string()),
            ("resize_or_crop", self.resize_or_crop.clone()),
            ("no_flip", self.no_flip.to_string()),
            ("init_type", self.init_type.clone()),
            ("model_dir", path(&self.model_dir)),
            ("alpha_G", format_float(self.alpha_g)),
            ("alpha_F", format_float(self.alpha_f)),
            ("beta", format_float(self.beta)),
            ("gamma", format_float(self.gamma)),
            ("lambda_GAN", format_float(self.lambda_gan)),
            ("lambda_Dual", format_float(self.lambda_dual)),
            ("lambda_id", format_float(self.lambda_id)),
            ("isTrain", self.is_train.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("dlpgan").chain(args.iter().copied()))
    }

    #[test]
    fn gpu_ids_drop_negatives_in_order() {
        let ids = GpuIds::parse("0,1,-1,2").unwrap();
        assert_eq!(&*ids, &[0, 1, 2]);
        assert_eq!(ids.primary(), Some(0));
    }

    #[test]
    fn gpu_ids_cpu_sentinel_is_empty() {
        let ids = GpuIds::parse("-1").unwrap();
        assert!(ids.is_empty());
        assert_eq!(ids.primary(), None);
    }

    #[test]
    fn gpu_ids_keep_duplicates() {
        assert_eq!(GpuIds::parse("2,2,0").unwrap().into_vec(), vec![2, 2, 0]);
    }

    #[test]
    fn gpu_ids_reject_non_integers() {
        let err = GpuIds::parse("0,x").unwrap_err();
        assert!(err.contains("`x`"));
        assert!(GpuIds::parse("").is_err());
    }

    #[test]
    fn gpu_ids_display_as_list() {
        assert_eq!(GpuIds::from(vec![0, 3]).to_string(), "[0, 3]");
        assert_eq!(GpuIds::default().to_string(), "[]");
    }

    #[test]
    fn float_format_keeps_fraction() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(10.0), "10.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn defaults_match_schema() {
        let opt = parse(&[]).unwrap();
        assert_eq!(opt.dataroot, PathBuf::from("./datasets/dstn_dataset/Landscape"));
        assert_eq!(opt.batch_size, 1);
        assert_eq!(opt.load_size, 286);
        assert_eq!(opt.fine_size, 256);
        assert_eq!(opt.input_nc, 3);
        assert_eq!(opt.output_nc, 3);
        assert_eq!(opt.ngf, 64);
        assert_eq!(opt.ndf, 64);
        assert_eq!(opt.which_model_net_d, "basic");
        assert_eq!(opt.which_model_net_g, "resnet_9blocks");
        assert_eq!(opt.n_layers_d, 3);
        assert_eq!(&*opt.gpu_ids, &[0]);
        assert_eq!(opt.dataset_mode, "unaligned");
        assert_eq!(opt.model, ModelKind::DlpGan);
        assert_eq!(opt.which_direction, "AtoB");
        assert_eq!(opt.n_threads, 2);
        assert_eq!(opt.checkpoints_dir, PathBuf::from("./checkpoints"));
        assert_eq!(opt.norm, "instance");
        assert!(!opt.serial_batches);
        assert_eq!(opt.display_winsize, 256);
        assert_eq!(opt.display_id, 0);
        assert_eq!(opt.display_port, 8097);
        assert!(!opt.no_dropout);
        assert!(opt.max_dataset_size.is_infinite() && opt.max_dataset_size > 0.0);
        assert_eq!(opt.resize_or_crop, "resize_and_crop");
        assert!(!opt.no_flip);
        assert_eq!(opt.init_type, "xavier");
        assert_eq!(opt.model_dir, PathBuf::from("./weights"));
        assert_eq!(opt.alpha_g, 1.0);
        assert_eq!(opt.alpha_f, 0.5);
        assert_eq!(opt.beta, 10.0);
        assert_eq!(opt.gamma, 1.0);
        assert_eq!(opt.lambda_gan, 1.0);
        assert_eq!(opt.lambda_dual, 10.0);
        assert_eq!(opt.lambda_id, 5.0);
        assert!(!opt.is_train);
    }

    #[test]
    fn flags_and_overrides_parse() {
        let opt = parse(&[
            "--batchSize",
            "4",
            "--no_flip",
            "--serial_batches",
            "--model",
            "cyclegan",
            "--gpu_ids",
            "-1",
            "--max_dataset_size",
            "1000",
            "--display_id",
            "-1",
        ])
        .unwrap();
        assert_eq!(opt.batch_size, 4);
        assert!(opt.no_flip);
        assert!(opt.serial_batches);
        assert!(!opt.no_dropout);
        assert_eq!(opt.model, ModelKind::CycleGan);
        assert!(opt.gpu_ids.is_empty());
        assert_eq!(opt.max_dataset_size, 1000.0);
        assert_eq!(opt.display_id, -1);
    }

    #[test]
    fn invalid_values_are_usage_errors() {
        for args in [
            &["--model", "invalid_choice"][..],
            &["--batchSize", "four"],
            &["--gpu_ids", "0,a"],
            &["--max_dataset_size", "1.5"],
            &["--unknown_option", "1"],
        ] {
            assert!(parse(args).is_err(), "{args:?} should be rejected");
        }
    }

    #[test]
    fn negative_loss_weights_parse_as_separate_tokens() {
        let opt = parse(&["--beta", "-1.0", "--alpha_G", "-0.5", "--lambda_id", "-2"]).unwrap();
        assert_eq!(opt.beta, -1.0);
        assert_eq!(opt.alpha_g, -0.5);
        assert_eq!(opt.lambda_id, -2.0);
        assert_eq!(opt.run_name(), "A_-0.5_B_0.5_C_-1.0_D_1.0");
    }

    #[test]
    fn line_breaks_in_values_are_rejected() {
        assert!(parse(&["--dataroot", "a\nb"]).is_err());
        assert!(parse(&["--model_dir", "w\r"]).is_err());
        assert!(parse(&["--norm", "batch\ninstance"]).is_err());
        assert!(parse(&["--dataroot", "./data with spaces"]).is_ok());
    }

    #[test]
    fn dataset_size_lists_as_whole_count() {
        let entries = parse(&["--max_dataset_size", "1000"]).unwrap().entries();
        assert_eq!(entries["max_dataset_size"], "1000");
    }

    #[test]
    fn checkpoint_dir_from_loss_weights() {
        let opt = parse(&["--dataroot", "./data"]).unwrap();
        assert_eq!(
            opt.derived_checkpoints_dir(),
            PathBuf::from("./data/checkpoints/DLP_GAN/A_1.0_B_0.5_C_10.0_D_1.0")
        );

        let opt = parse(&["--dataroot", "./data", "--model", "DSTN", "--beta", "2.5"]).unwrap();
        assert_eq!(opt.run_name(), "A_1.0_B_0.5_C_2.5_D_1.0");
        assert!(opt.derived_checkpoints_dir().ends_with("DSTN/A_1.0_B_0.5_C_2.5_D_1.0"));
    }

    #[test]
    fn entries_cover_every_option() {
        let entries = parse(&[]).unwrap().entries();
        assert_eq!(entries.len(), 36);
        assert_eq!(entries["gpu_ids"], "[0]");
        assert_eq!(entries["max_dataset_size"], "inf");
        assert_eq!(entries["model"], "DLP_GAN");
        assert_eq!(entries["isTrain"], "false");
        // Byte order: capitalised names sort first.
        let keys: Vec<_> = entries.keys().copied().collect();
        assert_eq!(&keys[..2], &["alpha_F", "alpha_G"]);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
