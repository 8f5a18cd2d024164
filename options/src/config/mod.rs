//! Option schema for the image-translation pipeline.
//!
//! - `core`: the `Options` record, its clap schema and derived values
//! - `enums`: model choice and pipeline phase

pub mod core;
pub mod enums;

pub use self::core::{format_float, GpuIds, Options};
pub use self::enums::{ModelKind, Phase};
