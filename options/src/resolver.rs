//! Option resolution: parse, transform, select the device, persist.

use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::Path,
};

use clap::{Command, CommandFactory, FromArgMatches};

use crate::{
    backend::{BackendSelector, DeviceSelector},
    config::{Options, Phase},
    error::{OptionsError, OptionsResult},
    snapshot::{render_listing, write_snapshot},
};

/// Fully resolved options together with the selected compute device.
#[derive(Debug, Clone)]
pub struct Resolved<D> {
    /// The resolved option record.
    pub options: Options,
    /// Device for `gpu_ids[0]`, `None` when running on the CPU.
    pub device: Option<D>,
}

/// Resolves run options for one pipeline phase.
///
/// ```no_run
/// use dlpgan_options::{BaseOptions, Phase};
///
/// let resolved = BaseOptions::new(Phase::Train).parse()?;
/// println!("checkpoints in {}", resolved.options.checkpoints_dir.display());
/// # Ok::<(), dlpgan_options::OptionsError>(())
/// ```
#[derive(Debug)]
pub struct BaseOptions<S = BackendSelector> {
    phase: Phase,
    selector: S,
    command: Option<Command>,
}

impl BaseOptions {
    /// Creates a resolver using the compiled backend's devices.
    #[must_use]
    pub fn new(phase: Phase) -> Self {
        Self::with_selector(phase, BackendSelector)
    }
}

impl<S: DeviceSelector> BaseOptions<S> {
    /// Creates a resolver with a custom device selector.
    pub fn with_selector(phase: Phase, selector: S) -> Self {
        Self {
            phase,
            selector,
            command: None,
        }
    }

    /// The phase injected as `isTrain`.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The device selector used for `gpu_ids[0]`.
    #[must_use]
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Whether the option schema has been registered.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.command.is_some()
    }

    /// Registers the option schema. Later calls are no-ops.
    ///
    /// The command is built on registration, so the returned schema already
    /// includes the generated `--help` argument and never changes afterwards.
    pub fn initialize(&mut self) -> &mut Command {
        self.command.get_or_insert_with(|| {
            tracing::debug!("registering option schema");
            let mut command = Options::command();
            command.build();
            command
        })
    }

    /// Resolves options from the process arguments.
    ///
    /// # Errors
    ///
    /// See [`BaseOptions::parse_from`].
    pub fn parse(&mut self) -> OptionsResult<Resolved<S::Device>> {
        self.parse_from(std::env::args_os())
    }

    /// Resolves options from `args`, whose first item is the program name.
    ///
    /// The listing is echoed to stdout; see [`BaseOptions::parse_from_to`].
    ///
    /// # Errors
    ///
    /// See [`BaseOptions::parse_from_to`].
    pub fn parse_from<I, T>(&mut self, args: I) -> OptionsResult<Resolved<S::Device>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.parse_from_to(args, &mut io::stdout().lock())
    }

    /// Resolves options from `args`, echoing the listing to `echo`.
    ///
    /// Selects the device for the first GPU id, derives the checkpoint
    /// directory, creates it, writes the listing to `echo` and to `opt.txt`.
    /// Nothing is returned unless every step succeeds.
    ///
    /// # Errors
    ///
    /// - [`OptionsError::Usage`] for unknown arguments or invalid values,
    /// - [`OptionsError::DeviceUnavailable`] if the first GPU id is unusable,
    /// - [`OptionsError::CheckpointDir`], [`OptionsError::Echo`] or
    ///   [`OptionsError::SnapshotWrite`] on IO failures.
    pub fn parse_from_to<I, T, W>(
        &mut self,
        args: I,
        echo: &mut W,
    ) -> OptionsResult<Resolved<S::Device>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        W: Write + ?Sized,
    {
        let matches = self.initialize().try_get_matches_from_mut(args)?;
        let mut options = Options::from_arg_matches(&matches)?;
        options.is_train = self.phase.is_train();

        let device = match options.gpu_ids.primary() {
            Some(id) => {
                let device = self.selector.select(id)?;
                tracing::info!(id, ?device, "compute device selected");
                Some(device)
            }
            None => {
                tracing::info!("no GPU requested, running on CPU");
                None
            }
        };

        options.checkpoints_dir = options.derived_checkpoints_dir();
        create_checkpoint_dir(&options.checkpoints_dir)?;

        let listing = render_listing(&options);
        echo
            .write_all(listing.as_bytes())
            .and_then(|()| echo.flush())
            .map_err(|source| OptionsError::Echo { source })?;
        write_snapshot(&options.checkpoints_dir, &listing)?;

        Ok(Resolved { options, device })
    }
}

fn create_checkpoint_dir(path: &Path) -> OptionsResult<()> {
    fs::create_dir_all(path).map_err(|source| OptionsError::CheckpointDir {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "checkpoint directory ready");
    Ok(())
}
