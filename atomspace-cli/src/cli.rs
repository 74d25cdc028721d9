//! Contains structures and functionality for the binary
use std::path::PathBuf;

/// Possible settings for the reporting option.
#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub(crate) enum Reporting {
    /// Disable reporting.
    None,
    /// Print short report if atoms are not printed. Otherwise disable reporting.
    #[default]
    Auto,
    /// Print short report.
    Short,
    /// Print statistics of the atomspace as JSON.
    Json,
}

impl Reporting {
    /// Resolve [Reporting::Auto] given whether atoms go to stdout
    pub(crate) fn resolve(self, printing: bool) -> Self {
        match self {
            Self::Auto if printing => Self::None,
            Self::Auto => Self::Short,
            other => other,
        }
    }
}

/// Cli Arguments related to logging
#[derive(clap::Args, Debug)]
pub(crate) struct LoggingArgs {
    /// Increase log verbosity (multiple uses increase verbosity further)
    #[arg(short, long, action = clap::builder::ArgAction::Count, group = "verbosity")]
    verbose: u8,
    /// Reduce log verbosity to show only errors (equivalent to --log error)
    #[arg(short, long, group = "verbosity")]
    quiet: bool,
    /// Set log verbosity (default is "warn")
    #[arg(long = "log", value_parser=clap::builder::PossibleValuesParser::new(["error", "warn", "info", "debug", "trace"]), group = "verbosity")]
    log_level: Option<String>,
}

impl LoggingArgs {
    /// Initialising Logging
    ///
    /// Sets the logging verbosity to the given log-level in the following order:
    ///  * `Info`, `Debug`, `Trace`; depending on the count of `-v`
    ///  * `Error` when `-q` is used
    ///  * The `ATOMSPACE_LOG` environment variable value
    ///  * `Warn` otherwise
    pub(crate) fn initialize_logging(&self) {
        let mut builder = env_logger::Builder::new();

        // Default log level
        builder.filter_level(log::LevelFilter::Warn);

        builder.parse_env("ATOMSPACE_LOG");
        if let Some(ref level) = self.log_level {
            builder.parse_filters(level);
        } else if self.quiet {
            builder.filter_level(log::LevelFilter::Error);
        } else if self.verbose > 0 {
            builder.filter_level(match self.verbose {
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                3 => log::LevelFilter::Trace,
                _ => log::LevelFilter::Warn,
            });
        }
        builder.init();
    }
}

/// Cli arguments related to output
#[derive(Debug, clap::Args)]
pub(crate) struct OutputArgs {
    /// Print all atoms in sorted order
    #[arg(short, long = "print")]
    pub(crate) print: bool,
    /// Write all atoms in sorted order to the given file
    #[arg(short, long = "dump")]
    pub(crate) dump: Option<PathBuf>,
    /// Replace the dump file if it exists
    #[arg(short, long = "overwrite", default_value = "false", requires = "dump")]
    pub(crate) overwrite: bool,
}

/// Atomese CLI
#[derive(clap::Parser, Debug)]
#[command(author, version, about)]
pub struct CliApp {
    /// Atomese files to load into the atomspace
    #[arg(value_parser)]
    pub(crate) files: Vec<PathBuf>,
    /// Arguments related to output
    #[command(flatten)]
    pub(crate) output: OutputArgs,
    /// Control amount of reporting printed by the program
    #[arg(long = "report", value_enum, default_value_t)]
    pub(crate) reporting: Reporting,
    /// Print the hierarchy of atom types
    #[arg(long = "types")]
    pub(crate) types: bool,
    /// Mark the atomspace read-only once all files are loaded
    #[arg(long = "read-only")]
    pub(crate) read_only: bool,
    /// Arguments related to logging
    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}
