use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seminal_slicer::commands::{
    analyze_command, lines_command, primitives_command, targets_command,
};

/// Source-line-correlated backward slicer.
///
/// This CLI is a thin wrapper around `seminal-core`. All substantive logic
/// lives in the library so it can be tested without the binary.
#[derive(Parser, Debug)]
#[command(
    name = "seminal-slicer",
    version,
    about = "Decide whether branch variables trace back to program input",
    long_about = None
)]
struct Cli {
    /// Log analysis passes at debug level. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an IR module and report a verdict for every variable on the
    /// target lines.
    ///
    /// Target lines come from `--line`, `--targets`, or the config's
    /// `targets_file`. With none of those, every conditional branch line is
    /// a target.
    Analyze {
        /// IR module (JSON for `.json`, YAML otherwise).
        #[arg(long)]
        ir: String,

        /// Target-line file (`file,line,...` per record).
        #[arg(long)]
        targets: Option<String>,

        /// Extra target line; may be repeated.
        #[arg(long = "line")]
        lines: Vec<u32>,

        /// Slicer config (JSON or YAML).
        #[arg(long)]
        config: Option<String>,

        /// Directory the module's source file is resolved against.
        #[arg(long)]
        source_root: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the variables named on each source line of an IR module.
    Lines {
        #[arg(long)]
        ir: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the line numbers parsed from a target file.
    Targets {
        #[arg(long)]
        file: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List input and format primitives.
    Primitives {
        /// Slicer config (JSON or YAML). Defaults apply when omitted.
        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze { ir, targets, lines, config, source_root, json } => analyze_command(
            &ir,
            targets.as_deref(),
            &lines,
            config.as_deref(),
            source_root.as_deref(),
            json,
        )?,
        Command::Lines { ir, json } => lines_command(&ir, json)?,
        Command::Targets { file, json } => targets_command(&file, json)?,
        Command::Primitives { config, json } => primitives_command(config.as_deref(), json)?,
    }

    Ok(())
}
