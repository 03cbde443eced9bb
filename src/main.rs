use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use ecprops::{
    find_config_file, generate_init_file, load_config, merge_output_format,
    merge_resolver_options, run, should_use_colors, CliResolverOptions, Config, EcpropsToml,
    OutputContext, OutputFormat,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecprops")]
#[command(version, about = "Print the EditorConfig properties that apply to files")]
struct Cli {
    /// Target files or directories
    #[arg(required_unless_present = "init")]
    paths: Vec<String>,

    /// Config file name to look for [default: .editorconfig]
    #[arg(short, long, value_name = "NAME")]
    filename: Option<String>,

    /// Number of directories searched, starting with the file's own
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Never search above this directory
    #[arg(long, value_name = "DIR")]
    stop_at: Option<PathBuf>,

    /// Fill in tab_width / indent_size from each other
    #[arg(long)]
    derive_defaults: bool,

    /// Output format [default: plain]
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print the config files that apply instead of their properties
    #[arg(long)]
    files: bool,

    /// Suppress warnings
    #[arg(short, long)]
    quiet: bool,

    /// Force colored output
    #[arg(long)]
    color: bool,

    /// Disable colored output
    #[arg(long, conflicts_with = "color")]
    no_color: bool,

    /// Log to stderr (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Generate a template ecprops.toml configuration file
    #[arg(long)]
    init: bool,

    /// Specify config file path (overrides auto-discovery)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Handle --init command
    if cli.init {
        return handle_init();
    }

    let toml_config = load_configuration(&cli.config);

    // Merge configurations: CLI > TOML > defaults
    let cli_options = build_cli_options(&cli);
    let resolver = merge_resolver_options(&cli_options, toml_config.as_ref().map(|c| &c.resolver));
    let format = merge_output_format(&cli_options, toml_config.as_ref().map(|c| &c.output));

    let config = Config {
        resolver,
        format,
        list_files: cli.files,
    };
    let ctx = OutputContext::new(should_use_colors(cli.color, cli.no_color), cli.quiet);

    match run(&cli.paths, &config, &ctx) {
        Ok(result) => {
            if result.has_errors() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
        0 => return,
        1 => EnvFilter::new("warn"),
        2 => EnvFilter::new("info"),
        3 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(()) => info!("logging initialised"),
        Err(e) => eprintln!("Failed to initialise logging, continuing with none\n{e}"),
    }
}

fn handle_init() -> ExitCode {
    match generate_init_file() {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn load_configuration(explicit_path: &Option<PathBuf>) -> Option<EcpropsToml> {
    let config_path = explicit_path.clone().or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|d| find_config_file(&d))
    });

    config_path.and_then(|p| match load_config(&p) {
        Ok(config) => {
            info!(path = %p.display(), "using config");
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: Failed to load {}: {}", p.display(), e);
            None
        }
    })
}

fn build_cli_options(cli: &Cli) -> CliResolverOptions {
    // Boolean flags in clap are always present (default false), so we
    // treat false as "not set" for proper merging with config file.
    CliResolverOptions {
        filename: cli.filename.clone(),
        max_depth: cli.max_depth,
        stop_at: cli.stop_at.clone(),
        derive_defaults: cli.derive_defaults.then_some(true),
        format: cli.format,
    }
}
