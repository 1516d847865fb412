//! CLI entry point for `cellchat`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};

use cellchat::config::Config;
use cellchat::media::{MediaCache, PreviewFetcher};
use cellchat::messages::AttachmentMessage;
use cellchat::render::{ansi, ColorDepth, RenderPreferences};

/// Width used by `print` when the terminal size is unknown.
const DEFAULT_WIDTH: usize = 80;

#[derive(Parser)]
#[command(name = "cellchat", version, about = "Render chat attachments in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Open files as attachment messages in the TUI
    Show {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Render one file as an attachment message to stdout
    Print {
        file: PathBuf,
        /// Columns to lay out for (defaults to the terminal width)
        #[arg(short, long)]
        width: Option<usize>,
        /// Colour depth: mono, 16, 256, truecolor
        #[arg(short, long)]
        depth: Option<String>,
    },
    /// Show what an attachment message for a file would contain
    Inspect {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = cellchat::config::load_config();

    // Configure logging: log file, plus stderr outside the TUI
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let interactive = matches!(cli.command, Commands::Show { .. });
    setup_logging(log_level, &config, !interactive);

    match cli.command {
        Commands::Show { files } => cmd_show(&files, config),
        Commands::Print { file, width, depth } => {
            cmd_print(&file, width, depth.as_deref(), &config)
        }
        Commands::Inspect { file, json } => cmd_inspect(&file, json, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with file logging and, optionally, stderr output.
fn setup_logging(level: &str, config: &Config, stderr: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer =
        stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    // Try to set up file logging
    let log_dir = cellchat::config::cache_dir(config);
    let file_layer = if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "cellchat.log");
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Build an attachment message for a local file, with its preview loaded.
fn load_attachment(path: &Path, config: &Config) -> anyhow::Result<AttachmentMessage> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let cache = MediaCache::new(
        config.media.homeserver_url.clone(),
        cellchat::config::cache_dir(config),
    );
    let event = cache.import_event(path)?;
    let mut message = AttachmentMessage::new(PreviewFetcher::new(Arc::new(cache)), &event);
    message.fetch_preview();
    Ok(message)
}

fn cmd_show(files: &[PathBuf], config: Config) -> anyhow::Result<()> {
    for file in files {
        if !file.exists() {
            anyhow::bail!("File not found: {}", file.display());
        }
    }
    cellchat::tui::run_tui(files, config)
}

/// Lay out a single attachment and write it to stdout with ANSI colours.
fn cmd_print(
    path: &Path,
    width: Option<usize>,
    depth: Option<&str>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut prefs: RenderPreferences = config.display.render_preferences();
    if let Some(name) = depth {
        prefs.color_depth = ColorDepth::from_name(name).ok_or_else(|| {
            anyhow::anyhow!("Unknown colour depth '{name}'. Supported: mono, 16, 256, truecolor")
        })?;
    }

    let width = width.unwrap_or_else(|| {
        crossterm::terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(DEFAULT_WIDTH)
    });

    let mut message = load_attachment(path, config)?;
    let rows = message.lay_out(prefs, width);

    let mut stdout = std::io::stdout().lock();
    ansi::write_rows(&mut stdout, rows)?;
    Ok(())
}

/// Print the message contract outputs for a file.
fn cmd_inspect(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    use humansize::{format_size, BINARY};

    let message = load_attachment(path, config)?;
    let fetcher = message.fetcher();
    let download_url = fetcher.download_url(message.source()).ok();
    let cache_path = message.thumbnail_path();
    let size = message.bytes().map(<[u8]>::len);

    if json {
        let output = serde_json::json!({
            "file": path.to_string_lossy(),
            "kind": message.kind(),
            "caption": message.caption(),
            "uri": message.source().to_string(),
            "notification": message.notification_line(),
            "plain_text": message.plain_text(),
            "download_url": download_url,
            "cache_path": cache_path.as_ref().map(|p| p.to_string_lossy()),
            "preview_size": size,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  {:<20} {}", "File", path.display());
    println!("  {:<20} {:?}", "Kind", message.kind());
    println!("  {:<20} {}", "URI", message.source());
    println!("  {:<20} {}", "Notification", message.notification_line());
    println!("  {:<20} {}", "Plain text", message.plain_text());
    if let Some(url) = &download_url {
        println!("  {:<20} {url}", "Download URL");
    }
    match (&cache_path, size) {
        (Some(p), Some(size)) => {
            println!("  {:<20} {}", "Preview", p.display());
            println!("  {:<20} {}", "Preview size", format_size(size as u64, BINARY));
        }
        _ => println!("  {:<20} none", "Preview"),
    }
    println!();
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "cellchat", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
