use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};

use qrstudio::config::Config;
use qrstudio::remote::{self, JsonFileStore, RemoteHistory};
use qrstudio::payload::{self, WifiSecurity};
use qrstudio::session::{self, SIZE_MAX, SIZE_MIN};
use qrstudio::{color, render, Category, Color, ErrorLevel, ExportFormat, HistoryStore, Session};

#[derive(Parser)]
#[command(name = "qrstudio", about = "Compose, export and track QR-style codes", version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "QRSTUDIO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a code and download it
    Generate(GenerateArgs),
    /// Inspect and manage the download history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List content categories and their default payloads
    Categories,
    /// List the preset color pairs
    Presets,
    /// List the error correction levels
    Levels,
    /// Simple form drawn by the remote image endpoint
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Content category
    #[arg(long, short = 'c', default_value = "url")]
    category: String,
    /// Payload text (defaults to the category's template)
    #[arg(long, short = 't')]
    text: Option<String>,
    /// WhatsApp phone number
    #[arg(long)]
    phone: Option<String>,
    /// WhatsApp message
    #[arg(long)]
    message: Option<String>,
    /// WiFi network name; builds the payload for the wifi category
    #[arg(long)]
    ssid: Option<String>,
    /// WiFi password
    #[arg(long, requires = "ssid")]
    password: Option<String>,
    /// WiFi security: WPA, WEP or nopass
    #[arg(long, default_value = "WPA")]
    security: String,
    /// Foreground color (#RRGGBB)
    #[arg(long)]
    fg: Option<String>,
    /// Background color (#RRGGBB)
    #[arg(long)]
    bg: Option<String>,
    /// Preset color pair, overridden by --fg/--bg
    #[arg(long)]
    preset: Option<String>,
    /// Size in pixels, snapped to steps of 32
    #[arg(
        long,
        short = 's',
        value_parser = clap::value_parser!(u32).range(i64::from(SIZE_MIN)..=i64::from(SIZE_MAX))
    )]
    size: Option<u32>,
    /// Error correction level (L, M, Q, H)
    #[arg(long, short = 'l')]
    level: Option<String>,
    /// Output format: png, jpg, webp, svg or pdf
    #[arg(long, short = 'f', default_value = "png")]
    format: String,
    /// Quality for jpg/webp, in (0, 1]
    #[arg(long, short = 'q')]
    quality: Option<f32>,
    /// Output directory
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
    /// Print the code to the terminal
    #[arg(long)]
    preview: bool,
    /// Copy the payload to the clipboard
    #[arg(long)]
    copy: bool,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List entries, newest first
    List,
    /// Delete one entry
    Delete { id: u64 },
    /// Delete every entry
    Clear,
    /// Copy an entry's payload to the clipboard
    Copy { id: u64 },
    /// Load an entry and download it again
    Restore {
        id: u64,
        #[arg(long, short = 'f', default_value = "png")]
        format: String,
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Submit a text to the simple form
    Submit {
        text: String,
        #[arg(long, default_value = "#000000")]
        fg: String,
        #[arg(long, default_value = "#FFFFFF")]
        bg: String,
        #[arg(long, default_value = "200")]
        size: u32,
    },
    /// List stored entries, oldest first
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Generate(args) => generate(&config, args),
        Commands::History { action } => history(&config, action),
        Commands::Categories => {
            for category in Category::ALL {
                println!(
                    "{:<10} {:<10} {}",
                    category.slug(),
                    category.label(),
                    category.default_payload()
                );
            }
            Ok(())
        }
        Commands::Presets => {
            for preset in color::PRESETS {
                println!("{:<8} {} on {}", preset.name, preset.foreground, preset.background);
            }
            Ok(())
        }
        Commands::Levels => {
            for level in ErrorLevel::ALL {
                println!("{}  ~{}% recovery", level, level.recovery_percent());
            }
            Ok(())
        }
        Commands::Remote { action } => remote_form(&config, action),
    }
}

fn open_session(config: &Config) -> Result<Session> {
    let history = HistoryStore::load(&config.paths.history_file).with_context(|| {
        format!("Failed to read history file: {}", config.paths.history_file.display())
    })?;
    Ok(Session::new(config.initial_request()).with_history(history))
}

fn save_history(config: &Config, session: &Session) -> Result<()> {
    session
        .history()
        .save(&config.paths.history_file)
        .with_context(|| {
            format!("Failed to write history file: {}", config.paths.history_file.display())
        })
}

fn generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let mut session = open_session(config)?;

    let category: Category = args.category.parse()?;
    session.set_category(category);
    if let Some(text) = args.text {
        session.set_text(text);
    }
    if let Some(phone) = args.phone {
        session.set_whatsapp_number(phone);
    }
    if let Some(message) = args.message {
        session.set_whatsapp_message(message);
    }
    if let Some(ssid) = &args.ssid {
        if category != Category::Wifi {
            bail!("--ssid only applies to the wifi category");
        }
        let security: WifiSecurity = args.security.parse()?;
        let password = args.password.as_deref().unwrap_or_default();
        session.set_text(payload::wifi_payload(ssid, password, security));
    }

    let (mut fg, mut bg) = (config.defaults.foreground, config.defaults.background);
    if let Some(name) = &args.preset {
        let preset = color::preset(name).with_context(|| format!("Unknown preset `{name}`"))?;
        (fg, bg) = (preset.foreground, preset.background);
    }
    if let Some(hex) = &args.fg {
        fg = Color::from_hex(hex)?;
    }
    if let Some(hex) = &args.bg {
        bg = Color::from_hex(hex)?;
    }
    session.set_colors(fg, bg);
    if let Some(size) = args.size {
        let snapped = session::snap_size(size);
        if snapped != size {
            log::warn!("size {size} snapped to {snapped}");
        }
        session.set_size(snapped);
    }
    if let Some(level) = &args.level {
        session.set_error_level(level.parse::<ErrorLevel>()?);
    }

    if args.preview {
        print!("{}", render::to_terminal_string(session.matrix()));
    }

    let format: ExportFormat = args.format.parse()?;
    let quality = args.quality.unwrap_or(config.defaults.jpeg_quality);
    let artifact = session.download_now(format, Some(quality))?;
    let out = args.out.as_deref().unwrap_or(&config.paths.output_dir);
    let path = artifact.write_to(out)?;
    save_history(config, &session)?;

    println!("{}", path.display());
    if args.copy {
        copy_text(session.payload())?;
    }
    Ok(())
}

fn history(config: &Config, action: HistoryAction) -> Result<()> {
    let mut session = open_session(config)?;
    match action {
        HistoryAction::List => {
            if session.history().is_empty() {
                println!("No codes saved yet");
            }
            for entry in session.history().entries() {
                println!(
                    "{}  {:<10} {:<22} {}",
                    entry.id,
                    entry.category.label(),
                    entry.created_at,
                    entry.summary(40)
                );
            }
        }
        HistoryAction::Delete { id } => {
            if !session.delete_from_history(id) {
                bail!("No history entry with id {id}");
            }
            save_history(config, &session)?;
        }
        HistoryAction::Clear => {
            session.clear_history();
            save_history(config, &session)?;
        }
        HistoryAction::Copy { id } => {
            let entry = session
                .history()
                .get(id)
                .with_context(|| format!("No history entry with id {id}"))?;
            copy_text(&entry.content)?;
        }
        HistoryAction::Restore { id, format, out } => {
            session.load_from_history(id)?;
            let format: ExportFormat = format.parse()?;
            let artifact = session.download_now(format, Some(config.defaults.jpeg_quality))?;
            let path = artifact.write_to(out.as_deref().unwrap_or(&config.paths.output_dir))?;
            save_history(config, &session)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn remote_form(config: &Config, action: RemoteAction) -> Result<()> {
    let store = JsonFileStore::new(&config.paths.remote_store_file);
    let mut history = RemoteHistory::open(store).with_context(|| {
        format!("Failed to read storage file: {}", config.paths.remote_store_file.display())
    })?;
    match action {
        RemoteAction::Submit { text, fg, bg, size } => {
            let fg = Color::from_hex(&fg)?;
            let bg = Color::from_hex(&bg)?;
            match history.submit(&text, fg, bg, size) {
                Ok(Some(entry)) => println!("{}", remote::thumbnail_url(&entry)),
                Ok(None) => log::info!("nothing to submit"),
                Err(qrstudio::Error::DuplicateEntry(_)) => {
                    eprintln!("The code already exists in the history");
                }
                Err(e) => return Err(e.into()),
            }
        }
        RemoteAction::List => {
            for entry in history.entries() {
                println!("{}  {}  {}", entry.created, entry.text, remote::thumbnail_url(entry));
            }
        }
    }
    Ok(())
}

#[cfg(feature = "system-clipboard")]
fn copy_text(text: &str) -> Result<()> {
    use qrstudio::clipboard::{ClipboardSink as _, SystemClipboard};

    SystemClipboard.set_text(text)?;
    println!("Content copied to the clipboard");
    Ok(())
}

#[cfg(not(feature = "system-clipboard"))]
fn copy_text(_text: &str) -> Result<()> {
    bail!("Clipboard support is disabled in this build")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn cli_parse_generate_defaults() {
        let cli = Cli::parse_from(["qrstudio", "generate"]);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.category, "url");
                assert_eq!(args.format, "png");
                assert!(args.size.is_none());
                assert!(!args.preview);
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn cli_parse_generate_whatsapp() {
        let cli = Cli::parse_from([
            "qrstudio", "generate", "-c", "whatsapp", "--phone", "+34 600", "--message", "hola",
            "-f", "jpg", "-q", "0.8", "-s", "320",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.category, "whatsapp");
                assert_eq!(args.phone.as_deref(), Some("+34 600"));
                assert_eq!(args.quality, Some(0.8));
                assert_eq!(args.size, Some(320));
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn cli_parse_generate_wifi() {
        let cli = Cli::parse_from([
            "qrstudio", "generate", "-c", "wifi", "--ssid", "Cafe", "--password", "pw",
            "--security", "nopass",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.ssid.as_deref(), Some("Cafe"));
                assert_eq!(args.password.as_deref(), Some("pw"));
                assert_eq!(args.security, "nopass");
            }
            _ => panic!("expected Generate command"),
        }
        assert!(Cli::try_parse_from(["qrstudio", "generate", "--password", "pw"]).is_err());
    }

    #[test]
    fn cli_parse_levels() {
        let cli = Cli::parse_from(["qrstudio", "levels"]);
        assert!(matches!(cli.command, Commands::Levels));
    }

    #[test]
    fn cli_rejects_size_out_of_range() {
        assert!(Cli::try_parse_from(["qrstudio", "generate", "-s", "1024"]).is_err());
        assert!(Cli::try_parse_from(["qrstudio", "generate", "-s", "64"]).is_err());
    }

    #[test]
    fn cli_parse_history_restore() {
        let cli = Cli::parse_from(["qrstudio", "-v", "history", "restore", "42", "-f", "svg"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::History { action: HistoryAction::Restore { id, format, out } } => {
                assert_eq!(id, 42);
                assert_eq!(format, "svg");
                assert!(out.is_none());
            }
            _ => panic!("expected History Restore command"),
        }
    }

    #[test]
    fn cli_parse_remote_submit() {
        let cli = Cli::parse_from(["qrstudio", "remote", "submit", "hello", "--fg", "#DC2626"]);
        match cli.command {
            Commands::Remote { action: RemoteAction::Submit { text, fg, bg, size } } => {
                assert_eq!(text, "hello");
                assert_eq!(fg, "#DC2626");
                assert_eq!(bg, "#FFFFFF");
                assert_eq!(size, 200);
            }
            _ => panic!("expected Remote Submit command"),
        }
    }
}
