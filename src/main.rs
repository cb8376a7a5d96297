//! qrforge command-line entrypoint

use clap::{Parser, Subcommand, ValueEnum};
use qrforge::loader::CapabilityResolver;
use qrforge::payload::{EmailMessage, PayloadRequest, VCardContact, WifiCredentials, WifiSecurity};
use qrforge::render::{self, preview, verify};
use qrforge::{Error, PreferenceStore, QrforgeConfig, Result, Theme, logging};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "qrforge",
    version,
    about = "Build URL, WiFi, vCard and mailto QR codes and save them as PNG"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrforge.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Image edge length in pixels
    #[arg(long, value_name = "PIXELS", global = true)]
    size: Option<u32>,

    /// Error correction level (L, M, Q or H)
    #[arg(long, value_name = "LEVEL", global = true)]
    level: Option<String>,

    /// Output PNG path. Defaults to qrcode-<mode>.png
    #[arg(short, long, value_name = "PATH", global = true)]
    output: Option<PathBuf>,

    /// Print the code to the terminal using the saved theme
    #[arg(long, global = true)]
    preview: bool,

    /// Decode the rendered image and check it matches the payload
    #[arg(long, global = true)]
    verify: bool,

    /// Output results as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a URL or free text
    Url {
        /// Text to encode
        text: Option<String>,
    },
    /// Encode WiFi network credentials
    Wifi {
        /// Network name
        #[arg(long, default_value = "")]
        ssid: String,
        /// Network passphrase
        #[arg(long, default_value = "")]
        password: String,
        /// Authentication type: WPA, WEP or nopass
        #[arg(long, default_value = "WPA", value_parser = parse_security)]
        security: WifiSecurity,
        /// Mark the network as hidden
        #[arg(long)]
        hidden: bool,
    },
    /// Encode a vCard contact
    Vcard {
        /// Given name
        #[arg(long, default_value = "")]
        first: String,
        /// Family name
        #[arg(long, default_value = "")]
        last: String,
        /// Mobile phone number
        #[arg(long, default_value = "")]
        phone: String,
        /// Email address
        #[arg(long, default_value = "")]
        email: String,
        /// Organisation
        #[arg(long, default_value = "")]
        org: String,
        /// Job title
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Encode a mailto link
    Email {
        /// Recipient address
        #[arg(long, default_value = "")]
        to: String,
        /// Subject line
        #[arg(long, default_value = "")]
        subject: String,
        /// Message body
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Show or change the preview theme
    Theme {
        /// New theme; omit to print the current one
        choice: Option<ThemeChoice>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

fn parse_security(value: &str) -> std::result::Result<WifiSecurity, String> {
    WifiSecurity::parse(value)
        .ok_or_else(|| format!("unknown security '{value}', expected WPA, WEP or nopass"))
}

impl Command {
    fn into_request(self) -> Option<PayloadRequest> {
        Some(match self {
            Command::Url { text } => PayloadRequest::Url(text.unwrap_or_default()),
            Command::Wifi {
                ssid,
                password,
                security,
                hidden,
            } => PayloadRequest::Wifi(WifiCredentials {
                ssid,
                password,
                security,
                hidden,
            }),
            Command::Vcard {
                first,
                last,
                phone,
                email,
                org,
                title,
            } => PayloadRequest::Vcard(VCardContact {
                first_name: first,
                last_name: last,
                phone,
                email,
                organization: org,
                title,
            }),
            Command::Email { to, subject, body } => PayloadRequest::Email(EmailMessage {
                address: to,
                subject,
                body,
            }),
            Command::Theme { .. } => return None,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QrforgeConfig::load(cli.config.as_deref())?;
    if let Some(size) = cli.size {
        config.render.size = size;
    }
    if let Some(ref level) = cli.level {
        config.render.level = level.clone();
    }

    logging::init(&config.logging)?;

    let prefs = PreferenceStore::open(config.preferences.state_file.as_deref());

    if let Command::Theme { choice } = cli.command {
        return handle_theme(prefs.as_ref(), choice, cli.json);
    }

    // Declared before the payload is assembled so the primary channel is
    // already loading by the time rendering is requested.
    let resolver = CapabilityResolver::from_options(&config.loader)?;

    let request = cli
        .command
        .into_request()
        .ok_or_else(|| Error::Other("no payload command given".to_string()))?;
    let mode = request.mode();
    let text = request
        .build()
        .ok_or_else(|| Error::EmptyPayload(mode.to_string()))?;

    info!(%mode, "Loading QR renderer");
    resolver.ensure_capability().await;
    let backend = resolver.capability().ok_or(Error::CapabilityUnavailable)?;

    let options = config.render.to_render_options();
    info!(%mode, backend = backend.name(), "Generating");
    let rendered = render::render_payload(&backend, &text, &options).await?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(render::default_file_name(mode.as_str())));
    rendered.save_png(&output)?;

    if cli.verify {
        verify::check(&rendered.image, &text)?;
        info!("Rendered code decodes back to the payload");
    }

    let terminal = if cli.preview {
        let theme = prefs.as_ref().map(PreferenceStore::load_theme).unwrap_or_default();
        Some(preview::render_terminal(&rendered.image, theme)?)
    } else {
        None
    };

    if cli.json {
        let summary = json!({
            "mode": mode,
            "payload": text,
            "output": output.display().to_string(),
            "backend": rendered.backend,
            "width": rendered.image.width(),
            "height": rendered.image.height(),
            "level": options.level.as_letter(),
            "verified": cli.verify,
            "fallback_injections": resolver.fallback_injections(),
            "preview": terminal,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if let Some(ref terminal) = terminal {
            print!("{terminal}");
        }
        println!(
            "Ready. Saved {} ({}x{}, level {}, {} renderer)",
            output.display(),
            rendered.image.width(),
            rendered.image.height(),
            options.level,
            rendered.backend
        );
    }

    Ok(())
}

fn handle_theme(
    store: Option<&PreferenceStore>,
    choice: Option<ThemeChoice>,
    json: bool,
) -> Result<()> {
    let store = store.ok_or_else(|| {
        Error::Config("No preferences location; set preferences.state_file".to_string())
    })?;

    let current = store.load_theme();
    let theme = match choice {
        None => current,
        Some(ThemeChoice::Light) => Theme::Light,
        Some(ThemeChoice::Dark) => Theme::Dark,
        Some(ThemeChoice::Toggle) => current.toggled(),
    };

    if choice.is_some() {
        if let Err(err) = store.save_theme(theme) {
            warn!(path = %store.path().display(), error = %err, "Failed to save theme preference");
        }
    }

    if json {
        let value = json!({ "theme": theme, "path": store.path().display().to_string() });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{theme}");
    }

    Ok(())
}
