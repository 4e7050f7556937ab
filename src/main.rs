//! Homevoice - Entry Point
//!
//! Loads the configuration, builds the assistant and runs a line-oriented
//! command loop. Anything that is not a built-in command is sent to the NLP
//! service as a typed command.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use homevoice::core::config::{AppConfig, VoiceBackendKind};
use homevoice::core::error::{HomeError, Result};
use homevoice::core::types::{Language, Parameter};
use homevoice::HomeAssistant;

/// Smart-home voice assistant
#[derive(Parser, Debug)]
#[command(name = "homevoice")]
#[command(about = "Control smart-home devices with voice or text commands")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// NLP service base URL, overrides the config file
    #[arg(long)]
    nlp_url: Option<String>,

    /// Feedback language: zh or en
    #[arg(long)]
    language: Option<Language>,

    /// Voice backend: simulated or external
    #[arg(long)]
    voice_backend: Option<VoiceBackendKind>,
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homevoice=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    tracing::info!("Homevoice starting, NLP service at {}", config.nlp.base_url);

    let rt = Runtime::new()?;
    let assistant = HomeAssistant::from_config(&config)?;

    print_help();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if let Err(e) = handle_line(&rt, &assistant, input) {
            println!("Error: {}", e);
        }
    }

    tracing::info!("Homevoice stopped");
    Ok(())
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::new(),
    };
    config.apply_env();

    if let Some(url) = &args.nlp_url {
        config.nlp.base_url = url.clone();
    }
    if let Some(language) = args.language {
        config.language = language;
    }
    if let Some(backend) = args.voice_backend {
        config.voice.backend = backend;
    }
    Ok(config)
}

fn handle_line(rt: &Runtime, assistant: &HomeAssistant, input: &str) -> Result<()> {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command {
        "help" | "h" => print_help(),
        "devices" | "d" => {
            for device in assistant.registry().all() {
                println!("  {}", device.summary());
            }
        }
        "device" => {
            let device = assistant.device(rest)?;
            println!("{}", serde_json::to_string_pretty(&device)?);
        }
        "control" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let (Some(id), Some(action)) = (parts.next(), parts.next()) else {
                println!("Usage: control <id> <action> [param]");
                return Ok(());
            };
            let parameter = parts.next().map(parse_parameter).unwrap_or(Parameter::Absent);
            let device = assistant.control_device(id, action, parameter)?;
            println!("  {}", device.summary());
        }
        "listen" => match rest {
            "start" => {
                assistant.voice().start_listening();
                println!("Listening.");
            }
            "stop" => {
                assistant.voice().stop_listening();
                println!("Stopped listening.");
            }
            "status" | "" => println!("Listening state: {:?}", assistant.voice().status()),
            _ => println!("Usage: listen start|stop|status"),
        },
        "voice" => {
            let (audio, name) = read_clip(rest)?;
            if !assistant.voice().is_listening() {
                tracing::warn!("Processing a clip while not listening");
            }
            let recognized = rt.block_on(assistant.voice().process(&audio, &name))?;
            println!("{}", serde_json::to_string_pretty(&recognized)?);
        }
        "audio" => {
            let (audio, name) = read_clip(rest)?;
            let response = rt.block_on(assistant.handle_audio(&audio, &name));
            println!("{}", response.describe());
        }
        "settings" => match rest {
            "" => println!(
                "{}",
                serde_json::to_string_pretty(&assistant.settings().current())?
            ),
            "reset" => {
                assistant.settings().reset();
                println!("Settings reset.");
            }
            _ => match rest.strip_prefix("set") {
                Some(body) => {
                    assistant.settings().update_from_json(body.trim())?;
                    println!("Settings updated.");
                }
                None => println!("Usage: settings [set <json> | reset]"),
            },
        },
        _ => {
            let response = rt.block_on(assistant.handle_text(input));
            println!("{}", response.describe());
        }
    }
    Ok(())
}

/// `40` becomes an integer, anything else stays text
fn parse_parameter(raw: &str) -> Parameter {
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Parameter::from_json(&value)
}

fn read_clip(path: &str) -> Result<(Vec<u8>, String)> {
    if path.is_empty() {
        return Err(HomeError::InvalidConfig("a .wav path is required".into()));
    }
    let path = Path::new(path);
    let audio = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.wav".to_string());
    Ok((audio, name))
}

fn print_help() {
    println!("\n=== HOMEVOICE ===");
    println!();
    println!("Commands:");
    println!("  devices / d                      - List all devices");
    println!("  device <id>                      - Show one device");
    println!("  control <id> <action> [param]    - Control a device directly");
    println!("  listen start|stop|status         - Voice listening state");
    println!("  voice <wav>                      - Recognize a clip with the voice backend");
    println!("  audio <wav>                      - Send a clip through the NLP service");
    println!("  settings [set <json> | reset]    - Show or change voice settings");
    println!("  help / h                         - Show this help");
    println!("  quit / q                         - Exit");
    println!("  <any text>                       - Text command (parsed by the NLP service)");
    println!();
}
