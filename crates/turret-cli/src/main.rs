mod console;
mod render;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};

use turret_core::{doctor as core_doctor, ControllerConfig};
use turret_link::autodetect::list_ports;
use turret_link::{doctor as link_doctor, port, SerialConfig, Session};

use crate::render::LogRender;

const UI_QUEUE: usize = 16;

#[derive(Debug, Parser)]
#[command(name = "turret", version, about = "Radar turret control panel")]
struct Cli {
    /// TOML config; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the configuration.
    Doctor,
    /// Drive the turret over serial; operator commands are read from stdin.
    Run,
    /// Feed a recorded serial capture through the panel, commands to stdout.
    Replay {
        capture: String,
        /// Keep timers running this long after the capture ends.
        #[arg(long)]
        linger_ms: Option<u64>,
    },
    /// List serial ports and mark the one autodetect would pick.
    Ports,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Config {
    serial: SerialConfig,
    panel: ControllerConfig,
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
    toml::from_str(&s).context("parse config toml")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Run => run(cfg).await?,
        Command::Replay { capture, linger_ms } => replay(cfg, &capture, linger_ms).await?,
        Command::Ports => ports(&cfg)?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");
    core_doctor::check_controller(&cfg.panel)?;
    link_doctor::check_serial(&cfg.serial)?;
    if cfg.serial.autodetect {
        info!(
            "doctor: autodetect enabled for {:04x}:{:04x}",
            cfg.serial.vendor_id, cfg.serial.product_id
        );
    }
    info!("doctor: OK");
    Ok(())
}

async fn run(cfg: Config) -> Result<()> {
    info!("run: starting");
    let dev = port::resolve_port(&cfg.serial)?;
    let stream = port::open(&dev, cfg.serial.baud)?;
    let (rd, wr) = tokio::io::split(stream);

    let (ui_tx, ui_rx) = mpsc::channel(UI_QUEUE);
    tokio::spawn(async move {
        if let Err(e) = console::pump(tokio::io::stdin(), ui_tx).await {
            warn!("console stopped: {:#}", e);
        }
    });

    let session = Session::new(cfg.panel, LogRender, cfg.serial.command_queue);
    tokio::select! {
        res = session.run(rd, wr, ui_rx) => {
            res?;
            info!("run: serial link closed");
        }
        _ = tokio::signal::ctrl_c() => info!("run: interrupted"),
    }
    Ok(())
}

async fn replay(cfg: Config, capture: &str, linger_ms: Option<u64>) -> Result<()> {
    info!("replay: {}", capture);
    let input = tokio::fs::File::open(capture)
        .await
        .with_context(|| format!("open capture {}", capture))?;

    // no operator input during replay
    let (_ui_tx, ui_rx) = mpsc::channel(1);
    let mut session = Session::new(cfg.panel, LogRender, cfg.serial.command_queue);
    if let Some(ms) = linger_ms {
        session = session.linger(Duration::from_millis(ms));
    }
    session.run(input, tokio::io::stdout(), ui_rx).await?;
    info!("replay: done");
    Ok(())
}

fn ports(cfg: &Config) -> Result<()> {
    let ports = list_ports()?;
    let res = turret_link::autodetect::pick(ports, cfg.serial.vendor_id, cfg.serial.product_id);
    match &res.chosen {
        Some(dev) => println!("CHOSEN: {}", dev),
        None => println!("CHOSEN: none"),
    }
    for p in res.probes {
        let ids = p
            .port
            .usb
            .map(|(vid, pid)| format!("{:04x}:{:04x}", vid, pid))
            .unwrap_or_else(|| "-".into());
        println!(
            "{} dev={} usb={} {}",
            if p.matched { "*" } else { " " },
            p.port.dev,
            ids,
            p.port.label
        );
    }
    Ok(())
}
