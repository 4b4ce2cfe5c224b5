//! Simulated ELM327 OBD2 adapter
//!
//! Usage: cargo run -p obdsim-mock-elm327-server -- [OPTIONS]
//! Then point a scan tool at 127.0.0.1:35000, or pass `--serial` to answer
//! on a serial device instead.

mod signals;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use obdsim_elm327_lib::{Engine, LogLevel, PulseCounter, ReplyEmitter, SimulatorConfig};
use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Instant;

use signals::{spawn_pulse_source, RpmRamp, SimulatedAnalog};
use transport::{Inbound, PolledReader, POLL_TIMEOUT};

#[derive(Parser, Debug)]
#[command(name = "obdsim-mock-elm327")]
#[command(about = "Simulated ELM327 adapter answering OBD2 scan requests")]
struct Args {
    /// Address to listen on for TCP clients
    #[arg(short, long, default_value = "0.0.0.0:35000")]
    listen: String,

    /// Serial device to answer on instead of TCP
    #[arg(short, long)]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(short, long, default_value = "9600")]
    baud: u32,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Copy every reply line to stderr
    #[arg(short, long)]
    mirror: bool,

    /// Log level (off, error, warn, info, debug); overrides the config file
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Don't generate ignition pulses; engine speed stays at its initial value
    #[arg(long)]
    no_pulses: bool,
}

/// Load the simulator configuration, falling back to defaults without a file
fn load_config(path: Option<&Path>) -> Result<SimulatorConfig> {
    let Some(path) = path else {
        return Ok(SimulatorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn parse_config(text: &str) -> Result<SimulatorConfig> {
    let config: SimulatorConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

/// State that outlives a single client connection
struct Simulator {
    config: SimulatorConfig,
    engine: Engine,
    analog: SimulatedAnalog,
    start: Instant,
    mirror: bool,
}

impl Simulator {
    fn new(config: SimulatorConfig, counter: PulseCounter, mirror: bool) -> Self {
        let engine = Engine::new(&config, counter);
        Self {
            config,
            engine,
            analog: SimulatedAnalog::new(),
            start: Instant::now(),
            mirror,
        }
    }

    fn emitter<W: Write>(&self, writer: W) -> ReplyEmitter<W> {
        let emitter = ReplyEmitter::new(writer, self.config.line_ending());
        if self.mirror {
            emitter.with_mirror(Box::new(std::io::stderr()))
        } else {
            emitter
        }
    }

    /// Run the refresh-then-poll cycle until the inbound side closes
    fn run<R: std::io::Read, W: Write>(
        &mut self,
        reader: &mut PolledReader<R>,
        emitter: &mut ReplyEmitter<W>,
    ) -> Result<()> {
        self.engine.clear_pending();
        loop {
            #[allow(clippy::cast_possible_truncation)]
            let now_us = self.start.elapsed().as_micros() as u64;
            self.engine.refresh(&mut self.analog, now_us);

            match reader.poll().context("Read error")? {
                Inbound::Byte(byte) => match self.engine.feed(byte, emitter) {
                    Ok(_) => {}
                    Err(e) if is_disconnect(e.kind()) => {
                        debug!("Client gone while replying: {e}");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                },
                Inbound::Idle => {}
                Inbound::Closed => return Ok(()),
            }
        }
    }

    fn serve_tcp(&mut self, listen: &str) -> Result<()> {
        info!("Mock ELM327 starting on {listen}...");
        let listener =
            TcpListener::bind(listen).with_context(|| format!("Failed to bind {listen}"))?;
        info!("Mock ELM327 ready - waiting for connections...");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    info!("Client connected: {:?}", stream.peer_addr());
                    match self.handle_client(stream) {
                        Ok(()) => info!("Client disconnected"),
                        Err(e) => warn!("Client session ended: {e:#}"),
                    }
                }
                Err(e) => error!("Connection error: {e}"),
            }
        }
        Ok(())
    }

    fn handle_client(&mut self, stream: TcpStream) -> Result<()> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(POLL_TIMEOUT))?;
        let mut reader = PolledReader::new(stream.try_clone()?, true);
        let mut emitter = self.emitter(stream);
        self.run(&mut reader, &mut emitter)
    }

    fn serve_serial(&mut self, device: &str, baud: u32) -> Result<()> {
        info!("Mock ELM327 opening {device} at {baud} baud...");
        let port = serialport::new(device, baud)
            .timeout(POLL_TIMEOUT)
            .open()
            .with_context(|| format!("Failed to open {device}"))?;
        let mut reader = PolledReader::new(port.try_clone()?, false);
        let mut emitter = self.emitter(port);
        info!("Mock ELM327 ready on {device}");
        self.run(&mut reader, &mut emitter)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    env_logger::Builder::new()
        .filter_level(config.log_level.as_level_filter())
        .parse_default_env()
        .init();

    info!("Identity: {} / {}", config.identity.device_description, config.identity.version);

    let counter = PulseCounter::new();
    if args.no_pulses {
        info!("Pulse source disabled");
    } else {
        spawn_pulse_source(counter.clone(), RpmRamp::default(), config.pulse_threshold);
    }

    let mut simulator = Simulator::new(config, counter, args.mirror);
    match args.serial.as_deref() {
        Some(device) => simulator.serve_serial(device, args.baud),
        None => simulator.serve_tcp(&args.listen),
    }
}
