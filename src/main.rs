use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use skyburst::color::{self, Rgb};
use skyburst::{LaunchMode, SimConfig};
use std::fs::File;
use std::io::{stdout, BufWriter, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod host;
use host::{Display, Options};

/// Reference frame rate the simulation constants are tuned for.
const TICK_RATE: f32 = 50.0;
/// Logical sky height when the config does not set one.
const DEFAULT_WORLD_HEIGHT: f32 = 900.0;

#[derive(Parser)]
#[command(name = "skyburst")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal fireworks launched by clicks and remote shake events", long_about = None)]
struct Cli {
    /// Launch fireworks without a position from the center of the screen
    #[arg(long)]
    center: bool,

    /// Launch fireworks on its own at a relaxed pace
    #[arg(long)]
    demo: bool,

    /// JSON-lines feed of firework events and acceleration samples (file or FIFO)
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,

    /// Background color as hex (e.g. 1a1b26)
    #[arg(long, value_name = "RRGGBB", value_parser = parse_bg_color)]
    bg_color: Option<Rgb>,

    /// Simulation config file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ring the terminal bell when a firework explodes
    #[arg(long)]
    bell: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_bg_color(hex: &str) -> Result<Rgb, String> {
    color::parse_hex(hex).ok_or_else(|| format!("invalid hex color '{hex}', expected RRGGBB (e.g. 1a1b26)"))
}

fn init_logging(cli: &Cli) -> Result<()> {
    // The terminal is the display surface, so logs only go to a file
    let Some(path) = &cli.log else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(bg) = cli.bg_color {
        config.background = bg;
    }
    if config.world_height.is_none() {
        config.world_height = Some(DEFAULT_WORLD_HEIGHT);
    }
    Ok(config)
}

fn run(stdout: &mut BufWriter<Stdout>, config: SimConfig, options: Options) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut display = Display::new(cols as usize, rows as usize * 2, config, options);

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    const FIXED_DT: f32 = 1.0 / TICK_RATE;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    display.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    display.resize(*cols as usize, *rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => display.handle_event(&event),
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        let mut stepped = false;
        while accumulator >= FIXED_DT {
            // One fixed step is exactly one reference tick
            display.update(FIXED_DT, 1.0);
            accumulator -= FIXED_DT;
            stepped = true;
        }

        if stepped {
            display.render(stdout)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let config = load_config(&cli)?;

    let options = Options {
        launch_mode: if cli.center { LaunchMode::Center } else { LaunchMode::Random },
        demo: cli.demo,
        bell: cli.bell,
        events: cli.events.clone(),
    };

    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;
    info!("display started");

    // Restore the terminal before reporting any error from the loop
    let result = run(&mut stdout, config, options);

    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    result.context("display loop failed")
}
