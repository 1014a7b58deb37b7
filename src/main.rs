use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tracing::debug;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gridlife::config::Config;
use gridlife::config::ConfigError;
use gridlife::config::USAGE;
use gridlife::events::AppEvent;
use gridlife::events::EngineEvent;
use gridlife::events::Event;
use gridlife::io::convert_event;
use gridlife::render;
use gridlife::render::Canvas;
use gridlife::render::Cursor;
use gridlife::simulation::Simulation;

/// How long to wait for input while playback is stopped
const IDLE_POLL: Duration = Duration::from_millis(500);

fn main() -> anyhow::Result<()> {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(ConfigError::Help) => {
            print!("{USAGE}");
            return Ok(());
        }
        Err(e) => return Err(e).context("Invalid arguments, see --help"),
    };

    init_tracing(config.log_file.as_deref())?;

    let (term_cols, term_rows) = terminal::size().context("Failed to read terminal size")?;
    let (rows, cols) = config.dimensions(term_cols, term_rows);

    let mut sim =
        Simulation::from_config(&config, rows, cols).context("Failed to set up the simulation")?;

    info!(rows, cols, rules = %sim.rules(), tick = ?sim.tick_interval(), "starting");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture,
        cursor::Hide
    )?;

    let res = run(&mut stdout, &mut sim);

    execute!(
        stdout,
        cursor::Show,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;

    info!(generation = sim.generation(), "exiting");

    res
}

/// Logs go to `path` when given. The terminal belongs to the grid, so otherwise they are dropped.
fn init_tracing(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path).with_context(|| format!("Failed to create log file {path:?}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// The event loop: wait for input or for the next tick, whichever comes first, handle it, redraw.
fn run(stdout: &mut io::Stdout, sim: &mut Simulation) -> anyhow::Result<()> {
    let (rows, cols) = (sim.grid().rows(), sim.grid().cols());

    let mut canvas = Canvas::new(rows, cols);
    let mut cur = Cursor::default();
    let mut dirty = true;

    loop {
        if dirty {
            draw(stdout, &mut canvas, sim, cur)?;
            dirty = false;
        }

        let timeout = sim.time_until_tick(Instant::now()).unwrap_or(IDLE_POLL);

        // Input that maps to nothing still falls through to the tick below
        let event = if event::poll(timeout)? {
            convert_event(event::read()?)
        } else {
            None
        };

        if let Some(event) = event {
            match event {
                Event::AppEvent(AppEvent::Exit) => break,
                Event::AppEvent(AppEvent::MoveCursor(dir)) => cur = cur.shift(dir, rows, cols),
                Event::AppEvent(AppEvent::ToggleAtCursor) => {
                    let Cursor { row, col } = cur;
                    apply(sim, EngineEvent::Toggle { row, col });
                }
                Event::AppEvent(AppEvent::Click { column, row }) => {
                    match canvas.cell_at(column, row) {
                        Some((row, col)) => {
                            cur = Cursor { row, col };
                            apply(sim, EngineEvent::Toggle { row, col });
                        }
                        None => debug!(column, row, "click outside of the grid"),
                    }
                }
                Event::AppEvent(AppEvent::Resize { cols, rows }) => {
                    debug!(cols, rows, "terminal resized");
                    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                }
                Event::EngineEvent(e) => apply(sim, e),
            }

            dirty = true;
        }

        if sim.poll(Instant::now()) {
            dirty = true;
        }
    }

    Ok(())
}

/// Engine errors never end the session: the request is dropped.
fn apply(sim: &mut Simulation, event: EngineEvent) {
    if let Err(err) = sim.apply(event, Instant::now()) {
        warn!(?event, %err, "ignored request");
    }
}

fn draw(
    stdout: &mut io::Stdout,
    canvas: &mut Canvas,
    sim: &Simulation,
    cur: Cursor,
) -> io::Result<()> {
    let frame = canvas.draw(sim.grid(), Some(cur));

    queue!(stdout, cursor::MoveTo(0, 0))?;

    for line in frame.lines() {
        queue!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
    }

    queue!(
        stdout,
        style::Print(render::status_line(sim)),
        terminal::Clear(terminal::ClearType::UntilNewLine)
    )?;

    stdout.flush()
}
