//! hexcmp CLI - side-by-side hex file comparison TUI

mod app;
mod config;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hexcmp_core::{Move, NavigationConfig};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "hexcmp")]
#[command(author, version, about = "Compare up to eight files side by side in hex")]
struct Args {
    /// Files to compare
    #[arg(num_args = 1..=8, required = true)]
    paths: Vec<PathBuf>,

    /// Bytes per row (overrides config)
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Rows per panel (overrides config)
    #[arg(short, long)]
    rows: Option<u32>,

    /// Show 64-bit addresses (forced on for files over 4 GiB)
    #[arg(long)]
    addr64: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::Config::load();

    // CLI overrides config
    let nav = NavigationConfig {
        bytes_per_row: args.width.unwrap_or(config.view.bytes_per_row),
        rows: args.rows.unwrap_or(config.view.rows),
        selected: config.view.selected,
    };
    let addr64 = args.addr64 || config.view.addr64;

    let mut app = App::new(args.paths, nav, addr64)?;
    app.show_help = config.view.help;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            let ev = event::read()?;

            // Any key or mouse input cancels a running scan; the input
            // itself is swallowed so it cannot also move the views.
            if app.scanning() {
                let is_input = matches!(&ev, Event::Key(k) if k.kind == KeyEventKind::Press)
                    || matches!(&ev, Event::Mouse(_));
                if is_input {
                    app.cancel_scan();
                }
                continue;
            }

            match ev {
                Event::Mouse(me) => match me.kind {
                    MouseEventKind::ScrollUp => app.apply_move(Move::WheelUp),
                    MouseEventKind::ScrollDown => app.apply_move(Move::WheelDown),
                    _ => {}
                },
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            if app.show_help {
                                app.show_help = false;
                            } else {
                                return Ok(());
                            }
                        }
                        // Viewport shape (Ctrl+arrows)
                        KeyCode::Left if ctrl => app.resize(-1, 0),
                        KeyCode::Right if ctrl => app.resize(1, 0),
                        KeyCode::Up if ctrl => app.resize(0, -1),
                        KeyCode::Down if ctrl => app.resize(0, 1),
                        // Navigation
                        KeyCode::Left => app.apply_move(Move::ByteLeft),
                        KeyCode::Right => app.apply_move(Move::ByteRight),
                        KeyCode::Up => app.apply_move(Move::RowUp),
                        KeyCode::Down => app.apply_move(Move::RowDown),
                        KeyCode::PageUp => app.apply_move(Move::PageUp),
                        KeyCode::PageDown => app.apply_move(Move::PageDown),
                        KeyCode::Home => app.apply_move(Move::Home),
                        KeyCode::End => app.apply_move(Move::End),
                        KeyCode::Tab => app.cycle_selected(),
                        // Actions
                        KeyCode::Char(' ') | KeyCode::F(6) => app.start_scan(),
                        KeyCode::Char('r') => app.reload(),
                        KeyCode::Char('x') => app.toggle_addr64(),
                        KeyCode::Char('s') => app.save_config(),
                        KeyCode::Char('l') => app.load_config(),
                        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Collect a scan that finished on its own
        app.tick();
    }
}
