//! UI rendering for the TUI

use crate::app::{App, Cell, FileGrid};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn addr_style() -> Style {
    Style::default().fg(Color::Green)
}

fn hex_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn diff_style() -> Style {
    Style::default().fg(Color::White).bg(Color::Blue)
}

fn absent_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Main drawing function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // File panels
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_panels(frame, app, chunks[0]);
    draw_status_bar(frame, app, chunks[1]);

    if app.show_help {
        draw_help_popover(frame);
    }
}

fn draw_panels(frame: &mut Frame, app: &App, area: Rect) {
    let grids = app.grids();
    if grids.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = grids
        .iter()
        .map(|_| Constraint::Ratio(1, grids.len() as u32))
        .collect();
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let selected = app.navigator.config().selected;
    for (i, grid) in grids.iter().enumerate() {
        let focused = selected == Some(i);
        draw_file_panel(frame, app, grid, i, focused, panels[i]);
    }
}

fn draw_file_panel(
    frame: &mut Frame,
    app: &App,
    grid: &FileGrid,
    index: usize,
    focused: bool,
    area: Rect,
) {
    let name = app.paths[index]
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| app.paths[index].display().to_string());
    let title = format!(" {} ({} bytes) ", name, app.sizes[index]);

    let border_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bytes_per_row = app.navigator.config().bytes_per_row as usize;
    if bytes_per_row == 0 || inner.width == 0 {
        return;
    }

    let mut lines = Vec::new();
    for (row, cells) in grid.cells.chunks(bytes_per_row).enumerate() {
        if row as u16 >= inner.height {
            break;
        }
        let addr = grid.position + (row * bytes_per_row) as u64;
        lines.push(hex_row(cells, addr, app.addr64, inner.width as usize));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn format_address(addr: u64, addr64: bool) -> String {
    if addr64 {
        format!("{:08X}:{:08X}: ", addr >> 32, addr & 0xFFFF_FFFF)
    } else {
        format!("{:08X}: ", addr & 0xFFFF_FFFF)
    }
}

/// Render one row of cells: address column, hex dump, ASCII dump. When the
/// panel is too narrow for the configured row width, trailing columns are
/// dropped and a `>` marker ends the line.
fn hex_row(cells: &[Cell], addr: u64, addr64: bool, width: usize) -> Line<'static> {
    let address = format_address(addr, addr64);
    let addr_width = address.len();
    let mut spans = vec![Span::styled(address, addr_style())];

    // 3 chars per hex byte, 1 separator, 1 char per ASCII byte
    let full_width = addr_width + 3 * cells.len() + 1 + cells.len();
    let truncated = width < full_width;
    let budget = width.saturating_sub(addr_width + usize::from(truncated));
    let hex_fit = (budget / 3).min(cells.len());

    for cell in &cells[..hex_fit] {
        match cell.byte {
            Some(byte) => spans.push(Span::styled(
                format!("{:02X} ", byte),
                if cell.differs { diff_style() } else { hex_style() },
            )),
            None => spans.push(Span::styled("   ".to_string(), absent_style())),
        }
    }

    let ascii_fit = if hex_fit == cells.len() {
        budget.saturating_sub(3 * hex_fit + 1).min(cells.len())
    } else {
        0
    };
    if ascii_fit > 0 {
        spans.push(Span::raw(" "));
        for cell in &cells[..ascii_fit] {
            match cell.byte {
                Some(byte) => {
                    let ch = if (0x20..=0x7E).contains(&byte) {
                        byte as char
                    } else {
                        '.'
                    };
                    spans.push(Span::styled(
                        ch.to_string(),
                        if cell.differs { diff_style() } else { hex_style() },
                    ));
                }
                None => spans.push(Span::styled(" ".to_string(), absent_style())),
            }
        }
    }

    if truncated {
        spans.push(Span::styled(">".to_string(), addr_style()));
    }
    Line::from(spans)
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let config = app.navigator.config();
    let position = app
        .grids()
        .first()
        .map(|g| format_address(g.position, app.addr64))
        .unwrap_or_default();
    let scope = match config.selected {
        Some(i) => format!("file {}", i + 1),
        None => "all".to_string(),
    };

    let mut spans = vec![
        Span::styled(format!(" {}", position), addr_style()),
        Span::raw(format!(
            "{}x{} [{}] ",
            config.bytes_per_row, config.rows, scope
        )),
    ];

    if app.scanning() {
        spans.push(Span::styled(
            "scanning... (any key cancels) ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    } else {
        let (hits, refills) = app.cache_totals();
        spans.push(Span::styled(
            format!("cache {}h/{}r ", hits, refills),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if !app.status.is_empty() {
        spans.push(Span::styled(
            app.status.clone(),
            Style::default().fg(Color::White),
        ));
    }

    let hint = " ?:help q:quit";
    spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help_popover(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 46u16.min(area.width.saturating_sub(4));
    let popup_height = 18u16.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key_style = Style::default().fg(Color::Yellow);
    let label_style = Style::default().fg(Color::White);
    let section_style = Style::default().fg(Color::Green);

    let help_line = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::styled(format!("  {:<14}", key), key_style),
            Span::styled(desc.to_string(), label_style),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(" Navigation", section_style)),
        help_line("← → / ↑ ↓", "Move byte / row"),
        help_line("PgUp / PgDn", "Move one page"),
        help_line("Home / End", "First / last page"),
        help_line("wheel", "Scroll four rows"),
        help_line("Tab", "Select one file / all files"),
        Line::from(Span::styled(" Layout", section_style)),
        help_line("^← / ^→", "Narrower / wider rows"),
        help_line("^↑ / ^↓", "Fewer / more rows"),
        help_line("x", "Toggle 64-bit addresses"),
        Line::from(Span::styled(" Actions", section_style)),
        help_line("Space / F6", "Scan to next difference"),
        help_line("r", "Reload files from disk"),
        help_line("s / l", "Save / load config"),
        help_line("? / F1", "Toggle this help"),
        help_line("q / Esc", "Quit"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Help ");
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}
