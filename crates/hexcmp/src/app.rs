//! Application state and logic

use crate::config::{Config, ViewConfig};
use anyhow::{Context, Result};
use hexcmp_core::{
    DiffEngine, DiffScanner, FileView, Move, NavigationConfig, Navigator, ScanOutcome, ScanReport,
    MAX_VIEWS,
};
use std::path::PathBuf;

/// Files larger than 4 GiB force 64-bit address display.
const ADDR64_THRESHOLD: u64 = u32::MAX as u64;

/// One byte position as the UI renders it.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    /// The byte value, or `None` past the file's end.
    pub byte: Option<u8>,
    /// The open files disagree at this position.
    pub differs: bool,
}

/// Render data for one file panel: a viewport position plus one [`Cell`]
/// per viewport offset. Rebuilt after every move, and kept as-is while a
/// background scan owns the views so the last page stays on screen.
pub struct FileGrid {
    pub position: u64,
    pub cells: Vec<Cell>,
}

/// The main application state
pub struct App {
    /// Paths as given on the command line, for panel titles and reloads
    pub paths: Vec<PathBuf>,
    /// File sizes recorded at open time
    pub sizes: Vec<u64>,
    /// Open views; empty while a background scan owns them
    views: Vec<FileView>,
    /// Viewport shape and selection
    pub navigator: Navigator,
    /// Background scan worker handle
    scanner: DiffScanner,
    /// Show 64-bit addresses
    pub addr64: bool,
    /// Whether to show the help panel
    pub show_help: bool,
    /// One-line status message shown in the status bar
    pub status: String,
    /// Per-file render grids, refreshed whenever views may have moved
    grids: Vec<FileGrid>,
}

impl App {
    pub fn new(paths: Vec<PathBuf>, config: NavigationConfig, addr64: bool) -> Result<Self> {
        anyhow::ensure!(
            !paths.is_empty() && paths.len() <= MAX_VIEWS,
            "between 1 and {MAX_VIEWS} files required"
        );

        let mut views = Vec::with_capacity(paths.len());
        for path in &paths {
            let view = FileView::from_path(path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            views.push(view);
        }
        let sizes: Vec<u64> = views.iter().map(|v| v.size()).collect();
        let addr64 = addr64 || sizes.iter().any(|&s| s > ADDR64_THRESHOLD);

        let mut navigator = Navigator::new(config);
        navigator.reconfigure(navigator.config(), &mut views);

        let mut app = Self {
            paths,
            sizes,
            views,
            navigator,
            scanner: DiffScanner::new(),
            addr64,
            show_help: false,
            status: String::new(),
            grids: Vec::new(),
        };
        app.refresh();
        Ok(app)
    }

    pub fn grids(&self) -> &[FileGrid] {
        &self.grids
    }

    pub fn file_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn scanning(&self) -> bool {
        self.scanner.is_active()
    }

    /// Cache hits and refills summed over all views, for the status bar.
    /// Zero while a scan owns the views.
    pub fn cache_totals(&self) -> (u64, u64) {
        self.views.iter().fold((0, 0), |(hits, refills), view| {
            let stats = view.cache_stats();
            (hits + stats.hits, refills + stats.refills)
        })
    }

    /// Rebuild the render grids from the current viewports.
    fn refresh(&mut self) {
        let diff = DiffEngine::compute(&self.views);
        self.grids = self
            .views
            .iter()
            .map(|view| FileGrid {
                position: view.position(),
                cells: (0..view.view_len())
                    .map(|offset| Cell {
                        byte: view.byte_at(offset),
                        differs: diff.get(offset as usize).copied().unwrap_or(false),
                    })
                    .collect(),
            })
            .collect();
    }

    pub fn apply_move(&mut self, mv: Move) {
        if self.scanning() {
            return;
        }
        self.navigator.apply(mv, &mut self.views);
        self.refresh();
    }

    /// Grow or shrink the viewport shape at runtime (Ctrl+arrows).
    pub fn resize(&mut self, d_bytes: i32, d_rows: i32) {
        if self.scanning() {
            return;
        }
        let mut config = self.navigator.config();
        config.bytes_per_row = config.bytes_per_row.saturating_add_signed(d_bytes).max(1);
        config.rows = config.rows.saturating_add_signed(d_rows).max(1);
        self.navigator.reconfigure(config, &mut self.views);
        self.refresh();
    }

    /// Tab: all views -> view 0 -> ... -> view N-1 -> all views.
    pub fn cycle_selected(&mut self) {
        if self.scanning() {
            return;
        }
        let mut config = self.navigator.config();
        config.selected = match config.selected {
            None => Some(0),
            Some(i) if i + 1 < self.file_count() => Some(i + 1),
            Some(_) => None,
        };
        self.navigator.reconfigure(config, &mut self.views);
    }

    pub fn toggle_addr64(&mut self) {
        self.addr64 = !self.addr64;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Reopen the selected file (or all files) and re-satisfy the current
    /// positions, picking up on-disk changes. Keeps the old views when a
    /// reopen fails.
    pub fn reload(&mut self) {
        if self.scanning() {
            return;
        }
        let config = self.navigator.config();
        let indices: Vec<usize> = match config.selected {
            Some(i) => vec![i],
            None => (0..self.views.len()).collect(),
        };
        for i in indices {
            match FileView::from_path(&self.paths[i]) {
                Ok(mut view) => {
                    view.set_view_len(config.view_len());
                    view.set_position(self.views[i].position());
                    self.sizes[i] = view.size();
                    self.views[i] = view;
                }
                Err(e) => {
                    self.status = format!("Reload failed: {e}");
                    return;
                }
            }
        }
        self.status = "Reloaded".to_string();
        self.refresh();
    }

    /// Hand the views to the scan worker. The grids keep showing the last
    /// page until the worker returns them.
    pub fn start_scan(&mut self) {
        if self.scanning() {
            return;
        }
        let views = std::mem::take(&mut self.views);
        match self.scanner.start(views) {
            Ok(()) => self.status = "Scanning...".to_string(),
            Err(views) => self.views = views,
        }
    }

    /// Ask the worker to stop and take the views back.
    pub fn cancel_scan(&mut self) {
        if !self.scanning() {
            return;
        }
        self.scanner.cancel();
        self.finish_scan();
    }

    /// Called every tick: collect a scan that ended on its own.
    pub fn tick(&mut self) {
        if self.scanner.is_finished() {
            self.finish_scan();
        }
    }

    fn finish_scan(&mut self) {
        let Some((views, report)) = self.scanner.join() else {
            return;
        };
        self.views = views;
        self.refresh();
        self.report_status(report);
    }

    fn report_status(&mut self, report: ScanReport) {
        self.status = match report.outcome {
            ScanOutcome::FoundDifference => match self.first_difference() {
                Some(addr) if self.addr64 => format!("Difference at {:08X}:{:08X}", addr >> 32, addr & 0xFFFF_FFFF),
                Some(addr) => format!("Difference at {:08X}", addr),
                None => "Difference found".to_string(),
            },
            ScanOutcome::ReachedEnd => "No further differences".to_string(),
            ScanOutcome::Cancelled => "Scan cancelled".to_string(),
        };
    }

    /// Absolute address of the first differing offset on the current page.
    fn first_difference(&self) -> Option<u64> {
        let grid = self.grids.first()?;
        let offset = grid.cells.iter().position(|c| c.differs)?;
        Some(grid.position + offset as u64)
    }

    pub fn save_config(&mut self) {
        let config = Config {
            view: self.view_config(),
        };
        match config.save() {
            Ok(path) => self.status = format!("Saved {}", path.display()),
            Err(e) => self.status = format!("Save failed: {e}"),
        }
    }

    pub fn load_config(&mut self) {
        if self.scanning() {
            return;
        }
        let config = Config::load();
        self.apply_view_config(&config.view);
        self.status = "Config loaded".to_string();
    }

    pub fn view_config(&self) -> ViewConfig {
        let nav = self.navigator.config();
        ViewConfig {
            bytes_per_row: nav.bytes_per_row,
            rows: nav.rows,
            selected: nav.selected,
            addr64: self.addr64,
            help: self.show_help,
        }
    }

    pub fn apply_view_config(&mut self, view: &ViewConfig) {
        let count = self.file_count();
        let config = NavigationConfig {
            bytes_per_row: view.bytes_per_row,
            rows: view.rows,
            selected: view.selected.filter(|&i| i < count),
        };
        self.navigator.reconfigure(config, &mut self.views);
        self.addr64 = view.addr64 || self.sizes.iter().any(|&s| s > ADDR64_THRESHOLD);
        self.show_help = view.help;
        self.refresh();
    }
}
