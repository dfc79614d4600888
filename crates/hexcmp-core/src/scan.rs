//! Background page-by-page scan for the next disagreement
//!
//! One worker thread advances every view in lockstep, a full page at a
//! time, until a page contains a differing offset, every file has run out,
//! or the control thread cancels. The views are moved into the worker for
//! the duration of the scan and handed back on [`DiffScanner::join`], so
//! the type system enforces that nobody repositions a view mid-scan.

use crate::diff::DiffEngine;
use crate::view::FileView;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The views sit on the first page that contains a disagreement.
    FoundDifference,
    /// Every file ran out at the same time; the page is past all of them.
    ReachedEnd,
    /// The control thread cleared the running flag; the views sit on
    /// whatever page boundary the worker last reached.
    Cancelled,
}

/// Result of one finished scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// Position of each view when the scan was started.
    pub started_from: Vec<u64>,
    /// Pages stepped over, counting the initial skip of the on-screen page.
    pub pages_scanned: u64,
}

/// Handle for the single background scan worker.
///
/// At most one scan runs at a time. The `running` flag is the only state
/// shared with the worker: the control thread clears it to cancel, the
/// worker clears it on natural completion and polls it once per page, so
/// cancellation latency is bounded by one page's comparison plus one refill.
pub struct DiffScanner {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<(Vec<FileView>, ScanReport)>>,
}

impl DiffScanner {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Move the views into a worker thread and start scanning from the page
    /// after the one currently on screen. Returns the views untouched when a
    /// previous scan has not been joined yet.
    pub fn start(&mut self, views: Vec<FileView>) -> Result<(), Vec<FileView>> {
        if self.worker.is_some() {
            return Err(views);
        }
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        self.worker = Some(thread::spawn(move || {
            let mut views = views;
            let report = run_scan(&mut views, &running);
            (views, report)
        }));
        Ok(())
    }

    /// A scan has been started and not yet joined.
    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// The worker has stopped; [`DiffScanner::join`] will not block.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_finished())
    }

    /// Ask the worker to stop at the next page boundary.
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for the worker and take the views back. Returns `None` when no
    /// scan is active or the worker panicked. Joining is the single
    /// completion signal: the caller redraws exactly once per scan, here.
    pub fn join(&mut self) -> Option<(Vec<FileView>, ScanReport)> {
        let worker = self.worker.take()?;
        worker.join().ok()
    }
}

impl Default for DiffScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn advance_one_page(views: &mut [FileView]) {
    for view in views.iter_mut() {
        let next = view.position().wrapping_add(view.view_len() as u64);
        view.set_position(next);
    }
}

fn run_scan(views: &mut [FileView], running: &AtomicBool) -> ScanReport {
    let started_from: Vec<u64> = views.iter().map(|v| v.position()).collect();
    let page_len = views.iter().map(|v| v.view_len()).max().unwrap_or(0);

    // The page on screen is already known to match; skip it.
    advance_one_page(views);
    let mut pages_scanned = 1;

    let outcome = loop {
        if !running.load(Ordering::SeqCst) {
            break ScanOutcome::Cancelled;
        }
        let summary = DiffEngine::summarize(views);
        if summary.all_absent {
            break ScanOutcome::ReachedEnd;
        }
        if summary.match_count < page_len {
            break ScanOutcome::FoundDifference;
        }
        advance_one_page(views);
        pages_scanned += 1;
    };
    running.store(false, Ordering::SeqCst);

    ScanReport {
        outcome,
        started_from,
        pages_scanned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn view_over(data: Vec<u8>, view_len: u32) -> FileView {
        let mut view = FileView::open(MemorySource::new(data));
        view.set_view_len(view_len);
        view
    }

    #[test]
    fn stops_on_the_page_containing_the_difference() {
        let a = vec![0u8; 4096];
        let mut b = a.clone();
        b[1000] = 0xFF;
        let views = vec![view_over(a, 64), view_over(b, 64)];

        let mut scanner = DiffScanner::new();
        scanner.start(views).unwrap();
        let (views, report) = scanner.join().unwrap();

        assert_eq!(report.outcome, ScanOutcome::FoundDifference);
        assert_eq!(report.started_from, vec![0, 0]);
        // 1000 lies in the page [960, 1024); no earlier page differs.
        assert_eq!(views[0].position(), 960);
        assert_eq!(views[1].position(), 960);
    }

    #[test]
    fn identical_files_run_to_the_end() {
        // A length that is not a page multiple: the final partial page must
        // match (present bytes equal, trailing offsets absent in both) and
        // the page after it must read as fully absent.
        let data: Vec<u8> = (0u8..=255).cycle().take(4100).collect();
        let views = vec![view_over(data.clone(), 64), view_over(data, 64)];

        let mut scanner = DiffScanner::new();
        scanner.start(views).unwrap();
        let (views, report) = scanner.join().unwrap();

        assert_eq!(report.outcome, ScanOutcome::ReachedEnd);
        assert!(views[0].position() >= 4100);
    }

    #[test]
    fn shorter_file_reads_as_difference_past_its_end() {
        let long = vec![9u8; 1024];
        let short = vec![9u8; 512];
        let views = vec![view_over(long, 64), view_over(short, 64)];

        let mut scanner = DiffScanner::new();
        scanner.start(views).unwrap();
        let (views, report) = scanner.join().unwrap();

        assert_eq!(report.outcome, ScanOutcome::FoundDifference);
        assert_eq!(views[0].position(), 512);
    }

    #[test]
    fn cancellation_exits_at_a_page_boundary() {
        let data = vec![1u8; 65536];
        let mut views = vec![view_over(data.clone(), 256), view_over(data, 256)];

        // A cleared flag is observed on the very first poll, after the
        // initial skip of the on-screen page.
        let running = AtomicBool::new(false);
        let report = run_scan(&mut views, &running);

        assert_eq!(report.outcome, ScanOutcome::Cancelled);
        assert_eq!(report.pages_scanned, 1);
        assert_eq!(views[0].position(), 256);
        assert_eq!(views[0].position() % 256, 0);
    }

    #[test]
    fn second_start_is_rejected_until_joined() {
        let views = vec![view_over(vec![0u8; 128], 64)];
        let mut scanner = DiffScanner::new();
        scanner.start(views).unwrap();
        assert!(scanner.start(Vec::new()).is_err());
        let (views, _) = scanner.join().unwrap();
        assert_eq!(views.len(), 1);
        assert!(!scanner.is_active());
    }
}
