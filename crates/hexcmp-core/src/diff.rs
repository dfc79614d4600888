//! Per-byte difference flags across a set of file views

use crate::view::FileView;

/// One flag per viewport offset, `true` where the views disagree.
pub type DiffVector = Vec<bool>;

/// Aggregate of one compared page, consumed by the background scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    /// Offsets at which all views agree.
    pub match_count: u32,
    /// True when every offset was past end-of-file in every view.
    pub all_absent: bool,
}

/// Compares the current viewports of a set of [`FileView`]s byte by byte.
///
/// An absent byte (past a file's end) is distinct from every real value:
/// if some views have a byte at an offset and others do not, that offset
/// differs. Offsets absent in all views agree vacuously, so trailing slack
/// beyond the longest file never reads as a difference.
pub struct DiffEngine;

impl DiffEngine {
    /// Difference flag for every offset of the current page.
    pub fn compute(views: &[FileView]) -> DiffVector {
        let page_len = Self::page_len(views);
        (0..page_len)
            .map(|offset| Self::probe(views, offset).0)
            .collect()
    }

    /// Fold a whole page into the counts the scanner steps on.
    pub fn summarize(views: &[FileView]) -> PageSummary {
        let page_len = Self::page_len(views);
        let mut match_count = 0;
        let mut all_absent = true;
        for offset in 0..page_len {
            let (differs, absent) = Self::probe(views, offset);
            if !differs {
                match_count += 1;
            }
            if !absent {
                all_absent = false;
            }
        }
        PageSummary {
            match_count,
            all_absent,
        }
    }

    fn page_len(views: &[FileView]) -> u32 {
        views.iter().map(|v| v.view_len()).max().unwrap_or(0)
    }

    /// Returns (differs, absent-everywhere) for one viewport offset.
    ///
    /// All present bytes are equal exactly when their running OR and AND
    /// agree, so one pass over the views suffices.
    fn probe(views: &[FileView], offset: u32) -> (bool, bool) {
        let mut union = 0x00u8;
        let mut inter = 0xFFu8;
        let mut present = 0usize;
        for view in views {
            if let Some(byte) = view.byte_at(offset) {
                union |= byte;
                inter &= byte;
                present += 1;
            }
        }
        let differs = if present == 0 {
            false
        } else if present < views.len() {
            true
        } else {
            union != inter
        };
        (differs, present == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn view_at(data: Vec<u8>, view_len: u32, pos: u64) -> FileView {
        let mut view = FileView::open(MemorySource::new(data));
        view.set_view_len(view_len);
        view.set_position(pos);
        view
    }

    #[test]
    fn single_view_never_differs() {
        let views = vec![view_at((0u8..64).collect(), 16, 0)];
        assert!(DiffEngine::compute(&views).iter().all(|&d| !d));
        let summary = DiffEngine::summarize(&views);
        assert_eq!(summary.match_count, 16);
        assert!(!summary.all_absent);
    }

    #[test]
    fn identical_views_all_match() {
        let data: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        let views = vec![
            view_at(data.clone(), 256, 1024),
            view_at(data.clone(), 256, 1024),
            view_at(data, 256, 1024),
        ];
        assert!(DiffEngine::compute(&views).iter().all(|&d| !d));
        assert_eq!(DiffEngine::summarize(&views).match_count, 256);
    }

    #[test]
    fn flags_exactly_the_changed_byte() {
        // Two 32-byte files, identical except byte 20. With a 16-byte page
        // positioned at 16, the disagreement lands at page offset 4.
        let a: Vec<u8> = (0u8..32).collect();
        let mut b = a.clone();
        b[20] = 0xFF;
        let views = vec![view_at(a, 16, 16), view_at(b, 16, 16)];
        let flags = DiffEngine::compute(&views);
        for (offset, &differs) in flags.iter().enumerate() {
            assert_eq!(differs, offset == 4, "wrong flag at page offset {offset}");
        }
        let summary = DiffEngine::summarize(&views);
        assert_eq!(summary.match_count, 15);
        assert!(!summary.all_absent);
    }

    #[test]
    fn absent_byte_differs_from_every_value() {
        // 32-byte file against a 20-byte prefix of it: past offset 20 one
        // view still has bytes and the other does not.
        let long: Vec<u8> = (0u8..32).collect();
        let short: Vec<u8> = long[..20].to_vec();
        let views = vec![view_at(long, 16, 16), view_at(short, 16, 16)];
        let flags = DiffEngine::compute(&views);
        for (offset, &differs) in flags.iter().enumerate() {
            assert_eq!(differs, offset >= 4, "wrong flag at page offset {offset}");
        }
    }

    #[test]
    fn offsets_absent_everywhere_agree() {
        let views = vec![
            view_at(vec![5u8; 10], 32, 0),
            view_at(vec![5u8; 10], 32, 0),
        ];
        let flags = DiffEngine::compute(&views);
        assert!(flags.iter().all(|&d| !d));
        let summary = DiffEngine::summarize(&views);
        assert_eq!(summary.match_count, 32);
        assert!(!summary.all_absent, "real bytes exist at the page start");
    }

    #[test]
    fn page_past_every_file_is_all_absent() {
        let views = vec![
            view_at(vec![1u8; 100], 16, 112),
            view_at(vec![1u8; 64], 16, 112),
        ];
        let summary = DiffEngine::summarize(&views);
        assert!(summary.all_absent);
        assert_eq!(summary.match_count, 16);
    }

    #[test]
    fn zero_bits_still_compare() {
        // 0x00 vs 0x01 only disagree in the low bit; the OR/AND fold must
        // still catch it.
        let views = vec![view_at(vec![0x00], 1, 0), view_at(vec![0x01], 1, 0)];
        assert_eq!(DiffEngine::compute(&views), vec![true]);
    }
}
