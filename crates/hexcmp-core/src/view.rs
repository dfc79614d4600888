//! Sliding-window cached view over one byte source

use crate::source::{ByteSource, FileSource, OpenError};
use std::path::Path;

/// Size of the in-memory window kept per file.
pub const CACHE_CAPACITY: usize = 1 << 20;

/// Refills are issued on this boundary so that small scrolls inside the same
/// 64 KiB region never re-touch the source, and sequential scans get
/// full-size sequential reads.
pub const CACHE_ALIGN: u64 = 1 << 16;

/// Cache counters reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Start of the cached range (absolute offset).
    pub begin: u64,
    /// End of the cached range (absolute offset, exclusive).
    pub end: u64,
    /// Positions satisfied without touching the source.
    pub hits: u64,
    /// Positions that issued a read.
    pub refills: u64,
}

/// One open file: a viewport position plus a 1 MiB cache window over its
/// source.
///
/// The viewport is the byte range currently requested for display
/// (`[view_pos, view_pos + view_len)` clamped to the file); the cache window
/// is the contiguous range actually held in memory, always a superset of the
/// viewport after [`FileView::set_position`] returns.
pub struct FileView {
    source: Box<dyn ByteSource + Send>,
    size: u64,
    view_pos: u64,
    view_end: u64,
    view_len: u32,
    cache_begin: u64,
    cache_end: u64,
    cache_valid: bool,
    cache_buf: Box<[u8]>,
    hits: u64,
    refills: u64,
}

impl std::fmt::Debug for FileView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileView")
            .field("size", &self.size)
            .field("view_pos", &self.view_pos)
            .field("view_end", &self.view_end)
            .field("view_len", &self.view_len)
            .field("cache_begin", &self.cache_begin)
            .field("cache_end", &self.cache_end)
            .field("cache_valid", &self.cache_valid)
            .field("hits", &self.hits)
            .field("refills", &self.refills)
            .finish_non_exhaustive()
    }
}

impl FileView {
    /// Wrap an already-opened source. The cache starts empty; call
    /// [`FileView::set_view_len`] (or let the navigator reconfigure) before
    /// reading bytes.
    pub fn open(source: impl ByteSource + Send + 'static) -> Self {
        let source: Box<dyn ByteSource + Send> = Box::new(source);
        let size = source.len();
        Self {
            source,
            size,
            view_pos: 0,
            view_end: 0,
            view_len: 0,
            cache_begin: 0,
            cache_end: 0,
            cache_valid: false,
            cache_buf: vec![0u8; CACHE_CAPACITY].into_boxed_slice(),
            hits: 0,
            refills: 0,
        }
    }

    /// Open a view over a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        Ok(Self::open(FileSource::open(path)?))
    }

    /// Total byte length of the underlying source, fixed at open time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// First byte offset currently requested for display.
    pub fn position(&self) -> u64 {
        self.view_pos
    }

    /// Number of bytes the viewport covers (rows x bytes-per-row).
    pub fn view_len(&self) -> u32 {
        self.view_len
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            begin: self.cache_begin,
            end: self.cache_end,
            hits: self.hits,
            refills: self.refills,
        }
    }

    /// Byte at `offset` within the viewport, or `None` when the offset lies
    /// past the file's end (an absent byte, distinct from every real value).
    pub fn byte_at(&self, offset: u32) -> Option<u8> {
        let abs = self.view_pos.checked_add(offset as u64)?;
        if abs >= self.view_end || abs < self.cache_begin || abs >= self.cache_end {
            return None;
        }
        Some(self.cache_buf[(abs - self.cache_begin) as usize])
    }

    /// Reconfigure the viewport size and re-satisfy the current position.
    pub fn set_view_len(&mut self, view_len: u32) {
        self.view_len = view_len;
        self.set_position(self.view_pos);
    }

    /// Move the viewport to `new_pos`, refilling the cache window when the
    /// requested range is not already resident.
    ///
    /// A position past the end of the file is legal (every byte reads as
    /// absent); a position that wrapped past zero from a negative navigation
    /// delta resets to the start. Short reads near end-of-file clamp the
    /// visible range and are not errors.
    pub fn set_position(&mut self, new_pos: u64) {
        let mut new_pos = new_pos;
        // A position past the file's end is kept as-is (the viewport is
        // simply empty); only a true wrap from a negative delta resets.
        let mut new_end = match new_pos.checked_add(self.view_len as u64) {
            Some(end) => end,
            None => {
                new_pos = 0;
                self.view_len as u64
            }
        };
        if new_end > self.size {
            new_end = self.size;
        }

        let resident = self.cache_valid && new_pos >= self.cache_begin && new_end <= self.cache_end;
        if resident {
            self.hits += 1;
        } else {
            self.cache_begin = new_pos - (new_pos % CACHE_ALIGN);
            let read = self.source.read_at(self.cache_begin, &mut self.cache_buf);
            self.cache_end = self.cache_begin + read as u64;
            self.cache_valid = true;
            self.refills += 1;
            if new_end > self.cache_end {
                new_end = self.cache_end;
            }
        }

        self.view_pos = new_pos;
        self.view_end = new_end;
    }

    /// Force the next [`FileView::set_position`] to treat the cache as empty
    /// (used by "reload file data").
    pub fn invalidate_cache(&mut self) {
        self.cache_begin = 0;
        self.cache_end = 0;
        self.cache_valid = false;
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
    fn cache_covers_viewport_after_set_position() {
        let data: Vec<u8> = (0..200_000).map(|i| (i % 251) as u8).collect();
        let size = data.len() as u64;
        let mut view = view_over(data, 256);

        for pos in [0u64, 100, 65_535, 65_536, 120_000, 199_900, 250_000] {
            view.set_position(pos);
            let stats = view.cache_stats();
            if stats.end > stats.begin {
                assert!(stats.begin <= view.position());
                let visible_end = (view.position() + view.view_len() as u64).min(size);
                assert!(
                    visible_end <= stats.end,
                    "viewport escapes the cache at pos {pos}"
                );
                assert_eq!(stats.begin % CACHE_ALIGN, 0, "unaligned refill at pos {pos}");
            }
        }
    }

    #[test]
    fn set_position_is_idempotent_on_io() {
        let mut view = view_over(vec![0xAB; 300_000], 512);
        view.set_position(150_000);
        let refills = view.cache_stats().refills;
        view.set_position(150_000);
        view.set_position(150_000);
        let stats = view.cache_stats();
        assert_eq!(stats.refills, refills, "repeat position must be a pure cache hit");
        assert!(stats.hits >= 2);
    }

    #[test]
    fn small_scrolls_within_aligned_window_stay_cached() {
        let mut view = view_over(vec![7u8; 500_000], 256);
        view.set_position(0);
        let refills = view.cache_stats().refills;
        // Everything below CACHE_CAPACITY - view_len is still in the window
        // loaded by the first refill at offset 0.
        for pos in (0..200_000u64).step_by(4096) {
            view.set_position(pos);
        }
        assert_eq!(view.cache_stats().refills, refills);
    }

    #[test]
    fn invalidate_forces_refill() {
        let mut view = view_over(vec![1u8; 4096], 64);
        view.set_position(0);
        let refills = view.cache_stats().refills;
        view.invalidate_cache();
        view.set_position(0);
        assert_eq!(view.cache_stats().refills, refills + 1);
    }

    #[test]
    fn underflow_resets_to_start() {
        let mut view = view_over(vec![9u8; 1024], 16);
        view.set_position(0);
        // ByteLeft from position 0 wraps; set_position catches it.
        view.set_position(0u64.wrapping_sub(1));
        assert_eq!(view.position(), 0);
        assert_eq!(view.byte_at(0), Some(9));
    }

    #[test]
    fn bytes_past_eof_are_absent() {
        // 10-byte file under a 32-byte viewport: offsets 10..31 are absent.
        let mut view = view_over((0u8..10).collect(), 32);
        view.set_position(0);
        for offset in 0..10 {
            assert_eq!(view.byte_at(offset), Some(offset as u8));
        }
        for offset in 10..32 {
            assert_eq!(view.byte_at(offset), None);
        }
    }

    #[test]
    fn position_past_eof_reads_all_absent() {
        let mut view = view_over(vec![3u8; 100], 16);
        view.set_position(1000);
        assert_eq!(view.position(), 1000);
        for offset in 0..16 {
            assert_eq!(view.byte_at(offset), None);
        }
    }

    #[test]
    fn refill_is_aligned_and_bounded() {
        let data: Vec<u8> = (0..2_000_000).map(|i| (i % 256) as u8).collect();
        let mut view = view_over(data, 256);
        view.set_position(1_500_000);
        let stats = view.cache_stats();
        assert_eq!(stats.begin % CACHE_ALIGN, 0);
        assert!(stats.end - stats.begin <= CACHE_CAPACITY as u64);
        assert_eq!(view.byte_at(0), Some((1_500_000u64 % 256) as u8));
    }

    #[test]
    fn empty_file_never_loops_on_io() {
        let mut view = view_over(Vec::new(), 16);
        view.set_position(0);
        let refills = view.cache_stats().refills;
        view.set_position(0);
        assert_eq!(view.cache_stats().refills, refills);
        assert_eq!(view.byte_at(0), None);
    }
}
