//! ICY in-band metadata
//!
//! With `Icy-MetaData: 1` a server interleaves a metadata block after
//! every `icy-metaint` audio bytes: one length byte (×16) followed by
//! that many bytes of `StreamTitle='...';` text, NUL padded.

use heapless::{String, Vec};

use crate::config::types::bounded;

/// Largest metadata block (255 × 16)
pub const MAX_META_LEN: usize = 255 * 16;

/// Longest stream title kept
pub const MAX_TITLE_LEN: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Audio { left: usize },
    Length,
    Meta { left: usize },
}

/// Removes metadata blocks from a stream, in place
#[derive(Debug)]
pub struct IcyFilter {
    metaint: usize,
    phase: Phase,
    meta: Vec<u8, MAX_META_LEN>,
    title: String<MAX_TITLE_LEN>,
    title_changed: bool,
}

impl IcyFilter {
    /// Create a filter; `None` passes everything through
    pub fn new(metaint: Option<usize>) -> Self {
        let metaint = metaint.unwrap_or(0);
        Self {
            metaint,
            phase: Phase::Audio { left: metaint },
            meta: Vec::new(),
            title: String::new(),
            title_changed: false,
        }
    }

    /// Strip metadata from `buf`, returning how many audio bytes remain
    /// at its start
    ///
    /// Blocks may be split across calls.
    pub fn filter(&mut self, buf: &mut [u8]) -> usize {
        if self.metaint == 0 {
            return buf.len();
        }

        let mut read = 0;
        let mut write = 0;

        while read < buf.len() {
            let available = buf.len() - read;
            self.phase = match self.phase {
                Phase::Audio { left } => {
                    let n = left.min(available);
                    buf.copy_within(read..read + n, write);
                    read += n;
                    write += n;
                    if n == left {
                        Phase::Length
                    } else {
                        Phase::Audio { left: left - n }
                    }
                }
                Phase::Length => {
                    let len = usize::from(buf[read]) * 16;
                    read += 1;
                    self.meta.clear();
                    if len == 0 {
                        Phase::Audio { left: self.metaint }
                    } else {
                        Phase::Meta { left: len }
                    }
                }
                Phase::Meta { left } => {
                    let n = left.min(available);
                    // Capacity equals the largest possible block
                    let _ = self.meta.extend_from_slice(&buf[read..read + n]);
                    read += n;
                    if n == left {
                        self.finish_block();
                        Phase::Audio { left: self.metaint }
                    } else {
                        Phase::Meta { left: left - n }
                    }
                }
            };
        }

        write
    }

    fn finish_block(&mut self) {
        let end = self
            .meta
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        let Ok(text) = core::str::from_utf8(&self.meta[..end]) else {
            return;
        };
        if let Some(title) = stream_title(text) {
            // Compare what is kept, long titles are stored truncated
            let title = bounded::<MAX_TITLE_LEN>(title);
            if title != self.title {
                self.title = title;
                self.title_changed = true;
            }
        }
    }

    /// Title from the latest metadata block, if it changed since last asked
    pub fn take_title(&mut self) -> Option<&str> {
        if core::mem::take(&mut self.title_changed) {
            Some(self.title.as_str())
        } else {
            None
        }
    }
}

/// Extract `StreamTitle` from a metadata block
pub fn stream_title(meta: &str) -> Option<&str> {
    const KEY: &str = "StreamTitle='";
    let start = meta.find(KEY)? + KEY.len();
    let rest = &meta[start..];
    let end = rest.find("';").unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec as StdVec;

    /// Interleave `audio` with metadata blocks every `metaint` bytes
    fn icy_stream(audio: &[u8], metaint: usize, meta: &[u8]) -> StdVec<u8> {
        let mut out = StdVec::new();
        for chunk in audio.chunks(metaint) {
            out.extend_from_slice(chunk);
            if chunk.len() == metaint {
                let blocks = meta.len().div_ceil(16);
                out.push(blocks as u8);
                out.extend_from_slice(meta);
                out.resize(out.len() + blocks * 16 - meta.len(), 0);
            }
        }
        out
    }

    fn run(filter: &mut IcyFilter, stream: &[u8], chunk: usize) -> StdVec<u8> {
        let mut audio = StdVec::new();
        for piece in stream.chunks(chunk) {
            let mut buf = piece.to_vec();
            let n = filter.filter(&mut buf);
            audio.extend_from_slice(&buf[..n]);
        }
        audio
    }

    #[test]
    fn test_passthrough_without_metaint() {
        let mut filter = IcyFilter::new(None);
        let mut buf = [1u8, 2, 3];
        assert_eq!(filter.filter(&mut buf), 3);
        assert_eq!(filter.take_title(), None);
    }

    #[test]
    fn test_strips_metadata_across_chunk_boundaries() {
        let audio: StdVec<u8> = (0..=255u8).cycle().take(1000).collect();
        let stream = icy_stream(&audio, 64, b"StreamTitle='Artist - Song';");

        for chunk in [1, 7, 64, 65, 500, 4096] {
            let mut filter = IcyFilter::new(Some(64));
            assert_eq!(run(&mut filter, &stream, chunk), audio, "chunk {}", chunk);
            assert_eq!(filter.take_title(), Some("Artist - Song"));
            assert_eq!(filter.take_title(), None);
        }
    }

    #[test]
    fn test_empty_blocks() {
        let audio = [7u8; 30];
        let stream = icy_stream(&audio, 10, b"");
        let mut filter = IcyFilter::new(Some(10));
        assert_eq!(run(&mut filter, &stream, 13), audio);
        assert_eq!(filter.take_title(), None);
    }

    #[test]
    fn test_title_change_reported_once() {
        let mut filter = IcyFilter::new(Some(4));
        let mut stream = icy_stream(&[0; 4], 4, b"StreamTitle='One';");
        stream.extend(icy_stream(&[0; 4], 4, b"StreamTitle='One';"));
        run(&mut filter, &stream, 100);
        assert_eq!(filter.take_title(), Some("One"));

        let stream = icy_stream(&[0; 4], 4, b"StreamTitle='One';");
        run(&mut filter, &stream, 100);
        assert_eq!(filter.take_title(), None);

        let stream = icy_stream(&[0; 4], 4, b"StreamTitle='Two';StreamUrl='';");
        run(&mut filter, &stream, 100);
        assert_eq!(filter.take_title(), Some("Two"));
    }

    #[test]
    fn test_long_title_reported_once() {
        let long = "x".repeat(120);
        let meta = std::format!("StreamTitle='{}';", long);
        let mut filter = IcyFilter::new(Some(4));

        run(&mut filter, &icy_stream(&[0; 4], 4, meta.as_bytes()), 100);
        assert_eq!(filter.take_title(), Some(&long[..MAX_TITLE_LEN]));

        run(&mut filter, &icy_stream(&[0; 4], 4, meta.as_bytes()), 100);
        assert_eq!(filter.take_title(), None);
    }

    #[test]
    fn test_stream_title() {
        assert_eq!(stream_title("StreamTitle='A - B';"), Some("A - B"));
        assert_eq!(stream_title("StreamTitle='';StreamUrl='x';"), Some(""));
        assert_eq!(stream_title("StreamUrl='x';"), None);
        assert_eq!(stream_title("StreamTitle='unterminated"), Some("unterminated"));
    }
}
