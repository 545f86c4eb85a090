use bytes::BytesMut;
use tracing::warn;

/// Longest line (terminator excluded) the framer will buffer.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Splits an arbitrary-chunked byte stream into trimmed `\n`-terminated lines.
///
/// Bytes after the last terminator are kept until the next `feed`. A line
/// longer than `max_line_len` is dropped whole, however it was chunked: once
/// the unterminated tail outgrows the cap it is released and everything up to
/// the next `\n` is skipped.
#[derive(Debug)]
pub struct LineFramer {
    buf: BytesMut,
    max_line_len: usize,
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self { buf: BytesMut::with_capacity(256), max_line_len, discarding: false }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw = self.buf.split_to(pos + 1);
            if self.discarding {
                self.discarding = false;
                continue;
            }
            if pos > self.max_line_len {
                warn!("framer: dropped {} byte line (max {})", pos, self.max_line_len);
                continue;
            }
            lines.push(trim_line(&raw[..pos]));
        }

        if self.buf.len() > self.max_line_len {
            if !self.discarding {
                warn!("framer: unterminated input over {} bytes, skipping to next newline", self.max_line_len);
                self.discarding = true;
            }
            self.buf.clear();
        }
        lines
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn trim_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &[u8] = b"B,3.30,0.05,3.25,120.0,400.0\r\n30,45\nLASER_ACTIVATED\n  noise \t\n\n12,";

    fn feed_chunked(data: &[u8], size: usize) -> (Vec<String>, usize) {
        let mut f = LineFramer::default();
        let mut out = Vec::new();
        for chunk in data.chunks(size) {
            out.extend(f.feed(chunk));
        }
        (out, f.pending())
    }

    #[test]
    fn splits_and_trims_lines() {
        let mut f = LineFramer::default();
        let lines = f.feed(STREAM);
        assert_eq!(lines, vec!["B,3.30,0.05,3.25,120.0,400.0", "30,45", "LASER_ACTIVATED", "noise", ""]);
        assert_eq!(f.pending(), 3);
    }

    #[test]
    fn chunk_boundaries_do_not_change_output() {
        let (whole, rest) = feed_chunked(STREAM, STREAM.len());
        for size in 1..STREAM.len() {
            let (lines, pending) = feed_chunked(STREAM, size);
            assert_eq!(lines, whole, "chunk size {}", size);
            assert_eq!(pending, rest);
        }
    }

    #[test]
    fn partial_line_completes_on_later_chunk() {
        let mut f = LineFramer::default();
        assert!(f.feed(b"17").is_empty());
        assert!(f.feed(b"0,8").is_empty());
        assert_eq!(f.feed(b"8.5\n"), vec!["170,88.5"]);
        assert_eq!(f.pending(), 0);
    }

    #[test]
    fn overlong_line_is_dropped_and_framing_resyncs() {
        let mut input = vec![b'x'; 40];
        input.extend_from_slice(b"\n10,20\n");

        let mut f = LineFramer::new(16);
        assert_eq!(f.feed(&input), vec!["10,20"]);

        let mut f = LineFramer::new(16);
        let mut lines = Vec::new();
        for b in &input {
            lines.extend(f.feed(std::slice::from_ref(b)));
        }
        assert_eq!(lines, vec!["10,20"]);
        assert_eq!(f.pending(), 0);
    }
}
