//! G-code document
//!
//! Owns the program text, the playback cursor, the time estimate and the
//! compiled toolpath cache. Loading is synchronous; callers that need a
//! responsive UI run it on a background task and must not touch the
//! document while a load is in flight.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Error;
use crate::estimate::{Diagnostic, MotionProfileEstimator, ProfileStats};
use crate::geometry::{Node, NodeCache};
use crate::mirror::mirror_line;
use crate::settings::MachineSettings;

/// Playback position within a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackCursor {
    /// Lines handed out so far, also the index of the next line
    pub lines_processed: usize,
    pub total_lines: usize,
    pub is_open: bool,
}

impl PlaybackCursor {
    pub fn more_available(&self) -> bool {
        self.is_open && self.lines_processed < self.total_lines
    }
}

/// A loaded program
#[derive(Debug, Default)]
pub struct GCodeDocument {
    lines: Vec<String>,
    cursor: PlaybackCursor,
    stats: ProfileStats,
    diagnostics: Vec<Diagnostic>,
    cache: NodeCache,
}

impl GCodeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and load a file
    pub fn open(path: &Path, settings: &MachineSettings) -> Result<Self, Error> {
        let mut document = Self::new();
        document.load_file(path, settings)?;
        Ok(document)
    }

    /// Replace the program with the lines read from `source`
    ///
    /// Mirrors the program when `reverse_for_glass` is set, rewinds the
    /// cursor, drops the compiled toolpath and runs the time estimate.
    /// On a read error the document is left empty and closed. Bytes that are
    /// not UTF-8 are replaced, so a stray Latin-1 comment only affects its line.
    pub fn load<R: BufRead>(
        &mut self,
        mut source: R,
        settings: &MachineSettings,
    ) -> Result<&ProfileStats, Error> {
        self.reset();

        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if source.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = decode_line(&buf, lines.len());
            lines.push(if settings.reverse_for_glass {
                mirror_line(&line)
            } else {
                line
            });
        }

        self.cursor = PlaybackCursor {
            lines_processed: 0,
            total_lines: lines.len(),
            is_open: true,
        };
        self.lines = lines;
        self.cache.invalidate();

        let estimate = MotionProfileEstimator::new(settings).estimate(&self.lines);
        self.stats = estimate.stats;
        self.diagnostics = estimate.diagnostics;

        log::info!(
            "Loaded {} lines ({} segments, {:.1} mm, {:.1} s)",
            self.lines.len(),
            self.stats.segment_count,
            self.stats.estimated_length_mm,
            self.stats.estimated_time_ms / 1000.0
        );
        Ok(&self.stats)
    }

    /// Load from an in-memory program
    pub fn load_str(
        &mut self,
        program: &str,
        settings: &MachineSettings,
    ) -> Result<&ProfileStats, Error> {
        self.load(program.as_bytes(), settings)
    }

    pub fn load_file(
        &mut self,
        path: &Path,
        settings: &MachineSettings,
    ) -> Result<&ProfileStats, Error> {
        match File::open(path) {
            Ok(file) => self.load(BufReader::new(file), settings),
            Err(e) => {
                self.reset();
                Err(e.into())
            }
        }
    }

    /// Forget the program, the cursor and the estimate
    pub fn reset(&mut self) {
        self.lines.clear();
        self.cursor = PlaybackCursor::default();
        self.stats = ProfileStats::default();
        self.diagnostics.clear();
        self.cache.invalidate();
    }

    /// Close the program; the last estimate stays readable
    pub fn close(&mut self) {
        if self.cursor.is_open {
            self.lines.clear();
            self.cursor = PlaybackCursor::default();
            self.cache.invalidate();
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cursor.is_open && !self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn stats(&self) -> &ProfileStats {
        &self.stats
    }

    /// Lines the last estimate could not fully read
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn more_available(&self) -> bool {
        self.cursor.more_available()
    }

    /// The line at the cursor, trimmed
    pub fn current(&self) -> Result<&str, Error> {
        self.check_cursor()?;
        Ok(self.lines[self.cursor.lines_processed].trim())
    }

    /// The line at the cursor, trimmed; moves the cursor past it
    pub fn advance(&mut self) -> Result<&str, Error> {
        self.check_cursor()?;
        let index = self.cursor.lines_processed;
        self.cursor.lines_processed += 1;
        Ok(self.lines[index].trim())
    }

    /// Move the cursor, e.g. to a resume point; clamped to the program end
    pub fn seek(&mut self, line: usize) {
        self.cursor.lines_processed = line.min(self.cursor.total_lines);
    }

    /// Last line before `start_line` whose text equals `marker`
    ///
    /// Scans down from `min(start_line, len - 1)` and stops at line 1;
    /// line 0 is never looked at. Returns 1 when nothing matches.
    pub fn find_last_pen_lift_before(&self, start_line: usize, marker: &str) -> usize {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return 1;
        };

        let marker = marker.trim();
        let mut index = start_line.min(last);
        while index > 1 {
            if self.lines[index].trim() == marker {
                return index;
            }
            index -= 1;
        }

        1
    }

    /// Compiled toolpath, built on first use after a change
    pub fn nodes(&self, settings: &MachineSettings) -> Arc<[Node]> {
        self.cache.get(&self.lines, settings)
    }

    /// Non-blocking variant of [`nodes`](Self::nodes) for render loops
    pub fn try_nodes(&self, settings: &MachineSettings) -> Option<Arc<[Node]>> {
        self.cache.try_get(&self.lines, settings)
    }

    /// Drop the compiled toolpath, e.g. after a settings change
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn check_cursor(&self) -> Result<(), Error> {
        if self.more_available() {
            Ok(())
        } else {
            Err(Error::CursorOutOfRange {
                position: self.cursor.lines_processed,
                total: self.cursor.total_lines,
            })
        }
    }
}

/// One raw line without its `\n` or `\r\n`, decoded lossily
fn decode_line(raw: &[u8], index: usize) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    // editors on Windows like to start files with a byte order mark
    let raw = if index == 0 {
        raw.strip_prefix("\u{feff}".as_bytes()).unwrap_or(raw)
    } else {
        raw
    };

    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            log::debug!("Line {} is not valid UTF-8, replaced: '{}'", index, text);
            text
        }
    }
}
