// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::Error;
use log::trace;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Classification of a single configuration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only line
    Blank,
    /// First non-whitespace character is `%`
    Comment,
    /// Anything else, to be sent to the device
    Command,
}

/// One physical line of the configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    /// 1-based line number in the source
    pub number: usize,
    /// Line text with every carriage return removed
    pub text: String,
    pub kind: LineKind,
}

impl ConfigLine {
    pub fn new(number: usize, raw: &str) -> Self {
        let text: String = raw.chars().filter(|c| *c != '\r').collect();
        let kind = classify(&text);
        ConfigLine { number, text, kind }
    }

    /// The command text, or None for comments and blank lines.
    pub fn command(&self) -> Option<&str> {
        match self.kind {
            LineKind::Command => Some(&self.text),
            _ => None,
        }
    }
}

fn classify(text: &str) -> LineKind {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with('%') {
        LineKind::Comment
    } else {
        LineKind::Command
    }
}

/// Lazily yields the lines of a configuration source in file order.
pub struct ConfigReader<R> {
    reader: R,
    buf: Vec<u8>,
    number: usize,
}

impl<R: BufRead> ConfigReader<R> {
    pub fn new(reader: R) -> Self {
        ConfigReader {
            reader,
            buf: Vec::new(),
            number: 0,
        }
    }
}

impl<R: BufRead> Iterator for ConfigReader<R> {
    type Item = Result<ConfigLine, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => return None,
            Ok(_) => (),
            Err(err) => return Some(Err(Error::Io(err))),
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }

        // bytes which are not UTF-8 (e.g. Latin-1 in comments) are replaced
        let raw = String::from_utf8_lossy(&self.buf);
        self.number += 1;
        let line = ConfigLine::new(self.number, &raw);
        trace!("line {}: {:?} '{}'", line.number, line.kind, line.text);
        Some(Ok(line))
    }
}

/// Open a configuration file for reading.
///
/// # Errors
/// Returns `Error::FileOpen` if the file cannot be opened.
pub fn open<P: AsRef<Path>>(path: P) -> Result<ConfigReader<BufReader<File>>, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::FileOpen(path.to_path_buf(), err))?;
    Ok(ConfigReader::new(BufReader::new(file)))
}
