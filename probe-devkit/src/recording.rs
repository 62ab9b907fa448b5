/*!
Recording writer standing in for the sender's output stream

Captures every byte the probe writes so tests can assert on the emitted
`zabbix_sender` input lines without touching stdout.
*/

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// One parsed `"<host>" <key> <value>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderLine {
    pub host: String,
    pub key: String,
    /// Value exactly as written, quotes included
    pub value: String,
}

impl SenderLine {
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('"')?;
        let (host, rest) = rest.split_once("\" ")?;
        let (key, value) = rest.split_once(' ')?;
        Some(Self {
            host: host.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Cloneable in-memory writer; clones share the same buffer
#[derive(Clone, Default)]
pub struct RecordingWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<SenderLine> {
        self.contents()
            .lines()
            .filter_map(SenderLine::parse)
            .collect()
    }

    /// First line emitted for `key`
    pub fn find(&self, key: &str) -> Option<SenderLine> {
        self.lines().into_iter().find(|line| line.key == key)
    }

    pub fn clear(&self) {
        self.buffer.lock().unwrap().clear();
    }
}

impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
