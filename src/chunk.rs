// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunk buffer: the append-only accumulator behind a single CHUNK record.

/// One recorded `(timestamp, offset)` entry for a message written into a
/// chunk, where `offset` is the byte position of the MSGDATA header inside
/// the chunk body.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    /// Message timestamp in nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
    /// Offset of the MSGDATA record within the chunk body.
    pub offset: u32,
}

/// An in-progress chunk: its raw body bytes plus the per-connection index
/// needed to emit IDXDATA records once the chunk is flushed.
pub struct Chunk {
    body: Vec<u8>,
    /// Absolute file offset of the CHUNK record, or `None` until flushed.
    pub pos: Option<u64>,
    /// Minimum message timestamp seen, or `None` if no message was ever
    /// appended (the "unset sentinel" from §3).
    start_ns: Option<u64>,
    /// Maximum message timestamp seen; 0 if unset.
    end_ns: u64,
    /// Per-connection index entries, in first-insertion order of the
    /// connection id within this chunk.
    connections: Vec<(u32, Vec<IndexEntry>)>,
}

impl Chunk {
    /// Create a new, empty chunk.
    pub fn new() -> Self {
        Chunk {
            body: Vec::new(),
            pos: None,
            start_ns: None,
            end_ns: 0,
            connections: Vec::new(),
        }
    }

    /// Current body size in bytes.
    pub fn offset(&self) -> usize {
        self.body.len()
    }

    /// Total accumulated byte count — identical to `offset()`, exposed
    /// under the spec's name for the chunk-rotation threshold check.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// Append raw bytes to the chunk body.
    pub fn append(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Consume the chunk, returning its concatenated body.
    pub fn finalize(self) -> Vec<u8> {
        self.body
    }

    /// Borrow the body without consuming the chunk.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Record a message's `(timestamp, offset)` against `conn_id`, and
    /// update the running start/end timestamps.
    pub fn record_message(&mut self, conn_id: u32, timestamp_ns: u64, offset: u32) {
        self.start_ns = Some(self.start_ns.map_or(timestamp_ns, |s| s.min(timestamp_ns)));
        self.end_ns = self.end_ns.max(timestamp_ns);

        match self.connections.iter_mut().find(|(id, _)| *id == conn_id) {
            Some((_, entries)) => entries.push(IndexEntry {
                timestamp_ns,
                offset,
            }),
            None => self.connections.push((
                conn_id,
                vec![IndexEntry {
                    timestamp_ns,
                    offset,
                }],
            )),
        }
    }

    /// Minimum message timestamp, or `0` if the sentinel was never cleared
    /// (no message was ever written to this chunk).
    pub fn start_time_ns(&self) -> u64 {
        self.start_ns.unwrap_or(0)
    }

    /// Maximum message timestamp (0 if no message was ever written).
    pub fn end_time_ns(&self) -> u64 {
        self.end_ns
    }

    /// Number of distinct connections that recorded a message in this chunk.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Iterate `(conn_id, entries)` pairs in first-insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &(u32, Vec<IndexEntry>)> {
        self.connections.iter()
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}
