// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The writer state machine (§4.5–§4.6): `open`/`add_connection`/`write`/
//! `close`, chunk rotation, and the two-pass header back-patch.

use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::chunk::{Chunk, IndexEntry};
use crate::connection::{Connection, ConnectionHandle, ConnectionRegistry};
use crate::error::{BagError, Result};
use crate::header::Header;
use crate::primitives::{write_u32, RosTime};
use crate::sink::{FileSink, MemorySink, Sink};

const OP_MSGDATA: u8 = 2;
const OP_BAGHEADER: u8 = 3;
const OP_IDXDATA: u8 = 4;
const OP_CHUNK: u8 = 5;
const OP_CHUNK_INFO: u8 = 6;
const OP_CONNECTION: u8 = 7;

/// Magic bytes at the start of every ROS1 bag v2.0 file.
const MAGIC: &[u8] = b"#ROSBAG V2.0\n";

/// Size of the reserved BAGHEADER envelope, including its 4-byte length
/// prefix and padding record.
const BAGHEADER_ENVELOPE_LEN: usize = 4096;

/// Default chunk rotation threshold: 1 MiB.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Open,
    Closed,
}

enum Destination {
    File(PathBuf),
    Memory,
}

enum SinkImpl {
    File(FileSink),
    Memory(MemorySink),
}

impl Sink for SinkImpl {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            SinkImpl::File(s) => s.write(bytes),
            SinkImpl::Memory(s) => s.write(bytes),
        }
    }

    fn position(&self) -> u64 {
        match self {
            SinkImpl::File(s) => s.position(),
            SinkImpl::Memory(s) => s.position(),
        }
    }

    fn patch(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        match self {
            SinkImpl::File(s) => s.patch(offset, bytes),
            SinkImpl::Memory(s) => s.patch(offset, bytes),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            SinkImpl::File(s) => s.close(),
            SinkImpl::Memory(s) => s.close(),
        }
    }
}

/// Summary of a flushed chunk, retained for the CHUNK_INFO tail records.
struct FlushedChunk {
    pos: u64,
    start_ns: u64,
    end_ns: u64,
    /// `(conn_id, message_count)` pairs, in first-insertion order.
    connections: Vec<(u32, u32)>,
}

/// A ROS1 bag file writer.
///
/// Construct with [`Writer::new`] (file-backed) or [`Writer::in_memory`],
/// then drive it through `open` → `add_connection`/`write` (repeated) →
/// `close`.
pub struct Writer {
    phase: Phase,
    destination: Destination,
    sink: Option<SinkImpl>,
    chunk_threshold: usize,
    registry: ConnectionRegistry,
    active_chunk: Chunk,
    flushed_chunks: Vec<FlushedChunk>,
}

impl Writer {
    /// Create a file-backed writer targeting `path`. The file is not
    /// touched until [`Writer::open`] is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Writer::with_destination(Destination::File(path.as_ref().to_path_buf()))
    }

    /// Create an in-memory writer. Bytes are retrievable via
    /// [`Writer::into_bytes`] after `close()`.
    pub fn in_memory() -> Self {
        Writer::with_destination(Destination::Memory)
    }

    fn with_destination(destination: Destination) -> Self {
        Writer {
            phase: Phase::Fresh,
            destination,
            sink: None,
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            registry: ConnectionRegistry::new(),
            active_chunk: Chunk::new(),
            flushed_chunks: Vec::new(),
        }
    }

    /// Override the chunk rotation threshold (default 1 MiB). Must be
    /// called before `open()`.
    pub fn with_chunk_threshold(mut self, threshold: usize) -> Self {
        self.chunk_threshold = threshold;
        self
    }

    /// Request a compression format. Only `"none"` is accepted.
    pub fn with_compression(self, format: &str) -> Result<Self> {
        if format == "none" {
            Ok(self)
        } else {
            Err(BagError::unsupported(format!("compression: {format}")))
        }
    }

    /// Open the destination and write the magic bytes plus a placeholder
    /// BAGHEADER envelope. Idempotent if already open.
    pub fn open(&mut self) -> Result<()> {
        match self.phase {
            Phase::Open => return Ok(()),
            Phase::Closed => return Err(BagError::AlreadyClosed),
            Phase::Fresh => {}
        }

        let mut sink = match &self.destination {
            Destination::File(path) => SinkImpl::File(FileSink::create(path)?),
            Destination::Memory => SinkImpl::Memory(MemorySink::new()),
        };

        sink.write(MAGIC)?;
        sink.write(&bagheader_envelope(0, 0, 0))?;

        self.sink = Some(sink);
        self.phase = Phase::Open;
        debug!("bag writer opened");
        Ok(())
    }

    /// Register a connection. If `msgdef`/`md5sum` are absent, they are
    /// resolved from the predefined schema table keyed by `msgtype`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_connection(
        &mut self,
        topic: &str,
        msgtype: &str,
        msgdef: Option<&str>,
        md5sum: Option<&str>,
        callerid: Option<&str>,
        latching: Option<i64>,
    ) -> Result<ConnectionHandle> {
        if self.phase != Phase::Open {
            return Err(BagError::NotOpen);
        }

        let handle = self
            .registry
            .add(topic, msgtype, msgdef, md5sum, callerid, latching)?;
        let conn = self.registry.get(handle.id()).expect("just inserted");
        self.active_chunk.append(&connection_record_pair(conn));
        debug!(topic, msgtype, id = handle.id(), "connection added");
        Ok(handle)
    }

    /// Write one message against `handle`.
    pub fn write(&mut self, handle: ConnectionHandle, timestamp_ns: u64, payload: &[u8]) -> Result<()> {
        if self.phase != Phase::Open {
            return Err(BagError::NotOpen);
        }
        if self.registry.get(handle.id()).is_none() {
            return Err(BagError::unknown_connection(handle.id()));
        }

        let offset = self.active_chunk.offset() as u32;
        self.active_chunk
            .record_message(handle.id(), timestamp_ns, offset);

        let record = msgdata_record(handle.id(), RosTime::from_nanos(timestamp_ns), payload);
        self.active_chunk.append(&record);
        trace!(conn = handle.id(), timestamp_ns, len = payload.len(), "message written");

        if self.active_chunk.size() > self.chunk_threshold {
            self.flush_active_chunk()?;
        }

        Ok(())
    }

    /// Flush the active chunk (if non-empty) and install a fresh one.
    fn flush_active_chunk(&mut self) -> Result<()> {
        let chunk = mem::replace(&mut self.active_chunk, Chunk::new());
        if chunk.size() == 0 {
            return Ok(());
        }

        let sink = self.sink.as_mut().expect("open() guarantees a sink");
        let pos = sink.position();
        let start_ns = chunk.start_time_ns();
        let end_ns = chunk.end_time_ns();
        let connections: Vec<(u32, u32)> = chunk
            .connections()
            .map(|(id, entries)| (*id, entries.len() as u32))
            .collect();
        let idx_records: Vec<Vec<u8>> = chunk
            .connections()
            .map(|(id, entries)| idxdata_record(*id, entries))
            .collect();

        let body = chunk.finalize();
        sink.write(&chunk_record(&body))?;
        for record in &idx_records {
            sink.write(record)?;
        }

        info!(bytes = body.len(), connections = connections.len(), "chunk flushed");
        self.flushed_chunks.push(FlushedChunk {
            pos,
            start_ns,
            end_ns,
            connections,
        });
        Ok(())
    }

    /// Finalize the bag: flush any pending chunk, write the tail, and
    /// back-patch the BAGHEADER. Idempotent if already closed.
    pub fn close(&mut self) -> Result<()> {
        match self.phase {
            Phase::Closed => return Ok(()),
            Phase::Fresh => return Err(BagError::NotOpen),
            Phase::Open => {}
        }

        if self.active_chunk.size() > 0 {
            self.flush_active_chunk()?;
        }

        let sink = self.sink.as_mut().expect("open() guarantees a sink");
        let index_pos = sink.position();

        for conn in self.registry.iter() {
            sink.write(&connection_record_pair(conn))?;
        }

        for flushed in &self.flushed_chunks {
            sink.write(&chunk_info_record(
                flushed.pos,
                RosTime::from_nanos(flushed.start_ns),
                RosTime::from_nanos(flushed.end_ns),
                &flushed.connections,
            ))?;
        }

        let envelope = bagheader_envelope(
            index_pos,
            self.registry.len() as u32,
            self.flushed_chunks.len() as u32,
        );
        sink.patch(MAGIC.len() as u64, &envelope)?;
        sink.close()?;

        self.phase = Phase::Closed;
        debug!(index_pos, conn_count = self.registry.len(), chunk_count = self.flushed_chunks.len(), "bag writer closed");
        Ok(())
    }

    /// Consume an in-memory writer and return its bytes. Fails with
    /// [`BagError::WrongMode`] for a file-backed writer or
    /// [`BagError::NotClosed`] if not yet closed.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        if !matches!(self.destination, Destination::Memory) {
            return Err(BagError::WrongMode);
        }
        if self.phase != Phase::Closed {
            return Err(BagError::NotClosed);
        }
        match self.sink.take() {
            Some(SinkImpl::Memory(sink)) => Ok(sink.into_bytes()),
            _ => Err(BagError::WrongMode),
        }
    }
}

/// Build the full 4096-byte BAGHEADER + padding envelope.
fn bagheader_envelope(index_pos: u64, conn_count: u32, chunk_count: u32) -> Vec<u8> {
    let mut header = Header::new();
    header.set_u64("index_pos", index_pos);
    header.set_u32("conn_count", conn_count);
    header.set_u32("chunk_count", chunk_count);

    let mut out = header.serialize(Some(OP_BAGHEADER));
    let used = out.len() + 4;
    let pad_len = BAGHEADER_ENVELOPE_LEN - used;
    write_u32(&mut out, pad_len as u32);
    out.resize(out.len() + pad_len, b' ');
    out
}

/// Build the CONNECTION + nested-type-header record pair for `conn`.
fn connection_record_pair(conn: &Connection) -> Vec<u8> {
    let mut out = Vec::new();

    let mut conn_header = Header::new();
    conn_header.set_u32("conn", conn.id);
    conn_header.set_string("topic", &conn.topic);
    out.extend(conn_header.serialize(Some(OP_CONNECTION)));

    let mut type_header = Header::new();
    type_header.set_string("topic", &conn.topic);
    type_header.set_string("type", &conn.msgtype);
    type_header.set_string("md5sum", &conn.md5sum);
    type_header.set_string("message_definition", &conn.msgdef);
    if let Some(callerid) = &conn.callerid {
        type_header.set_string("callerid", callerid);
    }
    if let Some(latching) = conn.latching {
        type_header.set_string("latching", &latching.to_string());
    }
    out.extend(type_header.serialize(None));

    out
}

/// Build a MSGDATA record: header plus length-prefixed payload.
fn msgdata_record(conn_id: u32, timestamp: RosTime, payload: &[u8]) -> Vec<u8> {
    let mut header = Header::new();
    header.set_u32("conn", conn_id);
    header.set_time("time", timestamp);

    let mut out = header.serialize(Some(OP_MSGDATA));
    write_u32(&mut out, payload.len() as u32);
    out.extend_from_slice(payload);
    out
}

/// Build a CHUNK record wrapping `body`.
fn chunk_record(body: &[u8]) -> Vec<u8> {
    let mut header = Header::new();
    header.set_string("compression", "none");
    header.set_u32("size", body.len() as u32);

    let mut out = header.serialize(Some(OP_CHUNK));
    write_u32(&mut out, body.len() as u32);
    out.extend_from_slice(body);
    out
}

/// Build an IDXDATA record for one connection's entries within a chunk.
fn idxdata_record(conn_id: u32, entries: &[IndexEntry]) -> Vec<u8> {
    let mut header = Header::new();
    header.set_u32("ver", 1);
    header.set_u32("conn", conn_id);
    header.set_u32("count", entries.len() as u32);

    let mut out = header.serialize(Some(OP_IDXDATA));
    write_u32(&mut out, (entries.len() * 12) as u32);
    for entry in entries {
        out.extend_from_slice(&RosTime::from_nanos(entry.timestamp_ns).to_bytes());
        write_u32(&mut out, entry.offset);
    }
    out
}

/// Build a CHUNK_INFO record summarizing one flushed chunk.
fn chunk_info_record(pos: u64, start: RosTime, end: RosTime, connections: &[(u32, u32)]) -> Vec<u8> {
    let mut header = Header::new();
    header.set_u32("ver", 1);
    header.set_u64("chunk_pos", pos);
    header.set_time("start_time", start);
    header.set_time("end_time", end);
    header.set_u32("count", connections.len() as u32);

    let mut out = header.serialize(Some(OP_CHUNK_INFO));
    write_u32(&mut out, (connections.len() * 8) as u32);
    for (cid, count) in connections {
        write_u32(&mut out, *cid);
        write_u32(&mut out, *count);
    }
    out
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.phase == Phase::Open {
            tracing::warn!("BagWriter dropped without calling close(); output is incomplete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bagheader_envelope_is_exactly_4096_bytes() {
        assert_eq!(bagheader_envelope(0, 0, 0).len(), BAGHEADER_ENVELOPE_LEN);
        assert_eq!(
            bagheader_envelope(123456, 7, 2).len(),
            BAGHEADER_ENVELOPE_LEN
        );
    }

    #[test]
    fn empty_bag_has_no_tail_records() {
        let mut writer = Writer::in_memory();
        writer.open().unwrap();
        writer.close().unwrap();
        let bytes = writer.into_bytes().unwrap();

        assert!(bytes.starts_with(MAGIC));
        assert_eq!(bytes.len(), MAGIC.len() + BAGHEADER_ENVELOPE_LEN);
    }

    #[test]
    fn writing_unknown_connection_fails() {
        let mut writer = Writer::in_memory();
        writer.open().unwrap();
        let bogus = ConnectionHandle(99);
        let err = writer.write(bogus, 0, b"x").unwrap_err();
        assert!(matches!(err, BagError::UnknownConnection { id: 99 }));
    }

    #[test]
    fn operations_before_open_fail_with_not_open() {
        let mut writer = Writer::in_memory();
        let err = writer
            .add_connection("/foo", "std_msgs/msg/Int8", None, None, None, None)
            .unwrap_err();
        assert!(matches!(err, BagError::NotOpen));
    }
}
