// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbag_writer
//!
//! Writer for ROS1 bag files (format version 2.0).
//!
//! This crate writes the append-oriented, chunked, self-indexed binary
//! container used by the ROS1 tool ecosystem. It accepts a stream of
//! `(connection, timestamp, payload)` triples and produces a file (or an
//! in-memory byte buffer) whose layout matches the reference
//! implementation byte-for-byte, so that any existing ROS1 bag reader can
//! open it.
//!
//! Reading bags, generating message definitions or MD5 checksums from
//! schema sources, concurrent writes to the same bag, and compressed
//! chunks are all out of scope.
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rosbag_writer::Writer;
//!
//! let mut writer = Writer::new("output.bag");
//! writer.open()?;
//! let chatter = writer.add_connection("/chatter", "std_msgs/msg/Int8", None, None, None, None)?;
//! writer.write(chatter, 1_000_000_000, &[0x42])?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod connection;
pub mod error;
pub mod header;
pub mod primitives;
pub mod schema;
pub mod sink;
pub mod writer;

pub use connection::{Connection, ConnectionHandle};
pub use error::{BagError, Result};
pub use writer::{Writer, DEFAULT_CHUNK_THRESHOLD};
