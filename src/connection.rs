// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Connection registry (§3, §4.5, §4.7): id assignment, uniqueness, and
//! predefined-schema lookup.

use crate::error::{BagError, Result};
use crate::schema;

/// An opaque handle to a registered connection, valid only against the
/// [`crate::Writer`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHandle(pub(crate) u32);

impl ConnectionHandle {
    /// The dense, zero-based connection id this handle refers to.
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// A registered connection and its schema/extension fields.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Dense, zero-based id, equal to insertion index.
    pub id: u32,
    /// Topic name.
    pub topic: String,
    /// Message type name.
    pub msgtype: String,
    /// Full message definition text.
    pub msgdef: String,
    /// 32-hex-character MD5 sum.
    pub md5sum: String,
    /// Publishing node identifier, if given.
    pub callerid: Option<String>,
    /// Latching flag, if given (not validated against `{0, 1}`).
    pub latching: Option<i64>,
}

/// Tracks all connections ever added to a writer and enforces the
/// uniqueness invariant over the full six-field tuple.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ConnectionRegistry {
            connections: Vec::new(),
        }
    }

    /// Register a new connection, resolving `msgdef`/`md5sum` from the
    /// predefined schema table when absent.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        topic: &str,
        msgtype: &str,
        msgdef: Option<&str>,
        md5sum: Option<&str>,
        callerid: Option<&str>,
        latching: Option<i64>,
    ) -> Result<ConnectionHandle> {
        let (msgdef, md5sum) = match (msgdef, md5sum) {
            (Some(d), Some(h)) => (d.to_string(), h.to_string()),
            _ => {
                let schema = schema::lookup(msgtype)
                    .ok_or_else(|| BagError::schema_required(msgtype))?;
                (
                    msgdef.unwrap_or(schema.msgdef).to_string(),
                    md5sum.unwrap_or(schema.md5sum).to_string(),
                )
            }
        };
        let callerid = callerid.map(|s| s.to_string());

        if self.connections.iter().any(|c| {
            c.topic == topic
                && c.msgtype == msgtype
                && c.msgdef == msgdef
                && c.md5sum == md5sum
                && c.callerid == callerid
                && c.latching == latching
        }) {
            return Err(BagError::duplicate_connection(topic, msgtype));
        }

        let id = self.connections.len() as u32;
        self.connections.push(Connection {
            id,
            topic: topic.to_string(),
            msgtype: msgtype.to_string(),
            msgdef,
            md5sum,
            callerid,
            latching,
        });

        Ok(ConnectionHandle(id))
    }

    /// Look up a connection by id.
    pub fn get(&self, id: u32) -> Option<&Connection> {
        self.connections.get(id as usize)
    }

    /// All registered connections, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections have been registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_zero_based() {
        let mut reg = ConnectionRegistry::new();
        let h0 = reg.add("/a", "std_msgs/msg/Int8", None, None, None, None).unwrap();
        let h1 = reg.add("/b", "std_msgs/msg/Int8", None, None, None, None).unwrap();
        assert_eq!(h0.id(), 0);
        assert_eq!(h1.id(), 1);
    }

    #[test]
    fn unknown_type_without_explicit_schema_fails() {
        let mut reg = ConnectionRegistry::new();
        let err = reg
            .add("/a", "pkg/msg/Unknown", None, None, None, None)
            .unwrap_err();
        assert!(matches!(err, BagError::SchemaRequired { .. }));
    }

    #[test]
    fn exact_duplicate_tuple_is_rejected() {
        let mut reg = ConnectionRegistry::new();
        reg.add(
            "/a",
            "pkg/msg/T",
            Some("int8 data"),
            Some("HASH"),
            None,
            None,
        )
        .unwrap();
        let err = reg
            .add(
                "/a",
                "pkg/msg/T",
                Some("int8 data"),
                Some("HASH"),
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, BagError::DuplicateConnection { .. }));
    }

    #[test]
    fn differing_only_by_latching_is_distinct() {
        let mut reg = ConnectionRegistry::new();
        reg.add(
            "/a",
            "pkg/msg/T",
            Some("int8 data"),
            Some("HASH"),
            None,
            None,
        )
        .unwrap();
        let result = reg.add(
            "/a",
            "pkg/msg/T",
            Some("int8 data"),
            Some("HASH"),
            None,
            Some(1),
        );
        assert!(result.is_ok());
    }
}
