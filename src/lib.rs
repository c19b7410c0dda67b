//! A minimal authoritative DNS server: wire-format codec plus the UDP
//! query-response loop that binds it to a pluggable record store.

/// Bit-aligned field access within a single octet, used by [`codec`] to
/// assemble and read the header's flags word.
pub mod bitpack;
/// The binary's CLI surface.
pub mod cli;
/// Wire encoder/decoder for DNS messages.
pub mod codec;
/// Configuration handling for the server.
pub mod config;
/// OpCode, Rcode, RecordType, RecordClass, PacketType.
pub mod enums;
/// Error types shared across the crate.
pub mod error;
/// Tracing subscriber setup.
pub mod logging;
/// In-memory message representation: header, question, resource record.
pub mod message;
/// The UDP listener and per-request handler.
pub mod server;
/// The record store port and its in-memory reference implementation.
pub mod store;
/// Loading zones from JSON files.
pub mod zones;
