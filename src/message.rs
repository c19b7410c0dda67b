//! In-memory representation of a DNS message: header, question, and the
//! resource-record types this core understands. See [`crate::codec`] for
//! the wire encoder/decoder that moves between this representation and
//! bytes.

use crate::enums::{OpCode, Rcode, RecordClass, RecordType};
use std::fmt::Display;
use std::net::{Ipv4Addr, Ipv6Addr};

/// An ordered sequence of labels, each 1-63 octets of opaque bytes. The
/// empty sequence is the root domain.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DomainName {
    pub labels: Vec<Vec<u8>>,
}

impl DomainName {
    pub fn root() -> Self {
        DomainName { labels: vec![] }
    }

    /// Case-insensitive (ASCII-fold) comparison key, per DNS convention.
    pub fn fold_key(&self) -> Vec<Vec<u8>> {
        self.labels
            .iter()
            .map(|label| label.to_ascii_lowercase())
            .collect()
    }
}

impl From<&str> for DomainName {
    fn from(input: &str) -> Self {
        if input.is_empty() || input == "." {
            return DomainName::root();
        }
        let labels = input
            .trim_end_matches('.')
            .split('.')
            .map(|label| label.as_bytes().to_vec())
            .collect();
        DomainName { labels }
    }
}

impl Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        let joined = self
            .labels
            .iter()
            .map(|label| String::from_utf8_lossy(label).into_owned())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{joined}")
    }
}

/// The flags word and fixed counters of a DNS message, ref RFC1035
/// section 4.1.1. `*_count` fields are always re-derived from the body by
/// the encoder; they are kept here only because the decoder has to read
/// them off the wire to know how many questions/records follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: OpCode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: Rcode,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl Header {
    /// A minimal response header carrying only a transaction id and
    /// rcode, used when the body of the query could not be decoded.
    pub fn error_response(id: u16, opcode: OpCode, rcode: Rcode) -> Self {
        Header {
            id,
            qr: true,
            opcode,
            authoritative: false,
            truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub qname: DomainName,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

/// Polymorphic resource-record data, grounded in the teacher's
/// `InternalResourceRecord` enum, trimmed to the record kinds this core
/// recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(DomainName),
    MX {
        preference: u16,
        exchange: DomainName,
    },
    TXT(Vec<u8>),
    NS(DomainName),
    SOA {
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    /// A record type this core doesn't know how to interpret; `rdata` is
    /// the raw bytes as read off the wire.
    Unknown { type_code: u16, rdata: Vec<u8> },
}

impl ResourceRecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            ResourceRecordData::A(_) => RecordType::A,
            ResourceRecordData::AAAA(_) => RecordType::AAAA,
            ResourceRecordData::CNAME(_) => RecordType::CNAME,
            ResourceRecordData::MX { .. } => RecordType::MX,
            ResourceRecordData::TXT(_) => RecordType::TXT,
            ResourceRecordData::NS(_) => RecordType::NS,
            ResourceRecordData::SOA { .. } => RecordType::SOA,
            ResourceRecordData::Unknown { type_code, .. } => RecordType::from(*type_code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: DomainName,
    pub class: RecordClass,
    pub ttl: u32,
    pub rdata: ResourceRecordData,
}

/// A full DNS message: header plus the four body sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub header: Option<Header>,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Default for Header {
    fn default() -> Self {
        Header {
            id: 0,
            qr: false,
            opcode: OpCode::Query,
            authoritative: false,
            truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }
}
