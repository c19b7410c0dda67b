use std::fmt::Display;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
/// A four bit field that specifies kind of query in this message.
/// This value is set by the originator of a query and copied into the response.
pub enum OpCode {
    /// A standard query (QUERY)
    Query,
    /// An inverse query (IQUERY), obsoleted by RFC 3425 but still a named
    /// opcode value.
    IQuery,
    /// Server status request (STATUS)
    Status,
    /// An opcode this server doesn't recognize; preserved opaquely so it
    /// can be echoed back.
    Other(u8),
}

impl From<u8> for OpCode {
    fn from(input: u8) -> Self {
        match input {
            0 => Self::Query,
            1 => Self::IQuery,
            2 => Self::Status,
            other => Self::Other(other),
        }
    }
}

impl From<OpCode> for u8 {
    fn from(val: OpCode) -> u8 {
        match val {
            OpCode::Query => 0,
            OpCode::IQuery => 1,
            OpCode::Status => 2,
            OpCode::Other(value) => value,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Response code, things like NOERROR, FORMERR, SERVFAIL etc.
pub enum Rcode {
    /// No error condition
    NoError,
    /// Format error - the name server was unable to interpret the query.
    FormErr,
    /// Server failure - the name server was unable to process this query
    /// due to a problem with the name server.
    ServFail,
    /// Name Error - meaningful only for responses from an authoritative
    /// name server, this code signifies that the domain name referenced in
    /// the query does not exist.
    NXDomain,
    /// An rcode this server doesn't recognize; preserved opaquely.
    Other(u8),
}

impl From<u8> for Rcode {
    fn from(input: u8) -> Self {
        match input {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NXDomain,
            other => Self::Other(other),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(val: Rcode) -> u8 {
        match val {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::Other(value) => value,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// RRType, eg A, NS, MX, etc. Values follow the IANA registry, which
/// disagrees with the numbering some early drafts of this server used
/// (see `DESIGN.md`).
pub enum RecordType {
    /// A host address
    A,
    /// Authoritative name server
    NS,
    /// The canonical name for an alias
    CNAME,
    /// Marks the start of a zone of authority
    SOA,
    /// Mail exchange
    MX,
    /// Text strings
    TXT,
    /// IPv6 address <https://www.rfc-editor.org/rfc/rfc3596#section-2.1>
    AAAA,
    /// A request for all records (*)
    ANY,
    /// Any other 16-bit type code, preserved opaquely.
    Other(u16),
}

impl From<u16> for RecordType {
    fn from(input: u16) -> Self {
        match input {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            255 => Self::ANY,
            other => Self::Other(other),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(val: RecordType) -> u16 {
        match val {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::ANY => 255,
            RecordType::Other(value) => value,
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::SOA => write!(f, "SOA"),
            RecordType::MX => write!(f, "MX"),
            RecordType::TXT => write!(f, "TXT"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::ANY => write!(f, "ANY"),
            RecordType::Other(value) => write!(f, "TYPE{value}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// CLASS fields appear in resource records, most entries should be IN, but
/// CHAOS is typically used for management-layer things. Ref RFC1035
/// 3.2.4.
pub enum RecordClass {
    /// IN - Internet
    Internet,
    /// CS - CSNET class (Obsolete - used only for examples in some obsolete RFCs)
    CsNet,
    /// CH - Chaos
    Chaos,
    /// HS - Hesiod
    Hesiod,
    /// Any other 16-bit class code, preserved opaquely.
    Other(u16),
}

impl From<u16> for RecordClass {
    fn from(input: u16) -> Self {
        match input {
            1 => Self::Internet,
            2 => Self::CsNet,
            3 => Self::Chaos,
            4 => Self::Hesiod,
            other => Self::Other(other),
        }
    }
}

impl From<RecordClass> for u16 {
    fn from(val: RecordClass) -> u16 {
        match val {
            RecordClass::Internet => 1,
            RecordClass::CsNet => 2,
            RecordClass::Chaos => 3,
            RecordClass::Hesiod => 4,
            RecordClass::Other(value) => value,
        }
    }
}

impl Display for RecordClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordClass::Internet => write!(f, "IN"),
            RecordClass::CsNet => write!(f, "CS"),
            RecordClass::Chaos => write!(f, "CH"),
            RecordClass::Hesiod => write!(f, "HS"),
            RecordClass::Other(value) => write!(f, "CLASS{value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PacketType {
    Query,
    Answer,
}

impl From<bool> for PacketType {
    fn from(input: bool) -> Self {
        match input {
            false => Self::Query,
            true => Self::Answer,
        }
    }
}

impl From<PacketType> for bool {
    fn from(val: PacketType) -> bool {
        matches!(val, PacketType::Answer)
    }
}
