//! Wire encoder/decoder for DNS messages: header flags, domain names
//! (with decompression on decode), questions, and resource records.
//!
//! Names are always emitted uncompressed on encode; decoding understands
//! compression pointers. See [`decode_name`] for the pointer-following
//! algorithm.

use crate::bitpack;
use crate::enums::{OpCode, Rcode, RecordClass, RecordType};
use crate::error::GoatnsCoreError;
use crate::message::{
    DomainName, Header, Message, Question, ResourceRecord, ResourceRecordData,
};
use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Size of the fixed DNS header.
pub const HEADER_BYTES: usize = 12;
/// Every label is at most this many octets.
pub const MAX_LABEL_OCTETS: usize = 63;
/// Every fully-resolved name is at most this many octets, including
/// length prefixes and the terminating zero.
pub const MAX_NAME_OCTETS: usize = 255;
/// No response datagram exceeds this many octets.
pub const MAX_MESSAGE_OCTETS: usize = 512;

// --- Flags word -------------------------------------------------------

/// Assembles the two-octet flags word from a [`Header`]'s fields.
pub fn encode_flags(header: &Header) -> [u8; 2] {
    let mut high = 0u8;
    high = bitpack::set(high, 0, header.qr);
    high = bitpack::set_range(high, 1, 4, u8::from(header.opcode));
    high = bitpack::set(high, 5, header.authoritative);
    high = bitpack::set(high, 6, header.truncated);
    high = bitpack::set(high, 7, header.recursion_desired);

    let mut low = 0u8;
    low = bitpack::set(low, 0, header.recursion_available);
    // bits 1..=3 are the reserved Z field: zero on transmit.
    low = bitpack::set_range(low, 4, 7, u8::from(header.rcode));

    [high, low]
}

/// Inverse of [`encode_flags`]; the `Z` field is read and discarded.
/// Opcodes and rcodes outside the enumerated set decode to their opaque
/// `Other` variant rather than being rejected.
#[allow(clippy::type_complexity)]
pub fn decode_flags(bytes: [u8; 2]) -> (bool, OpCode, bool, bool, bool, bool, Rcode) {
    let [high, low] = bytes;
    let qr = bitpack::get(high, 0);
    let opcode = OpCode::from(bitpack::get_range(high, 1, 4));
    let aa = bitpack::get(high, 5);
    let tc = bitpack::get(high, 6);
    let rd = bitpack::get(high, 7);
    let ra = bitpack::get(low, 0);
    let rcode = Rcode::from(bitpack::get_range(low, 4, 7));
    (qr, opcode, aa, tc, rd, ra, rcode)
}

// --- Header -------------------------------------------------------------

pub fn encode_header(header: &Header) -> [u8; HEADER_BYTES] {
    let mut out = [0u8; HEADER_BYTES];
    out[0..2].copy_from_slice(&header.id.to_be_bytes());
    out[2..4].copy_from_slice(&encode_flags(header));
    out[4..6].copy_from_slice(&header.qd_count.to_be_bytes());
    out[6..8].copy_from_slice(&header.an_count.to_be_bytes());
    out[8..10].copy_from_slice(&header.ns_count.to_be_bytes());
    out[10..12].copy_from_slice(&header.ar_count.to_be_bytes());
    out
}

pub fn decode_header(buf: &[u8]) -> Result<Header, GoatnsCoreError> {
    if buf.len() < HEADER_BYTES {
        return Err(GoatnsCoreError::InvalidHeader(format!(
            "need {HEADER_BYTES} octets, got {}",
            buf.len()
        )));
    }
    let id = u16::from_be_bytes([buf[0], buf[1]]);
    let (qr, opcode, aa, tc, rd, ra, rcode) = decode_flags([buf[2], buf[3]]);
    Ok(Header {
        id,
        qr,
        opcode,
        authoritative: aa,
        truncated: tc,
        recursion_desired: rd,
        recursion_available: ra,
        rcode,
        qd_count: u16::from_be_bytes([buf[4], buf[5]]),
        an_count: u16::from_be_bytes([buf[6], buf[7]]),
        ns_count: u16::from_be_bytes([buf[8], buf[9]]),
        ar_count: u16::from_be_bytes([buf[10], buf[11]]),
    })
}

// --- Domain names ---------------------------------------------------------

/// Emits `name` with one length-prefixed label per segment, terminated by
/// a zero octet. Never emits a compression pointer.
pub fn encode_name(name: &DomainName) -> Vec<u8> {
    let mut out = Vec::new();
    for label in &name.labels {
        out.push(label.len() as u8);
        out.extend_from_slice(label);
    }
    out.push(0);
    out
}

/// Decodes a name starting at `offset` within the full message `buf`,
/// following compression pointers. Returns the name and the cursor
/// position immediately after the name's wire representation in the
/// buffer the caller was reading sequentially (i.e. past the pointer,
/// not past whatever the pointer resolved to).
pub fn decode_name(buf: &[u8], offset: usize) -> Result<(DomainName, usize), GoatnsCoreError> {
    let mut labels = Vec::new();
    let mut cursor = offset;
    let mut cursor_after_name: Option<usize> = None;
    let mut visited_pointers: HashSet<usize> = HashSet::new();
    let mut total_octets = 0usize;

    loop {
        let length_byte = *buf
            .get(cursor)
            .ok_or(GoatnsCoreError::InvalidName)?;
        match length_byte & 0xC0 {
            0x00 => {
                let len = length_byte as usize;
                if len == 0 {
                    if cursor_after_name.is_none() {
                        cursor_after_name = Some(cursor + 1);
                    }
                    break;
                }
                if len > MAX_LABEL_OCTETS {
                    return Err(GoatnsCoreError::InvalidName);
                }
                let label_start = cursor + 1;
                let label_end = label_start + len;
                if label_end > buf.len() {
                    return Err(GoatnsCoreError::InvalidName);
                }
                total_octets += 1 + len;
                if total_octets > MAX_NAME_OCTETS {
                    return Err(GoatnsCoreError::InvalidName);
                }
                labels.push(buf[label_start..label_end].to_vec());
                cursor = label_end;
            }
            0xC0 => {
                let next = *buf.get(cursor + 1).ok_or(GoatnsCoreError::InvalidName)?;
                let pointer = (((length_byte & 0x3F) as usize) << 8) | next as usize;
                if pointer >= cursor {
                    // must strictly precede the pointer's own offset, or it
                    // can never terminate.
                    return Err(GoatnsCoreError::InvalidName);
                }
                if cursor_after_name.is_none() {
                    cursor_after_name = Some(cursor + 2);
                }
                if !visited_pointers.insert(pointer) {
                    return Err(GoatnsCoreError::InvalidName);
                }
                cursor = pointer;
            }
            _ => return Err(GoatnsCoreError::InvalidName),
        }
    }

    Ok((DomainName { labels }, cursor_after_name.unwrap_or(cursor + 1)))
}

// --- Questions --------------------------------------------------------

pub fn encode_question(question: &Question) -> Vec<u8> {
    let mut out = encode_name(&question.qname);
    out.extend_from_slice(&u16::from(question.qtype).to_be_bytes());
    out.extend_from_slice(&u16::from(question.qclass).to_be_bytes());
    out
}

pub fn decode_question(buf: &[u8], offset: usize) -> Result<(Question, usize), GoatnsCoreError> {
    let (qname, mut cursor) = decode_name(buf, offset)?;
    if cursor + 4 > buf.len() {
        return Err(GoatnsCoreError::InvalidName);
    }
    let qtype = RecordType::from(u16::from_be_bytes([buf[cursor], buf[cursor + 1]]));
    let qclass = RecordClass::from(u16::from_be_bytes([buf[cursor + 2], buf[cursor + 3]]));
    cursor += 4;
    Ok((
        Question {
            qname,
            qtype,
            qclass,
        },
        cursor,
    ))
}

// --- Resource records ---------------------------------------------------

fn encode_rdata(rdata: &ResourceRecordData) -> Vec<u8> {
    match rdata {
        ResourceRecordData::A(addr) => addr.octets().to_vec(),
        ResourceRecordData::AAAA(addr) => addr.octets().to_vec(),
        ResourceRecordData::CNAME(name) => encode_name(name),
        ResourceRecordData::NS(name) => encode_name(name),
        ResourceRecordData::MX {
            preference,
            exchange,
        } => {
            let mut out = preference.to_be_bytes().to_vec();
            out.extend(encode_name(exchange));
            out
        }
        ResourceRecordData::TXT(bytes) => bytes.clone(),
        ResourceRecordData::SOA {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => {
            let mut out = encode_name(mname);
            out.extend(encode_name(rname));
            out.extend(serial.to_be_bytes());
            out.extend(refresh.to_be_bytes());
            out.extend(retry.to_be_bytes());
            out.extend(expire.to_be_bytes());
            out.extend(minimum.to_be_bytes());
            out
        }
        ResourceRecordData::Unknown { rdata, .. } => rdata.clone(),
    }
}

/// Interprets `rdata` (the slice `[rdata_start, rdata_end)` of `buf`) for
/// a known `record_type`, falling back to an opaque [`ResourceRecordData::Unknown`]
/// if the type is unrecognized or the bytes don't match the type's
/// canonical shape. Names embedded in rdata (CNAME/NS/MX/SOA) may use
/// compression pointers back into `buf`, hence taking the whole message
/// rather than just the rdata slice.
fn decode_rdata(
    buf: &[u8],
    record_type: RecordType,
    rdata_start: usize,
    rdata_end: usize,
) -> ResourceRecordData {
    let raw = || buf[rdata_start..rdata_end].to_vec();
    match record_type {
        RecordType::A if rdata_end - rdata_start == 4 => {
            let o = &buf[rdata_start..rdata_end];
            ResourceRecordData::A(Ipv4Addr::new(o[0], o[1], o[2], o[3]))
        }
        RecordType::AAAA if rdata_end - rdata_start == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&buf[rdata_start..rdata_end]);
            ResourceRecordData::AAAA(Ipv6Addr::from(octets))
        }
        RecordType::CNAME => match decode_name(buf, rdata_start) {
            Ok((name, _)) => ResourceRecordData::CNAME(name),
            Err(_) => ResourceRecordData::Unknown {
                type_code: u16::from(record_type),
                rdata: raw(),
            },
        },
        RecordType::NS => match decode_name(buf, rdata_start) {
            Ok((name, _)) => ResourceRecordData::NS(name),
            Err(_) => ResourceRecordData::Unknown {
                type_code: u16::from(record_type),
                rdata: raw(),
            },
        },
        RecordType::MX if rdata_end - rdata_start >= 2 => {
            let preference = u16::from_be_bytes([buf[rdata_start], buf[rdata_start + 1]]);
            match decode_name(buf, rdata_start + 2) {
                Ok((exchange, _)) => ResourceRecordData::MX {
                    preference,
                    exchange,
                },
                Err(_) => ResourceRecordData::Unknown {
                    type_code: u16::from(record_type),
                    rdata: raw(),
                },
            }
        }
        RecordType::TXT => ResourceRecordData::TXT(raw()),
        RecordType::SOA => {
            let attempt = (|| -> Result<ResourceRecordData, GoatnsCoreError> {
                let (mname, cursor) = decode_name(buf, rdata_start)?;
                let (rname, cursor) = decode_name(buf, cursor)?;
                if cursor + 20 > buf.len() {
                    return Err(GoatnsCoreError::InvalidName);
                }
                let read_u32 = |at: usize| {
                    u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
                };
                Ok(ResourceRecordData::SOA {
                    mname,
                    rname,
                    serial: read_u32(cursor),
                    refresh: read_u32(cursor + 4),
                    retry: read_u32(cursor + 8),
                    expire: read_u32(cursor + 12),
                    minimum: read_u32(cursor + 16),
                })
            })();
            attempt.unwrap_or_else(|_| ResourceRecordData::Unknown {
                type_code: u16::from(record_type),
                rdata: raw(),
            })
        }
        RecordType::A
        | RecordType::AAAA
        | RecordType::MX
        | RecordType::ANY
        | RecordType::Other(_) => {
            ResourceRecordData::Unknown {
                type_code: u16::from(record_type),
                rdata: raw(),
            }
        }
    }
}

pub fn encode_record(record: &ResourceRecord) -> Vec<u8> {
    let mut out = encode_name(&record.name);
    out.extend_from_slice(&u16::from(record.rdata.record_type()).to_be_bytes());
    out.extend_from_slice(&u16::from(record.class).to_be_bytes());
    out.extend_from_slice(&record.ttl.to_be_bytes());
    let rdata = encode_rdata(&record.rdata);
    out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    out.extend(rdata);
    out
}

pub fn decode_record(buf: &[u8], offset: usize) -> Result<(ResourceRecord, usize), GoatnsCoreError> {
    let (name, mut cursor) = decode_name(buf, offset)?;
    if cursor + 10 > buf.len() {
        return Err(GoatnsCoreError::InvalidName);
    }
    let record_type = RecordType::from(u16::from_be_bytes([buf[cursor], buf[cursor + 1]]));
    let class = RecordClass::from(u16::from_be_bytes([buf[cursor + 2], buf[cursor + 3]]));
    let ttl = u32::from_be_bytes([
        buf[cursor + 4],
        buf[cursor + 5],
        buf[cursor + 6],
        buf[cursor + 7],
    ]);
    let rdlength = u16::from_be_bytes([buf[cursor + 8], buf[cursor + 9]]) as usize;
    cursor += 10;
    let rdata_end = cursor + rdlength;
    if rdata_end > buf.len() {
        return Err(GoatnsCoreError::InvalidName);
    }
    let rdata = decode_rdata(buf, record_type, cursor, rdata_end);
    Ok((
        ResourceRecord {
            name,
            class,
            ttl,
            rdata,
        },
        rdata_end,
    ))
}

// --- Messages -----------------------------------------------------------

/// Serializes `message`, re-deriving the header's section counters from
/// the actual body. If the encoded form would exceed [`MAX_MESSAGE_OCTETS`],
/// trailing answer/authority/additional records are dropped (in that
/// order) and the TC flag is set.
pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut header = message.header.unwrap_or_default();
    header.qd_count = message.questions.len() as u16;

    let mut question_bytes = Vec::new();
    for question in &message.questions {
        question_bytes.extend(encode_question(question));
    }

    let mut running_len = HEADER_BYTES + question_bytes.len();
    let mut exceeded = false;

    let take_within_budget = |records: &[ResourceRecord],
                               running_len: &mut usize,
                               exceeded: &mut bool|
     -> Vec<Vec<u8>> {
        let mut included = Vec::new();
        if *exceeded {
            return included;
        }
        for record in records {
            let bytes = encode_record(record);
            if *running_len + bytes.len() > MAX_MESSAGE_OCTETS {
                *exceeded = true;
                break;
            }
            *running_len += bytes.len();
            included.push(bytes);
        }
        included
    };

    let answers = take_within_budget(&message.answers, &mut running_len, &mut exceeded);
    let authority = take_within_budget(&message.authority, &mut running_len, &mut exceeded);
    let additional = take_within_budget(&message.additional, &mut running_len, &mut exceeded);

    header.an_count = answers.len() as u16;
    header.ns_count = authority.len() as u16;
    header.ar_count = additional.len() as u16;
    header.truncated = header.truncated || exceeded;

    let mut out = Vec::with_capacity(running_len);
    out.extend(encode_header(&header));
    out.extend(question_bytes);
    for bytes in answers.into_iter().chain(authority).chain(additional) {
        out.extend(bytes);
    }
    out
}

/// Decodes a full message out of a received datagram. Errors are always
/// malformed-input faults; the caller maps them to an `FormErr` response.
pub fn decode_message(buf: &[u8]) -> Result<Message, GoatnsCoreError> {
    let header = decode_header(buf)?;
    let mut cursor = HEADER_BYTES;

    let mut questions = Vec::with_capacity(header.qd_count as usize);
    for _ in 0..header.qd_count {
        let (question, next) = decode_question(buf, cursor)?;
        questions.push(question);
        cursor = next;
    }

    let decode_n = |count: u16, cursor: &mut usize| -> Result<Vec<ResourceRecord>, GoatnsCoreError> {
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (record, next) = decode_record(buf, *cursor)?;
            out.push(record);
            *cursor = next;
        }
        Ok(out)
    };

    let answers = decode_n(header.an_count, &mut cursor)?;
    let authority = decode_n(header.ns_count, &mut cursor)?;
    let additional = decode_n(header.ar_count, &mut cursor)?;

    Ok(Message {
        header: Some(header),
        questions,
        answers,
        authority,
        additional,
    })
}
