//! The UDP listener: binds one socket, spawns an independent worker task
//! per datagram bounded by a semaphore, resolves queries against the
//! store, and writes a response datagram.

use crate::codec::{decode_message, encode_message, MAX_MESSAGE_OCTETS};
use crate::config::ConfigFile;
use crate::enums::{RecordType, Rcode};
use crate::message::{Header, Message};
use crate::store::RecordStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, instrument, trace, warn};

/// Binds the configured UDP endpoint and runs the accept loop until the
/// process is torn down. Each datagram is handed to its own `tokio::spawn`ed
/// worker bounded by `config.max_in_flight` permits in flight at once;
/// datagrams arriving when every permit is held are dropped, relying on
/// client retransmission.
pub async fn udp_server(
    config: Arc<ConfigFile>,
    store: Arc<dyn RecordStore>,
) -> std::io::Result<()> {
    let socket = UdpSocket::bind(&config.listen_addr).await?;
    tracing::info!(address = %config.listen_addr, "started UDP listener");
    run_udp_server(socket, config, store).await
}

/// Runs the accept loop against an already-bound socket. Split out from
/// [`udp_server`] so tests can bind an ephemeral port and learn its
/// address before the loop starts.
pub async fn run_udp_server(
    socket: UdpSocket,
    config: Arc<ConfigFile>,
    store: Arc<dyn RecordStore>,
) -> std::io::Result<()> {
    let socket = Arc::new(socket);
    let semaphore = Arc::new(Semaphore::new(config.max_in_flight));
    let mut read_buf = vec![0u8; config.read_buf_size.max(MAX_MESSAGE_OCTETS)];

    loop {
        let (len, origin) = match socket.recv_from(&mut read_buf).await {
            Ok(value) => value,
            Err(error) => {
                error!(?error, "error receiving UDP datagram");
                continue;
            }
        };

        let permit = match Arc::clone(&semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("max in-flight workers reached, dropping datagram");
                continue;
            }
        };

        let datagram = read_buf[..len].to_vec();
        let socket = Arc::clone(&socket);
        let store = Arc::clone(&store);
        let worker_budget = Duration::from_secs(config.worker_budget_secs);
        let default_ttl = config.default_ttl;

        tokio::spawn(async move {
            let _permit = permit;
            match timeout(
                worker_budget,
                handle_datagram(datagram, origin, store, default_ttl),
            )
            .await
            {
                Ok(Ok(Some(response))) => {
                    if let Err(error) = socket.send_to(&response, origin).await {
                        warn!(?error, %origin, "failed to send response");
                    }
                }
                Ok(Ok(None)) => {
                    debug!(%origin, "dropping datagram with unrecoverable header");
                }
                Ok(Err(error)) => {
                    error!(?error, %origin, "worker failed");
                }
                Err(_) => {
                    warn!(%origin, "worker exceeded its budget, abandoning request");
                }
            }
        });
    }
}

/// Resolves one request end to end, returning the response bytes to send
/// (or `None` if even the transaction id could not be recovered).
#[instrument(level = "debug", skip(datagram, store), fields(bytes = datagram.len()))]
async fn handle_datagram(
    datagram: Vec<u8>,
    origin: SocketAddr,
    store: Arc<dyn RecordStore>,
    default_ttl: u32,
) -> std::io::Result<Option<Vec<u8>>> {
    // The header must decode cleanly before its transaction id can be
    // trusted enough to address a FormErr response; a too-short datagram
    // never parsed a header at all, so it is dropped silently.
    let header_bytes = match datagram.get(..crate::codec::HEADER_BYTES) {
        Some(bytes) => bytes,
        None => {
            trace!("datagram shorter than a full header, dropping");
            return Ok(None);
        }
    };
    let recovered_header = match crate::codec::decode_header(header_bytes) {
        Ok(header) => header,
        Err(error) => {
            trace!(?error, "failed to decode header, dropping");
            return Ok(None);
        }
    };

    let message = match decode_message(&datagram) {
        Ok(message) => message,
        Err(error) => {
            trace!(?error, "failed to decode message body");
            return Ok(Some(encode_message(&Message {
                header: Some(Header::error_response(
                    recovered_header.id,
                    recovered_header.opcode,
                    Rcode::FormErr,
                )),
                ..Default::default()
            })));
        }
    };

    let query_header = message.header.unwrap_or_default();
    let mut response_header = Header {
        id: query_header.id,
        qr: true,
        opcode: query_header.opcode,
        authoritative: true,
        truncated: false,
        recursion_desired: query_header.recursion_desired,
        recursion_available: false,
        rcode: Rcode::NoError,
        qd_count: 0,
        an_count: 0,
        ns_count: 0,
        ar_count: 0,
    };

    let mut answers = Vec::new();

    for question in &message.questions {
        let records = match store.records_by_name(&question.qname).await {
            Ok(records) => records,
            Err(error) => {
                warn!(?error, name = %question.qname, "store lookup failed");
                response_header.rcode = Rcode::ServFail;
                return Ok(Some(encode_message(&Message {
                    header: Some(response_header),
                    questions: message.questions.clone(),
                    ..Default::default()
                })));
            }
        };

        if records.is_empty() {
            response_header.rcode = Rcode::NXDomain;
            return Ok(Some(encode_message(&Message {
                header: Some(response_header),
                questions: message.questions.clone(),
                ..Default::default()
            })));
        }

        for mut record in records {
            let matches_type =
                question.qtype == record.rdata.record_type() || question.qtype == RecordType::ANY;
            if !matches_type {
                continue;
            }
            if record.ttl == 0 {
                record.ttl = default_ttl;
            }
            answers.push(record);
        }
    }

    Ok(Some(encode_message(&Message {
        header: Some(response_header),
        questions: message.questions,
        answers,
        authority: vec![],
        additional: vec![],
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{RecordClass, RecordType};
    use crate::message::{DomainName, Question, ResourceRecord, ResourceRecordData};
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use std::net::Ipv4Addr;

    /// A store double that always fails, for exercising the ServFail path.
    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn records_by_name(
            &self,
            _name: &DomainName,
        ) -> Result<Vec<ResourceRecord>, StoreError> {
            Err(StoreError("backing store unavailable".to_string()))
        }
    }

    fn query_bytes(qname: &str, qtype: RecordType) -> Vec<u8> {
        let message = Message {
            header: Some(Header {
                id: 0xBEEF,
                recursion_desired: true,
                qd_count: 1,
                ..Default::default()
            }),
            questions: vec![Question {
                qname: DomainName::from(qname),
                qtype,
                qclass: RecordClass::Internet,
            }],
            ..Default::default()
        };
        encode_message(&message)
    }

    #[tokio::test]
    async fn test_handle_datagram_answers_a_record() {
        let mem = Arc::new(MemoryStore::new());
        mem.insert(ResourceRecord {
            name: DomainName::from("example.com"),
            class: RecordClass::Internet,
            ttl: 300,
            rdata: ResourceRecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
        });
        let store: Arc<dyn RecordStore> = mem;

        let datagram = query_bytes("example.com", RecordType::A);
        let response = handle_datagram(datagram, "127.0.0.1:9999".parse().unwrap(), store, 1080)
            .await
            .unwrap()
            .unwrap();
        let decoded = decode_message(&response).unwrap();
        assert_eq!(decoded.header.unwrap().rcode, Rcode::NoError);
        assert_eq!(decoded.answers.len(), 1);
    }

    #[tokio::test]
    async fn test_handle_datagram_nxdomain_for_missing_name() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let datagram = query_bytes("missing.example.com", RecordType::A);
        let response = handle_datagram(datagram, "127.0.0.1:9999".parse().unwrap(), store, 1080)
            .await
            .unwrap()
            .unwrap();
        let decoded = decode_message(&response).unwrap();
        assert_eq!(decoded.header.unwrap().rcode, Rcode::NXDomain);
        assert_eq!(decoded.questions.len(), 1);
        assert_eq!(
            decoded.questions[0].qname,
            DomainName::from("missing.example.com")
        );
    }

    #[tokio::test]
    async fn test_handle_datagram_servfail_on_store_error() {
        let store: Arc<dyn RecordStore> = Arc::new(FailingStore);
        let datagram = query_bytes("example.com", RecordType::A);
        let response = handle_datagram(datagram, "127.0.0.1:9999".parse().unwrap(), store, 1080)
            .await
            .unwrap()
            .unwrap();
        let decoded = decode_message(&response).unwrap();
        assert_eq!(decoded.header.unwrap().rcode, Rcode::ServFail);
        assert_eq!(decoded.questions.len(), 1);
        assert_eq!(decoded.questions[0].qname, DomainName::from("example.com"));
    }
}
