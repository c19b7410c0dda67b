//! End-to-end UDP round trips against a live listener, covering the six
//! concrete scenarios the wire codec and query handler must satisfy.

use authdns_core::config::ConfigFile;
use authdns_core::enums::{RecordClass, Rcode};
use authdns_core::message::{DomainName, ResourceRecord, ResourceRecordData};
use authdns_core::server::run_udp_server;
use authdns_core::store::MemoryStore;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

async fn spawn_server(store: Arc<MemoryStore>) -> std::net::SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let config = Arc::new(ConfigFile {
        listen_addr: addr.to_string(),
        ..ConfigFile::default()
    });
    let store: Arc<dyn authdns_core::store::RecordStore> = store;
    tokio::spawn(async move {
        let _ = run_udp_server(socket, config, store).await;
    });
    addr
}

async fn query_response(server: std::net::SocketAddr, query: &[u8]) -> Option<Vec<u8>> {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(query, server).await.unwrap();
    let mut buf = [0u8; 1024];
    match tokio::time::timeout(Duration::from_millis(500), client.recv_from(&mut buf)).await {
        Ok(Ok((len, _))) => Some(buf[..len].to_vec()),
        _ => None,
    }
}

fn a_record_query(tx_id: u16, name: &str) -> Vec<u8> {
    let mut buf = vec![];
    buf.extend(tx_id.to_be_bytes());
    buf.extend([0x01, 0x00]); // RD=1
    buf.extend([0x00, 0x01]); // qdcount=1
    buf.extend([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in name.split('.') {
        buf.push(label.len() as u8);
        buf.extend(label.as_bytes());
    }
    buf.push(0);
    buf.extend([0x00, 0x01]); // qtype A
    buf.extend([0x00, 0x01]); // qclass IN
    buf
}

#[tokio::test]
async fn scenario_1_a_record_success() {
    let store = Arc::new(MemoryStore::new());
    store.insert(ResourceRecord {
        name: DomainName::from("example.com"),
        class: RecordClass::Internet,
        ttl: 60,
        rdata: ResourceRecordData::A(Ipv4Addr::new(192, 168, 1, 1)),
    });
    let server = spawn_server(store).await;

    let query = a_record_query(0x1A2B, "example.com");
    let response = query_response(server, &query).await.expect("no response");

    assert_eq!(&response[0..2], &[0x1A, 0x2B]);
    let decoded = authdns_core::codec::decode_message(&response).unwrap();
    let header = decoded.header.unwrap();
    assert!(header.qr);
    assert_eq!(header.rcode, Rcode::NoError);
    assert_eq!(decoded.answers.len(), 1);
    assert_eq!(
        decoded.answers[0].rdata,
        ResourceRecordData::A(Ipv4Addr::new(192, 168, 1, 1))
    );
}

#[tokio::test]
async fn scenario_2_nxdomain() {
    let store = Arc::new(MemoryStore::new());
    let server = spawn_server(store).await;

    let query = a_record_query(0x1A2B, "example.com");
    let response = query_response(server, &query).await.expect("no response");

    let decoded = authdns_core::codec::decode_message(&response).unwrap();
    let header = decoded.header.unwrap();
    assert_eq!(header.rcode, Rcode::NXDomain);
    assert_eq!(header.an_count, 0);
    assert_eq!(decoded.questions.len(), 1);
    assert_eq!(decoded.questions[0].qname, DomainName::from("example.com"));
}

#[tokio::test]
async fn scenario_3_malformed_header_no_response() {
    let store = Arc::new(MemoryStore::new());
    let server = spawn_server(store).await;

    let response = query_response(server, &[0u8; 10]).await;
    assert!(response.is_none(), "listener must not respond to a short header");

    // the listener must still be alive for a subsequent well-formed query.
    let query = a_record_query(0x0042, "still-alive.example.com");
    let response = query_response(server, &query).await;
    assert!(response.is_some());
}

#[tokio::test]
async fn scenario_4_malformed_body_recoverable_id() {
    let store = Arc::new(MemoryStore::new());
    let server = spawn_server(store).await;

    let mut query = vec![0x44u8, 0x44];
    query.extend([0x01, 0x00]);
    query.extend([0x00, 0x01]);
    query.extend([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    query.push(0xFF); // invalid label length byte (reserved top bits 11, not a full pointer)

    let response = query_response(server, &query).await.expect("no response");
    assert_eq!(&response[0..2], &[0x44, 0x44]);
    let decoded = authdns_core::codec::decode_message(&response).unwrap();
    let header = decoded.header.unwrap();
    assert_eq!(header.rcode, Rcode::FormErr);
    assert_eq!(header.qd_count, 0);
    assert_eq!(header.an_count, 0);
}

#[tokio::test]
async fn scenario_5_compressed_answer_name_decodes_like_literal() {
    // question at offset 12 names "example.com"; answer's owner name is a
    // pointer back to offset 12.
    let mut buf = a_record_query(0x5555, "example.com");
    let pointer_offset = buf.len();
    buf.push(0xC0);
    buf.push(12);
    buf.extend([0x00, 0x01]); // type A
    buf.extend([0x00, 0x01]); // class IN
    buf.extend(60u32.to_be_bytes());
    buf.extend([0x00, 0x04]);
    buf.extend([192, 168, 1, 1]);
    // fix up header: ancount = 1
    buf[6] = 0x00;
    buf[7] = 0x01;

    let (name, cursor) = authdns_core::codec::decode_name(&buf, pointer_offset).unwrap();
    assert_eq!(name, DomainName::from("example.com"));
    assert_eq!(cursor, pointer_offset + 2);
}

#[tokio::test]
async fn scenario_6_pointer_loop_rejected() {
    let store = Arc::new(MemoryStore::new());
    let server = spawn_server(store).await;

    let mut query = vec![0x66u8, 0x66];
    query.extend([0x01, 0x00]);
    query.extend([0x00, 0x01]);
    query.extend([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    query.push(0xC0);
    query.push(12); // pointer to itself at offset 12
    query.extend([0x00, 0x01]);
    query.extend([0x00, 0x01]);

    let response = query_response(server, &query).await.expect("no response");
    let decoded = authdns_core::codec::decode_message(&response).unwrap();
    assert_eq!(decoded.header.unwrap().rcode, Rcode::FormErr);
}
