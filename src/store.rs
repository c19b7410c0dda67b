//! The record store port the query handler consumes, plus the in-memory
//! reference implementation shipped with this crate.

use crate::message::{DomainName, ResourceRecord, ResourceRecordData};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Opaque to the core; always mapped to `ServFail` by the handler.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// The one operation the core depends on: all records owned by `name`,
/// across every type. The handler filters by the question's qtype/qclass.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn records_by_name(&self, name: &DomainName) -> Result<Vec<ResourceRecord>, StoreError>;
}

/// A `HashMap`-backed store keyed on the case-folded owner name, guarded
/// by an `RwLock` since lookups vastly outnumber mutations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Vec<Vec<u8>>, Vec<ResourceRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, record: ResourceRecord) {
        let mut guard = self.records.write().expect("store lock poisoned");
        guard
            .entry(record.name.fold_key())
            .or_default()
            .push(record);
    }

    /// Loads a [`crate::zones::FileZone`] into the store, following the
    /// teacher's `load_zones` shape.
    pub fn load_zone_file(&self, zone: &crate::zones::FileZone) -> Result<(), StoreError> {
        for entry in &zone.records {
            let rdata = entry.to_resource_record_data().map_err(StoreError)?;
            self.insert(ResourceRecord {
                name: DomainName::from(entry.name.as_str()),
                class: crate::enums::RecordClass::Internet,
                ttl: entry.ttl.unwrap_or(zone.minimum),
                rdata,
            });
        }
        debug!(records = zone.records.len(), "loaded zone file");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn records_by_name(&self, name: &DomainName) -> Result<Vec<ResourceRecord>, StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError("store lock poisoned".to_string()))?;
        match guard.get(&name.fold_key()) {
            Some(records) => Ok(records.clone()),
            None => {
                warn!(name = %name, "no records for name");
                Ok(vec![])
            }
        }
    }
}

/// Builds an [`ResourceRecordData`] for a simple `rrtype`/rdata pair,
/// following the teacher's `FileZoneRecord` shape, trimmed to the record
/// kinds this core recognizes.
pub fn rdata_from_simple(rrtype: &str, rdata: &str) -> Result<ResourceRecordData, String> {
    match rrtype.to_ascii_uppercase().as_str() {
        "A" => rdata
            .parse::<Ipv4Addr>()
            .map(ResourceRecordData::A)
            .map_err(|e| e.to_string()),
        "AAAA" => rdata
            .parse::<Ipv6Addr>()
            .map(ResourceRecordData::AAAA)
            .map_err(|e| e.to_string()),
        "CNAME" => Ok(ResourceRecordData::CNAME(DomainName::from(rdata))),
        "NS" => Ok(ResourceRecordData::NS(DomainName::from(rdata))),
        "TXT" => Ok(ResourceRecordData::TXT(rdata.as_bytes().to_vec())),
        other => Err(format!("unsupported rrtype: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::RecordClass;

    #[tokio::test]
    async fn test_lookup_missing_name_returns_empty() {
        let store = MemoryStore::new();
        let result = store
            .records_by_name(&DomainName::from("nope.example.com"))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        store.insert(ResourceRecord {
            name: DomainName::from("Example.COM"),
            class: RecordClass::Internet,
            ttl: 60,
            rdata: ResourceRecordData::A(Ipv4Addr::new(127, 0, 0, 1)),
        });
        let result = store
            .records_by_name(&DomainName::from("example.com"))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_rdata_from_simple_a_record() {
        let rdata = rdata_from_simple("A", "10.0.0.1").unwrap();
        assert_eq!(rdata, ResourceRecordData::A(Ipv4Addr::new(10, 0, 0, 1)));
    }
}
