//! A DNS zone as loaded from a JSON file at startup.

use crate::store::rdata_from_simple;
use serde::{Deserialize, Serialize};

/// A DNS zone in a JSON file.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileZone {
    /// The domain name this zone is authoritative for.
    pub name: String,
    /// MINIMUM TTL applied to records that don't carry one of their own.
    #[serde(default)]
    pub minimum: u32,
    pub records: Vec<FileZoneRecord>,
}

/// A single record from the JSON zone file.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct FileZoneRecord {
    pub name: String,
    pub rrtype: String,
    pub rdata: String,
    pub ttl: Option<u32>,
}

impl FileZoneRecord {
    pub fn to_resource_record_data(&self) -> Result<crate::message::ResourceRecordData, String> {
        rdata_from_simple(&self.rrtype, &self.rdata)
    }
}

/// Reads and parses a JSON zone file from disk.
pub fn load_zone_file(path: &str) -> Result<FileZone, crate::error::GoatnsCoreError> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Err(crate::error::GoatnsCoreError::EmptyFile);
    }
    let zone: FileZone = serde_json::from_str(&contents)?;
    Ok(zone)
}
