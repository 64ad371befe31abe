use crate::{MessageError, Name, Result, Type};
use std::collections::HashMap;
use tracing::{instrument, trace};

#[derive(Debug, Clone, PartialEq)]
/// A single record as configured in a zone, before it is put on the wire.
pub struct Record {
    /// Seconds the answer may be cached for.
    pub ttl: u32,

    /// The record data in its textual form, e.g. `93.184.216.34` for an
    /// [`Type::A`] record.
    pub value: String,
}

impl Record {
    pub fn new(ttl: u32, value: &str) -> Self {
        Self {
            ttl,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// The records configured under one origin, grouped by type in configuration
/// order.
pub struct Zone {
    origin: String,
    records: HashMap<Type, Vec<Record>>,
}

impl Zone {
    /// Creates an empty zone. The origin is stored fully qualified.
    pub fn new(origin: &str) -> Self {
        let mut origin = origin.to_string();
        if !origin.ends_with('.') {
            origin.push('.');
        }
        Self {
            origin,
            records: HashMap::new(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Appends a record of type `r_type`, keeping configuration order.
    pub fn add(&mut self, r_type: Type, record: Record) {
        self.records.entry(r_type).or_default().push(record);
    }

    pub fn with(mut self, r_type: Type, record: Record) -> Self {
        self.add(r_type, record);
        self
    }

    pub fn records(&self, r_type: Type) -> Option<&[Record]> {
        self.records.get(&r_type).map(Vec::as_slice)
    }
}

#[derive(Debug, Default)]
/// All zones the server is authoritative for, keyed by origin.
///
/// Built once at startup and only read afterwards, so it can be shared between
/// any number of concurrent queries without locking.
pub struct ZoneStore {
    zones: HashMap<String, Zone>,
}

impl ZoneStore {
    /// Builds the store. A zone with the same origin as an earlier one replaces
    /// it.
    pub fn new<I: IntoIterator<Item = Zone>>(zones: I) -> Self {
        Self {
            zones: zones
                .into_iter()
                .map(|zone| (zone.origin.clone(), zone))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zone(&self, origin: &str) -> Option<&Zone> {
        self.zones.get(origin)
    }

    /// Returns the records of type `r_type` configured for exactly `name`.
    ///
    /// Unsupported types are never found, even if a zone somehow holds records
    /// under that type.
    #[instrument(skip(self))]
    pub fn lookup(&self, name: &Name, r_type: Type) -> Result<&[Record]> {
        let origin = name.to_string();
        let zone = self
            .zones
            .get(&origin)
            .ok_or_else(|| MessageError::ZoneNotFound(origin.clone()))?;

        let records = match r_type {
            Type::A => zone.records(r_type),
            Type::Unsupported(_) => None,
        };

        match records {
            Some(records) if !records.is_empty() => {
                trace!("Found {} {} records for {}", records.len(), r_type, origin);
                Ok(records)
            }
            _ => Err(MessageError::RecordTypeNotFound(origin, r_type)),
        }
    }
}
