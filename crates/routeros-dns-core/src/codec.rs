// # Record Codec
//
// Maps endpoints to native router records and back.
//
// ## Field layout
//
// | Type  | Fields                                              | Target form          |
// |-------|-----------------------------------------------------|----------------------|
// | A     | address                                             | `address`            |
// | CNAME | cname                                               | `cname`              |
// | MX    | mx-preference, mx-exchange                          | `pref exchange`      |
// | NS    | ns                                                  | `ns`                 |
// | SRV   | srv-priority, srv-weight, srv-port, srv-target      | `prio weight port target` |
// | TXT   | text                                                | `text` (spaces kept) |
//
// Composite targets are split on single spaces and must have exactly the
// listed number of parts.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::{Endpoint, RecordKey};
use crate::ownership::{self, RecordMetadata};
use crate::record::{NativeRecord, fields};
use crate::ttl::{format_ttl, parse_ttl};

/// Record types with a native field layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Cname,
    Mx,
    Ns,
    Srv,
    Txt,
}

impl RecordType {
    pub const ALL: [RecordType; 6] = [
        RecordType::A,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Srv,
        RecordType::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::unsupported(s))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed, type-specific part of a native record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A {
        address: String,
    },
    Cname {
        cname: String,
    },
    Mx {
        preference: String,
        exchange: String,
    },
    Ns {
        ns: String,
    },
    Srv {
        priority: String,
        weight: String,
        port: String,
        target: String,
    },
    Txt {
        text: String,
    },
}

impl RecordData {
    /// Split an endpoint target into typed fields
    pub fn from_target(record_type: RecordType, target: &str) -> Result<Self> {
        let data = match record_type {
            RecordType::A => RecordData::A {
                address: target.to_string(),
            },
            RecordType::Cname => RecordData::Cname {
                cname: target.to_string(),
            },
            RecordType::Mx => match target.split(' ').collect::<Vec<_>>().as_slice() {
                [preference, exchange] => RecordData::Mx {
                    preference: preference.to_string(),
                    exchange: exchange.to_string(),
                },
                _ => return Err(Error::malformed("mx", target)),
            },
            RecordType::Ns => RecordData::Ns {
                ns: target.to_string(),
            },
            RecordType::Srv => match target.split(' ').collect::<Vec<_>>().as_slice() {
                [priority, weight, port, srv_target] => RecordData::Srv {
                    priority: priority.to_string(),
                    weight: weight.to_string(),
                    port: port.to_string(),
                    target: srv_target.to_string(),
                },
                _ => return Err(Error::malformed("srv", target)),
            },
            RecordType::Txt => RecordData::Txt {
                text: target.to_string(),
            },
        };
        Ok(data)
    }

    /// Read typed fields from a native record; absent fields read as empty
    pub fn from_record(record_type: RecordType, record: &NativeRecord) -> Self {
        let field = |key| record.field(key).to_string();
        match record_type {
            RecordType::A => RecordData::A {
                address: field(fields::ADDRESS),
            },
            RecordType::Cname => RecordData::Cname {
                cname: field(fields::CNAME),
            },
            RecordType::Mx => RecordData::Mx {
                preference: field(fields::MX_PREFERENCE),
                exchange: field(fields::MX_EXCHANGE),
            },
            RecordType::Ns => RecordData::Ns {
                ns: field(fields::NS),
            },
            RecordType::Srv => RecordData::Srv {
                priority: field(fields::SRV_PRIORITY),
                weight: field(fields::SRV_WEIGHT),
                port: field(fields::SRV_PORT),
                target: field(fields::SRV_TARGET),
            },
            RecordType::Txt => RecordData::Txt {
                text: field(fields::TEXT),
            },
        }
    }

    /// Re-join the typed fields into an endpoint target
    pub fn to_target(&self) -> String {
        match self {
            RecordData::A { address } => address.clone(),
            RecordData::Cname { cname } => cname.clone(),
            RecordData::Mx {
                preference,
                exchange,
            } => format!("{preference} {exchange}"),
            RecordData::Ns { ns } => ns.clone(),
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {target}"),
            RecordData::Txt { text } => text.clone(),
        }
    }

    fn write_to(&self, record: &mut NativeRecord) {
        match self {
            RecordData::A { address } => record.set(fields::ADDRESS, address),
            RecordData::Cname { cname } => record.set(fields::CNAME, cname),
            RecordData::Mx {
                preference,
                exchange,
            } => {
                record.set(fields::MX_PREFERENCE, preference);
                record.set(fields::MX_EXCHANGE, exchange);
            }
            RecordData::Ns { ns } => record.set(fields::NS, ns),
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                record.set(fields::SRV_PRIORITY, priority);
                record.set(fields::SRV_WEIGHT, weight);
                record.set(fields::SRV_PORT, port);
                record.set(fields::SRV_TARGET, target);
            }
            RecordData::Txt { text } => record.set(fields::TEXT, text),
        }
    }
}

/// Encode one target of an endpoint into a native record
pub fn encode(endpoint: &Endpoint, target: &str) -> Result<NativeRecord> {
    let record_type: RecordType = endpoint.record_type.parse()?;
    let data = RecordData::from_target(record_type, target)?;

    let mut record = NativeRecord::new()
        .with(fields::TYPE, record_type.as_str())
        .with(fields::NAME, &endpoint.dns_name)
        .with(fields::TTL, format_ttl(endpoint.record_ttl))
        .with(fields::COMMENT, ownership::tag(&RecordMetadata::default())?);
    data.write_to(&mut record);

    Ok(record)
}

/// Encode every target of an endpoint
///
/// Fails before returning anything if any target is malformed.
pub fn encode_endpoint(endpoint: &Endpoint) -> Result<Vec<NativeRecord>> {
    endpoint
        .targets
        .iter()
        .map(|target| encode(endpoint, target))
        .collect()
}

/// Group native records into endpoints
///
/// Records sharing a (type, name) key become one endpoint whose targets
/// follow listing order. The TTL comes from the first record of each
/// group. A missing type is read as A.
pub fn decode(records: &[NativeRecord]) -> Result<Vec<Endpoint>> {
    let mut endpoints: Vec<Endpoint> = Vec::new();
    let mut index: HashMap<RecordKey, usize> = HashMap::new();

    for record in records {
        let key = record.key();
        let record_type: RecordType = key.record_type.parse()?;

        let slot = match index.get(&key).copied() {
            Some(slot) => slot,
            None => {
                let ttl = parse_ttl(record.ttl())?;
                endpoints.push(
                    Endpoint::new(&key.name, record_type.as_str(), Vec::<String>::new())
                        .with_ttl(ttl),
                );
                index.insert(key, endpoints.len() - 1);
                endpoints.len() - 1
            }
        };

        let target = RecordData::from_record(record_type, record).to_target();
        endpoints[slot].targets.push(target);
    }

    Ok(endpoints)
}
