use adns_message::{parse_address, Record, Type, Zone, ZoneStore};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

type Result<T> = anyhow::Result<T>;

/// Zone files carry this extension; everything else in the directory is
/// skipped.
const ZONE_EXTENSION: &str = "zone";

/// The JSON layout of a zone file. Keys other than the ones below (`$ttl`,
/// `soa`, `ns`, `mx`, ...) are accepted and ignored.
#[derive(Debug, Deserialize)]
struct ZoneFile {
    #[serde(rename = "$origin")]
    origin: String,

    #[serde(default)]
    a: Vec<RecordEntry>,
}

/// One entry of the `a` array. Its relative owner `name` is ignored: only the
/// origin itself is answered for.
#[derive(Debug, Deserialize)]
struct RecordEntry {
    ttl: u32,
    value: String,
}

/// Parses the contents of a single zone file.
pub(crate) fn parse_zone(contents: &str) -> Result<Zone> {
    let file: ZoneFile = serde_json::from_str(contents)?;

    let mut zone = Zone::new(&file.origin);
    for entry in file.a {
        if let Err(e) = parse_address(&entry.value) {
            warn!("{}: {}", zone.origin(), e);
        }
        zone.add(Type::A, Record::new(entry.ttl, &entry.value));
    }
    Ok(zone)
}

/// Reads every `*.zone` file in `dir` into a [`ZoneStore`].
pub fn load_zones(dir: &Path) -> Result<ZoneStore> {
    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("Could not read zone directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    // Later files win on duplicate origins, so make "later" mean something.
    paths.sort();

    let mut zones = Vec::new();
    for path in paths {
        if path.extension().map_or(true, |ext| ext != ZONE_EXTENSION) {
            continue;
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read zone file {}", path.display()))?;
        let zone = parse_zone(&contents)
            .with_context(|| format!("Could not parse zone file {}", path.display()))?;

        if zones.iter().any(|z: &Zone| z.origin() == zone.origin()) {
            warn!(
                "{} redefines zone {}, replacing it",
                path.display(),
                zone.origin()
            );
        }
        info!("Loaded zone {} from {}", zone.origin(), path.display());
        zones.push(zone);
    }

    let store = ZoneStore::new(zones);
    if store.is_empty() {
        bail!("No zone files found in {}", dir.display());
    }
    Ok(store)
}

#[cfg(test)]
mod test {
    use super::*;
    use adns_message::Name;

    const HOWCODE: &str = r#"{
        "$origin": "howcode.org.",
        "$ttl": 3600,
        "soa": {
            "mname": "ns1.howcode.org.",
            "rname": "admin.howcode.org.",
            "serial": "{time}",
            "refresh": 3600,
            "retry": 600,
            "expire": 604800,
            "minimum": 86400
        },
        "ns": [
            { "host": "ns1.howcode.org." },
            { "host": "ns2.howcode.org." }
        ],
        "a": [
            { "name": "@", "ttl": 400, "value": "255.255.255.255" },
            { "name": "@", "ttl": 400, "value": "127.0.0.1" },
            { "name": "@", "ttl": 400, "value": "127.0.0.1" }
        ]
    }"#;

    #[test]
    fn test_parse_zone() {
        let zone = parse_zone(HOWCODE).unwrap();
        assert_eq!(zone.origin(), "howcode.org.");
        assert_eq!(
            zone.records(Type::A).unwrap(),
            &[
                Record::new(400, "255.255.255.255"),
                Record::new(400, "127.0.0.1"),
                Record::new(400, "127.0.0.1"),
            ]
        );
    }

    #[test]
    fn test_parse_zone_without_records() {
        let zone = parse_zone(r#"{ "$origin": "example.com" }"#).unwrap();
        assert_eq!(zone.origin(), "example.com.");
        assert_eq!(zone.records(Type::A), None);
    }

    #[test]
    fn test_parse_zone_errors() {
        assert!(parse_zone(r#"{ "a": [] }"#).is_err());
        assert!(parse_zone(r#"{ "$origin": "x.", "a": [{ "value": "1.1.1.1" }] }"#).is_err());
        assert!(parse_zone("not json").is_err());
    }

    #[test]
    fn test_load_zones() {
        let dir = std::env::temp_dir().join(format!("adns-zones-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("howcode.org.zone"), HOWCODE).unwrap();
        std::fs::write(
            dir.join("example.com.zone"),
            r#"{ "$origin": "example.com.", "a": [{ "ttl": 300, "value": "93.184.216.34" }] }"#,
        )
        .unwrap();
        std::fs::write(dir.join("README"), "not a zone").unwrap();

        let store = load_zones(&dir).unwrap();
        assert_eq!(store.len(), 2);
        let name: Name = "example.com".parse().unwrap();
        assert_eq!(
            store.lookup(&name, Type::A).unwrap(),
            &[Record::new(300, "93.184.216.34")]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_zones_empty() {
        let dir = std::env::temp_dir().join(format!("adns-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(load_zones(&dir).is_err());
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(load_zones(&dir).is_err());
    }
}
