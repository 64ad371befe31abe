use crate::name::encode_pointer;
use crate::{Class, MessageError, Record, Result, Type};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{instrument, trace};

#[derive(Debug, Clone, PartialEq)]
/// An answer record as it goes on the wire.
///
/// Every answer this server gives is about the name in the question, so the
/// owner name is always written as a compression pointer to it.
pub struct ResourceRecord {
    /// Offset into the message of the owner name.
    pub name_offset: usize,

    /// The type and data of the resource record.
    pub data: RData,

    /// The class of the data in the `data` field.
    pub class: Class,

    /// RFC1035 - a 32 bit unsigned integer that specifies the time interval (in
    /// seconds) that the resource record may be cached before it should be
    /// discarded.  Zero values are interpreted to mean that the RR can only be
    /// used for the transaction in progress, and should not be cached.
    pub ttl: u32,
}

impl ResourceRecord {
    /// An A record owned by the name at `name_offset`, built from a configured
    /// zone record.
    #[instrument]
    pub fn a(name_offset: usize, record: &Record) -> Result<Self> {
        Ok(Self {
            name_offset,
            data: RData::A(parse_address(&record.value)?),
            class: Class::IN,
            ttl: record.ttl,
        })
    }

    #[instrument(skip(buf))]
    pub fn to_bytes(&self, buf: &mut Vec<u8>) -> Result<usize> {
        buf.extend_from_slice(&encode_pointer(self.name_offset)?);
        let mut byte_count = 2;

        byte_count += self.data.r_type().to_bytes(buf);
        byte_count += self.class.to_bytes(buf);

        buf.extend_from_slice(&self.ttl.to_be_bytes());
        byte_count += 4;

        let rdata = self.data.to_bytes();
        buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&rdata);
        byte_count += 2 + rdata.len();

        trace!("Wrote {} bytes", byte_count);

        Ok(byte_count)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The [`ResourceRecord`] data.
pub enum RData {
    /// RFC1035 - (1) a host address.
    A(Ipv4Addr),
}

impl RData {
    pub fn r_type(&self) -> Type {
        match self {
            RData::A(_) => Type::A,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            RData::A(v4) => v4.octets().to_vec(),
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        match self {
            Self::A(v4) => write!(f, "A({})", v4),
        }
    }
}

/// Parses a dotted-decimal address: exactly four decimal values, each 0-255.
pub fn parse_address(value: &str) -> Result<Ipv4Addr> {
    let invalid = || MessageError::InvalidAddressLiteral(value.to_string());

    let mut octets = [0u8; 4];
    let mut parts = value.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next().ok_or_else(invalid)?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *octet = part.parse().map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::setup;

    #[test]
    fn test_parse_address() {
        assert_eq!(
            parse_address("93.184.216.34").unwrap(),
            Ipv4Addr::new(93, 184, 216, 34)
        );
        assert_eq!(
            parse_address("0.0.0.0").unwrap(),
            Ipv4Addr::new(0, 0, 0, 0)
        );
        assert_eq!(
            parse_address("255.255.255.255").unwrap(),
            Ipv4Addr::new(255, 255, 255, 255)
        );
        assert_eq!(
            parse_address("010.1.1.1").unwrap(),
            Ipv4Addr::new(10, 1, 1, 1)
        );

        for bad in [
            "256.1.1.1",
            "1.2.3",
            "1.2.3.4.5",
            "1..3.4",
            "a.b.c.d",
            "-1.2.3.4",
            "+1.2.3.4",
            " 1.2.3.4",
            "",
            "::1",
        ]
        .iter()
        {
            assert_eq!(
                parse_address(bad),
                Err(MessageError::InvalidAddressLiteral(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_to_bytes() {
        setup();
        let rr = ResourceRecord::a(12, &Record::new(600, "155.33.17.68")).unwrap();
        assert_eq!(rr.data, RData::A(Ipv4Addr::new(155, 33, 17, 68)));
        assert_eq!(rr.class, Class::IN);

        let mut buf = Vec::new();
        assert_eq!(rr.to_bytes(&mut buf).unwrap(), 16);
        assert_eq!(
            buf,
            vec![
                0xc0, 0x0c, // name - pointer @ 12
                0x00, 0x01, // type - A
                0x00, 0x01, // class - IN
                0x00, 0x00, 0x02, 0x58, // ttl - 600
                0x00, 0x04, // rdlength - 4
                0x9b, 0x21, 0x11, 0x44, // rdata
            ]
        );
    }

    #[test]
    fn test_invalid_literal() {
        setup();
        assert_eq!(
            ResourceRecord::a(12, &Record::new(60, "300.1.1.1")),
            Err(MessageError::InvalidAddressLiteral("300.1.1.1".to_string()))
        );
    }

    #[test]
    fn test_offset_out_of_range() {
        let rr = ResourceRecord::a(16384, &Record::new(60, "1.1.1.1")).unwrap();
        let mut buf = Vec::new();
        assert_eq!(
            rr.to_bytes(&mut buf),
            Err(MessageError::OffsetOutOfRange(16384))
        );
    }
}
