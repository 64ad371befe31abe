use crate::{parser, Result};
use std::fmt;
use tracing::{instrument, trace};

/// Size of the fixed header in bytes; the question section starts right after.
pub const HEADER_LEN: usize = 12;

// Bit positions within the 16 bit flags word, most significant bit first.
const QR_BIT: u16 = 1 << 15;
const OPCODE_SHIFT: u16 = 11;
const OPCODE_MASK: u16 = 0xf;
const AA_BIT: u16 = 1 << 10;
const TC_BIT: u16 = 1 << 9;
const RD_BIT: u16 = 1 << 8;
const RA_BIT: u16 = 1 << 7;
const Z_SHIFT: u16 = 4;
const Z_MASK: u16 = 0x7;
const RCODE_MASK: u16 = 0xf;

#[derive(Debug, Clone, Default, PartialEq)]
/// The DNS Message Header as per RFC1035.
pub struct Header {
    /// RFC1035 - A 16 bit identifier assigned by the program that generates any
    /// kind of query. This identifier is copied the corresponding reply and
    /// can be used by the requester to match up replies to outstanding queries.
    pub id: u16,

    /// RFC1035 - A one bit field that specifies whether this message is a query
    /// (0), or a response (1).
    pub qr: bool,

    /// RFC1035 -  A four bit field that specifies kind of query in this
    /// message.  This value is set by the originator of a query and copied into
    /// the response.
    pub opcode: OpCode,

    /// RFC1035 - Authoritative Answer - this bit is valid in responses, and
    /// specifies that the responding name server is an authority for the domain
    /// name in question section.
    pub aa: bool,

    /// RFC1035 - TrunCation - specifies that this message was truncated due to
    /// length greater than that permitted on the transmission channel.
    pub tc: bool,

    /// RFC1035 - Recursion Desired - this bit may be set in a query and is
    /// copied into the response. If RD is set, it directs the name server to
    /// pursue the query recursively.
    pub rd: bool,

    /// RFC1035 - Recursion Available - this be is set or cleared in a response,
    /// and denotes whether recursive query support is available in the name
    /// server.
    pub ra: bool,

    /// RFC1035 - Reserved for future use, three bits wide.
    pub z: u8,

    /// RFC1035 - Response code - this 4 bit field is set as part of responses.
    pub rcode: RCode,

    /// Number of entries in the question section.
    pub qd_count: u16,

    /// Number of resource records in the answer section.
    pub an_count: u16,

    /// Number of name server resource records in the authority section.
    pub ns_count: u16,

    /// Number of resource records in the additional records section.
    pub ar_count: u16,
}

impl Header {
    /// Decodes the first 12 bytes of `buf`.
    #[instrument(skip(buf))]
    pub fn from_bytes(buf: &[u8]) -> Result<Header> {
        let header = parser::read_header(buf)?;
        trace!("Read header: {}", header);
        Ok(header)
    }

    /// Writes the header verbatim, returning the number of bytes written.
    #[instrument(skip(buf))]
    pub fn to_bytes(&self, buf: &mut Vec<u8>) -> usize {
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags().to_be_bytes());
        buf.extend_from_slice(&self.qd_count.to_be_bytes());
        buf.extend_from_slice(&self.an_count.to_be_bytes());
        buf.extend_from_slice(&self.ns_count.to_be_bytes());
        buf.extend_from_slice(&self.ar_count.to_be_bytes());

        trace!("Wrote {} bytes", HEADER_LEN);

        HEADER_LEN
    }

    /// The header of an authoritative answer to `query` carrying `an_count`
    /// answers.
    ///
    /// The id and opcode are copied from the query; every other flag is fixed.
    /// Non-standard opcodes are answered the same way as standard queries.
    pub fn response_to(query: &Header, an_count: u16) -> Header {
        Header {
            id: query.id,
            qr: true,
            opcode: query.opcode,
            aa: true,
            tc: false,
            rd: false,
            ra: false,
            z: 0,
            rcode: RCode::NoError,
            qd_count: 1,
            an_count,
            ns_count: 0,
            ar_count: 0,
        }
    }

    /// Packs the flag fields into their wire word.
    pub(crate) fn flags(&self) -> u16 {
        let mut flags = 0u16;
        if self.qr {
            flags |= QR_BIT;
        }
        flags |= (u16::from(u8::from(self.opcode)) & OPCODE_MASK) << OPCODE_SHIFT;
        if self.aa {
            flags |= AA_BIT;
        }
        if self.tc {
            flags |= TC_BIT;
        }
        if self.rd {
            flags |= RD_BIT;
        }
        if self.ra {
            flags |= RA_BIT;
        }
        flags |= (u16::from(self.z) & Z_MASK) << Z_SHIFT;
        flags |= u16::from(u8::from(self.rcode)) & RCODE_MASK;
        flags
    }

    /// Unpacks a wire flags word into the header's flag fields.
    pub(crate) fn set_flags(&mut self, flags: u16) {
        self.qr = flags & QR_BIT != 0;
        self.opcode = OpCode::from(((flags >> OPCODE_SHIFT) & OPCODE_MASK) as u8);
        self.aa = flags & AA_BIT != 0;
        self.tc = flags & TC_BIT != 0;
        self.rd = flags & RD_BIT != 0;
        self.ra = flags & RA_BIT != 0;
        self.z = ((flags >> Z_SHIFT) & Z_MASK) as u8;
        self.rcode = RCode::from((flags & RCODE_MASK) as u8);
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(
            f,
            "id:{} {} opcode:{} rcode:{} qd:{} an:{} ns:{} ar:{}",
            self.id,
            if self.qr { "response" } else { "query" },
            u8::from(self.opcode),
            u8::from(self.rcode),
            self.qd_count,
            self.an_count,
            self.ns_count,
            self.ar_count
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A four bit field that specifies kind of query in this message.  This value
/// is set by the originator of a query and copied into the response.
pub enum OpCode {
    /// A standard query.
    Query,

    /// An inverse query.
    IQuery,

    /// A server status request.
    Status,

    /// Any other four bit value (contained within).
    Unknown(u8),
}

impl Default for OpCode {
    fn default() -> Self {
        OpCode::Query
    }
}

impl From<u8> for OpCode {
    fn from(val: u8) -> Self {
        match val {
            0 => OpCode::Query,
            1 => OpCode::IQuery,
            2 => OpCode::Status,
            n => OpCode::Unknown(n),
        }
    }
}

impl From<OpCode> for u8 {
    fn from(opcode: OpCode) -> u8 {
        match opcode {
            OpCode::Query => 0,
            OpCode::IQuery => 1,
            OpCode::Status => 2,
            OpCode::Unknown(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Response code - this 4 bit field is set as part of responses.
pub enum RCode {
    /// No error condition.
    NoError,

    /// Format error - The name server was unable to interpret the query.
    FormatError,

    /// Server failure - The name server was unable to process this query due to
    /// a problem with the name server.
    ServerFailure,

    /// Name Error - Meaningful only for responses from an authoritative name
    /// server, this code signifies that the domain name referenced in the query
    /// does not exist.
    NameError,

    /// Not Implemented - The name server does not support the requested kind of
    /// query.
    NotImplemented,

    /// Refused - The name server refuses to perform the specified operation for
    /// policy reasons.
    Refused,

    /// The response code was unknown (contained within).
    Unknown(u8),
}

impl Default for RCode {
    fn default() -> Self {
        RCode::NoError
    }
}

impl From<u8> for RCode {
    fn from(val: u8) -> Self {
        match val {
            0 => RCode::NoError,
            1 => RCode::FormatError,
            2 => RCode::ServerFailure,
            3 => RCode::NameError,
            4 => RCode::NotImplemented,
            5 => RCode::Refused,
            n => RCode::Unknown(n),
        }
    }
}

impl From<RCode> for u8 {
    fn from(rcode: RCode) -> u8 {
        match rcode {
            RCode::NoError => 0,
            RCode::FormatError => 1,
            RCode::ServerFailure => 2,
            RCode::NameError => 3,
            RCode::NotImplemented => 4,
            RCode::Refused => 5,
            RCode::Unknown(n) => n,
        }
    }
}
