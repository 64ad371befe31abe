use crate::name::encode_name;
use crate::{parser, Name, Result};
use std::fmt;

use tracing::{instrument, trace};

#[derive(Debug, Clone, PartialEq)]
/// The question section is used to carry the "question" in most queries, i.e.,
/// the parameters that define what is being asked.
pub struct Question {
    /// RFC1035 - a domain name represented as a sequence of labels, where each
    /// label consists of a length octet followed by that number of octets.  The
    /// domain name terminates with the zero length octet for the null label of
    /// the root.  Note that this field may be an odd number of octets; no
    /// padding is used.
    pub q_name: Name,

    /// RFC1035 - a two octet code which specifies the type of the query.
    pub q_type: Type,

    /// RFC1035 - a two octet code that specifies the [`Class`] of the query.
    pub q_class: Class,
}

impl Question {
    pub fn new(q_name: Name, q_type: Type) -> Self {
        Self {
            q_name,
            q_type,
            q_class: Class::IN,
        }
    }

    /// Parses the question that starts right after the header of `buf`,
    /// returning it with the offset of the first byte after it.
    #[instrument(skip(buf))]
    pub fn parse(buf: &[u8]) -> Result<(Question, usize)> {
        let (q_name, q_type, q_class, end) = parser::read_question(buf)?;
        let question = Question {
            q_name,
            q_type: Type::from(q_type),
            q_class: Class::from(q_class),
        };

        trace!("Read question {} ending at {}", question, end);

        Ok((question, end))
    }

    #[instrument(skip(buf))]
    pub fn to_bytes(&self, buf: &mut Vec<u8>) -> Result<usize> {
        let name = encode_name(&self.q_name)?;
        let mut byte_count = name.len();
        buf.extend(name);
        byte_count += self.q_type.to_bytes(buf);
        byte_count += self.q_class.to_bytes(buf);

        trace!("Wrote {} bytes", byte_count);

        Ok(byte_count)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}({})", self.q_name, self.q_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The record types this server answers for. Every other type code is carried
/// as [`Type::Unsupported`] so it can be echoed back.
pub enum Type {
    /// RFC1035 - (1) a host address.
    A,

    /// Any other type code (contained within).
    Unsupported(u16),
}

impl Type {
    pub(crate) fn to_bytes(self, buf: &mut Vec<u8>) -> usize {
        buf.extend_from_slice(&u16::from(self).to_be_bytes());
        2
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        match self {
            Self::A => write!(f, "A"),
            Self::Unsupported(i) => write!(f, "TYPE{}", i),
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::A
    }
}

impl From<Type> for u16 {
    fn from(t: Type) -> u16 {
        match t {
            Type::A => 1,
            Type::Unsupported(i) => i,
        }
    }
}

impl From<u16> for Type {
    fn from(val: u16) -> Self {
        match val {
            1 => Type::A,
            _ => Type::Unsupported(val),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// The class of the query - you will want [`Class::IN`] (the default) 99.99% of
/// the time.
pub enum Class {
    /// RFC1035 - 1 the Internet.
    IN,

    /// Any other class - contained within.
    Unknown(u16),
}

impl Class {
    pub(crate) fn to_bytes(self, buf: &mut Vec<u8>) -> usize {
        let val = match self {
            Class::IN => 1u16,
            Class::Unknown(i) => i,
        };
        buf.extend_from_slice(&val.to_be_bytes());
        2
    }
}

impl Default for Class {
    fn default() -> Self {
        Class::IN
    }
}

impl From<u16> for Class {
    fn from(val: u16) -> Self {
        match val {
            1 => Class::IN,
            _ => Class::Unknown(val),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::setup;
    use crate::MessageError;

    const QUERY: &[u8] = &[
        0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // header
        7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', // example
        3, b'c', b'o', b'm', // com
        0,    // root
        0, 1, // A
        0, 1, // IN
    ];

    #[test]
    fn test_parse() {
        setup();
        let (question, end) = Question::parse(QUERY).unwrap();
        assert_eq!(question.q_name.to_string(), "example.com.");
        assert_eq!(question.q_type, Type::A);
        assert_eq!(question.q_class, Class::IN);
        assert_eq!(end, QUERY.len());
    }

    #[test]
    fn test_parse_unsupported_type() {
        setup();
        let mut query = QUERY.to_vec();
        let len = query.len();
        // AAAA in the CHAOS class.
        query[len - 4..].copy_from_slice(&[0, 28, 0, 3]);

        let (question, _) = Question::parse(&query).unwrap();
        assert_eq!(question.q_type, Type::Unsupported(28));
        assert_eq!(question.q_class, Class::Unknown(3));
    }

    #[test]
    fn test_truncated() {
        setup();
        let len = QUERY.len();
        assert_eq!(
            Question::parse(&QUERY[..len - 1]),
            Err(MessageError::TruncatedQuestion(25))
        );
        assert!(matches!(
            Question::parse(&QUERY[..20]),
            Err(MessageError::MalformedName { .. })
        ));
    }

    #[test]
    fn test_to_bytes_echoes_question() {
        setup();
        let (question, end) = Question::parse(QUERY).unwrap();
        let mut buf = Vec::new();
        assert_eq!(question.to_bytes(&mut buf).unwrap(), end - 12);
        assert_eq!(&buf[..], &QUERY[12..]);
    }
}
