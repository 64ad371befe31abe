use crate::{MessageError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{instrument, trace};

/// RFC1035 - labels are restricted to 63 octets or less.
pub const MAX_LABEL_LEN: usize = 63;

/// RFC1035 - names are restricted to 255 octets or less, including the length
/// octets and the root terminator.
pub const MAX_NAME_LEN: usize = 255;

/// Compression pointers hold a 14 bit offset.
pub const MAX_POINTER_OFFSET: usize = 0x3fff;

/// The two high bits marking a length octet as a compression pointer.
pub(crate) const POINTER_TAG: u8 = 0b1100_0000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// A domain name as its ordered sequence of labels, root label excluded.
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// The name with no labels.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Writes the fully-qualified form, e.g. `example.com.`, which is also the key
/// zones are stored under.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in self.labels.iter() {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = MessageError;

    /// Parses a dotted name, with or without the trailing dot.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Ok(Name::root());
        }
        let labels = s
            .split('.')
            .map(|label| {
                if label.is_empty() {
                    Err(MessageError::MalformedName {
                        offset: 0,
                        reason: "empty label",
                    })
                } else {
                    Ok(label.to_string())
                }
            })
            .collect::<Result<Vec<String>>>()?;
        Ok(Name { labels })
    }
}

/// Encodes the name as length-prefixed labels followed by the zero length root
/// label.
#[instrument]
pub fn encode_name(name: &Name) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(MAX_NAME_LEN);
    for label in name.labels.iter() {
        if label.is_empty() {
            return Err(MessageError::MalformedName {
                offset: buf.len(),
                reason: "empty label",
            });
        }
        if label.contains('.') {
            return Err(MessageError::MalformedName {
                offset: buf.len(),
                reason: "label contains a dot",
            });
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(MessageError::LabelTooLong(label.len(), label.clone()));
        }
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);

    if buf.len() > MAX_NAME_LEN {
        return Err(MessageError::NameTooLong(buf.len()));
    }

    trace!("Encoded {} as {} bytes", name, buf.len());

    Ok(buf)
}

/// RFC1035 4.1.4 - a pointer to a name starting `offset` bytes into the
/// message.
///
/// ```text
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     | 1  1|                OFFSET                   |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[instrument]
pub fn encode_pointer(offset: usize) -> Result<[u8; 2]> {
    if offset > MAX_POINTER_OFFSET {
        return Err(MessageError::OffsetOutOfRange(offset));
    }
    let mut pair = (offset as u16).to_be_bytes();
    pair[0] |= POINTER_TAG;
    Ok(pair)
}
