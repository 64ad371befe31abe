//! The binary message layer of an authoritative DNS server that answers A
//! record queries from static zone data.
//!
//! A query datagram goes in, [`respond`] decodes its header and question, looks
//! the name up in a [`ZoneStore`] and hands back the response datagram.

mod error;
mod header;
mod message;
mod name;
mod parser;
mod question;
mod resource_record;
mod zone;

pub use error::MessageError;
pub use header::{Header, OpCode, RCode, HEADER_LEN};
pub use message::{respond, Response, QUESTION_NAME_OFFSET};
pub use name::{
    encode_name, encode_pointer, Name, MAX_LABEL_LEN, MAX_NAME_LEN, MAX_POINTER_OFFSET,
};
pub use parser::decode_name;
pub use question::{Class, Question, Type};
pub use resource_record::{parse_address, RData, ResourceRecord};
pub use zone::{Record, Zone, ZoneStore};

pub type Result<T> = std::result::Result<T, MessageError>;
