use crate::header::HEADER_LEN;
use crate::{Header, MessageError, Question, ResourceRecord, Result, ZoneStore};
use std::convert::TryFrom;
use std::fmt;
use tracing::{instrument, trace};

/// Offset of the question's name in every message: straight after the header.
/// All answers point back here for their owner name.
pub const QUESTION_NAME_OFFSET: usize = HEADER_LEN;

#[derive(Debug, PartialEq)]
/// An authoritative answer to a single question.
pub struct Response {
    pub header: Header,
    pub question: Question,
    pub answers: Vec<ResourceRecord>,
}

impl Response {
    /// Answers the query in `query` from `zones`.
    ///
    /// Lookup failures are returned as errors; no negative response is built
    /// here, the caller decides what the client gets to see.
    #[instrument(skip(query, zones))]
    pub fn build(query: &[u8], zones: &ZoneStore) -> Result<Response> {
        let query_header = Header::from_bytes(query)?;
        let (question, _) = Question::parse(query)?;

        let records = zones.lookup(&question.q_name, question.q_type)?;
        let an_count =
            u16::try_from(records.len()).map_err(|_| MessageError::TooManyAnswers(records.len()))?;
        let answers = records
            .iter()
            .map(|record| ResourceRecord::a(QUESTION_NAME_OFFSET, record))
            .collect::<Result<Vec<ResourceRecord>>>()?;

        let response = Response {
            header: Header::response_to(&query_header, an_count),
            question,
            answers,
        };

        trace!("Built response: {}", response);

        Ok(response)
    }

    /// Serializes the response to bytes into the provided buffer, returning the
    /// number of bytes written to the buffer.
    #[instrument(skip(buf))]
    pub fn to_bytes(&self, buf: &mut Vec<u8>) -> Result<usize> {
        let mut byte_count = self.header.to_bytes(buf);
        byte_count += self.question.to_bytes(buf)?;
        for a in self.answers.iter() {
            byte_count += a.to_bytes(buf)?;
        }

        trace!("Wrote {} bytes", byte_count);

        Ok(byte_count)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "Response(id:{}) - {} [", self.header.id, self.question)?;
        for (i, a) in self.answers.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ttl:{}", a.data, a.ttl)?;
        }
        write!(f, "]")
    }
}

/// Turns a query datagram into the bytes of its response.
pub fn respond(query: &[u8], zones: &ZoneStore) -> Result<Vec<u8>> {
    let response = Response::build(query, zones)?;
    let mut buf = Vec::with_capacity(512);
    response.to_bytes(&mut buf)?;
    Ok(buf)
}
