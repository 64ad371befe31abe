use crate::error::MessageError;
use crate::header::HEADER_LEN;
use crate::name::{MAX_NAME_LEN, POINTER_TAG};
use crate::{Header, Name, Result};
use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use tracing::{instrument, trace};

/// Helper for pulling out either a label, or the offset of the rest of the
/// name when using compression.
#[derive(Debug)]
enum LabelRecord<'a> {
    Label(&'a [u8]),
    Pointer(u16),
}

#[instrument(skip(input))]
fn read_label_record(input: &[u8]) -> IResult<&[u8], LabelRecord> {
    let (i, len) = be_u8(input)?;
    match len & POINTER_TAG {
        POINTER_TAG => {
            let (i, low) = be_u8(i)?;
            let offset = u16::from_be_bytes([len & !POINTER_TAG, low]);
            trace!("Name pointer at offset: {}", offset);
            Ok((i, LabelRecord::Pointer(offset)))
        }
        0 => {
            trace!("Label of length {} found", len);
            let (i, label) = take(len)(i)?;
            Ok((i, LabelRecord::Label(label)))
        }
        // 0b01 and 0b10 are reserved.
        _ => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

/// Decodes the name starting at `start`, returning it along with the offset of
/// the first byte after it.
///
/// Compression pointers are followed. Every pointer has to point before the
/// labels it was reached from, so a name can only refer to names earlier in
/// the message and decoding always terminates.
#[instrument(skip(buf))]
pub fn decode_name(buf: &[u8], start: usize) -> Result<(Name, usize)> {
    let malformed = |offset, reason| MessageError::MalformedName { offset, reason };

    let mut labels = Vec::new();
    let mut pos = start;
    // Pointer targets must be below this.
    let mut limit = start;
    let mut end = None;
    let mut wire_len = 0;

    loop {
        let input = buf
            .get(pos..)
            .ok_or_else(|| malformed(pos, "offset past end of buffer"))?;

        let (_, record) = read_label_record(input).map_err(|e| match e {
            nom::Err::Failure(_) => malformed(pos, "reserved label type"),
            _ => malformed(pos, "name runs past end of buffer"),
        })?;

        match record {
            LabelRecord::Pointer(offset) => {
                let offset = offset as usize;
                if offset >= limit {
                    return Err(malformed(pos, "pointer does not refer to an earlier name"));
                }
                if end.is_none() {
                    end = Some(pos + 2);
                }
                pos = offset;
                limit = offset;
            }
            LabelRecord::Label(label) => {
                wire_len += 1 + label.len();
                if wire_len > MAX_NAME_LEN {
                    return Err(malformed(pos, "name exceeds 255 bytes"));
                }
                if label.is_empty() {
                    let end = end.unwrap_or(pos + 1);
                    let name = Name::new(labels);
                    trace!("Read name {} ending at {}", name, end);
                    return Ok((name, end));
                }
                if !label.is_ascii() {
                    return Err(malformed(pos, "label is not ASCII"));
                }
                if label.contains(&b'.') {
                    return Err(malformed(pos, "label contains a dot"));
                }
                // ASCII is always valid UTF-8.
                labels.push(String::from_utf8_lossy(label).into_owned());
                pos += 1 + label.len();
            }
        }
    }
}

#[instrument(skip(input))]
fn read_header_fields(input: &[u8]) -> IResult<&[u8], (u16, u16, u16, u16, u16, u16)> {
    tuple((be_u16, be_u16, be_u16, be_u16, be_u16, be_u16))(input)
}

#[instrument(skip(buf))]
pub(crate) fn read_header(buf: &[u8]) -> Result<Header> {
    trace!("reading header");
    let (_, (id, flags, qd_count, an_count, ns_count, ar_count)) =
        read_header_fields(buf).map_err(|_| MessageError::TruncatedHeader(buf.len()))?;

    let mut header = Header {
        id,
        qd_count,
        an_count,
        ns_count,
        ar_count,
        ..Default::default()
    };
    header.set_flags(flags);
    Ok(header)
}

/// Reads the name, type code and class code of the question at the start of
/// the question section, along with the offset just past it.
#[instrument(skip(buf))]
pub(crate) fn read_question(buf: &[u8]) -> Result<(Name, u16, u16, usize)> {
    trace!("reading question");
    if buf.len() < HEADER_LEN {
        return Err(MessageError::TruncatedQuestion(buf.len()));
    }

    let (name, offset) = decode_name(buf, HEADER_LEN)?;

    let (_, (q_type, q_class)) = tuple((be_u16, be_u16))(&buf[offset..])
        .map_err(|_: nom::Err<nom::error::Error<&[u8]>>| MessageError::TruncatedQuestion(offset))?;

    Ok((name, q_type, q_class, offset + 4))
}
