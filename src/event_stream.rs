//! Decoder for the `application/vnd.amazon.eventstream` framing used
//! by streamed responses.
//!
//! Frame layout (all integers big-endian):
//!
//! ```text
//! total_len:u32 | headers_len:u32 | prelude_crc:u32 | headers | payload | message_crc:u32
//! ```

use log::{error, trace};

use crate::error::Error;

const PRELUDE_LEN: usize = 12;
const CRC_LEN: usize = 4;
const MIN_MESSAGE_LEN: usize = PRELUDE_LEN + CRC_LEN;
const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

/// Typed header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue
{   Bool(bool)
  , Byte(i8)
  , Short(i16)
  , Int(i32)
  , Long(i64)
  , Bytes(Vec<u8>)
  , String(String)
  , Timestamp(i64)
  , Uuid([u8; 16])
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message
{   pub headers: Vec<(String, HeaderValue)>
  , pub payload: Vec<u8>
}

impl Message
{   pub fn header(&self, name: &str) -> Option<&HeaderValue>
    {   self.headers
          .iter()
          .find(|(n, _)| n == name)
          .map(|(_, v)| v)
    }

    pub fn header_str(&self, name: &str) -> Option<&str>
    {   match self.header(name)
        {   Some(HeaderValue::String(s)) => Some(s.as_str())
          , _ => None
        }
    }
}

/// Incremental frame decoder fed with arbitrary byte chunks
#[derive(Debug, Default)]
pub struct EventStreamDecoder
{   buffer: Vec<u8>
}

impl EventStreamDecoder
{   pub fn new() -> Self
    {   EventStreamDecoder::default()
    }

    pub fn push(&mut self, bytes: &[u8])
    {   self.buffer.extend_from_slice(bytes);
    }

    /// Bytes of an incomplete frame are still buffered
    pub fn has_partial(&self) -> bool
    {   !self.buffer.is_empty()
    }

    /// Next complete frame, or `None` until more bytes arrive
    pub fn next_message(&mut self) -> Result<Option<Message>, Error>
    {   if self.buffer.len() < PRELUDE_LEN
        {   return Ok(None);
        }
        let total_len = read_u32(&self.buffer[0..4]) as usize;
        let headers_len = read_u32(&self.buffer[4..8]) as usize;
        let prelude_crc = read_u32(&self.buffer[8..12]);

        if crc32(&self.buffer[0..8]) != prelude_crc
        {   return Err(framing("prelude checksum mismatch"));
        }
        if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&total_len)
          || headers_len > total_len - MIN_MESSAGE_LEN
        {   return Err(framing(&format!(
              "invalid lengths total={} headers={}",
              total_len, headers_len
            )));
        }
        if self.buffer.len() < total_len
        {   return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..total_len).collect();
        let body_end = total_len - CRC_LEN;
        let message_crc = read_u32(&frame[body_end..]);
        if crc32(&frame[..body_end]) != message_crc
        {   return Err(framing("message checksum mismatch"));
        }

        let headers_end = PRELUDE_LEN + headers_len;
        let headers = parse_headers(&frame[PRELUDE_LEN..headers_end])?;
        let payload = frame[headers_end..body_end].to_vec();
        trace!(
          "Event frame: {} headers, {} payload bytes",
          headers.len(), payload.len()
        );
        Ok(Some(Message { headers, payload }))
    }
}

/// Encode a frame with string headers
pub fn encode_message(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8>
{   let mut header_bytes = Vec::new();
    for (name, value) in headers
    {   header_bytes.push(name.len() as u8);
        header_bytes.extend_from_slice(name.as_bytes());
        header_bytes.push(7);
        header_bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        header_bytes.extend_from_slice(value.as_bytes());
    }
    let total_len = MIN_MESSAGE_LEN + header_bytes.len() + payload.len();

    let mut frame = Vec::with_capacity(total_len);
    frame.extend_from_slice(&(total_len as u32).to_be_bytes());
    frame.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
    let prelude_crc = crc32(&frame);
    frame.extend_from_slice(&prelude_crc.to_be_bytes());
    frame.extend_from_slice(&header_bytes);
    frame.extend_from_slice(payload);
    let message_crc = crc32(&frame);
    frame.extend_from_slice(&message_crc.to_be_bytes());
    frame
}

/// CRC-32 (IEEE 802.3), as used by both frame checksums
pub fn crc32(bytes: &[u8]) -> u32
{   let mut crc = 0xFFFF_FFFFu32;
    for byte in bytes
    {   crc ^= *byte as u32;
        for _ in 0..8
        {   let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

fn parse_headers(mut bytes: &[u8]) -> Result<Vec<(String, HeaderValue)>, Error>
{   let mut headers = Vec::new();
    while !bytes.is_empty()
    {   let name_len = take(&mut bytes, 1)?[0] as usize;
        let name = utf8(take(&mut bytes, name_len)?)?;
        let kind = take(&mut bytes, 1)?[0];
        let value = match kind
        {   0 => HeaderValue::Bool(true)
          , 1 => HeaderValue::Bool(false)
          , 2 => HeaderValue::Byte(take(&mut bytes, 1)?[0] as i8)
          , 3 => HeaderValue::Short(read_u16(take(&mut bytes, 2)?) as i16)
          , 4 => HeaderValue::Int(read_u32(take(&mut bytes, 4)?) as i32)
          , 5 => HeaderValue::Long(read_u64(take(&mut bytes, 8)?) as i64)
          , 6 => {
              let len = read_u16(take(&mut bytes, 2)?) as usize;
              HeaderValue::Bytes(take(&mut bytes, len)?.to_vec())
            }
          , 7 => {
              let len = read_u16(take(&mut bytes, 2)?) as usize;
              HeaderValue::String(utf8(take(&mut bytes, len)?)?)
            }
          , 8 => HeaderValue::Timestamp(read_u64(take(&mut bytes, 8)?) as i64)
          , 9 => {
              let mut uuid = [0u8; 16];
              uuid.copy_from_slice(take(&mut bytes, 16)?);
              HeaderValue::Uuid(uuid)
            }
          , other => {
              return Err(framing(&format!("unknown header type {}", other)));
            }
        };
        headers.push((name, value));
    }
    Ok(headers)
}

fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Result<&'a [u8], Error>
{   if bytes.len() < n
    {   return Err(framing("truncated header"));
    }
    let (head, tail) = bytes.split_at(n);
    *bytes = tail;
    Ok(head)
}

fn utf8(bytes: &[u8]) -> Result<String, Error>
{   String::from_utf8(bytes.to_vec())
      .map_err(|_| framing("header is not valid utf-8"))
}

fn read_u16(b: &[u8]) -> u16
{   u16::from_be_bytes([b[0], b[1]])
}

fn read_u32(b: &[u8]) -> u32
{   u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn read_u64(b: &[u8]) -> u64
{   u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

fn framing(reason: &str) -> Error
{   error!("Event stream framing error: {}", reason);
    Error::Transport(format!("event stream: {}", reason))
}
