use std::io;

use crate::{Deserialize, Serialize};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();
const LOSS_SIZE: usize = size_of::<f64>();
const PREFIX_SIZE: usize = 2 * HEADER_SIZE + LOSS_SIZE;

/// The kind tag of a candidate upload.
const CANDIDATE_KIND: Header = 1;

/// The layout version of the candidate envelope, bump it on every breaking change.
pub const FORMAT_VERSION: Header = 1;

/// A trainer's model proposal, sent to the coordinator before any validation took place.
///
/// The wire layout is `[kind: u32][version: u32][loss: f64][state...]`, all headers big endian.
/// The state blob is opaque to the transport and travels as the zero-copy tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMessage<'a> {
    pub state: &'a [u8],
    pub loss: f64,
}

impl<'a> CandidateMessage<'a> {
    /// Creates a new `CandidateMessage`.
    ///
    /// # Arguments
    /// * `state` - The exported state of the trainer's local model.
    /// * `loss` - The training loss the trainer observed for this state.
    ///
    /// # Returns
    /// A new `CandidateMessage` instance.
    pub fn new(state: &'a [u8], loss: f64) -> Self {
        Self { state, loss }
    }

    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {PREFIX_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind {kind}, expected {CANDIDATE_KIND}"),
        ))
    }

    fn unsupported_version<T>(version: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an unsupported envelope version {version}, expected {FORMAT_VERSION}"),
        ))
    }
}

impl<'a> Serialize<'a> for CandidateMessage<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        buf.extend_from_slice(&CANDIDATE_KIND.to_be_bytes());
        buf.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        buf.extend_from_slice(&self.loss.to_be_bytes());
        Some(self.state)
    }
}

impl<'a> Deserialize<'a> for CandidateMessage<'a> {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        if buf.len() < PREFIX_SIZE {
            return Self::buf_is_too_small(buf.len());
        }

        let (kind_buf, rest) = buf.split_at(HEADER_SIZE);
        let (version_buf, rest) = rest.split_at(HEADER_SIZE);
        let (loss_buf, state) = rest.split_at(LOSS_SIZE);

        // SAFETY: The buffer was checked to hold at least `PREFIX_SIZE` bytes,
        //         every split above has the exact size of its target.
        let kind = Header::from_be_bytes(kind_buf.try_into().unwrap());
        let version = Header::from_be_bytes(version_buf.try_into().unwrap());
        let loss = f64::from_be_bytes(loss_buf.try_into().unwrap());

        if kind != CANDIDATE_KIND {
            return Self::invalid_kind(kind);
        }

        if version != FORMAT_VERSION {
            return Self::unsupported_version(version);
        }

        Ok(Self { state, loss })
    }
}

/// Serializes `msg` into a freshly allocated frame.
///
/// # Arguments
/// * `msg` - A serializable message.
///
/// # Returns
/// The whole frame, header and tail included.
pub fn encode<'a, T: Serialize<'a>>(msg: &'a T) -> Vec<u8> {
    let mut buf = Vec::new();

    if let Some(tail) = msg.serialize(&mut buf) {
        buf.extend_from_slice(tail);
    }

    buf
}
