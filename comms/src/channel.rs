//! The upload path from the trainers to the coordinator.

use std::{io, time::Duration};

use log::debug;
use tokio::{sync::mpsc, time};

use crate::{
    Deserialize,
    msg::{self, CandidateMessage},
};

/// A serialized candidate as it travels through the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload(Vec<u8>);

impl Upload {
    /// Decodes the candidate carried by this upload, borrowing its state from the frame.
    ///
    /// # Returns
    /// The candidate or an `InvalidData` io error if the frame is malformed.
    pub fn candidate(&self) -> io::Result<CandidateMessage<'_>> {
        CandidateMessage::deserialize(&self.0)
    }
}

impl From<Vec<u8>> for Upload {
    fn from(frame: Vec<u8>) -> Self {
        Self(frame)
    }
}

/// The outcome of a bounded wait on the channel.
#[derive(Debug, PartialEq)]
pub enum Received {
    Upload(Upload),
    Empty,
}

/// The sending end of the upload channel, one clone per trainer.
#[derive(Debug, Clone)]
pub struct Uploader {
    tx: mpsc::UnboundedSender<Upload>,
}

impl Uploader {
    /// Serializes `msg` and enqueues it without blocking.
    ///
    /// Delivery is fire-and-forget, if the receiving end is gone the frame is dropped
    /// and the caller is not told about it.
    ///
    /// # Arguments
    /// * `msg` - The candidate to upload.
    pub fn send(&self, msg: &CandidateMessage<'_>) {
        let upload = Upload(msg::encode(msg));

        if self.tx.send(upload).is_err() {
            debug!("upload dropped, the receiving end is closed");
        }
    }

    /// Enqueues an already built frame as is, letting tests inject malformed frames.
    ///
    /// # Arguments
    /// * `upload` - The frame to enqueue.
    #[cfg(feature = "test-util")]
    pub fn send_upload(&self, upload: Upload) {
        if self.tx.send(upload).is_err() {
            debug!("upload dropped, the receiving end is closed");
        }
    }
}

/// The receiving end of the upload channel, owned by the coordinator.
#[derive(Debug)]
pub struct UploadReceiver {
    rx: mpsc::UnboundedReceiver<Upload>,
}

impl UploadReceiver {
    /// Waits at most `timeout` for the next upload.
    ///
    /// Once every `Uploader` is dropped nothing else can arrive, the call then still
    /// waits the whole `timeout` before yielding `Received::Empty` so that a polling
    /// consumer never spins.
    ///
    /// # Arguments
    /// * `timeout` - The maximum amount of time to wait.
    ///
    /// # Returns
    /// The next upload, or `Received::Empty` if the timeout elapsed.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Received {
        let deadline = time::Instant::now() + timeout;

        match time::timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(upload)) => Received::Upload(upload),
            Ok(None) => {
                time::sleep_until(deadline).await;
                Received::Empty
            }
            Err(_) => Received::Empty,
        }
    }

    /// Takes an upload only if one is already queued.
    #[cfg(feature = "test-util")]
    pub fn try_recv(&mut self) -> Option<Upload> {
        self.rx.try_recv().ok()
    }
}

/// Creates both ends of an unbounded upload channel.
///
/// # Returns
/// A cloneable `Uploader` and the single `UploadReceiver`.
pub fn upload_channel() -> (Uploader, UploadReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Uploader { tx }, UploadReceiver { rx })
}
