mod channel;
mod deserialize;
pub mod metrics;
pub mod msg;
mod serialize;
mod snapshot;

pub use channel::{Received, Upload, UploadReceiver, Uploader, upload_channel};
pub use deserialize::Deserialize;
pub use serialize::Serialize;
pub use snapshot::{ModelSnapshot, SnapshotReader, SnapshotWriter, snapshot_cell};
