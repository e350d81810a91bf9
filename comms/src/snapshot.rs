//! The best-known model, shared between the coordinator and every trainer.

use std::sync::Arc;

use parking_lot::RwLock;

/// An accepted model together with the loss it was accepted with.
///
/// Snapshots are never mutated once published, a newer one replaces them as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    state: Vec<u8>,
    loss: f64,
    version: u64,
}

impl ModelSnapshot {
    /// The exported model state.
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    /// The loss this snapshot was published with.
    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// The position of this snapshot in the sequence of accepted models, starting at 1.
    pub fn version(&self) -> u64 {
        self.version
    }
}

type Slot = Arc<RwLock<Option<Arc<ModelSnapshot>>>>;

/// The only handle able to publish snapshots, it is not `Clone`.
#[derive(Debug)]
pub struct SnapshotWriter {
    slot: Slot,
    version: u64,
}

impl SnapshotWriter {
    /// Replaces the shared snapshot with a new one.
    ///
    /// The version is assigned here, one past the previously published snapshot or 1
    /// for the first one.
    ///
    /// # Arguments
    /// * `state` - The exported model state.
    /// * `loss` - The loss to publish alongside the state.
    ///
    /// # Returns
    /// The version assigned to the new snapshot.
    pub fn publish(&mut self, state: Vec<u8>, loss: f64) -> u64 {
        let version = self.version + 1;
        let snapshot = Arc::new(ModelSnapshot {
            state,
            loss,
            version,
        });

        *self.slot.write() = Some(snapshot);
        self.version = version;
        version
    }

    /// The version of the last published snapshot, 0 if none was published yet.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Creates a new read handle over this cell.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// A read-only handle to the shared snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    slot: Slot,
}

impl SnapshotReader {
    /// Returns the current snapshot without waiting on the writer for longer than a pointer swap.
    ///
    /// # Returns
    /// The latest published snapshot or `None` if nothing was published yet.
    pub fn get(&self) -> Option<Arc<ModelSnapshot>> {
        self.slot.read().clone()
    }
}

/// Creates an empty snapshot cell.
///
/// # Returns
/// The single writer and a cloneable reader.
pub fn snapshot_cell() -> (SnapshotWriter, SnapshotReader) {
    let slot = Arc::new(RwLock::new(None));
    let writer = SnapshotWriter { slot, version: 0 };
    let reader = writer.reader();
    (writer, reader)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn starts_empty() {
        let (writer, reader) = snapshot_cell();
        assert!(reader.get().is_none());
        assert_eq!(writer.version(), 0);
    }

    #[test]
    fn versions_grow_by_one_from_one() {
        let (mut writer, reader) = snapshot_cell();

        for expected in 1..=4 {
            let version = writer.publish(vec![expected as u8], 1.0 / expected as f64);
            assert_eq!(version, expected);

            let snapshot = reader.get().unwrap();
            assert_eq!(snapshot.version(), expected);
            assert_eq!(snapshot.state(), [expected as u8]);
        }
    }

    #[test]
    fn held_snapshot_survives_replacement() {
        let (mut writer, reader) = snapshot_cell();
        writer.publish(vec![1, 1], 0.5);

        let old = reader.get().unwrap();
        writer.publish(vec![2, 2], 0.4);

        assert_eq!(old.state(), [1, 1]);
        assert_eq!(old.loss(), 0.5);
        assert_eq!(reader.get().unwrap().version(), 2);
    }

    #[test]
    fn readers_never_see_torn_snapshots() {
        const WRITES: u64 = 500;

        let (mut writer, reader) = snapshot_cell();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = reader.clone();
                thread::spawn(move || {
                    let mut last = 0;
                    while last < WRITES {
                        let Some(snapshot) = reader.get() else {
                            continue;
                        };

                        let version = snapshot.version();
                        assert!(version >= last);
                        assert!(snapshot.state().iter().all(|&b| b == version as u8));
                        assert_eq!(snapshot.loss(), version as f64);
                        last = version;
                    }
                })
            })
            .collect();

        for version in 1..=WRITES {
            writer.publish(vec![version as u8; 64], version as f64);
        }

        for handle in readers {
            handle.join().unwrap();
        }
    }
}
