/// Writes a message into a byte buffer.
///
/// Implementors push their fixed-size header into `buf` and may hand back a borrowed
/// tail that the caller appends as is, saving a copy of large payloads.
pub trait Serialize<'a> {
    /// Serializes `self` into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffer where the header bytes are written.
    ///
    /// # Returns
    /// An optional zero-copy tail that follows the bytes written into `buf`.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}
