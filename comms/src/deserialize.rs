use std::io;

/// Reads a message out of a byte buffer, borrowing from it where possible.
pub trait Deserialize<'a>: Sized {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self>;
}
