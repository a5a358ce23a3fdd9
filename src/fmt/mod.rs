/*!
The writer abstraction used by the layout formatter.

Formatting an [`Instant`](crate::Instant) writes through the [`Write`]
trait defined here rather than `core::fmt::Write`, so that errors carry
this crate's [`Error`] type and implementations over I/O sinks can
preserve the underlying error. `String` implements `Write` directly;
[`StdFmtWrite`] and [`StdIoWrite`] adapt the standard library's two writer
traits.
*/

use crate::error::Error;

pub use self::format::{
    ANSIC, KITCHEN, RFC1123, RFC1123Z, RFC3339, RFC3339_NANO, RFC822,
    RFC822Z, RFC850, RUBY_DATE, STAMP, STAMP_MICRO, STAMP_MILLI, STAMP_NANO,
    UNIX_DATE,
};

pub(crate) mod format;
pub(crate) mod layout;
pub(crate) mod util;

/// A trait for writing formatted output a piece at a time.
pub trait Write {
    /// Write the given string.
    fn write_str(&mut self, string: &str) -> Result<(), Error>;

    /// Write the given character.
    fn write_char(&mut self, char: char) -> Result<(), Error> {
        self.write_str(char.encode_utf8(&mut [0; 4]))
    }
}

impl Write for alloc::string::String {
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.push_str(string);
        Ok(())
    }
}

impl<W: Write + ?Sized> Write for &mut W {
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        (**self).write_str(string)
    }

    fn write_char(&mut self, char: char) -> Result<(), Error> {
        (**self).write_char(char)
    }
}

/// An adapter for using `core::fmt::Write` implementations with this
/// crate's formatting routines.
#[derive(Clone, Debug)]
pub struct StdFmtWrite<W>(pub W);

impl<W: core::fmt::Write> Write for StdFmtWrite<W> {
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.0.write_str(string).map_err(|_| {
            crate::error::err!("an error occurred when writing a string")
        })
    }
}

/// An adapter for using `std::io::Write` implementations with this
/// crate's formatting routines.
#[cfg(feature = "std")]
#[derive(Clone, Debug)]
pub struct StdIoWrite<W>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> Write for StdIoWrite<W> {
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.0.write_all(string.as_bytes()).map_err(Error::io)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn string_writer() {
        let mut dst = String::new();
        dst.write_str("hello").unwrap();
        dst.write_char(',').unwrap();
        dst.write_char(' ').unwrap();
        dst.write_str("world").unwrap();
        assert_eq!(dst, "hello, world");
    }

    #[test]
    fn io_writer() {
        let mut dst = StdIoWrite(alloc::vec::Vec::new());
        dst.write_str("bytes").unwrap();
        assert_eq!(dst.0, b"bytes");
    }
}
