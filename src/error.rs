use alloc::sync::Arc;

/// An error that can occur in this crate.
///
/// Errors here come from a small number of places:
///
/// * Parsing TZif formatted time zone data that is corrupt or truncated.
/// * Failing to find a time zone by name in the zoneinfo search path.
/// * Failing to find a zone abbreviation inside a
///   [`Location`](crate::tz::Location).
/// * An I/O error while reading time zone data from disk.
///
/// Operations on instants and durations never fail. Arithmetic that cannot
/// be represented saturates or wraps explicitly; it does not produce an
/// error.
///
/// # Design
///
/// This crate uses one error type for everything. Errors are cheap to clone
/// (the representation is a refcounted pointer) and they form a chain: an
/// error may carry a lower level cause, and `Display` renders the whole
/// chain from the most recent context down to the root. Introspection is
/// limited to the `Error::is_*` predicates below.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// The `Arc` makes clones cheap, makes the size of `Error` one word and
    /// lets us embed a `std::io::Error` (which is not cloneable) when the
    /// `std` feature is enabled.
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    MalformedZoneFile(crate::tz::tzif::TzifError),
    ZoneFileNotFound(ZoneFileNotFoundError),
    ZoneNotFound(ZoneNotFoundError),
    #[cfg(feature = "std")]
    Io(IoError),
    #[cfg(feature = "std")]
    FilePath(FilePathError),
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// It is expected to use [`format_args!`](format_args) from Rust's
    /// standard library (available in `core`) to create a
    /// `core::fmt::Arguments`.
    ///
    /// Callers should generally use their own error types. But in some
    /// circumstances, it can be convenient to manufacture an error value
    /// from this crate specifically.
    pub fn from_args<'a>(message: core::fmt::Arguments<'a>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Returns true when this error originated from parsing TZif data that
    /// was malformed in some way.
    ///
    /// This covers a magic byte mismatch, an unsupported version, a
    /// truncated file and any out-of-range index inside the data.
    pub fn is_malformed_zone_file(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::MalformedZoneFile(_))
    }

    /// Returns true when this error originated from a time zone name that
    /// could not be found in any zoneinfo directory.
    ///
    /// Note that the default zone flow (driven by the `TZ` environment
    /// variable) recovers from this error by falling back to UTC. Only
    /// direct lookups by name surface it.
    pub fn is_zone_file_not_found(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::ZoneFileNotFound(_))
    }

    /// Returns true when this error originated from a zone abbreviation
    /// that does not exist in the [`Location`](crate::tz::Location) it was
    /// looked up in.
    pub fn is_zone_not_found(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::ZoneNotFound(_))
    }
}

impl Error {
    /// Creates a new error from the internal TZif parser error type.
    ///
    /// This is the only place parser errors cross into the public API. All
    /// of them are "malformed zone file" errors out here.
    pub(crate) fn malformed_zone_file(
        err: crate::tz::tzif::TzifError,
    ) -> Error {
        Error::from(ErrorKind::MalformedZoneFile(err))
    }

    /// Creates a new error indicating that the time zone with the name
    /// given could not be found in any search directory.
    #[inline(never)]
    #[cold]
    pub(crate) fn zone_file_not_found(name: &str) -> Error {
        Error::from(ErrorKind::ZoneFileNotFound(ZoneFileNotFoundError {
            name: name.into(),
        }))
    }

    /// Creates a new error indicating that no zone with the abbreviation
    /// given exists in the location it was looked up in.
    #[inline(never)]
    #[cold]
    pub(crate) fn zone_not_found(abbreviation: &str) -> Error {
        Error::from(ErrorKind::ZoneNotFound(ZoneNotFoundError {
            abbreviation: abbreviation.into(),
        }))
    }

    /// A convenience constructor for building an I/O error.
    ///
    /// In general, callers should attach some kind of context to this error
    /// (like a file path).
    #[cfg(feature = "std")]
    #[inline(never)]
    #[cold]
    pub(crate) fn io(err: std::io::Error) -> Error {
        Error::from(ErrorKind::Io(IoError { err }))
    }

    /// Contextualizes this error by associating the given file path with
    /// it.
    #[cfg(feature = "std")]
    #[inline(never)]
    #[cold]
    pub(crate) fn path(self, path: impl Into<std::path::PathBuf>) -> Error {
        let err = Error::from(ErrorKind::FilePath(FilePathError {
            path: path.into(),
        }));
        self.context(err)
    }

    /// Attaches the error given as context to this error, such that the
    /// error given becomes the outermost error and `self` its cause.
    pub(crate) fn context(self, consequent: Error) -> Error {
        let mut err = consequent;
        let inner = Arc::get_mut(&mut err.inner)
            .expect("context must be a freshly created error");
        assert!(inner.cause.is_none(), "cause of consequent must be `None`");
        inner.cause = Some(self);
        err
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        // OK because `Error::chain` always yields at least one error.
        self.chain().last().unwrap()
    }

    /// Returns a chain of error values.
    ///
    /// This starts with the most recent error added to the chain, i.e., the
    /// highest level context. The last error in the chain is always the
    /// root cause. The iterator yields at least one error.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Arc::new(ErrorInner { kind, cause: None }) }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            Adhoc(ref err) => err.fmt(f),
            MalformedZoneFile(ref err) => {
                f.write_str("malformed zone file: ")?;
                err.fmt(f)
            }
            ZoneFileNotFound(ref err) => err.fmt(f),
            ZoneNotFound(ref err) => err.fmt(f),
            #[cfg(feature = "std")]
            Io(ref err) => err.fmt(f),
            #[cfg(feature = "std")]
            FilePath(ref err) => err.fmt(f),
        }
    }
}

/// A generic error message.
struct AdhocError {
    message: alloc::boxed::Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        use alloc::string::ToString;

        let message = message.to_string().into_boxed_str();
        AdhocError { message }
    }
}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// An error indicating a time zone name missing from the search path.
#[derive(Debug)]
struct ZoneFileNotFoundError {
    name: alloc::boxed::Box<str>,
}

impl core::fmt::Display for ZoneFileNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to find time zone `{name}` in any zoneinfo directory",
            name = self.name,
        )
    }
}

/// An error indicating a zone abbreviation missing from a `Location`.
#[derive(Debug)]
struct ZoneNotFoundError {
    abbreviation: alloc::boxed::Box<str>,
}

impl core::fmt::Display for ZoneNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "no zone with abbreviation `{abbrev}` exists in this location",
            abbrev = self.abbreviation,
        )
    }
}

/// A wrapper around `std::io::Error`.
#[cfg(feature = "std")]
#[derive(Debug)]
struct IoError {
    err: std::io::Error,
}

#[cfg(feature = "std")]
impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.err, f)
    }
}

/// A wrapper around a file path, used as error chain context.
#[cfg(feature = "std")]
#[derive(Debug)]
struct FilePathError {
    path: std::path::PathBuf,
}

#[cfg(feature = "std")]
impl core::fmt::Display for FilePathError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A convenience macro for constructing an ad hoc `Error` from a format
/// string.
macro_rules! err {
    ($($tt:tt)*) => {{
        crate::error::Error::from_args(format_args!($($tt)*))
    }}
}

pub(crate) use err;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn adhoc_message() {
        let err = err!("something failed: {}", 42);
        assert_eq!(err.to_string(), "something failed: 42");
    }

    #[test]
    fn context_chain_renders_outside_in() {
        let root = err!("root cause");
        let err = root.context(err!("higher level context"));
        assert_eq!(err.to_string(), "higher level context: root cause");
    }

    #[test]
    fn predicates_see_through_context() {
        let err = Error::zone_file_not_found("Antarctica/Troll")
            .context(err!("while picking a default time zone"));
        assert!(err.is_zone_file_not_found());
        assert!(!err.is_zone_not_found());
        assert!(!err.is_malformed_zone_file());
    }

    #[test]
    fn zone_not_found_message() {
        let err = Error::zone_not_found("XYZT");
        assert_eq!(
            err.to_string(),
            "no zone with abbreviation `XYZT` exists in this location",
        );
    }
}
