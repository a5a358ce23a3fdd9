/*!
Locating and loading time zone data from the host system.

A [`ZoneSource`] abstracts "give me the bytes for this path" plus an
ordered list of directories to try, so that everything above it (search
order, the `TZ` environment variable convention, the UTC fallback) is
plain logic that can be tested without a filesystem. [`FsZoneSource`]
is the implementation backed by the real zoneinfo database.
*/

use std::{
    env,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use alloc::vec::Vec;

use crate::{
    error::{err, Error},
    tz::{location::Location, tzif},
};

/// The directories tried, in order, when resolving a zone name.
const ZONEINFO_DIRECTORIES: &[&str] = &[
    "/usr/share/zoneinfo",
    "/usr/share/lib/zoneinfo",
    "/usr/lib/locale/TZ",
];

/// Where the system's local time zone file lives.
const LOCALTIME_PATH: &str = "/etc/localtime";

/// Refuse to read zone files bigger than this. Real TZif files are a few
/// kilobytes.
const MAX_FILE_SIZE: u64 = 10 * (1 << 20);

/// The result of asking a [`ZoneSource`] for a file.
///
/// `NotFound` is distinct from `Io` so that the loader can fall through to
/// the next search directory when a file simply is not there, while still
/// surfacing a file that exists but cannot be read.
#[derive(Debug)]
pub enum SourceError {
    /// The path does not exist in this source.
    NotFound,
    /// The path exists but reading it failed.
    Io(io::Error),
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            SourceError::NotFound => f.write_str("file not found"),
            SourceError::Io(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SourceError {}

/// A provider of time zone data bytes.
///
/// Implementations return file contents on success and signal "not found"
/// distinctly from an I/O error. The crate ships [`FsZoneSource`]; tests
/// and unusual deployments (bundled tzdata, say) can provide their own.
pub trait ZoneSource {
    /// The directories to search for zone names, in order of preference.
    fn search_dirs(&self) -> &[PathBuf];

    /// Reads the contents of the file at the path given.
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError>;
}

/// A [`ZoneSource`] reading from the host filesystem.
#[derive(Clone, Debug)]
pub struct FsZoneSource {
    dirs: Vec<PathBuf>,
}

impl FsZoneSource {
    /// Returns a source searching the conventional zoneinfo directories:
    /// `/usr/share/zoneinfo`, `/usr/share/lib/zoneinfo` and
    /// `/usr/lib/locale/TZ`.
    pub fn system() -> FsZoneSource {
        FsZoneSource {
            dirs: ZONEINFO_DIRECTORIES.iter().map(PathBuf::from).collect(),
        }
    }

    /// Returns a source searching only the directories given, in order.
    pub fn with_dirs<I>(dirs: I) -> FsZoneSource
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        FsZoneSource { dirs: dirs.into_iter().map(Into::into).collect() }
    }
}

impl Default for FsZoneSource {
    fn default() -> FsZoneSource {
        FsZoneSource::system()
    }
}

impl ZoneSource for FsZoneSource {
    fn search_dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        read_capped(path, MAX_FILE_SIZE)
    }
}

fn read_capped(path: &Path, cap: u64) -> Result<Vec<u8>, SourceError> {
    let file = File::open(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound
        } else {
            SourceError::Io(err)
        }
    })?;
    let len = file.metadata().map_err(SourceError::Io)?.len();
    if len > cap {
        return Err(SourceError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            alloc::format!(
                "file is {len} bytes, bigger than the {cap} byte cap"
            ),
        )));
    }
    let mut data = Vec::with_capacity(len as usize);
    file.take(cap)
        .read_to_end(&mut data)
        .map_err(SourceError::Io)?;
    Ok(data)
}

/// Loads the location with the IANA name given (e.g. `"US/Pacific"`) from
/// the system zoneinfo database.
///
/// The names `""` and `"UTC"` resolve to the UTC location without touching
/// the filesystem.
///
/// # Errors
///
/// Returns a [`Error::is_zone_file_not_found`] error when no search
/// directory has a file with the name given, and a
/// [`Error::is_malformed_zone_file`] error when a file exists but is not
/// valid TZif data.
pub fn load(name: &str) -> Result<Location, Error> {
    load_with(&FsZoneSource::system(), name)
}

/// Like [`load`], but reading from the source given.
pub fn load_with<S: ZoneSource + ?Sized>(
    source: &S,
    name: &str,
) -> Result<Location, Error> {
    if name.is_empty() || name == "UTC" {
        return Ok(Location::utc());
    }
    if name.starts_with('/') || name.contains("..") {
        return Err(err!(
            "time zone name `{name}` is not a valid zoneinfo identifier"
        ));
    }
    for dir in source.search_dirs() {
        let path = dir.join(name);
        match source.read(&path) {
            Ok(data) => {
                return tzif::parse(name, &data)
                    .map_err(|err| err.path(path));
            }
            Err(SourceError::NotFound) => {
                trace!("no time zone {name} in {}", dir.display());
            }
            Err(SourceError::Io(ioerr)) => {
                return Err(Error::io(ioerr).path(path));
            }
        }
    }
    Err(Error::zone_file_not_found(name))
}

/// Resolves the default location for this process from the `TZ`
/// environment variable, falling back to UTC when anything goes wrong.
///
/// * `TZ` unset: the system's `/etc/localtime` file, under the name
///   `"local"`. UTC when that file is missing or malformed.
/// * `TZ` empty or `UTC`: UTC.
/// * Anything else: a zoneinfo identifier resolved through the search
///   path. A leading `:` is ignored, and a value starting with `/` names
///   a TZif file directly.
pub fn default_zone() -> Location {
    let tz = env::var("TZ").ok();
    default_zone_from(tz.as_deref(), &FsZoneSource::system())
}

/// Like [`default_zone`], but with the environment value and source
/// supplied by the caller.
pub fn default_zone_from<S: ZoneSource + ?Sized>(
    tz: Option<&str>,
    source: &S,
) -> Location {
    let Some(tz) = tz else {
        return match read_localtime(source) {
            Some(loc) => loc,
            None => Location::utc(),
        };
    };
    // A leading colon is ignored, per the tzset convention.
    let name = tz.strip_prefix(':').unwrap_or(tz);
    if name.is_empty() || name == "UTC" {
        return Location::utc();
    }
    if name.starts_with('/') {
        // TZ names a TZif file directly.
        match source.read(Path::new(name)) {
            Ok(data) => match tzif::parse(name, &data) {
                Ok(mut loc) => {
                    loc.rename("local");
                    return loc;
                }
                Err(err) => {
                    warn!("TZ={name} is not valid TZif data: {err}");
                    return Location::utc();
                }
            },
            Err(err) => {
                warn!("failed to read TZ={name}: {err}");
                return Location::utc();
            }
        }
    }
    match load_with(source, name) {
        Ok(loc) => loc,
        Err(err) => {
            warn!("failed to load time zone TZ={name}: {err}");
            Location::utc()
        }
    }
}

fn read_localtime<S: ZoneSource + ?Sized>(source: &S) -> Option<Location> {
    let data = match source.read(Path::new(LOCALTIME_PATH)) {
        Ok(data) => data,
        Err(err) => {
            debug!("failed to read {LOCALTIME_PATH}: {err}");
            return None;
        }
    };
    match tzif::parse("local", &data) {
        Ok(loc) => Some(loc),
        Err(err) => {
            warn!("{LOCALTIME_PATH} is not valid TZif data: {err}");
            None
        }
    }
}
