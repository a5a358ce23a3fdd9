/*!
Time zone support.

The central type here is [`Location`]: a named, immutable set of zones and
the transitions between them, usually one entry of the IANA time zone
database. An [`Instant`](crate::Instant) optionally borrows a `Location`
to present itself in local time; no location means UTC.

With the `std` feature enabled, [`load`] resolves an IANA name like
`"Europe/Berlin"` against the system zoneinfo database, and
[`default_zone`] applies the `TZ` environment variable convention to pick
the zone for "local" time.
*/

pub use self::location::{Location, Zone, ZoneDetail};

#[cfg(feature = "std")]
pub use self::source::{
    default_zone, default_zone_from, load, load_with, FsZoneSource,
    SourceError, ZoneSource,
};

pub(crate) mod location;
#[cfg(feature = "std")]
mod source;
#[cfg(test)]
pub(crate) mod testdata;
pub(crate) mod tzif;
