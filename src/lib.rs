/*!
A time library with a dual wall/monotonic instant, a proleptic Gregorian
calendar, IANA time zone support via TZif and reference-time layout
formatting.

The central type is an [`Instant`]: a point in time recorded from a wall
clock with nanosecond precision, optionally accompanied by a reading from a
monotonic clock. Instants can be placed in a time zone by attaching a
[`Location`](crate::tz::Location), decomposed into civil calendar fields
(year, month, day, clock time, ISO 8601 week) and rendered to text with
layout strings written in terms of the reference time
`Mon Jan 2 15:04:05 MST 2006`.

# Example

```
use tempo::{tz::Location, Instant, RFC1123};

let loc = Location::fixed("CET", 3600);
let instant = Instant::unix(1_221_681_866, 0, Some(&loc));
assert_eq!(instant.format(RFC1123), "Wed, 17 Sep 2008 21:04:26 CET");
```

# Organization

* [`Instant`] and [`Duration`] are at the crate root, along with the layout
  string constants ([`RFC3339`], [`KITCHEN`] and friends).
* The [`civil`] module has the calendar value types: [`civil::Date`],
  [`civil::Time`], [`civil::Month`], [`civil::Weekday`] and
  [`civil::IsoWeek`].
* The [`tz`] module has [`tz::Location`] (a named set of time zone
  transitions) and, when the `std` feature is enabled, routines for loading
  locations from the system zoneinfo database and the `TZ` environment
  variable.
* The [`fmt`] module has the writer abstraction used by the formatter.

# Crate features

* **std** (enabled by default) - Enables the system clock, the filesystem
  zone source and `std::error::Error` impls. Implies `alloc`.
* **alloc** - Dynamic memory allocation. Required. (Time zone data and
  error values live on the heap.)
* **logging** - Emits diagnostics to the [`log`](https://docs.rs/log) crate
  facade. Principally useful for understanding why loading a time zone from
  disk fell back to UTC.
*/

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_debug_implementations)]

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

pub use crate::{
    duration::Duration,
    error::Error,
    fmt::{
        ANSIC, KITCHEN, RFC1123, RFC1123Z, RFC3339, RFC3339_NANO, RFC822,
        RFC822Z, RFC850, RUBY_DATE, STAMP, STAMP_MICRO, STAMP_MILLI,
        STAMP_NANO, UNIX_DATE,
    },
    instant::{Clock, ClockReading, Instant},
};

#[cfg(feature = "std")]
pub use crate::instant::SystemClock;

#[cfg(all(feature = "std", feature = "logging"))]
pub use crate::logging::Logger;

#[macro_use]
mod logging;

pub mod civil;
mod duration;
mod error;
pub mod fmt;
mod instant;
pub mod tz;
