use alloc::{string::String, vec::Vec};

use crate::error::Error;

/// The time of the theoretical first instant, used as the start of the era
/// before any recorded transition.
pub(crate) const ALPHA: i64 = i64::MIN;

/// The time of the theoretical last instant, used as the end of the era
/// after the last recorded transition.
pub(crate) const OMEGA: i64 = i64::MAX;

/// A fixed capacity inline string holding a zone abbreviation.
///
/// Abbreviations are copied out of the TZif parse buffer exactly once and
/// then owned by the `Location`, so `Zone` values are plain `Copy` data and
/// the parse buffer can be freed.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct Abbreviation {
    /// The bytes of the abbreviation. The `0..len` sub-slice is always
    /// valid UTF-8.
    bytes: [u8; Abbreviation::CAPACITY],
    len: u8,
}

impl Abbreviation {
    /// The longest abbreviation we are willing to store. Real zoneinfo
    /// abbreviations max out at 6 bytes or so; this leaves plenty of slack
    /// for unusual data while keeping `Zone` small.
    pub(crate) const CAPACITY: usize = 30;

    /// Creates a new abbreviation from the string given.
    ///
    /// Returns `None` if the string exceeds the capacity.
    pub(crate) fn new(s: &str) -> Option<Abbreviation> {
        let len = s.len();
        if len > Abbreviation::CAPACITY {
            return None;
        }
        let mut bytes = [0; Abbreviation::CAPACITY];
        bytes[..len].copy_from_slice(s.as_bytes());
        Some(Abbreviation { bytes, len: len as u8 })
    }

    /// Returns this abbreviation as a string slice.
    pub(crate) fn as_str(&self) -> &str {
        // OK because construction guarantees valid UTF-8.
        core::str::from_utf8(&self.bytes[..usize::from(self.len)]).unwrap()
    }
}

impl core::fmt::Debug for Abbreviation {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}

/// A single interpretation of wall clock time within a [`Location`]: an
/// abbreviation like `"PDT"`, an offset east of UTC and whether the zone
/// counts as daylight saving time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Zone {
    pub(crate) name: Abbreviation,
    pub(crate) offset: i32,
    pub(crate) is_dst: bool,
}

impl Zone {
    pub(crate) fn new(name: &str, offset: i32, is_dst: bool) -> Option<Zone> {
        Some(Zone { name: Abbreviation::new(name)?, offset, is_dst })
    }

    /// Returns the abbreviation of this zone, e.g. `"CET"`. This is not
    /// the IANA identifier of the enclosing location.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the offset of this zone in seconds east of UTC.
    #[inline]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Returns true if this zone represents a daylight saving offset.
    #[inline]
    pub fn is_dst(&self) -> bool {
        self.is_dst
    }
}

/// A change from one zone to another at a point in time.
///
/// The `is_std`/`is_utc` flags record whether the transition time was
/// specified in standard or UTC time in the source file. They exist only to
/// round-trip the source data; lookup never consults them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Transition {
    /// The Unix second at which the transition takes effect.
    pub(crate) when: i64,
    /// The index into the zone list that applies from `when` onward.
    pub(crate) index: u8,
    pub(crate) is_std: bool,
    pub(crate) is_utc: bool,
}

/// The zone and era that a lookup resolved to.
///
/// The era is the half-open range `[start, end)` of Unix seconds
/// throughout which the same zone applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZoneDetail<'l> {
    /// The zone abbreviation, e.g. `"PST"`.
    pub name: &'l str,
    /// Seconds east of UTC.
    pub offset: i32,
    /// Whether the zone is a daylight saving zone.
    pub is_dst: bool,
    /// The first Unix second of the era (inclusive).
    pub start: i64,
    /// The first Unix second after the era (exclusive).
    pub end: i64,
}

#[derive(Clone, Copy, Debug)]
struct Cache {
    start: i64,
    end: i64,
    index: u8,
}

/// A named collection of time zones and the transitions between them,
/// typically one entry of the IANA time zone database like
/// `"America/New_York"`.
///
/// A `Location` is immutable once constructed and safe to read from any
/// number of threads. Instants refer to a location by reference, so the
/// usual pattern is to load the locations a program needs near startup and
/// pass them down.
///
/// ```
/// use tempo::tz::Location;
///
/// let loc = Location::fixed("AEST", 10 * 3600);
/// let detail = loc.lookup(0);
/// assert_eq!(detail.name, "AEST");
/// assert_eq!(detail.offset, 36_000);
/// ```
#[derive(Clone, Debug)]
pub struct Location {
    name: String,
    zones: Vec<Zone>,
    transitions: Vec<Transition>,
    /// Covers the era of the last transition, which for real zoneinfo data
    /// is the era that contains the present. Consulted before binary
    /// search.
    cache: Option<Cache>,
}

impl Location {
    /// Returns the UTC location: no zones, no transitions. Lookups in it
    /// always resolve to `"UTC"` with offset `0`.
    pub fn utc() -> Location {
        Location {
            name: String::from("UTC"),
            zones: Vec::new(),
            transitions: Vec::new(),
            cache: None,
        }
    }

    /// Returns a location that always uses the zone given, with the name
    /// doubling as the abbreviation.
    ///
    /// `offset` is in seconds east of UTC. Names longer than a zone
    /// abbreviation can store are truncated.
    pub fn fixed(name: &str, offset: i32) -> Location {
        let abbrev = match Abbreviation::new(name) {
            Some(abbrev) => abbrev,
            None => {
                // Truncate on a char boundary. Abbreviations this long do
                // not occur in real data.
                let mut end = Abbreviation::CAPACITY;
                while !name.is_char_boundary(end) {
                    end -= 1;
                }
                Abbreviation::new(&name[..end]).unwrap()
            }
        };
        let zones =
            alloc::vec![Zone { name: abbrev, offset, is_dst: false }];
        Location::from_parts(String::from(name), zones, Vec::new())
    }

    /// Assembles a location from its parts.
    ///
    /// An empty transition list with a non-empty zone list gets a single
    /// synthesized transition at [`ALPHA`] pointing at the zone the
    /// first-zone rule selects, so that every instant falls into some era.
    ///
    /// Callers must provide transitions sorted ascending by time with
    /// in-bounds zone indices. The TZif parser validates this; internal
    /// callers are trusted.
    pub(crate) fn from_parts(
        name: String,
        zones: Vec<Zone>,
        mut transitions: Vec<Transition>,
    ) -> Location {
        debug_assert!(
            transitions.windows(2).all(|w| w[0].when < w[1].when),
            "transitions must be strictly increasing",
        );
        debug_assert!(
            transitions.iter().all(|t| usize::from(t.index) < zones.len()),
            "transition zone indices must be in bounds",
        );
        if transitions.is_empty() && !zones.is_empty() {
            let index = first_zone_index(&zones, &transitions) as u8;
            transitions.push(Transition {
                when: ALPHA,
                index,
                is_std: false,
                is_utc: false,
            });
        }
        let cache = transitions
            .last()
            .map(|last| Cache { start: last.when, end: OMEGA, index: last.index });
        Location { name, zones, transitions, cache }
    }

    /// Returns the name of this location, e.g. `"US/Pacific"`. The UTC
    /// location is named `"UTC"` and the system local location is named
    /// `"local"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.name = String::from(name);
    }

    /// Resolves the zone in effect at the Unix second given, along with
    /// the era `[start, end)` throughout which that zone applies.
    pub fn lookup(&self, sec: i64) -> ZoneDetail<'_> {
        if self.zones.is_empty() {
            return ZoneDetail {
                name: "UTC",
                offset: 0,
                is_dst: false,
                start: ALPHA,
                end: OMEGA,
            };
        }
        if let Some(cache) = self.cache {
            if cache.start <= sec && sec < cache.end {
                let zone = &self.zones[usize::from(cache.index)];
                return ZoneDetail {
                    name: zone.name.as_str(),
                    offset: zone.offset,
                    is_dst: zone.is_dst,
                    start: cache.start,
                    end: cache.end,
                };
            }
        }
        if self.transitions.is_empty() || sec < self.transitions[0].when {
            let zone =
                &self.zones[first_zone_index(&self.zones, &self.transitions)];
            let end = match self.transitions.first() {
                Some(first) => first.when,
                None => OMEGA,
            };
            return ZoneDetail {
                name: zone.name.as_str(),
                offset: zone.offset,
                is_dst: zone.is_dst,
                start: ALPHA,
                end,
            };
        }

        // Binary search for the last transition at or before `sec`. The
        // bounds check above guarantees there is one.
        let mut end = OMEGA;
        let mut lo = 0;
        let mut hi = self.transitions.len();
        while hi - lo > 1 {
            let m = lo + (hi - lo) / 2;
            let lim = self.transitions[m].when;
            if sec < lim {
                end = lim;
                hi = m;
            } else {
                lo = m;
            }
        }
        let tx = &self.transitions[lo];
        let zone = &self.zones[usize::from(tx.index)];
        ZoneDetail {
            name: zone.name.as_str(),
            offset: zone.offset,
            is_dst: zone.is_dst,
            start: tx.when,
            end,
        }
    }

    /// Returns the offset in effect at the Unix second given. This is the
    /// hot path for calendar presentation of instants.
    pub(crate) fn offset_at(&self, sec: i64) -> i32 {
        if self.zones.is_empty() {
            return 0;
        }
        if let Some(cache) = self.cache {
            if cache.start <= sec && sec < cache.end {
                return self.zones[usize::from(cache.index)].offset;
            }
        }
        self.lookup(sec).offset
    }

    /// Resolves a zone abbreviation to an offset, preferring a zone that
    /// was actually in effect at the Unix second given.
    ///
    /// The preference matters when one abbreviation names several offsets.
    /// In Sydney, "EST" historically meant both standard and daylight
    /// time. The first pass only accepts a zone whose offset would place
    /// the given moment inside an era using that zone; the second pass
    /// accepts any zone with a matching name.
    ///
    /// Returns a [`Error::is_zone_not_found`] error when no zone in this
    /// location uses the abbreviation.
    pub fn lookup_name(&self, name: &str, unix: i64) -> Result<i32, Error> {
        for zone in self.zones.iter() {
            if zone.name.as_str() == name {
                let detail = self.lookup(unix - i64::from(zone.offset));
                if detail.name == zone.name.as_str() {
                    return Ok(detail.offset);
                }
            }
        }
        for zone in self.zones.iter() {
            if zone.name.as_str() == name {
                return Ok(zone.offset);
            }
        }
        Err(Error::zone_not_found(name))
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Selects the zone to use for instants before the first transition.
///
/// This mirrors the reference rule in the IANA distribution's localtime.c:
///
/// 1. If the first zone is unused by the transition table, use it.
/// 2. Otherwise, if there are transitions and the first one points at a
///    DST zone, walk backward from that zone to the most recent non-DST
///    zone before it.
/// 3. Otherwise, use the first non-DST zone anywhere in the list.
/// 4. Otherwise, use the first zone.
fn first_zone_index(
    zones: &[Zone],
    transitions: &[Transition],
) -> usize {
    if !first_zone_is_used(transitions) {
        return 0;
    }
    if let Some(first) = transitions.first() {
        if zones[usize::from(first.index)].is_dst {
            let mut zi = usize::from(first.index);
            while zi > 0 {
                zi -= 1;
                if !zones[zi].is_dst {
                    return zi;
                }
            }
        }
    }
    if let Some(zi) = zones.iter().position(|zone| !zone.is_dst) {
        return zi;
    }
    0
}

fn first_zone_is_used(transitions: &[Transition]) -> bool {
    transitions.iter().any(|tx| tx.index == 0)
}
