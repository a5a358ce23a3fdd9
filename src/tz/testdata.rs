/*!
Test-only helpers for assembling TZif data and well-known locations.

Real zoneinfo files are not checked into the repository. Instead, tests
build the exact bytes they need with [`TzifBuilder`], and the US/Pacific
2007-2009 DST cycle used by the end-to-end scenarios is assembled directly
from its zone table.
*/

use alloc::{string::String, vec::Vec};

use crate::tz::location::{Location, Transition, Zone};

/// The US/Pacific transitions for 2007 through 2009, as `(when, index)`
/// pairs with index 0 = PST and index 1 = PDT.
pub(crate) const PACIFIC_TRANSITIONS: &[(i64, u8)] = &[
    (1173607200, 1), // 2007-03-11 02:00 PST -> PDT
    (1194166800, 0), // 2007-11-04 02:00 PDT -> PST
    (1205056800, 1), // 2008-03-09 02:00 PST -> PDT
    (1225616400, 0), // 2008-11-02 02:00 PDT -> PST
    (1236506400, 1), // 2009-03-08 02:00 PST -> PDT
    (1257066000, 0), // 2009-11-01 02:00 PDT -> PST
];

/// Returns a `US/Pacific` location covering the 2007-2009 DST cycle.
pub(crate) fn pacific() -> Location {
    let zones = alloc::vec![
        Zone::new("PST", -28800, false).unwrap(),
        Zone::new("PDT", -25200, true).unwrap(),
    ];
    let transitions = PACIFIC_TRANSITIONS
        .iter()
        .map(|&(when, index)| Transition {
            when,
            index,
            is_std: false,
            is_utc: false,
        })
        .collect();
    Location::from_parts(String::from("US/Pacific"), zones, transitions)
}

/// Builds TZif binary data one field at a time.
#[derive(Debug, Default)]
pub(crate) struct TzifBuilder {
    zones: Vec<(i32, bool, u8)>,
    chars: Vec<u8>,
    transitions: Vec<(i64, u8)>,
    leaps: Vec<(i64, i32)>,
    is_std: Vec<u8>,
    is_utc: Vec<u8>,
    omit_final_nul: bool,
}

impl TzifBuilder {
    pub(crate) fn new() -> TzifBuilder {
        TzifBuilder::default()
    }

    /// Adds a local time type, appending its abbreviation to the
    /// abbreviation block.
    pub(crate) fn zone(&mut self, offset: i32, is_dst: bool, abbrev: &str) {
        let index = u8::try_from(self.chars.len()).unwrap();
        self.chars.extend_from_slice(abbrev.as_bytes());
        self.chars.push(0);
        self.zones.push((offset, is_dst, index));
    }

    /// Adds a local time type with a raw abbreviation index, for testing
    /// out-of-range indices.
    pub(crate) fn zone_with_abbrev_index(
        &mut self,
        offset: i32,
        is_dst: bool,
        index: u8,
    ) {
        if self.chars.is_empty() {
            self.chars.push(0);
        }
        self.zones.push((offset, is_dst, index));
    }

    pub(crate) fn transition(&mut self, when: i64, index: u8) {
        self.transitions.push((when, index));
    }

    pub(crate) fn leap_second(&mut self, when: i64, correction: i32) {
        self.leaps.push((when, correction));
    }

    pub(crate) fn indicators(&mut self, is_std: &[u8], is_utc: &[u8]) {
        self.is_std = is_std.to_vec();
        self.is_utc = is_utc.to_vec();
    }

    /// Drops the final NUL of the abbreviation block, for testing data
    /// that omits the terminator.
    pub(crate) fn strip_final_nul(&mut self) {
        self.omit_final_nul = true;
    }

    /// Renders a version 1 file.
    pub(crate) fn build_v1(&self) -> Vec<u8> {
        let mut out = self.header(0, self.transitions.len());
        self.body(&mut out, 4, &self.transitions);
        out
    }

    /// Renders a version 2 or 3 file: a 32-bit block holding the
    /// transitions that fit in 32 bits, then a second header and a 64-bit
    /// block with everything, then an empty footer.
    pub(crate) fn build_v2(&self, version: u8) -> Vec<u8> {
        let narrow: Vec<(i64, u8)> = self
            .transitions
            .iter()
            .copied()
            .filter(|&(when, _)| i32::try_from(when).is_ok())
            .collect();
        let mut out = self.header(version, narrow.len());
        self.body(&mut out, 4, &narrow);
        out.extend_from_slice(&self.header(version, self.transitions.len()));
        self.body(&mut out, 8, &self.transitions);
        out.extend_from_slice(b"\n\n");
        out
    }

    fn header(&self, version: u8, timecnt: usize) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"TZif");
        out.push(version);
        out.extend_from_slice(&[0; 15]);
        for count in [
            self.is_utc.len(),
            self.is_std.len(),
            self.leaps.len(),
            timecnt,
            self.zones.len(),
            self.chars(),
        ] {
            out.extend_from_slice(&(count as u32).to_be_bytes());
        }
        out
    }

    fn chars(&self) -> usize {
        if self.omit_final_nul {
            self.chars.len() - 1
        } else {
            self.chars.len()
        }
    }

    fn body(&self, out: &mut Vec<u8>, time_size: usize, txs: &[(i64, u8)]) {
        for &(when, _) in txs {
            if time_size == 4 {
                out.extend_from_slice(&(when as i32).to_be_bytes());
            } else {
                out.extend_from_slice(&when.to_be_bytes());
            }
        }
        for &(_, index) in txs {
            out.push(index);
        }
        for &(offset, is_dst, abbrev) in self.zones.iter() {
            out.extend_from_slice(&offset.to_be_bytes());
            out.push(u8::from(is_dst));
            out.push(abbrev);
        }
        out.extend_from_slice(&self.chars[..self.chars()]);
        for &(when, correction) in self.leaps.iter() {
            if time_size == 4 {
                out.extend_from_slice(&(when as i32).to_be_bytes());
            } else {
                out.extend_from_slice(&when.to_be_bytes());
            }
            out.extend_from_slice(&correction.to_be_bytes());
        }
        out.extend_from_slice(&self.is_std);
        out.extend_from_slice(&self.is_utc);
    }
}
