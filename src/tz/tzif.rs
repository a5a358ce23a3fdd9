/*!
A parser for TZif binary data, the format produced by `zic` and found
under `/usr/share/zoneinfo` on Unix systems.

Versions 1, 2 and 3 of the format are accepted. Version 2 and 3 files
carry the version 1 data block followed by a second block using 64-bit
transition times; the 64-bit block is the one used. Leap second records
are skipped (this crate ignores leap seconds) and the trailing POSIX TZ
rule string in version 2+ files is ignored (only tabulated transitions
are used).

In general, callers may assume that it is safe to pass arbitrary or even
untrusted data to [`parse`] and count on it not panicking or using
resources that aren't limited to a small constant factor of the size of
the data itself.
*/

use alloc::{string::String, vec::Vec};

use crate::{
    error::Error,
    tz::location::{Location, Transition, Zone},
};

/// Parses the given data as a TZif formatted file.
///
/// The name given becomes the name of the `Location` returned, but is
/// otherwise not significant.
///
/// Every way the data can be rejected surfaces as a "malformed zone file"
/// error.
pub(crate) fn parse(name: &str, bytes: &[u8]) -> Result<Location, Error> {
    parse_tzif(name, bytes).map_err(Error::malformed_zone_file)
}

fn parse_tzif(name: &str, bytes: &[u8]) -> Result<Location, TzifError> {
    let (header, rest) = Header::parse(4, bytes)?;
    if header.version == 0 {
        return parse_data_block(name, &header, rest);
    }
    // Version 2+: skip the entire 32-bit data block, then parse a second
    // header and a data block with 64-bit transition times.
    let (_, rest) = try_split_at(Section::V1Block, rest, header.block_len()?)?;
    let (header64, rest) = Header::parse(8, rest)?;
    parse_data_block(name, &header64, rest)
}

/// Parses one data block (either the lone V1 block or the 64-bit V2+
/// block) into a `Location`.
fn parse_data_block(
    name: &str,
    header: &Header,
    bytes: &[u8],
) -> Result<Location, TzifError> {
    let (time_bytes, rest) = try_split_at(
        Section::TransitionTimes,
        bytes,
        header.transition_times_len()?,
    )?;
    let (index_bytes, rest) =
        try_split_at(Section::TransitionTypes, rest, header.tzh_timecnt)?;
    let (type_bytes, rest) = try_split_at(
        Section::LocalTimeTypes,
        rest,
        header.local_time_types_len()?,
    )?;
    let (char_bytes, rest) =
        try_split_at(Section::Abbreviations, rest, header.tzh_charcnt)?;
    // Leap second records are parsed past but otherwise ignored.
    let (_, rest) =
        try_split_at(Section::LeapSeconds, rest, header.leap_seconds_len()?)?;
    let (is_std_bytes, rest) =
        try_split_at(Section::StandardWallIndicators, rest, header.tzh_ttisstdcnt)?;
    let (is_utc_bytes, _) =
        try_split_at(Section::UtLocalIndicators, rest, header.tzh_ttisutcnt)?;

    let mut zones = Vec::with_capacity(header.tzh_typecnt);
    let mut it = type_bytes.chunks_exact(6);
    while let Some(chunk) = it.next() {
        let offset = from_be_bytes_i32(&chunk[..4]);
        let is_dst = chunk[4] == 1;
        let abbrev_index = usize::from(chunk[5]);
        if abbrev_index >= char_bytes.len() {
            return Err(TzifError::BadAbbreviationIndex {
                index: chunk[5],
                len: char_bytes.len(),
            });
        }
        // The abbreviation runs to the next NUL, or to the end of the
        // block when the data omits the final terminator.
        let abbrev_bytes = match char_bytes[abbrev_index..]
            .iter()
            .position(|&b| b == 0)
        {
            Some(nul) => &char_bytes[abbrev_index..abbrev_index + nul],
            None => &char_bytes[abbrev_index..],
        };
        let abbrev = core::str::from_utf8(abbrev_bytes)
            .map_err(|_| TzifError::BadAbbreviation)?;
        let zone = Zone::new(abbrev, offset, is_dst)
            .ok_or(TzifError::BadAbbreviation)?;
        zones.push(zone);
    }

    let mut transitions = Vec::with_capacity(header.tzh_timecnt);
    let times = time_bytes.chunks_exact(header.time_size);
    for (i, chunk) in times.enumerate() {
        let when = if header.is_32bit() {
            i64::from(from_be_bytes_i32(chunk))
        } else {
            from_be_bytes_i64(chunk)
        };
        let index = index_bytes[i];
        if usize::from(index) >= zones.len() {
            return Err(TzifError::BadTransitionType {
                index,
                len: zones.len(),
            });
        }
        // zic always emits transitions in ascending order; data that
        // violates that would corrupt the binary search downstream.
        if transitions.last().is_some_and(|prev: &Transition| prev.when >= when) {
            return Err(TzifError::UnsortedTransitions);
        }
        transitions.push(Transition {
            when,
            index,
            is_std: is_std_bytes.get(i).is_some_and(|&b| b != 0),
            is_utc: is_utc_bytes.get(i).is_some_and(|&b| b != 0),
        });
    }

    // A file with types but no transitions (fixed locations like Etc/GMT)
    // gets a single synthesized transition at ALPHA from `from_parts`,
    // pointing at the first-zone rule's choice.
    Ok(Location::from_parts(String::from(name), zones, transitions))
}

/// The fixed-size header of a TZif file or data block.
///
/// V2+ files have two headers: one describing the V1 data block, and a
/// second one following that block describing the 64-bit data block. Both
/// have the same format and use 32-bit big-endian counts.
#[derive(Debug)]
struct Header {
    /// The size of the transition times in the data block this header
    /// describes: 4 for V1, 8 for the second block of V2+.
    time_size: usize,
    /// The raw version byte: `0` for V1, otherwise the ASCII digit.
    version: u8,
    /// Number of UT/local indicators.
    tzh_ttisutcnt: usize,
    /// Number of standard/wall indicators.
    tzh_ttisstdcnt: usize,
    /// Number of leap second records.
    tzh_leapcnt: usize,
    /// Number of transition times.
    tzh_timecnt: usize,
    /// Number of local time type records.
    tzh_typecnt: usize,
    /// Number of bytes of zone abbreviation data.
    tzh_charcnt: usize,
}

impl Header {
    /// Parses a header from the given bytes. Upon success, returns the
    /// header and all bytes following it.
    fn parse(
        time_size: usize,
        bytes: &[u8],
    ) -> Result<(Header, &[u8]), TzifError> {
        assert!(time_size == 4 || time_size == 8, "time size must be 4 or 8");
        if bytes.len() < 44 {
            return Err(TzifError::TruncatedHeader);
        }
        let (magic, rest) = bytes.split_at(4);
        if magic != b"TZif" {
            return Err(TzifError::MismatchedMagic);
        }
        let (version, rest) = rest.split_at(1);
        let version = match version[0] {
            0 => 0,
            b'2' => b'2',
            b'3' => b'3',
            v => return Err(TzifError::BadVersion { version: v }),
        };
        let (_reserved, rest) = rest.split_at(15);

        let (tzh_ttisutcnt_bytes, rest) = rest.split_at(4);
        let (tzh_ttisstdcnt_bytes, rest) = rest.split_at(4);
        let (tzh_leapcnt_bytes, rest) = rest.split_at(4);
        let (tzh_timecnt_bytes, rest) = rest.split_at(4);
        let (tzh_typecnt_bytes, rest) = rest.split_at(4);
        let (tzh_charcnt_bytes, rest) = rest.split_at(4);

        let header = Header {
            time_size,
            version,
            tzh_ttisutcnt: from_be_bytes_u32_to_usize(tzh_ttisutcnt_bytes)?,
            tzh_ttisstdcnt: from_be_bytes_u32_to_usize(tzh_ttisstdcnt_bytes)?,
            tzh_leapcnt: from_be_bytes_u32_to_usize(tzh_leapcnt_bytes)?,
            tzh_timecnt: from_be_bytes_u32_to_usize(tzh_timecnt_bytes)?,
            tzh_typecnt: from_be_bytes_u32_to_usize(tzh_typecnt_bytes)?,
            tzh_charcnt: from_be_bytes_u32_to_usize(tzh_charcnt_bytes)?,
        };
        Ok((header, rest))
    }

    /// Returns true if this header is for a 32-bit data block.
    fn is_32bit(&self) -> bool {
        self.time_size == 4
    }

    /// Returns the size of the data block, in bytes, for this header.
    /// Used to skip over the V1 data block in V2+ files.
    fn block_len(&self) -> Result<usize, TzifError> {
        let a = self.transition_times_len()?;
        let b = self.tzh_timecnt;
        let c = self.local_time_types_len()?;
        let d = self.tzh_charcnt;
        let e = self.leap_seconds_len()?;
        let f = self.tzh_ttisstdcnt;
        let g = self.tzh_ttisutcnt;
        a.checked_add(b)
            .and_then(|z| z.checked_add(c))
            .and_then(|z| z.checked_add(d))
            .and_then(|z| z.checked_add(e))
            .and_then(|z| z.checked_add(f))
            .and_then(|z| z.checked_add(g))
            .ok_or(TzifError::BadCount)
    }

    fn transition_times_len(&self) -> Result<usize, TzifError> {
        self.tzh_timecnt
            .checked_mul(self.time_size)
            .ok_or(TzifError::BadCount)
    }

    fn local_time_types_len(&self) -> Result<usize, TzifError> {
        self.tzh_typecnt.checked_mul(6).ok_or(TzifError::BadCount)
    }

    fn leap_seconds_len(&self) -> Result<usize, TzifError> {
        // Each record is one transition time plus a 4 byte correction.
        self.tzh_leapcnt
            .checked_mul(self.time_size + 4)
            .ok_or(TzifError::BadCount)
    }
}

/// The reason a TZif file was rejected.
///
/// This type stays internal. At the public API boundary every variant is a
/// "malformed zone file" error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum TzifError {
    TruncatedHeader,
    MismatchedMagic,
    BadVersion { version: u8 },
    BadCount,
    BadAbbreviationIndex { index: u8, len: usize },
    BadAbbreviation,
    BadTransitionType { index: u8, len: usize },
    UnsortedTransitions,
    Truncated { section: Section },
}

#[cfg(feature = "std")]
impl std::error::Error for TzifError {}

impl core::fmt::Display for TzifError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::TzifError::*;

        match *self {
            TruncatedHeader => f.write_str(
                "expected at least 44 header bytes, \
                 but found unexpected end of data",
            ),
            MismatchedMagic => f.write_str("magic bytes mismatch"),
            BadVersion { version } => write!(
                f,
                "unsupported version byte `{version:#04x}` \
                 (expected 0x00, '2' or '3')",
            ),
            BadCount => {
                f.write_str("header count does not fit in memory bounds")
            }
            BadAbbreviationIndex { index, len } => write!(
                f,
                "abbreviation index {index} is out of range \
                 for a {len} byte abbreviation block",
            ),
            BadAbbreviation => {
                f.write_str("zone abbreviation is not a valid abbreviation")
            }
            BadTransitionType { index, len } => write!(
                f,
                "transition references zone index {index}, \
                 but only {len} zones exist",
            ),
            UnsortedTransitions => f.write_str(
                "transition times are not strictly increasing",
            ),
            Truncated { ref section } => write!(
                f,
                "expected bytes for {section} data block, \
                 but did not find enough bytes",
            ),
        }
    }
}

/// Names the sections of a data block, for truncation errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Section {
    V1Block,
    TransitionTimes,
    TransitionTypes,
    LocalTimeTypes,
    Abbreviations,
    LeapSeconds,
    StandardWallIndicators,
    UtLocalIndicators,
}

impl core::fmt::Display for Section {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::Section::*;

        f.write_str(match *self {
            V1Block => "'version 1'",
            TransitionTimes => "'transition times'",
            TransitionTypes => "'transition types'",
            LocalTimeTypes => "'local time types'",
            Abbreviations => "'abbreviations'",
            LeapSeconds => "'leap seconds'",
            StandardWallIndicators => "'standard/wall indicators'",
            UtLocalIndicators => "'UT/local indicators'",
        })
    }
}

/// Splits the given slice of bytes at the index given.
///
/// If the index is out of range then a truncation error naming the given
/// section is returned.
fn try_split_at(
    section: Section,
    bytes: &[u8],
    at: usize,
) -> Result<(&[u8], &[u8]), TzifError> {
    if at > bytes.len() {
        Err(TzifError::Truncated { section })
    } else {
        Ok(bytes.split_at(at))
    }
}

/// Interprets the given 4-byte slice as an unsigned 32-bit big endian
/// integer and converts it to `usize`.
fn from_be_bytes_u32_to_usize(bytes: &[u8]) -> Result<usize, TzifError> {
    let n = u32::from_be_bytes(bytes.try_into().unwrap());
    usize::try_from(n).map_err(|_| TzifError::BadCount)
}

/// Interprets the given 4-byte slice as a signed 32-bit big endian
/// integer.
fn from_be_bytes_i32(bytes: &[u8]) -> i32 {
    i32::from_be_bytes(bytes.try_into().unwrap())
}

/// Interprets the given 8-byte slice as a signed 64-bit big endian
/// integer.
fn from_be_bytes_i64(bytes: &[u8]) -> i64 {
    i64::from_be_bytes(bytes.try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::tz::{
        location::{ALPHA, OMEGA},
        testdata::TzifBuilder,
    };

    use super::*;

    /// A tiny two-zone table with one transition each way.
    fn two_zone_builder() -> TzifBuilder {
        let mut b = TzifBuilder::new();
        b.zone(-28800, false, "PST");
        b.zone(-25200, true, "PDT");
        b.transition(1205056800, 1);
        b.transition(1225616400, 0);
        b
    }

    #[test]
    fn v1_round_trips() {
        let data = two_zone_builder().build_v1();
        let loc = parse("US/Pacific", &data).unwrap();
        assert_eq!(loc.name(), "US/Pacific");
        let detail = loc.lookup(1221681866);
        assert_eq!((detail.name, detail.offset, detail.is_dst),
            ("PDT", -25200, true));
        assert_eq!((detail.start, detail.end), (1205056800, 1225616400));
        let detail = loc.lookup(1226000000);
        assert_eq!((detail.name, detail.offset, detail.is_dst),
            ("PST", -28800, false));
    }

    #[test]
    fn v2_uses_64bit_block() {
        let mut b = two_zone_builder();
        // A transition far outside the 32-bit range only representable in
        // the 64-bit block.
        b.transition(253402300800, 1);
        let data = b.build_v2(b'2');
        let loc = parse("US/Pacific", &data).unwrap();
        let detail = loc.lookup(253402300800);
        assert_eq!(detail.name, "PDT");
        assert_eq!(detail.start, 253402300800);
    }

    #[test]
    fn v3_accepted() {
        let data = two_zone_builder().build_v2(b'3');
        assert!(parse("US/Pacific", &data).is_ok());
    }

    #[test]
    fn before_first_transition_prefers_standard_time() {
        let data = two_zone_builder().build_v1();
        let loc = parse("US/Pacific", &data).unwrap();
        // The first transition points at PDT (a DST zone); the backward
        // walk picks PST.
        let detail = loc.lookup(0);
        assert_eq!((detail.name, detail.offset), ("PST", -28800));
        assert_eq!(detail.end, 1205056800);
    }

    #[test]
    fn no_transitions_synthesizes_alpha() {
        let mut b = TzifBuilder::new();
        b.zone(0, false, "GMT");
        let loc = parse("Etc/GMT", &b.build_v1()).unwrap();
        let detail = loc.lookup(1_700_000_000);
        assert_eq!((detail.name, detail.offset), ("GMT", 0));
        assert_eq!((detail.start, detail.end), (ALPHA, OMEGA));
    }

    #[test]
    fn indicators_recorded() {
        let mut b = two_zone_builder();
        b.indicators(&[1, 0], &[1, 0]);
        let data = b.build_v1();
        // Nothing observable through lookup; just verify the file still
        // parses with indicator blocks present.
        assert!(parse("US/Pacific", &data).is_ok());
    }

    #[test]
    fn leap_seconds_skipped() {
        let mut b = two_zone_builder();
        b.leap_second(78796800, 1);
        b.leap_second(94694400, 2);
        let loc = parse("US/Pacific", &b.build_v1()).unwrap();
        assert_eq!(loc.lookup(1221681866).name, "PDT");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = two_zone_builder().build_v1();
        data[0] = b'Q';
        let err = parse("boom", &data).unwrap_err();
        assert!(err.is_malformed_zone_file());
    }

    #[test]
    fn rejects_bad_version() {
        let mut data = two_zone_builder().build_v1();
        data[4] = b'9';
        let err = parse("boom", &data).unwrap_err();
        assert!(err.is_malformed_zone_file());
    }

    #[test]
    fn rejects_truncation_everywhere() {
        let data = two_zone_builder().build_v1();
        for len in 0..data.len() {
            let err = parse("boom", &data[..len]).unwrap_err();
            assert!(err.is_malformed_zone_file(), "prefix of {len} bytes");
        }
    }

    #[test]
    fn rejects_out_of_range_zone_index() {
        let mut b = TzifBuilder::new();
        b.zone(0, false, "GMT");
        b.transition(1000, 7);
        let err = parse("boom", &b.build_v1()).unwrap_err();
        assert!(err.is_malformed_zone_file());
    }

    #[test]
    fn rejects_unsorted_transitions() {
        let mut b = TzifBuilder::new();
        b.zone(0, false, "GMT");
        b.transition(2000, 0);
        b.transition(1000, 0);
        let err = parse("boom", &b.build_v1()).unwrap_err();
        assert!(err.is_malformed_zone_file());
    }

    #[test]
    fn rejects_out_of_range_abbreviation_index() {
        let mut b = TzifBuilder::new();
        b.zone_with_abbrev_index(0, false, 200);
        let err = parse("boom", &b.build_v1()).unwrap_err();
        assert!(err.is_malformed_zone_file());
    }

    #[test]
    fn tolerates_missing_final_nul() {
        // An abbreviation block without a trailing NUL: the abbreviation
        // runs to the end of the block.
        let mut b = TzifBuilder::new();
        b.zone(3600, false, "CET");
        b.strip_final_nul();
        let loc = parse("CET", &b.build_v1()).unwrap();
        assert_eq!(loc.lookup(0).name, "CET");
    }

    #[test]
    fn empty_input_rejected() {
        let err = parse("boom", &[]).unwrap_err();
        assert!(err.is_malformed_zone_file());
        let err = parse("boom", b"TZif").unwrap_err();
        assert!(err.is_malformed_zone_file());
    }

    #[test]
    fn error_message_names_section() {
        let data = two_zone_builder().build_v1();
        // Chop inside the transition times.
        let err = parse("boom", &data[..46]).unwrap_err();
        let msg = alloc::string::ToString::to_string(&err);
        assert!(msg.starts_with("malformed zone file:"), "{msg}");
    }

    /// Parsing a full, real-ish table end to end: the 2007-2009 US/Pacific
    /// cycle.
    #[test]
    fn pacific_cycle() {
        let mut b = TzifBuilder::new();
        b.zone(-28800, false, "PST");
        b.zone(-25200, true, "PDT");
        for &(when, index) in crate::tz::testdata::PACIFIC_TRANSITIONS {
            b.transition(when, index);
        }
        let data = b.build_v2(b'2');
        let loc = parse("US/Pacific", &data).unwrap();
        assert_eq!(loc.lookup(0).name, "PST");
        assert_eq!(loc.lookup(1221681866).name, "PDT");
        assert_eq!(loc.lookup(1233810057).name, "PST");
    }

    /// DEBUG COMMAND
    ///
    /// Reads the environment variable `TEMPO_DEBUG_TZIF_PATH`, treats its
    /// value as a TZif file path, parses that file and dumps every era in
    /// a human readable form on stderr. Does nothing when the variable is
    /// unset, so it is inert under a normal test run.
    #[test]
    fn debug_tzif() -> anyhow::Result<()> {
        use anyhow::Context;

        const ENV: &str = "TEMPO_DEBUG_TZIF_PATH";
        let Some(val) = std::env::var_os(ENV) else { return Ok(()) };
        let Ok(path) = val.into_string() else {
            anyhow::bail!("{ENV} has invalid UTF-8")
        };
        let bytes = std::fs::read(&path)
            .with_context(|| alloc::format!("failed to read {path:?}"))?;
        let loc = parse(&path, &bytes)?;
        std::eprintln!("LOCATION {}", loc.name());
        // Walk the eras from the beginning of time to the end.
        let mut sec = i64::MIN;
        loop {
            let detail = loc.lookup(sec);
            std::eprintln!(
                "  {start}..{end}\t{name}\toffset={offset}\t{dst}",
                start = detail.start,
                end = detail.end,
                name = detail.name,
                offset = detail.offset,
                dst = if detail.is_dst { "dst" } else { "" },
            );
            if detail.end == i64::MAX {
                return Ok(());
            }
            sec = detail.end;
        }
    }

    /// The v1 and v2 renderings of the same table parse to the same
    /// transitions within the 32-bit representable range.
    #[test]
    fn v1_v2_agree() {
        let b = two_zone_builder();
        let loc1 = parse("A", &b.build_v1()).unwrap();
        let loc2 = parse("A", &b.build_v2(b'2')).unwrap();
        let secs: Vec<i64> =
            alloc::vec![0, 1205056799, 1205056800, 1221681866, 1225616400];
        for sec in secs {
            let d1 = loc1.lookup(sec);
            let d2 = loc2.lookup(sec);
            assert_eq!(
                (d1.name, d1.offset, d1.start, d1.end),
                (d2.name, d2.offset, d2.start, d2.end),
                "at {sec}",
            );
        }
    }
}
