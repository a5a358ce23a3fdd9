use crate::{
    civil::{self, Date, IsoWeek, Month, Time, Weekday},
    duration::Duration,
    error::Error,
    fmt,
    tz::Location,
};

/// Shifting `wall` left by one and right by this plus one extracts the
/// 33-bit seconds field of a compact instant.
const NSEC_SHIFT: u32 = 30;

/// The low 30 bits of `wall` always hold the nanosecond within the
/// second.
const NSEC_MASK: u64 = (1 << NSEC_SHIFT) - 1;

/// The high bit of `wall` records whether `ext` holds a monotonic
/// reading.
const HAS_MONOTONIC: u64 = 1 << 63;

/// The compact form counts seconds since 1885-01-01, expressed here as
/// seconds from the internal epoch (year 1). 33 bits of seconds reach
/// from 1885 to 2157.
const MIN_WALL: i64 = civil::WALL_TO_INTERNAL;

/// One reading of the host's clocks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClockReading {
    /// Seconds since the Unix epoch on the wall clock.
    pub unix_second: i64,
    /// The sub-second portion of the wall clock, in `[0, 10^9)`.
    pub nanosecond: i32,
    /// An opaque monotonic counter in nanoseconds. It has no defined zero;
    /// only differences between readings within one process mean anything.
    pub monotonic: u64,
}

/// The clock capability: where [`Instant::now`] gets its readings.
///
/// Implementations must keep `monotonic` non-decreasing across calls
/// within a process. The `std` feature provides [`SystemClock`]; tests
/// and simulations can substitute their own.
pub trait Clock {
    /// Reads the current wall and monotonic clocks.
    fn read(&self) -> ClockReading;
}

/// The [`Clock`] backed by the operating system.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn read(&self) -> ClockReading {
        use std::time::{
            Instant as MonotonicInstant, SystemTime, UNIX_EPOCH,
        };

        // The monotonic clock anchors at the first reading taken by this
        // process, which keeps the counter small.
        static ANCHOR: std::sync::OnceLock<MonotonicInstant> =
            std::sync::OnceLock::new();
        let anchor = *ANCHOR.get_or_init(MonotonicInstant::now);
        let monotonic = anchor.elapsed().as_nanos() as u64;

        let (unix_second, nanosecond) =
            match SystemTime::now().duration_since(UNIX_EPOCH) {
                Ok(d) => (d.as_secs() as i64, d.subsec_nanos() as i32),
                Err(err) => {
                    // The system clock is set before 1970.
                    let d = err.duration();
                    let mut sec = -(d.as_secs() as i64);
                    let mut nsec = -(d.subsec_nanos() as i32);
                    if nsec < 0 {
                        sec -= 1;
                        nsec += 1_000_000_000;
                    }
                    (sec, nsec)
                }
            };
        ClockReading { unix_second, nanosecond, monotonic }
    }
}

/// A point in time with nanosecond precision.
///
/// An instant records a wall clock reading and, when it came from
/// [`Instant::now`], a monotonic clock reading as well. Ordering and
/// subtraction prefer the monotonic reading when both operands carry one,
/// so elapsed-time measurement is immune to wall clock steps. Equality
/// always uses the wall reading.
///
/// An instant may borrow a [`Location`] that places it in a time zone for
/// presentation. No location means UTC. Attaching a location never changes
/// the point in time an instant denotes, only how its calendar fields
/// read.
///
/// # Representation
///
/// Two words. `wall` packs a monotonic-present flag (1 bit), seconds
/// since 1885 when the flag is set (33 bits) and the nanosecond within
/// the second (30 bits). When the flag is set `ext` is the monotonic
/// reading; when clear, `ext` holds the full seconds since year 1 and the
/// 33-bit field goes unused. Instants outside the 33-bit window
/// (1885..2157) are always stored in the flag-clear form, so the common
/// case stays compact without limiting the representable range.
///
/// ```
/// use tempo::Instant;
///
/// let instant = Instant::unix(1_221_681_866, 0, None);
/// assert_eq!(instant.format("2006-01-02 15:04:05"), "2008-09-17 20:04:26");
/// ```
#[derive(Clone, Copy)]
pub struct Instant<'t> {
    wall: u64,
    ext: i64,
    loc: Option<&'t Location>,
}

impl<'t> Instant<'t> {
    /// Creates the instant `sec` seconds and `nsec` nanoseconds after the
    /// Unix epoch, in the location given.
    ///
    /// `nsec` may lie outside `[0, 10^9)`; it is normalized by carrying
    /// whole seconds into `sec`. This constructor is total: seconds
    /// beyond the representable wall range wrap explicitly rather than
    /// failing.
    pub fn unix(
        mut sec: i64,
        mut nsec: i64,
        loc: Option<&'t Location>,
    ) -> Instant<'t> {
        if !(0..1_000_000_000).contains(&nsec) {
            sec = sec.wrapping_add(nsec.div_euclid(1_000_000_000));
            nsec = nsec.rem_euclid(1_000_000_000);
        }
        Instant {
            wall: nsec as u64,
            ext: sec.wrapping_add(civil::UNIX_TO_INTERNAL),
            loc,
        }
    }

    /// Reads the clock given and returns the current instant in the
    /// location given.
    ///
    /// The result carries the monotonic reading whenever the wall second
    /// fits the compact window (1885 through 2157), which it always does
    /// for a sanely set system clock.
    pub fn now(clock: &dyn Clock, loc: Option<&'t Location>) -> Instant<'t> {
        let reading = clock.read();
        let sec = reading
            .unix_second
            .wrapping_add(civil::UNIX_TO_INTERNAL - MIN_WALL);
        if (sec as u64) >> 33 != 0 {
            // The wall second does not fit the 33-bit field; store the
            // expanded form and drop the monotonic reading.
            return Instant {
                wall: reading.nanosecond as u64,
                ext: sec.wrapping_add(MIN_WALL),
                loc,
            };
        }
        Instant {
            wall: HAS_MONOTONIC
                | ((sec as u64) << NSEC_SHIFT)
                | (reading.nanosecond as u64),
            ext: reading.monotonic as i64,
            loc,
        }
    }

    /// Returns this instant with the location given attached. The point
    /// in time is unchanged.
    pub fn with_location<'u>(self, loc: &'u Location) -> Instant<'u> {
        Instant { wall: self.wall, ext: self.ext, loc: Some(loc) }
    }

    /// Returns this instant presented in UTC.
    pub fn to_utc(self) -> Instant<'static> {
        Instant { wall: self.wall, ext: self.ext, loc: None }
    }

    /// Returns the location this instant presents itself in, if one is
    /// attached.
    #[inline]
    pub fn location(&self) -> Option<&'t Location> {
        self.loc
    }

    fn has_monotonic(&self) -> bool {
        self.wall & HAS_MONOTONIC != 0
    }

    /// The nanosecond within the second, in `[0, 10^9)`.
    #[inline]
    pub fn nanosecond(&self) -> i32 {
        (self.wall & NSEC_MASK) as i32
    }

    /// Seconds since the internal epoch (year 1).
    fn sec(&self) -> i64 {
        if self.has_monotonic() {
            MIN_WALL + ((self.wall << 1) >> (NSEC_SHIFT + 1)) as i64
        } else {
            self.ext
        }
    }

    /// Seconds since the Unix epoch.
    #[inline]
    pub fn unix_second(&self) -> i64 {
        self.sec().wrapping_add(civil::INTERNAL_TO_UNIX)
    }

    /// Discards the monotonic reading, if any, keeping the wall reading.
    fn strip_monotonic(&mut self) {
        if self.has_monotonic() {
            self.ext = self.sec();
            self.wall &= NSEC_MASK;
        }
    }

    /// Adds `d` seconds to the wall reading.
    fn add_sec(&mut self, d: i64) {
        if self.has_monotonic() {
            let sec = ((self.wall << 1) >> (NSEC_SHIFT + 1)) as i64;
            // `sec` is at most 2^33, so the wrapping sum can only land
            // back inside the window when no overflow occurred.
            let dsec = sec.wrapping_add(d);
            if (0..=(1 << 33) - 1).contains(&dsec) {
                self.wall = (self.wall & NSEC_MASK)
                    | ((dsec as u64) << NSEC_SHIFT)
                    | HAS_MONOTONIC;
                return;
            }
            // The new wall second no longer fits the compact form.
            self.strip_monotonic();
        }
        match self.ext.checked_add(d) {
            Some(sum) => self.ext = sum,
            // Saturate at the ends of the representation.
            None if d > 0 => self.ext = i64::MAX,
            None => self.ext = -i64::MAX,
        }
    }

    /// Returns true if this instant is the zero instant, January 1 of
    /// year 1 at 00:00:00 UTC.
    pub fn is_zero(&self) -> bool {
        self.sec() == 0 && self.nanosecond() == 0
    }

    /// Returns true if this instant is before `other`.
    ///
    /// When both instants carry a monotonic reading, the monotonic
    /// readings decide.
    pub fn before(&self, other: Instant<'_>) -> bool {
        if self.has_monotonic() && other.has_monotonic() {
            return self.ext < other.ext;
        }
        let (ts, us) = (self.sec(), other.sec());
        ts < us || (ts == us && self.nanosecond() < other.nanosecond())
    }

    /// Returns true if this instant is after `other`.
    ///
    /// When both instants carry a monotonic reading, the monotonic
    /// readings decide.
    pub fn after(&self, other: Instant<'_>) -> bool {
        other.before(*self)
    }

    /// Returns true if this instant and `other` denote the same point in
    /// wall clock time. Monotonic readings are ignored: two instants can
    /// be equal even if only one of them carries one.
    pub fn equal(&self, other: Instant<'_>) -> bool {
        self.sec() == other.sec()
            && self.nanosecond() == other.nanosecond()
    }

    /// Orders this instant against `other`, preferring the monotonic
    /// readings when both are present.
    pub fn compare(&self, other: Instant<'_>) -> core::cmp::Ordering {
        use core::cmp::Ordering;

        if self.before(other) {
            Ordering::Less
        } else if self.after(other) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Returns this instant shifted by the duration given.
    ///
    /// The monotonic reading, when present, shifts by the same amount, and
    /// is dropped if either side of the representation leaves its range.
    /// The wall reading saturates at the ends of the representable range.
    pub fn add(self, d: Duration) -> Instant<'t> {
        let mut t = self;
        let d_nanos = d.as_nanos();
        let mut dsec = d_nanos / 1_000_000_000;
        let mut nsec = t.nanosecond() + ((d_nanos % 1_000_000_000) as i32);
        if nsec >= 1_000_000_000 {
            dsec += 1;
            nsec -= 1_000_000_000;
        } else if nsec < 0 {
            dsec -= 1;
            nsec += 1_000_000_000;
        }
        t.wall = (t.wall & !NSEC_MASK) | (nsec as u64);
        t.add_sec(dsec);
        if t.has_monotonic() {
            match t.ext.checked_add(d_nanos) {
                Some(ext) => t.ext = ext,
                // The monotonic reading overflowed; degrade to wall only.
                None => t.strip_monotonic(),
            }
        }
        t
    }

    /// Returns the duration from `other` to this instant.
    ///
    /// When both instants carry a monotonic reading, the difference of
    /// the monotonic readings is returned. Differences that exceed the
    /// range of a [`Duration`] saturate at [`Duration::MIN`] or
    /// [`Duration::MAX`].
    pub fn since(self, other: Instant<'_>) -> Duration {
        if self.has_monotonic() && other.has_monotonic() {
            return sub_monotonic(self.ext, other.ext);
        }
        let d = Duration::from_nanos(
            self.sec()
                .wrapping_sub(other.sec())
                .wrapping_mul(1_000_000_000)
                .wrapping_add(
                    (self.nanosecond() - other.nanosecond()) as i64,
                ),
        );
        // The wrapping arithmetic above is exact whenever the true
        // difference is representable; verify and saturate otherwise.
        if other.add(d).equal(self) {
            d
        } else if self.before(other) {
            Duration::MIN
        } else {
            Duration::MAX
        }
    }

    /// The absolute second this instant falls on, adjusted for the zone
    /// in effect. Calendar presentation works on this value.
    pub(crate) fn abs_second(&self) -> u64 {
        let mut sec = self.unix_second();
        if let Some(loc) = self.loc {
            sec = sec.wrapping_add(i64::from(loc.offset_at(sec)));
        }
        civil::unix_to_absolute(sec)
    }

    /// The calendar date of this instant in its zone.
    pub fn date(&self) -> Date {
        let (year, month, day, _) = civil::abs_date(self.abs_second(), true);
        Date { year, month, day }
    }

    /// The year of this instant in its zone.
    pub fn year(&self) -> i64 {
        let (year, _, _, _) = civil::abs_date(self.abs_second(), false);
        year
    }

    /// The month of this instant in its zone.
    pub fn month(&self) -> Month {
        self.date().month
    }

    /// The day of the month of this instant in its zone.
    pub fn day(&self) -> i8 {
        self.date().day
    }

    /// The day of the week of this instant in its zone.
    pub fn weekday(&self) -> Weekday {
        civil::abs_weekday(self.abs_second())
    }

    /// The day of the year of this instant in its zone, in `1..=366`.
    pub fn year_day(&self) -> i32 {
        let (_, _, _, yday) = civil::abs_date(self.abs_second(), false);
        yday + 1
    }

    /// The wall clock time of this instant in its zone.
    pub fn clock(&self) -> Time {
        civil::abs_clock(self.abs_second())
    }

    /// The hour of this instant in its zone, in `0..=23`.
    pub fn hour(&self) -> i8 {
        self.clock().hour
    }

    /// The minute of this instant in its zone, in `0..=59`.
    pub fn minute(&self) -> i8 {
        self.clock().minute
    }

    /// The second of this instant in its zone, in `0..=59`.
    pub fn second(&self) -> i8 {
        self.clock().second
    }

    /// The ISO 8601 week this instant falls in, in its zone.
    pub fn iso_week(&self) -> IsoWeek {
        let abs = self.abs_second();
        let (year, month, day, yday) = civil::abs_date(abs, true);
        civil::iso_week(year, month, day, yday, civil::abs_weekday(abs))
    }

    /// The abbreviation and offset of the zone in effect at this instant,
    /// e.g. `("PDT", -25200)`. Instants without a location report
    /// `("UTC", 0)`.
    pub fn zone(&self) -> (&'t str, i32) {
        match self.loc {
            None => ("UTC", 0),
            Some(loc) => {
                let detail = loc.lookup(self.unix_second());
                (detail.name, detail.offset)
            }
        }
    }

    /// Renders this instant according to the layout given. See the crate
    /// documentation for the layout language and [`crate::RFC3339`] and
    /// friends for common layouts.
    pub fn format(&self, layout: &str) -> alloc::string::String {
        let mut out = alloc::string::String::with_capacity(layout.len() + 10);
        // OK because writing into a `String` never fails.
        fmt::format::format_instant(self, layout, &mut out).unwrap();
        out
    }

    /// Like [`Instant::format`], but writing to the writer given.
    pub fn format_into<W: fmt::Write>(
        &self,
        layout: &str,
        wtr: &mut W,
    ) -> Result<(), Error> {
        fmt::format::format_instant(self, layout, wtr)
    }
}

/// The difference of two monotonic readings, saturated to the `Duration`
/// range.
fn sub_monotonic(t: i64, u: i64) -> Duration {
    let d = t.wrapping_sub(u);
    if d < 0 && t > u {
        Duration::MAX
    } else if d > 0 && t < u {
        Duration::MIN
    } else {
        Duration::from_nanos(d)
    }
}

impl<'t> core::ops::Add<Duration> for Instant<'t> {
    type Output = Instant<'t>;

    fn add(self, rhs: Duration) -> Instant<'t> {
        Instant::add(self, rhs)
    }
}

impl<'t> core::ops::Sub<Duration> for Instant<'t> {
    type Output = Instant<'t>;

    fn sub(self, rhs: Duration) -> Instant<'t> {
        Instant::add(self, -rhs)
    }
}

impl core::ops::Sub<Instant<'_>> for Instant<'_> {
    type Output = Duration;

    fn sub(self, rhs: Instant<'_>) -> Duration {
        self.since(rhs)
    }
}

impl core::fmt::Display for Instant<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut wtr = fmt::StdFmtWrite(f);
        fmt::format::format_instant(self, fmt::format::DEFAULT, &mut wtr)
            .map_err(|_| core::fmt::Error)
    }
}

impl core::fmt::Debug for Instant<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Instant")
            .field("unix_second", &self.unix_second())
            .field("nanosecond", &self.nanosecond())
            .field("monotonic", &self.has_monotonic())
            .field("location", &self.loc.map(Location::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::{
        civil::{Month, Time, Weekday},
        tz::testdata::pacific,
    };

    use super::*;

    /// A clock that always returns the same reading.
    struct FixedClock(ClockReading);

    impl Clock for FixedClock {
        fn read(&self) -> ClockReading {
            self.0
        }
    }

    fn reading(unix_second: i64, nanosecond: i32, monotonic: u64) -> FixedClock {
        FixedClock(ClockReading { unix_second, nanosecond, monotonic })
    }

    #[test]
    fn unix_epoch_fields() {
        let t = Instant::unix(0, 0, None);
        assert_eq!(t.unix_second(), 0);
        assert_eq!(t.nanosecond(), 0);
        let date = t.date();
        assert_eq!((date.year, date.month, date.day), (1970, Month::January, 1));
        assert_eq!(t.clock(), Time { hour: 0, minute: 0, second: 0 });
        assert_eq!(t.weekday(), Weekday::Thursday);
        assert_eq!(t.zone(), ("UTC", 0));
        assert_eq!(t.year_day(), 1);
    }

    #[test]
    fn fractional_second() {
        let t = Instant::unix(0, 100_000_000, None);
        assert_eq!(t.unix_second(), 0);
        assert_eq!(t.nanosecond(), 100_000_000);
        assert_eq!(t.weekday(), Weekday::Thursday);
    }

    #[test]
    fn pacific_afternoon() {
        let loc = pacific();
        let t = Instant::unix(1_221_681_866, 0, Some(&loc));
        let date = t.date();
        assert_eq!(
            (date.year, date.month, date.day),
            (2008, Month::September, 17),
        );
        assert_eq!(t.clock(), Time { hour: 13, minute: 4, second: 26 });
        assert_eq!(t.weekday(), Weekday::Wednesday);
        assert_eq!(t.zone(), ("PDT", -25200));
    }

    #[test]
    fn pacific_epoch_is_previous_evening() {
        let loc = pacific();
        let t = Instant::unix(0, 0, Some(&loc));
        let date = t.date();
        assert_eq!(
            (date.year, date.month, date.day),
            (1969, Month::December, 31),
        );
        assert_eq!(t.clock(), Time { hour: 16, minute: 0, second: 0 });
        assert_eq!(t.weekday(), Weekday::Wednesday);
        assert_eq!(t.zone(), ("PST", -28800));
    }

    #[test]
    fn location_attachment_preserves_instant() {
        let loc = pacific();
        let utc = Instant::unix(1_221_681_866, 500, None);
        let local = utc.with_location(&loc);
        assert!(utc.equal(local));
        assert_eq!(local.unix_second(), utc.unix_second());
        assert!(local.to_utc().equal(utc));
        assert_eq!(local.location().map(|l| l.name()), Some("US/Pacific"));
    }

    #[test]
    fn nanosecond_normalization() {
        let t = Instant::unix(0, 1_233_810_057_012_345_600, None);
        assert_eq!(t.unix_second(), 1_233_810_057);
        assert_eq!(t.nanosecond(), 12_345_600);

        let t = Instant::unix(0, -1, None);
        assert_eq!(t.unix_second(), -1);
        assert_eq!(t.nanosecond(), 999_999_999);

        let t = Instant::unix(5, 2_000_000_001, None);
        assert_eq!(t.unix_second(), 7);
        assert_eq!(t.nanosecond(), 1);
    }

    #[test]
    fn now_carries_monotonic_in_window() {
        let a = Instant::now(&reading(1_000_000, 1, 50), None);
        let b = Instant::now(&reading(1_000_000, 1, 70), None);
        assert!(a.has_monotonic());
        // Same wall reading, later monotonic reading: ordering uses the
        // monotonic clock, equality uses the wall clock.
        assert!(a.before(b));
        assert!(b.after(a));
        assert!(a.equal(b));
        assert_eq!(b.since(a), Duration::from_nanos(20));
        assert_eq!(a.since(b), Duration::from_nanos(-20));
    }

    #[test]
    fn now_outside_window_is_wall_only() {
        // The year 2200 is past the 33-bit window.
        let t = Instant::now(&reading(7_260_000_000, 0, 99), None);
        assert!(!t.has_monotonic());
        assert_eq!(t.unix_second(), 7_260_000_000);
        // Before 1885 likewise.
        let t = Instant::now(&reading(-3_000_000_000, 0, 99), None);
        assert!(!t.has_monotonic());
        assert_eq!(t.unix_second(), -3_000_000_000);
    }

    #[test]
    fn mixed_monotonic_comparison_uses_wall() {
        let mono = Instant::now(&reading(1_000, 0, 5), None);
        let wall = Instant::unix(999, 0, None);
        assert!(wall.before(mono));
        assert!(mono.after(wall));
        assert!(Instant::unix(1_000, 0, None).equal(mono));
    }

    #[test]
    fn add_preserves_monotonic_delta() {
        let t = Instant::now(&reading(1_000_000, 500, 80), None);
        let u = t.add(Duration::SECOND * 90);
        assert!(u.has_monotonic());
        assert_eq!(u.unix_second(), 1_090_000);
        assert_eq!(u.since(t), Duration::SECOND * 90);
        let v = u.add(-Duration::SECOND * 90);
        assert!(v.equal(t));
        assert_eq!(v.since(t), Duration::ZERO);
    }

    #[test]
    fn add_carries_nanoseconds() {
        let t = Instant::unix(10, 999_999_999, None);
        let u = t.add(Duration::from_nanos(2));
        assert_eq!(u.unix_second(), 11);
        assert_eq!(u.nanosecond(), 1);
        let v = u.add(Duration::from_nanos(-2));
        assert!(v.equal(t));
    }

    #[test]
    fn add_beyond_window_strips_monotonic() {
        let t = Instant::now(&reading(1_000_000, 0, 80), None);
        assert!(t.has_monotonic());
        // Jump three centuries ahead: the compact form no longer fits.
        let far = t.add(Duration::HOUR * 24 * 365 * 290);
        assert!(!far.has_monotonic());
        // The wall arithmetic is still exact.
        assert_eq!(
            far.unix_second(),
            1_000_000 + 290 * 365 * 24 * 3600,
        );
    }

    #[test]
    fn since_uses_wall_without_monotonic() {
        let a = Instant::unix(100, 500, None);
        let b = Instant::unix(90, 250, None);
        assert_eq!(a.since(b), Duration::from_nanos(10_000_000_250));
        assert_eq!(b.since(a), Duration::from_nanos(-10_000_000_250));
        assert_eq!((a - b).as_nanos(), 10_000_000_250);
    }

    #[test]
    fn since_saturates() {
        let a = Instant::unix(i64::MAX / 1_000_000_000 + 10, 0, None);
        let b = Instant::unix(0, 0, None);
        assert_eq!(a.since(b), Duration::MAX);
        assert_eq!(b.since(a), Duration::MIN);
    }

    #[test]
    fn operator_sugar() {
        let t = Instant::unix(50, 0, None);
        let u = t + Duration::SECOND * 10;
        assert_eq!(u.unix_second(), 60);
        let v = u - Duration::SECOND * 25;
        assert_eq!(v.unix_second(), 35);
        assert_eq!(u - v, Duration::SECOND * 25);
    }

    #[test]
    fn is_zero_is_year_one() {
        let t = Instant::unix(-civil::UNIX_TO_INTERNAL, 0, None);
        assert!(t.is_zero());
        assert!(!Instant::unix(0, 0, None).is_zero());
        let date = t.date();
        assert_eq!((date.year, date.month, date.day), (1, Month::January, 1));
    }

    #[test]
    fn iso_week_accessor() {
        let t = Instant::unix(1_230_681_600, 0, None); // 2008-12-31
        let week = t.iso_week();
        assert_eq!((week.year, week.week), (2009, 1));
    }

    #[test]
    fn display_uses_default_layout() {
        let loc = pacific();
        let t = Instant::unix(1_233_810_057, 12_345_600, Some(&loc));
        assert_eq!(
            t.to_string(),
            "2009-02-04 21:00:57.0123456 -0800 PST",
        );
        let t = Instant::unix(0, 0, None);
        assert_eq!(t.to_string(), "1970-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn compare_ordering() {
        use core::cmp::Ordering;

        let a = Instant::unix(1, 0, None);
        let b = Instant::unix(2, 0, None);
        assert_eq!(a.compare(b), Ordering::Less);
        assert_eq!(b.compare(a), Ordering::Greater);
        assert_eq!(a.compare(a), Ordering::Equal);
    }

    quickcheck::quickcheck! {
        fn prop_unix_seconds_roundtrip(sec: i64) -> quickcheck::TestResult {
            // Stay inside the representable wall range.
            if sec.checked_add(civil::UNIX_TO_INTERNAL).is_none() {
                return quickcheck::TestResult::discard();
            }
            let t = Instant::unix(sec, 0, None);
            quickcheck::TestResult::from_bool(t.unix_second() == sec)
        }

        fn prop_normalization(sec: i32, nsec: i64) -> bool {
            let t = Instant::unix(i64::from(sec), nsec, None);
            let total = i128::from(sec) * 1_000_000_000 + i128::from(nsec);
            (0..1_000_000_000).contains(&t.nanosecond())
                && i128::from(t.unix_second()) * 1_000_000_000
                    + i128::from(t.nanosecond())
                    == total
        }

        fn prop_monotonic_ordering(m1: u32, m2: u32) -> bool {
            let a = Instant::now(&FixedClock(ClockReading {
                unix_second: 1_000,
                nanosecond: 0,
                monotonic: u64::from(m1),
            }), None);
            let b = Instant::now(&FixedClock(ClockReading {
                unix_second: 2_000,
                nanosecond: 0,
                monotonic: u64::from(m2),
            }), None);
            a.before(b) == (m1 < m2) && a.after(b) == (m1 > m2)
        }

        fn prop_add_then_subtract(
            sec: i32,
            nanos: i64
        ) -> quickcheck::TestResult {
            // `-nanos` must be representable for the round trip to hold.
            if nanos == i64::MIN {
                return quickcheck::TestResult::discard();
            }
            let t = Instant::unix(i64::from(sec), 0, None);
            let d = Duration::from_nanos(nanos);
            let u = t.add(d);
            quickcheck::TestResult::from_bool(
                u.since(t) == d && u.add(-d).equal(t),
            )
        }
    }
}
