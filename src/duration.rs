use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A signed duration of time, counted in nanoseconds.
///
/// The representation is a single 64-bit integer, which bounds the
/// representable range to roughly ±292 years. Arithmetic on durations may
/// overflow; overflow is the caller's concern. The operator impls wrap, and
/// [`Duration::checked_add`] and [`Duration::checked_sub`] are available
/// when overflow needs to be detected.
///
/// # Rendering
///
/// The `Display` impl renders a duration in terms of the largest of the
/// `h`, `m` and `s` components that fit, e.g. `1h30m0.5s`. Durations below
/// one second use a `ns`, `µs` or `ms` unit chosen so that the integer part
/// has one to three digits. Fractions never carry trailing zeros. Days and
/// larger units are never emitted.
///
/// ```
/// use tempo::Duration;
///
/// assert_eq!((Duration::MINUTE * 4 + Duration::SECOND * 5).to_string(), "4m5s");
/// assert_eq!((Duration::MICROSECOND * 1100).to_string(), "1.1ms");
/// assert_eq!(Duration::from_nanos(-1100).to_string(), "-1.1µs");
/// ```
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct Duration(i64);

impl Duration {
    /// A duration of zero length.
    pub const ZERO: Duration = Duration(0);

    /// The minimum representable duration, about -292 years.
    pub const MIN: Duration = Duration(i64::MIN);

    /// The maximum representable duration, about 292 years.
    pub const MAX: Duration = Duration(i64::MAX);

    /// One nanosecond.
    pub const NANOSECOND: Duration = Duration(1);

    /// One microsecond.
    pub const MICROSECOND: Duration = Duration(1_000);

    /// One millisecond.
    pub const MILLISECOND: Duration = Duration(1_000_000);

    /// One second.
    pub const SECOND: Duration = Duration(1_000_000_000);

    /// One minute.
    pub const MINUTE: Duration = Duration(60 * 1_000_000_000);

    /// One hour.
    pub const HOUR: Duration = Duration(3_600 * 1_000_000_000);

    /// Creates a duration from a count of nanoseconds.
    #[inline]
    pub const fn from_nanos(nanoseconds: i64) -> Duration {
        Duration(nanoseconds)
    }

    /// Returns this duration as a count of nanoseconds.
    #[inline]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Returns this duration as a count of whole microseconds.
    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0 / 1_000
    }

    /// Returns this duration as a count of whole milliseconds.
    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.0 / 1_000_000
    }

    /// Returns this duration as a count of whole seconds.
    #[inline]
    pub const fn as_secs(self) -> i64 {
        self.0 / 1_000_000_000
    }

    /// Returns this duration as a fractional number of seconds.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        let sec = self.0 / 1_000_000_000;
        let nsec = self.0 % 1_000_000_000;
        (sec as f64) + (nsec as f64) / 1e9
    }

    /// Returns true if this duration has zero length.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns the absolute value of this duration.
    ///
    /// Since the representation is a two's complement integer,
    /// `Duration::MIN` has no positive counterpart and saturates to
    /// `Duration::MAX`.
    #[inline]
    pub const fn abs(self) -> Duration {
        if self.0 >= 0 {
            self
        } else if self.0 == i64::MIN {
            Duration::MAX
        } else {
            Duration(-self.0)
        }
    }

    /// Adds two durations, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, rhs: Duration) -> Option<Duration> {
        match self.0.checked_add(rhs.0) {
            Some(nanos) => Some(Duration(nanos)),
            None => None,
        }
    }

    /// Subtracts two durations, returning `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, rhs: Duration) -> Option<Duration> {
        match self.0.checked_sub(rhs.0) {
            Some(nanos) => Some(Duration(nanos)),
            None => None,
        }
    }
}

impl Add for Duration {
    type Output = Duration;

    #[inline]
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Duration {
    #[inline]
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Duration {
    #[inline]
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Neg for Duration {
    type Output = Duration;

    #[inline]
    fn neg(self) -> Duration {
        Duration(self.0.wrapping_neg())
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    #[inline]
    fn mul(self, rhs: i64) -> Duration {
        Duration(self.0.wrapping_mul(rhs))
    }
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        // The longest possible rendering is -2562047h47m16.854775808s,
        // which is 25 bytes. The text is built from the tail of the buffer
        // towards the front.
        let mut buf = [0u8; 32];
        let mut w = buf.len();
        let mut u = self.0.unsigned_abs();
        let neg = self.0 < 0;
        if u < 1_000_000_000 {
            // Sub-second: pick a unit so the integer part has 1..=3 digits.
            let prec;
            w -= 1;
            buf[w] = b's';
            w -= 1;
            if u < 1_000 {
                prec = 0;
                buf[w] = b'n';
            } else if u < 1_000_000 {
                prec = 3;
                // U+00B5 'µ' micro sign needs two bytes.
                w -= 1;
                buf[w] = 0xC2;
                buf[w + 1] = 0xB5;
            } else {
                prec = 6;
                buf[w] = b'm';
            }
            let (nw, v) = fmt_frac(&mut buf, w, u, prec);
            w = fmt_int(&mut buf, nw, v);
        } else {
            w -= 1;
            buf[w] = b's';
            let (nw, nu) = fmt_frac(&mut buf, w, u, 9);
            w = nw;
            u = nu;
            w = fmt_int(&mut buf, w, u % 60);
            u /= 60;
            if u > 0 {
                w -= 1;
                buf[w] = b'm';
                w = fmt_int(&mut buf, w, u % 60);
                u /= 60;
                if u > 0 {
                    w -= 1;
                    buf[w] = b'h';
                    w = fmt_int(&mut buf, w, u);
                }
            }
        }
        if neg {
            w -= 1;
            buf[w] = b'-';
        }
        // OK because everything written above is ASCII except the two byte
        // micro sign, which is itself valid UTF-8.
        f.write_str(core::str::from_utf8(&buf[w..]).unwrap())
    }
}

/// Writes the `prec` least significant decimal digits of `v` as a fraction
/// (with leading `.`) into the tail of `buf` ending at `w`, omitting
/// trailing zeros. Returns the new write position and `v` with the
/// fractional digits divided out.
fn fmt_frac(
    buf: &mut [u8; 32],
    mut w: usize,
    mut v: u64,
    prec: usize,
) -> (usize, u64) {
    let mut print = false;
    for _ in 0..prec {
        let digit = v % 10;
        print = print || digit != 0;
        if print {
            w -= 1;
            buf[w] = b'0' + (digit as u8);
        }
        v /= 10;
    }
    if print {
        w -= 1;
        buf[w] = b'.';
    }
    (w, v)
}

/// Writes the decimal digits of `v` into the tail of `buf` ending at `w`
/// and returns the new write position.
fn fmt_int(buf: &mut [u8; 32], mut w: usize, mut v: u64) -> usize {
    if v == 0 {
        w -= 1;
        buf[w] = b'0';
    } else {
        while v > 0 {
            w -= 1;
            buf[w] = b'0' + ((v % 10) as u8);
            v /= 10;
        }
    }
    w
}
