/*!
The layout driven formatter and the standard layout constants.

Rendering walks a layout with the tokenizer, copies literal prefixes
through untouched and dispatches on each chunk. Calendar fields are
computed from the instant's zone adjusted absolute second at most once,
the first time a chunk needs them.
*/

use crate::{
    civil::{self, Month, Time},
    error::Error,
    fmt::{
        layout::{next_chunk, Chunk},
        util::{DecimalFormatter, FractionalFormatter},
        Write,
    },
    instant::Instant,
};

pub const ANSIC: &str = "Mon Jan _2 15:04:05 2006";
pub const UNIX_DATE: &str = "Mon Jan _2 15:04:05 MST 2006";
pub const RUBY_DATE: &str = "Mon Jan 02 15:04:05 -0700 2006";
pub const RFC822: &str = "02 Jan 06 15:04 MST";
pub const RFC822Z: &str = "02 Jan 06 15:04 -0700";
pub const RFC850: &str = "Monday, 02-Jan-06 15:04:05 MST";
pub const RFC1123: &str = "Mon, 02 Jan 2006 15:04:05 MST";
pub const RFC1123Z: &str = "Mon, 02 Jan 2006 15:04:05 -0700";
pub const RFC3339: &str = "2006-01-02T15:04:05Z07:00";
pub const RFC3339_NANO: &str = "2006-01-02T15:04:05.999999999Z07:00";
pub const KITCHEN: &str = "3:04PM";

/// Handy timestamp layouts.
pub const STAMP: &str = "Jan _2 15:04:05";
pub const STAMP_MILLI: &str = "Jan _2 15:04:05.000";
pub const STAMP_MICRO: &str = "Jan _2 15:04:05.000000";
pub const STAMP_NANO: &str = "Jan _2 15:04:05.000000000";

/// The layout used by an instant's `Display` impl.
pub(crate) const DEFAULT: &str = "2006-01-02 15:04:05.999999999 -0700 MST";

/// Renders `instant` according to `layout`, writing the output to `wtr`.
pub(crate) fn format_instant<W: Write>(
    instant: &Instant<'_>,
    layout: &str,
    wtr: &mut W,
) -> Result<(), Error> {
    let (zone_name, offset) = instant.zone();
    let abs = instant.abs_second();
    // Calendar fields are computed at most once, when first needed.
    let mut date: Option<(i64, Month, i8, i32)> = None;
    let mut clock: Option<Time> = None;

    let mut rest = layout;
    loop {
        let (prefix, chunk, suffix) = next_chunk(rest);
        if !prefix.is_empty() {
            wtr.write_str(prefix)?;
        }
        if chunk == Chunk::None {
            return Ok(());
        }
        rest = suffix;

        let date = &mut date;
        let clock = &mut clock;
        let mut date =
            move || *date.get_or_insert_with(|| civil::abs_date(abs, true));
        let mut clock =
            move || *clock.get_or_insert_with(|| civil::abs_clock(abs));
        match chunk {
            Chunk::None => unreachable!("handled above"),
            Chunk::LongMonth => wtr.write_str(date().1.name())?,
            Chunk::Month => wtr.write_str(&date().1.name()[..3])?,
            Chunk::NumMonth => {
                write_int(wtr, i64::from(date().1.number()), 0)?
            }
            Chunk::ZeroMonth => {
                write_int(wtr, i64::from(date().1.number()), 2)?
            }
            Chunk::LongWeekday => {
                wtr.write_str(civil::abs_weekday(abs).name())?
            }
            Chunk::Weekday => {
                wtr.write_str(&civil::abs_weekday(abs).name()[..3])?
            }
            Chunk::Day => write_int(wtr, i64::from(date().2), 0)?,
            Chunk::ZeroDay => write_int(wtr, i64::from(date().2), 2)?,
            Chunk::UnderDay => {
                write_int_space_pad(wtr, i64::from(date().2), 2)?
            }
            Chunk::UnderYearDay => {
                write_int_space_pad(wtr, i64::from(date().3) + 1, 3)?
            }
            Chunk::ZeroYearDay => {
                write_int(wtr, i64::from(date().3) + 1, 3)?
            }
            Chunk::Hour => write_int(wtr, i64::from(clock().hour), 2)?,
            Chunk::Hour12 | Chunk::ZeroHour12 => {
                let mut hour = clock().hour % 12;
                if hour == 0 {
                    hour = 12;
                }
                let width = if chunk == Chunk::ZeroHour12 { 2 } else { 0 };
                write_int(wtr, i64::from(hour), width)?;
            }
            Chunk::Minute => write_int(wtr, i64::from(clock().minute), 0)?,
            Chunk::ZeroMinute => {
                write_int(wtr, i64::from(clock().minute), 2)?
            }
            Chunk::Second => write_int(wtr, i64::from(clock().second), 0)?,
            Chunk::ZeroSecond => {
                write_int(wtr, i64::from(clock().second), 2)?
            }
            Chunk::LongYear => write_int(wtr, date().0, 4)?,
            Chunk::Year => write_int(wtr, (date().0 % 100).abs(), 2)?,
            Chunk::PM => {
                wtr.write_str(if clock().hour >= 12 { "PM" } else { "AM" })?
            }
            Chunk::Pm => {
                wtr.write_str(if clock().hour >= 12 { "pm" } else { "am" })?
            }
            Chunk::TZ => {
                if !zone_name.is_empty() {
                    wtr.write_str(zone_name)?;
                } else {
                    // No abbreviation known for this time, but we must
                    // print something. Use the ±HHMM form.
                    let mut minutes = offset / 60;
                    if minutes < 0 {
                        wtr.write_char('-')?;
                        minutes = -minutes;
                    } else {
                        wtr.write_char('+')?;
                    }
                    write_int(wtr, i64::from(minutes / 60), 2)?;
                    write_int(wtr, i64::from(minutes % 60), 2)?;
                }
            }
            Chunk::NumTZ
            | Chunk::NumShortTZ
            | Chunk::NumColonTZ
            | Chunk::NumSecondsTZ
            | Chunk::NumColonSecondsTZ
            | Chunk::IsoTZ
            | Chunk::IsoShortTZ
            | Chunk::IsoColonTZ
            | Chunk::IsoSecondsTZ
            | Chunk::IsoColonSecondsTZ => write_offset(wtr, chunk, offset)?,
            Chunk::FracSecond0 { digits, separator } => {
                let formatter = FractionalFormatter {
                    precision: digits,
                    separator,
                    trim: false,
                };
                wtr.write_str(
                    formatter.format(instant.nanosecond()).as_str(),
                )?;
            }
            Chunk::FracSecond9 { digits, separator } => {
                let formatter = FractionalFormatter {
                    precision: digits,
                    separator,
                    trim: true,
                };
                wtr.write_str(
                    formatter.format(instant.nanosecond()).as_str(),
                )?;
            }
        }
    }
}

fn write_int<W: Write>(
    wtr: &mut W,
    value: i64,
    width: u8,
) -> Result<(), Error> {
    let formatter = DecimalFormatter::new().padding(width);
    wtr.write_str(formatter.format(value).as_str())
}

fn write_int_space_pad<W: Write>(
    wtr: &mut W,
    value: i64,
    width: u8,
) -> Result<(), Error> {
    let formatter =
        DecimalFormatter::new().padding(width).padding_byte(b' ');
    wtr.write_str(formatter.format(value).as_str())
}

/// Renders a UTC offset chunk. `offset` is in seconds east of UTC.
///
/// The ISO variants render a zero offset as a lone `Z`. Otherwise the
/// output is a sign, two hour digits and, depending on the variant, a
/// colon, two minute digits and two second digits.
fn write_offset<W: Write>(
    wtr: &mut W,
    chunk: Chunk,
    offset: i32,
) -> Result<(), Error> {
    if offset == 0
        && matches!(
            chunk,
            Chunk::IsoTZ
                | Chunk::IsoShortTZ
                | Chunk::IsoColonTZ
                | Chunk::IsoSecondsTZ
                | Chunk::IsoColonSecondsTZ
        )
    {
        return wtr.write_char('Z');
    }
    let mut minutes = offset / 60;
    let mut absoffset = offset;
    if minutes < 0 {
        wtr.write_char('-')?;
        minutes = -minutes;
        absoffset = -absoffset;
    } else {
        wtr.write_char('+')?;
    }
    write_int(wtr, i64::from(minutes / 60), 2)?;
    if matches!(
        chunk,
        Chunk::NumColonTZ
            | Chunk::IsoColonTZ
            | Chunk::NumColonSecondsTZ
            | Chunk::IsoColonSecondsTZ
    ) {
        wtr.write_char(':')?;
    }
    if !matches!(chunk, Chunk::NumShortTZ | Chunk::IsoShortTZ) {
        write_int(wtr, i64::from(minutes % 60), 2)?;
    }
    if matches!(
        chunk,
        Chunk::NumSecondsTZ
            | Chunk::IsoSecondsTZ
            | Chunk::NumColonSecondsTZ
            | Chunk::IsoColonSecondsTZ
    ) {
        if matches!(
            chunk,
            Chunk::NumColonSecondsTZ | Chunk::IsoColonSecondsTZ
        ) {
            wtr.write_char(':')?;
        }
        write_int(wtr, i64::from(absoffset % 60), 2)?;
    }
    Ok(())
}
