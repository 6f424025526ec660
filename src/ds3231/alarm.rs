use super::bcd::to_bcd;
use super::time::CalendarTime;
use super::{
	REG_ALARM1,
	REG_ALARM2,
	REG_CONTROL,
};

// control register: oscillator running, interrupt mode, plus the interrupt
// enable bit of the slot being armed
const CONTROL_BASE: u8 = 0x1c;
const CONTROL_ALARM1_ENABLE: u8 = 0x01;
const CONTROL_ALARM2_ENABLE: u8 = 0x02;

// bit 7 of an alarm register takes that register out of the match, turning
// the alarm into a repeating one
const MATCH_DISABLE: u8 = 0x80;
// selects weekday matching instead of day-of-month in the day register
const WEEKDAY_SELECT: u8 = 0x40;

/// The five alarm configurations the chip's two comparator slots support.
///
/// `Second`, `Time`, `Day` and `Date` occupy alarm slot 1, `Minute` occupies
/// slot 2; arming a slot silently replaces whatever it held before. Only the
/// time-of-day fields (plus `weekday` for `Day`, `day` for `Date`) of the
/// carried value take part in the match.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Alarm {
	/// fires once per second
	Second,
	/// fires once per minute
	Minute,
	/// fires when seconds, minutes and hours match
	Time(CalendarTime),
	/// fires when weekday and time match
	Day(CalendarTime),
	/// fires when day of month and time match
	Date(CalendarTime),
}

/// The register writes arming one alarm: a control-register write followed
/// by the alarm-block write. Built without touching the bus; the driver
/// transmits both in order.
pub struct AlarmProgram {
	pub control: [u8; 2],
	pub registers: Vec<u8>,
}

impl Alarm {
	pub fn program(&self) -> AlarmProgram {
		match *self {
			Alarm::Second => AlarmProgram {
				control: [REG_CONTROL, CONTROL_BASE | CONTROL_ALARM1_ENABLE],
				registers: vec![
					REG_ALARM1,
					MATCH_DISABLE,
					MATCH_DISABLE,
					MATCH_DISABLE,
					MATCH_DISABLE,
				],
			},
			Alarm::Minute => AlarmProgram {
				control: [REG_CONTROL, CONTROL_BASE | CONTROL_ALARM2_ENABLE],
				registers: vec![
					REG_ALARM2,
					MATCH_DISABLE,
					MATCH_DISABLE,
					MATCH_DISABLE,
				],
			},
			Alarm::Time(t) => {
				// repeat bits go on seconds and minutes only; the hour and
				// day registers keep matching
				let mut registers = match_registers(&t, t.weekday + 1);
				registers[1] |= MATCH_DISABLE;
				registers[2] |= MATCH_DISABLE;
				AlarmProgram {
					control: [REG_CONTROL, CONTROL_BASE | CONTROL_ALARM1_ENABLE],
					registers,
				}
			}
			Alarm::Day(t) => AlarmProgram {
				control: [REG_CONTROL, CONTROL_BASE | CONTROL_ALARM1_ENABLE],
				registers: match_registers(&t, (t.weekday + 1) | WEEKDAY_SELECT),
			},
			Alarm::Date(t) => AlarmProgram {
				control: [REG_CONTROL, CONTROL_BASE | CONTROL_ALARM1_ENABLE],
				registers: match_registers(&t, to_bcd(t.day)),
			},
		}
	}
}

// the alarm-1 block: register pointer, seconds, minutes, hours, day-or-date
fn match_registers(t: &CalendarTime, day_byte: u8) -> Vec<u8> {
	vec![
		REG_ALARM1,
		to_bcd(t.seconds),
		to_bcd(t.minutes),
		to_bcd(t.hours),
		day_byte,
	]
}
