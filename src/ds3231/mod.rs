mod alarm;
mod bcd;
mod temp;
mod time;

pub use self::alarm::{
	Alarm,
	AlarmProgram,
};

pub use self::temp::{
	Temperature,
	decode_temperature,
};

pub use self::time::{
	CalendarTime,
	decode_time,
	encode_time,
};

use crate::i2c::I2cTransport;

/// bus address of the clock chip
pub const SLAVE_ADDRESS: u16 = 0x68;

// register map
const REG_TIME: u8 = 0x00;
const REG_ALARM1: u8 = 0x07;
const REG_ALARM2: u8 = 0x0b;
const REG_CONTROL: u8 = 0x0e;
const REG_STATUS: u8 = 0x0f;
const REG_TEMP_MSB: u8 = 0x11;

// control bits cleared at takeover: the chip keeps time on battery and the
// square wave output stays off
const CONTROL_BATTERY_SQUARE_WAVE: u8 = 0x40;
const CONTROL_INTERRUPT_SELECT: u8 = 0x04;

pub fn open_rtc(bus: u32) -> crate::AResult<Rtc<impl I2cTransport>> {
	let transport = with_context!(("open clock chip on i2c bus {}", bus), {
		Ok(crate::i2c::open_device(bus, SLAVE_ADDRESS)?)
	})?;
	Rtc::new(transport)
}

/// Driver for the clock chip. Owns its transport; dropping the driver
/// releases the bus handle.
pub struct Rtc<T: I2cTransport> {
	transport: T,
}

impl<T: I2cTransport> Rtc<T> {
	/// Takes over the chip and rewrites the control register so the clock
	/// runs on battery without driving the square wave output.
	pub fn new(transport: T) -> crate::AResult<Self> {
		let mut rtc = Rtc { transport };
		let control = rtc.read_register(REG_CONTROL)?;
		let wanted = control & !(CONTROL_BATTERY_SQUARE_WAVE | CONTROL_INTERRUPT_SELECT);
		debug!("clock control register 0x{:02x} -> 0x{:02x}", control, wanted);
		rtc.write_registers(&[REG_CONTROL, wanted])?;
		Ok(rtc)
	}

	pub fn read_time(&mut self) -> crate::AResult<CalendarTime> {
		let mut regs = [0u8; 7];
		self.read_registers(REG_TIME, &mut regs)?;
		Ok(decode_time(&regs))
	}

	/// Writes all seven time/date registers in one transaction.
	pub fn set_time(&mut self, t: &CalendarTime) -> crate::AResult<()> {
		let regs = encode_time(t);
		let mut msg = [0u8; 8];
		msg[0] = REG_TIME;
		msg[1..].copy_from_slice(&regs);
		self.write_registers(&msg)
	}

	pub fn read_temperature(&mut self) -> crate::AResult<Temperature> {
		let mut buf = [0u8; 2];
		self.read_registers(REG_TEMP_MSB, &mut buf)?;
		Ok(decode_temperature(buf[0], buf[1]))
	}

	/// Arms an alarm, replacing whatever its comparator slot held before.
	pub fn set_alarm(&mut self, alarm: Alarm) -> crate::AResult<()> {
		let program = alarm.program();
		self.write_registers(&program.control)?;
		self.write_registers(&program.registers)
	}

	/// Clears the latched alarm-fired flags. The chip keeps an alarm latched
	/// after it fires; until cleared no further interrupt comes.
	pub fn clear_alarm_flags(&mut self) -> crate::AResult<()> {
		self.write_registers(&[REG_STATUS, 0x00])
	}

	fn read_register(&mut self, reg: u8) -> crate::AResult<u8> {
		let mut buf = [0u8; 1];
		self.read_registers(reg, &mut buf)?;
		Ok(buf[0])
	}

	// register reads are two transactions: set the register pointer, then
	// read; another transaction slipping in between would move the pointer
	fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> crate::AResult<()> {
		self.write_registers(&[start])?;
		let n = self.transport.read(buf)?;
		ensure!(n == buf.len(), "short clock register read: {} of {} bytes", n, buf.len());
		Ok(())
	}

	fn write_registers(&mut self, bytes: &[u8]) -> crate::AResult<()> {
		let n = self.transport.write(bytes)?;
		ensure!(n == bytes.len(), "short clock register write: {} of {} bytes", n, bytes.len());
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::i2c::mock::ScriptedTransport;

	fn rtc() -> Rtc<ScriptedTransport> {
		let mut transport = ScriptedTransport::new(SLAVE_ADDRESS);
		transport.push_read(&[0x1c]);
		let mut rtc = Rtc::new(transport).expect("init against mock");
		rtc.transport.writes.clear();
		rtc.transport.reads = 0;
		rtc
	}

	#[test]
	fn init_rewrites_control() {
		let mut transport = ScriptedTransport::new(SLAVE_ADDRESS);
		// power-up control value with the battery square wave bit set
		transport.push_read(&[0x5c]);
		let rtc = Rtc::new(transport).expect("init against mock");
		assert_eq!(
			rtc.transport.writes,
			vec![vec![0x0e], vec![0x0e, 0x18]],
		);
	}

	#[test]
	fn set_time_writes_block() {
		let mut rtc = rtc();
		let t = CalendarTime {
			seconds: 5,
			minutes: 30,
			hours: 23,
			weekday: 4,
			day: 31,
			month: 11,
			year: 118,
		};
		rtc.set_time(&t).unwrap();
		assert_eq!(
			rtc.transport.writes,
			vec![vec![0x00, 0x05, 0x30, 0x23, 5, 0x31, 0x92, 0x18]],
		);
	}

	#[test]
	fn read_time_decodes_block() {
		let mut rtc = rtc();
		rtc.transport.push_read(&[0x05, 0x30, 0x23, 5, 0x31, 0x92, 0x18]);
		let t = rtc.read_time().unwrap();
		assert_eq!(rtc.transport.writes, vec![vec![0x00]]);
		assert_eq!(t.hours, 23);
		assert_eq!(t.month, 11);
		assert_eq!(t.year, 118);
	}

	#[test]
	fn short_time_read_fails() {
		let mut rtc = rtc();
		rtc.transport.push_read(&[0x05, 0x30, 0x23]);
		assert!(rtc.read_time().is_err());
	}

	#[test]
	fn temperature_read() {
		let mut rtc = rtc();
		rtc.transport.push_read(&[0x19, 0x00]);
		let t = rtc.read_temperature().unwrap();
		assert_eq!(rtc.transport.writes, vec![vec![0x11]]);
		assert_eq!(t.celsius(), 25.0);
	}

	#[test]
	fn alarm_traffic() {
		let mut rtc = rtc();
		rtc.set_alarm(Alarm::Second).unwrap();
		assert_eq!(
			rtc.transport.writes,
			vec![
				vec![0x0e, 0x1d],
				vec![0x07, 0x80, 0x80, 0x80, 0x80],
			],
		);
	}

	#[test]
	fn clear_alarm_flags_traffic() {
		let mut rtc = rtc();
		rtc.clear_alarm_flags().unwrap();
		assert_eq!(rtc.transport.writes, vec![vec![0x0f, 0x00]]);
	}
}
