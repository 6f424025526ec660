use std::thread;
use std::time::{
	Duration,
	Instant,
};

mod paging;

pub use self::paging::{
	Address,
	EEPROM_SIZE,
	PAGE_SIZE,
	read_address_phase,
	write_transaction,
};

use crate::i2c::I2cTransport;

/// bus address of the EEPROM
pub const SLAVE_ADDRESS: u16 = 0x57;

/// Time the chip needs to commit a write. While committing it doesn't
/// acknowledge, so callers wait this out between a write and the next
/// access; nothing in the driver retries for them.
pub const WRITE_CYCLE: Duration = Duration::from_millis(10);

pub fn open_eeprom(bus: u32) -> crate::AResult<Eeprom<impl I2cTransport>> {
	let transport = with_context!(("open EEPROM on i2c bus {}", bus), {
		Ok(crate::i2c::open_device(bus, SLAVE_ADDRESS)?)
	})?;
	Ok(Eeprom::new(transport))
}

/// Driver for the EEPROM. Owns its transport; dropping the driver releases
/// the bus handle.
pub struct Eeprom<T: I2cTransport> {
	transport: T,
}

impl<T: I2cTransport> Eeprom<T> {
	pub fn new(transport: T) -> Self {
		Eeprom { transport }
	}

	/// Reads one byte, advancing the chip's pointer past it.
	pub fn read_byte(&mut self, address: Address) -> crate::AResult<u8> {
		if let Some(phase) = paging::read_address_phase(address, false)? {
			self.write_all(&phase)?;
		}
		let mut buf = [0u8; 1];
		self.read_all(&mut buf)?;
		Ok(buf[0])
	}

	/// Reads a full page; an explicit address must sit on a page boundary.
	pub fn read_page(&mut self, address: Address) -> crate::AResult<[u8; PAGE_SIZE]> {
		if let Some(phase) = paging::read_address_phase(address, true)? {
			self.write_all(&phase)?;
		}
		let mut buf = [0u8; PAGE_SIZE];
		self.read_all(&mut buf)?;
		Ok(buf)
	}

	pub fn write_byte(&mut self, address: Address, byte: u8) -> crate::AResult<()> {
		let msg = paging::write_transaction(address, &[byte], false)?;
		self.write_all(&msg)
	}

	/// Writes a full page as one 34-byte transaction; an explicit address
	/// must sit on a page boundary.
	pub fn write_page(&mut self, address: Address, data: &[u8; PAGE_SIZE]) -> crate::AResult<()> {
		let msg = paging::write_transaction(address, data, true)?;
		self.write_all(&msg)
	}

	/// Blocks for [`WRITE_CYCLE`]. The explicit settling step between a
	/// write and whatever comes next.
	pub fn wait_write_cycle(&self) {
		debug!("waiting {:?} for the EEPROM write cycle", WRITE_CYCLE);
		reliable_sleep(WRITE_CYCLE);
	}

	fn read_all(&mut self, buf: &mut [u8]) -> crate::AResult<()> {
		let n = self.transport.read(buf)?;
		ensure!(n == buf.len(), "short EEPROM read: {} of {} bytes", n, buf.len());
		Ok(())
	}

	fn write_all(&mut self, bytes: &[u8]) -> crate::AResult<()> {
		let n = self.transport.write(bytes)?;
		ensure!(n == bytes.len(), "short EEPROM write: {} of {} bytes", n, bytes.len());
		Ok(())
	}
}

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

#[cfg(test)]
mod test {
	use std::io;

	use super::*;
	use crate::i2c::mock::ScriptedTransport;

	#[test]
	fn misaligned_page_access_rejected_before_io() {
		let mut ee = Eeprom::new(ScriptedTransport::new(SLAVE_ADDRESS));

		assert!(ee.read_page(Address::At(1025)).is_err());
		assert!(ee.write_page(Address::At(7), &[0u8; PAGE_SIZE]).is_err());

		assert_eq!(ee.transport.transfers(), 0, "no bus traffic on rejected addresses");
	}

	#[test]
	fn byte_read_traffic() {
		let mut ee = Eeprom::new(ScriptedTransport::new(SLAVE_ADDRESS));
		ee.transport.push_read(&[0xab]);
		assert_eq!(ee.read_byte(Address::At(1024)).unwrap(), 0xab);
		assert_eq!(ee.transport.writes, vec![vec![0x04, 0x00]]);

		ee.transport.push_read(&[0xcd]);
		assert_eq!(ee.read_byte(Address::Current).unwrap(), 0xcd);
		// no further address phase for the auto-increment read
		assert_eq!(ee.transport.writes.len(), 1);
	}

	#[test]
	fn byte_write_is_one_transaction() {
		let mut ee = Eeprom::new(ScriptedTransport::new(SLAVE_ADDRESS));
		ee.write_byte(Address::At(0x0123), 0x55).unwrap();
		ee.write_byte(Address::Current, 0xaa).unwrap();
		assert_eq!(
			ee.transport.writes,
			vec![vec![0x01, 0x23, 0x55], vec![0xaa]],
		);
	}

	// the chip itself: 4096 bytes behind an auto-incrementing pointer,
	// loaded from the first two bytes of an addressed write
	struct ChipModel {
		memory: Vec<u8>,
		pointer: usize,
	}

	impl ChipModel {
		fn new() -> Self {
			ChipModel {
				memory: vec![0xff; EEPROM_SIZE],
				pointer: 0,
			}
		}
	}

	impl crate::i2c::I2cTransport for ChipModel {
		fn slave_address(&self) -> u16 {
			SLAVE_ADDRESS
		}

		fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
			match bytes.len() {
				0 => {}
				1 => {
					// bare data byte at the current pointer
					self.memory[self.pointer % EEPROM_SIZE] = bytes[0];
					self.pointer += 1;
				}
				_ => {
					self.pointer = usize::from(bytes[0]) << 8 | usize::from(bytes[1]);
					for &b in &bytes[2..] {
						self.memory[self.pointer % EEPROM_SIZE] = b;
						self.pointer += 1;
					}
				}
			}
			Ok(bytes.len())
		}

		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			for b in buf.iter_mut() {
				*b = self.memory[self.pointer % EEPROM_SIZE];
				self.pointer += 1;
			}
			Ok(buf.len())
		}
	}

	fn test_pattern() -> [u8; PAGE_SIZE] {
		let mut pattern = [0u8; PAGE_SIZE];
		for i in 0..PAGE_SIZE / 2 {
			pattern[2 * i] = i as u8;
			pattern[2 * i + 1] = (PAGE_SIZE - 1 - i) as u8;
		}
		pattern
	}

	#[test]
	fn pattern_round_trip_byte_by_byte() {
		let mut ee = Eeprom::new(ChipModel::new());
		let pattern = test_pattern();

		ee.write_page(Address::At(1024), &pattern).unwrap();

		let mut readback = [0u8; PAGE_SIZE];
		for i in 0..PAGE_SIZE {
			let address = if i == 0 { Address::At(1024) } else { Address::Current };
			readback[i] = ee.read_byte(address).unwrap();
		}
		assert_eq!(readback, pattern);
	}

	#[test]
	fn page_read_back() {
		let mut ee = Eeprom::new(ChipModel::new());
		let pattern = test_pattern();

		ee.write_page(Address::At(0), &pattern).unwrap();
		assert_eq!(ee.read_page(Address::At(0)).unwrap(), pattern);

		// the pointer sits past the page; a Current read continues there
		ee.write_byte(Address::At(PAGE_SIZE as u16), 0x42).unwrap();
		assert_eq!(ee.read_page(Address::At(0)).unwrap(), pattern);
		assert_eq!(ee.read_byte(Address::Current).unwrap(), 0x42);
	}
}
