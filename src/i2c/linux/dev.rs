use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::os::unix::io::AsRawFd;

use libc::{
	c_ulong,
	ioctl,
};

use crate::i2c::I2cTransport;

// from <linux/i2c-dev.h>
const I2C_SLAVE: c_ulong = 0x0703;

pub struct Dev {
	file: fs::File,
	slave_address: u16,
}

impl I2cTransport for Dev {
	fn slave_address(&self) -> u16 {
		self.slave_address
	}

	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		self.file.write(bytes)
	}

	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.file.read(buf)
	}
}

pub fn inner_open(path: String, slave_address: u16) -> io::Result<Dev> {
	let file = fs::OpenOptions::new()
		.read(true)
		.write(true)
		.open(path)?;

	// bind the handle to the chip; all following reads/writes address it
	let rc = unsafe { ioctl(file.as_raw_fd(), I2C_SLAVE, c_ulong::from(slave_address)) };
	if rc < 0 {
		return Err(io::Error::last_os_error());
	}

	Ok(Dev {
		file,
		slave_address,
	})
}
