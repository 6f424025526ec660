use std::io;

mod dev;

use crate::i2c::I2cTransport;

pub fn open_device(bus: u32, slave_address: u16) -> io::Result<impl I2cTransport> {
	let path = format!("/dev/i2c-{}", bus);
	dev::inner_open(path, slave_address)
}
