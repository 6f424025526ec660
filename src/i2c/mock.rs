use std::collections::VecDeque;
use std::io;

use super::I2cTransport;

// Records all write payloads and serves scripted read data, so driver tests
// can check the exact bus traffic an operation produces.
pub struct ScriptedTransport {
	slave_address: u16,
	pub writes: Vec<Vec<u8>>,
	pub read_data: VecDeque<Vec<u8>>,
	pub reads: usize,
}

impl ScriptedTransport {
	pub fn new(slave_address: u16) -> Self {
		ScriptedTransport {
			slave_address,
			writes: Vec::new(),
			read_data: VecDeque::new(),
			reads: 0,
		}
	}

	pub fn push_read(&mut self, data: &[u8]) {
		self.read_data.push_back(data.to_vec());
	}

	pub fn transfers(&self) -> usize {
		self.writes.len() + self.reads
	}
}

impl I2cTransport for ScriptedTransport {
	fn slave_address(&self) -> u16 {
		self.slave_address
	}

	fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
		self.writes.push(bytes.to_vec());
		Ok(bytes.len())
	}

	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.reads += 1;
		let data = self.read_data.pop_front().expect("read without scripted data");
		buf[..data.len()].copy_from_slice(&data);
		Ok(data.len())
	}
}
