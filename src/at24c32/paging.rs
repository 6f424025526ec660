/// capacity in bytes, organized as 128 pages of [`PAGE_SIZE`] bytes
pub const EEPROM_SIZE: usize = 4096;
pub const PAGE_SIZE: usize = 32;

/// Where an EEPROM access starts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Address {
	/// explicit address, sent high byte first in the address phase
	At(u16),
	/// continue at the chip's internal pointer, which advances past the
	/// last byte accessed
	Current,
}

fn check_address(address: u16, page_aligned: bool) -> crate::AResult<u16> {
	ensure!(
		(address as usize) < EEPROM_SIZE,
		"address 0x{:04x} outside the {} byte EEPROM",
		address, EEPROM_SIZE
	);
	if page_aligned {
		ensure!(
			0 == address as usize % PAGE_SIZE,
			"address 0x{:04x} not on a {} byte page boundary",
			address, PAGE_SIZE
		);
	}
	Ok(address)
}

/// The address phase preceding a read, or `None` to keep the chip's
/// pointer. Validated before anything touches the bus.
pub fn read_address_phase(address: Address, page_aligned: bool) -> crate::AResult<Option<[u8; 2]>> {
	match address {
		Address::At(address) => {
			let address = check_address(address, page_aligned)?;
			Ok(Some([(address >> 8) as u8, address as u8]))
		}
		Address::Current => Ok(None),
	}
}

/// The payload of a write: address bytes and data in one transaction. The
/// chip treats a separate address write as its own access, so they must not
/// be split.
pub fn write_transaction(address: Address, data: &[u8], page_aligned: bool) -> crate::AResult<Vec<u8>> {
	match address {
		Address::At(address) => {
			let address = check_address(address, page_aligned)?;
			let mut msg = Vec::with_capacity(2 + data.len());
			msg.push((address >> 8) as u8);
			msg.push(address as u8);
			msg.extend_from_slice(data);
			Ok(msg)
		}
		Address::Current => Ok(data.to_vec()),
	}
}
