#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate rtc_eeprom;
use rtc_eeprom::*;

use std::process::exit;

use rtc_eeprom::at24c32::Address;

// walks the page from both ends at once
const TEST_PATTERN: [u8; 32] = [
	0, 31, 1, 30, 2, 29, 3, 28, 4, 27, 5, 26, 6, 25, 7, 24,
	8, 23, 9, 22, 10, 21, 11, 20, 12, 19, 13, 18, 14, 17, 15, 16,
];

const TEST_ADDRESS: u16 = 1024;

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
		(@arg set_time: --("set-time") "set the clock from the system time (UTC) first")
	).get_matches();

	let bus = matches.value_of("bus").unwrap_or("0").parse::<u32>()?;

	let mut rtc = ds3231::open_rtc(bus)?;
	let mut eeprom = at24c32::open_eeprom(bus)?;

	if matches.is_present("set_time") {
		let now = ds3231::CalendarTime::now();
		rtc.set_time(&now)?;
		info!("clock set to {}", now);
	}

	println!("Current time = {}", rtc.read_time()?);
	println!("Temperature = {}", rtc.read_temperature()?);

	eeprom.write_page(Address::At(TEST_ADDRESS), &TEST_PATTERN)?;
	eeprom.wait_write_cycle();

	// read back one byte at a time: explicit address once, then the
	// chip's auto-increment pointer for the rest
	let mut readback = [0u8; 32];
	for i in 0..readback.len() {
		let address = if 0 == i { Address::At(TEST_ADDRESS) } else { Address::Current };
		readback[i] = eeprom.read_byte(address)?;
		println!("byte {} = {:02x}", i, readback[i]);
	}

	if readback == TEST_PATTERN {
		println!("EEPROM works!");
		Ok(())
	} else {
		bail!("EEPROM read back the wrong data");
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
