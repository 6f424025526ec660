#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate rtc_eeprom;
use rtc_eeprom::*;

use std::process::exit;

use rtc_eeprom::at24c32::{
	Address,
	EEPROM_SIZE,
	PAGE_SIZE,
};
use rtc_eeprom::ds3231::{
	Alarm,
	CalendarTime,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn bus_param(matches: &clap::ArgMatches) -> AResult<u32> {
	match matches.value_of("bus") {
		Some(_) => get_param(matches, "bus"),
		None => Ok(0),
	}
}

fn parse_clock(s: &str) -> AResult<(u8, u8, u8)> {
	let parts: Vec<&str> = s.split(':').collect();
	ensure!(parts.len() == 3, "expected HH:MM:SS, got {:?}", s);
	let hours: u8 = parts[0].parse()?;
	let minutes: u8 = parts[1].parse()?;
	let seconds: u8 = parts[2].parse()?;
	ensure!(
		hours < 24 && minutes < 60 && seconds < 60,
		"clock value out of range: {:?}", s
	);
	Ok((hours, minutes, seconds))
}

// today's date with the time of day replaced; the alarm comparators only
// look at the fields belonging to the alarm type
fn alarm_at(matches: &clap::ArgMatches) -> AResult<CalendarTime> {
	let when = match matches.value_of("WHEN") {
		Some(w) => w,
		None => bail!("missing parameter WHEN"),
	};
	let (hours, minutes, seconds) = parse_clock(when)?;
	let mut t = CalendarTime::now();
	t.hours = hours;
	t.minutes = minutes;
	t.seconds = seconds;
	Ok(t)
}

fn arm(matches: &clap::ArgMatches, alarm: Alarm) -> AResult<()> {
	let mut rtc = ds3231::open_rtc(bus_param(matches)?)?;
	rtc.set_alarm(alarm)?;
	info!("alarm armed: {:?}", alarm);
	Ok(())
}

fn show_time(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut rtc = ds3231::open_rtc(bus_param(sub_m)?)?;
	println!("{}", rtc.read_time()?);
	Ok(())
}

fn set_time(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut rtc = ds3231::open_rtc(bus_param(sub_m)?)?;
	let now = CalendarTime::now();
	rtc.set_time(&now)?;
	println!("clock set to {}", now);
	Ok(())
}

fn show_temp(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut rtc = ds3231::open_rtc(bus_param(sub_m)?)?;
	println!("{}", rtc.read_temperature()?);
	Ok(())
}

fn clear_alarms(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut rtc = ds3231::open_rtc(bus_param(sub_m)?)?;
	rtc.clear_alarm_flags()?;
	Ok(())
}

fn dump_eeprom(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut eeprom = at24c32::open_eeprom(bus_param(sub_m)?)?;

	for page in 0..(EEPROM_SIZE / PAGE_SIZE) {
		let base = page * PAGE_SIZE;
		let data = eeprom.read_page(Address::At(base as u16))?;
		for (i, b) in data.iter().enumerate() {
			if 0 == (base + i) % 16 {
				print!("{:04x} ", base + i);
			} else if 0 == (base + i) % 8 {
				print!(" ");
			}
			print!(" {:02x}", b);
			if 15 == (base + i) % 16 {
				println!();
			}
		}
	}

	Ok(())
}

fn read_byte(sub_m: &clap::ArgMatches) -> AResult<()> {
	let address: u16 = get_param(sub_m, "ADDRESS")?;
	let mut eeprom = at24c32::open_eeprom(bus_param(sub_m)?)?;
	println!("0x{:04x} = 0x{:02x}", address, eeprom.read_byte(Address::At(address))?);
	Ok(())
}

fn write_byte(sub_m: &clap::ArgMatches) -> AResult<()> {
	let address: u16 = get_param(sub_m, "ADDRESS")?;
	let byte: u8 = get_param(sub_m, "BYTE")?;
	let mut eeprom = at24c32::open_eeprom(bus_param(sub_m)?)?;
	eeprom.write_byte(Address::At(address), byte)?;
	eeprom.wait_write_cycle();
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand time =>
			(about: "show the current clock time")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
		)
		(@subcommand set_time =>
			(about: "set the clock from the system time (UTC)")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
		)
		(@subcommand temp =>
			(about: "show the clock die temperature")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
		)
		(@subcommand alarm =>
			(about: "arm one of the two alarm slots")
			(@setting SubcommandRequiredElseHelp)
			(@subcommand second =>
				(about: "fire every second")
				(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
			)
			(@subcommand minute =>
				(about: "fire every minute")
				(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
			)
			(@subcommand time =>
				(about: "fire at a time of day")
				(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
				(@arg WHEN: +required "time of day (HH:MM:SS)")
			)
			(@subcommand day =>
				(about: "fire on a weekday at a time of day")
				(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
				(@arg WEEKDAY: +required "weekday 0-6, 0 = Sunday")
				(@arg WHEN: +required "time of day (HH:MM:SS)")
			)
			(@subcommand date =>
				(about: "fire on a day of the month at a time of day")
				(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
				(@arg DAY: +required "day of the month 1-31")
				(@arg WHEN: +required "time of day (HH:MM:SS)")
			)
		)
		(@subcommand clear_alarms =>
			(about: "clear the latched alarm-fired flags")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
		)
		(@subcommand dump_eeprom =>
			(about: "hex dump the whole EEPROM")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
		)
		(@subcommand read_byte =>
			(about: "read one EEPROM byte")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
			(@arg ADDRESS: +required "byte address")
		)
		(@subcommand write_byte =>
			(about: "write one EEPROM byte")
			(@arg bus: -b --bus +takes_value "i2c bus number (default 0)")
			(@arg ADDRESS: +required "byte address")
			(@arg BYTE: +required "value to write")
		)
	).get_matches();

	match matches.subcommand() {
		("time", Some(sub_m)) => {
			show_time(sub_m)
		}
		("set_time", Some(sub_m)) => {
			set_time(sub_m)
		}
		("temp", Some(sub_m)) => {
			show_temp(sub_m)
		}
		("alarm", Some(sub_m)) => match sub_m.subcommand() {
			("second", Some(sub_sub_m)) => {
				arm(sub_sub_m, Alarm::Second)
			}
			("minute", Some(sub_sub_m)) => {
				arm(sub_sub_m, Alarm::Minute)
			}
			("time", Some(sub_sub_m)) => {
				let at = alarm_at(sub_sub_m)?;
				arm(sub_sub_m, Alarm::Time(at))
			}
			("day", Some(sub_sub_m)) => {
				let mut at = alarm_at(sub_sub_m)?;
				at.weekday = get_param(sub_sub_m, "WEEKDAY")?;
				ensure!(at.weekday < 7, "weekday {} out of range 0-6", at.weekday);
				arm(sub_sub_m, Alarm::Day(at))
			}
			("date", Some(sub_sub_m)) => {
				let mut at = alarm_at(sub_sub_m)?;
				at.day = get_param(sub_sub_m, "DAY")?;
				ensure!(at.day >= 1 && at.day <= 31, "day of month {} out of range 1-31", at.day);
				arm(sub_sub_m, Alarm::Date(at))
			}
			("", _) => bail!("no subcommand"),
			(cmd, _) => bail!("not implemented subcommand for 'alarm' {:?}", cmd),
		},
		("clear_alarms", Some(sub_m)) => {
			clear_alarms(sub_m)
		}
		("dump_eeprom", Some(sub_m)) => {
			dump_eeprom(sub_m)
		}
		("read_byte", Some(sub_m)) => {
			read_byte(sub_m)
		}
		("write_byte", Some(sub_m)) => {
			write_byte(sub_m)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
