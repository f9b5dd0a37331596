#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate mm_ident;
use mm_ident::*;

use std::process::exit;

use mm_ident::physmem::PhysAddr;
use mm_ident::serial::{
	CELL_COUNT,
	CellIndex,
	Delay,
	EepromOperations,
	Sleep,
	Spin,
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
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

// hexadecimal, "0x" prefix optional
fn parse_word(s: &str) -> AResult<u16> {
	let digits = if s.starts_with("0x") { &s[2..] } else { s };
	ensure!(!digits.is_empty(), "invalid EEPROM word: {:?}", s);
	u16::from_str_radix(digits, 16).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid EEPROM word {:?}: {}", s, e);
		e.context(msg).into()
	})
}

fn open(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<mmodule::ModReg<physmem::Mapped, Box<dyn Delay>>> {
	let address: PhysAddr = get_param(sub_m, "ADDR")?;
	info!("M-Module at {}", address);
	mmodule::open_eeprom(address, delay)
}

fn show_ident(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<()> {
	let mut ee = open(sub_m, delay)?;
	println!("{}", ident::decode(&mut ee));

	Ok(())
}

fn dump(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<()> {
	let mut ee = open(sub_m, delay)?;
	for (index, word) in ee.read_all().iter().enumerate() {
		println!("@{:02x}: {:04x}", index, word);
	}

	Ok(())
}

fn write(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<()> {
	let index: CellIndex = get_param(sub_m, "INDEX")?;
	let word = parse_word(sub_m.value_of("WORD").unwrap_or(""))?;

	let mut ee = open(sub_m, delay)?;
	ee.erase_then_write(index, word)?;
	info!("Wrote {:04x} to cell {}", word, index);

	Ok(())
}

fn write_all(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<()> {
	let values: Vec<&str> = sub_m.values_of("WORDS").map(|v| v.collect()).unwrap_or_default();
	ensure!(values.len() == CELL_COUNT, "need exactly {} words, got {}", CELL_COUNT, values.len());
	let mut words = [0u16; CELL_COUNT];
	for (word, value) in words.iter_mut().zip(values) {
		*word = parse_word(value)?;
	}

	let mut ee = open(sub_m, delay)?;
	ee.write_all(&words)?;
	info!("Wrote all {} cells", CELL_COUNT);

	Ok(())
}

fn erase(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<()> {
	let index: CellIndex = get_param(sub_m, "INDEX")?;

	let mut ee = open(sub_m, delay)?;
	ee.erase(index)?;
	info!("Erased cell {}", index);

	Ok(())
}

fn erase_chip(sub_m: &clap::ArgMatches, delay: Box<dyn Delay>) -> AResult<()> {
	let mut ee = open(sub_m, delay)?;
	ee.erase_chip()?;
	info!("Erased EEPROM");

	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg spin: --spin "busy-wait on the monotonic clock instead of sleeping between signal changes")
		(@subcommand ident =>
			(about: "show M-Module identification")
			(@arg ADDR: +required "physical M-Module address (BAR + offset, hex)")
		)
		(@subcommand dump =>
			(about: "dump all ID EEPROM cells")
			(@arg ADDR: +required "physical M-Module address (BAR + offset, hex)")
		)
		(@subcommand write =>
			(about: "erase and write a single ID EEPROM cell")
			(@arg ADDR: +required "physical M-Module address (BAR + offset, hex)")
			(@arg INDEX: +required "cell to write (0..15)")
			(@arg WORD: +required "word to write (hex)")
		)
		(@subcommand write_all =>
			(about: "erase and write all ID EEPROM cells")
			(@arg ADDR: +required "physical M-Module address (BAR + offset, hex)")
			(@arg WORDS: +required +multiple "16 words to write (hex)")
		)
		(@subcommand erase =>
			(about: "erase a single ID EEPROM cell")
			(@arg ADDR: +required "physical M-Module address (BAR + offset, hex)")
			(@arg INDEX: +required "cell to erase (0..15)")
		)
		(@subcommand erase_chip =>
			(about: "erase the whole ID EEPROM")
			(@arg ADDR: +required "physical M-Module address (BAR + offset, hex)")
		)
	).get_matches();

	let delay: Box<dyn Delay> = if matches.is_present("spin") {
		Box::new(Spin)
	} else {
		Box::new(Sleep)
	};

	match matches.subcommand() {
		("ident", Some(sub_m)) => show_ident(sub_m, delay),
		("dump", Some(sub_m)) => dump(sub_m, delay),
		("write", Some(sub_m)) => write(sub_m, delay),
		("write_all", Some(sub_m)) => write_all(sub_m, delay),
		("erase", Some(sub_m)) => erase(sub_m, delay),
		("erase_chip", Some(sub_m)) => erase_chip(sub_m, delay),
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
