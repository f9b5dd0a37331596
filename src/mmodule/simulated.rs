//! Serial EEPROM behind a simulated MODREG, for protocol tests without
//! hardware.

use super::register::{
	B_CLK,
	B_DAT,
	B_SEL,
	MODREG,
	RegisterAccess,
};
use crate::serial::Delay;

pub const SIMULATED_CELLS: usize = 64;

// rising CLK edges a programming cycle stays busy
const PROGRAMMING_CLOCKS: u32 = 3;

pub struct NoDelay;

impl Delay for NoDelay {
	fn wait(&mut self) {
	}
}

/// Instructions as decoded by the simulated chip
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
	Read(u8),
	Write(u8, u16),
	Erase(u8),
	EraseWriteEnable,
	EraseWriteDisable,
	EraseAll,
	WriteAll(u16),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Fault {
	// programming cycles touching this cell never finish (and don't change it)
	StuckBusy(u8),
	// writes to this cell flip the lowest bit
	CorruptWrite(u8),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
	// waiting for start bit
	Idle,
	Instruction { code: u8, count: u32 },
	ReadOut { word: u16, remaining: u32 },
	DataIn { command: Command, word: u16, count: u32 },
	// instruction complete, ignore further clocks until CS drops
	Done,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Programming {
	Idle,
	Busy(u32),
	Stuck,
}

pub struct SimulatedEeprom {
	pub cells: [u16; SIMULATED_CELLS],
	pub faults: Vec<Fault>,
	pub commands: Vec<Command>,
	absent: bool,
	selected: bool,
	clock: bool,
	data_out: bool,
	write_enabled: bool,
	state: State,
	pending: Option<Command>,
	programming: Programming,
}

impl SimulatedEeprom {
	pub fn new() -> Self {
		SimulatedEeprom {
			cells: [0xffff; SIMULATED_CELLS],
			faults: Vec::new(),
			commands: Vec::new(),
			absent: false,
			selected: false,
			clock: false,
			data_out: true,
			write_enabled: false,
			state: State::Idle,
			pending: None,
			programming: Programming::Idle,
		}
	}

	/// Nothing answers: data out is always pulled up
	pub fn absent() -> Self {
		SimulatedEeprom {
			absent: true,
			..SimulatedEeprom::new()
		}
	}

	pub fn is_selected(&self) -> bool {
		self.selected
	}

	pub fn is_write_enabled(&self) -> bool {
		self.write_enabled
	}

	fn has_fault(&self, fault: Fault) -> bool {
		self.faults.contains(&fault)
	}

	fn deselect(&mut self) {
		self.selected = false;
		self.data_out = true;
		self.state = State::Idle;
		if self.programming == Programming::Busy(0) {
			self.programming = Programming::Idle;
		}

		let command = match self.pending.take() {
			Some(command) => command,
			None => return,
		};
		if !self.write_enabled {
			return;
		}

		let touched: Vec<u8> = match command {
			Command::Write(address, _) | Command::Erase(address) => vec![address],
			_ => (0..SIMULATED_CELLS as u8).collect(),
		};
		if touched.iter().any(|&a| self.has_fault(Fault::StuckBusy(a))) {
			self.programming = Programming::Stuck;
			return;
		}

		match command {
			Command::Write(address, word) => {
				let word = if self.has_fault(Fault::CorruptWrite(address)) { word ^ 1 } else { word };
				self.cells[address as usize] = word;
			},
			Command::Erase(address) => {
				self.cells[address as usize] = 0xffff;
			},
			Command::EraseAll => {
				self.cells = [0xffff; SIMULATED_CELLS];
			},
			Command::WriteAll(word) => {
				self.cells = [word; SIMULATED_CELLS];
			},
			_ => unreachable!(),
		}
		self.programming = Programming::Busy(PROGRAMMING_CLOCKS);
	}

	fn decode_instruction(&mut self, code: u8) -> State {
		let address = code & 0x3f;
		let command = match code >> 6 {
			0b10 => Command::Read(address),
			0b01 => Command::Write(address, 0),
			0b11 => Command::Erase(address),
			_ => match (code >> 4) & 0x3 {
				0b00 => Command::EraseWriteDisable,
				0b01 => Command::WriteAll(0),
				0b10 => Command::EraseAll,
				_ => Command::EraseWriteEnable,
			},
		};

		match command {
			Command::Read(address) => {
				self.commands.push(command);
				// dummy zero bit before the data
				self.data_out = false;
				State::ReadOut { word: self.cells[address as usize], remaining: 16 }
			},
			Command::Write(..) | Command::WriteAll(..) => {
				State::DataIn { command, word: 0, count: 0 }
			},
			Command::Erase(..) | Command::EraseAll => {
				self.commands.push(command);
				self.pending = Some(command);
				State::Done
			},
			Command::EraseWriteEnable => {
				self.commands.push(command);
				self.write_enabled = true;
				State::Done
			},
			Command::EraseWriteDisable => {
				self.commands.push(command);
				self.write_enabled = false;
				State::Done
			},
		}
	}

	fn rising_edge(&mut self, data_in: bool) {
		let state = self.state;
		self.state = match state {
			State::Idle if data_in => {
				State::Instruction { code: 0, count: 0 }
			},
			State::Idle => {
				// status display while selected
				match self.programming {
					Programming::Busy(0) | Programming::Idle => self.data_out = true,
					Programming::Busy(n) => {
						self.programming = Programming::Busy(n - 1);
						self.data_out = n - 1 == 0;
					},
					Programming::Stuck => self.data_out = false,
				}
				State::Idle
			},
			State::Instruction { code, count } => {
				let code = (code << 1) | (data_in as u8);
				if count + 1 == 8 {
					self.decode_instruction(code)
				} else {
					State::Instruction { code, count: count + 1 }
				}
			},
			State::ReadOut { word, remaining } => {
				self.data_out = 0 != (word & 0x8000);
				if remaining == 1 {
					State::Done
				} else {
					State::ReadOut { word: word << 1, remaining: remaining - 1 }
				}
			},
			State::DataIn { command, word, count } => {
				let word = (word << 1) | (data_in as u16);
				if count + 1 < 16 {
					State::DataIn { command, word, count: count + 1 }
				} else {
					let command = match command {
						Command::Write(address, _) => Command::Write(address, word),
						_ => Command::WriteAll(word),
					};
					self.commands.push(command);
					self.pending = Some(command);
					State::Done
				}
			},
			State::Done => State::Done,
		};
	}
}

impl RegisterAccess for SimulatedEeprom {
	fn read16(&mut self, offset: usize) -> u16 {
		assert_eq!(offset, MODREG);
		if self.absent || self.data_out { 0xffff } else { 0xffff & !B_DAT }
	}

	fn write16(&mut self, offset: usize, value: u16) {
		assert_eq!(offset, MODREG);
		if self.absent {
			return;
		}

		let select = 0 != (value & B_SEL);
		let clock = 0 != (value & B_CLK);
		let data_in = 0 != (value & B_DAT);

		if !select {
			if self.selected {
				self.deselect();
			}
			self.clock = clock;
			return;
		}

		self.selected = true;
		let rising = clock && !self.clock;
		self.clock = clock;
		if rising {
			self.rising_edge(data_in);
		}
	}
}
