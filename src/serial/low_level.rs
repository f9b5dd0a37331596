use std::ops::{
	Deref,
	DerefMut,
};

use super::{
	EepromError,
	Hardware,
	Opcode,
	OutPins,
};

/// Upper bound of polls per phase while waiting for a write/erase cycle;
/// with one `DELAY_UNIT` per poll this covers the 10ms programming time.
pub const POLL_BUDGET: u32 = 10_000;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Signal {
	Clear,
	Zero,
	One,
}

impl Signal {
	pub fn with_clock(self, clock: bool) -> OutPins {
		let (chip_select, data) = match self {
			Signal::Clear => (false, false),
			Signal::Zero => (true, false),
			Signal::One => (true, true),
		};
		OutPins {
			chip_select,
			clock,
			data,
		}
	}
}

impl From<bool> for Signal {
	fn from(v: bool) -> Self {
		match v {
			false => Signal::Zero,
			true => Signal::One,
		}
	}
}

/// Chip is selected while this lives; dropping it deselects the chip.
#[must_use]
pub struct Transaction<'a, H: ?Sized+LowLevel+'a>(&'a mut H);

impl<'a, H: ?Sized+LowLevel> Transaction<'a, H> {
	pub fn clock_bit(&mut self, data: bool) -> bool {
		self.0._clock(data)
	}

	// send `num` lowest bits from word, starting with highest bit
	pub fn send_bits(&mut self, word: u16, num: usize) {
		assert!(num <= 16);
		for bit in (0..num).rev() {
			let bit_mask = 1u16 << bit;
			self.clock_bit(0 != (word & bit_mask));
		}
	}

	// read 16-bit word, starting with highest bit
	pub fn receive_word(&mut self) -> u16 {
		let mut result = 0u16;
		for _ in 0..16 {
			result = (result << 1) | (self.clock_bit(false) as u16);
		}
		result
	}

	/// Follow the busy indicator of a write/erase cycle: the chip pulls
	/// data out low while busy and releases it when done.
	pub fn wait_ready(&mut self) -> Result<(), EepromError> {
		if !self.poll_data_out(false) {
			warn!("EEPROM never signalled busy");
			return Err(EepromError::Timeout);
		}
		if !self.poll_data_out(true) {
			warn!("EEPROM still busy after {} polls", POLL_BUDGET);
			return Err(EepromError::Timeout);
		}
		Ok(())
	}

	fn poll_data_out(&mut self, level: bool) -> bool {
		for _ in 0..POLL_BUDGET {
			if self.clock_bit(false) == level {
				return true;
			}
			self.delay();
		}
		false
	}

	/// Deselect now
	pub fn finish(self) {
	}
}

impl<'a, H: ?Sized+LowLevel> Drop for Transaction<'a, H> {
	fn drop(&mut self) {
		self.0._deselect();
	}
}

impl<'a, H: ?Sized+LowLevel> Deref for Transaction<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<'a, H: ?Sized+LowLevel> DerefMut for Transaction<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

trait InternalLowLevel: Hardware {
	// one full clock cycle with CS held: DATA during CLK low, then CLK up;
	// returns data out after the rising edge
	fn _clock(&mut self, data: bool) -> bool {
		let signal = Signal::from(data);

		self.set_pins(signal.with_clock(false));
		self.delay(); // wait for pins to be stable

		self.set_pins(signal.with_clock(true));
		self.delay(); // wait for chip reading the pins

		self.read_pin()
	}

	// all pins low, then raise CS only
	fn _select(&mut self) {
		self.set_pins(Signal::Clear.with_clock(false));
		self.set_pins(Signal::Zero.with_clock(false));
		self.delay();
	}

	fn _deselect(&mut self) {
		self.set_pins(Signal::Clear.with_clock(false));
	}
}

impl<H: Hardware+?Sized> InternalLowLevel for H {
}

pub trait LowLevel: Hardware {
	fn select(&mut self) -> Transaction<Self> {
		self._select();

		Transaction(self)
	}

	// start bit followed by the 8 instruction bits
	fn send_opcode(&mut self, opcode: Opcode) -> Transaction<Self> {
		trace!("EEPROM instruction {:?} (0x{:02x})", opcode, opcode.code());
		let mut tx = self.select();
		tx.clock_bit(true);
		tx.send_bits(opcode.code() as u16, 8);
		tx
	}
}

impl<H: Hardware+?Sized> LowLevel for H {
}
