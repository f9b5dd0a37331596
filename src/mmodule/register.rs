use crate::serial::{
	Delay,
	Hardware,
	OutPins,
};

/// Offset of the module control register ("MODREG") in the M-Module window
pub const MODREG: usize = 0xfe;

// MODREG bits
pub const B_DAT: u16 = 0x01; // data out (read) / data in (write)
pub const B_CLK: u16 = 0x02;
pub const B_SEL: u16 = 0x04;

/// 16-bit accesses to a register window. Every access must reach the
/// hardware immediately and in program order.
pub trait RegisterAccess {
	fn read16(&mut self, offset: usize) -> u16;
	fn write16(&mut self, offset: usize, value: u16);
}

impl<'a, R: ?Sized + RegisterAccess> RegisterAccess for &'a mut R {
	fn read16(&mut self, offset: usize) -> u16 {
		R::read16(*self, offset)
	}

	fn write16(&mut self, offset: usize, value: u16) {
		R::write16(*self, offset, value)
	}
}

/// Drives the EEPROM lines through MODREG
pub struct ModReg<R, D>
where
	R: RegisterAccess,
	D: Delay,
{
	register: R,
	delay: D,
}

impl<R, D> ModReg<R, D>
where
	R: RegisterAccess,
	D: Delay,
{
	pub fn new(register: R, delay: D) -> Self {
		ModReg { register, delay }
	}

	pub fn into_inner(self) -> R {
		self.register
	}
}

impl<R, D> Hardware for ModReg<R, D>
where
	R: RegisterAccess,
	D: Delay,
{
	fn set_pins(&mut self, pins: OutPins) {
		let data = if pins.data { B_DAT } else { 0 };
		let clk = if pins.clock { B_CLK } else { 0 };
		let sel = if pins.chip_select { B_SEL } else { 0 };
		self.register.write16(MODREG, data | clk | sel);
	}

	fn read_pin(&mut self) -> bool {
		0 != (self.register.read16(MODREG) & B_DAT)
	}

	fn delay(&mut self) {
		self.delay.wait();
	}
}
