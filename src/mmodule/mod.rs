mod register;
#[cfg(test)]
pub(crate) mod simulated;

pub use self::register::{
	B_CLK,
	B_DAT,
	B_SEL,
	MODREG,
	ModReg,
	RegisterAccess,
};

use crate::physmem::{
	self,
	Mapped,
	PhysAddr,
};
use crate::serial::Delay;

/// Bytes of the module window the EEPROM protocol touches
pub const MODULE_WINDOW_LEN: usize = MODREG + 2;

/// Map the M-Module at `address` (BAR + module offset) and drive its ID
/// EEPROM.
pub fn open_eeprom<D: Delay>(address: PhysAddr, delay: D) -> crate::AResult<ModReg<Mapped, D>> {
	let window = physmem::open_window(address, MODULE_WINDOW_LEN)?;
	Ok(ModReg::new(window, delay))
}
