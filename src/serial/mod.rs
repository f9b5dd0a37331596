/// Protocol for the 3-wire serial EEPROM on M-Modules (93C46 style,
/// organized as 16-bit words; only the first 16 words are used).
///
/// CS, CLK and DATA IN are driven by the host, DATA OUT is sampled after each
/// rising CLK edge while CS is held high. Dropping CS ends an instruction.
///
/// Instructions:
/// - Startbit: "1"
/// - 2-bit Opcode
/// - 6-bit Address
///
/// Opcodes: (@ address)
/// - 0b10: READ 16-bits from address, recv DATA
/// - 0b01: WRITE 16-bits to address, send DATA
/// - 0b11: ERASE at address (set all bits to "1")
/// - 0b00 @ 0b00????: EWDS (erase/write disable), no DATA
/// - 0b00 @ 0b01????: WRAL (write all), DATA
/// - 0b00 @ 0b10????: ERAL (erase all), no DATA
/// - 0b00 @ 0b11????: EWEN (erase/write enable), no DATA
///
/// WRITE/ERASE/WRAL/ERAL start a self-timed programming cycle when CS drops;
/// selecting the chip again shows DATA OUT low while it is busy.

mod command;
mod hardware;
mod low_level;
mod operations;

use failure::Fail;

pub use self::command::{
	CELL_COUNT,
	CellIndex,
	Opcode,
};

pub use self::hardware::{
	DELAY_UNIT,
	Delay,
	Hardware,
	OutPins,
	Sleep,
	Spin,
};

pub use self::low_level::{
	LowLevel,
	POLL_BUDGET,
	Transaction,
};

pub use self::operations::{
	EepromOperations,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Fail)]
pub enum EepromError {
	#[fail(display = "EEPROM write/erase cycle timed out")]
	Timeout,
	#[fail(display = "Verify failed at cell {}: expected {:04x}, EEPROM has {:04x}", index, expected, found)]
	VerifyMismatch {
		index: CellIndex,
		expected: u16,
		found: u16,
	},
	#[fail(display = "Erasing cell {} failed", index)]
	EraseFailed {
		index: CellIndex,
	},
	#[fail(display = "Writing all cells failed at cell {}", index)]
	WriteAllFailed {
		index: CellIndex,
	},
}
