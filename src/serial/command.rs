use std::fmt;
use std::str;

/// Number of 16-bit cells used on the module EEPROM
pub const CELL_COUNT: usize = 16;

/// Address of one of the `CELL_COUNT` EEPROM cells
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CellIndex(pub(crate) u8);

impl CellIndex {
	pub fn new(index: u8) -> Option<Self> {
		if (index as usize) < CELL_COUNT {
			Some(CellIndex(index))
		} else {
			None
		}
	}

	pub fn value(self) -> u8 {
		self.0
	}

	/// All cells in ascending order
	pub fn all() -> impl Iterator<Item = CellIndex> {
		(0..CELL_COUNT as u8).map(CellIndex)
	}
}

impl fmt::Display for CellIndex {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl str::FromStr for CellIndex {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let index = if s.starts_with("0x") {
			with_context!(("invalid EEPROM cell index: {}", s),
				Ok(u8::from_str_radix(&s[2..], 16)?)
			)?
		} else {
			with_context!(("invalid EEPROM cell index: {}", s),
				Ok(s.parse::<u8>()?)
			)?
		};

		CellIndex::new(index).ok_or_else(|| {
			format_err!("invalid EEPROM cell index: {} (must be below {})", index, CELL_COUNT)
		})
	}
}

/// Instructions understood by the serial EEPROM. Each is sent after the start
/// bit as 8 bits: 2-bit opcode followed by 6 address bits (the upper two are
/// always zero for the cells in use).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Opcode {
	Read(CellIndex),
	Write(CellIndex),
	Erase(CellIndex),
	EraseWriteEnable,
	EraseWriteDisable,
	EraseAll,
	WriteAll,
}

impl Opcode {
	pub fn code(self) -> u8 {
		match self {
			Opcode::Read(index) => 0x80 | index.0,
			Opcode::Write(index) => 0x40 | index.0,
			Opcode::Erase(index) => 0xc0 | index.0,
			Opcode::EraseWriteEnable => 0x30,
			Opcode::EraseWriteDisable => 0x00,
			Opcode::EraseAll => 0x20,
			Opcode::WriteAll => 0x10,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn cell_index_range() {
		assert_eq!(CellIndex::new(0), Some(CellIndex(0)));
		assert_eq!(CellIndex::new(15), Some(CellIndex(15)));
		assert_eq!(CellIndex::new(16), None);
		assert_eq!(CellIndex::new(63), None);
		assert_eq!(CellIndex::all().map(CellIndex::value).collect::<Vec<_>>(), (0..16).collect::<Vec<u8>>());
	}

	#[test]
	fn parse_cell_index() {
		assert_eq!("0".parse::<CellIndex>().unwrap(), CellIndex(0));
		assert_eq!("8".parse::<CellIndex>().unwrap(), CellIndex(8));
		assert_eq!("0xf".parse::<CellIndex>().unwrap(), CellIndex(15));
		assert!("16".parse::<CellIndex>().is_err());
		assert!("0x10".parse::<CellIndex>().is_err());
		assert!("-1".parse::<CellIndex>().is_err());
		assert!("".parse::<CellIndex>().is_err());
		assert!("x".parse::<CellIndex>().is_err());
	}

	#[test]
	fn opcode_encoding() {
		let cell = CellIndex(0x9);
		assert_eq!(Opcode::Read(cell).code(), 0x89);
		assert_eq!(Opcode::Write(cell).code(), 0x49);
		assert_eq!(Opcode::Erase(cell).code(), 0xc9);
		assert_eq!(Opcode::EraseWriteEnable.code(), 0x30);
		assert_eq!(Opcode::EraseWriteDisable.code(), 0x00);
		assert_eq!(Opcode::EraseAll.code(), 0x20);
		assert_eq!(Opcode::WriteAll.code(), 0x10);
	}
}
