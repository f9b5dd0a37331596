//! M-Module identification from the ID EEPROM
//!
//! Cells:
//! - 0: magic word (0x5346 "SF" for MEN / VITA conform modules)
//! - 1: module id
//! - 2: layout revision
//! - 8: product variant

use std::fmt;

use crate::serial::{
	CellIndex,
	EepromOperations,
};

mod name;

pub use self::name::to_radix_string;

pub const MOD_ID_MAGIC: u16 = 0x5346;
const MOD_ID_MS_MASK: u16 = 0x5300; // MSxx M-Module
const MOD_ID_N_MASK: u16 = 0x7d00; // MxxN M-Module
const MOD_ID_PREFIX_MASK: u16 = 0xff00;

const MAGIC_CELL: CellIndex = CellIndex(0);
const MODULE_ID_CELL: CellIndex = CellIndex(1);
const LAYOUT_REVISION_CELL: CellIndex = CellIndex(2);
const PRODUCT_VARIANT_CELL: CellIndex = CellIndex(8);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ModuleType {
	// no EEPROM or no valid content
	NoIdProm,
	Men,
	ThirdParty,
}

impl ModuleType {
	pub fn code(self) -> u32 {
		match self {
			ModuleType::NoIdProm => 0,
			ModuleType::Men => 1,
			ModuleType::ThirdParty => 2,
		}
	}
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModuleIdentity {
	pub modtype: ModuleType,
	pub devid: u32,
	pub devrev: u32,
	pub devname: String,
}

impl ModuleIdentity {
	pub fn no_id_prom() -> Self {
		ModuleIdentity {
			modtype: ModuleType::NoIdProm,
			devid: 0xffff_ffff,
			devrev: 0xffff_ffff,
			devname: String::new(),
		}
	}

	pub fn from_words(magic: u16, modid: u16, layout: u16, variant: u16) -> Self {
		// unprogrammed / missing EEPROM reads the same word everywhere
		if magic == modid && layout == variant && magic == layout {
			return ModuleIdentity::no_id_prom();
		}

		let devid = (magic as u32) << 16 | modid as u32;
		let devrev = (layout as u32) << 16 | variant as u32;

		if magic != MOD_ID_MAGIC {
			return ModuleIdentity {
				modtype: ModuleType::ThirdParty,
				devid,
				devrev,
				devname: String::new(),
			};
		}

		ModuleIdentity {
			modtype: ModuleType::Men,
			devid,
			devrev,
			devname: men_module_name(modid),
		}
	}
}

impl fmt::Display for ModuleIdentity {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"Type: 0x{:04x}, ID: 0x{:08x}, Rev: 0x{:08x}, Name: {}",
			self.modtype.code(),
			self.devid,
			self.devrev,
			self.devname,
		)
	}
}

// e.g. M34, MS9, M45N
fn men_module_name(modid: u16) -> String {
	let mut name = String::from("M");
	let mut number = modid;
	let mut suffix = "";

	match modid & MOD_ID_PREFIX_MASK {
		MOD_ID_MS_MASK => {
			name.push('S');
			number &= 0x00ff;
		},
		MOD_ID_N_MASK => {
			suffix = "N";
			number &= 0x00ff;
		},
		_ => (),
	}

	name.push_str(&to_radix_string(number as u32, 10));
	name.push_str(suffix);
	name
}

pub fn decode<H>(hardware: &mut H) -> ModuleIdentity
where
	H: EepromOperations + ?Sized,
{
	let magic = hardware.read(MAGIC_CELL);
	let modid = hardware.read(MODULE_ID_CELL);
	let layout = hardware.read(LAYOUT_REVISION_CELL);
	let variant = hardware.read(PRODUCT_VARIANT_CELL);
	debug!(
		"ID EEPROM: magic 0x{:04x}, module id 0x{:04x}, layout 0x{:04x}, variant 0x{:04x}",
		magic, modid, layout, variant,
	);

	ModuleIdentity::from_words(magic, modid, layout, variant)
}
