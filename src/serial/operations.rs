use super::{
	CELL_COUNT,
	CellIndex,
	EepromError,
	Hardware,
	LowLevel,
	Opcode,
};

pub trait EepromOperations: LowLevel {
	fn read(&mut self, index: CellIndex) -> u16 {
		let mut tx = self.send_opcode(Opcode::Read(index));
		let word = tx.receive_word();
		debug!("EEPROM read @{:02x}: {:04x}", index.value(), word);
		word
	}

	fn erase(&mut self, index: CellIndex) -> Result<(), EepromError> {
		debug!("EEPROM erase @{:02x}", index.value());
		{
			let mut tx = self.send_opcode(Opcode::EraseWriteEnable);
			for _ in 0..4 {
				tx.clock_bit(false);
			}
		}
		self.send_opcode(Opcode::Erase(index)).finish();
		self.finish_programming()
	}

	// always verifies the written word
	fn write(&mut self, index: CellIndex, word: u16) -> Result<(), EepromError> {
		debug!("EEPROM write @{:02x}: {:04x}", index.value(), word);
		self.send_opcode(Opcode::EraseWriteEnable).finish();
		{
			let mut tx = self.send_opcode(Opcode::Write(index));
			tx.send_bits(word, 16);
		}
		self.finish_programming()?;

		let found = self.read(index);
		if found != word {
			warn!("EEPROM verify failed @{:02x}: expected {:04x}, found {:04x}", index.value(), word, found);
			return Err(EepromError::VerifyMismatch {
				index,
				expected: word,
				found,
			});
		}
		Ok(())
	}

	// if the erase succeeds but the write fails the cell stays erased
	fn erase_then_write(&mut self, index: CellIndex, word: u16) -> Result<(), EepromError> {
		if let Err(e) = self.erase(index) {
			warn!("EEPROM erase @{:02x} failed: {}", index.value(), e);
			return Err(EepromError::EraseFailed { index });
		}
		self.write(index, word)
	}

	fn read_all(&mut self) -> [u16; CELL_COUNT] {
		let mut words = [0u16; CELL_COUNT];
		for index in CellIndex::all() {
			words[index.value() as usize] = self.read(index);
		}
		words
	}

	// not transactional: cells before a failing one keep their new content
	fn write_all(&mut self, words: &[u16; CELL_COUNT]) -> Result<(), EepromError> {
		for index in CellIndex::all() {
			if let Err(e) = self.erase_then_write(index, words[index.value() as usize]) {
				warn!("Writing all EEPROM cells stopped @{:02x}: {}", index.value(), e);
				return Err(EepromError::WriteAllFailed { index });
			}
		}
		Ok(())
	}

	fn erase_chip(&mut self) -> Result<(), EepromError> {
		debug!("EEPROM erase all");
		self.send_opcode(Opcode::EraseWriteEnable).finish();
		self.send_opcode(Opcode::EraseAll).finish();
		self.finish_programming()
	}

	// write the same word into every cell; verifies the used cells
	fn fill_chip(&mut self, word: u16) -> Result<(), EepromError> {
		debug!("EEPROM write all: {:04x}", word);
		self.send_opcode(Opcode::EraseWriteEnable).finish();
		{
			let mut tx = self.send_opcode(Opcode::WriteAll);
			tx.send_bits(word, 16);
		}
		self.finish_programming()?;

		for index in CellIndex::all() {
			let found = self.read(index);
			if found != word {
				warn!("EEPROM verify failed @{:02x}: expected {:04x}, found {:04x}", index.value(), word, found);
				return Err(EepromError::VerifyMismatch {
					index,
					expected: word,
					found,
				});
			}
		}
		Ok(())
	}

	// wait for the programming cycle started by the previous instruction,
	// then disable erase/write again (also after a timeout)
	fn finish_programming(&mut self) -> Result<(), EepromError> {
		let ready = self.select().wait_ready();
		self.send_opcode(Opcode::EraseWriteDisable).finish();
		ready
	}
}

impl<H: Hardware+?Sized> EepromOperations for H {
}
