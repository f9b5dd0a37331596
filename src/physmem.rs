use std::fmt;
use std::fs;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr;
use std::str;

use libc::{
	MAP_FAILED,
	MAP_SHARED,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	_SC_PAGESIZE,
	c_void,
	mmap,
	munmap,
	off_t,
	sysconf,
};

use crate::mmodule::RegisterAccess;

const PATH_DEV_MEM: &str = "/dev/mem";

/// Physical bus address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PhysAddr(pub u64);

impl fmt::Display for PhysAddr {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x}", self.0)
	}
}

impl str::FromStr for PhysAddr {
	type Err = ::failure::Error;

	// hexadecimal, "0x" prefix optional
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = if s.starts_with("0x") || s.starts_with("0X") { &s[2..] } else { s };
		ensure!(!digits.is_empty() && digits.len() <= 16, "invalid physical address: {:?}", s);
		let addr = with_context!(("invalid physical address: {}", s),
			Ok(u64::from_str_radix(digits, 16)?)
		)?;
		Ok(PhysAddr(addr))
	}
}

/// Mapping of a physical memory window, accessed uncached
#[derive(Debug)]
pub struct Mapped {
	map: ptr::NonNull<u8>, // page aligned start of mapping
	map_len: usize,
	offset: usize, // window start within mapping
	len: usize,
	address: PhysAddr,
}

impl Drop for Mapped {
	fn drop(&mut self) {
		let res = unsafe {
			munmap(
				self.map.as_ptr() as *mut c_void,
				self.map_len,
			)
		};
		if 0 != res {
			error!("munmap of {} failed: {}", self.address, io::Error::last_os_error());
		}
	}
}

impl Mapped {
	pub fn address(&self) -> PhysAddr {
		self.address
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn read16(&self, offset: usize) -> u16 {
		assert!(offset & 1 == 0);
		assert!(offset + 1 < self.len);
		u16::from_le(unsafe {
			ptr::read_volatile(self.map.as_ptr().add(self.offset + offset) as *const u16)
		})
	}

	pub fn write16(&mut self, offset: usize, data: u16) {
		assert!(offset & 1 == 0);
		assert!(offset + 1 < self.len);
		unsafe {
			ptr::write_volatile(self.map.as_ptr().add(self.offset + offset) as *mut u16, data.to_le())
		}
	}
}

impl RegisterAccess for Mapped {
	fn read16(&mut self, offset: usize) -> u16 {
		Mapped::read16(self, offset)
	}

	fn write16(&mut self, offset: usize, value: u16) {
		Mapped::write16(self, offset, value)
	}
}

fn page_size() -> io::Result<usize> {
	let size = unsafe { sysconf(_SC_PAGESIZE) };
	if size <= 0 {
		return Err(io::Error::last_os_error());
	}
	Ok(size as usize)
}

// start of the containing page, offset into it, and length rounded up to
// whole pages
fn page_span(address: u64, len: usize, page_size: usize) -> (u64, usize, usize) {
	let page_mask = page_size as u64 - 1;
	let page_start = address & !page_mask;
	let offset = (address & page_mask) as usize;
	let map_len = (offset + len + page_size - 1) / page_size * page_size;
	(page_start, offset, map_len)
}

// TODO: exclusive open / file locking?
pub fn open_window(address: PhysAddr, len: usize) -> crate::AResult<Mapped> {
	assert!(len > 0);
	with_context!(("couldn't map physical memory at {}", address), {
		let (page_start, offset, map_len) = page_span(address.0, len, page_size()?);
		ensure!(page_start <= off_t::max_value() as u64, "address beyond mappable range");

		let f = fs::OpenOptions::new()
			.read(true)
			.write(true)
			.custom_flags(O_SYNC)
			.open(PATH_DEV_MEM)?;

		let area = unsafe {
			mmap(
				ptr::null_mut(),
				map_len,
				PROT_READ | PROT_WRITE,
				MAP_SHARED,
				f.as_raw_fd(),
				page_start as off_t,
			)
		};
		// the mapping stays valid after closing the file

		if area == MAP_FAILED {
			return Err(io::Error::last_os_error().into());
		}
		let map = match ptr::NonNull::new(area as *mut u8) {
			None => bail!("mmap returned NULL"),
			Some(map) => map,
		};
		debug!("mapped {} ({} bytes) at {:p}", address, len, map.as_ptr());

		Ok(Mapped {
			map,
			map_len,
			offset,
			len,
			address,
		})
	})
}
