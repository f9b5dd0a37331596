use std::hint;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

/// The serial EEPROM needs at least this long between two pin changes.
pub const DELAY_UNIT: Duration = Duration::from_micros(1);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Waits (at least) one `DELAY_UNIT`.
pub trait Delay {
	fn wait(&mut self);
}

/// Lets the OS schedule something else; a single wait usually takes much
/// longer than `DELAY_UNIT`, which slows down polling but is always safe.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Sleep;

impl Delay for Sleep {
	fn wait(&mut self) {
		reliable_sleep(DELAY_UNIT);
	}
}

/// Busy-waits on the monotonic clock.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Spin;

impl Delay for Spin {
	fn wait(&mut self) {
		let start = Instant::now();
		while start.elapsed() < DELAY_UNIT {
			hint::spin_loop();
		}
	}
}

impl<'a, D: ?Sized + Delay> Delay for &'a mut D {
	fn wait(&mut self) {
		D::wait(*self)
	}
}

impl<D: ?Sized + Delay> Delay for Box<D> {
	fn wait(&mut self) {
		D::wait(&mut **self)
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OutPins {
	pub chip_select: bool,
	pub clock: bool,
	pub data: bool,
}

pub trait Hardware {
	fn set_pins(&mut self, pins: OutPins);
	fn read_pin(&mut self) -> bool;

	// delay for (at least) one `DELAY_UNIT`
	fn delay(&mut self);
}
