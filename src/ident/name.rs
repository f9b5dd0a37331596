/// Digits of `value` in `radix` (2..=36), lowercase letters above 9.
pub fn to_radix_string(mut value: u32, radix: u32) -> String {
	assert!(radix >= 2 && radix <= 36);

	// least significant digit first
	let mut digits = Vec::new();
	loop {
		let digit = (value % radix) as u8;
		value /= radix;
		digits.push(if digit > 9 { b'a' + digit - 10 } else { b'0' + digit });
		if value == 0 {
			break;
		}
	}

	// reverse in place
	let (mut first, mut last) = (0, digits.len() - 1);
	while first < last {
		digits.swap(first, last);
		first += 1;
		last -= 1;
	}

	digits.into_iter().map(char::from).collect()
}
