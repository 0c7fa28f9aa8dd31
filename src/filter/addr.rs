//! IPv4 address arithmetic.
//!
//! Addresses are plain `u32` values in big-endian octet order, so
//! `1.2.3.4` is `0x01020304`. Octets may carry leading zeros (`010.0.0.1`)
//! but never more than three digits.

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

/// An IPv4 address as a 32-bit unsigned integer.
pub type Address = u32;

/// Largest prefix length, i.e. a single host.
pub const HOST_PREFIX: u8 = 32;

/// `BLOCK_SIZES[n]` is the number of addresses in a `/n` block.
pub const BLOCK_SIZES: [u64; 33] = {
    let mut sizes = [0u64; 33];
    let mut n = 0;
    while n < 33 {
        sizes[n] = 1u64 << (32 - n);
        n += 1;
    }
    sizes
};

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:[01]?[0-9][0-9]?|2[0-4][0-9]|25[0-5])\.){3}(?:[01]?[0-9][0-9]?|2[0-4][0-9]|25[0-5])$")
        .expect("Invalid regex")
});

/// Returns `true` if `text` is exactly four dot-separated decimal octets.
///
/// Whitespace anywhere, a CIDR suffix, or any octet above 255 makes it invalid.
pub fn is_valid_address_format(text: &str) -> bool {
    ADDRESS_PATTERN.is_match(text)
}

/// Parse a dotted-quad string into an [`Address`].
pub fn parse_address(text: &str) -> AppResult<Address> {
    if !is_valid_address_format(text) {
        return Err(AppError::Format(format!("not an IPv4 address: {:?}", text)));
    }

    let mut value: Address = 0;
    for octet in text.split('.') {
        let octet: u8 = octet
            .parse()
            .map_err(|_| AppError::Format(format!("bad octet {:?} in {:?}", octet, text)))?;
        value = (value << 8) | Address::from(octet);
    }
    Ok(value)
}

/// Render an [`Address`] back to dotted-quad form.
pub fn format_address(address: Address) -> String {
    Ipv4Addr::from(address).to_string()
}

/// Number of addresses in a block of the given prefix length.
///
/// Callers guarantee `prefix_len <= 32`.
pub fn block_size(prefix_len: u8) -> u64 {
    BLOCK_SIZES[usize::from(prefix_len)]
}

/// First and last address (inclusive) of the block containing `address`.
pub fn range_bounds(address: Address, prefix_len: u8) -> (Address, Address) {
    let host_mask = (block_size(prefix_len) - 1) as Address;
    let start = address & !host_mask;
    (start, start | host_mask)
}
