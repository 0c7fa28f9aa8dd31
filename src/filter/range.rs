use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::addr::{self, Address, HOST_PREFIX};
use crate::error::AppError;

/// `A.B.C.D` with an optional `/N` suffix, `N` in 0..=32.
static CIDR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?:(?:[01]?[0-9][0-9]?|2[0-4][0-9]|25[0-5])\.){3}(?:[01]?[0-9][0-9]?|2[0-4][0-9]|25[0-5]))(?:/([0-9]|[12][0-9]|3[0-2]))?$",
    )
    .expect("Invalid regex")
});

/// One CIDR block from the deny list. A bare address is a `/32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DenyRange {
    /// The address as written, before masking.
    address: Address,
    prefix_len: u8,
    start: Address,
    end: Address,
}

impl DenyRange {
    pub fn new(address: Address, prefix_len: u8) -> Self {
        debug_assert!(prefix_len <= HOST_PREFIX, "prefix length {} out of range", prefix_len);
        let (start, end) = addr::range_bounds(address, prefix_len);
        Self { address, prefix_len, start, end }
    }

    pub fn host(address: Address) -> Self {
        Self::new(address, HOST_PREFIX)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    /// Number of addresses in this block.
    pub fn size(&self) -> u64 {
        addr::block_size(self.prefix_len)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.start <= address && address <= self.end
    }

    /// Returns `true` if `other` lies entirely inside this block.
    pub fn covers(&self, other: &DenyRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl FromStr for DenyRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = CIDR_PATTERN
            .captures(s)
            .ok_or_else(|| AppError::Format(format!("not an IPv4 address or CIDR block: {:?}", s)))?;

        let address = addr::parse_address(&caps[1])?;
        let prefix_len = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse::<u8>()
                .map_err(|_| AppError::Format(format!("bad prefix length in {:?}", s)))?,
            None => HOST_PREFIX,
        };

        Ok(Self::new(address, prefix_len))
    }
}

/// Network form, e.g. `10.0.0.100/24` displays as `10.0.0.0/24`.
impl fmt::Display for DenyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", addr::format_address(self.start), self.prefix_len)
    }
}

/// Start address ascending, then broader blocks first. The written address
/// only breaks the remaining tie so that the order is total.
impl Ord for DenyRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.prefix_len.cmp(&other.prefix_len))
            .then(self.address.cmp(&other.address))
    }
}

impl PartialOrd for DenyRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
