use std::net::Ipv4Addr;

use rand::Rng;

/// Synthetic dotted-quad identifier. Never parsed from outside input.
pub type Address = String;

/// Private-network and loopback prefixes rejected by the firewall.
pub const DEFAULT_BLOCKED_RANGES: [&str; 3] = ["10.", "127.", "192.168."];

/// Draws four octets uniformly from `0..=255`.
pub fn random_address<R: Rng + ?Sized>(rng: &mut R) -> Address {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(0..=255u8),
        rng.gen_range(0..=255u8),
        rng.gen_range(0..=255u8),
        rng.gen_range(0..=255u8)
    )
}

pub fn is_well_formed(addr: &str) -> bool {
    (7..=15).contains(&addr.len()) && addr.parse::<Ipv4Addr>().is_ok()
}

/// Prefix match on the textual form, so `"10."` covers `10.0.0.0/8` but not `100.x`.
pub fn in_range(addr: &str, prefix: &str) -> bool {
    !prefix.is_empty() && addr.starts_with(prefix)
}
