//! Hardware address validation, normalization, and generation.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use thiserror::Error;

/// Upper bound on random draws before generation gives up.
///
/// Half of all random first octets are unicast, so a working RNG needs about
/// two draws; reaching this bound means the RNG is broken.
pub const MAX_RANDOM_ATTEMPTS: u32 = 64;

/// Error type for hardware address parsing and generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacError {
    /// Input is not six two-digit hex groups separated by `:` or `-`.
    #[error("Invalid MAC '{input}': expected XX:XX:XX:XX:XX:XX")]
    Malformed {
        /// The rejected input
        input: String,
    },

    /// Input is well-formed but the first octet has the group bit set.
    #[error("Invalid MAC '{input}': first octet must be unicast (even)")]
    Multicast {
        /// The rejected input
        input: String,
    },

    /// The random source never produced a unicast address.
    #[error("Failed to generate a unicast MAC after {attempts} attempts")]
    GenerationExhausted {
        /// Number of draws made
        attempts: u32,
    },
}

/// A six-octet unicast hardware address.
///
/// # Representations
///
/// - [`Display`](fmt::Display) yields the canonical user-facing form:
///   lowercase, colon-separated (`b8:3a:37:04:78:d1`).
/// - [`MacAddress::to_store_format`] yields the persisted-store form:
///   uppercase, unseparated (`B83A370478D1`).
///
/// # Invariant
///
/// Bit 0 of the first octet is always clear. Locally administered addresses
/// (bit 1 set) are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Parses and validates a MAC address string.
    ///
    /// Accepts `:` or `-` separators (mixed is fine) and either letter case.
    /// No surrounding whitespace is tolerated; callers trim user input.
    ///
    /// # Errors
    ///
    /// Returns [`MacError::Malformed`] for any shape other than six two-digit
    /// hex groups, and [`MacError::Multicast`] if the first octet is odd.
    ///
    /// # Examples
    ///
    /// ```
    /// use macshift::network::MacAddress;
    ///
    /// let mac = MacAddress::parse("B8-3A-37-04-78-D1").unwrap();
    /// assert_eq!(mac.to_string(), "b8:3a:37:04:78:d1");
    /// assert!(MacAddress::parse("ff:ff:ff:ff:ff:ff").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, MacError> {
        let malformed = || MacError::Malformed {
            input: input.to_string(),
        };

        let normalized = input.replace('-', ":");
        let groups: Vec<&str> = normalized.split(':').collect();
        if groups.len() != 6 {
            return Err(malformed());
        }

        let mut octets = [0u8; 6];
        for (octet, group) in octets.iter_mut().zip(&groups) {
            if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| malformed())?;
        }

        let mac = Self(octets);
        if !mac.is_unicast() {
            return Err(MacError::Multicast {
                input: input.to_string(),
            });
        }

        Ok(mac)
    }

    /// Generates a random unicast address using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns [`MacError::GenerationExhausted`] if no unicast address was
    /// drawn within [`MAX_RANDOM_ATTEMPTS`].
    pub fn random() -> Result<Self, MacError> {
        Self::random_with(&mut rand::rng())
    }

    /// Generates a random unicast address from the given RNG.
    ///
    /// Draws six octets at a time and keeps the first draw that validates.
    /// The octets are never masked, so every unicast address is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`MacError::GenerationExhausted`] if no unicast address was
    /// drawn within [`MAX_RANDOM_ATTEMPTS`].
    pub fn random_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, MacError> {
        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let mut octets = [0u8; 6];
            rng.fill_bytes(&mut octets);

            let candidate = Self(octets);
            if candidate.is_unicast() {
                return Ok(candidate);
            }
        }

        Err(MacError::GenerationExhausted {
            attempts: MAX_RANDOM_ATTEMPTS,
        })
    }

    /// Returns the raw octets.
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Returns true if the group (multicast) bit is clear.
    #[must_use]
    pub const fn is_unicast(&self) -> bool {
        self.0[0] & 0x01 == 0
    }

    /// Returns true if the locally administered bit is set.
    #[must_use]
    pub const fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// Formats the address the way the adapter registry stores overrides:
    /// twelve uppercase hex digits, no separators.
    #[must_use]
    pub fn to_store_format(&self) -> String {
        self.0.iter().map(|octet| format!("{octet:02X}")).collect()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RNG that replays a fixed byte pattern.
    struct PatternRng {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl PatternRng {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.to_vec(),
                pos: 0,
            }
        }

        fn next_byte(&mut self) -> u8 {
            let byte = self.bytes[self.pos % self.bytes.len()];
            self.pos += 1;
            byte
        }
    }

    impl RngCore for PatternRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for byte in dst {
                *byte = self.next_byte();
            }
        }
    }

    mod parse {
        use super::*;

        #[test]
        fn separator_styles_normalize_to_same_canonical_form() {
            let inputs = [
                "B8:3A:37:04:78:D1",
                "b8:3a:37:04:78:d1",
                "B8-3A-37-04-78-D1",
                "b8-3a:37-04:78-d1",
            ];

            for input in inputs {
                let mac = MacAddress::parse(input).unwrap();
                assert_eq!(mac.to_string(), "b8:3a:37:04:78:d1", "input: {input}");
            }
        }

        #[test]
        fn accepts_locally_administered() {
            let mac = MacAddress::parse("02:00:00:00:00:01").unwrap();
            assert!(mac.is_locally_administered());
            assert!(mac.is_unicast());
        }

        #[test]
        fn rejects_multicast_first_octet() {
            for input in ["ff:ff:ff:ff:ff:ff", "01:00:5e:00:00:fb", "33-33-00-00-00-01"] {
                assert!(
                    matches!(MacAddress::parse(input), Err(MacError::Multicast { .. })),
                    "input: {input}"
                );
            }
        }

        #[test]
        fn rejects_malformed_shapes() {
            let inputs = [
                "",
                "b8:3a:37:04:78",
                "b8:3a:37:04:78:d1:00",
                "b83a370478d1",
                "b8:3a:37:04:78:d",
                "b8:3a:37:04:78:d1a",
                "g8:3a:37:04:78:d1",
                "+8:3a:37:04:78:d1",
                "b8.3a.37.04.78.d1",
                " b8:3a:37:04:78:d1",
                "b8::3a:37:04:78",
            ];

            for input in inputs {
                assert!(
                    matches!(MacAddress::parse(input), Err(MacError::Malformed { .. })),
                    "input: {input:?}"
                );
            }
        }

        #[test]
        fn from_str_matches_parse() {
            let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();
            assert_eq!(mac.octets(), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        }

        #[test]
        fn error_messages_include_input() {
            let err = MacAddress::parse("nope").unwrap_err();
            assert!(err.to_string().contains("nope"));

            let err = MacAddress::parse("01:00:00:00:00:00").unwrap_err();
            assert!(err.to_string().contains("unicast"));
        }
    }

    mod random {
        use super::*;

        #[test]
        fn generated_addresses_always_validate() {
            for _ in 0..500 {
                let mac = MacAddress::random().unwrap();
                let reparsed = MacAddress::parse(&mac.to_string()).unwrap();
                assert_eq!(reparsed, mac);
            }
        }

        #[test]
        fn skips_multicast_draws() {
            // First draw starts with 0x01 (multicast), second with 0x02.
            let mut rng = PatternRng::new(&[
                0x01, 0x10, 0x20, 0x30, 0x40, 0x50, 0x02, 0x11, 0x22, 0x33, 0x44, 0x55,
            ]);

            let mac = MacAddress::random_with(&mut rng).unwrap();

            assert_eq!(mac.octets(), [0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
        }

        #[test]
        fn broken_rng_fails_instead_of_looping() {
            let mut rng = PatternRng::new(&[0xFF]);

            let result = MacAddress::random_with(&mut rng);

            assert_eq!(
                result,
                Err(MacError::GenerationExhausted {
                    attempts: MAX_RANDOM_ATTEMPTS
                })
            );
        }
    }

    mod store_format {
        use super::*;

        #[test]
        fn uppercase_without_separators() {
            let mac = MacAddress::parse("b8:3a:37:04:78:d1").unwrap();
            assert_eq!(mac.to_store_format(), "B83A370478D1");
        }

        #[test]
        fn keeps_leading_zeros() {
            let mac = MacAddress::parse("00:0a:00:0b:00:0c").unwrap();
            assert_eq!(mac.to_store_format(), "000A000B000C");
        }

        #[test]
        fn distinct_addresses_have_distinct_store_strings() {
            let a = MacAddress::parse("00:00:00:00:00:10").unwrap();
            let b = MacAddress::parse("00:00:00:00:01:00").unwrap();
            assert_ne!(a.to_store_format(), b.to_store_format());
        }
    }
}
