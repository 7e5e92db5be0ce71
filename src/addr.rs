use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddrError {
    #[error("expected 6 colon separated octets, got {0}")]
    Length(usize),
    #[error("bad octet {0:?}")]
    Octet(String),
}

/// Bluetooth device address, octets in the order they are printed
/// (`00:16:53:3F:71:F0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr(pub [u8; 6]);

impl FromStr for BdAddr {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 6 {
            return Err(AddrError::Length(parts.len()));
        }
        let mut out = [0u8; 6];
        for (slot, part) in out.iter_mut().zip(parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AddrError::Octet(part.to_string()));
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| AddrError::Octet(part.to_string()))?;
        }
        Ok(BdAddr(out))
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_print() {
        let a: BdAddr = "00:16:53:3f:71:F0".parse().unwrap();
        assert_eq!(a.0, [0x00, 0x16, 0x53, 0x3F, 0x71, 0xF0]);
        assert_eq!(a.to_string(), "00:16:53:3F:71:F0");
    }

    #[test]
    fn bad_addresses() {
        assert_eq!("00:16:53".parse::<BdAddr>(), Err(AddrError::Length(3)));
        assert!(matches!(
            "00:16:53:3F:71:G0".parse::<BdAddr>(),
            Err(AddrError::Octet(_))
        ));
        assert!(matches!(
            "00:16:53:3F:71:F".parse::<BdAddr>(),
            Err(AddrError::Octet(_))
        ));
        assert_eq!(
            "+0:16:53:3F:71:F0".parse::<BdAddr>(),
            Err(AddrError::Octet("+0".into()))
        );
    }
}
