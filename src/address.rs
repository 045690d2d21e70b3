//! Resolution of raw wallet address payloads into text addresses.
//!
//! CIP-30 wallets (Yoroi) hand out addresses as hex-encoded bytes. Balance
//! queries need the bech32 text form, which depends on the header byte:
//!
//! - high nibble: address type (base, pointer, enterprise, reward)
//! - low nibble: network id (1 = mainnet, anything else = testnet)

use bech32::{Bech32, Hrp};
use thiserror::Error;

const KEY_HASH_LEN: usize = 28;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("address payload is empty")]
    Empty,

    #[error("address payload is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("unsupported address type {0:#x}")]
    UnsupportedType(u8),

    #[error("{kind} address must be {expected} bytes, got {actual}")]
    BadLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("malformed pointer in pointer address")]
    BadPointer,

    #[error("bech32 encoding failed: {0}")]
    Encoding(String),
}

/// Shelley-era address shapes, keyed by the header's high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressShape {
    Base,
    Pointer,
    Enterprise,
    Reward,
}

impl AddressShape {
    fn from_header(header: u8) -> Result<Self, DecodeError> {
        match header >> 4 {
            0..=3 => Ok(AddressShape::Base),
            4 | 5 => Ok(AddressShape::Pointer),
            6 | 7 => Ok(AddressShape::Enterprise),
            14 | 15 => Ok(AddressShape::Reward),
            // 8 is Byron (base58, not bech32); 9..=13 are reserved.
            other => Err(DecodeError::UnsupportedType(other)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AddressShape::Base => "base",
            AddressShape::Pointer => "pointer",
            AddressShape::Enterprise => "enterprise",
            AddressShape::Reward => "reward",
        }
    }

    fn prefix(&self, mainnet: bool) -> &'static str {
        match (self, mainnet) {
            (AddressShape::Reward, true) => "stake",
            (AddressShape::Reward, false) => "stake_test",
            (_, true) => "addr",
            (_, false) => "addr_test",
        }
    }
}

/// Convert a hex-encoded Cardano address into its bech32 text form.
///
/// Surrounding whitespace and a `0x` prefix are ignored. Same input always
/// yields the same output.
pub fn hex_to_bech32(payload: &str) -> Result<String, DecodeError> {
    let trimmed = payload.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = hex::decode(trimmed)?;
    let header = bytes[0];
    let shape = AddressShape::from_header(header)?;
    validate_length(shape, &bytes)?;

    let mainnet = header & 0x0f == 1;
    let hrp = Hrp::parse(shape.prefix(mainnet)).map_err(|e| DecodeError::Encoding(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, &bytes).map_err(|e| DecodeError::Encoding(e.to_string()))
}

fn validate_length(shape: AddressShape, bytes: &[u8]) -> Result<(), DecodeError> {
    let expected = match shape {
        AddressShape::Base => 1 + 2 * KEY_HASH_LEN,
        AddressShape::Enterprise | AddressShape::Reward => 1 + KEY_HASH_LEN,
        AddressShape::Pointer => {
            // Header + payment credential + three variable-length naturals.
            let min = 1 + KEY_HASH_LEN + 3;
            if bytes.len() < min {
                return Err(DecodeError::BadLength {
                    kind: shape.name(),
                    expected: min,
                    actual: bytes.len(),
                });
            }
            return validate_pointer(&bytes[1 + KEY_HASH_LEN..]);
        }
    };

    if bytes.len() != expected {
        return Err(DecodeError::BadLength {
            kind: shape.name(),
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// A pointer is exactly three big-endian base-128 naturals (slot, tx, cert).
fn validate_pointer(mut rest: &[u8]) -> Result<(), DecodeError> {
    for _ in 0..3 {
        let end = rest
            .iter()
            .position(|b| b & 0x80 == 0)
            .ok_or(DecodeError::BadPointer)?;
        // u64 fits in at most 10 groups of seven bits.
        if end >= 10 {
            return Err(DecodeError::BadPointer);
        }
        rest = &rest[end + 1..];
    }
    if rest.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::BadPointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYMENT: &str = "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
    const STAKE: &str = "337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";

    #[test]
    fn encodes_mainnet_base_address() {
        let hex = format!("01{PAYMENT}{STAKE}");
        assert_eq!(
            hex_to_bech32(&hex).unwrap(),
            "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x"
        );
    }

    #[test]
    fn encodes_testnet_base_address() {
        let hex = format!("00{PAYMENT}{STAKE}");
        assert_eq!(
            hex_to_bech32(&hex).unwrap(),
            "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgs68faae"
        );
    }

    #[test]
    fn encodes_enterprise_and_reward_addresses() {
        assert_eq!(
            hex_to_bech32(&format!("61{PAYMENT}")).unwrap(),
            "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8"
        );
        assert_eq!(
            hex_to_bech32(&format!("60{PAYMENT}")).unwrap(),
            "addr_test1vz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerspjrlsz"
        );
        assert_eq!(
            hex_to_bech32(&format!("e1{STAKE}")).unwrap(),
            "stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw"
        );
    }

    #[test]
    fn encodes_pointer_address() {
        let hex = format!("41{PAYMENT}8198bd431b03");
        assert_eq!(
            hex_to_bech32(&hex).unwrap(),
            "addr1gx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer5pnz75xxcrzqf96k"
        );
    }

    #[test]
    fn tolerates_prefix_case_and_whitespace() {
        let plain = hex_to_bech32(&format!("61{PAYMENT}")).unwrap();
        let noisy = hex_to_bech32(&format!("  0x61{}\n", PAYMENT.to_uppercase())).unwrap();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn decoding_is_deterministic() {
        let hex = format!("01{PAYMENT}{STAKE}");
        let first = hex_to_bech32(&hex).unwrap();
        for _ in 0..5 {
            assert_eq!(hex_to_bech32(&hex).unwrap(), first);
        }
    }

    #[test]
    fn rejects_bad_payloads() {
        assert_eq!(hex_to_bech32("   "), Err(DecodeError::Empty));
        assert!(matches!(hex_to_bech32("zz"), Err(DecodeError::InvalidHex(_))));
        assert!(matches!(hex_to_bech32("abc"), Err(DecodeError::InvalidHex(_))));
        assert_eq!(
            hex_to_bech32(&format!("82{PAYMENT}")),
            Err(DecodeError::UnsupportedType(8))
        );
        assert_eq!(
            hex_to_bech32(&format!("01{PAYMENT}")),
            Err(DecodeError::BadLength {
                kind: "base",
                expected: 57,
                actual: 29
            })
        );
        assert_eq!(
            hex_to_bech32(&format!("41{PAYMENT}8198bd431b")),
            Err(DecodeError::BadPointer)
        );
    }
}
