//! Conversions between on-chain integer quantities and the strings shown to users.

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};
use chrono::DateTime;
use snafu::{ensure, ResultExt, Snafu};

pub const ETHER_DECIMALS: u8 = 18;

/// Fixed number of fractional digits used when displaying a wallet balance.
pub const BALANCE_DISPLAY_PLACES: u8 = 8;

#[derive(Debug, Snafu)]
pub enum FormatError {
    #[snafu(display("Invalid amount {input:?}: {source}"))]
    InvalidAmount {
        input: String,
        source: alloy::primitives::utils::UnitsError,
    },

    #[snafu(display("Amount must not be negative: {input:?}"))]
    NegativeAmount { input: String },

    #[snafu(display("Invalid hex quantity {input:?}"))]
    InvalidHexQuantity { input: String },

    #[snafu(display("Cannot format {value} with {decimals} decimals: {source}"))]
    Units {
        value: U256,
        decimals: u8,
        source: alloy::primitives::utils::UnitsError,
    },
}

pub type Result<T, E = FormatError> = std::result::Result<T, E>;

/// Shortens an address to its first 6 and last 4 characters, e.g. `0x1234...abcd`.
///
/// Inputs too short to be shortened are returned unchanged.
pub fn truncate_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Parses a decimal ether string (`"0.01"`) into wei.
pub fn parse_ether(amount: &str) -> Result<U256> {
    let trimmed = amount.trim();
    ensure!(
        !trimmed.starts_with('-'),
        NegativeAmountSnafu { input: amount }
    );
    let parsed = parse_units(trimmed, ETHER_DECIMALS).context(InvalidAmountSnafu { input: amount })?;
    Ok(parsed.get_absolute())
}

/// Formats a smallest-unit value with trailing fractional zeros removed.
///
/// `0` renders as `"0"`, `1.5 * 10^18` with 18 decimals as `"1.5"`.
pub fn format_units_trimmed(value: U256, decimals: u8) -> Result<String> {
    let full = format_units(value, decimals).context(UnitsSnafu { value, decimals })?;
    Ok(trim_fraction(&full))
}

pub fn format_ether(value: U256) -> Result<String> {
    format_units_trimmed(value, ETHER_DECIMALS)
}

/// Formats a balance rounded half-up to a fixed number of fractional digits.
pub fn format_fixed(value: U256, decimals: u8, places: u8) -> String {
    let ten = U256::from(10u8);
    let rounded = if decimals > places {
        let scale = ten.pow(U256::from(decimals - places));
        (value + scale / U256::from(2u8)) / scale
    } else {
        value * ten.pow(U256::from(places - decimals))
    };

    if places == 0 {
        return rounded.to_string();
    }

    let unit = ten.pow(U256::from(places));
    let whole = rounded / unit;
    let fraction = rounded % unit;
    format!(
        "{whole}.{fraction:0>width$}",
        fraction = fraction.to_string(),
        width = places as usize
    )
}

/// Wallet display format: ether with eight fractional digits.
pub fn format_balance(value: U256) -> String {
    format_fixed(value, ETHER_DECIMALS, BALANCE_DISPLAY_PLACES)
}

/// Parses a `0x`-prefixed hex quantity as returned by a JSON-RPC node.
pub fn parse_hex_quantity(input: &str) -> Result<u64> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    ensure!(!digits.is_empty(), InvalidHexQuantitySnafu { input });
    u64::from_str_radix(digits, 16).map_err(|_| FormatError::InvalidHexQuantity {
        input: input.to_string(),
    })
}

/// Renders a unix timestamp in seconds as a UTC date and time.
pub fn format_timestamp(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Groups the digits of an integer in threes: `30000000` becomes `30,000,000`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn trim_fraction(full: &str) -> String {
    match full.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => full.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x9146E804C874b4651C44685C95804A48b3F935f4";

    #[test]
    fn test_truncate_address() {
        let short = truncate_address(ADDRESS);
        assert_eq!(short, "0x9146...35f4");
        assert!(ADDRESS.starts_with(&short[..6]));
        assert!(ADDRESS.ends_with(&short[short.len() - 4..]));
    }

    #[test]
    fn test_truncate_address_keeps_fixed_shape_for_any_full_address() {
        for seed in 0u8..16 {
            let addr = format!("0x{}", alloy::hex::encode([seed; 20]));
            let short = truncate_address(&addr);
            assert_eq!(short.len(), 13);
            assert_eq!(&short[6..9], "...");
        }
    }

    #[test]
    fn test_truncate_short_input_is_unchanged() {
        assert_eq!(truncate_address("0xabc"), "0xabc");
        assert_eq!(truncate_address(""), "");
    }

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("0.01").unwrap(), U256::from(10u64).pow(U256::from(16u8)));
        assert_eq!(parse_ether("1").unwrap(), U256::from(10u64).pow(U256::from(18u8)));
        assert!(parse_ether("abc").is_err());
        assert!(matches!(
            parse_ether("-1"),
            Err(FormatError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_format_ether_trims_zeros() {
        assert_eq!(format_ether(U256::ZERO).unwrap(), "0");
        assert_eq!(
            format_ether(U256::from(1_500_000_000_000_000_000u64)).unwrap(),
            "1.5"
        );
        assert_eq!(
            format_ether(U256::from(10_000_000_000_000_000u64)).unwrap(),
            "0.01"
        );
    }

    #[test]
    fn test_format_balance_rounds_to_eight_places() {
        assert_eq!(format_balance(U256::ZERO), "0.00000000");
        assert_eq!(
            format_balance(U256::from(1_234_567_895_000_000_000u64)),
            "1.23456790"
        );
        assert_eq!(format_fixed(U256::from(150u64), 2, 0), "2");
        assert_eq!(format_fixed(U256::from(15u64), 1, 3), "1.500");
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x10").unwrap(), 16);
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("ff").unwrap(), 255);
        assert!(parse_hex_quantity("0x").is_err());
        assert!(parse_hex_quantity("0xzz").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(30_000_000), "30,000,000");
    }
}
