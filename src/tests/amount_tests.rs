use crate::core::amount::{BaseUnits, decimals_for_currency, from_base_units, to_base_units};
use crate::core::errors::AmountError;

#[test]
fn test_to_base_units_known_values() {
    assert_eq!(to_base_units(&1.5, 8).unwrap(), "150000000");
    assert_eq!(to_base_units(&0.00000001, 8).unwrap(), "1");
    assert_eq!(to_base_units(&123.456789, 6).unwrap(), "123456789");
    assert_eq!(to_base_units("42", 6).unwrap(), "42000000");
    assert_eq!(to_base_units(".5", 2).unwrap(), "50");
}

#[test]
fn test_from_base_units_known_values() {
    assert_eq!(from_base_units("150000000", 8).unwrap(), "1.5");
    assert_eq!(from_base_units("1", 8).unwrap(), "0.00000001");
    assert_eq!(from_base_units("42000000", 6).unwrap(), "42");
    assert_eq!(from_base_units(&123456789u64, 6).unwrap(), "123.456789");
}

#[test]
fn test_zero_and_empty_inputs() {
    assert_eq!(to_base_units("", 6).unwrap(), "0");
    assert_eq!(to_base_units("0", 6).unwrap(), "0");
    assert_eq!(to_base_units("-0.0", 6).unwrap(), "0");
    assert_eq!(from_base_units("", 6).unwrap(), "0");
    assert_eq!(from_base_units("000", 6).unwrap(), "0");
}

#[test]
fn test_excess_precision_is_truncated() {
    assert_eq!(to_base_units("1.23456789", 2).unwrap(), "123");
    assert_eq!(to_base_units("0.009", 2).unwrap(), "0");
}

#[test]
fn test_zero_decimals_keeps_integer() {
    assert_eq!(to_base_units("17.9", 0).unwrap(), "17");
    assert_eq!(from_base_units("17", 0).unwrap(), "17");
}

#[test]
fn test_round_trip_for_canonical_strings() {
    for (base, decimals) in [("1", 8), ("150000000", 8), ("123456789", 6), ("100", 2), ("987654321012345678901", 6)] {
        let human = from_base_units(base, decimals).unwrap();
        assert_eq!(to_base_units(&human, decimals).unwrap(), base, "via {}", human);
    }
}

#[test]
fn test_large_amounts_stay_exact() {
    let huge = "123456789012345678901234567890.123456";
    assert_eq!(to_base_units(huge, 6).unwrap(), "123456789012345678901234567890123456");
}

#[test]
fn test_invalid_inputs_are_rejected() {
    assert!(matches!(to_base_units("abc", 6), Err(AmountError::Invalid(_))));
    assert!(matches!(to_base_units("1.2.3", 6), Err(AmountError::Invalid(_))));
    assert!(matches!(to_base_units(".", 6), Err(AmountError::Invalid(_))));
    assert!(matches!(to_base_units("-1.5", 6), Err(AmountError::Negative(_))));
    assert!(matches!(from_base_units("1.5", 6), Err(AmountError::Invalid(_))));
}

#[test]
fn test_base_units_arithmetic_and_overflow() {
    let a = BaseUnits::from_decimal("1.25", 6).unwrap();
    let b = BaseUnits::from(750_000u64);
    assert_eq!(a.checked_add(b).unwrap().to_decimal(6), "2");
    assert!(matches!(
        BaseUnits::new(u128::MAX).checked_add(BaseUnits::new(1)),
        Err(AmountError::Overflow(_))
    ));
    assert!(matches!(
        BaseUnits::from_decimal("999999999999999999999999999999999999999999", 6),
        Err(AmountError::Overflow(_))
    ));
    assert_eq!(BaseUnits::new(u128::from(u64::MAX) + 1).as_u64(), None);
}

#[test]
fn test_base_units_serialize_as_strings() {
    let json = serde_json::to_string(&BaseUnits::new(1_500_000)).unwrap();
    assert_eq!(json, "\"1500000\"");
    let parsed: BaseUnits = serde_json::from_str("\"42\"").unwrap();
    assert_eq!(parsed, BaseUnits::new(42));
}

#[test]
fn test_currency_decimals() {
    assert_eq!(decimals_for_currency("USDC"), 6);
    assert_eq!(decimals_for_currency("APT"), 8);
    assert_eq!(decimals_for_currency("usdc"), 6);
    assert_eq!(decimals_for_currency("DOGE"), 6);
}

#[test]
fn test_base_units_to_f64() {
    assert_eq!(BaseUnits::new(87_490_000).to_f64(6), 87.49);
    assert_eq!(BaseUnits::new(150_000_000).to_f64(8), 1.5);
    assert_eq!(BaseUnits::new(42).to_f64(0), 42.0);
    assert_eq!(BaseUnits::ZERO.to_f64(6), 0.0);
}
