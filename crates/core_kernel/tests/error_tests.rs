//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::ports::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("claim amount must not be negative");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "claim amount must not be negative"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_invalid_state() {
    let error = CoreError::invalid_state("Cannot transition from Submitted to Approved");

    match error {
        CoreError::InvalidStateTransition(msg) => assert!(msg.contains("Cannot transition")),
        _ => panic!("Expected InvalidStateTransition error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("stage plan is empty");
    assert!(error.to_string().starts_with("Configuration error"));
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("INR".to_string(), "USD".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
}

#[test]
fn test_port_error_validation_field() {
    let error = PortError::validation_field("must be positive", "policy_coverage_limit");

    match error {
        PortError::Validation { field, .. } => {
            assert_eq!(field.as_deref(), Some("policy_coverage_limit"))
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_conflict_is_not_transient() {
    let error = PortError::conflict("claim already in progress");
    assert!(!error.is_transient());
    assert!(error.to_string().contains("already in progress"));
}
