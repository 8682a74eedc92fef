//! Payment request validation
//!
//! Rule-based validation of an inbound payment request. Rules are evaluated
//! independently and every violation is collected, so a response can report
//! all problems at once. Validation is a pure function of the request and
//! the supplied clock; nothing is mutated.

use crate::services::payments::PaymentProcessRequest;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static CARD_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9]{14,19}$").expect("valid card number pattern"));
static CVV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9]{3,4}$").expect("valid cvv pattern"));

const SUPPORTED_CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

/// One violated rule, scoped to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationFailure {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate a payment request against the current wall clock.
pub fn validate(request: &PaymentProcessRequest) -> Vec<ValidationFailure> {
    validate_at(request, Utc::now().naive_utc())
}

/// Validate a payment request against an explicit clock. All violations are
/// returned in rule-declaration order; an empty vector means valid.
pub fn validate_at(request: &PaymentProcessRequest, now: NaiveDateTime) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    check_card_number(request, &mut failures);
    check_expiry_month(request, &mut failures);
    check_expiry_year(request, now, &mut failures);
    check_expiry_in_future(request, now, &mut failures);
    check_currency(request, &mut failures);
    check_amount(request, &mut failures);
    check_cvv(request, &mut failures);

    failures
}

fn check_card_number(request: &PaymentProcessRequest, failures: &mut Vec<ValidationFailure>) {
    let card_number = request.card_number.as_str();

    if card_number.is_empty() {
        failures.push(ValidationFailure::new(
            "card_number",
            "Card number is required.",
        ));
    }
    if card_number.len() < 14 || card_number.len() > 19 {
        failures.push(ValidationFailure::new(
            "card_number",
            "The length of 'Card Number' must be at least 14 characters and lower than 19 characters.",
        ));
    }
    if !CARD_NUMBER_PATTERN.is_match(card_number) {
        failures.push(ValidationFailure::new(
            "card_number",
            "Card number must contain only numeric characters.",
        ));
    }
}

fn check_expiry_month(request: &PaymentProcessRequest, failures: &mut Vec<ValidationFailure>) {
    match request.expiry_month {
        None => failures.push(ValidationFailure::new(
            "expiry_month",
            "Expiry month is required.",
        )),
        Some(month) if !(1..=12).contains(&month) => failures.push(ValidationFailure::new(
            "expiry_month",
            "Expiry month must be between 1 and 12.",
        )),
        Some(_) => {}
    }
}

fn check_expiry_year(
    request: &PaymentProcessRequest,
    now: NaiveDateTime,
    failures: &mut Vec<ValidationFailure>,
) {
    if request.expiry_year == 0 {
        failures.push(ValidationFailure::new(
            "expiry_year",
            "Expiry year is required.",
        ));
    }
    if request.expiry_year < now.year() {
        failures.push(ValidationFailure::new(
            "expiry_year",
            "Year must be same or higher than current year.",
        ));
    }
}

fn check_expiry_in_future(
    request: &PaymentProcessRequest,
    now: NaiveDateTime,
    failures: &mut Vec<ValidationFailure>,
) {
    // The first instant of the expiry month must lie strictly after now;
    // the year guard keeps the date construction in range.
    let in_future = request.expiry_year > 2000
        && request
            .expiry_month
            .filter(|month| (1..=12).contains(month))
            .and_then(|month| NaiveDate::from_ymd_opt(request.expiry_year, month as u32, 1))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .is_some_and(|first_of_month| first_of_month > now);

    if !in_future {
        failures.push(ValidationFailure::new(
            "expiry_month",
            "Expiry month and year must be in the future.",
        ));
    }
}

fn check_currency(request: &PaymentProcessRequest, failures: &mut Vec<ValidationFailure>) {
    let currency = request.currency.as_str();

    if currency.is_empty() {
        failures.push(ValidationFailure::new("currency", "Currency is required."));
    }
    if currency.chars().count() != 3 {
        failures.push(ValidationFailure::new(
            "currency",
            "Currency must be a 3 character ISO code.",
        ));
    }
    if !SUPPORTED_CURRENCIES.contains(&currency) {
        failures.push(ValidationFailure::new(
            "currency",
            "Currency is not supported.",
        ));
    }
}

fn check_amount(request: &PaymentProcessRequest, failures: &mut Vec<ValidationFailure>) {
    if request.amount == 0 {
        failures.push(ValidationFailure::new("amount", "Amount is required."));
    }
}

fn check_cvv(request: &PaymentProcessRequest, failures: &mut Vec<ValidationFailure>) {
    let cvv = request.cvv.as_str();

    if cvv.is_empty() {
        failures.push(ValidationFailure::new("cvv", "Cvv is required."));
    }
    if cvv.len() < 3 || cvv.len() > 4 {
        failures.push(ValidationFailure::new(
            "cvv",
            "Cvv length must be between 3 and 4 digits.",
        ));
    }
    if !CVV_PATTERN.is_match(cvv) {
        failures.push(ValidationFailure::new(
            "cvv",
            "Cvv must contain only numeric characters.",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> NaiveDateTime {
        // Mid-month so same-month expiries are unambiguously in the past.
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn valid_request() -> PaymentProcessRequest {
        PaymentProcessRequest {
            card_number: "2222405343248877".to_string(),
            expiry_month: Some(4),
            expiry_year: 2025,
            currency: "GBP".to_string(),
            amount: 100,
            cvv: "123".to_string(),
            name: "J. Doe".to_string(),
        }
    }

    fn messages(request: &PaymentProcessRequest) -> Vec<&'static str> {
        validate_at(request, fixed_now())
            .into_iter()
            .map(|failure| failure.message)
            .collect()
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_at(&valid_request(), fixed_now()).is_empty());
    }

    #[test]
    fn empty_card_number_collects_every_card_rule() {
        let mut request = valid_request();
        request.card_number = String::new();

        let messages = messages(&request);
        assert!(messages.contains(&"Card number is required."));
        assert!(messages.contains(
            &"The length of 'Card Number' must be at least 14 characters and lower than 19 characters."
        ));
        assert!(messages.contains(&"Card number must contain only numeric characters."));
    }

    #[test]
    fn short_card_number_fails_length_rule() {
        let mut request = valid_request();
        request.card_number = "4111111111111".to_string(); // 13 digits

        let messages = messages(&request);
        assert!(messages.contains(
            &"The length of 'Card Number' must be at least 14 characters and lower than 19 characters."
        ));
        assert!(!messages.contains(&"Card number is required."));
    }

    #[test]
    fn non_numeric_card_number_fails_digit_rule() {
        let mut request = valid_request();
        request.card_number = "41111111111111ab".to_string();

        assert!(messages(&request).contains(&"Card number must contain only numeric characters."));
    }

    #[test]
    fn missing_month_is_required_and_not_in_future() {
        let mut request = valid_request();
        request.expiry_month = None;

        let messages = messages(&request);
        assert!(messages.contains(&"Expiry month is required."));
        assert!(messages.contains(&"Expiry month and year must be in the future."));
    }

    #[test]
    fn out_of_range_month_fails() {
        let mut request = valid_request();
        request.expiry_month = Some(13);

        assert!(messages(&request).contains(&"Expiry month must be between 1 and 12."));
    }

    #[test]
    fn zero_year_is_required_and_too_low() {
        let mut request = valid_request();
        request.expiry_year = 0;

        let messages = messages(&request);
        assert!(messages.contains(&"Expiry year is required."));
        assert!(messages.contains(&"Year must be same or higher than current year."));
    }

    #[test]
    fn past_year_fails_year_rule() {
        let mut request = valid_request();
        request.expiry_year = 2023;

        let messages = messages(&request);
        assert!(messages.contains(&"Year must be same or higher than current year."));
        assert!(messages.contains(&"Expiry month and year must be in the future."));
    }

    #[test]
    fn current_year_past_month_fails_only_combined_rule() {
        // Year rule passes on equality; the combined rule still catches it.
        let mut request = valid_request();
        request.expiry_month = Some(5);
        request.expiry_year = 2024;

        let messages = messages(&request);
        assert!(messages.contains(&"Expiry month and year must be in the future."));
        assert!(!messages.contains(&"Year must be same or higher than current year."));
    }

    #[test]
    fn current_month_counts_as_expired() {
        let mut request = valid_request();
        request.expiry_month = Some(6);
        request.expiry_year = 2024;

        assert!(messages(&request).contains(&"Expiry month and year must be in the future."));
    }

    #[test]
    fn next_month_is_in_the_future() {
        let mut request = valid_request();
        request.expiry_month = Some(7);
        request.expiry_year = 2024;

        assert!(validate_at(&request, fixed_now()).is_empty());
    }

    #[test]
    fn unsupported_currency_fails_allow_list() {
        let mut request = valid_request();
        request.currency = "JPY".to_string();

        let messages = messages(&request);
        assert!(messages.contains(&"Currency is not supported."));
        assert!(!messages.contains(&"Currency must be a 3 character ISO code."));
    }

    #[test]
    fn wrong_length_currency_fails_both_rules() {
        let mut request = valid_request();
        request.currency = "EURO".to_string();

        let messages = messages(&request);
        assert!(messages.contains(&"Currency must be a 3 character ISO code."));
        assert!(messages.contains(&"Currency is not supported."));
    }

    #[test]
    fn zero_amount_is_required() {
        let mut request = valid_request();
        request.amount = 0;

        assert!(messages(&request).contains(&"Amount is required."));
    }

    #[test]
    fn cvv_rules() {
        let mut request = valid_request();
        request.cvv = "12".to_string();
        let collected = messages(&request);
        assert!(collected.contains(&"Cvv length must be between 3 and 4 digits."));
        assert!(collected.contains(&"Cvv must contain only numeric characters."));

        request.cvv = "12a".to_string();
        assert!(messages(&request).contains(&"Cvv must contain only numeric characters."));

        request.cvv = "1234".to_string();
        assert!(validate_at(&request, fixed_now()).is_empty());
    }

    #[test]
    fn violations_preserve_rule_order() {
        let request = PaymentProcessRequest {
            card_number: String::new(),
            expiry_month: None,
            expiry_year: 0,
            currency: String::new(),
            amount: 0,
            cvv: String::new(),
            name: String::new(),
        };

        let failures = validate_at(&request, fixed_now());
        let fields: Vec<&str> = failures.iter().map(|failure| failure.field).collect();

        let first_card = fields.iter().position(|f| *f == "card_number").unwrap();
        let first_currency = fields.iter().position(|f| *f == "currency").unwrap();
        let first_cvv = fields.iter().position(|f| *f == "cvv").unwrap();
        assert!(first_card < first_currency);
        assert!(first_currency < first_cvv);
    }
}
