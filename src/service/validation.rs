//! Request payload validation: untrusted JSON objects into typed write models with per-field errors.

use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};
use crate::models::{NewCategory, NewProduct, Price, PriceError, DECIMAL_PLACES, MAX_DIGITS};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

pub const NAME_MAX_LENGTH: usize = 255;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_NUMBER: &str = "A valid number is required.";
const NOT_INTEGER: &str = "A valid integer is required.";
const NOT_NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// Name of a JSON value's type as reported in error messages.
fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Unwrap a request body that must be a JSON object.
pub fn expect_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(m) => Ok(m),
        other => Err(AppError::Validation(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!("Invalid data. Expected a dictionary, but got {}.", type_name(&other)),
        ))),
    }
}

/// Trimmed string field. Numbers are accepted and rendered as text.
fn char_field(errors: &mut FieldErrors, field: &str, v: &Value, max_length: Option<usize>, allow_blank: bool) -> Option<String> {
    let s = match v {
        Value::Null => {
            errors.add(field, NOT_NULL);
            return None;
        }
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, NOT_STRING);
            return None;
        }
    };
    if s.is_empty() && !allow_blank {
        errors.add(field, NOT_BLANK);
        return None;
    }
    if let Some(max) = max_length {
        if s.chars().count() > max {
            errors.add(field, format!("Ensure this field has no more than {} characters.", max));
            return None;
        }
    }
    Some(s)
}

fn price_field(errors: &mut FieldErrors, field: &str, v: &Value) -> Option<Price> {
    let raw = match v {
        Value::Null => {
            errors.add(field, NOT_NULL);
            return None;
        }
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => {
            errors.add(field, NOT_NUMBER);
            return None;
        }
    };
    match raw.parse::<Price>() {
        Ok(price) if price.is_negative() => {
            errors.add(field, NOT_NEGATIVE);
            None
        }
        Ok(price) => Some(price),
        Err(e) => {
            let message = match e {
                PriceError::NotANumber => NOT_NUMBER.to_string(),
                PriceError::TooManyDigits => {
                    format!("Ensure that there are no more than {} digits in total.", MAX_DIGITS)
                }
                PriceError::TooManyDecimalPlaces => {
                    format!("Ensure that there are no more than {} decimal places.", DECIMAL_PLACES)
                }
                PriceError::TooManyWholeDigits => format!(
                    "Ensure that there are no more than {} digits before the decimal point.",
                    MAX_DIGITS - DECIMAL_PLACES
                ),
            };
            errors.add(field, message);
            None
        }
    }
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.0*)?$").expect("integer pattern compiles"))
}

/// Integer from a JSON number or a numeric string (`"30"`, `"30.0"`).
fn parse_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if !integer_re().is_match(s) {
                return None;
            }
            s.split('.').next().and_then(|whole| whole.parse().ok())
        }
        _ => None,
    }
}

fn stock_field(errors: &mut FieldErrors, field: &str, v: &Value) -> Option<i32> {
    if v.is_null() {
        errors.add(field, NOT_NULL);
        return None;
    }
    let Some(n) = parse_integer(v) else {
        errors.add(field, NOT_INTEGER);
        return None;
    };
    if n < 0 {
        errors.add(field, NOT_NEGATIVE);
        return None;
    }
    match i32::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, format!("Ensure this value is less than or equal to {}.", i32::MAX));
            None
        }
    }
}

/// Primary key reference. Existence is checked by the caller against the store.
fn pk_field(errors: &mut FieldErrors, field: &str, v: &Value) -> Option<i64> {
    if v.is_null() {
        errors.add(field, NOT_NULL);
        return None;
    }
    match parse_integer(v) {
        Some(id) if !matches!(v, Value::Number(n) if n.is_f64()) => Some(id),
        _ => {
            errors.add(
                field,
                format!("Incorrect type. Expected pk value, received {}.", type_name(v)),
            );
            None
        }
    }
}

pub fn validate_category(body: &Map<String, Value>) -> Result<NewCategory, AppError> {
    let mut errors = FieldErrors::new();
    let name = match body.get("name") {
        Some(v) => char_field(&mut errors, "name", v, Some(NAME_MAX_LENGTH), false),
        None => {
            errors.add("name", REQUIRED);
            None
        }
    };
    errors.into_result()?;
    let name = name.ok_or_else(|| AppError::Internal("validated category without name".into()))?;
    Ok(NewCategory { name })
}

/// Product fields present in one request. `None` means absent (partial update) or invalid (error recorded).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category_id: Option<i64>,
    pub stock_quantity: Option<i32>,
}

impl ProductChanges {
    /// Parse every known field. With `partial == false`, missing required fields are errors.
    /// Unknown and read-only keys (`id`, `created_date`, `category`) are ignored.
    pub fn from_body(body: &Map<String, Value>, partial: bool) -> (Self, FieldErrors) {
        let mut errors = FieldErrors::new();
        let mut changes = ProductChanges::default();

        let take = |errors: &mut FieldErrors, field: &str, required: bool| -> Option<Value> {
            match body.get(field) {
                Some(v) => Some(v.clone()),
                None => {
                    if required && !partial {
                        errors.add(field, REQUIRED);
                    }
                    None
                }
            }
        };

        if let Some(v) = take(&mut errors, "name", true) {
            changes.name = char_field(&mut errors, "name", &v, Some(NAME_MAX_LENGTH), false);
        }
        if let Some(v) = take(&mut errors, "description", false) {
            changes.description = if v.is_null() {
                Some(String::new())
            } else {
                char_field(&mut errors, "description", &v, None, true)
            };
        }
        if let Some(v) = take(&mut errors, "price", true) {
            changes.price = price_field(&mut errors, "price", &v);
        }
        if let Some(v) = take(&mut errors, "category_id", true) {
            changes.category_id = pk_field(&mut errors, "category_id", &v);
        }
        if let Some(v) = take(&mut errors, "stock_quantity", true) {
            changes.stock_quantity = stock_field(&mut errors, "stock_quantity", &v);
        }
        (changes, errors)
    }

    /// Full product from these changes over `base` (the stored product for updates).
    pub fn merge(self, base: Option<NewProduct>) -> Result<NewProduct, AppError> {
        let missing = |field: &str| AppError::Internal(format!("validated product without {}", field));
        let (b_name, b_description, b_price, b_category, b_stock) = match base {
            Some(b) => (
                Some(b.name),
                Some(b.description),
                Some(b.price),
                Some(b.category_id),
                Some(b.stock_quantity),
            ),
            None => (None, None, None, None, None),
        };
        Ok(NewProduct {
            name: self.name.or(b_name).ok_or_else(|| missing("name"))?,
            description: self.description.or(b_description).unwrap_or_default(),
            price: self.price.or(b_price).ok_or_else(|| missing("price"))?,
            category_id: self.category_id.or(b_category).ok_or_else(|| missing("category_id"))?,
            stock_quantity: self.stock_quantity.or(b_stock).ok_or_else(|| missing("stock_quantity"))?,
        })
    }
}

/// `username` and `password` for token login.
pub fn validate_credentials(body: &Map<String, Value>) -> Result<(String, String), AppError> {
    let mut errors = FieldErrors::new();
    let mut get = |field: &str| match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.add(field, NOT_BLANK);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(_) => {
            errors.add(field, NOT_STRING);
            None
        }
        None => {
            errors.add(field, REQUIRED);
            None
        }
    };
    let username = get("username");
    let password = get("password");
    errors.into_result()?;
    match (username, password) {
        (Some(u), Some(p)) => Ok((u, p)),
        _ => Err(AppError::Internal("validated credentials incomplete".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        expect_object(v).unwrap()
    }

    fn messages(errors: &FieldErrors, field: &str) -> Vec<String> {
        errors.get(field).map(|m| m.to_vec()).unwrap_or_default()
    }

    #[test]
    fn full_payload_parses() {
        let body = obj(json!({
            "name": "Laptop",
            "description": "A powerful laptop.",
            "price": 1200.00,
            "category_id": 1,
            "stock_quantity": 30,
            "id": 99
        }));
        let (changes, errors) = ProductChanges::from_body(&body, false);
        assert!(errors.is_empty(), "{errors}");
        let product = changes.merge(None).unwrap();
        assert_eq!(product.name, "Laptop");
        assert_eq!(product.price, Price::from_cents(120_000));
        assert_eq!(product.category_id, 1);
        assert_eq!(product.stock_quantity, 30);
    }

    #[test]
    fn form_strings_are_coerced() {
        let body = obj(json!({
            "name": "Laptop",
            "price": "1200.0",
            "category_id": "4",
            "stock_quantity": "30"
        }));
        let (changes, errors) = ProductChanges::from_body(&body, false);
        assert!(errors.is_empty(), "{errors}");
        let product = changes.merge(None).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.category_id, 4);
    }

    #[test]
    fn missing_and_invalid_fields_are_reported_together() {
        let body = obj(json!({
            "name": "  ",
            "price": -1,
            "stock_quantity": 2.5
        }));
        let (_, errors) = ProductChanges::from_body(&body, false);
        assert_eq!(messages(&errors, "name"), vec![NOT_BLANK]);
        assert_eq!(messages(&errors, "price"), vec![NOT_NEGATIVE]);
        assert_eq!(messages(&errors, "stock_quantity"), vec![NOT_INTEGER]);
        assert_eq!(messages(&errors, "category_id"), vec![REQUIRED]);
    }

    #[test]
    fn price_limits_use_decimal_messages() {
        let body = obj(json!({ "price": "1.234", "stock_quantity": -3 }));
        let (_, errors) = ProductChanges::from_body(&body, true);
        assert_eq!(
            messages(&errors, "price"),
            vec!["Ensure that there are no more than 2 decimal places."]
        );
        assert_eq!(messages(&errors, "stock_quantity"), vec![NOT_NEGATIVE]);
        let (_, errors) = ProductChanges::from_body(&obj(json!({ "price": "cheap" })), true);
        assert_eq!(messages(&errors, "price"), vec![NOT_NUMBER]);
    }

    #[test]
    fn category_reference_type_is_checked() {
        let (_, errors) = ProductChanges::from_body(&obj(json!({ "category_id": "abc" })), true);
        assert_eq!(
            messages(&errors, "category_id"),
            vec!["Incorrect type. Expected pk value, received str."]
        );
        let (_, errors) = ProductChanges::from_body(&obj(json!({ "category_id": [1] })), true);
        assert_eq!(
            messages(&errors, "category_id"),
            vec!["Incorrect type. Expected pk value, received list."]
        );
    }

    #[test]
    fn partial_changes_merge_over_base() {
        let base = NewProduct {
            name: "Smartphone".into(),
            description: "A cool smartphone.".into(),
            price: Price::from_cents(69_999),
            category_id: 1,
            stock_quantity: 50,
        };
        let (changes, errors) = ProductChanges::from_body(&obj(json!({ "stock_quantity": 49 })), true);
        assert!(errors.is_empty());
        let merged = changes.merge(Some(base.clone())).unwrap();
        assert_eq!(merged, NewProduct { stock_quantity: 49, ..base });
    }

    #[test]
    fn long_names_are_rejected() {
        let long = "x".repeat(NAME_MAX_LENGTH + 1);
        let err = validate_category(&obj(json!({ "name": long }))).unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(
                messages(&errors, "name"),
                vec!["Ensure this field has no more than 255 characters."]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            validate_category(&obj(json!({ "name": " Electronics " }))).unwrap(),
            NewCategory { name: "Electronics".into() }
        );
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        match expect_object(json!([1, 2])) {
            Err(AppError::Validation(errors)) => assert_eq!(
                messages(&errors, NON_FIELD_ERRORS),
                vec!["Invalid data. Expected a dictionary, but got list."]
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn credentials_require_both_fields() {
        assert_eq!(
            validate_credentials(&obj(json!({ "username": "u", "password": "p" }))).unwrap(),
            ("u".to_string(), "p".to_string())
        );
        assert!(validate_credentials(&obj(json!({ "username": "u" }))).is_err());
    }
}
