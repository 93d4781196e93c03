//! Product input rules.
//!
//! Form data arrives as loose text fields. [`ProductFields::validate`] turns it
//! into a typed [`ProductInput`], collecting every problem as a [`FieldError`]
//! instead of stopping at the first one. Nothing is written to the store or
//! the image store before this has passed.

use validator::{Validate, ValidationErrors};

use crate::error::{CoreError, FieldError};
use crate::types::DbId;

/// Image store namespace that product uploads are written under.
pub const PRODUCT_IMAGE_NAMESPACE: &str = "productImages";

/// Longest accepted product name, in characters.
pub const MAX_NAME_LENGTH: u64 = 255;

/// Form field name carrying the JSON array of image ids to remove.
pub const IDS_TO_DELETE_FIELD: &str = "idsToDelete";

/// Raw product fields as received from a multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}

impl ProductFields {
    /// Parse and validate the raw fields.
    ///
    /// Missing or blank values are reported as `"is required"`; values that do
    /// not parse are reported per field; parsed values then go through the
    /// [`ProductInput`] rules.
    pub fn validate(&self) -> Result<ProductInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => Some(n.to_string()),
            _ => {
                errors.push(FieldError::new("name", "is required"));
                None
            }
        };

        let price = required(&mut errors, "price", self.price.as_deref()).and_then(|raw| {
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    errors.push(FieldError::new("price", "must be a number"));
                    None
                }
            }
        });

        let quantity = required(&mut errors, "quantity", self.quantity.as_deref()).and_then(
            |raw| match raw.parse::<i32>() {
                Ok(v) => Some(v),
                Err(_) => {
                    errors.push(FieldError::new("quantity", "must be an integer"));
                    None
                }
            },
        );

        let (Some(name), Some(price), Some(quantity)) = (name, price, quantity) else {
            return Err(errors);
        };

        let input = ProductInput {
            name,
            price,
            quantity,
        };
        input.validate().map_err(|e| field_errors(&e))?;
        Ok(input)
    }
}

fn required<'a>(errors: &mut Vec<FieldError>, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}

/// Flatten `validator` output into field errors, ordered by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Parse the `idsToDelete` form value.
///
/// An absent or blank value, or the JSON literal `null`, means nothing to
/// delete. Anything else must be a JSON array of integers.
pub fn parse_ids_to_delete(raw: Option<&str>) -> Result<Vec<DbId>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    serde_json::from_str::<Option<Vec<DbId>>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|_| {
            CoreError::Validation(vec![FieldError::new(
                IDS_TO_DELETE_FIELD,
                "must be a JSON array of integers",
            )])
        })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn fields(name: Option<&str>, price: Option<&str>, quantity: Option<&str>) -> ProductFields {
        ProductFields {
            name: name.map(String::from),
            price: price.map(String::from),
            quantity: quantity.map(String::from),
        }
    }

    #[test]
    fn valid_fields_parse() {
        let input = fields(Some("Desk lamp"), Some("19.99"), Some("4"))
            .validate()
            .unwrap();
        assert_eq!(input.name, "Desk lamp");
        assert_eq!(input.price, 19.99);
        assert_eq!(input.quantity, 4);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = ProductFields::default().validate().unwrap_err();
        let names: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, ["name", "price", "quantity"]);
        assert!(errors.iter().all(|e| e.message == "is required"));
    }

    #[test]
    fn blank_name_is_required() {
        let errors = fields(Some("   "), Some("1"), Some("1")).validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("name", "is required")]);
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let errors = fields(Some("Mug"), Some("cheap"), Some("1.5"))
            .validate()
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("price", "must be a number"),
                FieldError::new("quantity", "must be an integer"),
            ]
        );
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let errors = fields(Some("Mug"), Some("NaN"), Some("1")).validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("price", "must be a number")]);
    }

    #[test]
    fn negative_values_fail_range_rules() {
        let errors = fields(Some("Mug"), Some("-1"), Some("-3"))
            .validate()
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("price", "must not be negative"),
                FieldError::new("quantity", "must not be negative"),
            ]
        );
    }

    #[test]
    fn overlong_name_fails_length_rule() {
        let long = "x".repeat(MAX_NAME_LENGTH as usize + 1);
        let errors = fields(Some(&long), Some("1"), Some("1")).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn ids_to_delete_absent_or_blank_is_empty() {
        assert!(parse_ids_to_delete(None).unwrap().is_empty());
        assert!(parse_ids_to_delete(Some("")).unwrap().is_empty());
        assert!(parse_ids_to_delete(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn ids_to_delete_null_is_empty() {
        assert!(parse_ids_to_delete(Some("null")).unwrap().is_empty());
        assert!(parse_ids_to_delete(Some(" null ")).unwrap().is_empty());
    }

    #[test]
    fn ids_to_delete_parses_json_array() {
        assert_eq!(parse_ids_to_delete(Some("[2,3]")).unwrap(), vec![2, 3]);
        assert_eq!(parse_ids_to_delete(Some("[]")).unwrap(), Vec::<DbId>::new());
    }

    #[test]
    fn ids_to_delete_rejects_non_arrays() {
        assert_matches!(
            parse_ids_to_delete(Some("2,3")),
            Err(CoreError::Validation(errors)) if errors[0].field == IDS_TO_DELETE_FIELD
        );
        assert_matches!(
            parse_ids_to_delete(Some("[\"a\"]")),
            Err(CoreError::Validation(_))
        );
    }
}
