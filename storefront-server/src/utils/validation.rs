//! Input validation helpers
//!
//! 请求体通过 [`ValidatedJson`] 解析并执行 `validator` 规则，
//! 失败统一转换为带 `details.fields` 的校验错误。

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::utils::AppError;

/// JSON body that has passed its `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate().map_err(validation_errors)?;
        Ok(Self(value))
    }
}

/// Malformed body / wrong content type
pub fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}

/// `validator` 错误 → 字段级校验错误
///
/// 字段按名称排序，保证错误信息稳定。
pub fn validation_errors(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| describe(&field, &e.code, &e.params));
                (field.clone(), message)
            })
        })
        .collect();
    fields.sort();

    let summary = fields
        .first()
        .map(|(_, message)| message.clone())
        .unwrap_or_else(|| "Validation failed".to_string());

    fields
        .into_iter()
        .fold(AppError::validation(summary), |err, (field, message)| {
            err.with_field_error(field, message)
        })
}

fn describe(
    field: &str,
    code: &str,
    params: &std::collections::HashMap<std::borrow::Cow<'static, str>, serde_json::Value>,
) -> String {
    let param = |name: &str| params.get(name).map(|v| v.to_string());
    match code {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{field} must be {min} to {max} characters"),
            (Some(min), None) => format!("{field} must be at least {min} characters"),
            (None, Some(max)) => format!("{field} must be at most {max} characters"),
            (None, None) => format!("{field} has an invalid length"),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
            (Some(min), None) => format!("{field} must be at least {min}"),
            (None, Some(max)) => format!("{field} must be at most {max}"),
            (None, None) => format!("{field} is out of range"),
        },
        "email" => format!("{field} must be a valid email address"),
        _ => format!("{field} is invalid"),
    }
}

/// Required text: trimmed non-empty and within `max_len` characters
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::field(field, format!("{field} must not be empty")));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::field(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 5))]
        name: String,
        #[validate(range(min = 1))]
        quantity: i64,
    }

    #[test]
    fn test_validation_errors_list_every_field() {
        let sample = Sample {
            name: String::new(),
            quantity: 0,
        };
        let err = validation_errors(sample.validate().unwrap_err());

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let fields = &err.details.as_ref().unwrap()["fields"];
        assert_eq!(fields["name"][0], "name must be 1 to 5 characters");
        assert_eq!(fields["quantity"][0], "quantity must be at least 1");
        assert_eq!(err.message, "name must be 1 to 5 characters");
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Rice", "name", 10).is_ok());
        assert!(validate_required_text("   ", "name", 10).is_err());
        let err = validate_required_text("Jasmine rice", "name", 5).unwrap_err();
        assert!(err.message.contains("max 5"));
    }
}
