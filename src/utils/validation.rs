//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos que los derives de `validator` no cubren.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::utils::errors::AppError;

lazy_static! {
    /// VIN de 17 caracteres, sin I, O ni Q
    pub static ref VIN_REGEX: Regex = Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").unwrap();
}

/// Mayor importe que admite una columna `NUMERIC(12, 2)`: 9_999_999_999.99
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Envolver un `ValidationError` de un campo en un `AppError`
pub fn field_error(field: &'static str, error: ValidationError) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    AppError::Validation(errors)
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir string a datetime
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Límite de rango de fechas: acepta `YYYY-MM-DD` (medianoche UTC) o RFC3339
pub fn parse_date_bound(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(date) = validate_date(value) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    validate_datetime(value)
}

/// Validar que `from <= to` cuando ambos existen
pub fn validate_date_order<T: PartialOrd + Serialize>(
    from: Option<&T>,
    to: Option<&T>,
) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            let mut error = ValidationError::new("date_order");
            error.add_param("from".into(), from);
            error.add_param("to".into(), to);
            return Err(error);
        }
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + serde::Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if clean_phone.len() < 10 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar VIN (17 caracteres alfanuméricos, sin I/O/Q)
pub fn validate_vin(value: &str) -> Result<(), ValidationError> {
    if !VIN_REGEX.is_match(&value.to_ascii_uppercase()) {
        let mut error = ValidationError::new("vin");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"17 characters, no I/O/Q".to_string());
        return Err(error);
    }
    Ok(())
}

/// Año de modelo entre 1900 y el año siguiente al actual
pub fn validate_model_year(year: i32) -> Result<(), ValidationError> {
    validate_range(year, 1900, Utc::now().year() + 1)
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un decimal no tenga más de `max_scale` decimales
pub fn validate_scale(value: Decimal, max_scale: u32) -> Result<(), ValidationError> {
    if value.normalize().scale() > max_scale {
        let mut error = ValidationError::new("scale");
        error.add_param("max_scale".into(), &max_scale);
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Importe monetario: entre 0 y `MAX_MONEY`, con a lo sumo dos decimales
pub fn validate_money(value: Decimal) -> Result<(), ValidationError> {
    validate_range(value, Decimal::ZERO, MAX_MONEY)?;
    validate_scale(value, 2)
}

/// Normalizar texto opcional: trim y `None` si queda vacío
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-01-15").is_ok());
        assert!(validate_date("2024/01/15").is_err());
    }

    #[test]
    fn test_parse_date_bound_accepts_both_formats() {
        let day = parse_date_bound("2024-03-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let instant = parse_date_bound("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-03-01T08:30:00+00:00");

        assert!(parse_date_bound("yesterday").is_err());
    }

    #[test]
    fn test_validate_date_order() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(validate_date_order(Some(&a), Some(&b)).is_ok());
        assert!(validate_date_order(Some(&b), Some(&a)).is_err());
        assert!(validate_date_order(Some(&b), None).is_ok());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(5, 1, 10).is_ok());
        assert!(validate_range(0, 1, 10).is_err());
        assert!(validate_range(15, 1, 10).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_validate_vin() {
        assert!(validate_vin("1HGCM82633A004352").is_ok());
        assert!(validate_vin("1hgcm82633a004352").is_ok());
        // I, O y Q no están permitidos
        assert!(validate_vin("1HGCM82633A00435O").is_err());
        assert!(validate_vin("1HGCM8263").is_err());
    }

    #[test]
    fn test_validate_model_year() {
        assert!(validate_model_year(2015).is_ok());
        assert!(validate_model_year(1899).is_err());
        assert!(validate_model_year(Utc::now().year() + 2).is_err());
    }

    #[test]
    fn test_validate_decimals() {
        assert!(validate_positive(Decimal::new(1, 2)).is_ok());
        assert!(validate_positive(Decimal::ZERO).is_err());
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn test_max_money_matches_column() {
        assert_eq!(MAX_MONEY.to_string(), "9999999999.99");
    }

    #[test]
    fn test_validate_money() {
        assert!(validate_money(Decimal::from_str("15000.00").unwrap()).is_ok());
        assert!(validate_money(Decimal::from_str("19.990").unwrap()).is_ok());
        assert!(validate_money(MAX_MONEY).is_ok());
        assert!(validate_money(Decimal::from_str("10000000000").unwrap()).is_err());
        assert!(validate_money(Decimal::MAX).is_err());
        assert!(validate_money(Decimal::from_str("-0.01").unwrap()).is_err());
        assert_eq!(
            validate_money(Decimal::from_str("10.005").unwrap()).unwrap_err().code,
            "scale"
        );
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  Blue ".to_string())), Some("Blue".to_string()));
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_field_error_wraps_validation() {
        match field_error("vin", ValidationError::new("vin")) {
            AppError::Validation(errors) => assert!(errors.field_errors().contains_key("vin")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
