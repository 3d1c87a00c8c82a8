//! Utilidades de validación
//!
//! Este módulo contiene las expresiones regulares de formato usadas por los
//! derives de `validator` y helpers para normalizar la entrada.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

lazy_static! {
    /// Placa: mayúsculas, dígitos y guion, hasta 10 caracteres
    pub static ref PLATE_REGEX: Regex = Regex::new(r"^[A-Z0-9-]{1,10}$").unwrap();

    /// DUI: ocho dígitos, guion, un dígito
    pub static ref NATIONAL_ID_REGEX: Regex = Regex::new(r"^\d{8}-\d$").unwrap();

    /// Teléfono: cuatro dígitos, guion, cuatro dígitos
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\d{4}-\d{4}$").unwrap();
}

/// Normalizar una placa antes de validarla
pub fn normalize_plate(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Recortar espacios y descartar cadenas vacías en campos opcionales
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validar un teléfono opcional en actualizaciones, donde vacío significa borrar
pub fn validate_phone_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || PHONE_REGEX.is_match(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("regex");
    error.message = Some(Cow::Borrowed("El teléfono debe tener el formato ####-####"));
    Err(error)
}

/// Construir un `ValidationErrors` con un único campo
pub fn single_field_error(field: &'static str, code: &'static str, message: impl Into<String>) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message.into()));

    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_regex() {
        assert!(PLATE_REGEX.is_match("P001-2024"));
        assert!(PLATE_REGEX.is_match("ABC123"));
        assert!(!PLATE_REGEX.is_match("p001-2024"));
        assert!(!PLATE_REGEX.is_match("P001 2024"));
        assert!(!PLATE_REGEX.is_match("ABCDEFGHIJK"));
        assert!(!PLATE_REGEX.is_match(""));
    }

    #[test]
    fn test_national_id_regex() {
        assert!(NATIONAL_ID_REGEX.is_match("12345678-9"));
        assert!(!NATIONAL_ID_REGEX.is_match("1234567-9"));
        assert!(!NATIONAL_ID_REGEX.is_match("12345678-90"));
        assert!(!NATIONAL_ID_REGEX.is_match("123456789"));
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("7777-8888"));
        assert!(!PHONE_REGEX.is_match("77778888"));
        assert!(!PHONE_REGEX.is_match("777-88888"));
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("  p001-2024 "), "P001-2024");
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(Some(" Col. Escalón ".to_string())), Some("Col. Escalón".to_string()));
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_single_field_error() {
        let errors = single_field_error("vehicle_id", "inactive", "El vehículo está inactivo");
        assert!(errors.field_errors().contains_key("vehicle_id"));
    }
}
