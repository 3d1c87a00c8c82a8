//! Modelo de Driver
//!
//! Conductores de la flota y sus variantes para CRUD operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{normalize_optional, validate_phone_or_blank, NATIONAL_ID_REGEX, PHONE_REGEX};

/// Tipo de licencia - mapea al ENUM license_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "license_type", rename_all = "lowercase")]
pub enum LicenseType {
    Heavy,
    Light,
    Personal,
}

impl LicenseType {
    pub const ALL: [LicenseType; 3] = [LicenseType::Heavy, LicenseType::Light, LicenseType::Personal];
}

/// Driver principal - mapea a la tabla drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_type: LicenseType,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un nuevo conductor
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 100, message = "El nombre debe tener entre 2 y 100 caracteres"))]
    pub full_name: String,

    #[validate(regex(path = "NATIONAL_ID_REGEX", message = "El DUI debe tener el formato ########-#"))]
    pub national_id: String,

    #[validate(length(min = 1, max = 20, message = "La licencia debe tener entre 1 y 20 caracteres"))]
    pub license_number: String,

    pub license_type: LicenseType,

    #[validate(regex(path = "PHONE_REGEX", message = "El teléfono debe tener el formato ####-####"))]
    pub phone: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    pub active: Option<bool>,
}

impl CreateDriverRequest {
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.national_id = self.national_id.trim().to_string();
        self.license_number = self.license_number.trim().to_string();
        self.phone = normalize_optional(self.phone);
        self.address = normalize_optional(self.address);
        self
    }
}

/// Request para actualizar un conductor existente.
///
/// `phone` y `address` solo se modifican si vienen en el request; una cadena
/// vacía los borra.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, max = 100, message = "El nombre debe tener entre 2 y 100 caracteres"))]
    pub full_name: Option<String>,

    #[validate(regex(path = "NATIONAL_ID_REGEX", message = "El DUI debe tener el formato ########-#"))]
    pub national_id: Option<String>,

    #[validate(length(min = 1, max = 20, message = "La licencia debe tener entre 1 y 20 caracteres"))]
    pub license_number: Option<String>,

    pub license_type: Option<LicenseType>,

    #[validate(custom = "validate_phone_or_blank")]
    pub phone: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    pub active: Option<bool>,
}

impl UpdateDriverRequest {
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.map(|v| v.trim().to_string());
        self.national_id = self.national_id.map(|v| v.trim().to_string());
        self.license_number = self.license_number.map(|v| v.trim().to_string());
        self.phone = self.phone.map(|v| v.trim().to_string());
        self.address = self.address.map(|v| v.trim().to_string());
        self
    }
}

/// Datos validados para insertar un conductor
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub full_name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_type: LicenseType,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(request: CreateDriverRequest) -> Self {
        Self {
            full_name: request.full_name,
            national_id: request.national_id,
            license_number: request.license_number,
            license_type: request.license_type,
            phone: request.phone,
            address: request.address,
            active: request.active.unwrap_or(true),
        }
    }
}

/// Cambios parciales aplicables a un conductor.
///
/// En `phone`/`address`, `Some(None)` borra el valor.
#[derive(Debug, Clone, Default)]
pub struct DriverChanges {
    pub full_name: Option<String>,
    pub national_id: Option<String>,
    pub license_number: Option<String>,
    pub license_type: Option<LicenseType>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub active: Option<bool>,
}

impl DriverChanges {
    pub fn activation(active: bool) -> Self {
        Self { active: Some(active), ..Self::default() }
    }

    pub fn apply(self, driver: &mut Driver, now: DateTime<Utc>) {
        if let Some(full_name) = self.full_name {
            driver.full_name = full_name;
        }
        if let Some(national_id) = self.national_id {
            driver.national_id = national_id;
        }
        if let Some(license_number) = self.license_number {
            driver.license_number = license_number;
        }
        if let Some(license_type) = self.license_type {
            driver.license_type = license_type;
        }
        if let Some(phone) = self.phone {
            driver.phone = phone;
        }
        if let Some(address) = self.address {
            driver.address = address;
        }
        if let Some(active) = self.active {
            driver.active = active;
        }
        driver.updated_at = now;
    }
}

impl From<UpdateDriverRequest> for DriverChanges {
    fn from(request: UpdateDriverRequest) -> Self {
        Self {
            full_name: request.full_name,
            national_id: request.national_id,
            license_number: request.license_number,
            license_type: request.license_type,
            phone: request.phone.map(|p| normalize_optional(Some(p))),
            address: request.address.map(|a| normalize_optional(Some(a))),
            active: request.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn juan() -> CreateDriverRequest {
        CreateDriverRequest {
            full_name: "Juan Perez".to_string(),
            national_id: "12345678-9".to_string(),
            license_number: "L1234".to_string(),
            license_type: LicenseType::Heavy,
            phone: None,
            address: None,
            active: None,
        }
    }

    #[test]
    fn test_valid_driver() {
        assert!(juan().normalized().validate().is_ok());
    }

    #[test]
    fn test_invalid_fields_are_listed() {
        let mut request = juan();
        request.national_id = "123".to_string();
        request.phone = Some("7777".to_string());
        request.full_name = "J".to_string();

        let errors = request.normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("national_id"));
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("full_name"));
        assert!(!fields.contains_key("license_number"));
    }

    #[test]
    fn test_blank_phone_is_dropped() {
        let mut request = juan();
        request.phone = Some("  ".to_string());
        let request = request.normalized();
        assert_eq!(request.phone, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_blank_phone_clears_value() {
        let changes = DriverChanges::from(UpdateDriverRequest {
            phone: Some(String::new()),
            ..UpdateDriverRequest::default()
        });
        assert_eq!(changes.phone, Some(None));
        assert_eq!(changes.address, None);
    }

    #[test]
    fn test_update_accepts_blank_phone_but_not_malformed() {
        let blank = UpdateDriverRequest { phone: Some(" ".to_string()), ..UpdateDriverRequest::default() };
        assert!(blank.normalized().validate().is_ok());

        let malformed = UpdateDriverRequest { phone: Some("7777".to_string()), ..UpdateDriverRequest::default() };
        assert!(malformed.normalized().validate().is_err());
    }

    #[test]
    fn test_license_type_wire_names() {
        let value: LicenseType = serde_json::from_str("\"Personal\"").unwrap();
        assert_eq!(value, LicenseType::Personal);
        assert_eq!(serde_json::to_string(&LicenseType::Heavy).unwrap(), "\"Heavy\"");
    }
}
