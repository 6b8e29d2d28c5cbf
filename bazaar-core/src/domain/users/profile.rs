use serde::{Deserialize, Serialize};

use super::role::Role;
use super::user::ValidationError;

const FULL_NAME_MAX: usize = 50;
const BUSINESS_NAME_MAX: usize = 100;
const ADDRESS_MAX: usize = 255;
const PHONE_NUMBER_MAX: usize = 20;

fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if value.chars().count() > max => {
            Err(ValidationError::TooLong { field, max })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl CustomerProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("fullName", self.full_name.as_deref(), FULL_NAME_MAX)?;
        check_length("address", self.address.as_deref(), ADDRESS_MAX)?;
        check_length(
            "phoneNumber",
            self.phone_number.as_deref(),
            PHONE_NUMBER_MAX,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub business_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl VendorProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length(
            "businessName",
            self.business_name.as_deref(),
            BUSINESS_NAME_MAX,
        )?;
        check_length("address", self.address.as_deref(), ADDRESS_MAX)?;
        check_length(
            "phoneNumber",
            self.phone_number.as_deref(),
            PHONE_NUMBER_MAX,
        )
    }
}

/// Per-role profile record, keyed by the owning user's id in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    Customer(CustomerProfile),
    Vendor(VendorProfile),
}

impl Profile {
    /// The empty profile a freshly registered user of `role` starts with.
    /// Admins have none.
    pub fn empty_for(role: Role) -> Option<Self> {
        match role {
            Role::Customer => Some(Self::Customer(CustomerProfile::default())),
            Role::Vendor => Some(Self::Vendor(VendorProfile::default())),
            Role::Admin => None,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Customer(_) => Role::Customer,
            Self::Vendor(_) => Role::Vendor,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Customer(profile) => profile.validate(),
            Self::Vendor(profile) => profile.validate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub jw_token: String,
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorRequest {
    pub jw_token: String,
    #[serde(flatten)]
    pub profile: VendorProfile,
}

/// Profile update whose kind fixes the role the target user must hold.
#[derive(Debug, Clone)]
pub enum ProfileUpdate {
    Customer(UpdateCustomerRequest),
    Vendor(UpdateVendorRequest),
}

impl ProfileUpdate {
    pub fn expected_role(&self) -> Role {
        match self {
            Self::Customer(_) => Role::Customer,
            Self::Vendor(_) => Role::Vendor,
        }
    }

    pub fn access_token(&self) -> &str {
        match self {
            Self::Customer(request) => &request.jw_token,
            Self::Vendor(request) => &request.jw_token,
        }
    }

    pub fn into_profile(self) -> Profile {
        match self {
            Self::Customer(request) => Profile::Customer(request.profile),
            Self::Vendor(request) => Profile::Vendor(request.profile),
        }
    }
}

/// Read projection returned by the get-user operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserInfo {
    Customer(CustomerProfile),
    Vendor(VendorProfile),
}

impl From<Profile> for UserInfo {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Customer(profile) => Self::Customer(profile),
            Profile::Vendor(profile) => Self::Vendor(profile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admins_get_no_profile() {
        assert!(Profile::empty_for(Role::Admin).is_none());
        assert_eq!(Profile::empty_for(Role::Vendor).unwrap().role(), Role::Vendor);
    }

    #[test]
    fn enforces_field_limits() {
        let profile = CustomerProfile {
            full_name: Some("x".repeat(51)),
            ..CustomerProfile::default()
        };
        assert_eq!(
            profile.validate(),
            Err(ValidationError::TooLong { field: "fullName", max: 50 })
        );

        let vendor = VendorProfile {
            business_name: Some("x".repeat(100)),
            phone_number: Some("+1 555 0100".into()),
            ..VendorProfile::default()
        };
        assert!(vendor.validate().is_ok());
    }

    #[test]
    fn update_request_reads_flat_camel_case_body() {
        let request: UpdateCustomerRequest = serde_json::from_value(json!({
            "jwToken": "token",
            "fullName": "Ada Lovelace",
            "phoneNumber": "555-0100"
        }))
        .unwrap();
        assert_eq!(request.jw_token, "token");
        assert_eq!(request.profile.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(request.profile.address, None);

        let update = ProfileUpdate::Customer(request);
        assert_eq!(update.expected_role(), Role::Customer);
    }

    #[test]
    fn user_info_serializes_profile_fields_only() {
        let info = UserInfo::from(Profile::Vendor(VendorProfile {
            business_name: Some("Tea House".into()),
            ..VendorProfile::default()
        }));
        let value = serde_json::to_value(info).unwrap();
        assert_eq!(value["businessName"], "Tea House");
        assert!(value.get("Vendor").is_none());
    }
}
