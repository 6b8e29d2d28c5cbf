pub mod auth;
pub mod dto;
pub mod profile;
pub mod role;
pub mod user;

pub use dto::*;
pub use profile::{
    CustomerProfile, Profile, ProfileUpdate, UpdateCustomerRequest,
    UpdateVendorRequest, UserInfo, VendorProfile,
};
pub use role::{Role, UnknownRole, UserType};
pub use user::{User, UserId, ValidationError, normalize_email, validate_email};
