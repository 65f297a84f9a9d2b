//! Request field checks. Each validator stops at the first offending
//! field, so the client sees one message at a time.

use super::ApiError;
use super::types::{
    AddressRequest, CreateUserRequest, LoginRequest, SignupRequest, UpdatePasswordRequest,
    UpdateUserRequest,
};

fn require_non_blank(value: &str, message: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(message));
    }
    Ok(())
}

fn require_email_shape(email: &str) -> Result<(), ApiError> {
    require_non_blank(email, "Email is required")?;
    if !email.contains('@') {
        return Err(ApiError::validation("Email must be valid"));
    }
    Ok(())
}

pub fn validate_login(request: &LoginRequest) -> Result<(), ApiError> {
    require_email_shape(&request.email)?;
    require_non_blank(&request.password, "Password is required")
}

pub fn validate_signup(request: &SignupRequest) -> Result<(), ApiError> {
    require_non_blank(&request.name, "Name is required")?;
    require_email_shape(&request.email)?;
    require_non_blank(&request.password, "Password is required")?;
    if request.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must have at least 6 characters",
        ));
    }
    Ok(())
}

pub fn validate_create_user(request: &CreateUserRequest) -> Result<(), ApiError> {
    require_non_blank(&request.name, "Name is required")?;
    require_email_shape(&request.email)?;
    require_non_blank(&request.password, "Password is required")?;
    for address in &request.addresses {
        validate_address(address)?;
    }
    Ok(())
}

pub fn validate_update_user(request: &UpdateUserRequest) -> Result<(), ApiError> {
    require_non_blank(&request.name, "Name is required")?;
    require_email_shape(&request.email)
}

pub fn validate_update_password(request: &UpdatePasswordRequest) -> Result<(), ApiError> {
    require_non_blank(&request.password, "Password is required")
}

pub fn validate_address(request: &AddressRequest) -> Result<(), ApiError> {
    require_non_blank(&request.number, "Number is required")?;
    require_non_blank(&request.postal_code, "PostalCode is required")
}
