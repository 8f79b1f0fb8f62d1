use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::{AccessToken, Credentials, RefreshToken};

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Name of the first empty field, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.username.trim().is_empty() {
            Some("username")
        } else if self.password.is_empty() {
            Some("password")
        } else {
            None
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "ADMIN")]
    Admin,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SignUpRequest {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "userRole")]
    pub user_role: UserRole,
}

impl SignUpRequest {
    /// Name of the first empty required field, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        let fields = [
            ("first name", self.first_name.trim()),
            ("last name", self.last_name.trim()),
            ("email", self.email.trim()),
            ("phone number", self.phone_number.trim()),
            ("username", self.username.trim()),
            ("password", self.password.as_str()),
        ];
        fields
            .into_iter()
            .find(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
    }
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("username", &self.username)
            .field("password", &"***")
            .field("user_role", &self.user_role)
            .finish()
    }
}

/// Body returned by login, sign-up and token refresh
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationResponse {
    #[serde(rename = "accessToken")]
    pub access_token: AccessToken,
    #[serde(rename = "refreshToken")]
    pub refresh_token: RefreshToken,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthenticationResponse {
    pub fn into_credentials(self) -> Credentials {
        Credentials {
            access: self.access_token,
            refresh: self.refresh_token,
        }
    }
}
