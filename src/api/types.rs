use serde::{Deserialize, Serialize};

use crate::db::paging::{DEFAULT_PAGE_SIZE, Page, PageRequest, SortDirection};
use crate::services::NewAddress;

/// Uniform response envelope; `data` is serialized as `null` on errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub result: &'static str,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            result: "success",
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: "error",
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub postal_code: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
}

impl From<AddressRequest> for NewAddress {
    fn from(request: AddressRequest) -> Self {
        Self {
            postal_code: request.postal_code,
            number: request.number,
            complement: request.complement,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub addresses: Vec<AddressRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Listing query parameters as they appear on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
    pub search: Option<String>,
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl ListParams {
    pub fn to_page_request(&self) -> PageRequest {
        let direction = match self.direction.as_deref() {
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        PageRequest::new(
            self.page,
            self.size,
            self.sort_by.clone(),
            direction,
            self.search.clone(),
        )
    }
}

/// Pagination envelope; every field is derived from the page itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub content: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> From<Page<T>> for PageDto<T> {
    fn from(page: Page<T>) -> Self {
        let first = page.is_first();
        let last = page.is_last();
        Self {
            content: page.content,
            page_number: page.page_number,
            page_size: page.page_size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            first,
            last,
        }
    }
}
