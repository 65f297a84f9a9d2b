pub mod address_service;
pub mod address_service_impl;
pub mod auth_service;
pub mod auth_service_impl;
pub mod cep_service;
pub mod cep_service_impl;
pub mod user_service;
pub mod user_service_impl;

pub use address_service::{AddressError, AddressService, AddressView, NewAddress};
pub use address_service_impl::SeaOrmAddressService;
pub use auth_service::{AuthError, AuthService, LoginResult, Signup};
pub use auth_service_impl::SeaOrmAuthService;
pub use cep_service::{CepError, CepInfo, CepService};
pub use cep_service_impl::ViaCepService;
pub use user_service::{NewUser, UserError, UserService, UserView};
pub use user_service_impl::SeaOrmUserService;
