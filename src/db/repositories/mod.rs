pub mod address;
pub mod role;
pub mod user;

pub use address::{AddressRecord, AddressRepository, AddressRow};
pub use role::RoleRepository;
pub use user::{UserRecord, UserRepository};
