mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{UserClaims, generate_token, process_token};
mod serial;
pub use serial::generate_certificate_number;
mod error;
pub use error::{CryptError, CryptResult};
