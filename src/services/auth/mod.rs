pub mod access_jwt;
pub mod authorizer;
pub mod bearer;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod path_scope;

pub use access_jwt::VerifiedClaims;
pub use authorizer::AuthService;
pub use error::AuthError;
pub use factory::build_auth_service;
pub use path_scope::PathScopeTable;
