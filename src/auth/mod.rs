mod credentials;
mod middleware;
mod password;

pub use credentials::{
    CARD_OWNER_ROLE, CredentialStore, CredentialsError, Principal, UserConfig, UsersConfig,
};
pub use middleware::{AuthError, AuthState, BASIC_AUTH_CHALLENGE, auth_guard};
pub use password::PasswordHash;
