//! The fixed set of users that may access the API, loaded once at start up.

use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// The role a user needs to access the cash card routes.
pub const CARD_OWNER_ROLE: &str = "CARD-OWNER";

/// The config for a single user in the users file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// The name the user logs in with. This is also the owner of any cards they create.
    pub username: String,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
    /// The roles granted to the user, e.g. [CARD_OWNER_ROLE].
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The contents of the users file.
///
/// ```json
/// {
///   "users": [
///     { "username": "Sarah", "password_hash": "$2b$12$...", "roles": ["CARD-OWNER"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsersConfig {
    /// The users that may log in.
    pub users: Vec<UserConfig>,
}

impl UsersConfig {
    /// Parse the users config from a JSON string.
    ///
    /// # Errors
    /// Returns [Error::InvalidUsersConfig] if `json` is not a valid users config.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|error| Error::InvalidUsersConfig(error.to_string()))
    }

    /// Read the users config from the JSON file at `path`.
    ///
    /// # Errors
    /// Returns [Error::InvalidUsersConfig] if the file cannot be read or is not a valid users config.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path).map_err(|error| {
            Error::InvalidUsersConfig(format!("could not read {}: {error}", path.display()))
        })?;

        Self::from_json(&json)
    }
}

/// The authenticated user making a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    /// The user's name, used as the owner of cash cards.
    pub username: String,
    /// The roles granted to the user.
    pub roles: Vec<String>,
}

impl Principal {
    /// Whether the user has been granted `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|granted| granted == role)
    }
}

/// Why a set of credentials was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    /// No user has the given username, or the password was wrong.
    BadCredentials,
    /// The stored password hash could not be checked.
    InvalidHash,
}

/// Looks up users by username and checks their passwords.
///
/// The set of users is fixed when the store is created. Usernames are matched
/// ignoring case, and the authenticated [Principal] carries the username as
/// written in the users config.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: HashMap<String, UserConfig>,
}

impl CredentialStore {
    /// Create a credential store from the users in `config`.
    ///
    /// # Errors
    /// Returns [Error::InvalidUsersConfig] if a username is empty or appears more than once,
    /// ignoring case.
    pub fn new(config: UsersConfig) -> Result<Self, Error> {
        let mut users = HashMap::with_capacity(config.users.len());

        for user in config.users {
            if user.username.is_empty() {
                return Err(Error::InvalidUsersConfig(
                    "usernames cannot be empty".to_owned(),
                ));
            }

            let key = user.username.to_lowercase();
            if users.contains_key(&key) {
                return Err(Error::InvalidUsersConfig(format!(
                    "the username \"{}\" appears more than once",
                    user.username
                )));
            }

            users.insert(key, user);
        }

        Ok(Self { users })
    }

    /// The number of users in the store.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store has no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Check `password` against the stored hash for `username`.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    ///
    /// # Errors
    /// Returns [CredentialsError::BadCredentials] if the username or password is wrong,
    /// or [CredentialsError::InvalidHash] if the stored hash is malformed.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, CredentialsError> {
        let user = self
            .users
            .get(&username.to_lowercase())
            .ok_or(CredentialsError::BadCredentials)?;

        match user.password_hash.verify(password) {
            Ok(true) => Ok(Principal {
                username: user.username.clone(),
                roles: user.roles.clone(),
            }),
            Ok(false) => Err(CredentialsError::BadCredentials),
            Err(error) => {
                tracing::error!("Could not verify password for {username}: {error}");
                Err(CredentialsError::InvalidHash)
            }
        }
    }
}
