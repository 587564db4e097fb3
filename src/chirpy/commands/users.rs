use crate::credential::CredentialHasher;
use crate::error::{ChirpyError, Result};
use crate::model::User;
use crate::store::{StorageBackend, Store};

pub fn list<B: StorageBackend>(store: &Store<B>) -> Result<Vec<User>> {
    store.read_all::<User>()
}

/// Store a user whose credential has already been hashed.
///
/// Fails with [`ChirpyError::Conflict`] if any user already has `email`.
/// Emails compare exactly; no case folding or trimming is applied.
pub fn create<B: StorageBackend>(
    store: &Store<B>,
    email: &str,
    credential: &str,
) -> Result<User> {
    store.create::<User, _, _>(
        |users| {
            if users.values().any(|u| u.email == email) {
                return Err(ChirpyError::Conflict(format!(
                    "email already exists: {}",
                    email
                )));
            }
            Ok(())
        },
        |id| User {
            id,
            email: email.to_string(),
            password_credential: credential.to_string(),
        },
    )
}

/// Hash `password` and store the user.
pub fn register<B: StorageBackend, H: CredentialHasher + ?Sized>(
    store: &Store<B>,
    hasher: &H,
    email: &str,
    password: &str,
) -> Result<User> {
    let credential = hasher.hash(password)?;
    create(store, email, &credential)
}

pub fn find_by_email<B: StorageBackend>(store: &Store<B>, email: &str) -> Result<Option<User>> {
    let snapshot = store.read_snapshot()?;
    Ok(snapshot.users.into_values().find(|u| u.email == email))
}

/// Look up `email` and check `password` against its stored credential.
pub fn login<B: StorageBackend, H: CredentialHasher + ?Sized>(
    store: &Store<B>,
    hasher: &H,
    email: &str,
    password: &str,
) -> Result<User> {
    let user = find_by_email(store, email)?
        .ok_or_else(|| ChirpyError::UserNotFound(email.to_string()))?;

    if !hasher.verify(&user.password_credential, password) {
        return Err(ChirpyError::InvalidCredentials);
    }
    Ok(user)
}
