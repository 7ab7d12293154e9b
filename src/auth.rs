use crate::errors::AuthError;
use crate::models::User;
use crate::storage::Store;
use anyhow::Result;

pub fn find_user<S: Store>(store: &S, username: &str) -> Result<Option<User>> {
    let users = store.load_users()?;
    Ok(users.into_iter().find(|u| u.username == username))
}

/// Signs in `username`, creating the account when it does not exist yet.
/// Passing an email means sign-up: it must look like an address, but an
/// existing username still just signs in and the email is ignored. On
/// success the user becomes the current user.
pub fn login<S: Store>(store: &S, username: &str, email: Option<&str>) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::UsernameRequired.into());
    }

    let email = match email.map(str::trim) {
        Some("") => return Err(AuthError::EmailRequired.into()),
        Some(e) if !e.contains('@') => return Err(AuthError::InvalidEmail.into()),
        Some(e) => e,
        None => "",
    };

    let mut users = store.load_users()?;
    let user = match users.iter().find(|u| u.username == username) {
        Some(existing) => {
            tracing::info!("signed in as {}", existing.username);
            existing.clone()
        }
        None => {
            let user = User::new(username, email);
            users.push(user.clone());
            store.save_users(&users)?;
            tracing::info!("created user {} ({})", user.username, user.id);
            user
        }
    };

    store.set_current_user(&user)?;
    Ok(user)
}

pub fn logout<S: Store>(store: &S) -> Result<()> {
    store.clear_current_user()?;
    tracing::info!("logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn auth_error(result: Result<User>) -> AuthError {
        result
            .unwrap_err()
            .downcast_ref::<AuthError>()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_sign_up_creates_user() -> Result<()> {
        let store = MemoryStore::default();
        let user = login(&store, "  ada ", Some("ada@example.com"))?;

        assert_eq!(user.username, "ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(store.load_users()?, vec![user.clone()]);
        assert_eq!(store.current_user()?, Some(user));
        Ok(())
    }

    #[test]
    fn test_existing_username_signs_in() -> Result<()> {
        let store = MemoryStore::default();
        let first = login(&store, "ada", Some("ada@example.com"))?;
        let again = login(&store, "ada", Some("other@example.com"))?;
        let plain = login(&store, "ada", None)?;

        assert_eq!(first, again);
        assert_eq!(first, plain);
        assert_eq!(again.email, "ada@example.com");
        assert_eq!(store.load_users()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_sign_in_unknown_user_creates_account() -> Result<()> {
        let store = MemoryStore::default();
        let user = login(&store, "grace", None)?;
        assert_eq!(user.email, "");
        assert_eq!(find_user(&store, "grace")?, Some(user));
        Ok(())
    }

    #[test]
    fn test_validation_errors() {
        let store = MemoryStore::default();
        assert_eq!(auth_error(login(&store, "   ", None)), AuthError::UsernameRequired);
        assert_eq!(auth_error(login(&store, "ada", Some(" "))), AuthError::EmailRequired);
        assert_eq!(
            auth_error(login(&store, "ada", Some("ada.example.com"))),
            AuthError::InvalidEmail
        );
        assert!(store.load_users().unwrap().is_empty());
        assert!(store.current_user().unwrap().is_none());
    }

    #[test]
    fn test_distinct_users_get_distinct_ids() -> Result<()> {
        let store = MemoryStore::default();
        let a = login(&store, "a", None)?;
        let b = login(&store, "b", None)?;
        assert_ne!(a.id, b.id);
        assert_eq!(store.current_user()?, Some(b));

        logout(&store)?;
        assert!(store.current_user()?.is_none());
        Ok(())
    }
}
