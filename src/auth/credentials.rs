use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::{info, warn};

use super::password::Passwords;
use super::principal::Principal;
use crate::database::store::{StoreError, UserLookup};

/// Identity and plaintext secret presented with a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// Parses an `Authorization: Basic <base64(identity:secret)>` value.
    /// Anything malformed counts as no credentials.
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (identity, secret) = decoded.split_once(':')?;
        Some(Self::new(identity, secret))
    }

    pub fn to_basic_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.identity, self.secret)))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Why authentication failed. For diagnostics only; callers outside the
/// gate see a single "access denied" outcome.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Auth header not found")]
    NoCredentials,

    #[error("User not found for username: {0}")]
    UserNotFound(String),

    #[error("Authentication failure for username: {0}")]
    BadCredentials(String),

    #[error("User lookup failed: {0}")]
    Lookup(#[from] StoreError),
}

/// Resolves credentials into a principal.
pub async fn authenticate<L>(
    lookup: &L,
    passwords: &Passwords,
    credentials: Option<Credentials>,
) -> Result<Principal, AuthFailure>
where
    L: UserLookup + ?Sized,
{
    let result = verify(lookup, passwords, credentials).await;
    match &result {
        Ok(principal) => info!("Authentication successful for username: {}", principal.identity()),
        Err(AuthFailure::Lookup(e)) => {
            tracing::error!("User lookup failed during authentication: {}", e)
        }
        Err(failure) => warn!("{}", failure),
    }
    result
}

async fn verify<L>(
    lookup: &L,
    passwords: &Passwords,
    credentials: Option<Credentials>,
) -> Result<Principal, AuthFailure>
where
    L: UserLookup + ?Sized,
{
    let Credentials { identity, secret } = credentials.ok_or(AuthFailure::NoCredentials)?;

    // Argon2 verification is CPU-bound, run it off the async workers. A
    // missing account still pays for one comparison.
    let hasher = passwords.clone();
    let Some(user) = lookup.find_user_by_email(&identity).await? else {
        let _ = tokio::task::spawn_blocking(move || hasher.verify_absent(&secret)).await;
        return Err(AuthFailure::UserNotFound(identity));
    };

    let stored = user.password.clone();
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&secret, &stored))
        .await
        .unwrap_or(false);

    if !matches {
        return Err(AuthFailure::BadCredentials(user.email_address));
    }
    Ok(Principal::new(user))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::auth::password;
    use crate::database::memory::MemoryStore;
    use crate::database::models::NewUser;

    async fn store_with(
        passwords: &Passwords,
        email: &str,
        secret: &str,
        roles: &str,
    ) -> MemoryStore {
        let store = MemoryStore::new();
        let user = NewUser {
            first_name: "Joe".into(),
            last_name: "Smith".into(),
            email_address: email.into(),
            password_hash: passwords.hash(secret).unwrap(),
            date_of_birth: None,
            biological_sex: None,
            phone: None,
            city: None,
            biography: None,
            avatar_url: None,
        };
        store.insert_user_with_roles(user, roles).await.unwrap();
        store
    }

    #[test]
    fn parses_basic_header() {
        let header = Credentials::new("joe@smith.com", "joepassword").to_basic_header();
        assert_eq!(header, "Basic am9lQHNtaXRoLmNvbTpqb2VwYXNzd29yZA==");
        let parsed = Credentials::from_basic_header(&header).unwrap();
        assert_eq!(parsed.identity, "joe@smith.com");
        assert_eq!(parsed.secret, "joepassword");
    }

    #[test]
    fn secret_may_contain_colons() {
        let header = Credentials::new("a@b.c", "pa:ss:word").to_basic_header();
        assert_eq!(Credentials::from_basic_header(&header).unwrap().secret, "pa:ss:word");
    }

    #[test]
    fn malformed_headers_are_no_credentials() {
        assert!(Credentials::from_basic_header("").is_none());
        assert!(Credentials::from_basic_header("Bearer abc.def").is_none());
        assert!(Credentials::from_basic_header("Basic !!!notbase64").is_none());
        // valid base64 without a colon separator
        assert!(Credentials::from_basic_header("Basic am9l").is_none());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", Credentials::new("joe@smith.com", "hunter22"));
        assert!(rendered.contains("joe@smith.com"));
        assert!(!rendered.contains("hunter22"));
    }

    #[tokio::test]
    async fn authenticates_matching_secret() {
        let passwords = password::fast();
        let store = store_with(&passwords, "joe@smith.com", "joepassword", "coach athlete").await;
        let creds = Credentials::new("joe@smith.com", "joepassword");
        let principal = authenticate(&store, &passwords, Some(creds))
            .await
            .unwrap();
        assert_eq!(principal.identity(), "joe@smith.com");
        assert_eq!(principal.rank(), 300);
        assert_eq!(principal.roles().encode(), "athlete coach");
    }

    #[tokio::test]
    async fn distinguishes_failure_kinds_internally() {
        let passwords = password::fast();
        let store = store_with(&passwords, "joe@smith.com", "joepassword", "").await;

        let none = authenticate(&store, &passwords, None).await.unwrap_err();
        assert!(matches!(none, AuthFailure::NoCredentials));

        let creds = Credentials::new("sally@jones.com", "x");
        let missing = authenticate(&store, &passwords, Some(creds))
            .await
            .unwrap_err();
        assert!(matches!(missing, AuthFailure::UserNotFound(ref who) if who == "sally@jones.com"));

        let creds = Credentials::new("joe@smith.com", "nope");
        let wrong = authenticate(&store, &passwords, Some(creds))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthFailure::BadCredentials(_)));
    }

    async fn average_failure(passwords: &Passwords, store: &MemoryStore, email: &str) -> Duration {
        let rounds = 5;
        let started = Instant::now();
        for _ in 0..rounds {
            let creds = Credentials::new(email, "wrong-secret");
            assert!(authenticate(store, passwords, Some(creds)).await.is_err());
        }
        started.elapsed() / rounds
    }

    #[tokio::test]
    async fn unknown_user_costs_a_full_comparison() {
        let passwords = Passwords::new(4096, 2, 1).unwrap();
        let store = store_with(&passwords, "joe@smith.com", "joepassword", "").await;

        // Warm the blocking pool before timing.
        average_failure(&passwords, &store, "joe@smith.com").await;

        let missing = average_failure(&passwords, &store, "sally@jones.com").await;
        let wrong = average_failure(&passwords, &store, "joe@smith.com").await;
        assert!(
            missing * 4 >= wrong,
            "unknown user {:?} vs wrong password {:?}",
            missing,
            wrong
        );
    }

    #[tokio::test]
    async fn identity_match_is_case_sensitive() {
        let passwords = password::fast();
        let store = store_with(&passwords, "joe@smith.com", "joepassword", "").await;
        let creds = Credentials::new("Joe@Smith.com", "joepassword");
        let err = authenticate(&store, &passwords, Some(creds))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthFailure::UserNotFound(_)));
    }
}
