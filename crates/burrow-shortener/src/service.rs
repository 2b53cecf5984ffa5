use async_trait::async_trait;
use burrow_core::{
    Clock, Mapping, MappingRepository, NewMapping, OwnerId, ShortCode, ShortenParams, Shortener,
    ShortenerError, StorageError, SystemClock,
};
use burrow_generator::Generator;
use std::sync::Arc;
use tracing::{debug, error, warn};
use typed_builder::TypedBuilder;
use url::Url;

/// Default number of allocation attempts before giving up on collisions.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ShortenerSettings {
    /// How many candidate codes to try before failing with
    /// [`ShortenerError::AllocationExhausted`]. Values below 1 are treated as 1.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service wraps a [`MappingRepository`] and a [`Generator`] to handle:
/// - URL validation
/// - Short code allocation with collision retry
/// - Owner-scoped listing and deletion
///
/// Collisions are detected only through the repository's uniqueness
/// constraint (`StorageError::Conflict` on insert). The service never checks
/// for existence before inserting.
#[derive(Debug)]
pub struct ShortenerService<R, G, C = SystemClock> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: Arc<C>,
    settings: ShortenerSettings,
}

impl<R, G, C> Clone for ShortenerService<R, G, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            clock: Arc::clone(&self.clock),
            settings: self.settings,
        }
    }
}

impl<R: MappingRepository, G: Generator> ShortenerService<R, G, SystemClock> {
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_clock(repository, generator, SystemClock)
    }
}

impl<R: MappingRepository, G: Generator, C: Clock> ShortenerService<R, G, C> {
    /// Creates a service that stamps `created_at` from the given clock.
    pub fn with_clock(repository: R, generator: G, clock: C) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock: Arc::new(clock),
            settings: ShortenerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ShortenerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validates that the URL is an absolute http(s) URL with a host.
    ///
    /// Returns the URL as it will be stored (surrounding whitespace removed).
    /// The stored string ends up verbatim in a `Location` header, so embedded
    /// whitespace and control characters are rejected even where the URL
    /// parser would silently drop them.
    fn validate_url(url: &str) -> Result<String, ShortenerError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ShortenerError::InvalidInput(
                "URL cannot be empty".to_string(),
            ));
        }

        if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ShortenerError::InvalidInput(format!(
                "URL must not contain whitespace or control characters: {url:?}"
            )));
        }

        let parsed = Url::parse(url)
            .map_err(|e| ShortenerError::InvalidInput(format!("malformed URL '{url}': {e}")))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidInput(format!(
                "URL scheme must be http or https: {scheme}"
            )));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ShortenerError::InvalidInput(format!(
                "URL must have a host: {url}"
            )));
        }

        Ok(url.to_string())
    }
}

#[async_trait]
impl<R: MappingRepository, G: Generator, C: Clock> Shortener for ShortenerService<R, G, C> {
    async fn shorten(&self, params: ShortenParams) -> Result<Mapping, ShortenerError> {
        let original_url = Self::validate_url(&params.original_url)?;
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let code = self
                .generator
                .generate()
                .map_err(|e| ShortenerError::GenerationUnavailable(e.to_string()))?;

            let candidate = NewMapping {
                code,
                original_url: original_url.clone(),
                owner: params.owner.clone(),
                created_at: self.clock.now(),
            };

            match self.repository.insert(candidate).await {
                Ok(mapping) => {
                    debug!(
                        code = %mapping.code,
                        mapping_id = %mapping.id,
                        owner = %mapping.owner,
                        attempt,
                        "created mapping"
                    );
                    return Ok(mapping);
                }
                Err(StorageError::Conflict(code)) => {
                    warn!(code = %code, attempt, max_attempts, "short code collision");
                }
                Err(other) => return Err(other.into()),
            }
        }

        error!(attempts = max_attempts, "short code allocation exhausted");
        Err(ShortenerError::AllocationExhausted {
            attempts: max_attempts,
        })
    }

    async fn lookup(&self, code: &ShortCode) -> Result<Option<Mapping>, ShortenerError> {
        Ok(self.repository.find_by_code(code).await?)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Mapping>, ShortenerError> {
        Ok(self.repository.list_by_owner(owner).await?)
    }

    async fn delete(&self, owner: &OwnerId, code: &ShortCode) -> Result<bool, ShortenerError> {
        let Some(mapping) = self.repository.find_by_code(code).await? else {
            return Ok(false);
        };

        if mapping.owner != *owner {
            debug!(code = %code, owner = %owner, "refusing to delete mapping of another owner");
            return Ok(false);
        }

        let deleted = self.repository.delete(mapping.id).await?;
        if deleted {
            debug!(code = %code, mapping_id = %mapping.id, "deleted mapping");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::{FixedClock, ReadMappingRepository};
    use burrow_generator::{GeneratorError, SeqGenerator};
    use burrow_storage::InMemoryStore;
    use jiff::Timestamp;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always proposes the same code.
    struct StuckGenerator {
        code: ShortCode,
        calls: Arc<AtomicUsize>,
    }

    impl Generator for StuckGenerator {
        fn generate(&self) -> Result<ShortCode, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.code.clone())
        }
    }

    struct BrokenGenerator;

    impl Generator for BrokenGenerator {
        fn generate(&self) -> Result<ShortCode, GeneratorError> {
            Err(GeneratorError::Unavailable("no entropy".to_string()))
        }
    }

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    fn params(url: &str, o: &str) -> ShortenParams {
        ShortenParams {
            original_url: url.to_string(),
            owner: owner(o),
        }
    }

    fn test_service() -> (ShortenerService<InMemoryStore, SeqGenerator>, InMemoryStore) {
        let store = InMemoryStore::new();
        let service = ShortenerService::new(store.clone(), SeqGenerator::with_prefix("wh"));
        (service, store)
    }

    #[tokio::test]
    async fn shorten_with_generated_code() {
        let (service, _) = test_service();

        let mapping = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap();

        assert_eq!(mapping.code.as_str(), "wh000000");
        assert_eq!(mapping.original_url, "https://example.com");
        assert_eq!(mapping.owner, owner("alice"));
        assert_eq!(mapping.click_count, 0);
    }

    #[tokio::test]
    async fn shorten_then_lookup_returns_same_url() {
        let (service, _) = test_service();

        for url in [
            "https://example.com/page",
            "http://example.com:8080/a/b?c=d#frag",
            "https://sub.example.org/%E2%9C%93",
        ] {
            let mapping = service.shorten(params(url, "alice")).await.unwrap();
            let found = service.lookup(&mapping.code).await.unwrap().unwrap();
            assert_eq!(found.original_url, url);
        }
    }

    #[tokio::test]
    async fn shorten_rejects_invalid_urls_without_writing() {
        let (service, store) = test_service();

        for url in [
            "",
            "   ",
            "not-a-valid-url",
            "ftp://example.com/file",
            "mailto:someone@example.com",
            "https://",
            "https://example.com/a\nb",
            "https://exa\tmple.com/",
            "https://example.com/a\rb",
            "https://example.com/a b",
            "https://example.com/\u{7f}",
        ] {
            let err = service.shorten(params(url, "alice")).await.unwrap_err();
            assert!(
                matches!(err, ShortenerError::InvalidInput(_)),
                "{url:?} should be rejected"
            );
        }

        assert!(store.list_by_owner(&owner("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shorten_trims_surrounding_whitespace() {
        let (service, _) = test_service();

        let mapping = service
            .shorten(params("  https://example.com  ", "alice"))
            .await
            .unwrap();
        assert_eq!(mapping.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn shorten_retries_past_taken_codes() {
        let (service, store) = test_service();
        for taken in ["wh000000", "wh000001"] {
            store
                .insert(NewMapping {
                    code: ShortCode::new_unchecked(taken),
                    original_url: "https://taken.example".to_string(),
                    owner: owner("bob"),
                    created_at: Timestamp::now(),
                })
                .await
                .unwrap();
        }

        let mapping = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap();

        assert_eq!(mapping.code.as_str(), "wh000002");
    }

    #[tokio::test]
    async fn shorten_gives_up_after_max_attempts() {
        let store = InMemoryStore::new();
        let taken = ShortCode::new_unchecked("taken123");
        store
            .insert(NewMapping {
                code: taken.clone(),
                original_url: "https://taken.example".to_string(),
                owner: owner("bob"),
                created_at: Timestamp::now(),
            })
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let generator = StuckGenerator {
            code: taken,
            calls: Arc::clone(&calls),
        };
        let service = ShortenerService::new(store.clone(), generator);

        let err = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::AllocationExhausted { attempts } if attempts == DEFAULT_MAX_ATTEMPTS
        ));
        assert_eq!(calls.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
        assert!(store.list_by_owner(&owner("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn max_attempts_is_configurable() {
        let store = InMemoryStore::new();
        let taken = ShortCode::new_unchecked("taken123");
        store
            .insert(NewMapping {
                code: taken.clone(),
                original_url: "https://taken.example".to_string(),
                owner: owner("bob"),
                created_at: Timestamp::now(),
            })
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let generator = StuckGenerator {
            code: taken,
            calls: Arc::clone(&calls),
        };
        let service = ShortenerService::new(store, generator)
            .with_settings(ShortenerSettings::builder().max_attempts(2).build());

        let err = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AllocationExhausted { attempts: 2 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn generator_failure_is_surfaced() {
        let store = InMemoryStore::new();
        let service = ShortenerService::new(store.clone(), BrokenGenerator);

        let err = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::GenerationUnavailable(_)));
        assert!(store.list_by_owner(&owner("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_at_comes_from_clock() {
        let at: Timestamp = "2024-05-01T12:34:56Z".parse().unwrap();
        let service = ShortenerService::with_clock(
            InMemoryStore::new(),
            SeqGenerator::with_prefix("wh"),
            FixedClock::new(at),
        );

        let mapping = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap();
        assert_eq!(mapping.created_at, at);
    }

    #[tokio::test]
    async fn lookup_nonexistent_code() {
        let (service, _) = test_service();

        let found = service
            .lookup(&ShortCode::new("nope1234").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn lookup_has_no_side_effects() {
        let (service, _) = test_service();
        let mapping = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap();

        for _ in 0..3 {
            service.lookup(&mapping.code).await.unwrap();
        }

        let found = service.lookup(&mapping.code).await.unwrap().unwrap();
        assert_eq!(found.click_count, 0);
    }

    #[tokio::test]
    async fn list_by_owner_only_returns_own_mappings() {
        let (service, _) = test_service();

        service.shorten(params("https://a.example", "alice")).await.unwrap();
        service.shorten(params("https://b.example", "alice")).await.unwrap();
        service.shorten(params("https://c.example", "bob")).await.unwrap();

        let mut urls: Vec<_> = service
            .list_by_owner(&owner("alice"))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.original_url)
            .collect();
        urls.sort();

        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn delete_own_mapping() {
        let (service, _) = test_service();
        let mapping = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap();

        assert!(service.delete(&owner("alice"), &mapping.code).await.unwrap());
        assert!(service.lookup(&mapping.code).await.unwrap().is_none());
        assert!(!service.delete(&owner("alice"), &mapping.code).await.unwrap());
    }

    #[tokio::test]
    async fn delete_refuses_other_owners_mapping() {
        let (service, _) = test_service();
        let mapping = service
            .shorten(params("https://example.com", "alice"))
            .await
            .unwrap();

        assert!(!service.delete(&owner("mallory"), &mapping.code).await.unwrap());
        assert!(service.lookup(&mapping.code).await.unwrap().is_some());
    }
}
