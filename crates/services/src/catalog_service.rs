use std::sync::Arc;

use rand::Rng;

use trivia_core::model::{Catalog, CatalogError, Quiz};

use crate::source::QuestionSource;

/// Question count range per quiz, matching the source API's sweet spot.
pub const MIN_QUESTIONS: u8 = 5;
pub const MAX_QUESTIONS: u8 = 15;

/// Category id range offered by the source API.
pub const MIN_CATEGORY: u32 = 9;
pub const MAX_CATEGORY: u32 = 32;

/// Fetches quiz batches from a question source and assembles the catalog.
#[derive(Clone)]
pub struct CatalogService {
    source: Arc<dyn QuestionSource>,
}

impl CatalogService {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self { source }
    }

    /// Fetch `quiz_count` quizzes, each with a random question amount and
    /// category, and wait until every batch has resolved.
    ///
    /// Batches run as independent tasks: one failing fetch is logged and
    /// skipped without aborting the others. The interactive phase must not
    /// start before this returns, which is exactly the await-all barrier
    /// below.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCatalog` when every batch failed.
    pub async fn load(&self, quiz_count: usize) -> Result<Catalog, CatalogError> {
        let requests: Vec<(u8, u32)> = {
            let mut rng = rand::rng();
            (0..quiz_count)
                .map(|_| {
                    (
                        rng.random_range(MIN_QUESTIONS..=MAX_QUESTIONS),
                        rng.random_range(MIN_CATEGORY..=MAX_CATEGORY),
                    )
                })
                .collect()
        };

        let mut handles = Vec::with_capacity(requests.len());
        for (amount, category) in requests {
            let source = Arc::clone(&self.source);
            handles.push(tokio::spawn(async move {
                source.fetch_batch(amount, category).await
            }));
        }

        let mut catalog = Catalog::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(questions)) => match Quiz::new(questions) {
                    Ok(quiz) => catalog.add_quiz(quiz),
                    Err(err) => log::warn!("skipping empty quiz batch: {err}"),
                },
                Ok(Err(err)) => log::warn!("quiz batch fetch failed: {err}"),
                Err(err) => log::warn!("quiz batch task failed: {err}"),
            }
        }

        if catalog.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        Ok(catalog)
    }
}

/// Uniformly random quiz index, the "I'm feeling lucky" selection.
///
/// # Errors
///
/// Returns `CatalogError::EmptyCatalog` when no quizzes are loaded.
pub fn pick_random(catalog: &Catalog) -> Result<usize, CatalogError> {
    if catalog.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }
    Ok(rand::rng().random_range(0..catalog.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use trivia_core::model::{Difficulty, Question};

    use crate::error::FetchError;

    /// Fails every n-th batch, succeeds otherwise.
    struct FlakySource {
        calls: AtomicUsize,
        fail_every: usize,
    }

    impl FlakySource {
        fn new(fail_every: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_every,
            }
        }
    }

    #[async_trait]
    impl QuestionSource for FlakySource {
        async fn fetch_batch(
            &self,
            amount: u8,
            category: u32,
        ) -> Result<Vec<Question>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_every != 0 && (call + 1) % self.fail_every == 0 {
                return Err(FetchError::ApiResponse(1));
            }
            Ok((0..amount)
                .map(|i| {
                    Question::new(
                        format!("Category {category}"),
                        Difficulty::Easy,
                        format!("Q{i}"),
                        "yes",
                        vec!["no".into()],
                    )
                })
                .collect())
        }
    }

    struct DeadSource;

    #[async_trait]
    impl QuestionSource for DeadSource {
        async fn fetch_batch(
            &self,
            _amount: u8,
            _category: u32,
        ) -> Result<Vec<Question>, FetchError> {
            Err(FetchError::ApiResponse(2))
        }
    }

    #[tokio::test]
    async fn loads_the_requested_number_of_quizzes() {
        let service = CatalogService::new(Arc::new(FlakySource::new(0)));
        let catalog = service.load(4).await.unwrap();

        assert_eq!(catalog.len(), 4);
        for quiz in catalog.iter() {
            let len = quiz.len() as u8;
            assert!((MIN_QUESTIONS..=MAX_QUESTIONS).contains(&len));
        }
    }

    #[tokio::test]
    async fn failed_batches_are_skipped_not_fatal() {
        let service = CatalogService::new(Arc::new(FlakySource::new(2)));
        let catalog = service.load(6).await.unwrap();

        // Every second batch fails; the rest still arrive.
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn all_batches_failing_yields_empty_catalog() {
        let service = CatalogService::new(Arc::new(DeadSource));
        let err = service.load(3).await.unwrap_err();
        assert_eq!(err, CatalogError::EmptyCatalog);
    }

    #[tokio::test]
    async fn pick_random_stays_in_range() {
        let service = CatalogService::new(Arc::new(FlakySource::new(0)));
        let catalog = service.load(5).await.unwrap();

        for _ in 0..50 {
            let index = pick_random(&catalog).unwrap();
            assert!(index < catalog.len());
        }
    }

    #[test]
    fn pick_random_rejects_empty_catalog() {
        let err = pick_random(&Catalog::new()).unwrap_err();
        assert_eq!(err, CatalogError::EmptyCatalog);
    }
}
