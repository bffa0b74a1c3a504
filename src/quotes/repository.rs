use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{QuoteId, QuoteState};

/// Storage abstraction so the service and router can be exercised in
/// isolation. `modify` runs the mutation inside a single critical section,
/// which is the only concurrency discipline the quote model needs: each
/// quote's state tuple is read and written as one unit.
pub trait QuoteRepository: Send + Sync {
    fn insert(&self, state: QuoteState) -> Result<QuoteState, RepositoryError>;

    fn fetch(&self, id: &QuoteId) -> Result<Option<QuoteState>, RepositoryError>;

    fn list(&self) -> Result<Vec<QuoteState>, RepositoryError>;

    fn modify<T>(
        &self,
        id: &QuoteId,
        apply: impl FnOnce(&mut QuoteState) -> T,
    ) -> Result<T, RepositoryError>
    where
        Self: Sized;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("quote already exists")]
    Conflict,
    #[error("quote not found")]
    NotFound,
    #[error("quote store unavailable: {0}")]
    Unavailable(String),
}

/// In-process quote store. The back office keeps all quote state in memory;
/// nothing outlives the process.
#[derive(Default)]
pub struct MemoryQuoteRepository {
    quotes: Mutex<HashMap<QuoteId, QuoteState>>,
}

impl MemoryQuoteRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<QuoteId, QuoteState>>, RepositoryError>
    {
        self.quotes
            .lock()
            .map_err(|_| RepositoryError::Unavailable("quote store poisoned".to_string()))
    }
}

impl QuoteRepository for MemoryQuoteRepository {
    fn insert(&self, state: QuoteState) -> Result<QuoteState, RepositoryError> {
        let mut quotes = self.lock()?;
        if quotes.contains_key(&state.quote_id) {
            return Err(RepositoryError::Conflict);
        }
        quotes.insert(state.quote_id.clone(), state.clone());
        Ok(state)
    }

    fn fetch(&self, id: &QuoteId) -> Result<Option<QuoteState>, RepositoryError> {
        let quotes = self.lock()?;
        Ok(quotes.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<QuoteState>, RepositoryError> {
        let quotes = self.lock()?;
        let mut states: Vec<QuoteState> = quotes.values().cloned().collect();
        states.sort_by(|a, b| a.quote_id.0.cmp(&b.quote_id.0));
        Ok(states)
    }

    fn modify<T>(
        &self,
        id: &QuoteId,
        apply: impl FnOnce(&mut QuoteState) -> T,
    ) -> Result<T, RepositoryError> {
        let mut quotes = self.lock()?;
        let state = quotes.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(apply(state))
    }
}
