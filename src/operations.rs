//! The operations both facades expose. Each one validates its input, makes a single store
//! call and, for writes, reads the row back so callers answer with what the table holds.

use crate::domain::batch_query::BatchQuery;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_entry::SubscriberEntry;
use crate::store::{StoreError, SubscriberStore};

#[derive(thiserror::Error)]
pub enum OperationError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} is already subscribed.")]
    DuplicateKey(String),
    #[error("{0} was not found.")]
    NotFound(String),
    #[error("Failed to access the subscriber store.")]
    Store(#[source] StoreError),
}

impl std::fmt::Debug for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationError::Store(err) => write!(f, "{}\nCaused by:\n\t{:?}", self, err),
            _ => write!(f, "{}", self),
        }
    }
}

impl From<StoreError> for OperationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(email) => OperationError::DuplicateKey(email),
            StoreError::InvalidArgument(message) => OperationError::Validation(message),
            err @ StoreError::Failure(_) => OperationError::Store(err),
        }
    }
}

pub async fn get_email(
    store: &SubscriberStore,
    email: &str,
) -> Result<SubscriberEntry, OperationError> {
    store
        .get(email)
        .await?
        .ok_or_else(|| OperationError::NotFound(email.to_string()))
}

pub async fn create_email(
    store: &SubscriberStore,
    email: String,
) -> Result<SubscriberEntry, OperationError> {
    let email = SubscriberEmail::parse(email).map_err(OperationError::Validation)?;

    store.create(email.as_ref()).await?;

    get_email(store, email.as_ref()).await
}

pub async fn update_email(
    store: &SubscriberStore,
    entry: SubscriberEntry,
) -> Result<SubscriberEntry, OperationError> {
    let email = SubscriberEmail::parse(entry.email.clone()).map_err(OperationError::Validation)?;

    store.update(&entry).await?;

    get_email(store, email.as_ref()).await
}

/// Opts the address out. The row is read back afterwards, so an address that was never stored
/// ends up as `NotFound`.
pub async fn delete_email(
    store: &SubscriberStore,
    email: String,
) -> Result<SubscriberEntry, OperationError> {
    let email = SubscriberEmail::parse(email).map_err(OperationError::Validation)?;

    store.opt_out(email.as_ref()).await?;

    get_email(store, email.as_ref()).await
}

pub async fn get_email_batch(
    store: &SubscriberStore,
    page: i64,
    count: i64,
) -> Result<Vec<SubscriberEntry>, OperationError> {
    let query = BatchQuery::parse(page, count).map_err(OperationError::Validation)?;

    Ok(store.list_page(query.page(), query.count()).await?)
}

pub async fn get_all_rows(store: &SubscriberStore) -> Result<Vec<SubscriberEntry>, OperationError> {
    Ok(store.list_all().await?)
}
