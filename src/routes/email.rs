use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::domain::subscriber_entry::SubscriberEntry;
use crate::operations::{self, OperationError};
use crate::routes::json::{decode_request, return_json};
use crate::store::SubscriberStore;
use crate::translation::EmailEntryBody;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct BatchQueryBody {
    pub page: i64,
    pub count: i64,
}

fn encode_entries(entries: &[SubscriberEntry]) -> Vec<EmailEntryBody> {
    entries.iter().map(EmailEntryBody::from).collect()
}

fn record_email(email: &str) {
    tracing::Span::current().record("subscriber_email", &tracing::field::display(email));
}

#[tracing::instrument(
    name = "JSON CreateEmail",
    skip(req, body, store),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn create_email(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<SubscriberStore>,
) -> HttpResponse {
    return_json(async {
        let entry: EmailEntryBody = decode_request(&req, &body)?;
        record_email(&entry.email);

        let created = operations::create_email(&store, entry.email).await?;

        Ok::<_, OperationError>(EmailEntryBody::from(&created))
    })
    .await
}

#[tracing::instrument(
    name = "JSON GetEmail",
    skip(req, body, store),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn get_email(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<SubscriberStore>,
) -> HttpResponse {
    return_json(async {
        let entry: EmailEntryBody = decode_request(&req, &body)?;
        record_email(&entry.email);

        let found = operations::get_email(&store, &entry.email).await?;

        Ok::<_, OperationError>(EmailEntryBody::from(&found))
    })
    .await
}

#[tracing::instrument(
    name = "JSON UpdateEmail",
    skip(req, body, store),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn update_email(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<SubscriberStore>,
) -> HttpResponse {
    return_json(async {
        let entry: EmailEntryBody = decode_request(&req, &body)?;
        record_email(&entry.email);

        let entry = SubscriberEntry::try_from(entry).map_err(OperationError::Validation)?;
        let updated = operations::update_email(&store, entry).await?;

        Ok::<_, OperationError>(EmailEntryBody::from(&updated))
    })
    .await
}

#[tracing::instrument(
    name = "JSON DeleteEmail",
    skip(req, body, store),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn delete_email(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<SubscriberStore>,
) -> HttpResponse {
    return_json(async {
        let entry: EmailEntryBody = decode_request(&req, &body)?;
        record_email(&entry.email);

        let opted_out = operations::delete_email(&store, entry.email).await?;

        Ok::<_, OperationError>(EmailEntryBody::from(&opted_out))
    })
    .await
}

#[tracing::instrument(
    name = "JSON GetEmailBatch",
    skip(req, body, store),
    fields(page = tracing::field::Empty, count = tracing::field::Empty)
)]
pub async fn get_email_batch(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<SubscriberStore>,
) -> HttpResponse {
    return_json(async {
        let params: BatchQueryBody = decode_request(&req, &body)?;
        tracing::Span::current()
            .record("page", params.page)
            .record("count", params.count);

        let entries = operations::get_email_batch(&store, params.page, params.count).await?;

        Ok::<_, OperationError>(encode_entries(&entries))
    })
    .await
}

#[tracing::instrument(name = "JSON GetAllRows", skip(store))]
pub async fn get_all_rows(store: web::Data<SubscriberStore>) -> HttpResponse {
    return_json(async {
        let entries = operations::get_all_rows(&store).await?;

        Ok::<_, OperationError>(encode_entries(&entries))
    })
    .await
}
