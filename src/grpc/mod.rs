pub mod proto;

use std::future::Future;
use std::pin::Pin;

use tonic::transport::server::TcpIncoming;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use crate::domain::subscriber_entry::SubscriberEntry;
use crate::operations::{self, OperationError};
use crate::store::SubscriberStore;
use proto::mailing_list_service_server::{MailingListService, MailingListServiceServer};
use proto::{
    CreateEmailRequest, DeleteEmailRequest, EmailResponse, GetAllRowsRequest,
    GetEmailBatchRequest, GetEmailBatchResponse, GetEmailRequest, UpdateEmailRequest,
};

pub type GrpcServer = Pin<Box<dyn Future<Output = Result<(), tonic::transport::Error>> + Send>>;

/// gRPC front end of the subscriber store.
pub struct MailServer {
    store: SubscriberStore,
}

impl MailServer {
    pub fn new(store: SubscriberStore) -> Self {
        Self { store }
    }
}

impl From<OperationError> for Status {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Validation(message) => Status::invalid_argument(message),
            err @ OperationError::DuplicateKey(_) => Status::already_exists(err.to_string()),
            err @ OperationError::NotFound(_) => Status::not_found(err.to_string()),
            err @ OperationError::Store(_) => {
                tracing::error!("gRPC request failed: {:?}", err);
                Status::internal(err.to_string())
            }
        }
    }
}

fn email_response(entry: &SubscriberEntry) -> Response<EmailResponse> {
    Response::new(EmailResponse {
        email_entry: Some(entry.into()),
    })
}

fn batch_response(entries: &[SubscriberEntry]) -> Response<GetEmailBatchResponse> {
    Response::new(GetEmailBatchResponse {
        email_entries: entries.iter().map(proto::EmailEntry::from).collect(),
    })
}

#[tonic::async_trait]
impl MailingListService for MailServer {
    #[tracing::instrument(
        name = "gRPC GetEmail",
        skip(self, request),
        fields(subscriber_email = %request.get_ref().email_addr)
    )]
    async fn get_email(
        &self,
        request: Request<GetEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let request = request.into_inner();
        let entry = operations::get_email(&self.store, &request.email_addr).await?;

        Ok(email_response(&entry))
    }

    #[tracing::instrument(
        name = "gRPC GetEmailBatch",
        skip(self, request),
        fields(page = request.get_ref().page, count = request.get_ref().count)
    )]
    async fn get_email_batch(
        &self,
        request: Request<GetEmailBatchRequest>,
    ) -> Result<Response<GetEmailBatchResponse>, Status> {
        let request = request.into_inner();
        let entries = operations::get_email_batch(
            &self.store,
            i64::from(request.page),
            i64::from(request.count),
        )
        .await?;

        Ok(batch_response(&entries))
    }

    #[tracing::instrument(name = "gRPC GetAllRows", skip(self, _request))]
    async fn get_all_rows(
        &self,
        _request: Request<GetAllRowsRequest>,
    ) -> Result<Response<GetEmailBatchResponse>, Status> {
        let entries = operations::get_all_rows(&self.store).await?;

        Ok(batch_response(&entries))
    }

    #[tracing::instrument(
        name = "gRPC CreateEmail",
        skip(self, request),
        fields(subscriber_email = %request.get_ref().email_addr)
    )]
    async fn create_email(
        &self,
        request: Request<CreateEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let request = request.into_inner();
        let entry = operations::create_email(&self.store, request.email_addr).await?;

        Ok(email_response(&entry))
    }

    #[tracing::instrument(
        name = "gRPC UpdateEmail",
        skip(self, request),
        fields(subscriber_email = tracing::field::Empty)
    )]
    async fn update_email(
        &self,
        request: Request<UpdateEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let message = request
            .into_inner()
            .email_addr
            .ok_or_else(|| Status::invalid_argument("the entry to update is missing"))?;
        tracing::Span::current()
            .record("subscriber_email", &tracing::field::display(&message.email));

        let entry = SubscriberEntry::try_from(message).map_err(OperationError::Validation)?;
        let entry = operations::update_email(&self.store, entry).await?;

        Ok(email_response(&entry))
    }

    #[tracing::instrument(
        name = "gRPC DeleteEmail",
        skip(self, request),
        fields(subscriber_email = %request.get_ref().email_addr)
    )]
    async fn delete_email(
        &self,
        request: Request<DeleteEmailRequest>,
    ) -> Result<Response<EmailResponse>, Status> {
        let request = request.into_inner();
        let entry = operations::delete_email(&self.store, request.email_addr).await?;

        Ok(email_response(&entry))
    }
}

pub fn run(
    listener: tokio::net::TcpListener,
    store: SubscriberStore,
) -> Result<GrpcServer, std::io::Error> {
    let incoming = TcpIncoming::from_listener(listener, true, None)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let server = Server::builder()
        .add_service(MailingListServiceServer::new(MailServer::new(store)))
        .serve_with_incoming(incoming);

    Ok(Box::pin(server))
}
