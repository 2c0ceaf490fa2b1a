//! Wire messages of the `mailinglist.MailingListService` gRPC service.

#[derive(Clone, PartialEq, prost::Message)]
pub struct EmailEntry {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub email: String,
    /// Seconds since the epoch, 0 when the address is not confirmed yet.
    #[prost(int64, tag = "3")]
    pub confirmed_at: i64,
    #[prost(bool, tag = "4")]
    pub opt_out: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateEmailRequest {
    #[prost(string, tag = "1")]
    pub email_addr: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetEmailRequest {
    #[prost(string, tag = "1")]
    pub email_addr: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateEmailRequest {
    #[prost(message, optional, tag = "1")]
    pub email_addr: Option<EmailEntry>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteEmailRequest {
    #[prost(string, tag = "1")]
    pub email_addr: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetEmailBatchRequest {
    #[prost(int32, tag = "1")]
    pub page: i32,
    #[prost(int32, tag = "2")]
    pub count: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetAllRowsRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EmailResponse {
    #[prost(message, optional, tag = "1")]
    pub email_entry: Option<EmailEntry>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetEmailBatchResponse {
    #[prost(message, repeated, tag = "1")]
    pub email_entries: Vec<EmailEntry>,
}

include!(concat!(env!("OUT_DIR"), "/mailinglist.MailingListService.rs"));
