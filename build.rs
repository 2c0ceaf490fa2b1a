// The wire messages live in src/grpc/proto.rs as prost structs, so the service and client stubs are
// generated with the manual builder and no protoc install is needed.
fn main() {
    let method = |name: &str, route: &str, input: &str, output: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type(format!("crate::grpc::proto::{}", input))
            .output_type(format!("crate::grpc::proto::{}", output))
            .codec_path("tonic::codec::ProstCodec")
            .build()
    };

    let mailing_list_service = tonic_build::manual::Service::builder()
        .name("MailingListService")
        .package("mailinglist")
        .method(method(
            "get_email",
            "GetEmail",
            "GetEmailRequest",
            "EmailResponse",
        ))
        .method(method(
            "get_email_batch",
            "GetEmailBatch",
            "GetEmailBatchRequest",
            "GetEmailBatchResponse",
        ))
        .method(method(
            "get_all_rows",
            "GetAllRows",
            "GetAllRowsRequest",
            "GetEmailBatchResponse",
        ))
        .method(method(
            "create_email",
            "CreateEmail",
            "CreateEmailRequest",
            "EmailResponse",
        ))
        .method(method(
            "update_email",
            "UpdateEmail",
            "UpdateEmailRequest",
            "EmailResponse",
        ))
        .method(method(
            "delete_email",
            "DeleteEmail",
            "DeleteEmailRequest",
            "EmailResponse",
        ))
        .build();

    tonic_build::manual::Builder::new().compile(&[mailing_list_service]);
}
