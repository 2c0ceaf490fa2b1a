use reqwest::Response;
use std::sync::Once;
use tonic::transport::Channel;
use uuid::Uuid;

use mailing_list::{
    config::{get_configuration, Settings},
    grpc::proto::mailing_list_service_client::MailingListServiceClient,
    startup::Application,
    store::SubscriberStore,
    telemetry::{get_subscriber, init_subscriber},
};

static TRACING: Once = Once::new();

// Logs are only printed when TEST_LOG is set, e.g. `TEST_LOG=true cargo test`
fn init_tracing() {
    TRACING.call_once(|| {
        let default_filter_level = String::from("info");
        let subscriber_name = String::from("test");

        if std::env::var("TEST_LOG").is_ok() {
            init_subscriber(get_subscriber(
                subscriber_name,
                default_filter_level,
                std::io::stdout,
            ));
        } else {
            init_subscriber(get_subscriber(
                subscriber_name,
                default_filter_level,
                std::io::sink,
            ));
        }
    });
}

/// Path of a database file nobody else uses.
pub fn test_db_path() -> String {
    let db_test_name = format!("db_{}.db", Uuid::new_v4().to_string().replace('-', "_"));

    std::env::temp_dir()
        .join(db_test_name)
        .to_string_lossy()
        .into_owned()
}

pub fn test_config() -> Settings {
    let mut config = get_configuration().expect("Missing configuration.");

    // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
    // take into account: when port is 0, the OS will search for the first available port
    config.set_db_path(test_db_path());
    config.set_bind_json(String::from("127.0.0.1:0"));
    config.set_bind_grpc(String::from("127.0.0.1:0"));

    config
}

/// A fresh, initialized store on its own database file.
pub async fn spawn_store() -> SubscriberStore {
    init_tracing();
    let config = test_config();
    let store = SubscriberStore::connect_lazy(config.get_db_options(), 5);

    store
        .initialize()
        .await
        .expect("Failed to create the subscriber table.");

    store
}

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub grpc_address: String,
    pub store: SubscriberStore,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        init_tracing();
        let config = test_config();

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_json_port());
        let grpc_address = format!("http://127.0.0.1:{}", application.get_grpc_port());

        tokio::spawn(application.run_until_stop());

        let store = SubscriberStore::connect_lazy(config.get_db_options(), 1);

        TestApp {
            config,
            address,
            grpc_address,
            store,
        }
    }

    pub async fn grpc_client(&self) -> MailingListServiceClient<Channel> {
        MailingListServiceClient::connect(self.grpc_address.clone())
            .await
            .expect("Failed to connect to the gRPC server.")
    }

    pub async fn create_email(&self, email: &str) -> Response {
        self.send(
            reqwest::Method::POST,
            "/email/create",
            serde_json::json!({ "Email": email }),
        )
        .await
    }

    pub async fn get_email(&self, email: &str) -> Response {
        self.send(
            reqwest::Method::GET,
            "/email/get",
            serde_json::json!({ "Email": email }),
        )
        .await
    }

    pub async fn update_email(&self, body: serde_json::Value) -> Response {
        self.send(reqwest::Method::PUT, "/email/update", body).await
    }

    pub async fn delete_email(&self, email: &str) -> Response {
        self.send(
            reqwest::Method::POST,
            "/email/delete",
            serde_json::json!({ "Email": email }),
        )
        .await
    }

    pub async fn get_email_batch(&self, page: i64, count: i64) -> Response {
        self.send(
            reqwest::Method::GET,
            "/email/get_batch",
            serde_json::json!({ "Page": page, "Count": count }),
        )
        .await
    }

    pub async fn get_all_rows(&self) -> Response {
        reqwest::Client::new()
            .get(&format!("{}/email/get_all", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: serde_json::Value,
    ) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.address, path);

        client
            .request(method, &url)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
