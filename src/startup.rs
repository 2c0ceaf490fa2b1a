use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::Settings;
use crate::grpc::{self, GrpcServer};
use crate::routes::{
    create_email, delete_email, get_all_rows, get_email, get_email_batch, health_check,
    update_email,
};
use crate::store::{StoreError, SubscriberStore};

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Failed to initialize the subscriber store.")]
    Store(#[from] StoreError),
    #[error("Failed to bind the address.")]
    Bind(#[from] std::io::Error),
}

/// Both facades over one store. They are built together but stop independently.
pub struct Application {
    json_port: u16,
    grpc_port: u16,
    json_server: Server,
    grpc_server: GrpcServer,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        tracing::info!("Using database '{}'", config.get_db_path());
        let store =
            SubscriberStore::connect_lazy(config.get_db_options(), config.get_db_max_connections());

        // Fatal: no server starts without the emails table
        store.initialize().await?;

        let json_listener = TcpListener::bind(config.get_json_address())?;
        let json_port = json_listener.local_addr()?.port();
        let grpc_listener = tokio::net::TcpListener::bind(config.get_grpc_address()).await?;
        let grpc_port = grpc_listener.local_addr()?.port();

        let json_server = run(json_listener, store.clone())?;
        let grpc_server = grpc::run(grpc_listener, store)?;

        tracing::info!("JSON API server listening on {}", config.get_json_address());
        tracing::info!("gRPC API server listening on {}", config.get_grpc_address());

        Ok(Self {
            json_port,
            grpc_port,
            json_server,
            grpc_server,
        })
    }

    pub fn get_json_port(&self) -> u16 {
        self.json_port
    }

    pub fn get_grpc_port(&self) -> u16 {
        self.grpc_port
    }

    /// Runs both servers as sibling tasks and returns once both have stopped. One of them
    /// failing leaves the other one serving.
    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        let Application {
            json_server,
            grpc_server,
            ..
        } = self;

        let json_task = tokio::spawn(async move {
            tracing::info!("Starting JSON API server");
            let result = json_server.await;
            if let Err(err) = &result {
                tracing::error!("JSON API server error: {:?}", err);
            }
            result
        });
        let grpc_task = tokio::spawn(async move {
            tracing::info!("Starting gRPC API server");
            let result = grpc_server.await;
            if let Err(err) = &result {
                tracing::error!("gRPC API server error: {:?}", err);
            }
            result
        });

        let (json_result, grpc_result) = tokio::join!(json_task, grpc_task);

        json_result.map_err(join_error)??;
        grpc_result
            .map_err(join_error)?
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

fn join_error(err: tokio::task::JoinError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err)
}

pub fn run(listener: TcpListener, store: SubscriberStore) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/email/create", web::post().to(create_email))
            .route("/email/get", web::get().to(get_email))
            .route("/email/get_batch", web::get().to(get_email_batch))
            .route("/email/get_all", web::get().to(get_all_rows))
            .route("/email/update", web::put().to(update_email))
            .route("/email/delete", web::post().to(delete_email))
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
