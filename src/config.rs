use config::{Config, ConfigError, File};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    /// Path of the SQLite database file.
    pub db: String,
    pub bind_json: String,
    pub bind_grpc: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub db_max_connections: u32,
}

impl Settings {
    pub fn get_json_address(&self) -> String {
        normalize_bind_address(&self.bind_json)
    }

    pub fn get_grpc_address(&self) -> String {
        normalize_bind_address(&self.bind_grpc)
    }

    pub fn get_db_options(&self) -> SqliteConnectOptions {
        let mut db_options = SqliteConnectOptions::new()
            .filename(&self.db)
            .create_if_missing(true);

        db_options.log_statements(tracing::log::LevelFilter::Trace);

        db_options
    }

    pub fn get_db_path(&self) -> String {
        self.db.clone()
    }

    pub fn get_db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn set_db_path(&mut self, db: String) {
        self.db = db
    }

    pub fn set_bind_json(&mut self, bind: String) {
        self.bind_json = bind
    }

    pub fn set_bind_grpc(&mut self, bind: String) {
        self.bind_grpc = bind
    }
}

/// `:8080` binds every interface, the same as `0.0.0.0:8080`.
fn normalize_bind_address(bind: &str) -> String {
    if bind.starts_with(':') {
        format!("0.0.0.0{}", bind)
    } else {
        bind.to_string()
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| ConfigError::Foreign(Box::new(err)))?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("MAILINGLIST_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // Defaults first, then the optional files, then the environment: the last source wins
    let settings = Config::builder()
        .set_default("db", "list.db")?
        .set_default("bind_json", ":8080")?
        .set_default("bind_grpc", ":8081")?
        .set_default("db_max_connections", 10)?
        .add_source(File::from(config_base_filepath).required(false))
        .add_source(File::from(config_env_filepath).required(false))
        // E.g MAILINGLIST_DB sets Settings.db and MAILINGLIST_BIND_JSON sets Settings.bind_json
        .add_source(config::Environment::with_prefix("mailinglist"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
