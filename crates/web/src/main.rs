use database::{DatabaseConnectionInfo, PgDatabase};
use log::{error, warn};
use public_transport::memory::MemoryDatabase;
use web::{
    config::{Backend, WebConfig},
    start_web_server, WebState,
};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = WebConfig::from_env().expect("invalid configuration in env.");

    let result = match config.backend {
        Backend::Memory => {
            warn!("using the in-memory database, nothing will be persisted.");
            let state = WebState::new(MemoryDatabase::default(), config.anchor_scope);
            start_web_server(state, &config.bind_address).await
        }
        Backend::Postgres => {
            // database
            let database_connection_info = DatabaseConnectionInfo::from_env()
                .expect("expected database connection info in env.");
            let database = PgDatabase::connect(database_connection_info)
                .await
                .expect("could not connect to database.");

            // web server
            let state = WebState::new(database, config.anchor_scope);
            start_web_server(state, &config.bind_address).await
        }
    };

    if let Err(why) = result {
        error!("web server stopped: {why}");
    }
}
