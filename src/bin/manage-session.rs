use std::env;

use aws_sdk_dynamodb::Client;
use ddb_session_manager::api::manage_session;
use ddb_session_manager::store::SessionStore;
use ddb_session_manager::utils::{setup_sdk_config, setup_tracing};
use lambda_http::{service_fn, Request};
use tracing::{info, instrument};

type E = Box<dyn std::error::Error + Sync + Send + 'static>;

#[instrument]
#[tokio::main]
async fn main() -> Result<(), E> {
    setup_tracing();

    let config = setup_sdk_config().await;
    let client = Client::new(&config);
    let store = SessionStore::new(
        &client,
        env::var("TABLE_NAME").expect("TABLE_NAME must be set"),
    );
    lambda_http::run(service_fn(|event: Request| manage_session(&store, event))).await?;
    info!("execution started");

    Ok(())
}
