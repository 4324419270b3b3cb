use std::{env, path::PathBuf, sync::Arc};

use atelier_platform::JsonFileKeyValueStore;
use atelier_rest::{ApiClient, ApiClientConfig};

mod logging;

#[tokio::main]
async fn main() {
    logging::init();

    let config = match ApiClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Bad configuration: {err}");
            eprintln!("Set ATELIER_API_URL to the backend base URL.");
            std::process::exit(1);
        }
    };

    let store_path = env::var("ATELIER_SESSION_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./.atelier-session.json"));
    let store = Arc::new(JsonFileKeyValueStore::new(store_path));

    let client = match ApiClient::new(config, store) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to build API client: {err}");
            std::process::exit(1);
        }
    };

    if !client.is_authenticated() {
        println!("No stored session. Log in through the admin UI first.");
        return;
    }

    match client.check_auth().await {
        Some(user) => println!("Session is valid. /user replied: {user}"),
        None => println!("Stored session was rejected or the backend is unreachable."),
    }
}
