use database::{DatabaseConnectionInfo, MongoDatabase};
use web::{config::WebConfig, start_web_server, WebState};

#[tokio::main]
async fn main() {
    // a local .env is optional, the process environment wins
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // database
    let database_connection_info = DatabaseConnectionInfo::from_env()
        .expect("expected MONGO_URI in env.");
    let database = MongoDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");

    // web server
    let web_config = WebConfig::from_env().expect("expected PORT to be a port number.");
    let result = start_web_server(WebState::new(database.locations()), &web_config).await;

    database.shutdown().await;

    if let Err(why) = result {
        log::error!("web server failed: {}", why);
        std::process::exit(1);
    }
}
