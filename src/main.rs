use std::sync::Arc;

use dotenv::dotenv;
use nearby_restaurants::config::Config;
use nearby_restaurants::engine::{Engine, LocationSource};
use nearby_restaurants::error::Error;
use nearby_restaurants::external::PlacesClient;
use nearby_restaurants::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let places = Arc::new(PlacesClient::from_config(&config)?);
    let engine = Engine::from_config(&config, places);

    let (events, receiver) = async_channel::unbounded();
    tokio::spawn(LocationSource::new(engine.clone(), receiver).run());

    serve(engine, events, config.listen_addr).await
}
