mod handlers;

use std::net::SocketAddr;

use async_channel::Sender;
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::engine::{Engine, LocationEvent};
use crate::error::{config_error, Error};
use crate::server::handlers::{location, restaurants};

type Events = Sender<LocationEvent>;

pub fn router(engine: Engine, events: Events) -> Router {
    Router::new()
        .route("/state", get(restaurants::state))
        .route("/restaurants", get(restaurants::list))
        .route("/search", post(restaurants::search))
        .route("/location/authorization", post(location::authorization))
        .route("/location/fixes", post(location::fixes))
        .route("/location/failure", post(location::failure))
        .route("/location/error/acknowledge", post(location::acknowledge_error))
        .layer(Extension(engine))
        .layer(Extension(events))
}

pub async fn serve(engine: Engine, events: Events, addr: SocketAddr) -> Result<(), Error> {
    let app = router(engine, events);

    tracing::info!("listening on {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(|_| config_error("cannot bind LISTEN_ADDR"))?
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!(%err, "server stopped");
            crate::error::unexpected_error()
        })
}
