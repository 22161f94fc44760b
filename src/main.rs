use crate::{
    configuration::Configuration, configuration_handler::ConfigurationHandler, http::create_app,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod backend;
mod clock;
mod configuration;
mod configuration_handler;
mod controller;
mod cookie;
mod http;
mod local_cookies;
mod persistence;
mod render;
#[cfg(test)]
mod testutils;
mod types;
mod validation;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("#######################");
    println!("# Dental Appointments #");
    println!("#######################");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, "Failed to bind {address}");
            return;
        }
    };
    info!(
        %address,
        cookie = %configuration.cookie_name(),
        "Serving appointment form"
    );

    let app = create_app(configuration);
    if let Err(err) = axum::serve(listener, app).await {
        error!(?err, "Server stopped");
    }
}
