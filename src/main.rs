mod app;
mod ui;
mod runtime;

use adw::Application;
use adw::prelude::*;
use whatzapp::api::client::GatewayClient;
use whatzapp::config::Settings;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    if settings.gateway.embedded {
        if let Err(e) = crate::app::start_embedded_gateway(&settings) {
            log::error!("cannot start gateway: {e}");
            std::process::exit(2);
        }
    }
    let client = match GatewayClient::new(&settings.gateway_url()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let app = Application::builder()
        .application_id("com.example.Whatzapp")
        .build();
    app.connect_activate(move |app| {
        crate::app::build_ui(app, client.clone());
    });
    app.run();
}
