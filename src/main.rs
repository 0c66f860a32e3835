use actix_web::{middleware, web, App, HttpServer};
use setu::classifier::Classifier;
use setu::server::{self, routes, AppState};
use setu::settings::Settings;
use setu::torch::TorchModel;
use setu::util::init_tracing;
use std::{env, process};
use tracing::info;

const USAGE: &str = "usage: ./setu [config file]";

fn get_args() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        println!("{USAGE}");
        process::exit(1);
    }

    args.get(1).cloned()
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_file = get_args();
    let settings = Settings::load(config_file.as_deref())?;

    // The model must be fully loaded and checked before the socket is bound
    let device = settings.device.resolve();
    let model = TorchModel::load(&settings.model_path, device)?;
    let classifier = Classifier::new(Box::new(model), settings.labels.clone())?;
    info!(?device, labels = ?classifier.labels(), "model ready");

    let state = web::Data::new(AppState::new(classifier, settings.max_upload_bytes));

    info!("listening on http://{}:{}", settings.host, settings.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(server::cors())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
