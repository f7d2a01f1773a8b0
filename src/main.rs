use std::env;
use std::process;

use clap::Parser;
use keylightctl::{Args, Config, ElgatoError};
use log::debug;

fn init_logging(config: &Config) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(config.log_level());
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn exit_with(err: ElgatoError) -> ! {
    match err.root() {
        ElgatoError::NoLights => eprintln!("keylightctl: no lights found on the network"),
        _ => eprintln!("keylightctl: {}", err),
    }
    process::exit(err.exit_code());
}

#[tokio::main]
async fn main() {
    let config = match Config::from_args(Args::parse()) {
        Ok(config) => config,
        Err(err) => exit_with(err),
    };
    init_logging(&config);
    debug!("{:?}", config);

    if let Err(err) = keylightctl::run(&config).await {
        exit_with(err);
    }
}
