use clap::Parser;
use sheetsync::app::{handle_fatal_error, init_logging, AppConfig};
use sheetsync::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app = AppConfig::new(cli.verbose).with_json_output(cli.command.wants_json());
    init_logging(&app);

    if let Err(e) = sheetsync::cli::run(cli.command, &app).await {
        handle_fatal_error(e, app.verbose);
    }
}
