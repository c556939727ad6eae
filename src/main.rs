use clap::Parser;
use colored::Colorize;

use linkscope::cli::{Cli, Commands};
use linkscope::config::{StaticConfig, get_config, init_config_from};
use linkscope::runtime::run_server;
use linkscope::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::GenerateConfig { output } if output == "-" => {
            print!("{}", StaticConfig::generate_sample_config());
            Ok(())
        }
        Commands::GenerateConfig { output } => {
            let sample = StaticConfig::default();
            if let Err(e) = sample.save_to_file(&output) {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            println!("{} {}", "Sample configuration written to".green(), output);
            Ok(())
        }
        Commands::Serve => {
            init_config_from(&cli.config);
            let config = get_config();
            // guard 必须存活到进程结束
            let _log_guard = init_logging(&config);

            run_server().await
        }
    }
}
