use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use subsym::interfaces::cli::{subsym_output_heading, subsym_output_run_summary, Cli};
use subsym::interfaces::input::IndsodInput;
use subsym::interfaces::InputHandle;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    let output_path = cli.directory.join("OUTSOD");

    // Set up loggers
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S %Z)(utc)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let output_log_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .append(false)
        .build(&output_path)
        .expect("Unable to construct an output log `FileAppender`.");

    let output_log_config = match cli.debug {
        0 => {
            // Main output to OUTSOD
            // Warnings and errors to stdout
            Config::builder()
                .appender(Appender::builder().build("stdout", Box::new(stdout)))
                .appender(Appender::builder().build("output_ap", Box::new(output_log_appender)))
                .logger(
                    Logger::builder()
                        .appender("output_ap")
                        .additive(false)
                        .build("subsym-output", LevelFilter::Info),
                )
                .build(Root::builder().appender("stdout").build(LevelFilter::Warn))
                .expect("Unable to construct an output log `Config`.")
        }
        _ => {
            // Main output to OUTSOD and stdout
            // Debugs, warnings and errors to stdout
            Config::builder()
                .appender(Appender::builder().build("stdout", Box::new(stdout)))
                .appender(Appender::builder().build("output_ap", Box::new(output_log_appender)))
                .logger(
                    Logger::builder()
                        .appender("output_ap")
                        .additive(true)
                        .build("subsym-output", LevelFilter::Info),
                )
                .build(Root::builder().appender("stdout").build(LevelFilter::Debug))
                .expect("Unable to construct an output log `Config`.")
        }
    };
    log4rs::init_config(output_log_config).expect("Unable to initialise logging.");

    subsym_output_heading();
    subsym_output_run_summary(&cli);

    let run = IndsodInput::from_directory(&cli.directory).and_then(|input| input.handle());
    if let Err(err) = run {
        log::error!("SubSym terminated with an error: {err:#}");
        std::process::exit(1);
    }
}
