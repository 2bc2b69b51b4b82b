mod actions;
mod cmd;
mod resolve;
mod runner;

use argp::FromArgs;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(FromArgs, PartialEq, Debug)]
/// Upload profiling data to flamegraph.com from CI.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Upload(cmd::upload::Args),
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    // stdout is reserved for workflow commands
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
        .init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let result = match args.command {
        SubCommand::Upload(c_args) => cmd::upload::run(c_args).await,
    };
    if let Err(e) = result {
        tracing::error!("{:?}", e);
        actions::set_failed(&format!("{e:#}"));
        std::process::exit(1);
    }
}
