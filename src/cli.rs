use clap::Parser;

/// Command-line interface for the sample JSON server
#[derive(Debug, Parser)]
#[command(name = "autojson-sample")]
#[command(about = "Serve sample handlers as JSON endpoints", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "AUTOJSON_ADDR", default_value = "0.0.0.0:5000")]
    pub addr: String,

    /// Log level (overrides AUTOJSON_LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,
}
