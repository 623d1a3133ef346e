//! Command-line arguments

use clap::{ArgAction, Args, Parser, Subcommand};
use sqmreader_core::protocol::{
    ConnectionConfig, DEFAULT_BAUD_RATE, DEFAULT_SETTLE_DELAY_MS, DEFAULT_TIMEOUT_MS,
};

/// Take on-demand lux and SQM readings from a serial light sensor
#[derive(Parser, Debug)]
#[command(name = "sqmreader", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log filter directive, overrides -v and RUST_LOG (e.g. "sqmreader_core=debug")
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Serial link settings. The defaults match the sensor firmware.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Baud rate
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,

    /// Read/write timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    pub timeout_ms: u64,

    /// Pause after opening the port, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY_MS, global = true)]
    pub settle_ms: u64,
}

impl LinkArgs {
    /// Connection configuration for these settings
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            baud_rate: self.baud,
            timeout_ms: self.timeout_ms,
            settle_delay_ms: self.settle_ms,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List available serial ports
    Ports {
        /// Include USB vendor/product details
        #[arg(long)]
        details: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Connect, take one reading and exit
    Read {
        /// Serial port (defaults to the first port found)
        #[arg(short, long)]
        port: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: refresh, connect, read on demand
    Console {
        /// Port to connect to on start
        #[arg(short, long)]
        port: Option<String>,
    },
}
