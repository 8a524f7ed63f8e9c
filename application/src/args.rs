//! [`Args`] definitions.

use clap::Parser;

/// GraphQL server of the listings catalog.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    ///
    /// Missing file is fine: defaults and `CONF.*` environment variables are
    /// used then.
    #[arg(short, long, env = "CONF_FILE", default_value = "config.toml")]
    pub config: String,
}

impl Args {
    /// Parses command line arguments and the environment.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}
