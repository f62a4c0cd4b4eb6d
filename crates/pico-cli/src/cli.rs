use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pico",
    about = "Publish and serve signed single-page web apps",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign an HTML document and publish it
    Pub(PubArgs),
    /// Run a silo server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct PubArgs {
    /// HTML file to publish, or "-" for stdin
    pub input: PathBuf,

    /// Hex-encoded signing secret; a fresh one is generated when absent
    #[arg(short, long, env = "PICO_SECRET")]
    pub secret: Option<String>,

    /// Destination: an http(s) silo URL or a .pwa file. Hex on stdout when absent
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pub_with_options() {
        let cli = Cli::try_parse_from([
            "pico", "pub", "site.html", "--secret", "ab", "--output", "http://localhost:5000",
        ])
        .unwrap();
        let Command::Pub(args) = cli.command else {
            panic!("expected pub");
        };
        assert_eq!(args.input, PathBuf::from("site.html"));
        assert_eq!(args.secret.as_deref(), Some("ab"));
        assert_eq!(args.output.as_deref(), Some("http://localhost:5000"));
    }

    #[test]
    fn parses_serve_with_bind() {
        let cli = Cli::try_parse_from(["pico", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
        assert!(args.config.is_none());
    }
}
