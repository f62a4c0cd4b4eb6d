use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use pico_feed::{Feed, SecretKey};
use pico_server::{ServerConfig, SiloServer, FEED_CONTENT_TYPE};
use pico_silo::Silo;
use pico_store::MemoryKv;
use pico_wire::{pack, PackOptions};

use crate::cli::{Cli, Command, PubArgs, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Pub(args) => cmd_pub(args, &ureq::agent()),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn cmd_pub(args: PubArgs, agent: &ureq::Agent) -> anyhow::Result<()> {
    let html = read_input(&args.input)?;
    let secret = match &args.secret {
        Some(hex) => SecretKey::from_hex(hex).context("invalid --secret")?,
        None => {
            let sk = SecretKey::generate();
            eprintln!(
                "generated secret (keep it to publish updates): {}",
                sk.to_hex()
            );
            sk
        }
    };
    let feed = pack(
        &html,
        PackOptions {
            secret: Some(&secret),
            ..Default::default()
        },
    )?;
    publish(&feed, args.output.as_deref(), &secret.public_key().to_hex(), agent)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("reading stdin")?;
        Ok(html)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn publish(
    feed: &Feed,
    output: Option<&str>,
    key_hex: &str,
    agent: &ureq::Agent,
) -> anyhow::Result<()> {
    let bytes = feed.encode();
    match output {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            let url = format!("{}/{key_hex}", url.trim_end_matches('/'));
            match agent
                .post(&url)
                .set("Content-Type", FEED_CONTENT_TYPE)
                .send_bytes(&bytes)
            {
                Ok(response) => {
                    println!("published to {url} ({})", response.status());
                    Ok(())
                }
                Err(ureq::Error::Status(code, response)) => {
                    let body = response.into_string().unwrap_or_default();
                    bail!("silo refused ({code}): {body}")
                }
                Err(e) => Err(e).context("posting feed"),
            }
        }
        Some(path) if path.ends_with(".pwa") => {
            std::fs::write(path, &bytes).with_context(|| format!("writing {path}"))?;
            println!("wrote {} bytes to {path}", bytes.len());
            Ok(())
        }
        Some(other) => bail!("output must be an http(s) URL or a .pwa file, got {other:?}"),
        None => {
            println!("{}", hex::encode(&bytes));
            Ok(())
        }
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    // Sites live in memory for now; persistent backends slot in behind the
    // same KvStore trait.
    let silo = Arc::new(Silo::new(Arc::new(MemoryKv::new())));
    let server = SiloServer::new(config, silo);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}
