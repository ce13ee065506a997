use anyhow::{bail, Context, Result};
use bicimad::{Config, HttpTransport, Ingestor, Resolver};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) arguments + config ───────────────────────────────────────
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("Usage: {} <MONTH> <YEAR> [CONFIG_YAML]", args[0]);
    }
    let month: i64 = args[1]
        .parse()
        .with_context(|| format!("month {:?} is not a number", args[1]))?;
    let year: i64 = args[2]
        .parse()
        .with_context(|| format!("year {:?} is not a number", args[2]))?;
    let config = match args.get(3) {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };

    // ─── 3) fetch, parse, clean ──────────────────────────────────────
    let resolver = Resolver::with_transport(HttpTransport::new(), config);
    let mut ingestor = Ingestor::with_resolver(resolver);
    let data = ingestor
        .get_data(month, year)
        .with_context(|| format!("loading trips for {}/{}", month, year))?;
    info!(rows = data.num_rows(), "ready");

    // ─── 4) report ───────────────────────────────────────────────────
    let summary = ingestor.resume();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!(
        "{}",
        arrow::util::pretty::pretty_format_batches(&[data.head(10)])
            .context("formatting preview")?
    );
    Ok(())
}
