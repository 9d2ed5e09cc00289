use anyhow::{Context, Result};
use clap::{crate_version, load_yaml, App, AppSettings, ArgMatches};
use jsonschema_fake::{Config, Generator};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter, Read, Write};
use std::str::FromStr;

const LOG_ENV_VAR: &str = "JSONSCHEMA_FAKE_LOG";

fn main() -> Result<()> {
    let cli_yaml = load_yaml!("cli.yaml");
    let matches = App::from(cli_yaml)
        .setting(AppSettings::ColoredHelp)
        .version(crate_version!())
        .get_matches();

    init_tracing(matches.occurrences_of("verbose"))?;

    // Parse every flag first, so that we can give the user an error before
    // potentially blocking as we read in the schema.

    let mut rng = match parse_arg::<u64>(&matches, "seed")? {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_entropy(),
    };

    let num_values = parse_arg::<u64>(&matches, "num-values")?.unwrap_or(1);
    let generator = Generator::new(load_config(&matches)?).context("Invalid configuration")?;
    tracing::debug!(config = ?generator.config(), "configured generator");

    let reader = BufReader::new(match matches.value_of("input").unwrap_or("-") {
        "-" => Box::new(stdin()) as Box<dyn Read>,
        file => Box::new(
            File::open(file).with_context(|| format!("Failed to open schema: {}", file))?,
        ) as Box<dyn Read>,
    });

    let schema: Value = serde_json::from_reader(reader).context("Failed to parse schema")?;
    let schema = generator.compile(&schema).context("Unsupported schema")?;

    let stdout = stdout();
    let mut out = BufWriter::new(stdout.lock());

    for _ in 0..num_values {
        let value = schema.fake(&mut rng);

        if matches.is_present("compact") {
            serde_json::to_writer(&mut out, &value)?;
        } else {
            // Four spaces, matching JSON.stringify(value, null, 4).
            let mut ser =
                serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
            value.serialize(&mut ser)?;
        }

        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

fn init_tracing(verbosity: u64) -> Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to initialize logging: {}", err))
}

// Starts from the --config file, if any, then applies individual flags.
fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open config: {}", path))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config: {}", path))?
        }
        None => Config::default(),
    };

    if let Some(p) = parse_arg(matches, "optional-probability")? {
        config.optional_probability = p;
    }

    if let Some(n) = parse_arg(matches, "min-items")? {
        config.min_items = n;
    }

    if let Some(n) = parse_arg(matches, "max-items")? {
        config.max_items = n;
    }

    if let Some(n) = parse_arg(matches, "min-length")? {
        config.min_length = n;
    }

    if let Some(n) = parse_arg(matches, "max-length")? {
        config.max_length = n;
    }

    if let Some(x) = parse_arg(matches, "min-number")? {
        config.min_number = x;
    }

    if let Some(x) = parse_arg(matches, "max-number")? {
        config.max_number = x;
    }

    Ok(config)
}

fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .value_of(name)
        .map(|value| {
            value
                .parse()
                .with_context(|| format!("Failed to parse {}: {}", name, value))
        })
        .transpose()
}
