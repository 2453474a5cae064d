//! Mini LRU - A fixed-capacity, thread-safe LRU cache
//!
//! Line driver: reads commands from stdin and prints one result per line.
//! Logs go to stderr.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_lru::command::Command;
use mini_lru::{Config, LruCache};

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!("Configuration loaded: capacity={}", config.capacity);

    let cache: LruCache<String, String> = LruCache::new(config.capacity);

    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => execute(&cache, command, &mut out)?,
            Err(err) => warn!("Skipping line {}: {}", index + 1, err),
        }
    }

    let stats = cache.stats();
    info!(
        "Input exhausted: entries={}, hits={}, misses={}, evictions={}, hit_rate={:.2}",
        stats.total_entries,
        stats.hits,
        stats.misses,
        stats.evictions,
        stats.hit_rate()
    );

    Ok(())
}

/// Runs one command against the cache and writes its result line.
fn execute(
    cache: &LruCache<String, String>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Set { key, value } => {
            let existed = cache.set(key, value);
            writeln!(out, "{}", if existed { "updated" } else { "inserted" })?;
        }
        Command::Get { key } => match cache.get(key.as_str()) {
            Some(value) => writeln!(out, "{}", value)?,
            None => writeln!(out, "(nil)")?,
        },
        Command::Clear => {
            cache.clear();
            writeln!(out, "ok")?;
        }
        Command::Keys => {
            writeln!(out, "{}", cache.keys().join(" "))?;
        }
        Command::Stats => {
            let json =
                serde_json::to_string(&cache.stats()).context("failed to encode stats")?;
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(cache: &LruCache<String, String>, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            let command: Command = line.parse().unwrap();
            execute(cache, command, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_execute_session() {
        let cache = LruCache::new(2);
        let output = run(
            &cache,
            &[
                "set a 1", "set b 2", "get a", "set c 3", "get b", "keys", "set c 33", "clear",
                "get a",
            ],
        );

        assert_eq!(
            output,
            "inserted\ninserted\n1\ninserted\n(nil)\nc a\nupdated\nok\n(nil)\n"
        );
    }

    #[test]
    fn test_execute_stats_is_json() {
        let cache = LruCache::new(2);
        let output = run(&cache, &["set a 1", "get a", "get z", "stats"]);

        let last = output.lines().last().unwrap();
        let json: serde_json::Value = serde_json::from_str(last).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["total_entries"], 1);
    }
}
