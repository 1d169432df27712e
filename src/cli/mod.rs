pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "Compose pages from concurrently fetched HTML fragments", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/tributary/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch fragments with all their dependencies and report the result
    Compose {
        /// URLs of the root fragments
        #[arg(required = true)]
        urls: Vec<String>,

        /// Initial metadata as key=value; values are read as JSON if possible
        #[arg(short, long = "meta", value_parser = parse_key_val)]
        meta: Vec<(String, String)>,
    },
    /// Print the fingerprint of a fetch definition
    Hash {
        /// URL of the fragment
        url: String,

        /// Request header as "Name: value", may be repeated
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no `=` found in {s:?}"))?;
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid header: no `:` found in {s:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compose() {
        let cli = Cli::try_parse_from([
            "tributary",
            "compose",
            "http://a.local/layout",
            "http://b.local/content",
            "--meta",
            "lang=de",
            "-m",
            "page=2",
        ])
        .unwrap();

        match cli.command {
            Commands::Compose { urls, meta } => {
                assert_eq!(urls.len(), 2);
                assert_eq!(meta, vec![("lang".into(), "de".into()), ("page".into(), "2".into())]);
            }
            _ => panic!("expected compose"),
        }
    }

    #[test]
    fn test_compose_requires_url() {
        assert!(Cli::try_parse_from(["tributary", "compose"]).is_err());
    }

    #[test]
    fn test_parse_hash_with_headers() {
        let cli = Cli::try_parse_from([
            "tributary",
            "--config",
            "/tmp/tributary.toml",
            "hash",
            "http://a.local/",
            "-H",
            "Accept-Language: de",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tributary.toml")));
        match cli.command {
            Commands::Hash { url, headers } => {
                assert_eq!(url, "http://a.local/");
                assert_eq!(headers, vec![("Accept-Language".into(), "de".into())]);
            }
            _ => panic!("expected hash"),
        }
    }

    #[test]
    fn test_parse_key_val_errors() {
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
        assert_eq!(parse_key_val("a=b=c").unwrap(), ("a".into(), "b=c".into()));
    }
}
