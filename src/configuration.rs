use std::{env, fs, io::ErrorKind, ops::Deref, sync::Arc, time::Duration};

use anyhow::Context;
use url::Url;

use crate::{error::Error, provider::HTTP};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub http: HTTP,
}

impl State {
    pub fn new(config: Config) -> Result<State, Error> {
        let http = HTTP::new(config.clone())?;
        Ok(Self { config, http })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub kraken_api_url: Url,
    pub ledger_path: String,
    pub page_size: usize,
    pub max_pages: usize,
    pub page_delay: Duration,
    pub timeout: u64,
    pub json_limit: usize,
}

impl Config {
    pub fn get_ledger_url(&self) -> Result<Url, Error> {
        let url = self.kraken_api_url.join(&self.ledger_path)?;
        Ok(url)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(kraken_api_url: &str) -> Config {
        Config {
            server_host: String::from("127.0.0.1"),
            port: 3000,
            allowed_origins: vec![String::from("*")],
            kraken_api_url: Url::parse(kraken_api_url)
                .expect("test url must parse"),
            ledger_path: String::from("/0/private/Ledgers"),
            page_size: 50,
            max_pages: 100,
            page_delay: Duration::from_millis(4250),
            timeout: 2,
            json_limit: 4096,
        }
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;
    let allowed_origins = env::var("ALLOWED_ORIGINS")?
        .split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect::<Vec<String>>();

    let kraken_api_url = Url::parse(&env::var("KRAKEN_API_URL")?)?;
    let ledger_path = env::var("LEDGER_PATH")?;

    if !ledger_path.starts_with('/') {
        return Err(Error::ConfigurationError(format!(
            "LEDGER_PATH must be absolute, got {}",
            ledger_path
        )));
    }

    let page_size: usize = env::var("PAGE_SIZE")?.parse()?;
    let max_pages: usize = env::var("MAX_PAGES")?.parse()?;

    if page_size == 0 || max_pages == 0 {
        return Err(Error::ConfigurationError(String::from(
            "PAGE_SIZE and MAX_PAGES must be greater than zero",
        )));
    }

    let page_delay_ms: u64 = env::var("PAGE_DELAY_MS")?.parse()?;
    let timeout: u64 = env::var("TIMEOUT")?.parse()?;
    let json_limit: usize = env::var("JSON_LIMIT")?.parse()?;

    let config = Config {
        server_host,
        port,
        allowed_origins,
        kraken_api_url,
        ledger_path,
        page_size,
        max_pages,
        page_delay: Duration::from_millis(page_delay_ms),
        timeout,
        json_limit,
    };

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let rollover_config_file: &str = "rollover.conf";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);
    let rollover_config_path =
        format!("{}/{}", directory, rollover_config_file);

    match fs::read_to_string(&path) {
        Ok(config_string) => parse_config_string(config_string),
        Err(e) if e.kind() == ErrorKind::NotFound => {},
        Err(e) => return Err(Error::Io(e)),
    };

    let rollover_config_string = fs::read_to_string(&rollover_config_path)
        .with_context(|| format!("unable to read {}", rollover_config_path))?;
    parse_config_string(rollover_config_string);

    Ok(())
}

fn parse_config_string(config: String) {
    for (key, value) in parse_pairs(&config) {
        if env::var_os(key).is_none() {
            env::set_var(key, value);
        }
    }
}

fn parse_pairs(config: &str) -> Vec<(&str, &str)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let config = "# upstream\nKRAKEN_API_URL=https://api.kraken.com\n\nPAGE_SIZE = 50\nbroken line\nALLOWED_ORIGINS=a=b\n";
        let pairs = parse_pairs(config);

        assert_eq!(
            pairs,
            vec![
                ("KRAKEN_API_URL", "https://api.kraken.com"),
                ("PAGE_SIZE", "50"),
                ("ALLOWED_ORIGINS", "a=b"),
            ]
        );
    }

    #[test]
    fn test_ledger_url() {
        let config = Config::for_tests("https://api.kraken.com");

        assert_eq!(
            config.get_ledger_url().unwrap().as_str(),
            "https://api.kraken.com/0/private/Ledgers"
        );
    }
}
