//! config/service_config.rs
//! Configuración leída del entorno (.env cargado por `dotenv` en main).

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};

use super::pdf_config::PdfGlobalConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5022;
const DEFAULT_CHROME_DEBUG_PORT: u16 = 9222;
const DEFAULT_CHROME_STARTUP_WAIT_SECS: u64 = 3;
const DEFAULT_MAX_CONCURRENT: usize = 8;
const DEFAULT_PDF_TIMEOUT_SECS: u64 = 300;
const DEFAULT_PDF_STORE_DIR: &str = "./files/pdfs";

#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Ruta explícita al ejecutable; si es None se busca en PATH.
    pub executable_path: Option<PathBuf>,
    pub debug_port: u16,
    pub startup_wait: Duration,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            executable_path: None,
            debug_port: DEFAULT_CHROME_DEBUG_PORT,
            startup_wait: Duration::from_secs(DEFAULT_CHROME_STARTUP_WAIT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub port: u16,
    pub chrome: ChromeConfig,
    pub wkhtmltopdf_path: Option<PathBuf>,
    pub max_concurrent: usize,
    pub pdf_timeout: Duration,
    pub pdf_store_dir: PathBuf,
    pub pdf_defaults: PdfGlobalConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            chrome: ChromeConfig::default(),
            wkhtmltopdf_path: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            pdf_timeout: Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS),
            pdf_store_dir: PathBuf::from(DEFAULT_PDF_STORE_DIR),
            pdf_defaults: PdfGlobalConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Construye la configuración desde variables de entorno.
    /// Las variables ausentes toman el valor por defecto; las mal formadas son error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            chrome: ChromeConfig {
                executable_path: env::var_os("CHROME_PATH").map(PathBuf::from),
                debug_port: parse_var("CHROME_DEBUG_PORT")?
                    .unwrap_or(defaults.chrome.debug_port),
                startup_wait: parse_var("CHROME_STARTUP_WAIT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.chrome.startup_wait),
            },
            wkhtmltopdf_path: env::var_os("WKHTMLTOPDF_PATH").map(PathBuf::from),
            max_concurrent: parse_var("PDF_MAX_CONCURRENT")?.unwrap_or(defaults.max_concurrent),
            pdf_timeout: parse_var("PDF_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.pdf_timeout),
            pdf_store_dir: env::var_os("PDF_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.pdf_store_dir),
            pdf_defaults: defaults.pdf_defaults,
        })
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Valor inválido para {}: {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}
