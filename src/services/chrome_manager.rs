//! services/chrome_manager.rs
//! Proceso Chrome headless con depuración remota, compartido por todas las peticiones.

use std::{path::PathBuf, process::Stdio, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::{
    process::{Child, Command},
    sync::Mutex,
    time::{sleep, timeout},
};

use crate::{config::service_config::ChromeConfig, models::print_model::ChromeStatus};

/// Tiempo que se espera a que Chrome termine antes de matarlo.
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Nombres que se prueban en PATH si no hay ruta configurada.
const CHROME_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

const CHROME_FLAGS: &[&str] = &[
    "--headless=new",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-setuid-sandbox",
    "--disable-background-networking",
    "--disable-default-apps",
    "--disable-extensions",
    "--disable-sync",
    "--disable-translate",
    "--metrics-recording-only",
    "--no-first-run",
    "--safebrowsing-disable-auto-update",
    "--disable-client-side-phishing-detection",
    "--disable-component-update",
    "--disable-domain-reliability",
    "--disable-features=TranslateUI",
    "--hide-scrollbars",
    "--mute-audio",
];

#[derive(Clone)]
pub struct ChromeManager {
    config: Arc<ChromeConfig>,
    process: Arc<Mutex<Option<Child>>>,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

impl ChromeManager {
    pub fn new(config: ChromeConfig) -> Self {
        Self {
            config: Arc::new(config),
            process: Arc::new(Mutex::new(None)),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn port(&self) -> u16 {
        self.config.debug_port
    }

    /// Argumentos completos de la línea de comandos.
    pub fn command_args(&self) -> Vec<String> {
        let mut args: Vec<String> = CHROME_FLAGS.iter().map(|s| s.to_string()).collect();
        // tras --disable-gpu
        args.insert(2, format!("--remote-debugging-port={}", self.config.debug_port));
        args.push("about:blank".to_string());
        args
    }

    /// URL HTTP del endpoint de depuración.
    pub fn connection_url(&self) -> String {
        format!("http://localhost:{}", self.port())
    }

    /// Arranca Chrome si no está corriendo.
    pub async fn start(&self) -> Result<()> {
        let mut guard = self.process.lock().await;
        if let Some(child) = guard.as_mut() {
            if matches!(child.try_wait(), Ok(None)) {
                log::info!("Chrome ya está corriendo");
                return Ok(());
            }
        }

        let executable = self.executable_path()?;
        log::info!("Arrancando Chrome: {:?}", executable);

        let mut child = Command::new(&executable)
            .args(self.command_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("No se pudo lanzar Chrome en {:?}", executable))?;

        sleep(self.config.startup_wait).await;

        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                *guard = None;
                log::error!("Chrome terminó al arrancar: {}", status);
                return Err(anyhow!("Chrome process failed to start ({})", status));
            }
            Err(e) => {
                *guard = None;
                return Err(anyhow!(e).context("No se pudo consultar el proceso Chrome"));
            }
        }

        log::info!("Chrome arrancado en puerto {}", self.config.debug_port);
        *guard = Some(child);
        Ok(())
    }

    /// Termina Chrome; si no sale en el periodo de gracia, lo mata.
    pub async fn stop(&self) -> Result<()> {
        let mut guard = self.process.lock().await;
        let Some(mut child) = guard.take() else {
            return Ok(());
        };

        log::info!("Deteniendo proceso Chrome");
        if let Err(e) = terminate(&mut child) {
            log::warn!("No se pudo enviar señal a Chrome: {:?}", e);
        }
        match timeout(STOP_GRACE_PERIOD, child.wait()).await {
            Ok(res) => {
                res.context("Error esperando a que Chrome termine")?;
            }
            Err(_) => {
                log::warn!("Chrome no terminó a tiempo, forzando kill");
                child.kill().await.context("No se pudo matar Chrome")?;
            }
        }
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        let mut guard = self.process.lock().await;
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Garantiza que Chrome esté corriendo (lo arranca si hace falta).
    pub async fn ensure_running(&self) -> Result<()> {
        if !self.is_running().await {
            self.start().await?;
        }
        Ok(())
    }

    pub async fn status(&self) -> ChromeStatus {
        let mut guard = self.process.lock().await;
        match guard.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => ChromeStatus::Running { port: self.port() },
            Some(Ok(Some(_))) | None => ChromeStatus::Stopped,
            Some(Err(e)) => {
                log::warn!("No se pudo consultar el estado de Chrome: {}", e);
                ChromeStatus::Error
            }
        }
    }

    /// URL websocket del navegador, leída de /json/version.
    pub async fn websocket_url(&self) -> Result<String> {
        let url = format!("{}/json/version", self.connection_url());
        let info: VersionInfo = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("No se pudo contactar {}", url))?
            .error_for_status()?
            .json()
            .await
            .context("Respuesta inválida de /json/version")?;
        Ok(info.web_socket_debugger_url)
    }

    fn executable_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.executable_path {
            return Ok(path.clone());
        }
        CHROME_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .context("No se encontró Chrome/Chromium en el sistema")
    }
}

/// Pide a Chrome que termine (SIGTERM).
#[cfg(unix)]
fn terminate(child: &mut Child) -> Result<()> {
    use nix::{
        sys::signal::{kill, Signal},
        unistd::Pid,
    };

    // sin pid: el proceso ya terminó
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid).context("pid fuera de rango")?;
    kill(Pid::from_raw(pid), Signal::SIGTERM).context("kill(SIGTERM) falló")?;
    Ok(())
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> Result<()> {
    child.start_kill().context("No se pudo terminar Chrome")
}
