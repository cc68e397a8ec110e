use crate::{
    config::{pdf_config::PdfGlobalConfig, service_config::ServiceConfig},
    models::{
        pdf_model::{GeneratedPdf, PdfMargins, PdfOrientation, PdfPagePreset, PdfRequest},
        print_format_model::{PdfBackend, PrintFormatConfig},
    },
    services::{
        chrome_manager::ChromeManager,
        units::{convert_uom, Unit},
    },
};
use anyhow::{anyhow, Context, Result};
use chromiumoxide::{
    cdp::browser_protocol::{emulation::SetEmulatedMediaParams, page::PrintToPdfParams},
    Browser,
};
use futures_util::StreamExt;
use regex::Regex;
use serde::Serialize;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, OnceLock},
    time::{Duration, Instant},
};
use tokio::{
    process::Command,
    sync::{Semaphore, SemaphorePermit},
    time::timeout,
};
use uuid::Uuid;

/// Prefijo de carpeta temporal
const TEMP_DIR_PREFIX: &str = "print_backend_";
/// Tiempo máximo esperando turno en el semáforo
const PERMIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct PdfService {
    semaphore: Arc<Semaphore>,
    temp_dir: Arc<PathBuf>,
    wkhtmltopdf_path: Option<Arc<PathBuf>>,
    chrome: ChromeManager,
    defaults: Arc<PdfGlobalConfig>,
    generation_timeout: Duration,
    store_dir: Arc<PathBuf>,
}

/// Opciones de impresión de Chrome, en milímetros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromePdfOptions {
    /// Preset de página; None cuando se usan width/height.
    pub format: Option<PdfPagePreset>,
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub print_background: bool,
    pub scale: f64,
    pub display_header_footer: bool,
    pub landscape: bool,
    pub page_ranges: String,
    pub margins: PdfMargins,
    pub prefer_css_page_size: bool,
}

impl ChromePdfOptions {
    /// Parámetros CDP (Chrome trabaja en pulgadas).
    pub fn to_print_params(&self) -> PrintToPdfParams {
        let (width, height) = match (self.format, self.width_mm, self.height_mm) {
            (Some(preset), _, _) => preset.dimensions_mm().unwrap_or((210.0, 297.0)),
            (None, Some(w), Some(h)) => (w, h),
            _ => (210.0, 297.0),
        };
        let inches = |mm: f64| convert_uom(mm, Unit::Mm, Unit::In);

        PrintToPdfParams {
            landscape: Some(self.landscape),
            display_header_footer: Some(self.display_header_footer),
            print_background: Some(self.print_background),
            scale: Some(self.scale),
            paper_width: Some(inches(width)),
            paper_height: Some(inches(height)),
            margin_top: Some(inches(self.margins.top)),
            margin_bottom: Some(inches(self.margins.bottom)),
            margin_left: Some(inches(self.margins.left)),
            margin_right: Some(inches(self.margins.right)),
            page_ranges: if self.page_ranges.is_empty() {
                None
            } else {
                Some(self.page_ranges.clone())
            },
            header_template: Some(String::new()),
            footer_template: Some(String::new()),
            prefer_css_page_size: Some(self.prefer_css_page_size),
            ..Default::default()
        }
    }
}

/// Traduce una petición a las opciones de Chrome.
pub fn map_chrome_options(req: &PdfRequest, defaults: &PdfGlobalConfig) -> ChromePdfOptions {
    let preset = req.page_size_preset.unwrap_or(defaults.default_page_preset);
    let orientation = req.orientation.unwrap_or(defaults.default_orientation);

    let (format, width_mm, height_mm) = if preset == PdfPagePreset::Custom {
        let custom = req.custom_page_size;
        (
            None,
            Some(custom.map(|s| s.width).unwrap_or(defaults.default_page_width)),
            Some(custom.map(|s| s.height).unwrap_or(defaults.default_page_height)),
        )
    } else {
        (Some(preset), None, None)
    };

    ChromePdfOptions {
        format,
        width_mm,
        height_mm,
        print_background: true,
        scale: req.scale.unwrap_or(defaults.default_scale),
        display_header_footer: false,
        landscape: orientation == PdfOrientation::Landscape,
        page_ranges: req.page_ranges.clone().unwrap_or_default(),
        margins: req.margins.unwrap_or(defaults.default_margins),
        prefer_css_page_size: false,
    }
}

/// Elige backend sin efectos: el formato con Puppeteer manda; si no, lo pedido,
/// si no, el backend del formato.
pub fn select_backend(format: Option<&PrintFormatConfig>, requested: Option<PdfBackend>) -> PdfBackend {
    match format.map(|f| f.pdf_backend) {
        Some(PdfBackend::Puppeteer) => PdfBackend::Puppeteer,
        format_backend => requested.or(format_backend).unwrap_or(PdfBackend::LegacyRenderer),
    }
}

/// Nombre base seguro para escribir en disco: sólo el último componente,
/// sin extensión .pdf. Los nombres vacíos o "." / ".." pasan a "document".
pub fn safe_file_stem(file_name: &str) -> &str {
    let last = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    match last.trim_end_matches(".pdf") {
        "" | "." | ".." => "document",
        stem => stem,
    }
}

/// Quita el banner con los botones Print / Get PDF.
pub fn strip_print_hide(html: &str) -> String {
    static BANNER: OnceLock<Regex> = OnceLock::new();
    let re = BANNER.get_or_init(|| {
        Regex::new(r#"(?s)<div class="action-banner print-hide">.*?</div>"#)
            .expect("regex de banner inválida")
    });
    re.replace_all(html, "").into_owned()
}

impl PdfService {
    pub fn new(config: &ServiceConfig, chrome: ChromeManager) -> Result<Self> {
        // Subdirectorio temporal para los HTML/PDF de wkhtmltopdf.
        let temp_dir = std::env::temp_dir().join(format!("{}{}", TEMP_DIR_PREFIX, Uuid::new_v4()));
        fs::create_dir_all(&temp_dir)
            .with_context(|| format!("No se pudo crear {:?}", temp_dir))?;

        let wkhtmltopdf_path = match &config.wkhtmltopdf_path {
            Some(path) => Some(path.clone()),
            None => match which::which("wkhtmltopdf") {
                Ok(path) => Some(path),
                Err(_) => {
                    log::warn!("No se encontró wkhtmltopdf; sólo estará disponible Chrome");
                    None
                }
            },
        };

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            temp_dir: Arc::new(temp_dir),
            wkhtmltopdf_path: wkhtmltopdf_path.map(Arc::new),
            chrome,
            defaults: Arc::new(config.pdf_defaults.clone()),
            generation_timeout: config.pdf_timeout,
            store_dir: Arc::new(config.pdf_store_dir.clone()),
        })
    }

    pub fn chrome(&self) -> &ChromeManager {
        &self.chrome
    }

    pub fn store_dir(&self) -> &PathBuf {
        &self.store_dir
    }

    pub fn temp_dir(&self) -> &PathBuf {
        &self.temp_dir
    }

    /// Backend definitivo de una petición. Si toca Chrome y no arranca,
    /// se degrada a wkhtmltopdf.
    pub async fn resolve_backend(
        &self,
        format: Option<&PrintFormatConfig>,
        requested: Option<PdfBackend>,
    ) -> PdfBackend {
        let backend = select_backend(format, requested);
        if backend == PdfBackend::Puppeteer {
            if let Err(e) = self.chrome.ensure_running().await {
                log::error!("No se pudo arrancar Chrome: {:?}", e);
                return PdfBackend::LegacyRenderer;
            }
        }
        backend
    }

    /// Genera un PDF en memoria. Chrome falla → wkhtmltopdf; si el respaldo
    /// también falla, se propaga el error.
    pub async fn generate_pdf(
        &self,
        req: PdfRequest,
        format: Option<&PrintFormatConfig>,
    ) -> Result<GeneratedPdf> {
        let start = Instant::now();

        // Control de concurrencia
        let _guard = self.acquire_permit().await?;

        let backend = self.resolve_backend(format, req.pdf_generator).await;
        let (data, used) = match backend {
            PdfBackend::Puppeteer => match self.generate_with_chrome(&req, format).await {
                Ok(data) => (data, PdfBackend::Puppeteer),
                Err(e) => {
                    log::error!(
                        "Falló Chrome para el formato {:?}: {:?}",
                        format.map(|f| f.name.as_str()),
                        e
                    );
                    log::warn!("Usando wkhtmltopdf como respaldo");
                    let data = self
                        .generate_with_wkhtmltopdf(&req)
                        .await
                        .context("El respaldo wkhtmltopdf también falló")?;
                    (data, PdfBackend::LegacyRenderer)
                }
            },
            PdfBackend::LegacyRenderer => {
                (self.generate_with_wkhtmltopdf(&req).await?, PdfBackend::LegacyRenderer)
            }
        };

        let stored_at = if req.store_local_pdf.unwrap_or(false) {
            Some(self.store_pdf(&req.file_name, &data)?)
        } else {
            None
        };

        log::info!(
            "PDF generado con {} en {:.2}s ({} bytes)",
            used,
            start.elapsed().as_secs_f32(),
            data.len()
        );

        Ok(GeneratedPdf {
            data,
            backend: used,
            stored_at,
        })
    }

    async fn acquire_permit(&self) -> Result<SemaphorePermit> {
        timeout(PERMIT_TIMEOUT, self.semaphore.acquire())
            .await
            .context("Timeout esperando permiso en PdfService")?
            .map_err(|_| anyhow!("No se pudo adquirir el semaphore"))
    }

    /// Guarda el PDF como "<nombre>_<uuid>.pdf" y devuelve el nombre de archivo.
    pub(crate) fn store_pdf(&self, file_name: &str, data: &[u8]) -> Result<String> {
        fs::create_dir_all(&*self.store_dir)
            .with_context(|| format!("No se pudo crear {:?}", self.store_dir))?;

        let stem = safe_file_stem(file_name);
        let unique_name = format!("{}_{}.pdf", stem, Uuid::new_v4());
        let local_path = self.store_dir.join(&unique_name);
        fs::write(&local_path, data)
            .with_context(|| format!("No se pudo guardar PDF en {:?}", local_path))?;

        log::info!("PDF guardado localmente en {:?} ({} bytes)", local_path, data.len());
        Ok(unique_name)
    }

    async fn generate_with_chrome(
        &self,
        req: &PdfRequest,
        format: Option<&PrintFormatConfig>,
    ) -> Result<Vec<u8>> {
        log::info!(
            "Generando PDF con Chrome para el formato {:?}",
            format.map(|f| f.name.as_str())
        );

        let mut req = req.clone();
        if let Some(f) = format {
            req.orientation = Some(f.pdf_page_orientation);
        }
        let options = map_chrome_options(&req, &self.defaults);
        let html = strip_print_hide(&req.html);

        self.chrome.ensure_running().await?;
        timeout(self.generation_timeout, self.print_over_cdp(&html, &options))
            .await
            .context("Timeout generando PDF con Chrome")?
    }

    async fn print_over_cdp(&self, html: &str, options: &ChromePdfOptions) -> Result<Vec<u8>> {
        let ws_url = self.chrome.websocket_url().await?;
        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .context("No se pudo conectar a Chrome por CDP")?;

        // Los eventos CDP se consumen en un task aparte
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = async {
            let page = browser.new_page("about:blank").await?;
            page.set_content(html).await?;
            page.execute(SetEmulatedMediaParams {
                media: Some("print".to_string()),
                ..Default::default()
            })
            .await?;
            let pdf = page.pdf(options.to_print_params()).await?;
            page.close().await?;
            Ok::<_, anyhow::Error>(pdf)
        }
        .await;

        // Sólo se suelta la conexión; el proceso Chrome sigue vivo.
        drop(browser);
        handler_task.abort();
        result
    }

    async fn generate_with_wkhtmltopdf(&self, req: &PdfRequest) -> Result<Vec<u8>> {
        let wkhtmltopdf = self
            .wkhtmltopdf_path
            .as_ref()
            .ok_or_else(|| anyhow!("wkhtmltopdf no está disponible"))?;

        // Crea archivos temporales (HTML y PDF)
        let temp_files = self.create_temp_files(&req.file_name);
        let _cleanup = TempCleanup::new(temp_files.clone()); // al final se borran

        fs::write(&temp_files.html_path, &req.html).with_context(|| {
            format!(
                "Error escribiendo HTML temporal en {:?}",
                temp_files.html_path
            )
        })?;

        let mut cmd = Command::new(&**wkhtmltopdf);
        cmd.args(wkhtmltopdf_args(req, &self.defaults));
        cmd.arg(&temp_files.html_path);
        cmd.arg(&temp_files.pdf_path);

        cmd.stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let output = timeout(self.generation_timeout, cmd.output())
            .await
            .context("Timeout ejecutando wkhtmltopdf")?
            .context("No se pudo lanzar wkhtmltopdf")?;

        if !output.status.success() {
            let stderr_msg = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("wkhtmltopdf falló: {}", stderr_msg));
        }

        let pdf_bytes = fs::read(&temp_files.pdf_path)
            .with_context(|| format!("Error leyendo PDF final en {:?}", temp_files.pdf_path))?;

        Ok(pdf_bytes)
    }

    pub(crate) fn create_temp_files(&self, base_name: &str) -> TempFiles {
        let id = Uuid::new_v4().to_string();
        let stem = safe_file_stem(base_name);
        TempFiles {
            html_path: self.temp_dir.join(format!("{}_{}.html", stem, id)),
            pdf_path: self.temp_dir.join(format!("{}_{}.pdf", stem, id)),
        }
    }
}

/// Argumentos de wkhtmltopdf (sin entrada/salida).
pub fn wkhtmltopdf_args(req: &PdfRequest, defaults: &PdfGlobalConfig) -> Vec<String> {
    let mut args = Vec::new();

    // ===== ORIENTACIÓN =====
    let orientation = req.orientation.unwrap_or(defaults.default_orientation);
    args.push("--orientation".to_string());
    args.push(orientation.as_str().to_string());

    // ===== TAMAÑO DE PÁGINA =====
    let preset = req.page_size_preset.unwrap_or(defaults.default_page_preset);
    if preset == PdfPagePreset::Custom {
        let custom = req.custom_page_size;
        let width = custom.map(|s| s.width).unwrap_or(defaults.default_page_width);
        let height = custom.map(|s| s.height).unwrap_or(defaults.default_page_height);
        args.push("--page-width".to_string());
        args.push(format!("{}mm", width));
        args.push("--page-height".to_string());
        args.push(format!("{}mm", height));
    } else {
        args.push("--page-size".to_string());
        args.push(preset.as_str().to_string());
    }

    // ===== MÁRGENES =====
    let margins = req.margins.unwrap_or(defaults.default_margins);
    for (flag, value) in [
        ("--margin-top", margins.top),
        ("--margin-bottom", margins.bottom),
        ("--margin-left", margins.left),
        ("--margin-right", margins.right),
    ] {
        args.push(flag.to_string());
        args.push(format!("{}mm", value));
    }

    // ===== ESCALA (zoom) =====
    let scale = req.scale.unwrap_or(defaults.default_scale);
    if (scale - 1.0).abs() > f64::EPSILON {
        args.push("--zoom".to_string());
        args.push(format!("{}", scale));
    }

    if let Some(ranges) = req.page_ranges.as_deref().filter(|r| !r.is_empty()) {
        log::debug!("wkhtmltopdf ignora page_ranges={}", ranges);
    }

    // ===== OTRAS OPCIONES =====
    args.push("--enable-local-file-access".to_string());
    args.push("--print-media-type".to_string());
    args
}

// --------------------------------------------------------------------------------
// Estructuras auxiliares
// --------------------------------------------------------------------------------
#[derive(Clone)]
pub(crate) struct TempFiles {
    pub(crate) html_path: PathBuf,
    pub(crate) pdf_path: PathBuf,
}

struct TempCleanup {
    files: TempFiles,
}

impl TempCleanup {
    fn new(files: TempFiles) -> Self {
        Self { files }
    }
}

/// Borra los archivos temporales al salir de scope
impl Drop for TempCleanup {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.files.html_path);
        let _ = fs::remove_file(&self.files.pdf_path);
    }
}
