//! logger.rs
//! Configuración del logger usando env_logger.

/// Nivel por defecto; chromiumoxide es muy verboso con los eventos CDP.
const DEFAULT_FILTER: &str = "info,chromiumoxide=warn";

pub fn init_logger() {
    // RUST_LOG manda; si no está, DEFAULT_FILTER.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_secs()
        .init();
}
