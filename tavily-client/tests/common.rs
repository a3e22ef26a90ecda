use std::sync::OnceLock;

use tavily_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<Option<std::path::PathBuf>> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let json = std::env::var("TAVILY_LOG_FORMAT")
            .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let config = LogConfig {
            app_name: "tavily-tests",
            file: false,
            emit_stderr: true,
            format: if json { LogFormat::Json } else { LogFormat::Text },
            default_filter: "debug",
            ..LogConfig::default()
        };
        tavily_common::observability::init_logging(config).unwrap_or_default()
    });
}
