use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::sync::Once;

static INIT: Once = Once::new();

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
/// Environment variable holding the default log file.
pub const LOG_FILE_ENV: &str = "OUTPUT_FILE_PATH";

/// Parses a level name such as `debug` or `WARN`, defaulting to `Info`.
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Installs the terminal logger and, if `log_file` is given, a file logger
/// appending to it. Only the first call in a process has any effect.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Error> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(level, log_file);
    });
    result
}

fn install(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Error> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        loggers.push(WriteLogger::new(level, config, file));
    }

    CombinedLogger::init(loggers).map_err(|e| Error::new(ErrorKind::Other, e.to_string()))
}
