use crate::{common::*, config::Config};
use env_logger::{Logger, Target, WriteStyle};

/// Installs the global logger. `RUST_LOG` takes precedence over the configured
/// level, and records go to `config.log_file` instead of stderr when it is set.
pub fn init(config: &Config) -> Fallible<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    let logger = build_logger(&filters, config.log_file.as_deref())?;

    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

fn build_logger(filters: &str, log_file: Option<&Path>) -> Fallible<Logger> {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(filters);

    if let Some(path) = log_file {
        let file = open_log_file(path)?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never);
    }

    Ok(builder.build())
}

/// Opens the log file for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Fallible<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    Ok(file)
}
