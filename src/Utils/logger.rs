use crate::numerical::logistic::logreg_errors::LogRegError;
use crate::numerical::optimization::monitor::ObjectiveTrace;
use chrono::Local;
use csv::Writer;
use simplelog::*;
use std::fs::File;
use std::io;
use std::path::Path;

/// Level filter from its name; `off`/`none` disable logging
pub fn parse_loglevel(level: &str) -> Result<LevelFilter, LogRegError> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(LogRegError::Config(format!(
            "loglevel must be debug, info, warn, error or off, got {}",
            level
        ))),
    }
}

/// Initializes the global logger: terminal output and, when `log_file` is set, a copy in
/// `log_<date>_<time>.txt`. Returns false when logging is switched off.
/// A logger installed earlier in the process is left in place.
pub fn init_logger(loglevel: Option<&str>, log_file: bool) -> Result<bool, LogRegError> {
    let log_option = match loglevel {
        Some(level) => parse_loglevel(level)?,
        None => LevelFilter::Info,
    };
    if log_option == LevelFilter::Off {
        return Ok(false);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        let file = File::create(&name)
            .map_err(|e| LogRegError::Config(format!("cannot create log file {}: {}", name, e)))?;
        loggers.push(WriteLogger::new(log_option, Config::default(), file));
    }
    // Err means a logger is already set, which is fine
    let _ = CombinedLogger::init(loggers);
    Ok(true)
}

/// Writes objective traces side by side: first column is the iteration number, then one column
/// per trace headed by its label. Shorter traces leave empty cells.
pub fn save_trace_to_csv(traces: &[ObjectiveTrace], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let mut headers = vec!["iteration".to_string()];
    headers.extend(traces.iter().map(|trace| trace.label.clone()));
    writer.write_record(&headers)?;

    let n_rows = traces.iter().map(|trace| trace.len()).max().unwrap_or(0);
    for k in 0..n_rows {
        let mut row = vec![k.to_string()];
        row.extend(traces.iter().map(|trace| {
            trace
                .objectives
                .get(k)
                .map(|f| f.to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::optimization::monitor::Monitor;
    use std::fs;

    #[test]
    fn test_parse_loglevel() {
        assert_eq!(parse_loglevel("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_loglevel("none").unwrap(), LevelFilter::Off);
        assert!(parse_loglevel("verbose").is_err());
        assert!(!init_logger(Some("off"), false).unwrap());
    }

    #[test]
    fn test_save_trace_to_csv() {
        let mut newton = ObjectiveTrace::new("newton");
        newton.record(0, 2.5);
        newton.record(1, 1.25);
        let mut gd = ObjectiveTrace::new("gd");
        gd.record(0, 3.0);
        gd.record(1, 2.0);
        gd.record(2, 1.5);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces.csv");
        save_trace_to_csv(&[newton, gd], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "iteration,newton,gd");
        assert_eq!(lines[1], "0,2.5,3");
        assert_eq!(lines[3], "2,,1.5");
        assert_eq!(lines.len(), 4);
    }
}
