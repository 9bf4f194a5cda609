use log::{LevelFilter, Metadata, Record};
use std::io::Write;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().starts_with("ironframe_lint")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                std::io::stderr(),
                "[{}] {}",
                record.level().as_str().to_lowercase(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Sends this crate's log records to stderr. Safe to call more than once; later
/// calls only adjust the level.
pub fn init_logger(debug: bool) {
    let _ = log::set_boxed_logger(Box::new(StderrLogger));
    log::set_max_level(level_for(debug));
}

#[cfg(test)]
mod tests {
    use super::level_for;
    use log::LevelFilter;

    #[test]
    fn debug_flag_selects_level() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Warn);
    }
}
