use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Format: `[HH:MM:SS] [LEVEL] message`. `verbose` lowers the filter to DEBUG.
pub fn init_logger(verbose: bool) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level_for(verbose))
        .init();
}

fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
