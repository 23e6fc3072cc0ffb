use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

/// Initializes the logging system.
///
/// Uses `log4rs.yaml` from the working directory when present, otherwise
/// falls back to a console appender at info level. Call once at startup;
/// re-initialization is tolerated and ignored.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if Path::new("log4rs.yaml").exists() {
        let _ = log4rs::init_file("log4rs.yaml", log4rs::config::Deserializers::default());
        return Ok(());
    }
    let encoder = PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}");
    let console = ConsoleAppender::builder().encoder(Box::new(encoder)).build();
    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(LevelFilter::Info))?;
    let _ = log4rs::init_config(config);
    Ok(())
}
