use std::io::Write;

use log::Level;

/// Initialize `env_logger` from the `-q` / `-v` flags.
///
/// Info output is printed bare so command results read like plain text. Script
/// `console.*` output (target `vep::console`) follows the same level.
pub fn init_logger(quiet: bool, verbose: u8) {
    let level = if quiet {
        Level::Error
    } else if verbose == 0 {
        Level::Info
    } else if verbose == 1 {
        Level::Debug
    } else {
        Level::Trace
    };

    let mut builder = env_logger::builder();

    if level == Level::Trace {
        builder.filter_level(level.to_level_filter());
    } else if level == Level::Debug {
        for module in ["vep", "vep_config", "vep_runtime", "vep_executor"] {
            builder.filter_module(module, level.to_level_filter());
        }
    } else {
        // info, warn, error
        builder
            .filter_module("vep", level.to_level_filter())
            .filter_module("vep_executor", Level::Warn.to_level_filter())
            .format(|buf, record| {
                if record.level() == Level::Info {
                    writeln!(buf, "{}", record.args())
                } else {
                    let log_style = buf.default_level_style(record.level());
                    writeln!(
                        buf,
                        "{log_style}[{}]{log_style:#} {}",
                        record.level(),
                        record.args()
                    )
                }
            });
    }

    let _ = builder.try_init();
}
