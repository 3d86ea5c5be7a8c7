use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the `env_logger` backend; `RUST_LOG` overrides `default_filter`.
///
/// Safe to call more than once, later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let _ = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .try_init();
}

#[macro_export]
macro_rules! print_heading {
    ($($arg:tt)*) => {
        println!("{}", ::colored::Colorize::bold(::colored::Colorize::blue(format!($($arg)*).as_str())));
    };
}

#[macro_export]
macro_rules! print_result {
    ($($arg:tt)*) => {
        println!("{}", ::colored::Colorize::green(format!($($arg)*).as_str()));
    };
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        println!("{}", ::colored::Colorize::yellow(format!($($arg)*).as_str()));
    };
}
