use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbosity: u8) -> EnvFilter {
    let directive = match verbosity {
        0 => "behr_downloader=warn",
        1 => "behr_downloader=info",
        2 => "behr_downloader=debug,info",
        _ => "behr_downloader=trace,debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Human readable log lines on stderr, filtered by the `-v` count unless `RUST_LOG` is set.
pub fn init_cli_logger(verbosity: u8) {
    tracing_subscriber::registry()
        .with(default_filter(verbosity))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbosity: u8) {
    tracing_subscriber::registry()
        .with(default_filter(verbosity))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
