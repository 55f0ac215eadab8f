use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Handle on the installed subscriber's level filter.
pub struct Logging {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Install the stderr subscriber at `warn`, or `debug` when asked.
///
/// `RUST_LOG` wins over both. Only the first call in a process installs a
/// subscriber; later handles are detached.
pub fn init(debug: bool) -> Logging {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (level(debug), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();

    Logging { filter: handle, from_env }
}

fn level(debug: bool) -> EnvFilter {
    EnvFilter::new(if debug { "debug" } else { "warn" })
}

impl Logging {
    /// Raise the level to `debug` once the config file asked for it.
    pub fn enable_debug(&self) {
        if self.from_env {
            return;
        }
        if let Err(err) = self.filter.reload(level(true)) {
            tracing::debug!("log level unchanged: {err}");
        }
    }
}
