use env_logger::{Builder, Env};

/// Intercept messages using the `log` crate and print them to STDERR. `RUST_LOG` overrides the
/// default of `info`. The HTTP stack is noisy at `info`, so it's capped at `warn` unless
/// `RUST_LOG` says otherwise.
pub fn setup() {
    let env = Env::default().default_filter_or("info");
    let mut builder = Builder::new();
    builder
        .filter_module("hyper", log::LevelFilter::Warn)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("rustls", log::LevelFilter::Warn)
        .parse_env(env);
    // Tests and repeated calls shouldn't blow up
    let _ = builder.try_init();
}
