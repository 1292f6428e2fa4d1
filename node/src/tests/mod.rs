use crate::Simulator;

mod randomized;

static LOG_INIT: std::sync::Once = std::sync::Once::new();

/// Setup function that is only run once, even if called multiple times.
fn test_setup() {
    LOG_INIT.call_once(|| {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .finish(),
        )
        .expect("Configure tracing");
    });
}

fn simulator(processes: usize) -> Simulator {
    test_setup();
    Simulator::new(processes).expect("valid process count")
}
