use schemas::Flavor;

/// Runs the variation where dataset directories are optional.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    structured_configs::app::run(Flavor::Basic)
}
