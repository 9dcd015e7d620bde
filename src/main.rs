use schemas::Flavor;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    structured_configs::app::run(Flavor::Strict)
}
