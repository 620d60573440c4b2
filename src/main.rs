use attractor_particles::{run_wgpu_window, World};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting attractor particle simulation...");

    if let Err(e) = run_wgpu_window(World::new()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
