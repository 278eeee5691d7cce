use clap::Parser;
use macroquad::prelude::*;
use mimalloc::MiMalloc;

use vigil::app::App;
use vigil::Args;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn window_conf() -> Conf {
    Conf {
        window_title: "Crowd & Weapon Detection".to_string(),
        window_width: 1000,
        window_height: 720,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    log::info!("crowd weights: {}", args.crowd_model);
    log::info!("weapon weights: {}", args.weapon_model);
    log::info!("results chart: {}", args.results_chart);

    let mut app = App::new(args);

    loop {
        app.handle_input();
        app.update();
        app.draw();
        app.draw_ui();

        next_frame().await
    }
}
