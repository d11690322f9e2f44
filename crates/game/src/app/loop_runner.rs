use std::process::ExitCode;

use engine::{run_app, DrawList};
use tracing::info;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut scene,
        mut input,
    } = app;
    let mut target = DrawList::default();

    let summary = run_app(&config, &mut scene, &mut input, &mut target);
    info!(
        ticks = summary.ticks,
        restarts = summary.restarts,
        last_frame_draws = target.commands().len(),
        "platformer_exit"
    );

    ExitCode::SUCCESS
}
