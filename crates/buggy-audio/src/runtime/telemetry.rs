use crate::metrics::{
    init_metrics, serve_metrics, AUDIBLE_WAVES, ENGINE_PEAK_RPM, OWNERS_WITHOUT_RPM,
    RENDER_PASSES, RENDER_PASS_US, RPM_PUBLISHES, SIM_STEPS_EXECUTED, SIM_STEPS_MISSED,
    TRACE_LINES,
};
use engine_sound::{DriverStats, RenderPass};
use std::thread;
use tracing::info;

pub fn init() {
    init_metrics();
}

pub fn start_metrics_server(addr: &Option<String>) -> Option<thread::JoinHandle<()>> {
    addr.as_ref().map(|addr| {
        info!(addr = %addr, "Starting metrics server");
        serve_metrics(addr.clone())
    })
}

pub fn record_pass(pass: &RenderPass) {
    RENDER_PASSES.inc();
    RENDER_PASS_US.observe(pass.pass_us as f64);
    let audible = pass.waves.iter().filter(|(_, w)| w.volume > 0.0).count();
    AUDIBLE_WAVES.set(audible as f64);
    OWNERS_WITHOUT_RPM.set(pass.owners_without_rpm as f64);
}

pub fn record_trace_lines(lines: usize) {
    TRACE_LINES.inc_by(lines as u64);
}

pub fn record_driver(stats: &DriverStats) {
    SIM_STEPS_EXECUTED.inc_by(stats.steps_executed);
    SIM_STEPS_MISSED.inc_by(stats.steps_missed);
    RPM_PUBLISHES.inc_by(stats.publishes);
    let peak = stats.peak_rpm as f64;
    if peak > ENGINE_PEAK_RPM.get() {
        ENGINE_PEAK_RPM.set(peak);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_rpm_gauge_keeps_the_highest_driver() {
        init();
        let fast = DriverStats {
            peak_rpm: 6500.0,
            ..DriverStats::default()
        };
        let slow = DriverStats {
            peak_rpm: 1200.0,
            ..DriverStats::default()
        };
        record_driver(&fast);
        record_driver(&slow);
        assert!(ENGINE_PEAK_RPM.get() >= 6500.0);
    }
}
