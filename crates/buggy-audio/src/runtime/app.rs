use crate::infra::mix_trace::MixTraceWriter;
use crate::runtime::config::RuntimeConfig;
use crate::runtime::logging::init_tracing;
use crate::runtime::telemetry;
use engine_sound::{
    rpm_channel, ActiveSound, AudioRenderer, DriverConfig, DriverStats, EngineSoundPreset,
    RenderConfig, RenderStats, RpmPublisher, SimulatedBuggy, TimeBase, VehicleDriver,
    VehicleEngine, VehicleId,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub fn run_from_args() {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return;
    }
    run(config);
}

pub fn run(config: RuntimeConfig) {
    // Initialize tracing
    init_tracing(config.json_logs);

    // Initialize metrics
    telemetry::init();

    // Start metrics server if enabled
    let _metrics_handle = telemetry::start_metrics_server(&config.metrics_addr);

    let preset = load_preset(config.preset_path.as_ref());
    let timebase = TimeBase::new();
    let (publisher, table) = rpm_channel();

    let render_config = RenderConfig {
        pass_interval: config.audio_interval(),
    };
    let mut renderer = AudioRenderer::new(table, render_config, timebase);
    for vehicle in 1..=config.vehicles {
        match preset.build() {
            Ok(node) => {
                renderer.add_sound(ActiveSound::new(vehicle, node));
            }
            Err(e) => {
                error!(error = %e, preset = %preset.name, "Failed to build engine sound");
                return;
            }
        }
    }

    let stop = Arc::new(AtomicBool::new(false));

    info!(
        vehicles = config.vehicles,
        sim_hz = config.sim_hz,
        audio_hz = config.audio_hz,
        preset = %preset.name,
        samples = preset.samples.len(),
        "Starting vehicle drivers and audio renderer"
    );

    let driver_handles: Vec<_> = (1..=config.vehicles)
        .map(|vehicle| spawn_driver(vehicle, &config, publisher.clone(), Arc::clone(&stop)))
        .collect();
    drop(publisher);

    let trace = init_mix_trace(config.trace_path.as_ref());
    let stop_audio = Arc::clone(&stop);
    let audio_handle = thread::spawn(move || {
        let mut trace = trace;
        renderer.run(&stop_audio, |pass| {
            telemetry::record_pass(pass);

            let result = trace.as_mut().map(|writer| writer.write_pass(pass));
            match result {
                Some(Ok(lines)) => telemetry::record_trace_lines(lines),
                Some(Err(e)) => {
                    warn!(error = %e, "Mix trace write failed, disabling trace");
                    trace = None;
                }
                None => {}
            }

            if pass.index % 100 == 0 {
                let audible = pass.waves.iter().filter(|(_, w)| w.volume > 0.0).count();
                debug!(
                    pass = pass.index,
                    audio_time_s = pass.audio_time,
                    audible,
                    owners_without_rpm = pass.owners_without_rpm,
                    "Render pass"
                );
            }
        });
        renderer.stats().clone()
    });

    info!("buggy-audio running. Press Ctrl+C to stop.");

    if let Some(seconds) = config.run_seconds {
        info!(seconds, "Running for limited duration");
        thread::sleep(Duration::from_secs(seconds));
        stop.store(true, Ordering::Relaxed);
    }

    let mut totals = DriverStats::default();
    for handle in driver_handles {
        match handle.join() {
            Ok(stats) => {
                telemetry::record_driver(&stats);
                totals.steps_executed += stats.steps_executed;
                totals.steps_missed += stats.steps_missed;
                totals.publishes += stats.publishes;
                totals.max_jitter_us = totals.max_jitter_us.max(stats.max_jitter_us);
                totals.peak_rpm = totals.peak_rpm.max(stats.peak_rpm);
            }
            Err(_) => error!("Vehicle driver thread panicked"),
        }
    }
    // A driver that stopped on its own (watchdog) must not leave the renderer running.
    stop.store(true, Ordering::Relaxed);

    let render_stats = match audio_handle.join() {
        Ok(stats) => stats,
        Err(_) => {
            error!("Audio renderer thread panicked");
            RenderStats::default()
        }
    };

    info!(
        steps_executed = totals.steps_executed,
        steps_missed = totals.steps_missed,
        rpm_publishes = totals.publishes,
        max_jitter_us = totals.max_jitter_us,
        peak_rpm = totals.peak_rpm,
        render_passes = render_stats.passes,
        commands_applied = render_stats.commands_applied,
        waves_emitted = render_stats.waves_emitted,
        max_pass_us = render_stats.max_pass_us,
        "Run complete"
    );
}

fn spawn_driver(
    vehicle: VehicleId,
    config: &RuntimeConfig,
    publisher: RpmPublisher,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<DriverStats> {
    let driver_config = DriverConfig {
        step_time: config.sim_step(),
        throttle: config.throttle,
        unpossess_after: config.unpossess_after,
        ..DriverConfig::default()
    };

    thread::spawn(move || {
        let mut driver = VehicleDriver::new(SimulatedBuggy::new(), driver_config, publisher);
        driver.possess(vehicle);
        debug!(
            vehicle,
            max_rpm = driver.engine().engine_max_rotation_speed(),
            "Vehicle possessed"
        );
        driver.run(&stop);
        driver.stats().clone()
    })
}

fn load_preset(path: Option<&PathBuf>) -> EngineSoundPreset {
    match path {
        Some(path) => match EngineSoundPreset::load(path) {
            Ok(preset) => {
                info!(path = %path.display(), name = %preset.name, "Loaded engine sound preset");
                preset
            }
            Err(e) => {
                warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to load preset, using built-in buggy"
                );
                EngineSoundPreset::builtin_buggy()
            }
        },
        None => EngineSoundPreset::builtin_buggy(),
    }
}

fn init_mix_trace(trace_path: Option<&PathBuf>) -> Option<MixTraceWriter> {
    trace_path.and_then(|path| match MixTraceWriter::new(path) {
        Ok(writer) => {
            info!(path = %path.display(), "Mix trace enabled");
            Some(writer)
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %path.display(),
                "Failed to open mix trace, continuing without it"
            );
            None
        }
    })
}
