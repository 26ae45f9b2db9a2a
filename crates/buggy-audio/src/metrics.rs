//! Prometheus metrics for the engine sound runtime.
//!
//! Render loop metrics are updated from the audio thread once per pass,
//! simulation metrics when a driver thread finishes.

use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::LazyLock;
use std::thread;
use tiny_http::{Response, Server};

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Render Loop Metrics
// ============================================================================

/// Total audio render passes executed
pub static RENDER_PASSES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "buggy_audio_render_passes_total",
        "Total audio render passes executed",
    )
    .expect("render passes counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register render passes counter");
    counter
});

/// Wall time spent in one render pass
pub static RENDER_PASS_US: LazyLock<Histogram> = LazyLock::new(|| {
    let histogram = Histogram::with_opts(
        HistogramOpts::new(
            "buggy_audio_render_pass_us",
            "Render pass duration distribution in microseconds",
        )
        .buckets(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0,
        ]),
    )
    .expect("render pass histogram");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("register render pass histogram");
    histogram
});

/// Waves emitted with a non-zero volume in the latest pass
pub static AUDIBLE_WAVES: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        "buggy_audio_audible_waves",
        "Waves emitted with non-zero volume in the latest render pass",
    )
    .expect("audible waves gauge");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("register audible waves gauge");
    gauge
});

/// Sounds whose owner had no published RPM in the latest pass
pub static OWNERS_WITHOUT_RPM: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        "buggy_audio_owners_without_rpm",
        "Active sounds whose owner had no published RPM in the latest pass",
    )
    .expect("owners without rpm gauge");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("register owners without rpm gauge");
    gauge
});

/// Mix trace lines written
pub static TRACE_LINES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "buggy_audio_trace_lines_total",
        "Mix trace lines written",
    )
    .expect("trace lines counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register trace lines counter");
    counter
});

// ============================================================================
// Simulation Metrics
// ============================================================================

/// Simulation steps executed across all vehicles
pub static SIM_STEPS_EXECUTED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "buggy_audio_sim_steps_executed_total",
        "Simulation steps executed across all vehicles",
    )
    .expect("sim steps counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register sim steps counter");
    counter
});

/// Simulation steps missed (overruns)
pub static SIM_STEPS_MISSED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "buggy_audio_sim_steps_missed_total",
        "Simulation steps missed due to timing overruns",
    )
    .expect("sim steps missed counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register sim steps missed counter");
    counter
});

/// RPM samples published by the simulation side
pub static RPM_PUBLISHES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "buggy_audio_rpm_publishes_total",
        "RPM samples published by possessed vehicles",
    )
    .expect("rpm publishes counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("register rpm publishes counter");
    counter
});

/// Highest engine RPM reached by any vehicle
pub static ENGINE_PEAK_RPM: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        "buggy_audio_engine_peak_rpm",
        "Highest engine RPM reached by any finished vehicle driver",
    )
    .expect("engine peak rpm gauge");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("register engine peak rpm gauge");
    gauge
});

// ============================================================================
// Metrics HTTP Server
// ============================================================================

/// Encode the registry in the Prometheus text format.
pub fn encode_metrics() -> Result<Vec<u8>, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(buffer)
}

/// Start the metrics HTTP server on the given address.
/// Returns a join handle for the server thread.
pub fn serve_metrics(bind_addr: String) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let server = match Server::http(&bind_addr) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Failed to start metrics server on {}: {}", bind_addr, e);
                return;
            }
        };

        tracing::info!("Metrics server listening on http://{}/metrics", bind_addr);

        for request in server.incoming_requests() {
            match request.url() {
                "/metrics" => {
                    let buffer = match encode_metrics() {
                        Ok(buffer) => buffer,
                        Err(e) => {
                            tracing::warn!("Failed to encode metrics: {}", e);
                            let _ = request.respond(
                                Response::from_string("Internal Server Error")
                                    .with_status_code(500),
                            );
                            continue;
                        }
                    };

                    let mut response = Response::from_data(buffer);
                    if let Ok(header) = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"text/plain; version=0.0.4"[..],
                    ) {
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                }
                "/health" => {
                    let _ = request.respond(Response::from_string("OK"));
                }
                "/ready" => {
                    // Ready once the audio thread has rendered a pass
                    if RENDER_PASSES.get() > 0 {
                        let _ = request.respond(Response::from_string("Ready"));
                    } else {
                        let _ = request
                            .respond(Response::from_string("Not Ready").with_status_code(503));
                    }
                }
                _ => {
                    let _ =
                        request.respond(Response::from_string("Not Found").with_status_code(404));
                }
            }
        }
    })
}

/// Initialize all metrics (forces lazy initialization)
pub fn init_metrics() {
    let _ = RENDER_PASSES.get();
    let _ = RENDER_PASS_US.get_sample_count();
    let _ = AUDIBLE_WAVES.get();
    let _ = OWNERS_WITHOUT_RPM.get();
    let _ = TRACE_LINES.get();
    let _ = SIM_STEPS_EXECUTED.get();
    let _ = SIM_STEPS_MISSED.get();
    let _ = RPM_PUBLISHES.get();
    let _ = ENGINE_PEAK_RPM.get();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_exposes_every_metric() {
        init_metrics();
        RENDER_PASSES.inc();

        let text = String::from_utf8(encode_metrics().unwrap()).unwrap();
        for name in [
            "buggy_audio_render_passes_total",
            "buggy_audio_render_pass_us",
            "buggy_audio_audible_waves",
            "buggy_audio_owners_without_rpm",
            "buggy_audio_sim_steps_executed_total",
            "buggy_audio_rpm_publishes_total",
            "buggy_audio_engine_peak_rpm",
        ] {
            assert!(text.contains(name), "missing {name}");
        }
    }
}
