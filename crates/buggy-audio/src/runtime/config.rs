use engine_sound::ThrottleProfile;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    pub run_seconds: Option<u64>,
    pub preset_path: Option<PathBuf>,
    pub vehicles: u32,
    pub sim_hz: u32,
    pub audio_hz: u32,
    pub throttle: ThrottleProfile,
    pub unpossess_after: Option<Duration>,
    pub json_logs: bool,
    pub metrics_addr: Option<String>,
    pub trace_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            run_seconds: None,
            preset_path: None,
            vehicles: 1,
            sim_hz: 60,
            audio_hz: 100,
            throttle: ThrottleProfile::Sweep { period_s: 6.0 },
            unpossess_after: None,
            json_logs: false,
            metrics_addr: None,
            trace_path: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--run-seconds" => {
                    if i + 1 < args.len() {
                        cfg.run_seconds = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--preset" => {
                    if i + 1 < args.len() {
                        cfg.preset_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--vehicles" => {
                    if i + 1 < args.len() {
                        cfg.vehicles = args[i + 1].parse().unwrap_or(1).max(1);
                        i += 1;
                    }
                }
                "--sim-hz" => {
                    if i + 1 < args.len() {
                        cfg.sim_hz = args[i + 1].parse().unwrap_or(60).max(1);
                        i += 1;
                    }
                }
                "--audio-hz" => {
                    if i + 1 < args.len() {
                        cfg.audio_hz = args[i + 1].parse().unwrap_or(100).max(1);
                        i += 1;
                    }
                }
                "--throttle" => {
                    if i + 1 < args.len() {
                        if let Ok(value) = args[i + 1].parse::<f32>() {
                            cfg.throttle = ThrottleProfile::Constant(value.clamp(-1.0, 1.0));
                        }
                        i += 1;
                    }
                }
                "--sweep" => {
                    if i + 1 < args.len() {
                        if let Ok(period_s) = args[i + 1].parse::<f32>() {
                            cfg.throttle = ThrottleProfile::Sweep { period_s };
                        }
                        i += 1;
                    }
                }
                "--unpossess-after" => {
                    if i + 1 < args.len() {
                        cfg.unpossess_after = args[i + 1]
                            .parse::<f64>()
                            .ok()
                            .filter(|secs| secs.is_finite() && *secs >= 0.0)
                            .map(Duration::from_secs_f64);
                        i += 1;
                    }
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--metrics-addr" => {
                    if i + 1 < args.len() {
                        cfg.metrics_addr = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--trace-out" => {
                    if i + 1 < args.len() {
                        cfg.trace_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }

    pub fn sim_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sim_hz as f64)
    }

    pub fn audio_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.audio_hz as f64)
    }

    pub fn print_help() {
        println!(
            r#"buggy-audio - RPM driven engine sound crossfade for a simulated buggy

USAGE:
    buggy-audio [OPTIONS]

OPTIONS:
    --run-seconds <SECS>      Run for a fixed duration then exit
    --preset <PATH>           Engine sound preset (JSON) [default: built-in buggy]
    --vehicles <N>            Number of simulated vehicles [default: 1]
    --sim-hz <HZ>             Simulation step rate [default: 60]
    --audio-hz <HZ>           Audio render pass rate [default: 100]
    --throttle <VALUE>        Constant throttle in [-1, 1]
    --sweep <SECS>            Sweep throttle 0 -> 1 -> 0 over SECS [default: 6]
    --unpossess-after <SECS>  Release vehicles after SECS of simulation time
    --json-logs               Output logs in JSON format
    --metrics-addr <ADDR>     Enable Prometheus metrics server on address (e.g., 0.0.0.0:9090)
    --trace-out <PATH>        Write every rendered wave to a JSONL mix trace
    -h, --help                Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                  Set log filter (e.g., RUST_LOG=debug,engine_sound=trace)

EXAMPLES:
    # Ten second sweep with a mix trace
    buggy-audio --run-seconds 10 --trace-out /tmp/mix.jsonl

    # Two vehicles, one at constant half throttle
    buggy-audio --vehicles 2 --throttle 0.5 --metrics-addr 0.0.0.0:9090
"#
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("buggy-audio")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults_without_flags() {
        let cfg = RuntimeConfig::from_args(&args(&[]));
        assert_eq!(cfg.vehicles, 1);
        assert_eq!(cfg.sim_hz, 60);
        assert_eq!(cfg.throttle, ThrottleProfile::Sweep { period_s: 6.0 });
        assert!(cfg.run_seconds.is_none());
        assert!(!cfg.json_logs);
    }

    #[test]
    fn parses_flags_and_ignores_unknown() {
        let cfg = RuntimeConfig::from_args(&args(&[
            "--run-seconds",
            "3",
            "--bogus",
            "--vehicles",
            "2",
            "--throttle",
            "1.5",
            "--unpossess-after",
            "1.5",
            "--trace-out",
            "/tmp/mix.jsonl",
            "--json-logs",
        ]));
        assert_eq!(cfg.run_seconds, Some(3));
        assert_eq!(cfg.vehicles, 2);
        assert_eq!(cfg.throttle, ThrottleProfile::Constant(1.0));
        assert_eq!(cfg.unpossess_after, Some(Duration::from_millis(1500)));
        assert_eq!(cfg.trace_path, Some(PathBuf::from("/tmp/mix.jsonl")));
        assert!(cfg.json_logs);
    }

    #[test]
    fn help_stops_parsing() {
        let cfg = RuntimeConfig::from_args(&args(&["-h", "--vehicles", "5"]));
        assert!(cfg.show_help);
        assert_eq!(cfg.vehicles, 1);
    }

    #[test]
    fn rates_are_never_zero() {
        let cfg = RuntimeConfig::from_args(&args(&["--sim-hz", "0", "--audio-hz", "x"]));
        assert_eq!(cfg.sim_hz, 1);
        assert_eq!(cfg.audio_hz, 100);
        assert_eq!(cfg.audio_interval(), Duration::from_millis(10));
    }
}
