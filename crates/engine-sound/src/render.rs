use crate::graph::{ActiveSound, WaveInstance};
use crate::rpm_cache::{RpmTable, VehicleId};
use crate::timebase::TimeBase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub pass_interval: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pass_interval: Duration::from_millis(10),
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct RenderStats {
    pub passes: u64,
    pub commands_applied: u64,
    pub waves_emitted: u64,
    pub max_pass_us: u64,
}

/// Output of one render pass over every active sound.
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub index: u64,
    pub audio_time: f32,
    pub waves: Vec<(VehicleId, WaveInstance)>,
    /// Sounds whose owner had no published RPM this pass.
    pub owners_without_rpm: usize,
    pub pass_us: u64,
}

/// Audio side: owns the RPM table and the active sounds that read it.
pub struct AudioRenderer {
    rpm_table: RpmTable,
    sounds: Vec<ActiveSound>,
    config: RenderConfig,
    timebase: TimeBase,
    stats: RenderStats,
}

impl AudioRenderer {
    pub fn new(rpm_table: RpmTable, config: RenderConfig, timebase: TimeBase) -> Self {
        Self {
            rpm_table,
            sounds: Vec::new(),
            config,
            timebase,
            stats: RenderStats::default(),
        }
    }

    pub fn add_sound(&mut self, sound: ActiveSound) -> usize {
        self.sounds.push(sound);
        self.sounds.len() - 1
    }

    pub fn rpm_table(&self) -> &RpmTable {
        &self.rpm_table
    }

    /// Applies queued RPM commands, then renders every sound once.
    pub fn render_pass(&mut self, delta_time: f32) -> RenderPass {
        let pass_start = Instant::now();
        self.stats.commands_applied += self.rpm_table.apply_pending() as u64;

        let mut waves = Vec::new();
        let mut owners_without_rpm = 0;
        for sound in &mut self.sounds {
            let owner = sound.owner_id();
            if self.rpm_table.lookup(owner).is_none() {
                owners_without_rpm += 1;
            }
            waves.extend(
                sound
                    .render(&self.rpm_table, delta_time)
                    .into_iter()
                    .map(|wave| (owner, wave)),
            );
        }

        let pass_us = pass_start.elapsed().as_micros() as u64;
        let pass = RenderPass {
            index: self.stats.passes,
            audio_time: self.timebase.now_secs(),
            waves,
            owners_without_rpm,
            pass_us,
        };

        self.stats.passes += 1;
        self.stats.waves_emitted += pass.waves.len() as u64;
        self.stats.max_pass_us = self.stats.max_pass_us.max(pass_us);

        pass
    }

    pub fn run<F>(&mut self, stop: &AtomicBool, mut sink: F)
    where
        F: FnMut(&RenderPass),
    {
        let mut last_pass = Instant::now();
        let mut next_pass = last_pass;

        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < next_pass {
                thread::sleep(next_pass - now);
            }

            let pass_start = Instant::now();
            let delta_time = pass_start.duration_since(last_pass).as_secs_f32();
            last_pass = pass_start;

            let pass = self.render_pass(delta_time);
            sink(&pass);

            next_pass += self.config.pass_interval;
            // Don't try to catch up on passes missed while descheduled.
            if next_pass < pass_start {
                next_pass = pass_start + self.config.pass_interval;
            }
        }
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }
}
