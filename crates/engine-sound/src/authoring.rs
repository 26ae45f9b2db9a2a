use crate::engine_sound::EngineSampleConfig;

/// Inconsistencies in an authored RPM window. None of these stop evaluation;
/// they flag inputs whose crossfade is not meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthoringIssue {
    NonFinite,
    DegenerateFadeIn {
        rpm: f32,
    },
    DegenerateFadeOut {
        rpm: f32,
    },
    InvertedWindow {
        start: f32,
        end: f32,
    },
    OverlappingFades {
        fade_in_end: f32,
        fade_out_start: f32,
    },
}

impl EngineSampleConfig {
    pub fn authoring_issues(&self) -> Vec<AuthoringIssue> {
        let values = [
            self.fade_in_rpm_start,
            self.fade_in_rpm_end,
            self.fade_out_rpm_start,
            self.fade_out_rpm_end,
            self.max_pitch_multiplier,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return vec![AuthoringIssue::NonFinite];
        }

        let mut issues = Vec::new();

        if self.fade_in_rpm_start == self.fade_in_rpm_end && self.fade_in_rpm_start > 0.0 {
            issues.push(AuthoringIssue::DegenerateFadeIn {
                rpm: self.fade_in_rpm_start,
            });
        }
        if self.fade_out_rpm_start == self.fade_out_rpm_end {
            issues.push(AuthoringIssue::DegenerateFadeOut {
                rpm: self.fade_out_rpm_start,
            });
        }

        for (start, end) in [
            (self.fade_in_rpm_start, self.fade_in_rpm_end),
            (self.fade_out_rpm_start, self.fade_out_rpm_end),
            (self.fade_in_rpm_start, self.fade_out_rpm_end),
        ] {
            if start > end {
                issues.push(AuthoringIssue::InvertedWindow { start, end });
            }
        }

        if self.fade_in_rpm_end > self.fade_out_rpm_start {
            issues.push(AuthoringIssue::OverlappingFades {
                fade_in_end: self.fade_in_rpm_end,
                fade_out_start: self.fade_out_rpm_start,
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_window_has_no_issues() {
        let config = EngineSampleConfig::new((1000.0, 2000.0), (5000.0, 6000.0), 1.5);
        assert!(config.authoring_issues().is_empty());
    }

    #[test]
    fn idle_sample_may_start_fully_faded_in() {
        let config = EngineSampleConfig::new((0.0, 0.0), (1200.0, 2000.0), 1.3);
        assert!(config.authoring_issues().is_empty());
    }

    #[test]
    fn flags_nan() {
        let config = EngineSampleConfig::new((f32::NAN, 2000.0), (5000.0, 6000.0), 1.5);
        assert_eq!(config.authoring_issues(), vec![AuthoringIssue::NonFinite]);
    }

    #[test]
    fn default_config_is_degenerate() {
        let issues = EngineSampleConfig::default().authoring_issues();
        assert!(matches!(
            issues.as_slice(),
            [AuthoringIssue::DegenerateFadeOut { .. }]
        ));
    }

    #[test]
    fn flags_overlap_and_inversion() {
        let config = EngineSampleConfig::new((1000.0, 4000.0), (3000.0, 2500.0), 1.0);
        let issues = config.authoring_issues();
        assert!(issues.contains(&AuthoringIssue::InvertedWindow {
            start: 3000.0,
            end: 2500.0
        }));
        assert!(issues.contains(&AuthoringIssue::OverlappingFades {
            fade_in_end: 4000.0,
            fade_out_start: 3000.0
        }));
    }
}
