#[cfg(test)]
mod proptest_engine_sound {
    use crate::engine_sound::*;
    use crate::graph::{ParseContext, ParseParams, SilentNode, SoundNode};
    use crate::rpm_cache::rpm_channel;
    use proptest::prelude::*;

    // Ordered, non-degenerate windows: fade-in strictly before fade-out.
    fn well_formed_config() -> impl Strategy<Value = EngineSampleConfig> {
        (
            0.0f32..2000.0,
            1.0f32..2000.0,
            0.0f32..2000.0,
            1.0f32..2000.0,
            0.5f32..2.0,
        )
            .prop_map(|(start, fade_in, plateau, fade_out, pitch)| {
                EngineSampleConfig::new(
                    (start, start + fade_in),
                    (start + fade_in + plateau, start + fade_in + plateau + fade_out),
                    pitch,
                )
            })
    }

    #[derive(Debug, Clone)]
    enum Mutation {
        Insert(usize),
        Remove(usize),
    }

    fn mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            (0usize..40).prop_map(Mutation::Insert),
            (0usize..40).prop_map(Mutation::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        // Property: volume stays within [0, 1] for every RPM
        #[test]
        fn volume_is_unit_bounded(config in well_formed_config(), rpm in -1000.0f32..10000.0) {
            let mix = config.evaluate(rpm);
            prop_assert!((0.0..=1.0).contains(&mix.volume), "volume {} for {:?} at {}", mix.volume, config, rpm);
            prop_assert!(mix.pitch.is_finite());
        }

        // Property: outside the window the sample is silent at neutral pitch
        #[test]
        fn silent_outside_window(config in well_formed_config(), overshoot in 0.001f32..5000.0) {
            let below = config.evaluate(config.fade_in_rpm_start - overshoot);
            let above = config.evaluate(config.fade_out_rpm_end + overshoot);
            prop_assert_eq!(below.volume, 0.0);
            prop_assert_eq!(below.pitch, 1.0);
            prop_assert_eq!(above.volume, 0.0);
            prop_assert_eq!(above.pitch, 1.0);
        }

        // Property: arbitrary mutations never desynchronise configs and children
        #[test]
        fn mutations_keep_configs_aligned(ops in proptest::collection::vec(mutation(), 0..64)) {
            let mut node = EngineSoundNode::with_starting_connectors();
            let mut expected_len = node.len();
            for op in ops {
                match op {
                    Mutation::Insert(index) => {
                        if node.insert_child(index, SilentNode).is_ok() {
                            expected_len += 1;
                        }
                    }
                    Mutation::Remove(index) => {
                        if node.remove_child(index).is_ok() {
                            expected_len -= 1;
                        }
                    }
                }
                prop_assert_eq!(node.len(), expected_len);
                prop_assert_eq!(node.configs().count(), node.samples().len());
                prop_assert!(node.len() <= MAX_CHILD_NODES);
            }
            for config in node.configs() {
                prop_assert_eq!(*config, EngineSampleConfig::default());
            }
        }

        // Property: the clamp ceiling never decreases across passes
        #[test]
        fn clamp_ceiling_is_monotonic(
            ends in proptest::collection::vec(1.0f32..10000.0, 1..8),
            desired in 0.0f32..20000.0,
        ) {
            let (publisher, mut table) = rpm_channel();
            let mut node = EngineSoundNode::new();
            for end in &ends {
                node.push_sample(EngineSampleConfig::new((0.0, 0.0), (end * 0.5, *end), 1.0), SilentNode).unwrap();
            }
            let max_end = ends.iter().cloned().fold(0.0f32, f32::max);

            let mut out = Vec::new();
            let mut previous = node.clamp_ceiling();
            for step in 1..=4 {
                publisher.publish(1, desired, step as f32);
                table.apply_pending();
                let mut ctx = ParseContext { owner_id: 1, rpm_table: &table, delta_time: 0.01 };
                node.parse(&mut ctx, 0, &ParseParams::default(), &mut out);
                prop_assert!(node.clamp_ceiling() >= previous);
                prop_assert!(node.current_rpm() <= max_end);
                previous = node.clamp_ceiling();
            }
            prop_assert_eq!(node.clamp_ceiling(), max_end);
        }
    }
}
