//! Processor contract tests that span the plugin, the dispatcher and the
//! hand-off store.

use approx::assert_abs_diff_eq;
use conductor_core::{
    EngineConfig, EventDispatcher, HostControl, InternalPlugin, ProcessorState, RtEventKind,
};
use proptest::prelude::*;
use std::sync::Arc;

#[test]
fn test_realtime_state_round_trip_through_dispatcher() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = EngineConfig::default();
    let (dispatcher, mut audio_in, audio_out) = EventDispatcher::with_rt_queues(&config);
    let dispatcher = Arc::new(dispatcher);
    let handoff = dispatcher.handoff();

    let mut plugin = InternalPlugin::new("synth", "Synth");
    let cutoff = plugin
        .register_float_parameter("cutoff", "Cutoff", "Hz", 1000.0, 20.0, 20000.0)
        .unwrap();
    plugin
        .base_mut()
        .set_host_control(HostControl::new(dispatcher.clone(), handoff.clone()));
    plugin.base_mut().set_event_output(Box::new(audio_out));

    let mut state = ProcessorState::new();
    state.add_parameter_change(cutoff, 0.25);
    state.set_bypass(true);
    plugin.set_state(&state, true).unwrap();

    // The state sits in the hand-off store until the audio thread is done with it.
    dispatcher.process_pending();
    assert_eq!(handoff.available(), handoff.capacity() - 1);

    let event = audio_in.pop().unwrap();
    assert!(matches!(event.kind(), RtEventKind::SetState(_)));
    plugin.process_event(event);
    assert_abs_diff_eq!(plugin.parameter_value(cutoff).unwrap(), 0.25);
    assert!(plugin.bypassed());

    // Delete travels back through the dispatcher to the worker.
    dispatcher.process_pending();
    dispatcher.process_worker_pending();
    assert_eq!(handoff.available(), handoff.capacity());
}

#[test]
fn test_duplicate_name_leaves_registry_untouched() {
    let mut plugin = InternalPlugin::new("synth", "Synth");
    plugin.register_float_parameter("cutoff", "Cutoff", "Hz", 1000.0, 20.0, 20000.0);
    plugin.register_bool_parameter("sync", "Sync", "", false);

    assert!(plugin.register_int_parameter("cutoff", "Cutoff", "", 0, 0, 1).is_none());
    assert!(plugin.register_property("sync", "Sync", "").is_none());
    assert_eq!(plugin.base().parameter_count(), 2);

    let next = plugin.register_int_parameter("voices", "Voices", "", 8, 1, 16).unwrap();
    assert_eq!(next, 2);
}

proptest! {
    #[test]
    fn test_parameter_ids_follow_registration_order(names in prop::collection::vec("[a-d]{1,2}", 1..24)) {
        let mut plugin = InternalPlugin::new("synth", "Synth");
        let mut registered = Vec::new();
        for name in &names {
            let id = plugin.register_float_parameter(name, name, "", 0.0, 0.0, 1.0);
            if registered.contains(name) {
                prop_assert!(id.is_none());
            } else {
                prop_assert_eq!(id, Some(registered.len() as u32));
                registered.push(name.clone());
            }
        }

        prop_assert_eq!(plugin.base().parameter_count(), registered.len());
        for (index, name) in registered.iter().enumerate() {
            let descriptor = plugin.base().parameter_from_name(name).unwrap();
            prop_assert_eq!(descriptor.id() as usize, index);
            prop_assert_eq!(plugin.base().parameter_from_id(descriptor.id()).unwrap().name(), name.as_str());
        }
    }
}
