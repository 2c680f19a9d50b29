use std::sync::Arc;

use pbac_core::config::{BindingKind, PbacConfig};
use pbac_core::{AccessCheck, AccessDecision, DecisionEngine, expand};
use pbac_notifications::MemoryOutbox;

const CONTROL_TOPIC: &str = "$priv/purpose_management";

fn engine(kind: BindingKind) -> (DecisionEngine, Arc<MemoryOutbox>) {
    let mut config = PbacConfig::default();
    config.binding.kind = kind;
    let outbox = Arc::new(MemoryOutbox::new());
    let engine = DecisionEngine::from_config(&config, outbox.clone()).expect("valid config");
    (engine, outbox)
}

fn deny_code(decision: &AccessDecision) -> Option<&str> {
    decision.deny_reason().map(|reason| reason.code.as_str())
}

#[test]
fn expansion_properties() {
    assert_eq!(expand("plain").as_slice(), ["plain"]);
    assert_eq!(expand("music/jazz/live").as_slice(), ["music/jazz/live"]);
    assert!(expand("").is_empty());
    assert_eq!(
        expand("music/{jazz,rock}").as_slice(),
        ["music/jazz", "music/rock"]
    );
    // First '{' pairs with the first '}', not with its nested partner.
    assert_eq!(expand("a/{b,{c,d}}").as_slice(), ["a/b}", "a/c", "a/d}"]);
}

#[test]
fn scenario_a_compatible_delivery_allowed() {
    let (engine, _) = engine(BindingKind::PerMessage);
    engine
        .registry()
        .store_sp("c1", "T", "music/{jazz,rock}");

    let read = AccessCheck::read("c1", "T").with_property("MP", "music/jazz");
    assert!(engine.check(&read).is_allowed());

    // Same outcome when the MP comes from the registry.
    engine.registry().store_mp("T", "music/jazz");
    assert!(engine.check(&AccessCheck::read("c1", "T")).is_allowed());
}

#[test]
fn scenario_b_incompatible_delivery_denied() {
    let (engine, _) = engine(BindingKind::PerMessage);
    engine
        .registry()
        .store_sp("c1", "T", "music/{jazz,rock}");

    let read = AccessCheck::read("c1", "T").with_property("MP", "sports");
    let decision = engine.check(&read);
    assert!(decision.is_denied());
    assert_eq!(deny_code(&decision), Some("purpose-incompatible"));
}

#[test]
fn scenario_c_subscribe_without_purpose_denied() {
    let (engine, _) = engine(BindingKind::PerMessage);

    let subscribe = AccessCheck::subscribe("c1", "T").with_property("other", "value");
    let decision = engine.check(&subscribe);

    assert_eq!(deny_code(&decision), Some("missing-subscription-purpose"));
    assert!(engine.registry().find_sp_entries("c1", "T").is_empty());
    assert_eq!(engine.registry().stats().subscription_entries, 0);
}

#[test]
fn scenario_d_retroactive_registration_notifies_once() {
    let (engine, outbox) = engine(BindingKind::ControlTopic);

    let subscribe = AccessCheck::subscribe("c1", "T1").with_property("SP", "music");
    assert!(engine.check(&subscribe).is_allowed());

    let register = AccessCheck::write("publisher", CONTROL_TOPIC)
        .with_property("MP", "T1,T2")
        .with_property("MP-Filter", "music")
        .with_property("MP-Retroactive", "true");
    assert!(engine.check(&register).is_allowed());

    let published = outbox.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].client_id, "c1");
    assert_eq!(published[0].topic, "$priv/notifications/c1");
    assert_eq!(published[0].source_topic, "T1");

    // Both topics are registered, and delivery on T1 now passes.
    assert!(engine.registry().find_mp("T1").is_some());
    assert!(engine.registry().find_mp("T2").is_some());
    assert!(engine.check(&AccessCheck::read("c1", "T1")).is_allowed());
}

#[test]
fn delivery_without_registered_mp_denied() {
    for kind in [BindingKind::PerMessage, BindingKind::ControlTopic] {
        let (engine, _) = engine(kind);
        engine.registry().store_sp("c1", "T", "music");

        let decision = engine.check(&AccessCheck::read("c1", "T"));
        assert_eq!(deny_code(&decision), Some("no-message-purpose"), "{kind:?}");
    }
}

#[test]
fn delivery_to_unregistered_subscriber_denied() {
    let (engine, _) = engine(BindingKind::PerMessage);
    engine.registry().store_sp("c2", "T", "music");

    let read = AccessCheck::read("c1", "T").with_property("MP", "music");
    assert!(engine.check(&read).is_denied());
}

#[test]
fn notification_failure_does_not_change_decision() {
    let (engine, outbox) = engine(BindingKind::ControlTopic);
    engine.registry().store_sp("c1", "T1", "music");
    outbox.close();

    let register = AccessCheck::write("publisher", CONTROL_TOPIC)
        .with_property("MP", "T1")
        .with_property("MP-Filter", "music")
        .with_property("MP-Retroactive", "true");

    assert!(engine.check(&register).is_allowed());
    assert!(engine.registry().find_mp("T1").is_some());
    assert_eq!(outbox.stats().failed, 1);
}

#[test]
fn topic_encoded_flow() {
    let (engine, _) = engine(BindingKind::TopicEncoded);

    assert!(
        engine
            .check(&AccessCheck::write("c1", "$priv/SP_registration/T/music"))
            .is_allowed()
    );
    assert!(engine.check(&AccessCheck::subscribe("c1", "T")).is_allowed());
    assert!(
        engine
            .check(&AccessCheck::write("p", "$priv/MP_registration/T/music/jazz"))
            .is_allowed()
    );
    assert!(engine.check(&AccessCheck::write("p", "T")).is_allowed());
    assert!(engine.check(&AccessCheck::read("c1", "T")).is_allowed());

    // Default MP filter "*" matches no declared purpose.
    engine.check(&AccessCheck::write("p", "$priv/MP_registration/U"));
    engine.check(&AccessCheck::write("c1", "$priv/SP_registration/U/music"));
    assert!(engine.check(&AccessCheck::read("c1", "U")).is_denied());
}

#[test]
fn intent_flow() {
    let (engine, _) = engine(BindingKind::Intent);

    let subscribe = AccessCheck::subscribe("c1", "sensors/temp,research/{climate,health}");
    assert!(engine.check(&subscribe).is_allowed());
    assert!(engine.registry().has_sp("c1", "sensors/temp"));

    let plain = AccessCheck::subscribe("c2", "sensors/temp");
    assert!(engine.check(&plain).is_denied());

    let publish = AccessCheck::write("p", "sensors/temp").with_property("MP", "research/health");
    assert!(engine.check(&publish).is_allowed());
    assert!(engine.check(&AccessCheck::read("c1", "sensors/temp")).is_allowed());
    assert!(engine.check(&AccessCheck::read("c2", "sensors/temp")).is_denied());
}

#[test]
fn intent_unsubscribe_revokes_delivery() {
    let (engine, _) = engine(BindingKind::Intent);

    assert!(engine.check(&AccessCheck::subscribe("c1", "T,music")).is_allowed());
    let publish = AccessCheck::write("p", "T").with_property("MP", "music/jazz");
    assert!(engine.check(&publish).is_allowed());
    let delivery = AccessCheck::read("c1", "T").with_property("MP", "music/jazz");
    assert!(engine.check(&delivery).is_allowed());

    assert!(engine.check(&AccessCheck::unsubscribe("c1", "T,music")).is_allowed());

    assert!(!engine.registry().has_sp("c1", "T"));
    let decision = engine.check(&delivery);
    assert_eq!(deny_code(&decision), Some("purpose-incompatible"));
}

#[test]
fn shutdown_releases_everything() {
    let (engine, _) = engine(BindingKind::PerMessage);
    engine.check(&AccessCheck::subscribe("c1", "T").with_property("SP", "music"));
    engine.check(&AccessCheck::write("p", "T").with_property("MP", "music"));

    engine.shutdown();

    let stats = engine.registry().stats();
    assert_eq!(stats.subscription_entries, 0);
    assert_eq!(stats.message_entries, 0);
    assert!(engine.check(&AccessCheck::read("c1", "T")).is_denied());
}

#[test]
fn concurrent_checks_share_one_registry() {
    let (engine, _) = engine(BindingKind::PerMessage);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let engine = &engine;
            scope.spawn(move || {
                let client = format!("c{worker}");
                for i in 0..50 {
                    let topic = format!("T{}", i % 5);
                    let subscribe =
                        AccessCheck::subscribe(&client, &topic).with_property("SP", "music");
                    assert!(engine.check(&subscribe).is_allowed());

                    let read = AccessCheck::read(&client, &topic)
                        .with_property("MP", "music/{jazz,rock}");
                    assert!(engine.check(&read).is_allowed());
                }
            });
        }
    });

    let stats = engine.registry().stats();
    assert_eq!(stats.subscription_entries, 8 * 50);
    assert_eq!(stats.subscription_keys, 8 * 5);
    assert_eq!(engine.registry().subscribers("T0").len(), 8);
}
