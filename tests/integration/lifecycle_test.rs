//! Integration tests for the orchestration lifecycle.

use hatch::{ErrorKind, HatchOptions, HookRegistry, Lifecycle, Tap, Value};

use crate::helpers::{self, Recording, SERVER, Server};

fn lifecycle(config: hatch::LayeredConfig, phase: &str) -> Lifecycle {
    Lifecycle::new(
        HatchOptions::new("/srv/app").with_phase(phase),
        config,
        HookRegistry::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_plugin_hooks_reach_block_created_later() {
    let log = helpers::log();
    let config = helpers::stack(vec![
        helpers::plugin_layer("base", vec![Recording::watching("watcher", &log)])
            .with("hatch.server.port", 3000_i64),
        hatch::ConfigLayer::empty("app")
            .with("hatch.server.host", "0.0.0.0")
            .with("hatch.server.port", 8080_i64),
    ]);

    let mut session = lifecycle(config, "default");
    session.apply_plugins(|_| true).unwrap();
    assert!(!session.manager().is_promoted(&SERVER));

    session.mount(Box::new(Server { log: log.clone() })).unwrap();
    assert!(session.manager().is_promoted(&SERVER));

    let outputs = session.run().await.unwrap();

    assert_eq!(outputs, vec![Value::from("served in default")]);
    assert_eq!(
        helpers::entries(&log),
        vec!["watcher:apply", "watcher:created:0.0.0.0:8080", "server:run"]
    );
}

#[tokio::test]
async fn test_block_sits_out_unsupported_phase() {
    let log = helpers::log();
    let config = helpers::stack(vec![helpers::plugin_layer("base", Vec::new())]);

    let mut session = lifecycle(config, "build");
    session.mount(Box::new(Server { log: log.clone() })).unwrap();

    assert!(session.run().await.unwrap().is_empty());
    assert!(helpers::entries(&log).is_empty());
    assert!(session.blocks()[0].outlet().is_none());
}

#[tokio::test]
async fn test_listener_attached_after_mount_runs() {
    let log = helpers::log();
    let config = helpers::stack(vec![helpers::plugin_layer("base", Vec::new())]);

    let mut session = lifecycle(config, "default");
    session.mount(Box::new(Server { log: log.clone() })).unwrap();

    let seen = log.clone();
    session
        .manager()
        .resolve(Some(&SERVER))
        .attach(
            "run",
            Tap::future("after-run", move |args| {
                let seen = seen.clone();
                async move {
                    let ret = args.get("return_value").and_then(Value::as_str).unwrap_or("");
                    seen.lock().unwrap().push(format!("after-run:{ret}"));
                    Ok(())
                }
            }),
        )
        .unwrap();

    session.run().await.unwrap();
    assert_eq!(
        helpers::entries(&log),
        vec!["server:run", "after-run:served in default"]
    );
}

#[test]
fn test_reset_allows_a_fresh_session() {
    let log = helpers::log();
    let config = helpers::stack(vec![helpers::plugin_layer("base", Vec::new())]);

    let mut session = lifecycle(config, "default");
    session.mount(Box::new(Server { log: log.clone() })).unwrap();
    let err = session
        .mount(Box::new(Server { log: log.clone() }))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PromotionConflict);

    session.reset();
    assert!(session.manager().classes().is_empty());
    session.mount(Box::new(Server { log })).unwrap();
}

#[test]
fn test_invalid_options_are_rejected() {
    let err = Lifecycle::new(
        HatchOptions::new("/srv/app").with_phase(""),
        helpers::stack(Vec::new()),
        HookRegistry::new(),
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOptions);
}
