//! Integration tests for plugin composition and late-bound hooks.

use std::sync::{Arc, Mutex};

use hatch::{
    ErrorKind, HatchError, HookProxyManager, HookRegistry, HookSlot, PluginComposer, Tap, Value,
};

use crate::helpers::{self, Recording, SERVER};

fn server_hooks() -> Arc<HookRegistry> {
    Arc::new(
        HookRegistry::with_slots([
            ("created", HookSlot::sync(["outlet", "options"])),
            ("run", HookSlot::sequential(["return_value", "options"])),
        ])
        .unwrap(),
    )
}

#[test]
fn test_plugins_compose_and_apply_in_layer_order() {
    let log = helpers::log();
    let config = helpers::stack(vec![
        helpers::plugin_layer(
            "base",
            vec![Recording::shared("A", &log), Recording::shared("B", &log)],
        ),
        helpers::plugin_layer("app", vec![Recording::shared("C", &log)]),
    ])
    .namespace("hatch");

    let plugins = PluginComposer::compose(&config).unwrap();
    let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    let manager = HookProxyManager::new(Arc::new(HookRegistry::new()));
    let applied = PluginComposer::apply_all(&plugins, &manager, |_| true).unwrap();

    assert_eq!(applied, 3);
    assert_eq!(helpers::entries(&log), vec!["A:apply", "B:apply", "C:apply"]);
}

#[test]
fn test_failing_plugin_aborts_composition() {
    let log = helpers::log();
    let plugins = vec![
        Recording::shared("A", &log),
        Arc::new(Recording {
            name: "B",
            watch_server: false,
            fail: true,
            log: log.clone(),
        }) as Arc<dyn hatch::Plugin>,
        Recording::shared("C", &log),
    ];

    let manager = HookProxyManager::new(Arc::new(HookRegistry::new()));
    let err = PluginComposer::apply_all(&plugins, &manager, |_| true).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Plugin);
    assert_eq!(helpers::entries(&log), vec!["A:apply", "B:apply"]);
}

#[test]
fn test_proxy_is_shared_until_promoted() {
    let manager = HookProxyManager::new(Arc::new(HookRegistry::new()));
    let first = manager.resolve(Some(&SERVER));
    let second = manager.resolve(Some(&SERVER));

    assert!(first.is_proxy());
    assert!(first.same_as(&second));

    first.attach("created", Tap::sync("one", |_| Ok(()))).unwrap();
    first.attach("run", Tap::future("two", |_| async { Ok(()) })).unwrap();
    second.attach("created", Tap::sync("three", |_| Ok(()))).unwrap();
    assert_eq!(second.listener_count("created"), 2);

    let real = server_hooks();
    manager.promote(&SERVER, real.clone()).unwrap();

    assert_eq!(real.tap_names("created"), vec!["one", "three"]);
    assert_eq!(real.tap_names("run"), vec!["two"]);
    assert!(Arc::ptr_eq(
        manager.resolve(Some(&SERVER)).as_real().unwrap(),
        &real
    ));
}

#[test]
fn test_stale_proxy_handle_forwards_after_promotion() {
    let manager = HookProxyManager::new(Arc::new(HookRegistry::new()));
    let stale = manager.resolve(Some(&SERVER));

    let real = server_hooks();
    manager.promote(&SERVER, real.clone()).unwrap();

    stale.attach("created", Tap::sync("late", |_| Ok(()))).unwrap();
    assert_eq!(real.tap_names("created"), vec!["late"]);

    let err = stale
        .attach("teardown", Tap::sync("late", |_| Ok(())))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownHookSlot);
}

#[test]
fn test_promote_rejects_slots_real_hooks_lack() {
    let manager = HookProxyManager::new(Arc::new(HookRegistry::new()));
    manager
        .resolve(Some(&SERVER))
        .attach("shutdown", Tap::sync("x", |_| Ok(())))
        .unwrap();

    let real = server_hooks();
    let err = manager.promote(&SERVER, real.clone()).unwrap_err();

    assert_eq!(err.kind, ErrorKind::ReservedHookNameConflict);
    assert!(err.message.contains("server"));
    assert!(real.tap_names("created").is_empty());
}

#[test]
fn test_second_promotion_conflicts() {
    let manager = HookProxyManager::new(Arc::new(HookRegistry::new()));
    manager.resolve(Some(&SERVER));
    manager.promote(&SERVER, server_hooks()).unwrap();

    let err = manager.promote(&SERVER, server_hooks()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::PromotionConflict);
}

#[tokio::test]
async fn test_sequential_broadcast_stops_at_first_rejection() {
    let hooks = server_hooks();
    let ran = Arc::new(Mutex::new(Vec::new()));

    let by_l1 = ran.clone();
    hooks
        .attach(
            "run",
            Tap::future("l1", move |_| {
                let ran = by_l1.clone();
                async move {
                    tokio::task::yield_now().await;
                    ran.lock().unwrap().push("l1");
                    Err(HatchError::plugin("l1 rejected"))
                }
            }),
        )
        .unwrap();

    let by_l2 = ran.clone();
    hooks
        .attach(
            "run",
            Tap::future("l2", move |_| {
                let ran = by_l2.clone();
                async move {
                    ran.lock().unwrap().push("l2");
                    Ok(())
                }
            }),
        )
        .unwrap();

    let err = hooks
        .broadcast_async("run", vec![Value::Null, Value::Null])
        .await
        .unwrap_err();

    assert_eq!(err.message, "l1 rejected");
    assert_eq!(*ran.lock().unwrap(), vec!["l1"]);
}

#[test]
fn test_host_hooks_are_never_proxied() {
    let host = Arc::new(HookRegistry::with_slots([("start", HookSlot::sync(["options"]))]).unwrap());
    let manager = HookProxyManager::new(host.clone());

    let resolved = manager.resolve(None);
    assert!(!resolved.is_proxy());
    assert!(Arc::ptr_eq(resolved.as_real().unwrap(), &host));

    let err = resolved
        .attach("unknown", Tap::sync("x", |_| Ok(())))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownHookSlot);
}
