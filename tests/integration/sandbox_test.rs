//! Integration tests for sandbox launch preparation.

use std::sync::Arc;

use hatch::{
    ErrorKind, HatchConfig, HatchError, HatchOptions, HatchResult, HookResolver, Plugin, Sandbox,
    SandboxEnv, Tap, Value,
};
use hatch_core::config::sandbox::StdioMode;
use hatch_plugin::sandbox::HOOK_SANDBOX_ENVIRONMENT;

use crate::helpers::{self, Recording};

/// Sandbox plugin that forwards `FORWARD_*` keys and sets a flag in dev mode.
#[derive(Debug)]
struct DevEnv;

impl Plugin for DevEnv {
    fn name(&self) -> &str {
        "dev-env"
    }

    fn sandbox(&self) -> bool {
        true
    }

    fn apply(&self, hooks: &HookResolver<'_>) -> HatchResult<()> {
        hooks.host().attach(
            HOOK_SANDBOX_ENVIRONMENT,
            Tap::future("dev-env", |args| async move {
                let env = args
                    .object::<SandboxEnv>("sandbox")
                    .ok_or_else(|| HatchError::plugin("sandbox env missing"))?;
                env.inherit("FORWARD_TOKEN")?;

                let dev = args
                    .get("context")
                    .and_then(|c| c.lookup(["dev"]))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                env.set_opt("APP_DEBUG", dev.then_some("1"))
            }),
        )
    }
}

fn sandbox(dev: bool, plugins: Vec<Arc<dyn Plugin>>) -> Sandbox {
    let config = helpers::stack(vec![helpers::plugin_layer("base", plugins)]);
    Sandbox::new(
        HatchOptions::new("/srv/app").with_dev(dev),
        config,
        HatchConfig::default().sandbox,
    )
    .unwrap()
    .with_parent_env([
        ("PATH", "/usr/bin"),
        ("RUST_LOG", "debug"),
        ("FORWARD_TOKEN", "secret"),
        ("HOME", "/home/dev"),
    ])
}

#[tokio::test]
async fn test_sandbox_plugins_shape_the_child_env() {
    let log = helpers::log();
    let plan = sandbox(
        true,
        vec![Arc::new(DevEnv), Recording::shared("child-only", &log)],
    )
    .prepare("app", vec!["--port".to_string(), "8080".to_string()])
    .await
    .unwrap();

    assert!(helpers::entries(&log).is_empty());
    assert_eq!(plan.args, vec!["--port", "8080"]);
    assert_eq!(plan.stdio, StdioMode::Inherit);

    let env: Vec<(&str, &str)> = plan.env.iter().collect();
    assert_eq!(
        env,
        vec![
            ("APP_DEBUG", "1"),
            ("FORWARD_TOKEN", "secret"),
            ("HATCH_CWD", "/srv/app"),
            ("HATCH_DEV", "true"),
            ("HATCH_PHASE", "default"),
            ("PATH", "/usr/bin"),
            ("RUST_LOG", "debug"),
        ]
    );
}

#[tokio::test]
async fn test_unset_optional_value_is_skipped() {
    let plan = sandbox(false, vec![Arc::new(DevEnv)])
        .prepare("app", Vec::new())
        .await
        .unwrap();

    assert!(!plan.env.contains("APP_DEBUG"));
    assert!(!plan.env.contains("HATCH_DEV"));
    assert!(!plan.env.contains("HOME"));
}

#[test]
fn test_invalid_options_fail_early() {
    let err = Sandbox::new(
        HatchOptions::new(""),
        helpers::stack(Vec::new()),
        HatchConfig::default().sandbox,
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOptions);
}
