//! Integration tests for the script bridge, runtime pool and discovery.

use std::path::{Path, PathBuf};

use hostadm_commands::{CommandFlags, ScriptEntry, ScriptHost};
use hostadm_common::{ConfigValue, HostConfig, Variables};
use hostadm_script::error::LUA_ERRRUN;
use hostadm_script::{ScriptBridge, ScriptError, discover_scripts};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_script(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn bridge_for(root: &Path) -> ScriptBridge {
    let document: toml::Value = toml::from_str(
        r#"
[server]
name = "mx1"
ports = [25, 587]
"#,
    )
    .unwrap();
    let vars = Variables::from_assignments([format!("SCRIPTDIR={}", root.display())]).unwrap();
    let config = HostConfig::from_document(ConfigValue::from(document), vars);
    ScriptBridge::new(config, "9.9.9")
}

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Read a global left behind by a handler, through the pooled runtime.
fn global_string(bridge: &ScriptBridge, name: &str) -> Option<String> {
    let runtime = bridge.pool().acquire(bridge.config()).unwrap();
    runtime.lua().globals().get::<Option<String>>(name).unwrap()
}

fn assert_pool_balanced(bridge: &ScriptBridge) {
    let stats = bridge.pool().stats();
    assert_eq!(stats.acquired, stats.released, "{stats:?}");
}

// ============================================================================
// INVOCATION
// ============================================================================

mod invoke_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_handler_receives_args_and_config() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/scan.lua",
            r#"
return {
  handler = function(args, config)
    last_args = table.concat(args, " ")
    last_name = config.server.name .. ":" .. config.server.ports[2]
  end,
}
"#,
        );
        let bridge = bridge_for(dir.path());
        let document = bridge.config().document().clone();

        bridge
            .invoke(&argv(&["hostadm scan", "-v", "msg.eml"]), &document, "scan", true)
            .await
            .unwrap();

        assert_pool_balanced(&bridge);
        assert_eq!(global_string(&bridge, "last_args").as_deref(), Some("-v msg.eml"));
        assert_eq!(global_string(&bridge, "last_name").as_deref(), Some("mx1:587"));
        assert_eq!(bridge.pool().stats().created, 1);
    }

    #[tokio::test]
    async fn test_bare_function_module() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/ping.lua",
            "return function(args) pinged = tostring(#args) end\n",
        );
        let bridge = bridge_for(dir.path());

        bridge
            .invoke(&argv(&["hostadm ping"]), &ConfigValue::Null, "ping", true)
            .await
            .unwrap();
        assert_eq!(global_string(&bridge, "pinged").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_missing_handler_is_type_error() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/empty.lua",
            "return { description = \"no handler here\" }\n",
        );
        let bridge = bridge_for(dir.path());

        let err = bridge
            .invoke(&argv(&["hostadm empty"]), &ConfigValue::Null, "empty", true)
            .await
            .unwrap_err();

        assert!(
            matches!(err, ScriptError::HandlerType { ref module, ref found } if module == "empty" && found == "nil")
        );
        assert_pool_balanced(&bridge);
    }

    #[tokio::test]
    async fn test_missing_module_is_load_error() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_for(dir.path());

        let err = bridge
            .invoke(&argv(&["hostadm nope"]), &ConfigValue::Null, "nope", true)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::Load { ref module, .. } if module == "nope"));
        assert_pool_balanced(&bridge);
    }

    #[tokio::test]
    async fn test_scalar_module_is_load_error() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "hostadm/answer.lua", "return 42\n");
        let bridge = bridge_for(dir.path());

        let err = bridge
            .invoke(&argv(&["hostadm answer"]), &ConfigValue::Null, "answer", true)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("module returned number"));
    }

    #[tokio::test]
    async fn test_handler_error_is_execution_error() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/fail.lua",
            "return { handler = function() error(\"boom\") end }\n",
        );
        let bridge = bridge_for(dir.path());

        let err = bridge
            .invoke(&argv(&["hostadm fail"]), &ConfigValue::Null, "fail", true)
            .await
            .unwrap_err();

        match err {
            ScriptError::Execution { code, message } => {
                assert_eq!(code, LUA_ERRRUN);
                assert!(message.contains("boom"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_pool_balanced(&bridge);
    }

    #[tokio::test]
    async fn test_handler_may_suspend() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/slow.lua",
            r#"
return {
  handler = function()
    hostadm.sleep(5)
    slept = "yes"
  end,
}
"#,
        );
        let bridge = bridge_for(dir.path());

        bridge
            .invoke(&argv(&["hostadm slow"]), &ConfigValue::Null, "slow", true)
            .await
            .unwrap();
        assert_eq!(global_string(&bridge, "slept").as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn test_plain_module_outside_namespace() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "tools/cleanup.lua",
            "return function(args) cleaned = args[1] end\n",
        );
        let bridge = bridge_for(dir.path());

        bridge
            .run(
                &ScriptEntry::plain("tools.cleanup"),
                &argv(&["hostadm exec tools.cleanup", "/var/tmp"]),
            )
            .await
            .unwrap();
        assert_eq!(global_string(&bridge, "cleaned").as_deref(), Some("/var/tmp"));
    }

    #[tokio::test]
    async fn test_host_run_reports_error_after_suspend() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/late.lua",
            "return function() hostadm.sleep(2); error(\"late boom\") end\n",
        );
        let bridge = bridge_for(dir.path());

        let err = bridge
            .run(&ScriptEntry::subcommand("late"), &argv(&["hostadm late"]))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Call to script failed (2):"), "{message}");
        assert!(message.contains("late boom"), "{message}");
        assert_pool_balanced(&bridge);
    }

    #[tokio::test]
    async fn test_host_help_reports_bad_module() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "hostadm/answer.lua", "return 42\n");
        let bridge = bridge_for(dir.path());

        let err = bridge
            .help("answer", &ScriptEntry::subcommand("answer"), false)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Cannot load script module 'answer': module returned number"
        );
        assert_pool_balanced(&bridge);
    }

    #[tokio::test]
    async fn test_help_entry_point() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/scan.lua",
            r#"
return {
  help = function(full, name) helped = tostring(full) .. ":" .. name end,
  handler = function() end,
}
"#,
        );
        let bridge = bridge_for(dir.path());

        bridge
            .help("scan", &ScriptEntry::subcommand("scan"), true)
            .await
            .unwrap();
        assert_eq!(global_string(&bridge, "helped").as_deref(), Some("true:scan"));
        assert_pool_balanced(&bridge);
    }
}

// ============================================================================
// DISCOVERY
// ============================================================================

mod discovery_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_discover_commands() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "hostadm/bare.lua", "return function() end\n");
        write_script(dir.path(), "hostadm/broken.lua", "return {\n");
        write_script(
            dir.path(),
            "hostadm/hidden.lua",
            "return { hidden = true, handler = function() end }\n",
        );
        write_script(dir.path(), "hostadm/number.lua", "return 1\n");
        write_script(
            dir.path(),
            "hostadm/scan.lua",
            r#"return { aliases = { "sc", "check" }, description = "Scan", handler = function() end }"#,
        );
        write_script(dir.path(), "hostadm/notes.txt", "not a script");
        let bridge = bridge_for(dir.path());

        let commands = bridge.discover_commands().await;
        let names: Vec<&str> = commands.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["bare", "hidden", "scan"]);

        assert!(commands.iter().all(|c| c.is_script_sourced()));
        assert!(commands[1].flags().contains(CommandFlags::NO_HELP));
        assert_eq!(commands[2].aliases(), &["sc".to_string(), "check".to_string()]);
        assert_pool_balanced(&bridge);
    }

    #[tokio::test]
    async fn test_custom_name_keeps_module_path() {
        let dir = TempDir::new().unwrap();
        write_script(
            dir.path(),
            "hostadm/sig.lua",
            "return { name = \"signtool\", handler = function() end }\n",
        );
        let bridge = bridge_for(dir.path());

        let commands = bridge.discover_commands().await;
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name(), "signtool");
        assert!(matches!(
            commands[0].kind(),
            hostadm_commands::CommandKind::Script(entry) if *entry == ScriptEntry::subcommand("sig")
        ));
    }

    #[tokio::test]
    async fn test_earlier_directory_shadows_later() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_script(first.path(), "hostadm/scan.lua", "return function() end\n");
        write_script(second.path(), "hostadm/scan.lua", "return function() end\n");
        write_script(second.path(), "hostadm/fetch.lua", "return function() end\n");

        let dirs: Vec<PathBuf> = vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
            first.path().join("missing"),
        ];
        let found = discover_scripts(&dirs).await;

        let stems: Vec<&str> = found.iter().map(|s| s.stem.as_str()).collect();
        assert_eq!(stems, vec!["scan", "fetch"]);
        assert!(found[0].path.starts_with(first.path()));
    }
}
