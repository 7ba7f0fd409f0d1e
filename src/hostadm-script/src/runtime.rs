//! Lua runtime setup.
//!
//! Every runtime gets:
//!
//! - `package.path` prefixed with the configured script directories
//! - a global `hostadm` table (`version`, `vars`, `log`, `sleep`)
//! - a `print` that writes through the process stdout handle, so script
//!   output interleaves correctly with native output

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use hostadm_common::{ConfigId, HostConfig};
use mlua::{Function, Lua, MultiValue, Table};

use crate::marshal;
use crate::Result;

/// Name of the global table exposed to scripts.
pub const GLOBAL_TABLE: &str = "hostadm";

/// An initialised Lua state bound to one host configuration.
pub struct ScriptRuntime {
    lua: Lua,
    config_id: ConfigId,
}

impl ScriptRuntime {
    /// Create a runtime for `config`.
    pub fn new(config: &HostConfig, version: &str) -> Result<Self> {
        let lua = Lua::new();

        set_package_path(&lua, config.script_paths())?;
        install_print(&lua)?;
        install_globals(&lua, config, version)?;

        tracing::debug!("Created script runtime for {:?}", config.id());
        Ok(Self {
            lua,
            config_id: config.id(),
        })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn config_id(&self) -> ConfigId {
        self.config_id
    }

    /// Release registry values and garbage the last call left behind.
    ///
    /// Globals and `package.loaded` survive, so later checkouts share them.
    pub(crate) fn reset_frame(&self) {
        self.lua.expire_registry_values();
        if let Err(e) = self.lua.gc_collect() {
            tracing::warn!("Script garbage collection failed: {e}");
        }
    }
}

fn set_package_path(lua: &Lua, script_paths: &[impl AsRef<Path>]) -> Result<()> {
    let package: Table = lua.globals().get("package")?;
    let current: String = package.get("path")?;

    let mut path = String::new();
    for dir in script_paths {
        let dir = dir.as_ref().display();
        path.push_str(&format!("{dir}/?.lua;{dir}/?/init.lua;"));
    }
    path.push_str(&current);

    package.set("path", path)?;
    Ok(())
}

fn install_print(lua: &Lua) -> Result<()> {
    let print = lua.create_function(|lua, args: MultiValue| {
        let tostring: Function = lua.globals().get("tostring")?;
        let mut parts = Vec::with_capacity(args.len());
        for value in args {
            parts.push(tostring.call::<String>(value)?);
        }

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", parts.join("\t")).map_err(mlua::Error::external)?;
        Ok(())
    })?;
    lua.globals().set("print", print)?;
    Ok(())
}

fn install_globals(lua: &Lua, config: &HostConfig, version: &str) -> Result<()> {
    let table = lua.create_table()?;
    table.set("version", version)?;
    table.set("vars", marshal::vars_to_lua(lua, config.vars())?)?;

    let log = lua.create_function(|_, (level, message): (String, String)| {
        match level.as_str() {
            "error" => tracing::error!(target: "hostadm::script", "{message}"),
            "warn" | "warning" => tracing::warn!(target: "hostadm::script", "{message}"),
            "debug" => tracing::debug!(target: "hostadm::script", "{message}"),
            "trace" => tracing::trace!(target: "hostadm::script", "{message}"),
            _ => tracing::info!(target: "hostadm::script", "{message}"),
        }
        Ok(())
    })?;
    table.set("log", log)?;

    let sleep = lua.create_async_function(|_, millis: u64| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(())
    })?;
    table.set("sleep", sleep)?;

    lua.globals().set(GLOBAL_TABLE, table)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostadm_common::{ConfigValue, Variables};

    fn config() -> HostConfig {
        let vars = Variables::from_assignments(["SCRIPTDIR=/opt/hostadm/lua", "MODE=test"]).unwrap();
        HostConfig::from_document(ConfigValue::empty_mapping(), vars)
    }

    #[test]
    fn test_globals_installed() {
        let runtime = ScriptRuntime::new(&config(), "1.2.3").unwrap();
        let lua = runtime.lua();

        let version: String = lua.load("return hostadm.version").eval().unwrap();
        let mode: String = lua.load("return hostadm.vars.MODE").eval().unwrap();
        assert_eq!(version, "1.2.3");
        assert_eq!(mode, "test");

        lua.load(r#"hostadm.log("debug", "hello from lua")"#)
            .exec()
            .unwrap();
    }

    #[test]
    fn test_package_path_prefixed() {
        let runtime = ScriptRuntime::new(&config(), "1.2.3").unwrap();
        let path: String = runtime.lua().load("return package.path").eval().unwrap();
        assert!(path.starts_with("/opt/hostadm/lua/?.lua;/opt/hostadm/lua/?/init.lua;"));
    }

    #[tokio::test]
    async fn test_sleep_suspends() {
        let runtime = ScriptRuntime::new(&config(), "1.2.3").unwrap();
        let value: i64 = runtime
            .lua()
            .load("hostadm.sleep(1); return 7")
            .eval_async()
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_reset_frame_keeps_runtime_usable() {
        let runtime = ScriptRuntime::new(&config(), "1.2.3").unwrap();
        runtime.lua().load("scratch = {1, 2, 3}").exec().unwrap();
        runtime.reset_frame();
        let n: i64 = runtime.lua().load("return #scratch").eval().unwrap();
        assert_eq!(n, 3);
    }
}
