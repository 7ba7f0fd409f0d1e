//! Script bridge: runs script commands inside pooled Lua runtimes.

use async_trait::async_trait;
use hostadm_commands::help::format_listing_line;
use hostadm_commands::{ScriptEntry, ScriptHost};
use hostadm_common::{ConfigValue, HostConfig};
use mlua::{Function, Lua, MultiValue, Table, Value};

use crate::error::{self, ScriptError};
use crate::marshal;
use crate::pool::RuntimePool;
use crate::runtime::GLOBAL_TABLE;
use crate::Result;

/// State of one bridge call.
///
/// Owns the forwarded arguments (the display name in `argv[0]` is not
/// forwarded) and refers to the configuration handed to the handler.
#[derive(Debug)]
pub struct InvocationContext<'c> {
    args: Vec<String>,
    config: &'c ConfigValue,
    failure: Option<(i32, String)>,
}

impl<'c> InvocationContext<'c> {
    fn new(argv: &[String], config: &'c ConfigValue) -> Self {
        Self {
            args: argv.iter().skip(1).cloned().collect(),
            config,
            failure: None,
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn failure(&self) -> Option<&(i32, String)> {
        self.failure.as_ref()
    }

    /// Error callback of the handler call.
    fn on_error(&mut self, code: i32, message: String) {
        tracing::debug!("call to {GLOBAL_TABLE} lua script failed ({code}): {message}");
        self.failure = Some((code, message));
    }

    fn into_error(self) -> Option<ScriptError> {
        self.failure
            .map(|(code, message)| ScriptError::execution(code, message))
    }
}

/// Runs script commands on behalf of the dispatcher.
pub struct ScriptBridge {
    pool: RuntimePool,
    config: HostConfig,
}

impl ScriptBridge {
    pub fn new(config: HostConfig, version: impl Into<String>) -> Self {
        Self {
            pool: RuntimePool::new(version),
            config,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn pool(&self) -> &RuntimePool {
        &self.pool
    }

    /// Require `module_path` and call its handler with `args[1..]` and
    /// `config`.
    ///
    /// With `as_subcommand` the module is looked up under the `hostadm.`
    /// namespace. The module must return a function or a table whose
    /// `handler` field is a function.
    pub async fn invoke(
        &self,
        args: &[String],
        config: &ConfigValue,
        module_path: &str,
        as_subcommand: bool,
    ) -> Result<()> {
        let runtime = self.pool.acquire(&self.config)?;
        let lua = runtime.lua();

        let handler = match load_module(lua, module_path, as_subcommand)? {
            Value::Table(module) => module.get::<Value>("handler")?,
            other => other,
        };
        let Value::Function(handler) = handler else {
            return Err(ScriptError::handler_type(
                module_path,
                error::lua_type_name(&handler),
            ));
        };

        let mut ctx = InvocationContext::new(args, config);
        let lua_args = marshal::args_to_lua(lua, ctx.args())?;
        let lua_config = marshal::config_to_lua(lua, ctx.config)?;

        tracing::debug!(
            "Calling {} with {} argument(s)",
            require_name(module_path, as_subcommand),
            ctx.args().len()
        );

        if let Err(e) = handler.call_async::<MultiValue>((lua_args, lua_config)).await {
            ctx.on_error(error::return_code(&e), e.to_string());
        }

        match ctx.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Print help for a script command.
    ///
    /// A `help(full, name)` function in the module table prints its own
    /// text. Otherwise the `description` field gives the listing line and
    /// `usage` (falling back to `description`) the full help.
    pub async fn describe(&self, name: &str, entry: &ScriptEntry, full: bool) -> Result<()> {
        let runtime = self.pool.acquire(&self.config)?;
        let lua = runtime.lua();

        let module = match load_module(lua, &entry.module_path, entry.as_subcommand)? {
            Value::Table(module) => Some(module),
            Value::Function(_) => None,
            other => {
                return Err(ScriptError::handler_type(
                    &entry.module_path,
                    error::lua_type_name(&other),
                ));
            }
        };

        if let Some(module) = &module {
            if let Value::Function(help) = module.get::<Value>("help")? {
                help.call_async::<MultiValue>((full, name))
                    .await
                    .map_err(|e| ScriptError::execution(error::return_code(&e), e.to_string()))?;
                return Ok(());
            }
        }

        let description = text_field(module.as_ref(), "description")?;
        if full {
            let usage = text_field(module.as_ref(), "usage")?;
            println!("{}", usage.or(description).unwrap_or_default());
        } else {
            println!(
                "{}",
                format_listing_line(name, description.as_deref().unwrap_or_default())
            );
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ScriptHost for ScriptBridge {
    async fn help(&self, name: &str, entry: &ScriptEntry, full: bool) -> anyhow::Result<()> {
        self.describe(name, entry, full).await?;
        Ok(())
    }

    async fn run(&self, entry: &ScriptEntry, args: &[String]) -> anyhow::Result<()> {
        self.invoke(
            args,
            self.config.document(),
            &entry.module_path,
            entry.as_subcommand,
        )
        .await?;
        Ok(())
    }
}

/// Module name passed to `require`.
pub fn require_name(module_path: &str, as_subcommand: bool) -> String {
    if as_subcommand {
        format!("{GLOBAL_TABLE}.{module_path}")
    } else {
        module_path.to_string()
    }
}

/// `require` the module and return its value. Anything other than a table or
/// a function is rejected.
pub(crate) fn load_module(lua: &Lua, module_path: &str, as_subcommand: bool) -> Result<Value> {
    let name = require_name(module_path, as_subcommand);
    let require: Function = lua.globals().get("require")?;

    let value = require.call::<Value>(name.as_str()).map_err(|e| {
        tracing::debug!("cannot execute lua script require \"{name}\": {e}");
        ScriptError::load_error(module_path, e.to_string())
    })?;

    match value {
        Value::Table(_) | Value::Function(_) => Ok(value),
        other => Err(ScriptError::load_error(
            module_path,
            format!("module returned {}", error::lua_type_name(&other)),
        )),
    }
}

/// Optional string field of a module table.
pub(crate) fn text_field(module: Option<&Table>, key: &str) -> Result<Option<String>> {
    match module {
        Some(module) => Ok(module.get::<Option<String>>(key)?),
        None => Ok(None),
    }
}
