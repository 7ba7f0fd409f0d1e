//! Script bridge error types.

use thiserror::Error;

/// Return code of a runtime error raised while running a chunk.
pub const LUA_ERRRUN: i32 = 2;
/// Return code of a chunk that failed to compile.
pub const LUA_ERRSYNTAX: i32 = 3;
/// Return code of an allocation failure.
pub const LUA_ERRMEM: i32 = 4;

/// Script bridge errors.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The module could not be required.
    #[error("Cannot load script module '{module}': {message}")]
    Load { module: String, message: String },

    /// The module did not yield a callable handler.
    #[error("Script module '{module}' must return function and not {found}")]
    HandlerType { module: String, found: String },

    /// The handler raised an error.
    #[error("Call to script failed ({code}): {message}")]
    Execution { code: i32, message: String },

    /// The runtime itself failed (allocation, marshaling, setup).
    ///
    /// Kept as rendered text: `mlua::Error` is not `Send + Sync`.
    #[error("Script runtime error: {0}")]
    Runtime(String),
}

impl From<mlua::Error> for ScriptError {
    fn from(err: mlua::Error) -> Self {
        Self::Runtime(err.to_string())
    }
}

impl ScriptError {
    /// Create a load error.
    pub fn load_error(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create a handler type error.
    pub fn handler_type(module: impl Into<String>, found: impl Into<String>) -> Self {
        Self::HandlerType {
            module: module.into(),
            found: found.into(),
        }
    }

    /// Create an execution error from the raw return code and message.
    pub fn execution(code: i32, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
        }
    }
}

/// Raw Lua status code matching an mlua error.
pub fn return_code(err: &mlua::Error) -> i32 {
    match err {
        mlua::Error::SyntaxError { .. } => LUA_ERRSYNTAX,
        mlua::Error::MemoryError(_) => LUA_ERRMEM,
        mlua::Error::CallbackError { cause, .. } => return_code(cause),
        mlua::Error::WithContext { cause, .. } => return_code(cause),
        _ => LUA_ERRRUN,
    }
}

/// Type name of `value` as Lua's `type()` reports it.
pub fn lua_type_name(value: &mlua::Value) -> &'static str {
    match value {
        mlua::Value::Integer(_) | mlua::Value::Number(_) => "number",
        mlua::Value::LightUserData(_) | mlua::Value::UserData(_) => "userdata",
        other => other.type_name(),
    }
}

/// Result type alias for script operations.
pub type Result<T> = std::result::Result<T, ScriptError>;
