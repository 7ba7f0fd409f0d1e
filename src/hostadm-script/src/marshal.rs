//! Conversion of host values into Lua values.

use hostadm_common::{ConfigValue, Variables};
use mlua::{Lua, Table, Value};

/// Convert a configuration node recursively.
///
/// Mappings become keyed tables, sequences become 1-indexed tables and
/// scalars map onto the matching Lua type. `Null` becomes `nil`.
pub fn config_to_lua(lua: &Lua, value: &ConfigValue) -> mlua::Result<Value> {
    let value = match value {
        ConfigValue::Null => Value::Nil,
        ConfigValue::Boolean(b) => Value::Boolean(*b),
        ConfigValue::Integer(i) => Value::Integer(*i),
        ConfigValue::Float(f) => Value::Number(*f),
        ConfigValue::String(s) => Value::String(lua.create_string(s)?),
        ConfigValue::Sequence(items) => {
            let table = lua.create_table_with_capacity(items.len(), 0)?;
            for (index, item) in items.iter().enumerate() {
                table.raw_set(index + 1, config_to_lua(lua, item)?)?;
            }
            Value::Table(table)
        }
        ConfigValue::Mapping(map) => {
            let table = lua.create_table_with_capacity(0, map.len())?;
            for (key, item) in map {
                table.raw_set(key.as_str(), config_to_lua(lua, item)?)?;
            }
            Value::Table(table)
        }
    };
    Ok(value)
}

/// Handler arguments as a 1-indexed sequence.
pub fn args_to_lua(lua: &Lua, args: &[String]) -> mlua::Result<Table> {
    lua.create_sequence_from(args.iter().map(String::as_str))
}

/// The `--var` mapping as a keyed table.
pub fn vars_to_lua(lua: &Lua, vars: &Variables) -> mlua::Result<Table> {
    lua.create_table_from(vars.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> ConfigValue {
        let value: toml::Value = toml::from_str(
            r#"
ratio = 0.5
[server]
name = "mx1"
ports = [25, 587]
enabled = true
"#,
        )
        .unwrap();
        ConfigValue::from(value)
    }

    #[test]
    fn test_config_round_trip_through_lua() {
        let lua = Lua::new();
        lua.globals()
            .set("cfg", config_to_lua(&lua, &document()).unwrap())
            .unwrap();

        let name: String = lua.load("return cfg.server.name").eval().unwrap();
        let port: i64 = lua.load("return cfg.server.ports[2]").eval().unwrap();
        let count: i64 = lua.load("return #cfg.server.ports").eval().unwrap();
        let enabled: bool = lua.load("return cfg.server.enabled").eval().unwrap();
        let ratio: f64 = lua.load("return cfg.ratio").eval().unwrap();

        assert_eq!(name, "mx1");
        assert_eq!(port, 587);
        assert_eq!(count, 2);
        assert!(enabled);
        assert_eq!(ratio, 0.5);
    }

    #[test]
    fn test_null_is_nil() {
        let lua = Lua::new();
        let value = config_to_lua(&lua, &ConfigValue::Null).unwrap();
        assert!(value.is_nil());
    }

    #[test]
    fn test_args_sequence() {
        let lua = Lua::new();
        let args = vec!["-v".to_string(), "file.eml".to_string()];
        lua.globals().set("args", args_to_lua(&lua, &args).unwrap()).unwrap();

        let joined: String = lua.load("return table.concat(args, ',')").eval().unwrap();
        assert_eq!(joined, "-v,file.eml");
    }

    #[test]
    fn test_vars_table() {
        let lua = Lua::new();
        let vars = Variables::from_assignments(["CONFDIR=/etc/x", "MODE=test"]).unwrap();
        lua.globals().set("vars", vars_to_lua(&lua, &vars).unwrap()).unwrap();

        let mode: String = lua.load("return vars.MODE").eval().unwrap();
        assert_eq!(mode, "test");
    }
}
