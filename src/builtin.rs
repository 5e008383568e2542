//! Built-in module kinds used by the `modreg` binary.
//!
//! The binary's context type is a JSON value supplied on the command line.
//!
//! | kind       | init hook                          | executable                          |
//! |------------|------------------------------------|-------------------------------------|
//! | `echo`     | –                                  | returns its arguments               |
//! | `constant` | –                                  | returns `settings.value`            |
//! | `announce` | logs `settings.message` + context  | –                                   |
//! | `template` | –                                  | fills `{key}` from the argument map |

use serde_json::Value;

use crate::error::BoxError;
use crate::factory::FactoryTable;
use crate::module::ModuleParts;

/// Factory table with every built-in kind registered.
pub fn builtin_factories() -> FactoryTable<Value> {
    let mut table = FactoryTable::new();
    table.register_fn("echo", echo);
    table.register_fn("constant", constant);
    table.register_fn("announce", announce);
    table.register_fn("template", template);
    table
}

fn echo(_settings: &Value) -> Result<ModuleParts<Value>, BoxError> {
    Ok(ModuleParts::new().with_executable(|args: Value| Ok(args)))
}

fn constant(settings: &Value) -> Result<ModuleParts<Value>, BoxError> {
    let value = settings
        .get("value")
        .cloned()
        .ok_or("constant: settings.value is required")?;
    Ok(ModuleParts::new().with_executable(move |_| Ok(value.clone())))
}

fn announce(settings: &Value) -> Result<ModuleParts<Value>, BoxError> {
    let message = settings
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("module initialized")
        .to_string();
    Ok(ModuleParts::new().with_init(move |ctx: &Value| {
        tracing::info!(context = %ctx, "{}", message);
        Ok(())
    }))
}

fn template(settings: &Value) -> Result<ModuleParts<Value>, BoxError> {
    let template = settings
        .get("template")
        .and_then(Value::as_str)
        .ok_or("template: settings.template must be a string")?
        .to_string();
    Ok(ModuleParts::new().with_executable(move |args: Value| {
        let map = args.as_object().ok_or("template: arguments must be an object")?;
        let mut out = template.clone();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&format!("{{{}}}", key), &text);
        }
        Ok(Value::String(out))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(kind: &str, settings: Value) -> Result<ModuleParts<Value>, BoxError> {
        builtin_factories().get(kind).unwrap().build(&settings)
    }

    #[test]
    fn test_all_kinds_registered() {
        assert_eq!(
            builtin_factories().names(),
            vec!["announce", "constant", "echo", "template"]
        );
    }

    #[test]
    fn test_echo_returns_args() {
        let exec = build("echo", Value::Null).unwrap().executable.unwrap();
        assert_eq!(exec.execute(json!([1, 2])).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_constant_requires_value() {
        assert!(build("constant", json!({})).is_err());
        let exec = build("constant", json!({"value": "x"})).unwrap().executable.unwrap();
        assert_eq!(exec.execute(json!("ignored")).unwrap(), json!("x"));
    }

    #[test]
    fn test_announce_has_only_init() {
        let parts = build("announce", json!({"message": "hi"})).unwrap();
        assert!(parts.executable.is_none());
        parts.init_hook.unwrap().init(&json!({"env": "test"})).unwrap();
    }

    #[test]
    fn test_template_substitutes_placeholders() {
        let exec = build("template", json!({"template": "hello {name}, you are {age}"}))
            .unwrap()
            .executable
            .unwrap();
        let out = exec.execute(json!({"name": "ada", "age": 36})).unwrap();
        assert_eq!(out, json!("hello ada, you are 36"));
    }

    #[test]
    fn test_template_rejects_non_object_args() {
        let exec = build("template", json!({"template": "{x}"})).unwrap().executable.unwrap();
        assert!(exec.execute(json!("nope")).is_err());
    }

    #[test]
    fn test_template_requires_template_string() {
        assert!(build("template", json!({"template": 5})).is_err());
    }
}
