//! Variables visible to expressions inside `grab.hcl`.
//!
//! - `env.<NAME>`: process environment
//! - `os.name`, `os.arch`: host platform
//! - `body`, `url`: bare constants for `from = url`

use hcl::eval::Context;
use hcl::{Map, Value};

/// Builds the evaluation context from the current process environment.
#[must_use]
pub fn evaluation_context() -> Context<'static> {
    evaluation_context_with(std::env::vars())
}

/// Builds the evaluation context from an explicit set of variables.
#[must_use]
pub fn evaluation_context_with(
    vars: impl IntoIterator<Item = (String, String)>,
) -> Context<'static> {
    let env: Map<String, Value> = vars
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    let mut os = Map::new();
    os.insert("name".to_string(), Value::from(std::env::consts::OS));
    os.insert("arch".to_string(), Value::from(std::env::consts::ARCH));

    let mut ctx = Context::new();
    ctx.declare_var("env", Value::Object(env));
    ctx.declare_var("os", Value::Object(os));
    ctx.declare_var("body", Value::from("body"));
    ctx.declare_var("url", Value::from("url"));
    ctx
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hcl::eval::Evaluate;

    fn eval(ctx: &Context<'_>, attr: &str) -> Value {
        let body = hcl::parse(&format!("value = {attr}")).unwrap();
        let expr = body.attributes().next().unwrap().expr().clone();
        expr.evaluate(ctx).unwrap()
    }

    #[test]
    fn test_env_variables_are_visible() {
        let ctx = evaluation_context_with([("GRAB_HOME".to_string(), "/data".to_string())]);
        assert_eq!(eval(&ctx, "env.GRAB_HOME"), Value::from("/data"));
        assert_eq!(
            eval(&ctx, "\"${env.GRAB_HOME}/media\""),
            Value::from("/data/media")
        );
    }

    #[test]
    fn test_bare_constants_evaluate_to_their_names() {
        let ctx = evaluation_context_with([]);
        assert_eq!(eval(&ctx, "url"), Value::from("url"));
        assert_eq!(eval(&ctx, "body"), Value::from("body"));
    }

    #[test]
    fn test_os_identifiers() {
        let ctx = evaluation_context_with([]);
        assert_eq!(eval(&ctx, "os.name"), Value::from(std::env::consts::OS));
        assert_eq!(eval(&ctx, "os.arch"), Value::from(std::env::consts::ARCH));
    }
}
