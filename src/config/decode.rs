//! Structural decoding of a parsed HCL body into the typed model.
//!
//! Every block is checked against its schema (known attributes, known child
//! blocks, label arity, cardinality) before its attributes are evaluated.
//! Error subjects are dotted paths such as `site "example".asset "image".pattern`.

use std::collections::{BTreeMap, HashSet};

use hcl::eval::{Context, Evaluate};
use hcl::{Attribute, Block, Body, Expression, Value};

use super::error::ConfigError;
use super::model::{
    Asset, Config, Global, Info, NetworkOverride, RootNetwork, Site, Subdirectory, Transform,
};

const MAX_TRANSFORMS: usize = 2;

/// Decodes the top-level body of a configuration file.
pub(crate) fn decode(body: &Body, ctx: &Context<'_>) -> Result<Config, ConfigError> {
    let root = Scope::new(body, String::new());
    root.check(&[], &["global", "site"])?;

    let global = match root.at_most_one("global")? {
        Some(block) => decode_global(block, ctx)?,
        None => {
            return Err(ConfigError::invalid(
                "Missing global block",
                "A \"global\" block is required.",
                "",
            ));
        }
    };

    let sites = root
        .blocks("site")
        .map(|block| decode_site(block, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    if sites.is_empty() {
        return Err(ConfigError::invalid(
            "Insufficient site blocks",
            "At least 1 \"site\" blocks are required.",
            "",
        ));
    }

    Ok(Config { global, sites })
}

fn decode_global(block: &Block, ctx: &Context<'_>) -> Result<Global, ConfigError> {
    no_labels(block, "")?;
    let scope = Scope::new(block.body(), "global".to_string());
    scope.check(&["location"], &["network"])?;

    let location = scope.required_string("location", ctx)?;
    let network = scope
        .at_most_one("network")?
        .map(|block| decode_network(block, ctx, &scope.subject, false))
        .transpose()?
        .map(|net| RootNetwork {
            timeout: net.timeout,
            retries: net.retries,
            headers: net.headers,
        });

    Ok(Global { location, network })
}

fn decode_site(block: &Block, ctx: &Context<'_>) -> Result<Site, ConfigError> {
    let name = single_label(block, "")?;
    let scope = Scope::new(block.body(), format!("site {name:?}"));
    scope.check(&["test"], &["network", "subdirectory", "asset", "info"])?;

    let test = scope.required_string("test", ctx)?;
    let network = scope
        .at_most_one("network")?
        .map(|block| decode_network(block, ctx, &scope.subject, true))
        .transpose()?;
    let subdirectory = scope
        .at_most_one("subdirectory")?
        .map(|block| decode_subdirectory(block, ctx, &scope.subject))
        .transpose()?;
    let assets = scope
        .blocks("asset")
        .map(|block| decode_asset(block, ctx, &scope.subject))
        .collect::<Result<Vec<_>, _>>()?;
    let infos = scope
        .blocks("info")
        .map(|block| decode_info(block, ctx, &scope.subject))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Site {
        name,
        test,
        network,
        subdirectory,
        assets,
        infos,
        urls: Vec::new(),
        info_map: BTreeMap::new(),
    })
}

fn decode_asset(block: &Block, ctx: &Context<'_>, parent: &str) -> Result<Asset, ConfigError> {
    let name = single_label(block, parent)?;
    let scope = Scope::new(block.body(), join(parent, &format!("asset {name:?}")));
    scope.check(&["pattern", "capture", "find_all"], &["network", "transform"])?;

    let pattern = scope.required_string("pattern", ctx)?;
    let capture = scope.required_string("capture", ctx)?;
    let find_all = scope.boolean("find_all", ctx)?.unwrap_or(false);
    let network = scope
        .at_most_one("network")?
        .map(|block| decode_network(block, ctx, &scope.subject, true))
        .transpose()?;

    let transform_blocks: Vec<&Block> = scope.blocks("transform").collect();
    if transform_blocks.len() > MAX_TRANSFORMS {
        return Err(ConfigError::invalid(
            "Too many transform blocks",
            format!("No more than {MAX_TRANSFORMS} \"transform\" blocks are allowed."),
            scope.subject.clone(),
        ));
    }
    let transforms = transform_blocks
        .into_iter()
        .map(|block| decode_transform(block, ctx, &scope.subject))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Asset {
        name,
        pattern,
        capture,
        find_all,
        network,
        transforms,
        downloads: BTreeMap::new(),
    })
}

fn decode_transform(
    block: &Block,
    ctx: &Context<'_>,
    parent: &str,
) -> Result<Transform, ConfigError> {
    let label = single_label(block, parent)?;
    let scope = Scope::new(block.body(), join(parent, &format!("transform {label:?}")));
    scope.check(&["pattern", "replace"], &[])?;

    Ok(Transform {
        label,
        pattern: scope.required_string("pattern", ctx)?,
        replace: scope.required_string("replace", ctx)?,
    })
}

fn decode_info(block: &Block, ctx: &Context<'_>, parent: &str) -> Result<Info, ConfigError> {
    let name = single_label(block, parent)?;
    let scope = Scope::new(block.body(), join(parent, &format!("info {name:?}")));
    scope.check(&["pattern", "capture"], &[])?;

    Ok(Info {
        name,
        pattern: scope.required_string("pattern", ctx)?,
        capture: scope.required_string("capture", ctx)?,
    })
}

fn decode_subdirectory(
    block: &Block,
    ctx: &Context<'_>,
    parent: &str,
) -> Result<Subdirectory, ConfigError> {
    no_labels(block, parent)?;
    let scope = Scope::new(block.body(), join(parent, "subdirectory"));
    scope.check(&["pattern", "capture", "from"], &[])?;

    Ok(Subdirectory {
        pattern: scope.required_string("pattern", ctx)?,
        capture: scope.required_string("capture", ctx)?,
        from: scope.required_string("from", ctx)?,
    })
}

fn decode_network(
    block: &Block,
    ctx: &Context<'_>,
    parent: &str,
    allow_inherit: bool,
) -> Result<NetworkOverride, ConfigError> {
    no_labels(block, parent)?;
    let scope = Scope::new(block.body(), join(parent, "network"));
    if allow_inherit {
        scope.check(&["inherit", "timeout", "retries", "headers"], &[])?;
    } else {
        scope.check(&["timeout", "retries", "headers"], &[])?;
    }

    Ok(NetworkOverride {
        inherit: scope.boolean("inherit", ctx)?,
        timeout: scope.integer("timeout", ctx)?,
        retries: scope.integer("retries", ctx)?,
        headers: scope.string_map("headers", ctx)?,
    })
}

/// A block body paired with its location path.
struct Scope<'a> {
    body: &'a Body,
    subject: String,
}

impl<'a> Scope<'a> {
    fn new(body: &'a Body, subject: String) -> Self {
        Self { body, subject }
    }

    fn path(&self, name: &str) -> String {
        join(&self.subject, name)
    }

    /// Rejects unknown or repeated attributes and unknown block types.
    fn check(&self, attributes: &[&str], blocks: &[&str]) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for attr in self.body.attributes() {
            if !attributes.contains(&attr.key()) {
                return Err(ConfigError::invalid(
                    "Unsupported argument",
                    format!("An argument named {:?} is not expected here.", attr.key()),
                    self.path(attr.key()),
                ));
            }
            if !seen.insert(attr.key()) {
                return Err(ConfigError::invalid(
                    "Duplicate argument",
                    format!("The argument {:?} was already set.", attr.key()),
                    self.path(attr.key()),
                ));
            }
        }
        for block in self.body.blocks() {
            if !blocks.contains(&block.identifier()) {
                return Err(ConfigError::invalid(
                    "Unsupported block type",
                    format!(
                        "Blocks of type {:?} are not expected here.",
                        block.identifier()
                    ),
                    self.path(block.identifier()),
                ));
            }
        }
        Ok(())
    }

    fn blocks(&self, identifier: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.body
            .blocks()
            .filter(move |block| block.identifier() == identifier)
    }

    fn at_most_one(&self, identifier: &'a str) -> Result<Option<&'a Block>, ConfigError> {
        let mut matching = self.blocks(identifier);
        let first = matching.next();
        if matching.next().is_some() {
            return Err(ConfigError::invalid(
                format!("Duplicate {identifier} block"),
                format!("Only one {identifier:?} block is allowed here."),
                self.path(identifier),
            ));
        }
        Ok(first)
    }

    fn value(&self, name: &str, ctx: &Context<'_>) -> Result<Option<Value>, ConfigError> {
        let Some(expr) = self
            .body
            .attributes()
            .find(|attr| attr.key() == name)
            .map(Attribute::expr)
        else {
            return Ok(None);
        };
        evaluate(expr, ctx, &self.path(name)).map(Some)
    }

    fn required_string(&self, name: &str, ctx: &Context<'_>) -> Result<String, ConfigError> {
        let value = self.value(name, ctx)?.ok_or_else(|| {
            ConfigError::invalid(
                "Missing required argument",
                format!("The argument {name:?} is required, but no definition was found."),
                self.subject.clone(),
            )
        })?;
        as_string(value).ok_or_else(|| self.type_error(name, "string"))
    }

    fn integer(&self, name: &str, ctx: &Context<'_>) -> Result<Option<i64>, ConfigError> {
        self.value(name, ctx)?
            .map(|value| as_integer(&value).ok_or_else(|| self.type_error(name, "whole number")))
            .transpose()
    }

    fn boolean(&self, name: &str, ctx: &Context<'_>) -> Result<Option<bool>, ConfigError> {
        self.value(name, ctx)?
            .map(|value| as_bool(&value).ok_or_else(|| self.type_error(name, "bool")))
            .transpose()
    }

    fn string_map(
        &self,
        name: &str,
        ctx: &Context<'_>,
    ) -> Result<Option<BTreeMap<String, String>>, ConfigError> {
        let Some(value) = self.value(name, ctx)? else {
            return Ok(None);
        };
        let Value::Object(entries) = value else {
            return Err(self.type_error(name, "map of string"));
        };
        entries
            .into_iter()
            .map(|(key, value)| {
                as_string(value)
                    .map(|value| (key, value))
                    .ok_or_else(|| self.type_error(name, "map of string"))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Some)
    }

    fn type_error(&self, name: &str, expected: &str) -> ConfigError {
        ConfigError::invalid(
            "Incorrect attribute value type",
            format!("Inappropriate value for attribute {name:?}: {expected} required."),
            self.path(name),
        )
    }
}

fn evaluate(expr: &Expression, ctx: &Context<'_>, subject: &str) -> Result<Value, ConfigError> {
    expr.evaluate(ctx)
        .map_err(|e| ConfigError::invalid("Invalid expression", e.to_string(), subject))
}

fn single_label(block: &Block, parent: &str) -> Result<String, ConfigError> {
    let identifier = block.identifier();
    match block.labels() {
        [label] => Ok(label.as_str().to_string()),
        [] => Err(ConfigError::invalid(
            format!("Missing name for {identifier}"),
            format!("All {identifier:?} blocks must have 1 labels (name)."),
            join(parent, identifier),
        )),
        _ => Err(ConfigError::invalid(
            format!("Extraneous label for {identifier}"),
            format!("Only 1 labels (name) are expected for {identifier:?} blocks."),
            join(parent, identifier),
        )),
    }
}

fn no_labels(block: &Block, parent: &str) -> Result<(), ConfigError> {
    if block.labels().is_empty() {
        return Ok(());
    }
    let identifier = block.identifier();
    Err(ConfigError::invalid(
        format!("Extraneous label for {identifier}"),
        format!("No labels are expected for {identifier:?} blocks."),
        join(parent, identifier),
    ))
}

fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Strings are taken as-is; numbers and bools convert to their text form.
fn as_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::context::evaluation_context_with;

    fn decode_str(text: &str) -> Result<Config, ConfigError> {
        let body = hcl::parse(text).unwrap();
        let ctx = evaluation_context_with([("MEDIA".to_string(), "/srv/media".to_string())]);
        decode(&body, &ctx)
    }

    fn summary(err: &ConfigError) -> (&str, Option<&str>) {
        match err {
            ConfigError::Invalid {
                summary, subject, ..
            } => (summary.as_str(), subject.as_deref()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_full_site() {
        let config = decode_str(
            r#"
            global {
              location = "${env.MEDIA}/grab"
              network {
                timeout = 5000
                headers = { "User-Agent" = "grab" }
              }
            }

            site "example" {
              test = "example\\.com"

              network {
                inherit = false
                retries = 3
              }

              subdirectory {
                pattern = "\\/gallery\\/(\\d+)"
                capture = 1
                from = url
              }

              asset "video" {
                pattern = "<video src=\"([^\"]+)"
                capture = 1
                find_all = true

                transform url {
                  pattern = "(.+)small(.*)"
                  replace = "$${1}large$2"
                }
              }

              info "title" {
                pattern = "<title>([^<]+)"
                capture = "1"
              }
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.global.location, "/srv/media/grab");
        let root = config.global.network.unwrap();
        assert_eq!(root.timeout, Some(5000));
        assert_eq!(root.retries, None);
        assert_eq!(root.headers.unwrap()["User-Agent"], "grab");

        let site = &config.sites[0];
        assert_eq!(site.name, "example");
        assert_eq!(site.test, "example\\.com");
        let net = site.network.as_ref().unwrap();
        assert_eq!(net.inherit, Some(false));
        assert_eq!(net.retries, Some(3));

        let sub = site.subdirectory.as_ref().unwrap();
        assert_eq!(sub.capture, "1");
        assert_eq!(sub.from, "url");

        let asset = &site.assets[0];
        assert!(asset.find_all);
        assert_eq!(asset.transforms[0].label, "url");
        assert_eq!(asset.transforms[0].replace, "${1}large$2");
        assert_eq!(site.infos[0].name, "title");
    }

    #[test]
    fn test_missing_global_is_rejected() {
        let err = decode_str(r#"site "a" { test = "a" }"#).unwrap_err();
        assert_eq!(summary(&err), ("Missing global block", None));
    }

    #[test]
    fn test_no_sites_is_rejected() {
        let err = decode_str(r#"global { location = "/tmp" }"#).unwrap_err();
        assert_eq!(summary(&err).0, "Insufficient site blocks");
    }

    #[test]
    fn test_missing_required_argument_names_block() {
        let err = decode_str(
            r#"
            global { location = "/tmp" }
            site "a" {
              test = "a"
              asset "img" { pattern = "x" }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(
            summary(&err),
            ("Missing required argument", Some("site \"a\".asset \"img\""))
        );
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let err = decode_str(
            r#"
            global { location = "/tmp" }
            site "a" {
              test = "a"
              tset = "b"
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(
            summary(&err),
            ("Unsupported argument", Some("site \"a\".tset"))
        );
    }

    #[test]
    fn test_inherit_not_allowed_on_root_network() {
        let err = decode_str(
            r#"
            global {
              location = "/tmp"
              network { inherit = false }
            }
            site "a" { test = "a" }
            "#,
        )
        .unwrap_err();
        assert_eq!(
            summary(&err),
            ("Unsupported argument", Some("global.network.inherit"))
        );
    }

    #[test]
    fn test_more_than_two_transforms_is_rejected() {
        let err = decode_str(
            r#"
            global { location = "/tmp" }
            site "a" {
              test = "a"
              asset "img" {
                pattern = "x"
                capture = 0
                transform url {
                  pattern = "a"
                  replace = "b"
                }
                transform filename {
                  pattern = "a"
                  replace = "b"
                }
                transform url {
                  pattern = "a"
                  replace = "b"
                }
              }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(summary(&err).0, "Too many transform blocks");
    }

    #[test]
    fn test_site_without_label_is_rejected() {
        let err = decode_str(
            r#"
            global { location = "/tmp" }
            site { test = "a" }
            "#,
        )
        .unwrap_err();
        assert_eq!(summary(&err).0, "Missing name for site");
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let err = decode_str(
            r#"
            global {
              location = "/tmp"
              network { timeout = [1, 2] }
            }
            site "a" { test = "a" }
            "#,
        )
        .unwrap_err();
        assert_eq!(
            summary(&err),
            ("Incorrect attribute value type", Some("global.network.timeout"))
        );
    }

    #[test]
    fn test_duplicate_network_block_is_rejected() {
        let err = decode_str(
            r#"
            global { location = "/tmp" }
            site "a" {
              test = "a"
              network { retries = 1 }
              network { retries = 2 }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(summary(&err).0, "Duplicate network block");
    }
}
