//! builtins
//!
//! Actions every `aw` binary ships with.
//!
//! - `list [NAMESPACE] [--all]` - visible actions, optionally within one
//!   namespace
//! - `namespaces` - known namespace prefixes with descriptions
//! - `describe NAME` - one record's kind, description, arguments and options
//! - `version` - the crate version
//!
//! All of them carry the `builtin` tag.

use anyhow::{anyhow, Result};

use crate::core::index::{DefinitionError, Index};
use crate::core::options::OptionSchema;
use crate::core::params::ParameterShape;
use crate::core::record::{ActionFlags, Invocation, Record};
use crate::engine::ActionHandle;
use crate::ui::output;

/// Tag carried by every built-in action.
pub const BUILTIN_TAG: &str = "builtin";

/// Register the built-in actions into `index`.
pub fn register(index: &mut Index) -> Result<(), DefinitionError> {
    let flags = || ActionFlags::default().with_tag(BUILTIN_TAG);

    index.register_action(
        "list",
        "List available actions",
        ParameterShape::new().max(1).keyword("all"),
        OptionSchema::new().flag("all", Some('a'), "Include hidden actions"),
        flags(),
        list,
    )?;
    index.register_action(
        "namespaces",
        "List action namespaces",
        ParameterShape::new(),
        OptionSchema::new(),
        flags(),
        namespaces,
    )?;
    index.register_action(
        "describe",
        "Describe an action or alias",
        ParameterShape::exact(1),
        OptionSchema::new(),
        flags(),
        describe,
    )?;
    index.register_action(
        "version",
        "Print the version",
        ParameterShape::new(),
        OptionSchema::new(),
        flags(),
        version,
    )?;

    Ok(())
}

fn list(handle: &mut ActionHandle<'_>, inv: &Invocation) -> Result<()> {
    let include_hidden = inv.flag("all");
    let index = handle.index();

    let records = match inv.arg(0) {
        Some(namespace) => {
            let namespace = index.expand(namespace).into_owned();
            if !index.prefix_exists(&namespace) {
                return Err(anyhow!("unknown namespace '{}'", namespace));
            }
            index.each_in(&namespace, include_hidden)
        }
        None => index.each(include_hidden),
    };

    output::print(output::format_records(&records), handle.settings().verbosity());
    Ok(())
}

fn namespaces(handle: &mut ActionHandle<'_>, _inv: &Invocation) -> Result<()> {
    let index = handle.index();
    let lines: Vec<String> = index
        .each_prefix()
        .into_iter()
        .map(|(prefix, description)| {
            let count = index.each_in(prefix, false).len();
            match description {
                Some(d) => format!("{} ({}) {}", prefix, count, d),
                None => format!("{} ({})", prefix, count),
            }
        })
        .collect();

    output::print(lines.join("\n"), handle.settings().verbosity());
    Ok(())
}

fn describe(handle: &mut ActionHandle<'_>, inv: &Invocation) -> Result<()> {
    let index = handle.index();
    let requested = index.expand(inv.arg(0).unwrap_or_default()).into_owned();
    let record = index
        .get(&requested)
        .ok_or_else(|| anyhow!("'{}' is not defined", requested))?;

    output::print(describe_record(index, &record), handle.settings().verbosity());
    Ok(())
}

/// Plain-text description of one record.
pub fn describe_record(index: &Index, record: &Record) -> String {
    let mut lines = vec![
        format!("name: {}", record.name()),
        format!("kind: {}", record.kind()),
        format!("description: {}", record.description()),
    ];

    if let Some(tag) = record.tag() {
        lines.push(format!("tag: {}", tag));
    }

    let action = match record.as_alias() {
        Some(alias) => {
            let resolved = index.resolve(alias.name.as_str());
            if let Some((action, args)) = &resolved {
                lines.push(format!("resolves to: {}", action.name));
                if !args.is_empty() {
                    lines.push(format!("fixed arguments: {}", args.join(" ")));
                }
            } else {
                lines.push("resolves to: (undefined)".to_string());
            }
            resolved.map(|(action, _)| action)
        }
        None => record.as_action().cloned(),
    };

    if let Some(action) = action {
        lines.push(format!("arguments: {}", action.shape));
        if !action.options.is_empty() {
            lines.push("options:".to_string());
            for spec in action.options.specs() {
                lines.push(format!("  {}  {}", spec.usage(), spec.help).trim_end().to_string());
            }
        }
    }

    lines.join("\n")
}

fn version(handle: &mut ActionHandle<'_>, _inv: &Invocation) -> Result<()> {
    output::print(
        format!("aw {}", env!("CARGO_PKG_VERSION")),
        handle.settings().verbosity(),
    );
    Ok(())
}
