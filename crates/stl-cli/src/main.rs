//! `stl` — runs a manifest-described conformance test to completion against
//! its declared STL modules (§6).
//!
//! Pipeline: load manifest → substitute `-a` overrides → parse every
//! `stl_files` entry → merge into one module → resolve → build the
//! combined-state graph → plan a covering circuit → execute it, rerouting
//! through declared error states on failure.

mod dot;
mod error;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use stl_ast::{Module, Name};
use stl_executor::{Environment, NoopVisualizer};
use stl_externals::{DifferentFrom, Noop, UniqueInt};
use stl_manifest::{parse_arg, substitute, Manifest, ManifestValue, RoleBinding};
use stl_model::RuntimeValue;

/// Conformance test driver for the State Transition Language.
#[derive(Parser, Debug)]
#[command(name = "stl", version, about, long_about = None)]
struct Args {
    /// Path to the manifest file describing the run
    manifest: PathBuf,

    /// Bind a manifest `$key` to a value before parsing (repeatable)
    #[arg(short = 'a', long = "arg", value_name = "key=value")]
    args: Vec<String>,

    /// Enable debug-level logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// Write a live Graphviz `.dot` rendering of the run to this path
    #[arg(short = 'g', long = "graph", value_name = "path")]
    graph: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(true) => std::process::exit(error::EXIT_SUCCESS),
        Ok(false) => {
            tracing::error!("run failed: a transition could not be recovered");
            std::process::exit(error::EXIT_RUN_FAILED);
        }
        Err(err) => {
            tracing::error!("{err:#}");
            std::process::exit(error::EXIT_SETUP_FAILURE);
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<bool> {
    let bound_args = args
        .args
        .iter()
        .map(|raw| parse_arg(raw).ok_or_else(|| anyhow::anyhow!("malformed -a argument {raw:?}, expected key=value")))
        .collect::<Result<Vec<_>>>()?;

    let manifest_dir = args.manifest.parent().unwrap_or_else(|| std::path::Path::new("."));
    let raw = std::fs::read_to_string(&args.manifest).with_context(|| format!("reading manifest {}", args.manifest.display()))?;
    let substituted = substitute(&raw, &bound_args);
    let manifest = Manifest::parse(&substituted, manifest_dir).context("parsing manifest")?;

    if manifest.stl_files.is_empty() {
        bail!("manifest declares no stl_files");
    }

    let module = parse_sources(&manifest)?;
    let manifest_constants = resolve_constants(&manifest)?;
    let resolved = stl_resolver::resolve_module(&module, manifest.test_roles.iter().map(String::as_str), &manifest_constants)
        .context("resolving module")?;

    let graph = stl_graph::build_graph(&resolved).context("building combined-state graph")?;
    let plan = stl_planner::plan_traversal(&graph).context("planning a covering circuit")?;

    let mut env = Environment::new(&resolved.roles);
    apply_role_bindings(&mut env, &manifest.roles)?;
    register_builtin_externals(&mut env);

    match &args.graph {
        Some(path) => {
            let mut visualizer = dot::DotWriter::new(&resolved, &graph, path.clone());
            Ok(stl_executor::run(&resolved, &graph, plan, &mut env, &mut visualizer)?)
        }
        None => {
            let mut visualizer = NoopVisualizer;
            Ok(stl_executor::run(&resolved, &graph, plan, &mut env, &mut visualizer)?)
        }
    }
}

/// Parses every manifest source file and merges them into one module. Later
/// files never override an earlier file's definitions (§3 first-wins
/// policy extended across files).
fn parse_sources(manifest: &Manifest) -> Result<Module> {
    let mut merged = Module::new("manifest");
    for (i, path) in manifest.stl_files.iter().enumerate() {
        let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let file_name = path.to_string_lossy().into_owned();
        let parsed = stl_parser::parse_module(&source, &file_name).map_err(|abort| {
            anyhow::anyhow!("{}", abort.diagnostic.render(&source))
        })?;

        if i == 0 {
            merged.name = parsed.name.clone();
        }
        for item in parsed.consts.iter() {
            merged.consts.insert(item.clone());
        }
        for item in parsed.roles.iter() {
            merged.roles.insert(item.clone());
        }
        for item in parsed.states.iter() {
            merged.states.insert(item.clone());
        }
        for item in parsed.messages.iter() {
            merged.messages.insert(item.clone());
        }
        for item in parsed.qualifiers.iter() {
            merged.qualifiers.insert(item.clone());
        }
        for item in parsed.events.iter() {
            merged.events.insert(item.clone());
        }
        for item in parsed.transitions.iter() {
            merged.transitions.insert(item.clone());
        }
    }
    Ok(merged)
}

fn resolve_constants(manifest: &Manifest) -> Result<FxHashMap<Name, RuntimeValue>> {
    manifest
        .constants
        .iter()
        .map(|(key, value)| Ok((Name::from(key.as_str()), to_runtime_value(value)?)))
        .collect()
}

/// Pre-populates role fields from the manifest's `roles` block (§6) before
/// the run starts: `role_path`'s trailing `::`-segment names the declared
/// STL role, and every other key is a field value bound on that role's
/// starting state.
fn apply_role_bindings(env: &mut Environment, bindings: &[RoleBinding]) -> Result<()> {
    for binding in bindings {
        let role_name = binding.role_path.rsplit("::").next().unwrap_or(&binding.role_path);
        let state = env
            .roles
            .get_mut(role_name)
            .ok_or_else(|| anyhow::anyhow!("manifest role {:?} names unknown role {role_name:?}", binding.name))?;
        for (field, value) in &binding.fields {
            let value = to_runtime_value(value)?;
            state
                .set(Name::from(field.as_str()), value)
                .map_err(|err| anyhow::anyhow!("{err}"))?;
        }
    }
    Ok(())
}

fn to_runtime_value(value: &ManifestValue) -> Result<RuntimeValue> {
    Ok(match value {
        ManifestValue::Str(s) => RuntimeValue::Str(s.clone()),
        ManifestValue::Int(i) => RuntimeValue::Int(*i),
        ManifestValue::Bool(b) => RuntimeValue::Bool(*b),
        ManifestValue::Null => RuntimeValue::Null,
        ManifestValue::List(items) => RuntimeValue::List(items.iter().map(to_runtime_value).collect::<Result<_>>()?),
        ManifestValue::Map(_) => bail!("manifest constants must be scalars or lists, not maps"),
    })
}

/// Registers the externals every STL program can use without a custom Rust
/// plugin (§6): a no-op event that always succeeds, and the two built-in
/// qualifiers.
fn register_builtin_externals(env: &mut Environment) {
    env.register_event("Noop", Box::new(Noop));
    env.register_qualifier("UniqueInt", Box::new(UniqueInt::default()));
    env.register_qualifier("DifferentFrom", Box::new(DifferentFrom));
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::{FieldDecl, FieldRule, FieldType, RoleDef};

    fn client_role() -> RoleDef {
        RoleDef { name: "Client".into(), fields: vec![FieldDecl { name: "retries".into(), ty: FieldType::Int, rule: FieldRule::required(), encoding_props: vec![] }] }
    }

    #[test]
    fn role_binding_pre_populates_declared_field() {
        let mut env = Environment::new(&[client_role()]);
        let bindings = vec![RoleBinding { name: "rClient".into(), role_path: "connection::Client".into(), fields: vec![("retries".to_string(), ManifestValue::Int(3))] }];
        apply_role_bindings(&mut env, &bindings).unwrap();
        assert_eq!(env.roles.get("Client").unwrap().get("retries"), Some(&RuntimeValue::Int(3)));
    }

    #[test]
    fn role_binding_to_unknown_role_is_an_error() {
        let mut env = Environment::new(&[client_role()]);
        let bindings = vec![RoleBinding { name: "rGhost".into(), role_path: "connection::Ghost".into(), fields: vec![] }];
        assert!(apply_role_bindings(&mut env, &bindings).is_err());
    }
}
