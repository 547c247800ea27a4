//! Loads a conformance run's manifest file (§6): the set of `.stl` sources
//! to parse, import search paths, role bindings, constant overrides, and
//! which roles are under test.

mod error;
mod value;

pub use error::ManifestError;
pub use value::ManifestValue;

use std::path::{Path, PathBuf};
use value::Parser;

/// One `roles` entry: the concrete STL role (`module::RoleName`) plus the
/// field values to construct it with.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleBinding {
    pub name: String,
    pub role_path: String,
    pub fields: Vec<(String, ManifestValue)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    pub stl_files: Vec<PathBuf>,
    pub import_paths: Vec<PathBuf>,
    pub roles: Vec<RoleBinding>,
    pub constants: Vec<(String, ManifestValue)>,
    pub test_roles: Vec<String>,
}

impl Manifest {
    /// Parses `text` (already `$key`-substituted) and resolves `stl_files` /
    /// `import_paths` relative to `base_dir` — the manifest file's own
    /// directory, per §6.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Manifest, ManifestError> {
        let root = Parser::new(text).parse()?;
        let entries = root.as_map().ok_or_else(|| ManifestError::RootNotMap(root.type_name()))?;

        let mut manifest = Manifest::default();
        for (key, value) in entries {
            match key.as_str() {
                "stl_files" => manifest.stl_files = string_list(value, "stl_files")?.into_iter().map(|f| base_dir.join(f)).collect(),
                "import_paths" => manifest.import_paths = string_list(value, "import_paths")?.into_iter().map(|p| base_dir.join(p)).collect(),
                "roles" => manifest.roles = parse_roles(value)?,
                "constants" => manifest.constants = value.as_map().ok_or(ManifestError::ExpectedStringList("constants"))?.to_vec(),
                "test" => manifest.test_roles = string_list(value, "test")?,
                _ => tracing::debug!(key, "ignoring unrecognized manifest key"),
            }
        }
        Ok(manifest)
    }
}

fn string_list(value: &ManifestValue, key: &'static str) -> Result<Vec<String>, ManifestError> {
    value
        .as_list()
        .ok_or(ManifestError::ExpectedStringList(key))?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or(ManifestError::ExpectedStringList(key)))
        .collect()
}

fn parse_roles(value: &ManifestValue) -> Result<Vec<RoleBinding>, ManifestError> {
    let entries = value.as_map().ok_or(ManifestError::MalformedRoleEntry)?;
    entries
        .iter()
        .map(|(name, body)| {
            let fields = body.as_map().ok_or(ManifestError::MalformedRoleEntry)?;
            let role_path = fields
                .iter()
                .find(|(k, _)| k == "role")
                .and_then(|(_, v)| v.as_str())
                .ok_or(ManifestError::MalformedRoleEntry)?
                .to_string();
            let fields = fields.iter().filter(|(k, _)| k != "role").cloned().collect();
            Ok(RoleBinding { name: name.clone(), role_path, fields })
        })
        .collect()
}

/// Parses one `-a key=value` CLI argument. When `raw` carries more than one
/// `=`, the split happens at the rightmost occurrence, so a value that
/// itself contains `=` (a connection string, say) is not truncated.
pub fn parse_arg(raw: &str) -> Option<(&str, &str)> {
    let idx = raw.rfind('=')?;
    Some((&raw[..idx], &raw[idx + 1..]))
}

/// Substitutes every `$key` occurrence in `text` with its bound value from
/// `args`, longest key first so `$retry_count` doesn't get clipped by a
/// shorter `$retry` binding.
pub fn substitute(text: &str, args: &[(&str, &str)]) -> String {
    let mut keys: Vec<&(&str, &str)> = args.iter().collect();
    keys.sort_by_key(|(k, _)| std::cmp::Reverse(k.len()));

    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    'outer: while i < bytes.len() {
        if bytes[i] == b'$' {
            for (key, value) in &keys {
                let needle = format!("${key}");
                if text[i..].starts_with(&needle) {
                    out.push_str(value);
                    i += needle.len();
                    continue 'outer;
                }
            }
        }
        let ch = text[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}
