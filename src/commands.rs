//! CLI command implementations

use absort_core::{Declaration, SortConfig, SortOrder, find_cycles, sort_declarations};
use anyhow::Context;
use std::path::Path;

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub order: Option<String>,
    pub reverse: bool,
    pub no_pin_main: bool,
    pub separate_kinds: bool,
    pub no_similarity: bool,
    pub seed: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut SortConfig) -> anyhow::Result<()> {
        if let Some(order) = self.order {
            config.order = order.parse::<SortOrder>()?;
        }
        config.reverse |= self.reverse;
        config.separate_kinds |= self.separate_kinds;
        if self.no_pin_main {
            config.pin_main = false;
        }
        if self.no_similarity {
            config.similarity.enabled = false;
        }
        if self.seed.is_some() {
            config.similarity.seed = self.seed;
        }
        Ok(())
    }
}

pub fn sort(
    manifest: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => SortConfig::load(path)?,
        None => SortConfig::default(),
    };
    overrides.apply(&mut config)?;

    let decls = read_manifest(manifest)?;
    let count = decls.len();
    let sorted = sort_declarations(decls, &config)
        .with_context(|| format!("Failed to sort {}", manifest.display()))?;

    tracing::info!("Sorted {} declarations ({})", count, config.order);

    if json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else {
        for decl in &sorted {
            println!("{}", decl.name);
        }
    }
    Ok(())
}

pub fn cycles(manifest: &Path) -> anyhow::Result<()> {
    let decls = read_manifest(manifest)?;
    let groups = find_cycles(&decls)?;

    tracing::info!("Found {} mutually recursive groups", groups.len());

    for group in groups {
        println!("{}", group.join(" "));
    }
    Ok(())
}

fn read_manifest(path: &Path) -> anyhow::Result<Vec<Declaration>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let decls: Vec<Declaration> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid manifest {}", path.display()))?;
    tracing::debug!("Read {} declarations from {}", decls.len(), path.display());
    Ok(decls)
}
