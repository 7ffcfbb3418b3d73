//! Def database for loading and looking up definitions.
//!
//! Defs are loaded from TOML files holding `[[thing]]` and `[[damage]]`
//! tables. Each def is stored behind an `Arc` so things can refer to their
//! def without owning it.

use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::damage::DamageDef;
use super::schema::{ThingCategory, ThingDef};

/// Error type for def loading
#[derive(Error, Debug)]
pub enum DefError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Duplicate def: {0}")]
    Duplicate(String),

    #[error("Def {def} references unknown damage def {damage}")]
    UnknownDamageDef { def: String, damage: String },

    #[error("Def {0} is not usable as stuff")]
    NotStuff(String),

    #[error("Def {0} has a stack limit of zero")]
    ZeroStackLimit(String),
}

/// On-disk layout of a def file
#[derive(Debug, Default, Deserialize)]
struct DefFile {
    #[serde(default)]
    thing: Vec<ThingDef>,
    #[serde(default)]
    damage: Vec<DamageDef>,
}

/// Registry of every thing and damage def
#[derive(Debug, Default)]
pub struct DefDatabase {
    things: AHashMap<String, Arc<ThingDef>>,
    damages: AHashMap<String, Arc<DamageDef>>,
}

impl DefDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a thing def
    pub fn add_thing(&mut self, def: ThingDef) -> Result<Arc<ThingDef>, DefError> {
        if self.things.contains_key(&def.def_name) {
            return Err(DefError::Duplicate(def.def_name));
        }
        if def.stack_limit == 0 {
            return Err(DefError::ZeroStackLimit(def.def_name));
        }
        let def = Arc::new(def);
        self.things.insert(def.def_name.clone(), def.clone());
        Ok(def)
    }

    /// Register a damage def
    pub fn add_damage(&mut self, def: DamageDef) -> Result<Arc<DamageDef>, DefError> {
        if self.damages.contains_key(&def.def_name) {
            return Err(DefError::Duplicate(def.def_name));
        }
        let def = Arc::new(def);
        self.damages.insert(def.def_name.clone(), def.clone());
        Ok(def)
    }

    /// Load defs from a TOML string
    pub fn load_str(&mut self, content: &str) -> Result<usize, DefError> {
        let file: DefFile = toml::from_str(content).map_err(|e| DefError::Parse(e.to_string()))?;
        let count = file.thing.len() + file.damage.len();

        for def in file.damage {
            self.add_damage(def)?;
        }
        for def in file.thing {
            self.add_thing(def)?;
        }
        Ok(count)
    }

    /// Load defs from a TOML file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, DefError> {
        let content = std::fs::read_to_string(path)?;
        self.load_str(&content)
            .map_err(|e| match e {
                DefError::Parse(msg) => DefError::Parse(format!("{}: {}", path.display(), msg)),
                other => other,
            })
    }

    /// Load all .toml files from a directory recursively, then cross-check
    pub fn load_directory(&mut self, path: &Path) -> Result<usize, DefError> {
        let count = self.load_directory_recursive(path)?;
        self.resolve_references()?;
        Ok(count)
    }

    fn load_directory_recursive(&mut self, path: &Path) -> Result<usize, DefError> {
        let mut count = 0;
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();

            if entry_path.is_dir() {
                count += self.load_directory_recursive(&entry_path)?;
            } else if entry_path.extension().map_or(false, |ext| ext == "toml") {
                count += self.load_file(&entry_path)?;
            }
        }
        Ok(count)
    }

    /// Check that every damage multiplier names a known damage def
    pub fn resolve_references(&self) -> Result<(), DefError> {
        for def in self.things.values() {
            for multiplier in &def.damage_multipliers {
                if !self.damages.contains_key(&multiplier.damage_def) {
                    return Err(DefError::UnknownDamageDef {
                        def: def.def_name.clone(),
                        damage: multiplier.damage_def.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn thing(&self, name: &str) -> Option<Arc<ThingDef>> {
        self.things.get(name).cloned()
    }

    /// Look up a def that must be usable as stuff
    pub fn stuff(&self, name: &str) -> Result<Arc<ThingDef>, DefError> {
        match self.things.get(name) {
            Some(def) if def.is_stuff() => Ok(def.clone()),
            _ => Err(DefError::NotStuff(name.to_string())),
        }
    }

    pub fn damage(&self, name: &str) -> Option<Arc<DamageDef>> {
        self.damages.get(name).cloned()
    }

    pub fn things_in_category(&self, category: ThingCategory) -> Vec<Arc<ThingDef>> {
        let mut defs: Vec<_> = self
            .things
            .values()
            .filter(|def| def.category == category)
            .cloned()
            .collect();
        defs.sort_by(|a, b| a.def_name.cmp(&b.def_name));
        defs
    }

    pub fn thing_count(&self) -> usize {
        self.things.len()
    }

    pub fn damage_count(&self) -> usize {
        self.damages.len()
    }
}
