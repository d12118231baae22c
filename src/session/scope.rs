//! Plugin and group scope resolution.
//!
//! The guardfile declares plugins and groups one at a time. Each declaration
//! lands in a name-keyed registration table; it joins the resolved scope when
//! the command line asked for that name, or asked for nothing at all.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Options attached to a declared plugin or group.
pub type DeclOptions = Map<String, Value>;

/// Group plugins land in when declared outside any group.
pub const DEFAULT_GROUP: &str = "default";

/// Anything that can be declared by name in a guardfile.
pub trait Declared {
    fn name(&self) -> &str;

    /// Fold a repeated declaration of the same name into this one.
    fn merge(&mut self, other: Self);
}

/// A declared plugin instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    pub name: String,
    pub group: String,
    pub options: DeclOptions,
}

impl Plugin {
    pub fn new(name: impl Into<String>, group: impl Into<String>, options: DeclOptions) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            options,
        }
    }
}

impl Declared for Plugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge(&mut self, other: Self) {
        self.group = other.group;
        self.options.extend(other.options);
    }
}

/// A declared group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub options: DeclOptions,
}

impl Group {
    pub fn new(name: impl Into<String>, options: DeclOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

impl Declared for Group {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge(&mut self, other: Self) {
        self.options.extend(other.options);
    }
}

/// Registration table for one kind of declaration.
///
/// Keeps every declaration in guardfile order, and separately the names that
/// made it into the resolved scope.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    requested: Vec<String>,
    declared: IndexMap<String, T>,
    resolved: Vec<String>,
}

impl<T: Declared> Registry<T> {
    /// Create a registry restricted to `requested` names. Empty means no restriction.
    pub fn new(requested: Vec<String>) -> Self {
        Self {
            requested,
            declared: IndexMap::new(),
            resolved: Vec::new(),
        }
    }

    /// Names as given on the command line.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn is_requested(&self, name: &str) -> bool {
        self.requested.is_empty() || self.requested.iter().any(|r| r == name)
    }

    /// Register a declaration, returning the stored instance and whether it
    /// is in scope.
    pub fn declare(&mut self, item: T) -> (&T, bool) {
        let name = item.name().to_string();
        let in_scope = self.is_requested(&name);

        if in_scope && !self.resolved.contains(&name) {
            self.resolved.push(name.clone());
        }

        let entry = self.declared.entry(name);
        let stored = match entry {
            indexmap::map::Entry::Occupied(occupied) => {
                let existing = occupied.into_mut();
                existing.merge(item);
                existing
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(item),
        };

        (&*stored, in_scope)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.declared.get(name)
    }

    /// Every declaration, in scope or not.
    pub fn declared(&self) -> impl Iterator<Item = &T> {
        self.declared.values()
    }

    /// Resolved scope in declaration order.
    pub fn scope(&self) -> impl Iterator<Item = &T> {
        self.resolved.iter().filter_map(|name| self.declared.get(name))
    }

    /// Names of the resolved scope in declaration order.
    pub fn scope_names(&self) -> Vec<&str> {
        self.resolved.iter().map(String::as_str).collect()
    }

    /// Requested names that no declaration matched.
    pub fn unmatched(&self) -> Vec<&str> {
        self.requested
            .iter()
            .filter(|name| !self.declared.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Reconciles command-line plugin and group names with guardfile declarations.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    plugins: Registry<Plugin>,
    groups: Registry<Group>,
}

impl ScopeResolver {
    pub fn new(plugins: Vec<String>, groups: Vec<String>) -> Self {
        Self {
            plugins: Registry::new(plugins),
            groups: Registry::new(groups),
        }
    }

    /// Declare a group. Repeated declarations merge their options.
    pub fn declare_group(&mut self, group: Group) -> &Group {
        let (stored, in_scope) = self.groups.declare(group);
        crate::debug_event!("scope", "group declared", "{} in_scope={in_scope}", stored.name);
        stored
    }

    /// Declare a plugin, implicitly declaring its group first.
    pub fn declare_plugin(&mut self, plugin: Plugin) -> &Plugin {
        if self.groups.get(&plugin.group).is_none() {
            self.declare_group(Group::new(plugin.group.clone(), DeclOptions::new()));
        }
        let (stored, in_scope) = self.plugins.declare(plugin);
        crate::debug_event!("scope", "plugin declared", "{} in_scope={in_scope}", stored.name);
        stored
    }

    pub fn plugins(&self) -> &Registry<Plugin> {
        &self.plugins
    }

    pub fn groups(&self) -> &Registry<Group> {
        &self.groups
    }
}
