//! Orchestration of inspection and planning across environments

use indexmap::IndexMap;
use std::sync::{Mutex, PoisonError};
use tracing::Span;

use crate::config::{DotGalaxy, Environment};
use crate::error::{CoreError, Result};
use crate::inventory::Inventory;
use crate::plan::Plan;
use crate::suffix::SuffixParser;

/// Caller selections narrowing what is planned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Environments to plan, all when empty
    pub environments: Vec<String>,
    /// Namespaces to scan, all when empty
    pub namespaces: Vec<String>,
}

impl Options {
    /// Split a comma separated list, ignoring blanks
    pub fn parse_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn with_environments(mut self, value: &str) -> Self {
        self.environments = Self::parse_list(value);
        self
    }

    pub fn with_namespaces(mut self, value: &str) -> Self {
        self.namespaces = Self::parse_list(value);
        self
    }
}

/// Application instance, holding the plans of every run
pub struct Galaxy {
    span: Span,
    dot_galaxy: DotGalaxy,
    options: Options,
    results: IndexMap<String, Vec<Inventory>>,
}

impl Galaxy {
    pub fn new(dot_galaxy: DotGalaxy, options: Options, span: Span) -> Self {
        Self {
            span,
            dot_galaxy,
            options,
            results: IndexMap::new(),
        }
    }

    pub fn dot_galaxy(&self) -> &DotGalaxy {
        &self.dot_galaxy
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    /// Planned inventories per environment, one per planning run
    pub fn results(&self) -> &IndexMap<String, Vec<Inventory>> {
        &self.results
    }

    /// Selected environments, in declaration order
    ///
    /// Every environment named by the options must exist.
    pub fn environments(&self) -> Result<Vec<&Environment>> {
        for name in &self.options.environments {
            self.dot_galaxy.get_environment(name)?;
        }

        Ok(self
            .dot_galaxy
            .spec
            .environments
            .iter()
            .filter(|e| {
                self.options.environments.is_empty() || self.options.environments.contains(&e.name)
            })
            .collect())
    }

    /// Selected namespaces, in declaration order
    pub fn namespaces(&self) -> Result<Vec<&str>> {
        let declared = &self.dot_galaxy.spec.namespaces.names;
        if let Some(unknown) = self.options.namespaces.iter().find(|n| !declared.contains(n)) {
            return Err(CoreError::InvalidNamespace {
                name: unknown.clone(),
            });
        }

        Ok(declared
            .iter()
            .filter(|n| self.options.namespaces.is_empty() || self.options.namespaces.contains(n))
            .map(String::as_str)
            .collect())
    }

    /// Scan the selected namespaces, without planning
    pub fn inspect(&self) -> Result<Inventory> {
        self.inspect_with(self.span.clone())
    }

    fn inspect_with(&self, span: Span) -> Result<Inventory> {
        let mut inventory = Inventory::new(span);
        for namespace in self.namespaces()? {
            let dir = self.dot_galaxy.get_namespace_dir(namespace)?;
            inventory.inspect_dir(namespace, &dir, self.dot_galaxy.extensions())?;
        }
        Ok(inventory)
    }

    /// Scan and plan one environment from scratch
    fn plan_environment(&self, env: &Environment) -> Result<Inventory> {
        let span = tracing::info_span!(parent: &self.span, "environment", name = %env.name);
        let inventory = self.inspect_with(span.clone())?;
        let parser = SuffixParser::new(
            self.dot_galaxy.suffix_convention(),
            self.dot_galaxy.extensions(),
        )?;
        Plan::new(env, &inventory, parser, span).run()
    }

    /// Plan every selected environment, in declaration order
    ///
    /// Stops at the first failing environment, environments planned before it keep
    /// their results.
    pub fn plan(&mut self) -> Result<()> {
        let environments: Vec<Environment> = self.environments()?.into_iter().cloned().collect();

        for env in &environments {
            let inventory = self
                .plan_environment(env)
                .map_err(|e| e.in_environment(&env.name))?;
            self.results.entry(env.name.clone()).or_default().push(inventory);
        }
        Ok(())
    }

    /// Same as [`Galaxy::plan`], planning environments on one thread each
    pub fn plan_parallel(&mut self) -> Result<()> {
        let environments: Vec<Environment> = self.environments()?.into_iter().cloned().collect();
        let planned: Mutex<IndexMap<String, Result<Inventory>>> = Mutex::new(IndexMap::new());

        let this = &*self;
        std::thread::scope(|scope| {
            for env in &environments {
                let planned = &planned;
                scope.spawn(move || {
                    let result = this.plan_environment(env);
                    planned
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(env.name.clone(), result);
                });
            }
        });

        let mut planned = planned.into_inner().unwrap_or_else(PoisonError::into_inner);
        for env in &environments {
            match planned.shift_remove(&env.name) {
                Some(Ok(inventory)) => {
                    self.results.entry(env.name.clone()).or_default().push(inventory);
                }
                Some(Err(e)) => return Err(e.in_environment(&env.name)),
                None => {}
            }
        }
        Ok(())
    }
}
