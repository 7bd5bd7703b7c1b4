use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::categories::CategoryStore;
use crate::error::{Error, Result};
use crate::output::DumpOutput;
use crate::wiki::SiteConfig;

use super::{AbstractFilter, DumpFilter, NamespacePredicate, NoredirectFilter, RedirectPredicate};

/// Builds a filter from its parameter, wrapping the output it writes to.
pub type FilterFactory =
    Box<dyn Fn(&str, Box<dyn DumpOutput>, &FilterContext) -> Result<Box<dyn DumpOutput>>>;

/// What filters may need from the surrounding dump run.
#[derive(Clone)]
pub struct FilterContext {
    pub site: Arc<SiteConfig>,
    pub categories: Arc<dyn CategoryStore>,
}

/// A `--filter` argument: `name` or `name:param`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: String,
    pub param: String,
}

impl FromStr for FilterSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, param) = s.split_once(':').unwrap_or((s, ""));
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::UnknownFilter(s.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            param: param.to_string(),
        })
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.param)
        }
    }
}

#[derive(Default)]
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `abstract`, `noredirect` and `namespace`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        register_abstract_filters(&mut registry);
        registry.register("namespace", |param, sink, _| {
            let predicate: NamespacePredicate = param.parse()?;
            Ok(Box::new(DumpFilter::new(predicate, sink)))
        });
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&str, Box<dyn DumpOutput>, &FilterContext) -> Result<Box<dyn DumpOutput>> + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn build(
        &self,
        spec: &FilterSpec,
        sink: Box<dyn DumpOutput>,
        context: &FilterContext,
    ) -> Result<Box<dyn DumpOutput>> {
        let factory = self
            .factories
            .get(&spec.name)
            .ok_or_else(|| Error::UnknownFilter(spec.name.clone()))?;
        factory(&spec.param, sink, context)
    }

    /// Wrap `sink` in the given filters. The first filter listed is the first
    /// to see each event.
    pub fn build_chain(
        &self,
        specs: &[FilterSpec],
        sink: Box<dyn DumpOutput>,
        context: &FilterContext,
    ) -> Result<Box<dyn DumpOutput>> {
        specs
            .iter()
            .rev()
            .try_fold(sink, |sink, spec| self.build(spec, sink, context))
    }
}

pub fn register_abstract_filters(registry: &mut FilterRegistry) {
    registry.register("abstract", |_, sink, context| {
        Ok(Box::new(AbstractFilter::new(
            sink,
            context.site.clone(),
            context.categories.clone(),
        )))
    });
    registry.register("noredirect", |_, sink, _| {
        Ok(Box::new(NoredirectFilter::new(RedirectPredicate, sink)))
    });
}
