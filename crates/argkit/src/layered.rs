use indexmap::{IndexMap, IndexSet};

use crate::command_line::CommandLine;
use crate::engine::missing_required;
use crate::error::{ParseError, ParseResult};
use crate::model::OptionId;

/// Several parse results consulted in order.
///
/// A lookup is answered by the first layer in which the option is present;
/// declared defaults only apply when no layer has the option. Typical use is
/// the real command line first, then a preset file parsed with the same model.
///
/// Groups are answered as a whole: the first layer that selects any member of
/// a group decides the selection, and members chosen by later layers are
/// hidden. All layers must share one model.
#[derive(Debug, Clone, Default)]
pub struct LayeredCommandLine<'c, 'a> {
    layers: Vec<&'c CommandLine<'a>>,
}

impl<'c, 'a> LayeredCommandLine<'c, 'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a layer with the lowest priority so far.
    pub fn append(&mut self, layer: &'c CommandLine<'a>) -> &mut Self {
        self.layers.push(layer);
        self
    }

    /// Add a layer at `index`; index 0 takes precedence over all others.
    pub fn insert(&mut self, index: usize, layer: &'c CommandLine<'a>) -> &mut Self {
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        self
    }

    pub fn layers(&self) -> &[&'c CommandLine<'a>] {
        &self.layers
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.answering(name).is_some()
    }

    /// Check required options and required groups across all layers.
    ///
    /// Layers are normally parsed with [`crate::parse_layer`], which leaves
    /// these checks to this call.
    pub fn validate(&self) -> ParseResult<()> {
        let Some(first) = self.layers.first() else {
            return Ok(());
        };
        let missing = missing_required(first.model(), |id| self.answering_id(id).is_some());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::MissingOptions { missing })
        }
    }

    pub fn value(&self, name: &str) -> Option<&'a str> {
        match self.answering(name) {
            Some(layer) => layer.value(name),
            None => self.layers.first().and_then(|l| l.value(name)),
        }
    }

    pub fn value_or(&self, name: &str, default: &'a str) -> &'a str {
        match self.answering(name) {
            Some(layer) => layer.value_or(name, default),
            None => default,
        }
    }

    pub fn values(&self, name: &str) -> Vec<&'a str> {
        match self.answering(name) {
            Some(layer) => layer.values(name),
            None => self
                .layers
                .first()
                .map(|l| l.values(name))
                .unwrap_or_default(),
        }
    }

    /// Key/value pairs of a separator option, from the answering layer only.
    pub fn values_as_properties(&self, name: &str) -> IndexMap<&'a str, &'a str> {
        self.answering(name)
            .map(|layer| layer.values_as_properties(name))
            .unwrap_or_default()
    }

    /// Command-line forms of every option some layer answers for, first seen
    /// first.
    pub fn triggers(&self) -> IndexSet<String> {
        self.layers
            .iter()
            .flat_map(|l| l.present())
            .filter(|(id, _)| self.answering_id(*id).is_some())
            .map(|(_, spec)| spec.display_name())
            .collect()
    }

    /// Positional arguments of the first layer.
    pub fn positionals(&self) -> &[&'a str] {
        self.layers.first().map(|l| l.positionals()).unwrap_or(&[])
    }

    fn answering(&self, name: &str) -> Option<&'c CommandLine<'a>> {
        let id = self.layers.first()?.model().resolve(name)?;
        self.answering_id(id)
    }

    fn answering_id(&self, id: OptionId) -> Option<&'c CommandLine<'a>> {
        let first = self.layers.first()?;
        match first.model().group_of(id) {
            Some(gid) => {
                let members = first.model().group(gid).members();
                let layer = self
                    .layers
                    .iter()
                    .copied()
                    .find(|l| members.iter().any(|&m| l.has(m)))?;
                layer.has(id).then_some(layer)
            }
            None => self.layers.iter().copied().find(|l| l.has(id)),
        }
    }
}
