//! Registry-driven normalization of raw parameter definitions.
//!
//! [`dispatch`] walks the distinct child tags of a `parameterDefinitions`
//! node in first-appearance order, resolves each tag through the
//! [`Registry`], and hands the ordered sibling items to the matching
//! [`ParamKind`] normalizer. Tags without a registered normalizer are
//! reported as unmapped, never guessed at.

use tracing::{debug, warn};

use paramexport_shared::schema::ParameterGroup;
use paramexport_xml::XmlNode;

pub mod decode;
pub mod kinds;
pub mod registry;

pub use kinds::ParamKind;
pub use registry::{Registry, kind_for};

/// Result of dispatching one job's parameter definitions.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// One group per distinct kind, in first-appearance order.
    pub groups: Vec<ParameterGroup>,
    /// Kind identifiers that had no registered normalizer.
    pub unmapped: Vec<String>,
}

/// Normalize every parameter definition under `definitions`.
///
/// Each distinct child tag is a kind identifier; all its sibling items are
/// normalized together into one group. An unknown tag skips the whole group
/// and is recorded for the caller's report.
pub fn dispatch(registry: &Registry, definitions: &XmlNode) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    for tag in definitions.tags() {
        let Some(kind) = registry.lookup(tag) else {
            warn!(identifier = tag, "no normalizer registered for parameter kind");
            outcome.unmapped.push(tag.to_string());
            continue;
        };

        let items = definitions.children_named(tag);
        debug!(identifier = tag, count = items.len(), "normalizing parameter group");
        outcome.groups.push(ParameterGroup {
            class: tag.to_string(),
            type_tag: kind.category().to_string(),
            configs: kind.normalize(&items),
        });
    }

    outcome
}
