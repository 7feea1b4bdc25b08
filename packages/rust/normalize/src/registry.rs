//! Parameter kind registry.
//!
//! The Jenkins DSL catalog aliases several method names onto one parameter
//! implementation class (e.g. `booleanParam` and a legacy spelling both point
//! at `hudson.model.BooleanParameterDefinition`). Building the registry
//! resolves those aliases deterministically, unions in a handful of kinds the
//! catalog does not expose, and intersects the result with the compile-time
//! dispatch table. The registry is built once and read-only afterward.

use std::collections::BTreeMap;

use tracing::debug;

use crate::kinds::ParamKind;

/// Method names ending with this suffix are the authoritative "parameter"
/// mapping for an identifier shared by multiple catalog methods.
const CANONICAL_SUFFIX: &str = "Param";

/// Curated identifier mappings for kinds the DSL catalog omits.
const CURATED: &[(&str, &str)] = &[
    (
        "separator",
        "jenkins.plugins.parameter__separator.ParameterSeparatorDefinition",
    ),
    (
        "validatingString",
        "hudson.plugins.validating__string__parameter.ValidatingStringParameterDefinition",
    ),
    (
        "extendedChoice",
        "com.cwctravel.hudson.plugins.extended__choice__parameter.ExtendedChoiceParameterDefinition",
    ),
    (
        "passwordParameterDefinitionV2",
        "hudson.model.PasswordParameterDefinition",
    ),
];

/// Immutable mapping from parameter kind identifier to its normalizer.
#[derive(Debug, Clone)]
pub struct Registry {
    /// identifier → kind, for identifiers the engine knows how to normalize.
    entries: BTreeMap<String, ParamKind>,
    /// Resolved method-name → identifier catalog (post de-dup, post curation),
    /// kept for cache persistence.
    catalog: BTreeMap<String, String>,
}

impl Registry {
    /// Build a registry from a raw catalog of method-name → type-identifier.
    ///
    /// De-duplication: an entry whose identifier is shared with another entry
    /// is dropped unless its method name carries the canonical suffix, so
    /// exactly one mapping per identifier survives.
    pub fn build(raw_catalog: &BTreeMap<String, String>) -> Self {
        let mut catalog: BTreeMap<String, String> = BTreeMap::new();

        for (method, identifier) in raw_catalog {
            let aliased = raw_catalog.iter().any(|(other_method, other_id)| {
                other_method != method
                    && other_id == identifier
                    && !method.ends_with(CANONICAL_SUFFIX)
            });
            if aliased {
                debug!(%method, %identifier, "dropping aliased catalog entry");
                continue;
            }
            catalog.insert(method.clone(), identifier.clone());
        }

        for (method, identifier) in CURATED {
            catalog.insert((*method).to_string(), (*identifier).to_string());
        }

        let mut entries: BTreeMap<String, ParamKind> = BTreeMap::new();
        for identifier in catalog.values() {
            if let Some(kind) = kind_for(identifier) {
                entries.insert(identifier.clone(), kind);
            } else {
                debug!(%identifier, "catalog identifier has no normalizer");
            }
        }

        Self { entries, catalog }
    }

    /// Exact-match lookup of a kind identifier. `None` means the kind is
    /// unmapped and must be reported, never synthesized.
    pub fn lookup(&self, identifier: &str) -> Option<ParamKind> {
        self.entries.get(identifier).copied()
    }

    /// The resolved method-name → identifier catalog, for cache persistence.
    pub fn catalog(&self) -> &BTreeMap<String, String> {
        &self.catalog
    }

    /// Number of identifiers with a registered normalizer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no identifier has a registered normalizer.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compile-time dispatch table: source implementation class → kind.
pub fn kind_for(identifier: &str) -> Option<ParamKind> {
    let kind = match identifier {
        "hudson.model.BooleanParameterDefinition" => ParamKind::Boolean,
        "com.gem.persistentparameter.PersistentBooleanParameterDefinition" => {
            ParamKind::PersistentBoolean
        }
        "hudson.model.StringParameterDefinition" => ParamKind::String,
        "com.gem.persistentparameter.PersistentStringParameterDefinition" => {
            ParamKind::PersistentString
        }
        "hudson.model.TextParameterDefinition" => ParamKind::Text,
        "com.gem.persistentparameter.PersistentTextParameterDefinition" => {
            ParamKind::PersistentText
        }
        "hudson.model.ChoiceParameterDefinition" => ParamKind::Choice,
        "com.gem.persistentparameter.PersistentChoiceParameterDefinition" => {
            ParamKind::PersistentChoice
        }
        "org.biouno.unochoice.ChoiceParameter" => ParamKind::ScriptedChoice,
        "org.biouno.unochoice.CascadeChoiceParameter" => ParamKind::CascadeChoice,
        "com.cloudbees.plugins.credentials.CredentialsParameterDefinition" => {
            ParamKind::Credentials
        }
        "hudson.model.FileParameterDefinition" => ParamKind::File,
        "io.jenkins.plugins.file_parameters.StashedFileParameterDefinition" => {
            ParamKind::StashedFile
        }
        "net.uaznia.lukanus.hudson.plugins.gitparameter.GitParameterDefinition" => ParamKind::Git,
        "com.wangyin.parameter.WHideParameterDefinition" => ParamKind::Hidden,
        "com.wangyin.ams.cms.abs.ParaReadOnly.WReadonlyStringParameterDefinition" => {
            ParamKind::ReadonlyString
        }
        "com.wangyin.ams.cms.abs.ParaReadOnly.WReadonlyTextParameterDefinition" => {
            ParamKind::ReadonlyText
        }
        "jenkins.plugins.parameter__separator.ParameterSeparatorDefinition" => ParamKind::Separator,
        "hudson.plugins.validating__string__parameter.ValidatingStringParameterDefinition" => {
            ParamKind::ValidatingString
        }
        "com.cwctravel.hudson.plugins.extended__choice__parameter.ExtendedChoiceParameterDefinition" => {
            ParamKind::ExtendedChoice
        }
        "com.michelin.cio.hudson.plugins.passwordparam.PasswordParameterDefinition" => {
            ParamKind::Password
        }
        "hudson.model.PasswordParameterDefinition" => ParamKind::Password,
        _ => return None,
    };
    Some(kind)
}
