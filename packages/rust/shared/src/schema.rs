//! Canonical output schema for normalized parameter definitions.
//!
//! This is the engine's output contract: a [`Schema`] serializes as
//! `{ root, pipelines: [ { name, parameters: [ { class, type, configs } ] } ] }`
//! with camelCase field names inside every config record. Field order matters
//! for diffable output, so struct declaration order follows the emitted JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Container types
// ---------------------------------------------------------------------------

/// Root of the exported schema: the originating folder and every discovered
/// job, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The root folder path the export started from.
    pub root: String,
    /// One entry per discovered job, in discovery order.
    pub pipelines: Vec<Pipeline>,
}

/// A single job and its parameter groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Fully qualified job path (e.g. `team/app/deploy`).
    pub name: String,
    /// Parameter groups in source declaration order. Empty if the job
    /// declares no parameters.
    pub parameters: Vec<ParameterGroup>,
}

/// All parameter records of one source kind within one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    /// The source-system implementation class (the kind identifier).
    pub class: String,
    /// Logical category tag: boolean, text, choice, credentials, file,
    /// password, or separator.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Normalized records, in source item order. A job may declare the same
    /// kind more than once.
    pub configs: Vec<ParameterConfig>,
}

// ---------------------------------------------------------------------------
// Nested script structure (scripted choice kinds)
// ---------------------------------------------------------------------------

/// A classpath entry attached to a script-bearing parameter kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClasspathEntry {
    pub path: String,
    pub old_path: String,
    pub should_be_approved: bool,
}

/// Classpath wrapper mirroring the source document nesting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classpath {
    pub classpath_entry: Vec<ClasspathEntry>,
}

/// Fallback script executed when the primary script fails. Same shape as the
/// primary script; all-defaults when the source omits it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackScript {
    pub script: String,
    pub sandbox: bool,
    pub classpath: Classpath,
}

/// The primary Groovy script with its sandbox flag, classpath, and fallback.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroovyScript {
    pub script: String,
    pub sandbox: bool,
    pub classpath: Classpath,
    pub fallback_script: FallbackScript,
}

/// Wrapper matching the source document's `script` sub-object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptHolder {
    pub groovy_script: GroovyScript,
}

// ---------------------------------------------------------------------------
// Per-kind config records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanConfig {
    pub name: String,
    pub default_value: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentBooleanConfig {
    pub name: String,
    pub description: String,
    pub default_value: bool,
    pub successful_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
    pub trim: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentStringConfig {
    pub name: String,
    pub default_value: String,
    pub successful_only: bool,
    pub description: String,
    pub trim: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
    pub trim: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentTextConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
    pub successful_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceConfig {
    pub name: String,
    pub description: String,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentChoiceConfig {
    pub name: String,
    pub description: String,
    pub successful_only: bool,
    pub choices: Vec<String>,
}

/// Active Choices plain choice parameter (script-backed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedChoiceConfig {
    pub name: String,
    pub description: String,
    pub random_name: String,
    pub choice_type: String,
    pub filterable: bool,
    pub filter_length: i64,
    pub script: ScriptHolder,
}

/// Active Choices cascading choice parameter (reacts to other parameters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeChoiceConfig {
    pub name: String,
    pub description: String,
    pub random_name: String,
    pub choice_type: String,
    pub referenced_parameters: String,
    pub filterable: bool,
    pub filter_length: i64,
    pub script: ScriptHolder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
    pub credential_type: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub default_value: String,
    pub description: String,
    pub branch: String,
    pub branch_filter: String,
    pub tag_filter: String,
    pub sort_mode: String,
    pub selected_value: String,
    pub use_repository: String,
    pub quick_filter_enabled: bool,
    pub list_size: String,
    pub required_parameter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadonlyStringConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadonlyTextConfig {
    pub name: String,
    pub default_value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparatorConfig {
    pub name: String,
    pub separator_style: String,
    pub section_header: String,
    pub section_header_style: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatingStringConfig {
    pub name: String,
    pub default_value: String,
    pub regex: String,
    pub failed_validation_message: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StashedFileConfig {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordConfig {
    pub name: String,
    pub description: String,
}

/// Extended Choice parameter. The plugin exposes an unusually wide surface;
/// every field defaults rather than erroring, matching the source plugin's
/// behavior for partially configured parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedChoiceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub value: String,
    pub project_name: String,
    pub property_file: String,
    pub groovy_script: String,
    pub groovy_script_file: String,
    pub bindings: String,
    pub groovy_classpath: String,
    pub property_key: String,
    pub default_value: String,
    pub default_property_file: String,
    pub default_groovy_script: String,
    pub default_groovy_script_file: String,
    pub default_bindings: String,
    pub default_groovy_classpath: String,
    pub default_property_key: String,
    pub description_property_value: String,
    pub description_property_file: String,
    pub description_groovy_script: String,
    pub description_groovy_script_file: String,
    pub description_bindings: String,
    pub description_groovy_classpath: String,
    pub description_property_key: String,
    pub javascript_file: String,
    pub javascript: String,
    #[serde(rename = "saveJSONParameterToFile")]
    pub save_json_parameter_to_file: bool,
    pub quote_value: bool,
    pub visible_item_count: i64,
    pub description: String,
    pub multi_select_delimiter: String,
}

// ---------------------------------------------------------------------------
// Discriminated union
// ---------------------------------------------------------------------------

/// One normalized parameter record. Serializes untagged: each variant's
/// fields appear directly on the record, matching the output contract.
///
/// Variants with more fields come first so deserialization resolves the
/// most specific shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterConfig {
    ExtendedChoice(ExtendedChoiceConfig),
    Git(GitConfig),
    CascadeChoice(CascadeChoiceConfig),
    ScriptedChoice(ScriptedChoiceConfig),
    Separator(SeparatorConfig),
    ValidatingString(ValidatingStringConfig),
    Credentials(CredentialsConfig),
    PersistentString(PersistentStringConfig),
    PersistentChoice(PersistentChoiceConfig),
    Choice(ChoiceConfig),
    PersistentBoolean(PersistentBooleanConfig),
    PersistentText(PersistentTextConfig),
    Boolean(BooleanConfig),
    String(StringConfig),
    Text(TextConfig),
    Hidden(HiddenConfig),
    ReadonlyString(ReadonlyStringConfig),
    ReadonlyText(ReadonlyTextConfig),
    File(FileConfig),
    StashedFile(StashedFileConfig),
    Password(PasswordConfig),
}
