//! Per-kind normalizers.
//!
//! [`ParamKind`] is the closed set of parameter implementations the engine
//! understands. Each kind maps a raw document fragment onto one config record
//! variant via the shared decode-with-default helpers; a job declaring the
//! same kind several times yields one record per declaration, in order.

use tracing::warn;

use paramexport_shared::schema::{
    BooleanConfig, CascadeChoiceConfig, ChoiceConfig, Classpath, ClasspathEntry, CredentialsConfig,
    ExtendedChoiceConfig, FallbackScript, FileConfig, GitConfig, GroovyScript, HiddenConfig,
    ParameterConfig, PasswordConfig, PersistentBooleanConfig, PersistentChoiceConfig,
    PersistentStringConfig, PersistentTextConfig, ReadonlyStringConfig, ReadonlyTextConfig,
    ScriptHolder, ScriptedChoiceConfig, SeparatorConfig, StashedFileConfig, StringConfig,
    TextConfig, ValidatingStringConfig,
};
use paramexport_xml::XmlNode;

use crate::decode::{bool_field, int_field, text_field};

/// Container-class attribute value marking a wrapped choice list.
const ARRAY_LIST_CLASS: &str = "java.util.Arrays$ArrayList";

/// Logical parameter kinds, one per supported source implementation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Boolean,
    PersistentBoolean,
    String,
    PersistentString,
    Text,
    PersistentText,
    Choice,
    PersistentChoice,
    ScriptedChoice,
    CascadeChoice,
    Credentials,
    File,
    StashedFile,
    Git,
    Hidden,
    ReadonlyString,
    ReadonlyText,
    Separator,
    ValidatingString,
    ExtendedChoice,
    Password,
}

impl ParamKind {
    /// The logical category string emitted on the parameter group.
    pub fn category(self) -> &'static str {
        match self {
            Self::Boolean | Self::PersistentBoolean => "boolean",
            Self::Choice | Self::PersistentChoice => "choice",
            Self::Credentials => "credentials",
            Self::File | Self::StashedFile => "file",
            Self::Password => "password",
            Self::Separator => "separator",
            Self::String
            | Self::PersistentString
            | Self::Text
            | Self::PersistentText
            | Self::ScriptedChoice
            | Self::CascadeChoice
            | Self::Git
            | Self::Hidden
            | Self::ReadonlyString
            | Self::ReadonlyText
            | Self::ValidatingString
            | Self::ExtendedChoice => "text",
        }
    }

    /// Normalize an ordered sibling sequence of raw items for this kind.
    /// A singleton fragment is simply a one-element slice; both shapes are
    /// processed identically.
    pub fn normalize(self, items: &[&XmlNode]) -> Vec<ParameterConfig> {
        items.iter().map(|item| self.normalize_item(item)).collect()
    }

    fn normalize_item(self, item: &XmlNode) -> ParameterConfig {
        match self {
            Self::Boolean => ParameterConfig::Boolean(BooleanConfig {
                name: text_field(item, "name"),
                default_value: bool_field(item, "defaultValue"),
                description: text_field(item, "description"),
            }),
            Self::PersistentBoolean => {
                ParameterConfig::PersistentBoolean(PersistentBooleanConfig {
                    name: text_field(item, "name"),
                    description: text_field(item, "description"),
                    default_value: bool_field(item, "defaultValue"),
                    successful_only: bool_field(item, "successfulOnly"),
                })
            }
            Self::String => ParameterConfig::String(StringConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
                trim: bool_field(item, "trim"),
            }),
            Self::PersistentString => ParameterConfig::PersistentString(PersistentStringConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                successful_only: bool_field(item, "successfulOnly"),
                description: text_field(item, "description"),
                trim: bool_field(item, "trim"),
            }),
            Self::Text => ParameterConfig::Text(TextConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
                trim: bool_field(item, "trim"),
            }),
            Self::PersistentText => ParameterConfig::PersistentText(PersistentTextConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
                successful_only: bool_field(item, "successfulOnly"),
            }),
            Self::Choice => ParameterConfig::Choice(ChoiceConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
                choices: choice_list(item),
            }),
            Self::PersistentChoice => ParameterConfig::PersistentChoice(PersistentChoiceConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
                successful_only: bool_field(item, "successfulOnly"),
                choices: choice_list(item),
            }),
            Self::ScriptedChoice => ParameterConfig::ScriptedChoice(ScriptedChoiceConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
                random_name: text_field(item, "randomName"),
                choice_type: text_field(item, "choiceType"),
                filterable: bool_field(item, "filterable"),
                filter_length: int_field(item, "filterLength"),
                script: script_holder(item),
            }),
            Self::CascadeChoice => ParameterConfig::CascadeChoice(CascadeChoiceConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
                random_name: text_field(item, "randomName"),
                choice_type: text_field(item, "choiceType"),
                referenced_parameters: text_field(item, "referencedParameters"),
                filterable: bool_field(item, "filterable"),
                filter_length: int_field(item, "filterLength"),
                script: script_holder(item),
            }),
            Self::Credentials => ParameterConfig::Credentials(CredentialsConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
                credential_type: text_field(item, "credentialType"),
                required: bool_field(item, "required"),
            }),
            Self::File => ParameterConfig::File(FileConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
            }),
            Self::StashedFile => ParameterConfig::StashedFile(StashedFileConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
            }),
            Self::Git => ParameterConfig::Git(GitConfig {
                name: text_field(item, "name"),
                param_type: text_field(item, "type"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
                branch: text_field(item, "branch"),
                branch_filter: text_field(item, "branchFilter"),
                tag_filter: text_field(item, "tagFilter"),
                sort_mode: text_field(item, "sortMode"),
                selected_value: text_field(item, "selectedValue"),
                use_repository: text_field(item, "useRepository"),
                quick_filter_enabled: bool_field(item, "quickFilterEnabled"),
                list_size: text_field(item, "listSize"),
                required_parameter: bool_field(item, "requiredParameter"),
            }),
            Self::Hidden => ParameterConfig::Hidden(HiddenConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
            }),
            Self::ReadonlyString => ParameterConfig::ReadonlyString(ReadonlyStringConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
            }),
            Self::ReadonlyText => ParameterConfig::ReadonlyText(ReadonlyTextConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                description: text_field(item, "description"),
            }),
            Self::Separator => ParameterConfig::Separator(SeparatorConfig {
                name: text_field(item, "name"),
                separator_style: text_field(item, "separatorStyle"),
                section_header: text_field(item, "sectionHeader"),
                section_header_style: text_field(item, "sectionHeaderStyle"),
                description: text_field(item, "description"),
            }),
            Self::ValidatingString => ParameterConfig::ValidatingString(ValidatingStringConfig {
                name: text_field(item, "name"),
                default_value: text_field(item, "defaultValue"),
                regex: text_field(item, "regex"),
                failed_validation_message: text_field(item, "failedValidationMessage"),
                description: text_field(item, "description"),
            }),
            Self::ExtendedChoice => ParameterConfig::ExtendedChoice(ExtendedChoiceConfig {
                name: text_field(item, "name"),
                param_type: text_field(item, "type"),
                value: text_field(item, "value"),
                project_name: text_field(item, "projectName"),
                property_file: text_field(item, "propertyFile"),
                groovy_script: text_field(item, "groovyScript"),
                groovy_script_file: text_field(item, "groovyScriptFile"),
                bindings: text_field(item, "bindings"),
                groovy_classpath: text_field(item, "groovyClasspath"),
                property_key: text_field(item, "propertyKey"),
                default_value: text_field(item, "defaultValue"),
                default_property_file: text_field(item, "defaultPropertyFile"),
                default_groovy_script: text_field(item, "defaultGroovyScript"),
                default_groovy_script_file: text_field(item, "defaultGroovyScriptFile"),
                default_bindings: text_field(item, "defaultBindings"),
                default_groovy_classpath: text_field(item, "defaultGroovyClasspath"),
                default_property_key: text_field(item, "defaultPropertyKey"),
                description_property_value: text_field(item, "descriptionPropertyValue"),
                description_property_file: text_field(item, "descriptionPropertyFile"),
                description_groovy_script: text_field(item, "descriptionGroovyScript"),
                description_groovy_script_file: text_field(item, "descriptionGroovyScriptFile"),
                description_bindings: text_field(item, "descriptionBindings"),
                description_groovy_classpath: text_field(item, "descriptionGroovyClasspath"),
                description_property_key: text_field(item, "descriptionPropertyKey"),
                javascript_file: text_field(item, "javascriptFile"),
                javascript: text_field(item, "javascript"),
                save_json_parameter_to_file: bool_field(item, "saveJSONParameterToFile"),
                quote_value: bool_field(item, "quoteValue"),
                visible_item_count: int_field(item, "visibleItemCount"),
                description: text_field(item, "description"),
                multi_select_delimiter: text_field(item, "multiSelectDelimiter"),
            }),
            Self::Password => ParameterConfig::Password(PasswordConfig {
                name: text_field(item, "name"),
                description: text_field(item, "description"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Choice list extraction
// ---------------------------------------------------------------------------

/// Flatten a choice list to an ordered string sequence.
///
/// Two encodings exist upstream: strings directly under `choices`, or — when
/// the node carries the array-list container class — nested one level deeper
/// under an `a` wrapper. Anything else is a reported anomaly, not a guess.
fn choice_list(item: &XmlNode) -> Vec<String> {
    let Some(choices) = item.child("choices") else {
        return Vec::new();
    };

    let holder = if choices.attr("class") == Some(ARRAY_LIST_CLASS) {
        match choices.child("a") {
            Some(wrapper) => wrapper,
            None => {
                warn!(
                    name = %text_field(item, "name"),
                    "choices node tagged as array list but has no wrapper element"
                );
                return Vec::new();
            }
        }
    } else {
        choices
    };

    let strings = holder.children_named("string");
    if strings.is_empty() && !holder.children.is_empty() {
        warn!(
            name = %text_field(item, "name"),
            "unrecognized choice list shape, emitting empty list"
        );
    }

    strings
        .iter()
        .map(|node| node.text.clone().unwrap_or_default())
        .collect()
}

// ---------------------------------------------------------------------------
// Nested script extraction
// ---------------------------------------------------------------------------

/// Extract the two-level script structure of the Active Choices kinds:
/// primary secure script and fallback script, each with its own classpath.
/// A missing fallback yields an all-defaults record.
fn script_holder(item: &XmlNode) -> ScriptHolder {
    let script = item.child("script");
    let secure = script.and_then(|node| node.child("secureScript"));
    let fallback = script.and_then(|node| node.child("secureFallbackScript"));

    ScriptHolder {
        groovy_script: GroovyScript {
            script: secure.map(|s| text_field(s, "script")).unwrap_or_default(),
            sandbox: secure.map(|s| bool_field(s, "sandbox")).unwrap_or(false),
            classpath: classpath_entries(secure),
            fallback_script: FallbackScript {
                script: fallback.map(|s| text_field(s, "script")).unwrap_or_default(),
                sandbox: fallback.map(|s| bool_field(s, "sandbox")).unwrap_or(false),
                classpath: classpath_entries(fallback),
            },
        },
    }
}

fn classpath_entries(script: Option<&XmlNode>) -> Classpath {
    let entries = script
        .and_then(|node| node.child("classpath"))
        .map(|cp| cp.children_named("classpathEntry"))
        .unwrap_or_default();

    Classpath {
        classpath_entry: entries
            .iter()
            .map(|entry| ClasspathEntry {
                path: text_field(entry, "path"),
                old_path: text_field(entry, "oldPath"),
                should_be_approved: bool_field(entry, "shouldBeApproved"),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramexport_xml::convert;

    fn item(xml: &str) -> XmlNode {
        let doc = convert(xml).expect("well-formed test fixture");
        doc.children.into_iter().next().expect("root element").1
    }

    #[test]
    fn boolean_all_fields() {
        let node = item(
            "<p><name>go</name><defaultValue>true</defaultValue><description>run it</description></p>",
        );
        let configs = ParamKind::Boolean.normalize(&[&node]);
        assert_eq!(
            configs,
            vec![ParameterConfig::Boolean(BooleanConfig {
                name: "go".into(),
                default_value: true,
                description: "run it".into(),
            })]
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let node = item("<p><name>only-name</name></p>");

        let configs = ParamKind::String.normalize(&[&node]);
        let ParameterConfig::String(config) = &configs[0] else {
            panic!("expected string config");
        };
        assert_eq!(config.name, "only-name");
        assert_eq!(config.default_value, "");
        assert_eq!(config.description, "");
        assert!(!config.trim);
    }

    #[test]
    fn normalize_is_idempotent() {
        let node = item(
            "<p><name>env</name><description>d</description><choices><string>x</string><string>y</string></choices></p>",
        );
        let first = ParamKind::Choice.normalize(&[&node]);
        let second = ParamKind::Choice.normalize(&[&node]);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn multiple_items_normalize_in_order() {
        let a = item("<p><name>first</name></p>");
        let b = item("<p><name>second</name></p>");
        let configs = ParamKind::Text.normalize(&[&a, &b]);
        assert_eq!(configs.len(), 2);
        let ParameterConfig::Text(first) = &configs[0] else {
            panic!("expected text config");
        };
        assert_eq!(first.name, "first");
    }

    #[test]
    fn plain_choice_list_direct_strings() {
        let node = item(
            "<p><name>env</name><choices><string>x</string><string>y</string><string>z</string></choices></p>",
        );
        let ParameterConfig::Choice(config) = &ParamKind::Choice.normalize(&[&node])[0] else {
            panic!("expected choice config");
        };
        assert_eq!(config.choices, vec!["x", "y", "z"]);
    }

    #[test]
    fn wrapped_choice_list_branches_on_class_attribute() {
        let node = item(concat!(
            r#"<p><name>env</name><choices class="java.util.Arrays$ArrayList">"#,
            "<a><string>dev</string><string>prod</string></a>",
            "</choices></p>",
        ));
        let ParameterConfig::Choice(config) = &ParamKind::Choice.normalize(&[&node])[0] else {
            panic!("expected choice config");
        };
        assert_eq!(config.choices, vec!["dev", "prod"]);
    }

    #[test]
    fn singleton_choice_becomes_one_element_list() {
        let node = item("<p><name>env</name><choices><string>only</string></choices></p>");
        let ParameterConfig::Choice(config) = &ParamKind::Choice.normalize(&[&node])[0] else {
            panic!("expected choice config");
        };
        assert_eq!(config.choices, vec!["only"]);
    }

    #[test]
    fn unrecognized_choice_shape_yields_empty_list() {
        let node = item("<p><name>odd</name><choices><entry>x</entry></choices></p>");
        let ParameterConfig::Choice(config) = &ParamKind::Choice.normalize(&[&node])[0] else {
            panic!("expected choice config");
        };
        assert!(config.choices.is_empty());
    }

    #[test]
    fn persistent_choice_carries_successful_only() {
        let node = item(concat!(
            "<p><name>env</name><successfulOnly>true</successfulOnly>",
            "<choices><string>a</string></choices></p>",
        ));
        let ParameterConfig::PersistentChoice(config) =
            &ParamKind::PersistentChoice.normalize(&[&node])[0]
        else {
            panic!("expected persistent choice config");
        };
        assert!(config.successful_only);
        assert_eq!(config.choices, vec!["a"]);
    }

    #[test]
    fn scripted_choice_extracts_both_script_levels() {
        let node = item(concat!(
            "<p><name>targets</name><filterLength>2</filterLength><script>",
            "<secureScript><script>return ['a']</script><sandbox>true</sandbox>",
            "<classpath>",
            "<classpathEntry><path>lib/a.jar</path><oldPath>old/a.jar</oldPath>",
            "<shouldBeApproved>true</shouldBeApproved></classpathEntry>",
            "<classpathEntry><path>lib/b.jar</path></classpathEntry>",
            "</classpath></secureScript>",
            "<secureFallbackScript><script>return []</script><sandbox>false</sandbox>",
            "</secureFallbackScript>",
            "</script></p>",
        ));

        let ParameterConfig::ScriptedChoice(config) =
            &ParamKind::ScriptedChoice.normalize(&[&node])[0]
        else {
            panic!("expected scripted choice config");
        };

        let groovy = &config.script.groovy_script;
        assert_eq!(groovy.script, "return ['a']");
        assert!(groovy.sandbox);
        assert_eq!(groovy.classpath.classpath_entry.len(), 2);
        assert_eq!(groovy.classpath.classpath_entry[0].path, "lib/a.jar");
        assert!(groovy.classpath.classpath_entry[0].should_be_approved);
        assert_eq!(groovy.classpath.classpath_entry[1].old_path, "");

        assert_eq!(groovy.fallback_script.script, "return []");
        assert!(!groovy.fallback_script.sandbox);
        assert!(groovy.fallback_script.classpath.classpath_entry.is_empty());
        assert_eq!(config.filter_length, 2);
    }

    #[test]
    fn missing_fallback_script_defaults_not_errors() {
        let node = item(concat!(
            "<p><name>t</name><script>",
            "<secureScript><script>x</script><sandbox>true</sandbox></secureScript>",
            "</script></p>",
        ));

        let ParameterConfig::CascadeChoice(config) =
            &ParamKind::CascadeChoice.normalize(&[&node])[0]
        else {
            panic!("expected cascade choice config");
        };
        let fallback = &config.script.groovy_script.fallback_script;
        assert_eq!(fallback.script, "");
        assert!(!fallback.sandbox);
        assert!(fallback.classpath.classpath_entry.is_empty());
    }

    #[test]
    fn git_parameter_full_surface() {
        let node = item(concat!(
            "<p><name>rev</name><type>PT_BRANCH</type><branch>main</branch>",
            "<quickFilterEnabled>true</quickFilterEnabled><listSize>5</listSize></p>",
        ));
        let ParameterConfig::Git(config) = &ParamKind::Git.normalize(&[&node])[0] else {
            panic!("expected git config");
        };
        assert_eq!(config.param_type, "PT_BRANCH");
        assert_eq!(config.branch, "main");
        assert!(config.quick_filter_enabled);
        // listSize is a string in the source model
        assert_eq!(config.list_size, "5");
        assert!(!config.required_parameter);
    }

    #[test]
    fn category_strings_match_output_contract() {
        assert_eq!(ParamKind::Boolean.category(), "boolean");
        assert_eq!(ParamKind::PersistentBoolean.category(), "boolean");
        assert_eq!(ParamKind::Choice.category(), "choice");
        assert_eq!(ParamKind::Credentials.category(), "credentials");
        assert_eq!(ParamKind::StashedFile.category(), "file");
        assert_eq!(ParamKind::Password.category(), "password");
        assert_eq!(ParamKind::Separator.category(), "separator");
        assert_eq!(ParamKind::Git.category(), "text");
        assert_eq!(ParamKind::ExtendedChoice.category(), "text");
    }
}
