//! Schema assembly.
//!
//! [`SchemaAssembler`] accumulates one [`Pipeline`] record per processed job,
//! in the order jobs are pushed. Jobs without parameter definitions still get
//! a record with an empty parameter list; their presence in the schema is the
//! signal that they were exported.

use tracing::debug;

use paramexport_normalize::{Registry, dispatch};
use paramexport_shared::{Pipeline, Schema};
use paramexport_xml::XmlNode;

/// Location of the parameter definitions inside a job configuration,
/// relative to the document root element.
const DEFINITIONS_PATH: &[&str] = &[
    "properties",
    "hudson.model.ParametersDefinitionProperty",
    "parameterDefinitions",
];

/// Root element tags a job configuration may carry.
const ROOT_TAGS: &[&str] = &["flow-definition", "project"];

/// Outcome of pushing one job into the schema.
#[derive(Debug, Clone, Default)]
pub struct JobOutcome {
    /// Kind identifiers in this job that had no registered normalizer.
    pub unmapped: Vec<String>,
    /// Number of parameter groups recorded for this job.
    pub group_count: usize,
}

/// Incremental schema builder for one export root.
pub struct SchemaAssembler {
    schema: Schema,
}

impl SchemaAssembler {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            schema: Schema {
                root: root.into(),
                pipelines: Vec::new(),
            },
        }
    }

    /// Resume from a previously checkpointed schema.
    pub fn resume(schema: Schema) -> Self {
        Self { schema }
    }

    /// Record one job's parameters. `document` is the converted configuration
    /// tree; an absent or empty definitions node yields an empty list.
    pub fn push_job(&mut self, registry: &Registry, path: &str, document: &XmlNode) -> JobOutcome {
        let mut outcome = JobOutcome::default();
        let mut parameters = Vec::new();

        if let Some(definitions) = locate_definitions(document) {
            let dispatched = dispatch(registry, definitions);
            outcome.unmapped = dispatched.unmapped;
            outcome.group_count = dispatched.groups.len();
            parameters = dispatched.groups;
        } else {
            debug!(job = path, "no parameter definitions in configuration");
        }

        self.schema.pipelines.push(Pipeline {
            name: path.to_string(),
            parameters,
        });
        outcome
    }

    /// Number of jobs recorded so far.
    pub fn job_count(&self) -> usize {
        self.schema.pipelines.len()
    }

    /// The assembled schema, jobs in push order.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }
}

/// Find the `parameterDefinitions` node under either supported root element.
fn locate_definitions(document: &XmlNode) -> Option<&XmlNode> {
    ROOT_TAGS
        .iter()
        .find_map(|tag| document.child(tag)?.descend(DEFINITIONS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramexport_xml::convert;
    use std::collections::BTreeMap;

    fn registry() -> Registry {
        let raw: BTreeMap<String, String> = [
            ("booleanParam", "hudson.model.BooleanParameterDefinition"),
            ("stringParam", "hudson.model.StringParameterDefinition"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Registry::build(&raw)
    }

    fn pipeline_config(definitions: &str) -> String {
        format!(
            concat!(
                "<flow-definition><properties>",
                "<hudson.model.ParametersDefinitionProperty>",
                "<parameterDefinitions>{}</parameterDefinitions>",
                "</hudson.model.ParametersDefinitionProperty>",
                "</properties></flow-definition>",
            ),
            definitions
        )
    }

    #[test]
    fn parameterized_pipeline_recorded() {
        let xml = pipeline_config(concat!(
            "<hudson.model.BooleanParameterDefinition>",
            "<name>go</name><defaultValue>true</defaultValue>",
            "</hudson.model.BooleanParameterDefinition>",
        ));
        let doc = convert(&xml).unwrap();

        let mut assembler = SchemaAssembler::new("Root");
        let outcome = assembler.push_job(&registry(), "Root/deploy", &doc);

        assert_eq!(outcome.group_count, 1);
        assert!(outcome.unmapped.is_empty());
        let schema = assembler.schema();
        assert_eq!(schema.root, "Root");
        assert_eq!(schema.pipelines[0].name, "Root/deploy");
        assert_eq!(schema.pipelines[0].parameters.len(), 1);
    }

    #[test]
    fn freestyle_project_root_supported() {
        let xml = concat!(
            "<project><properties>",
            "<hudson.model.ParametersDefinitionProperty><parameterDefinitions>",
            "<hudson.model.StringParameterDefinition><name>tag</name></hudson.model.StringParameterDefinition>",
            "</parameterDefinitions></hudson.model.ParametersDefinitionProperty>",
            "</properties></project>",
        );
        let doc = convert(xml).unwrap();

        let mut assembler = SchemaAssembler::new("Root");
        let outcome = assembler.push_job(&registry(), "Root/legacy", &doc);
        assert_eq!(outcome.group_count, 1);
    }

    #[test]
    fn job_without_parameters_still_recorded() {
        let doc = convert("<flow-definition><description>plain</description></flow-definition>")
            .unwrap();

        let mut assembler = SchemaAssembler::new("Root");
        let outcome = assembler.push_job(&registry(), "Root/plain", &doc);

        assert_eq!(outcome.group_count, 0);
        assert_eq!(assembler.schema().pipelines[0].name, "Root/plain");
        assert!(assembler.schema().pipelines[0].parameters.is_empty());
    }

    #[test]
    fn jobs_keep_push_order() {
        let doc = convert("<flow-definition/>").unwrap();
        let mut assembler = SchemaAssembler::new("Root");
        assembler.push_job(&registry(), "Root/a", &doc);
        assembler.push_job(&registry(), "Root/Sub/d", &doc);
        assembler.push_job(&registry(), "Root/b", &doc);

        let names: Vec<_> = assembler
            .schema()
            .pipelines
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Root/a", "Root/Sub/d", "Root/b"]);
    }

    #[test]
    fn unmapped_kind_surfaces_in_outcome() {
        let xml = pipeline_config(
            "<org.example.OddParameterDefinition><name>x</name></org.example.OddParameterDefinition>",
        );
        let doc = convert(&xml).unwrap();

        let mut assembler = SchemaAssembler::new("Root");
        let outcome = assembler.push_job(&registry(), "Root/odd", &doc);

        assert_eq!(outcome.unmapped, vec!["org.example.OddParameterDefinition"]);
        assert_eq!(outcome.group_count, 0);
    }
}
