//! Schema-bound reasoning and validation.
//!
//! A [`Reasoner`] binds a [`SchemaModel`] into an index usable against any
//! graph; [`Reasoner::infer`] snapshots a graph into an [`InferredView`]
//! whose `validate` reports constraint violations. Validation is advisory:
//! nothing in the change algebra consults it unless a caller opts into the
//! guarded merge mode.

use std::collections::{HashMap, HashSet};
use std::fmt;

use oxigraph::model::vocab::rdf;
use oxigraph::model::{NamedNode, Subject, Term, Triple};
use serde::Serialize;

use crate::Result;
use crate::graph::MetadataGraph;
use crate::graph::namespaces::XSD_NS;
use crate::schema::SchemaModel;

/// Severity of a reported violation. Only `Error` makes a report invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// The constraint a violation was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constraint {
    /// `rdf:type` asserts a class the schema does not define.
    UndefinedClass,
    /// A predicate the schema does not declare (warning only).
    UndeclaredProperty,
    /// Subject's types do not satisfy the property's declared domain.
    DomainMismatch,
    /// Resource object's types do not satisfy the property's declared range.
    RangeMismatch,
    /// Literal object where the declared range is a class, or vice versa.
    LiteralRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub severity: Severity,
    pub constraint: Constraint,
    pub subject: String,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {:?} on <{}>: {}",
            self.severity, self.constraint, self.subject, self.detail
        )
    }
}

/// Outcome of validating an inferred view against its schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        constraint: Constraint,
        subject: &Subject,
        detail: String,
    ) {
        self.violations.push(Violation {
            severity,
            constraint,
            subject: subject.to_string(),
            detail,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "valid, no violations");
        }
        write!(
            f,
            "{} violation(s) ({} error(s))",
            self.violations.len(),
            self.error_count()
        )?;
        for v in &self.violations {
            write!(f, "\n  {}", v)?;
        }
        Ok(())
    }
}

/// A reasoning context derived from one schema.
///
/// Holds the subclass closure and the domain/range index so repeated
/// inference over changing graphs does not re-walk the schema. Pass it
/// explicitly into operations that validate; its lifetime is scoped to the
/// service instance that built it.
#[derive(Debug, Clone)]
pub struct Reasoner {
    classes: HashSet<NamedNode>,
    properties: HashSet<NamedNode>,
    superclasses: HashMap<NamedNode, HashSet<NamedNode>>,
    domains: HashMap<NamedNode, Vec<NamedNode>>,
    ranges: HashMap<NamedNode, Vec<NamedNode>>,
}

impl Reasoner {
    /// Build a reasoning context from a schema.
    pub fn bind_schema(schema: &SchemaModel) -> Result<Self> {
        let classes = schema.classes()?;
        let properties = schema.properties()?;

        let mut superclasses = HashMap::new();
        for class in &classes {
            superclasses.insert(class.clone(), schema.superclasses_of(class)?);
        }

        let mut domains = HashMap::new();
        let mut ranges = HashMap::new();
        for property in &properties {
            let d = schema.domains_of(property)?;
            if !d.is_empty() {
                domains.insert(property.clone(), d);
            }
            let r = schema.ranges_of(property)?;
            if !r.is_empty() {
                ranges.insert(property.clone(), r);
            }
        }

        Ok(Self {
            classes,
            properties,
            superclasses,
            domains,
            ranges,
        })
    }

    /// Whether the bound schema declares anything at all. An empty schema
    /// validates every graph.
    pub fn is_vacuous(&self) -> bool {
        self.classes.is_empty() && self.properties.is_empty()
    }

    pub fn defines_class(&self, class: &NamedNode) -> bool {
        self.classes.contains(class)
    }

    pub fn declares_property(&self, property: &NamedNode) -> bool {
        self.properties.contains(property)
    }

    /// Snapshot a graph into a read-only inferred view.
    pub fn infer<'a>(&'a self, graph: &'a MetadataGraph) -> Result<InferredView<'a>> {
        let triples = graph.triples()?;

        // Asserted types first, then domain/range implications, then the
        // subclass closure over everything collected so far.
        let mut types: HashMap<NamedNode, HashSet<NamedNode>> = HashMap::new();
        let mut asserted: HashMap<NamedNode, HashSet<NamedNode>> = HashMap::new();

        for triple in &triples {
            let Subject::NamedNode(subject) = &triple.subject else {
                continue;
            };
            if triple.predicate.as_ref() == rdf::TYPE {
                if let Term::NamedNode(class) = &triple.object {
                    asserted
                        .entry(subject.clone())
                        .or_default()
                        .insert(class.clone());
                    types
                        .entry(subject.clone())
                        .or_default()
                        .insert(class.clone());
                }
                continue;
            }
            if let Some(domain_classes) = self.domains.get(&triple.predicate) {
                types
                    .entry(subject.clone())
                    .or_default()
                    .extend(domain_classes.iter().cloned());
            }
            if let Term::NamedNode(object) = &triple.object {
                if let Some(range_classes) = self.ranges.get(&triple.predicate) {
                    types
                        .entry(object.clone())
                        .or_default()
                        .extend(range_classes.iter().cloned());
                }
            }
        }

        for class_set in types.values_mut() {
            let direct: Vec<NamedNode> = class_set.iter().cloned().collect();
            for class in direct {
                if let Some(supers) = self.superclasses.get(&class) {
                    class_set.extend(supers.iter().cloned());
                }
            }
        }
        for class_set in asserted.values_mut() {
            let direct: Vec<NamedNode> = class_set.iter().cloned().collect();
            for class in direct {
                if let Some(supers) = self.superclasses.get(&class) {
                    class_set.extend(supers.iter().cloned());
                }
            }
        }

        Ok(InferredView {
            graph,
            reasoner: self,
            triples,
            types,
            asserted,
        })
    }
}

/// Read-only view of a graph augmented with schema-derived types.
///
/// The triple snapshot is taken at `infer` time; mutations applied to the
/// underlying graph afterwards are not reflected here.
pub struct InferredView<'a> {
    graph: &'a MetadataGraph,
    reasoner: &'a Reasoner,
    triples: Vec<Triple>,
    types: HashMap<NamedNode, HashSet<NamedNode>>,
    asserted: HashMap<NamedNode, HashSet<NamedNode>>,
}

impl<'a> InferredView<'a> {
    /// Types of a resource: asserted plus domain/range-implied plus the
    /// subclass closure of both.
    pub fn types_of(&self, resource: &NamedNode) -> HashSet<NamedNode> {
        self.types.get(resource).cloned().unwrap_or_default()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn objects_of(
        &self,
        subject: &NamedNode,
        predicate: Option<&NamedNode>,
    ) -> Result<Vec<Term>> {
        self.graph.objects_of(subject, predicate)
    }

    pub fn subjects_referencing(&self, object: &NamedNode) -> Result<Vec<Subject>> {
        self.graph.subjects_referencing(object)
    }

    pub fn contains_resource(&self, resource: &NamedNode) -> Result<bool> {
        self.graph.contains_resource(resource)
    }

    /// Check the snapshot against the bound schema.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.reasoner.is_vacuous() {
            return report;
        }

        for triple in &self.triples {
            if triple.predicate.as_ref() == rdf::TYPE {
                self.check_type_assertion(triple, &mut report);
            } else {
                self.check_property_use(triple, &mut report);
            }
        }

        report
    }

    fn check_type_assertion(&self, triple: &Triple, report: &mut ValidationReport) {
        match &triple.object {
            Term::NamedNode(class) => {
                if !SchemaModel::is_builtin(class.as_str())
                    && !self.reasoner.defines_class(class)
                {
                    report.push(
                        Severity::Error,
                        Constraint::UndefinedClass,
                        &triple.subject,
                        format!("type {} is not defined by the schema", class),
                    );
                }
            }
            other => {
                report.push(
                    Severity::Error,
                    Constraint::UndefinedClass,
                    &triple.subject,
                    format!("rdf:type object must be a resource, got {}", other),
                );
            }
        }
    }

    fn check_property_use(&self, triple: &Triple, report: &mut ValidationReport) {
        let property = &triple.predicate;
        if !self.reasoner.declares_property(property) {
            if !SchemaModel::is_builtin(property.as_str()) {
                report.push(
                    Severity::Warning,
                    Constraint::UndeclaredProperty,
                    &triple.subject,
                    format!("property {} is not declared by the schema", property),
                );
            }
            return;
        }

        if let Some(domains) = self.reasoner.domains.get(property) {
            let subject_types = match &triple.subject {
                Subject::NamedNode(s) => self.asserted.get(s),
                _ => None,
            };
            let satisfied = subject_types
                .map(|ts| domains.iter().any(|d| ts.contains(d)))
                .unwrap_or(false);
            if !satisfied {
                report.push(
                    Severity::Error,
                    Constraint::DomainMismatch,
                    &triple.subject,
                    format!(
                        "subject is not an instance of the domain of {}",
                        property
                    ),
                );
            }
        }

        if let Some(ranges) = self.reasoner.ranges.get(property) {
            match &triple.object {
                Term::NamedNode(object) => {
                    if ranges.iter().all(|r| r.as_str().starts_with(XSD_NS)) {
                        report.push(
                            Severity::Error,
                            Constraint::LiteralRange,
                            &triple.subject,
                            format!("{} expects a literal value, got resource {}", property, object),
                        );
                        return;
                    }
                    let object_types = self.asserted.get(object);
                    let satisfied = ranges.iter().any(|range| {
                        SchemaModel::is_builtin(range.as_str())
                            || object_types
                                .map(|ts| ts.contains(range))
                                .unwrap_or(false)
                    });
                    if !satisfied {
                        report.push(
                            Severity::Error,
                            Constraint::RangeMismatch,
                            &triple.subject,
                            format!(
                                "object {} is not an instance of the range of {}",
                                object, property
                            ),
                        );
                    }
                }
                Term::Literal(literal) => {
                    // Class-valued range with a literal object is a type
                    // error; xsd ranges only warn on datatype drift.
                    if let Some(class_range) =
                        ranges.iter().find(|r| !r.as_str().starts_with(XSD_NS))
                    {
                        report.push(
                            Severity::Error,
                            Constraint::LiteralRange,
                            &triple.subject,
                            format!(
                                "{} expects an instance of {}, got literal \"{}\"",
                                property,
                                class_range,
                                literal.value()
                            ),
                        );
                    } else if ranges
                        .iter()
                        .all(|r| r.as_ref() != literal.datatype())
                    {
                        report.push(
                            Severity::Warning,
                            Constraint::RangeMismatch,
                            &triple.subject,
                            format!(
                                "literal datatype {} does not match the declared range of {}",
                                literal.datatype(),
                                property
                            ),
                        );
                    }
                }
                other => {
                    report.push(
                        Severity::Warning,
                        Constraint::RangeMismatch,
                        &triple.subject,
                        format!("unexpected object term {}", other),
                    );
                }
            }
        }
    }
}

impl fmt::Debug for InferredView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferredView")
            .field("triples", &self.triples.len())
            .field("typed_resources", &self.types.len())
            .finish()
    }
}
