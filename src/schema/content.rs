//! Content models: which children and attributes each category accepts.

use indexmap::IndexMap;

use super::SchemaRelease;
use super::category::Category;
use crate::base::Name;
use crate::base::naming::{is_valid_short_name, is_valid_tag_name};

/// Language codes accepted by the `L` attribute of `L-4` / `L-2`.
const LANGUAGE_CODES: &[&str] = &["FOR-ALL", "DE", "EN", "ES", "FR", "IT", "JA", "KO", "ZH"];

/// Lexical constraint on an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeConstraint {
    /// Any text.
    Text,
    /// One of a fixed set of values.
    Enumeration(&'static [&'static str]),
    /// An UPPERCASE-HYPHENATED category tag (`DEST`).
    TagName,
    /// An RFC 4122 UUID, with or without braces.
    Uuid,
    /// An AUTOSAR identifier.
    Identifier,
    /// A decimal integer within `min..=max`.
    Integer { min: i64, max: i64 },
}

impl AttributeConstraint {
    /// Check a value, returning a description of the violation.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Self::Text => Ok(()),
            Self::Enumeration(allowed) => {
                if allowed.contains(&value) {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not one of {}", allowed.join(", ")))
                }
            }
            Self::TagName => {
                if is_valid_tag_name(value) {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not an UPPERCASE-HYPHENATED category name"))
                }
            }
            Self::Uuid => uuid::Uuid::parse_str(value.trim_matches(|c| c == '{' || c == '}'))
                .map(|_| ())
                .map_err(|e| format!("'{value}' is not a UUID: {e}")),
            Self::Identifier => {
                if is_valid_short_name(value) {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not a valid identifier"))
                }
            }
            Self::Integer { min, max } => match value.trim().parse::<i64>() {
                Ok(n) if (*min..=*max).contains(&n) => Ok(()),
                Ok(n) => Err(format!("{n} is outside {min}..={max}")),
                Err(_) => Err(format!("'{value}' is not an integer")),
            },
        }
    }
}

/// How a child category is inserted under a parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The parent accepts the child directly.
    Direct,
    /// The child goes into an aggregation wrapper (e.g. `ELEMENTS`) of the parent.
    Wrapped(Category),
}

/// The content model of one category in one schema release.
#[derive(Clone, Debug, Default)]
pub struct ContentModel {
    /// Elements of this category carry a SHORT-NAME and contribute a path segment.
    pub identifiable: bool,
    /// Text content is a reference path qualified by a `DEST` attribute.
    pub reference: bool,
    /// Categories allowed as direct children, in schema order.
    pub allowed_children: Vec<Category>,
    /// Attributes that must be present.
    pub required_attributes: Vec<Name>,
    /// Declared attributes and the lexical constraint on their values.
    pub attribute_constraints: IndexMap<Name, AttributeConstraint>,
    /// Attributes whose value is a reference path, with the category the
    /// target must have.
    pub reference_attributes: IndexMap<Name, Category>,
}

impl ContentModel {
    fn identifiable(children: &[Category]) -> Self {
        let mut model = Self {
            identifiable: true,
            allowed_children: children.to_vec(),
            ..Self::default()
        };
        model.declare("UUID", AttributeConstraint::Uuid);
        model.declare("S", AttributeConstraint::Text);
        model.declare("T", AttributeConstraint::Text);
        model
    }

    fn wrapper(children: &[Category]) -> Self {
        Self {
            allowed_children: children.to_vec(),
            ..Self::default()
        }
    }

    fn leaf() -> Self {
        Self::default()
    }

    fn reference() -> Self {
        let mut model = Self {
            reference: true,
            ..Self::default()
        };
        model.require("DEST", AttributeConstraint::TagName);
        model.declare("BASE", AttributeConstraint::Identifier);
        model
    }

    fn language_text() -> Self {
        let mut model = Self::default();
        model.require("L", AttributeConstraint::Enumeration(LANGUAGE_CODES));
        model
    }

    fn ecuc_value(children: &[Category]) -> Self {
        let mut model = Self::wrapper(children);
        model.declare(
            "INDEX",
            AttributeConstraint::Integer {
                min: 0,
                max: i64::from(u32::MAX),
            },
        );
        model
    }

    fn reference_attribute(&mut self, name: &str, dest: Category) {
        self.declare(name, AttributeConstraint::Text);
        self.reference_attributes.insert(Name::new(name), dest);
    }

    fn declare(&mut self, name: &str, constraint: AttributeConstraint) {
        self.attribute_constraints.insert(Name::new(name), constraint);
    }

    fn require(&mut self, name: &str, constraint: AttributeConstraint) {
        self.declare(name, constraint);
        self.required_attributes.push(Name::new(name));
    }

    /// Whether `child` may appear directly inside this category.
    pub fn allows(&self, child: &Category) -> bool {
        self.allowed_children.contains(child)
    }

    /// Whether attribute `name` is declared for this category.
    pub fn declares(&self, name: &str) -> bool {
        self.attribute_constraints.contains_key(name)
    }
}

/// Build the content model table for one release.
pub(super) fn table_for(release: SchemaRelease) -> Vec<(Category, ContentModel)> {
    use Category::*;

    let doc = [LongName, Desc];
    let with_doc = |extra: &[Category]| -> Vec<Category> {
        doc.iter().cloned().chain(extra.iter().cloned()).collect()
    };

    let secure_com_props = if release >= SchemaRelease::R22_11 {
        Category::from_tag("SECURE-COM-PROPS-SET")
    } else {
        Category::from_tag("SECURE-COM-PROPS")
    };

    let mut packageable = vec![
        Element,
        ApplicationSwComponentType,
        SenderReceiverInterface,
        ApplicationPrimitiveDataType,
        EcucModuleConfigurationValues,
        secure_com_props.clone(),
    ];
    let firewall_rule = Category::from_tag("FIREWALL-RULE");
    if release >= SchemaRelease::R24_11 {
        packageable.push(firewall_rule.clone());
    }

    let mut root = ContentModel::wrapper(&[ArPackages]);
    root.declare("xmlns", AttributeConstraint::Text);
    root.declare("xmlns:xsi", AttributeConstraint::Text);
    root.declare("xsi:schemaLocation", AttributeConstraint::Text);

    let mut table = vec![
        (Autosar, root),
        (ArPackages, ContentModel::wrapper(&[ArPackage])),
        (
            ArPackage,
            ContentModel::identifiable(&with_doc(&[Elements, ArPackages])),
        ),
        (Elements, ContentModel::wrapper(&packageable)),
        (LongName, ContentModel::wrapper(&[L4])),
        (Desc, ContentModel::wrapper(&[L2])),
        (L4, ContentModel::language_text()),
        (L2, ContentModel::language_text()),
        // Generic configuration elements
        (Element, {
            let mut model = ContentModel::identifiable(&with_doc(&[Ref, Containers]));
            model.reference_attribute("EXTENDS", Element);
            model
        }),
        (Containers, ContentModel::wrapper(&[Container, EcucContainerValue])),
        (
            Container,
            ContentModel::identifiable(&with_doc(&[Parameters, References, SubContainers])),
        ),
        (SubContainers, ContentModel::wrapper(&[Container, EcucContainerValue])),
        (Parameters, ContentModel::wrapper(&[Parameter])),
        (Parameter, ContentModel::identifiable(&with_doc(&[Value]))),
        (References, ContentModel::wrapper(&[Reference])),
        (Reference, ContentModel::identifiable(&with_doc(&[Ref]))),
        (Ref, ContentModel::reference()),
        (Value, ContentModel::leaf()),
        // ECU configuration values
        (
            EcucModuleConfigurationValues,
            ContentModel::identifiable(&with_doc(&[DefinitionRef, Containers])),
        ),
        (
            EcucContainerValue,
            ContentModel::identifiable(&with_doc(&[
                DefinitionRef,
                ParameterValues,
                ReferenceValues,
                SubContainers,
            ])),
        ),
        (
            ParameterValues,
            ContentModel::wrapper(&[EcucNumericalParamValue, EcucTextualParamValue]),
        ),
        (ReferenceValues, ContentModel::wrapper(&[EcucReferenceValue])),
        (EcucNumericalParamValue, ContentModel::ecuc_value(&[DefinitionRef, Value])),
        (EcucTextualParamValue, ContentModel::ecuc_value(&[DefinitionRef, Value])),
        (EcucReferenceValue, ContentModel::ecuc_value(&[DefinitionRef, ValueRef])),
        (DefinitionRef, ContentModel::reference()),
        (ValueRef, ContentModel::reference()),
        // Software components and interfaces
        (
            ApplicationSwComponentType,
            ContentModel::identifiable(&with_doc(&[Ports])),
        ),
        (Ports, ContentModel::wrapper(&[PPortPrototype, RPortPrototype])),
        (
            PPortPrototype,
            ContentModel::identifiable(&with_doc(&[ProvidedInterfaceTref])),
        ),
        (
            RPortPrototype,
            ContentModel::identifiable(&with_doc(&[RequiredInterfaceTref])),
        ),
        (ProvidedInterfaceTref, ContentModel::reference()),
        (RequiredInterfaceTref, ContentModel::reference()),
        (
            SenderReceiverInterface,
            ContentModel::identifiable(&with_doc(&[DataElements])),
        ),
        (DataElements, ContentModel::wrapper(&[VariableDataPrototype])),
        (
            VariableDataPrototype,
            ContentModel::identifiable(&with_doc(&[TypeTref])),
        ),
        (TypeTref, ContentModel::reference()),
        (
            ApplicationPrimitiveDataType,
            ContentModel::identifiable(&with_doc(&[])),
        ),
        (secure_com_props, ContentModel::identifiable(&with_doc(&[]))),
    ];
    if release >= SchemaRelease::R24_11 {
        table.push((firewall_rule, ContentModel::identifiable(&with_doc(&[]))));
    }
    table
}
