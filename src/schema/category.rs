//! Element categories (ARXML tag names).
//!
//! Well-known categories are enum variants so schema lookups hash a small
//! discriminant; everything else lands in [`Category::Other`] and is looked up
//! by tag text.

use std::fmt;

use crate::base::Name;
use crate::base::naming::normalize_tag_name;

/// The category (tag name) of an ARXML element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    // Document skeleton
    Autosar,
    ArPackages,
    ArPackage,
    Elements,

    // Documentation
    LongName,
    Desc,
    L4,
    L2,

    // Generic configuration elements
    Element,
    Containers,
    Container,
    SubContainers,
    Parameters,
    Parameter,
    References,
    Reference,
    Ref,
    Value,

    // ECU configuration values
    EcucModuleConfigurationValues,
    EcucContainerValue,
    ParameterValues,
    ReferenceValues,
    EcucNumericalParamValue,
    EcucTextualParamValue,
    EcucReferenceValue,
    DefinitionRef,
    ValueRef,

    // Software components and interfaces
    ApplicationSwComponentType,
    Ports,
    PPortPrototype,
    RPortPrototype,
    ProvidedInterfaceTref,
    RequiredInterfaceTref,
    SenderReceiverInterface,
    DataElements,
    VariableDataPrototype,
    TypeTref,
    ApplicationPrimitiveDataType,

    /// Any category without a dedicated variant.
    Other(Name),
}

impl Category {
    /// Parse a tag name. Unknown tags become [`Category::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "AUTOSAR" => Self::Autosar,
            "AR-PACKAGES" => Self::ArPackages,
            "AR-PACKAGE" => Self::ArPackage,
            "ELEMENTS" => Self::Elements,
            "LONG-NAME" => Self::LongName,
            "DESC" => Self::Desc,
            "L-4" => Self::L4,
            "L-2" => Self::L2,
            "ELEMENT" => Self::Element,
            "CONTAINERS" => Self::Containers,
            "CONTAINER" => Self::Container,
            "SUB-CONTAINERS" => Self::SubContainers,
            "PARAMETERS" => Self::Parameters,
            "PARAMETER" => Self::Parameter,
            "REFERENCES" => Self::References,
            "REFERENCE" => Self::Reference,
            "REF" => Self::Ref,
            "VALUE" => Self::Value,
            "ECUC-MODULE-CONFIGURATION-VALUES" => Self::EcucModuleConfigurationValues,
            "ECUC-CONTAINER-VALUE" => Self::EcucContainerValue,
            "PARAMETER-VALUES" => Self::ParameterValues,
            "REFERENCE-VALUES" => Self::ReferenceValues,
            "ECUC-NUMERICAL-PARAM-VALUE" => Self::EcucNumericalParamValue,
            "ECUC-TEXTUAL-PARAM-VALUE" => Self::EcucTextualParamValue,
            "ECUC-REFERENCE-VALUE" => Self::EcucReferenceValue,
            "DEFINITION-REF" => Self::DefinitionRef,
            "VALUE-REF" => Self::ValueRef,
            "APPLICATION-SW-COMPONENT-TYPE" => Self::ApplicationSwComponentType,
            "PORTS" => Self::Ports,
            "P-PORT-PROTOTYPE" => Self::PPortPrototype,
            "R-PORT-PROTOTYPE" => Self::RPortPrototype,
            "PROVIDED-INTERFACE-TREF" => Self::ProvidedInterfaceTref,
            "REQUIRED-INTERFACE-TREF" => Self::RequiredInterfaceTref,
            "SENDER-RECEIVER-INTERFACE" => Self::SenderReceiverInterface,
            "DATA-ELEMENTS" => Self::DataElements,
            "VARIABLE-DATA-PROTOTYPE" => Self::VariableDataPrototype,
            "TYPE-TREF" => Self::TypeTref,
            "APPLICATION-PRIMITIVE-DATA-TYPE" => Self::ApplicationPrimitiveDataType,
            other => Self::Other(Name::new(other)),
        }
    }

    /// Parse a user-supplied category name, normalizing it to tag form first.
    pub fn parse(name: &str) -> Self {
        Self::from_tag(&normalize_tag_name(name))
    }

    /// The tag text written to ARXML.
    pub fn tag(&self) -> &str {
        match self {
            Self::Autosar => "AUTOSAR",
            Self::ArPackages => "AR-PACKAGES",
            Self::ArPackage => "AR-PACKAGE",
            Self::Elements => "ELEMENTS",
            Self::LongName => "LONG-NAME",
            Self::Desc => "DESC",
            Self::L4 => "L-4",
            Self::L2 => "L-2",
            Self::Element => "ELEMENT",
            Self::Containers => "CONTAINERS",
            Self::Container => "CONTAINER",
            Self::SubContainers => "SUB-CONTAINERS",
            Self::Parameters => "PARAMETERS",
            Self::Parameter => "PARAMETER",
            Self::References => "REFERENCES",
            Self::Reference => "REFERENCE",
            Self::Ref => "REF",
            Self::Value => "VALUE",
            Self::EcucModuleConfigurationValues => "ECUC-MODULE-CONFIGURATION-VALUES",
            Self::EcucContainerValue => "ECUC-CONTAINER-VALUE",
            Self::ParameterValues => "PARAMETER-VALUES",
            Self::ReferenceValues => "REFERENCE-VALUES",
            Self::EcucNumericalParamValue => "ECUC-NUMERICAL-PARAM-VALUE",
            Self::EcucTextualParamValue => "ECUC-TEXTUAL-PARAM-VALUE",
            Self::EcucReferenceValue => "ECUC-REFERENCE-VALUE",
            Self::DefinitionRef => "DEFINITION-REF",
            Self::ValueRef => "VALUE-REF",
            Self::ApplicationSwComponentType => "APPLICATION-SW-COMPONENT-TYPE",
            Self::Ports => "PORTS",
            Self::PPortPrototype => "P-PORT-PROTOTYPE",
            Self::RPortPrototype => "R-PORT-PROTOTYPE",
            Self::ProvidedInterfaceTref => "PROVIDED-INTERFACE-TREF",
            Self::RequiredInterfaceTref => "REQUIRED-INTERFACE-TREF",
            Self::SenderReceiverInterface => "SENDER-RECEIVER-INTERFACE",
            Self::DataElements => "DATA-ELEMENTS",
            Self::VariableDataPrototype => "VARIABLE-DATA-PROTOTYPE",
            Self::TypeTref => "TYPE-TREF",
            Self::ApplicationPrimitiveDataType => "APPLICATION-PRIMITIVE-DATA-TYPE",
            Self::Other(tag) => tag.as_str(),
        }
    }

    /// Returns true for the ECUC value categories that must carry a DEFINITION-REF.
    pub fn is_ecuc_value(&self) -> bool {
        matches!(
            self,
            Self::EcucModuleConfigurationValues
                | Self::EcucContainerValue
                | Self::EcucNumericalParamValue
                | Self::EcucTextualParamValue
                | Self::EcucReferenceValue
        )
    }

    /// Tag-shape fallback for categories the schema does not describe.
    pub fn looks_like_reference(&self) -> bool {
        let tag = self.tag();
        tag == "REF" || tag.ends_with("-REF") || tag.ends_with("-TREF")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}
