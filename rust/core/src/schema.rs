//! IFC Schema Types
//!
//! Fast type checking using an enum instead of string comparison. Types the
//! optimization passes never look at fall back to `Unknown`, which keeps the
//! original spelling so entities of any type survive a write round trip.

use std::fmt;
use std::sync::Arc;

/// IFC Entity Types
/// Common IFC4 types for fast pattern matching
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IfcType {
    // Structural Elements
    IfcWall,
    IfcWallStandardCase,
    IfcSlab,
    IfcBeam,
    IfcColumn,
    IfcRoof,
    IfcStair,
    IfcRamp,
    IfcRailing,
    IfcCurtainWall,
    IfcPlate,
    IfcMember,
    IfcCovering,
    IfcFooting,
    IfcPile,
    IfcBuildingElementProxy,

    // Openings
    IfcDoor,
    IfcWindow,
    IfcOpeningElement,

    // Spaces
    IfcSpace,
    IfcBuildingStorey,
    IfcBuilding,
    IfcSite,
    IfcProject,

    // Relationships
    IfcRelAggregates,
    IfcRelNests,
    IfcRelContainedInSpatialStructure,
    IfcRelDefinesByProperties,
    IfcRelDefinesByType,
    IfcRelAssignsToGroup,
    IfcRelAssignsToProduct,
    IfcRelConnectsElements,
    IfcRelConnectsPathElements,
    IfcRelAssociatesMaterial,
    IfcRelAssociatesClassification,
    IfcRelAssociatesDocument,
    IfcRelVoidsElement,
    IfcRelFillsElement,
    IfcRelSpaceBoundary,

    // Properties
    IfcPropertySet,
    IfcPropertySingleValue,
    IfcPropertyEnumeratedValue,
    IfcElementQuantity,

    // Materials
    IfcMaterial,
    IfcMaterialLayer,
    IfcMaterialLayerSet,
    IfcMaterialLayerSetUsage,

    // Classifications
    IfcClassification,
    IfcClassificationReference,

    // Geometry
    IfcShapeRepresentation,
    IfcProductDefinitionShape,
    IfcExtrudedAreaSolid,
    IfcAxis2Placement2D,
    IfcAxis2Placement3D,
    IfcLocalPlacement,
    IfcCartesianPoint,
    IfcDirection,
    IfcPolyline,
    IfcGeometricRepresentationContext,
    IfcRectangleProfileDef,

    // MEP
    IfcFlowSegment,
    IfcFlowTerminal,
    IfcDistributionElement,

    // Furniture
    IfcFurnishingElement,

    // Metadata
    IfcOwnerHistory,
    IfcPerson,
    IfcOrganization,
    IfcPersonAndOrganization,
    IfcApplication,

    // Units
    IfcSIUnit,
    IfcUnitAssignment,

    // Fallback: keeps the original spelling for write-back
    Unknown(Arc<str>),
}

impl IfcType {
    /// Parse an IFC type tag (STEP files carry them in upper case).
    /// Unrecognized tags are preserved verbatim as `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "IFCWALL" => Self::IfcWall,
            "IFCWALLSTANDARDCASE" => Self::IfcWallStandardCase,
            "IFCSLAB" => Self::IfcSlab,
            "IFCBEAM" => Self::IfcBeam,
            "IFCCOLUMN" => Self::IfcColumn,
            "IFCROOF" => Self::IfcRoof,
            "IFCSTAIR" => Self::IfcStair,
            "IFCRAMP" => Self::IfcRamp,
            "IFCRAILING" => Self::IfcRailing,
            "IFCCURTAINWALL" => Self::IfcCurtainWall,
            "IFCPLATE" => Self::IfcPlate,
            "IFCMEMBER" => Self::IfcMember,
            "IFCCOVERING" => Self::IfcCovering,
            "IFCFOOTING" => Self::IfcFooting,
            "IFCPILE" => Self::IfcPile,
            "IFCBUILDINGELEMENTPROXY" => Self::IfcBuildingElementProxy,

            "IFCDOOR" => Self::IfcDoor,
            "IFCWINDOW" => Self::IfcWindow,
            "IFCOPENINGELEMENT" => Self::IfcOpeningElement,

            "IFCSPACE" => Self::IfcSpace,
            "IFCBUILDINGSTOREY" => Self::IfcBuildingStorey,
            "IFCBUILDING" => Self::IfcBuilding,
            "IFCSITE" => Self::IfcSite,
            "IFCPROJECT" => Self::IfcProject,

            "IFCRELAGGREGATES" => Self::IfcRelAggregates,
            "IFCRELNESTS" => Self::IfcRelNests,
            "IFCRELCONTAINEDINSPATIALSTRUCTURE" => Self::IfcRelContainedInSpatialStructure,
            "IFCRELDEFINESBYPROPERTIES" => Self::IfcRelDefinesByProperties,
            "IFCRELDEFINESBYTYPE" => Self::IfcRelDefinesByType,
            "IFCRELASSIGNSTOGROUP" => Self::IfcRelAssignsToGroup,
            "IFCRELASSIGNSTOPRODUCT" => Self::IfcRelAssignsToProduct,
            "IFCRELCONNECTSELEMENTS" => Self::IfcRelConnectsElements,
            "IFCRELCONNECTSPATHELEMENTS" => Self::IfcRelConnectsPathElements,
            "IFCRELASSOCIATESMATERIAL" => Self::IfcRelAssociatesMaterial,
            "IFCRELASSOCIATESCLASSIFICATION" => Self::IfcRelAssociatesClassification,
            "IFCRELASSOCIATESDOCUMENT" => Self::IfcRelAssociatesDocument,
            "IFCRELVOIDSELEMENT" => Self::IfcRelVoidsElement,
            "IFCRELFILLSELEMENT" => Self::IfcRelFillsElement,
            "IFCRELSPACEBOUNDARY" => Self::IfcRelSpaceBoundary,

            "IFCPROPERTYSET" => Self::IfcPropertySet,
            "IFCPROPERTYSINGLEVALUE" => Self::IfcPropertySingleValue,
            "IFCPROPERTYENUMERATEDVALUE" => Self::IfcPropertyEnumeratedValue,
            "IFCELEMENTQUANTITY" => Self::IfcElementQuantity,

            "IFCMATERIAL" => Self::IfcMaterial,
            "IFCMATERIALLAYER" => Self::IfcMaterialLayer,
            "IFCMATERIALLAYERSET" => Self::IfcMaterialLayerSet,
            "IFCMATERIALLAYERSETUSAGE" => Self::IfcMaterialLayerSetUsage,

            "IFCCLASSIFICATION" => Self::IfcClassification,
            "IFCCLASSIFICATIONREFERENCE" => Self::IfcClassificationReference,

            "IFCSHAPEREPRESENTATION" => Self::IfcShapeRepresentation,
            "IFCPRODUCTDEFINITIONSHAPE" => Self::IfcProductDefinitionShape,
            "IFCEXTRUDEDAREASOLID" => Self::IfcExtrudedAreaSolid,
            "IFCAXIS2PLACEMENT2D" => Self::IfcAxis2Placement2D,
            "IFCAXIS2PLACEMENT3D" => Self::IfcAxis2Placement3D,
            "IFCLOCALPLACEMENT" => Self::IfcLocalPlacement,
            "IFCCARTESIANPOINT" => Self::IfcCartesianPoint,
            "IFCDIRECTION" => Self::IfcDirection,
            "IFCPOLYLINE" => Self::IfcPolyline,
            "IFCGEOMETRICREPRESENTATIONCONTEXT" => Self::IfcGeometricRepresentationContext,
            "IFCRECTANGLEPROFILEDEF" => Self::IfcRectangleProfileDef,

            "IFCFLOWSEGMENT" => Self::IfcFlowSegment,
            "IFCFLOWTERMINAL" => Self::IfcFlowTerminal,
            "IFCDISTRIBUTIONELEMENT" => Self::IfcDistributionElement,

            "IFCFURNISHINGELEMENT" => Self::IfcFurnishingElement,

            "IFCOWNERHISTORY" => Self::IfcOwnerHistory,
            "IFCPERSON" => Self::IfcPerson,
            "IFCORGANIZATION" => Self::IfcOrganization,
            "IFCPERSONANDORGANIZATION" => Self::IfcPersonAndOrganization,
            "IFCAPPLICATION" => Self::IfcApplication,

            "IFCSIUNIT" => Self::IfcSIUnit,
            "IFCUNITASSIGNMENT" => Self::IfcUnitAssignment,

            _ => Self::Unknown(Arc::from(s)),
        }
    }

    /// Get string representation
    pub fn name(&self) -> &str {
        match self {
            Self::IfcWall => "IFCWALL",
            Self::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            Self::IfcSlab => "IFCSLAB",
            Self::IfcBeam => "IFCBEAM",
            Self::IfcColumn => "IFCCOLUMN",
            Self::IfcRoof => "IFCROOF",
            Self::IfcStair => "IFCSTAIR",
            Self::IfcRamp => "IFCRAMP",
            Self::IfcRailing => "IFCRAILING",
            Self::IfcCurtainWall => "IFCCURTAINWALL",
            Self::IfcPlate => "IFCPLATE",
            Self::IfcMember => "IFCMEMBER",
            Self::IfcCovering => "IFCCOVERING",
            Self::IfcFooting => "IFCFOOTING",
            Self::IfcPile => "IFCPILE",
            Self::IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",

            Self::IfcDoor => "IFCDOOR",
            Self::IfcWindow => "IFCWINDOW",
            Self::IfcOpeningElement => "IFCOPENINGELEMENT",

            Self::IfcSpace => "IFCSPACE",
            Self::IfcBuildingStorey => "IFCBUILDINGSTOREY",
            Self::IfcBuilding => "IFCBUILDING",
            Self::IfcSite => "IFCSITE",
            Self::IfcProject => "IFCPROJECT",

            Self::IfcRelAggregates => "IFCRELAGGREGATES",
            Self::IfcRelNests => "IFCRELNESTS",
            Self::IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            Self::IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
            Self::IfcRelDefinesByType => "IFCRELDEFINESBYTYPE",
            Self::IfcRelAssignsToGroup => "IFCRELASSIGNSTOGROUP",
            Self::IfcRelAssignsToProduct => "IFCRELASSIGNSTOPRODUCT",
            Self::IfcRelConnectsElements => "IFCRELCONNECTSELEMENTS",
            Self::IfcRelConnectsPathElements => "IFCRELCONNECTSPATHELEMENTS",
            Self::IfcRelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",
            Self::IfcRelAssociatesClassification => "IFCRELASSOCIATESCLASSIFICATION",
            Self::IfcRelAssociatesDocument => "IFCRELASSOCIATESDOCUMENT",
            Self::IfcRelVoidsElement => "IFCRELVOIDSELEMENT",
            Self::IfcRelFillsElement => "IFCRELFILLSELEMENT",
            Self::IfcRelSpaceBoundary => "IFCRELSPACEBOUNDARY",

            Self::IfcPropertySet => "IFCPROPERTYSET",
            Self::IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
            Self::IfcPropertyEnumeratedValue => "IFCPROPERTYENUMERATEDVALUE",
            Self::IfcElementQuantity => "IFCELEMENTQUANTITY",

            Self::IfcMaterial => "IFCMATERIAL",
            Self::IfcMaterialLayer => "IFCMATERIALLAYER",
            Self::IfcMaterialLayerSet => "IFCMATERIALLAYERSET",
            Self::IfcMaterialLayerSetUsage => "IFCMATERIALLAYERSETUSAGE",

            Self::IfcClassification => "IFCCLASSIFICATION",
            Self::IfcClassificationReference => "IFCCLASSIFICATIONREFERENCE",

            Self::IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
            Self::IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",
            Self::IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
            Self::IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
            Self::IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
            Self::IfcLocalPlacement => "IFCLOCALPLACEMENT",
            Self::IfcCartesianPoint => "IFCCARTESIANPOINT",
            Self::IfcDirection => "IFCDIRECTION",
            Self::IfcPolyline => "IFCPOLYLINE",
            Self::IfcGeometricRepresentationContext => "IFCGEOMETRICREPRESENTATIONCONTEXT",
            Self::IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",

            Self::IfcFlowSegment => "IFCFLOWSEGMENT",
            Self::IfcFlowTerminal => "IFCFLOWTERMINAL",
            Self::IfcDistributionElement => "IFCDISTRIBUTIONELEMENT",

            Self::IfcFurnishingElement => "IFCFURNISHINGELEMENT",

            Self::IfcOwnerHistory => "IFCOWNERHISTORY",
            Self::IfcPerson => "IFCPERSON",
            Self::IfcOrganization => "IFCORGANIZATION",
            Self::IfcPersonAndOrganization => "IFCPERSONANDORGANIZATION",
            Self::IfcApplication => "IFCAPPLICATION",

            Self::IfcSIUnit => "IFCSIUNIT",
            Self::IfcUnitAssignment => "IFCUNITASSIGNMENT",

            Self::Unknown(name) => name,
        }
    }

    /// Check if this is a spatial structure element (site through space).
    /// The project itself is not one.
    pub fn is_spatial_structure(&self) -> bool {
        matches!(
            self,
            Self::IfcSite | Self::IfcBuilding | Self::IfcBuildingStorey | Self::IfcSpace
        )
    }

    /// Check if this is a physical element that may carry a geometric
    /// representation
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            Self::IfcWall
                | Self::IfcWallStandardCase
                | Self::IfcSlab
                | Self::IfcBeam
                | Self::IfcColumn
                | Self::IfcRoof
                | Self::IfcStair
                | Self::IfcRamp
                | Self::IfcRailing
                | Self::IfcCurtainWall
                | Self::IfcPlate
                | Self::IfcMember
                | Self::IfcCovering
                | Self::IfcFooting
                | Self::IfcPile
                | Self::IfcBuildingElementProxy
                | Self::IfcDoor
                | Self::IfcWindow
                | Self::IfcOpeningElement
                | Self::IfcFlowSegment
                | Self::IfcFlowTerminal
                | Self::IfcDistributionElement
                | Self::IfcFurnishingElement
        )
    }

    /// The relationship kind this type belongs to, if it is a relationship
    pub fn rel_kind(&self) -> Option<RelKind> {
        let kind = match self {
            Self::IfcRelContainedInSpatialStructure => RelKind::Containment,
            Self::IfcRelAggregates => RelKind::Aggregation,
            Self::IfcRelNests => RelKind::Nesting,
            Self::IfcRelDefinesByProperties => RelKind::PropertyDefinition,
            Self::IfcRelDefinesByType => RelKind::TypeDefinition,
            Self::IfcRelAssignsToGroup | Self::IfcRelAssignsToProduct => RelKind::Assignment,
            Self::IfcRelConnectsElements | Self::IfcRelConnectsPathElements => RelKind::Connection,
            Self::IfcRelAssociatesMaterial
            | Self::IfcRelAssociatesClassification
            | Self::IfcRelAssociatesDocument => RelKind::Association,
            Self::IfcRelVoidsElement => RelKind::Voiding,
            Self::IfcRelFillsElement => RelKind::Filling,
            Self::IfcRelSpaceBoundary => RelKind::SpaceBoundary,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if this is a relationship
    pub fn is_relationship(&self) -> bool {
        self.rel_kind().is_some()
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Closed enumeration of relationship kinds.
///
/// Orphan pruning must never delete structural glue, and deciding that by
/// type tag alone is the contract: a structural relationship legitimately
/// has zero inbound references while still being load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelKind {
    Containment,
    Aggregation,
    Nesting,
    PropertyDefinition,
    TypeDefinition,
    Assignment,
    Connection,
    Association,
    Voiding,
    Filling,
    SpaceBoundary,
}

impl RelKind {
    /// Structural kinds hold the model together and are exempt from orphan
    /// pruning regardless of inbound references.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            RelKind::Containment
                | RelKind::Aggregation
                | RelKind::Nesting
                | RelKind::PropertyDefinition
                | RelKind::TypeDefinition
                | RelKind::Assignment
                | RelKind::Connection
        )
    }
}
