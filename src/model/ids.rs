//! Opaque arena handles for model objects
//!
//! Objects live in `Vec`s owned by their model; a handle is the index into
//! that vector. Store and conceptual handles are distinct types so one can
//! never be used to index the other model.

use serde::Serialize;

macro_rules! model_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the object in its owning collection
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

model_id!(
    /// Storage entity type
    EntityTypeId
);
model_id!(
    /// Storage entity set
    EntitySetId
);
model_id!(
    /// Storage association type
    AssociationTypeId
);
model_id!(
    /// Storage association set
    AssociationSetId
);
model_id!(
    /// Storage function
    FunctionId
);
model_id!(
    /// Conceptual entity type
    ConceptualEntityTypeId
);
model_id!(
    /// Conceptual entity set
    ConceptualEntitySetId
);
model_id!(
    /// Conceptual association type
    ConceptualAssociationTypeId
);
model_id!(
    /// Conceptual association set
    ConceptualAssociationSetId
);
model_id!(
    /// Conceptual complex type
    ComplexTypeId
);
model_id!(
    /// Conceptual function import
    FunctionImportId
);
