//! Reverse engineering: discovered rows to storage model to conceptual model

mod association_builder;
mod collapse;
mod entity_builder;
mod function_builder;
mod mapping_builder;
mod mapping_context;
mod property_builder;
mod store_model_builder;

pub use association_builder::{AssociationBuilder, AssociationsOutcome};
pub use collapse::find_collapsible_associations;
pub use entity_builder::{
    create_defining_query, EntityRegister, EntitySetsOutcome, EntityTypeBuilder,
};
pub use function_builder::{FunctionBuilder, TvfReturnTypes};
pub use mapping_builder::{conceptual_association_for, OneToOneMappingBuilder};
pub use mapping_context::{ConceptualItem, MappingContext, StoreItem};
pub use property_builder::{
    default_facets, resolve_store_type, PropertyBuilder, PropertySet, TypeResolutionError,
};
pub use store_model_builder::StoreModelBuilder;
