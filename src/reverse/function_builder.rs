//! Storage functions from routine rows and table-valued function columns

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::property_builder::{
    default_facets, resolve_store_type, PropertyBuilder, TypeResolutionError,
};
use crate::model::{
    Built, EdmSchemaError, FunctionParameter, ModelBuilderErrorCode, ParameterMode, ReturnParameter,
    RowType, StoreFunction, TypeUsage,
};
use crate::naming::{create_valid_ecma_name, NameComparer, UniqueIdentifierService};
use crate::project::VersionCapabilities;
use crate::provider::ProviderManifest;
use crate::schema::{
    split_function_rows, split_table_rows, FullyQualifiedName, FunctionDetailsRow, TableDetailsRow,
};

/// Row types of table-valued functions keyed by function name
pub type TvfReturnTypes = IndexMap<FullyQualifiedName, Built<RowType>>;

pub struct FunctionBuilder<'a> {
    manifest: &'a dyn ProviderManifest,
    capabilities: VersionCapabilities,
    namespace: String,
    function_names: UniqueIdentifierService,
}

impl<'a> FunctionBuilder<'a> {
    pub fn new(
        manifest: &'a dyn ProviderManifest,
        capabilities: VersionCapabilities,
        namespace: &str,
    ) -> Self {
        Self {
            manifest,
            capabilities,
            namespace: namespace.to_string(),
            function_names: UniqueIdentifierService::new(NameComparer::Ordinal),
        }
    }

    /// Resolve a parameter's type, recording a diagnostic when it cannot be used
    pub fn get_function_parameter_type(
        &self,
        row: &FunctionDetailsRow,
        position: usize,
        errors: &mut Vec<EdmSchemaError>,
    ) -> Option<TypeUsage> {
        match resolve_store_type(self.manifest, &self.capabilities, row.parameter_type.as_deref()) {
            Ok(descriptor) => Some(TypeUsage {
                store_type_name: descriptor.name.to_string(),
                primitive: descriptor.primitive,
                facets: default_facets(descriptor),
            }),
            Err(error) => {
                let type_name = match &error {
                    TypeResolutionError::Missing => "(none)".to_string(),
                    TypeResolutionError::Unknown(t)
                    | TypeResolutionError::NotSupportedByVersion(t) => t.clone(),
                };
                errors.push(
                    EdmSchemaError::warning(
                        ModelBuilderErrorCode::UnsupportedType,
                        format!(
                            "The parameter '{}' at position {} of function '{}' has data type '{}' which is not supported. The function was excluded.",
                            row.parameter_name.as_deref().unwrap_or_default(),
                            position,
                            row.function_key(),
                            type_name
                        ),
                    )
                    .with_source(row.function_key().to_string()),
                );
                None
            }
        }
    }

    /// Build one parameter. Names are unique within `parameter_names`.
    pub fn create_function_parameter(
        &self,
        row: &FunctionDetailsRow,
        position: usize,
        parameter_names: &mut UniqueIdentifierService,
        errors: &mut Vec<EdmSchemaError>,
    ) -> Option<FunctionParameter> {
        let type_usage = self.get_function_parameter_type(row, position, errors);

        let direction = row.parameter_direction.as_deref().unwrap_or_default();
        let mode = ParameterMode::from_direction(direction);
        if mode.is_none() {
            errors.push(
                EdmSchemaError::warning(
                    ModelBuilderErrorCode::ParameterDirectionNotValid,
                    format!(
                        "The parameter '{}' at position {} of function '{}' has direction '{}', which is not valid. Valid directions are IN, OUT and INOUT.",
                        row.parameter_name.as_deref().unwrap_or_default(),
                        position,
                        row.function_key(),
                        direction
                    ),
                )
                .with_source(row.function_key().to_string()),
            );
        }

        let raw_name = row.parameter_name.as_deref().unwrap_or_default();
        let name = parameter_names.adjust_identifier(
            &create_valid_ecma_name(raw_name.trim_start_matches('@'), 'p'),
            None,
        );

        Some(FunctionParameter {
            name,
            type_usage: type_usage?,
            mode: mode?,
        })
    }

    /// Build the return parameter of a function.
    ///
    /// `None` with no new error means the routine legitimately returns
    /// nothing (a stored procedure).
    pub fn create_return_parameter(
        &self,
        row: &FunctionDetailsRow,
        tvf_return_types: &TvfReturnTypes,
        errors: &mut Vec<EdmSchemaError>,
    ) -> Option<ReturnParameter> {
        let function = row.function_key();

        if row.is_tvf {
            if !self.capabilities.supports_table_valued_functions {
                errors.push(
                    EdmSchemaError::warning(
                        ModelBuilderErrorCode::TableValuedFunctionsNotSupported,
                        format!(
                            "The function '{}' is a table-valued function, which is not supported by target version {}. The function was excluded.",
                            function, self.capabilities.version
                        ),
                    )
                    .with_source(function.to_string()),
                );
                return None;
            }

            return match tvf_return_types.get(&function) {
                None => {
                    errors.push(
                        EdmSchemaError::warning(
                            ModelBuilderErrorCode::MissingTvfReturnTable,
                            format!(
                                "The table-valued function '{}' has no description of the table it returns. The function was excluded.",
                                function
                            ),
                        )
                        .with_source(function.to_string()),
                    );
                    None
                }
                Some(Built::Invalid { errors: row_errors, .. }) => {
                    errors.extend(row_errors.iter().cloned());
                    None
                }
                Some(Built::Valid { item, .. }) => Some(ReturnParameter::Table(item.clone())),
            };
        }

        let return_type = row.return_type.as_deref()?;
        match resolve_store_type(self.manifest, &self.capabilities, Some(return_type)) {
            Ok(descriptor) => Some(ReturnParameter::Scalar(TypeUsage {
                store_type_name: descriptor.name.to_string(),
                primitive: descriptor.primitive,
                facets: default_facets(descriptor),
            })),
            Err(_) => {
                errors.push(
                    EdmSchemaError::warning(
                        ModelBuilderErrorCode::UnsupportedType,
                        format!(
                            "The function '{}' has return data type '{}' which is not supported. The function was excluded.",
                            function, return_type
                        ),
                    )
                    .with_source(function.to_string()),
                );
                None
            }
        }
    }

    /// Row types for every table-valued function described by `columns`
    pub fn create_tvf_return_types(&self, columns: &[TableDetailsRow]) -> TvfReturnTypes {
        let properties = PropertyBuilder::new(self.manifest, self.capabilities);

        split_table_rows(columns)
            .into_iter()
            .map(|(key, rows)| {
                let set = properties.create_properties(&rows);
                let row_type = RowType {
                    name: key.to_string(),
                    properties: set.properties,
                };
                // a result column that cannot be represented breaks the whole row type
                let built = if set.excluded_column_names.is_empty() {
                    Built::valid(row_type, set.errors)
                } else {
                    Built::invalid(row_type, set.errors)
                };
                (key, built)
            })
            .collect()
    }

    /// Build one function from its rows (one row per parameter)
    pub fn create_function(
        &mut self,
        rows: &[&FunctionDetailsRow],
        tvf_return_types: &TvfReturnTypes,
    ) -> Option<Built<StoreFunction>> {
        let first = *rows.first()?;
        let mut errors = Vec::new();

        let mut parameter_names: UniqueIdentifierService =
            UniqueIdentifierService::new(NameComparer::Ordinal);
        let parameters: Vec<FunctionParameter> = rows
            .iter()
            .filter(|r| r.has_parameter())
            .enumerate()
            .filter_map(|(i, row)| {
                self.create_function_parameter(row, i + 1, &mut parameter_names, &mut errors)
            })
            .collect();

        let return_parameter = self.create_return_parameter(first, tvf_return_types, &mut errors);

        let name = self
            .function_names
            .adjust_identifier(&create_valid_ecma_name(&first.function_name, 'f'), None);
        let store_function_name =
            (name != first.function_name).then(|| first.function_name.clone());

        let function = StoreFunction {
            name,
            namespace: self.namespace.clone(),
            catalog: first.catalog.clone(),
            schema: first.schema.clone(),
            store_function_name,
            is_aggregate: first.is_aggregate,
            is_builtin: first.is_builtin,
            is_niladic: first.is_niladic,
            is_composable: first.is_composable,
            is_tvf: first.is_tvf,
            parameters,
            return_parameter,
        };

        if errors.is_empty() {
            debug!(
                function = %function.name,
                parameters = function.parameters.len(),
                "created function"
            );
            Some(Built::valid(function, Vec::new()))
        } else {
            warn!(function = %first.function_key(), errors = errors.len(), "function is invalid");
            Some(Built::invalid(function, errors))
        }
    }

    /// Build every function, in first-seen order
    pub fn create_functions(
        &mut self,
        rows: &[FunctionDetailsRow],
        tvf_columns: &[TableDetailsRow],
    ) -> Vec<Built<StoreFunction>> {
        let tvf_return_types = self.create_tvf_return_types(tvf_columns);
        split_function_rows(rows)
            .into_iter()
            .filter_map(|(_, group)| self.create_function(&group, &tvf_return_types))
            .collect()
    }
}
