//! Unit tests for method call transformer and result operator handler lookup

#[cfg(test)]
mod registry_tests {
    use linqsql::query_model::known_methods::{
        enumerable_contains, to_string_method, MATH_ABS_DOUBLE, STRING_CONTAINS, STRING_TO_LOWER,
    };
    use linqsql::query_model::{DataType, MethodInfo, ResultOperatorKind};
    use linqsql::registries::{
        CompoundMethodCallTransformerProvider, MethodCallTransformerProvider,
        MethodInfoBasedMethodCallTransformerRegistry, NameBasedMethodCallTransformerRegistry,
        ResultOperatorHandlerRegistry,
    };
    use test_case::test_case;

    fn has_transformer(provider: &dyn MethodCallTransformerProvider, method: &MethodInfo) -> bool {
        provider
            .get_transformer(method)
            .unwrap_or_else(|e| panic!("lookup of {} failed: {}", method, e))
            .is_some()
    }

    #[test]
    fn test_default_signatures_are_registered() {
        let registry = MethodInfoBasedMethodCallTransformerRegistry::create_default();

        assert!(!registry.is_empty());
        assert!(has_transformer(&registry, &STRING_CONTAINS));
        assert!(has_transformer(&registry, &STRING_TO_LOWER));
        assert!(has_transformer(&registry, &MATH_ABS_DOUBLE));
    }

    #[test]
    fn test_closed_generic_method_uses_definition() {
        let registry = MethodInfoBasedMethodCallTransformerRegistry::create_default();
        let contains = enumerable_contains(DataType::String);

        assert!(registry.get_item_exact(&contains).is_none());
        assert!(has_transformer(&registry, &contains));
    }

    #[test]
    fn test_override_uses_base_definition() {
        let registry = MethodInfoBasedMethodCallTransformerRegistry::create_default();
        let derived = MethodInfo::instance("MyString", "ToLower", vec![], DataType::String)
            .with_base_definition(STRING_TO_LOWER.clone());

        assert!(has_transformer(&registry, &derived));
    }

    #[test]
    fn test_name_based_lookup_ignores_declaring_type() {
        let registry = NameBasedMethodCallTransformerRegistry::create_default();

        assert!(has_transformer(&registry, &to_string_method(&DataType::Int32)));
        assert!(has_transformer(&registry, &to_string_method(&DataType::entity("Cook"))));
        assert!(!has_transformer(
            &registry,
            &MethodInfo::instance("Cook", "Frobnicate", vec![], DataType::String)
        ));
    }

    #[test]
    fn test_compound_provider_falls_through() {
        let provider = CompoundMethodCallTransformerProvider::create_default();

        assert_eq!(provider.providers().len(), 3);
        assert!(has_transformer(&provider, &STRING_CONTAINS));
        assert!(has_transformer(&provider, &to_string_method(&DataType::Double)));
        assert!(!has_transformer(
            &provider,
            &MethodInfo::instance("String", "Frobnicate", vec![], DataType::String)
        ));
    }

    #[test_case(ResultOperatorKind::Take ; "take")]
    #[test_case(ResultOperatorKind::Count ; "count")]
    #[test_case(ResultOperatorKind::GroupBy ; "group by")]
    #[test_case(ResultOperatorKind::Union ; "union")]
    #[test_case(ResultOperatorKind::DefaultIfEmpty ; "default if empty")]
    fn test_default_handler_registered(kind: ResultOperatorKind) {
        let registry = ResultOperatorHandlerRegistry::create_default();
        assert!(registry.is_registered(kind));
        assert!(registry.get_item(kind).is_some());
    }

    #[test_case(ResultOperatorKind::LongCount ; "long count")]
    #[test_case(ResultOperatorKind::Max ; "max")]
    #[test_case(ResultOperatorKind::Average ; "average")]
    fn test_handler_found_through_base_kind(kind: ResultOperatorKind) {
        let registry = ResultOperatorHandlerRegistry::create_default();
        assert!(!registry.is_registered(kind));
        assert!(registry.get_item(kind).is_some());
    }

    #[test]
    fn test_empty_registry_has_no_handlers() {
        let registry = ResultOperatorHandlerRegistry::new();
        assert!(registry.get_item(ResultOperatorKind::Take).is_none());
    }
}
