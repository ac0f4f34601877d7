//! Tests for the command-line request flow

use core_kernel::{CoercionError, DateParser, Locale, Primitive, TargetType, Timezone, TypeRegistry};
use domain_coercion::Coercer;
use interface_cli::{parse_target, CliError, Request};

fn coercer(locale: &str) -> Coercer {
    Coercer::new(
        TypeRegistry::with_builtins(),
        DateParser::new(Locale::parse(locale).unwrap(), Timezone::default()),
    )
}

fn request(input: Option<&str>, from: Option<&str>, to: &str) -> Request {
    Request {
        input: input.map(str::to_string),
        from: from.map(|name| parse_target(name).unwrap()),
        to: parse_target(to).unwrap(),
    }
}

mod target_names {
    use super::*;

    #[test]
    fn test_primitive_names_and_aliases() {
        assert_eq!(parse_target("i32").unwrap(), TargetType::Primitive(Primitive::I32));
        assert_eq!(parse_target("Integer").unwrap(), TargetType::Primitive(Primitive::I32));
        assert_eq!(parse_target("double").unwrap(), TargetType::Primitive(Primitive::F64));
        assert_eq!(
            parse_target("localdate").unwrap(),
            TargetType::Primitive(Primitive::LocalDate)
        );
    }

    #[test]
    fn test_text_and_any() {
        assert_eq!(parse_target("String").unwrap(), TargetType::Text);
        assert_eq!(parse_target("text").unwrap(), TargetType::Text);
        assert_eq!(parse_target("ANY").unwrap(), TargetType::Any);
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(parse_target("Fraction"), Err(CliError::UnknownType(name)) if name == "Fraction"));
    }
}

mod requests {
    use super::*;

    #[test]
    fn test_literal_to_primitive() {
        let outcome = request(Some("150"), None, "long").execute(&coercer("en-US")).unwrap();
        assert_eq!(outcome.input, "150");
        assert_eq!(outcome.input_type, "String");
        assert_eq!(outcome.value, "150");
        assert_eq!(outcome.value_type, "i64");
    }

    #[test]
    fn test_null_becomes_zero() {
        let outcome = request(None, None, "double").execute(&coercer("en-US")).unwrap();
        assert_eq!(outcome.input_type, "null");
        assert_eq!(outcome.value, "0");
        assert_eq!(outcome.value_type, "f64");
    }

    #[test]
    fn test_localized_date_to_timestamp() {
        let outcome = request(Some("19/02/2002"), None, "Timestamp")
            .execute(&coercer("fr-FR"))
            .unwrap();
        assert_eq!(outcome.value, "2002-02-19T00:00:00Z");
    }

    #[test]
    fn test_source_domain_is_applied_first() {
        let outcome = request(Some("2023-04-14T21:56:30+06:00"), Some("OffsetDateTime"), "LocalDate")
            .execute(&coercer("en-US"))
            .unwrap();
        assert_eq!(outcome.input_type, "OffsetDateTime");
        assert_eq!(outcome.value, "2023-04-14");
        assert_eq!(outcome.value_type, "LocalDate");
    }

    #[test]
    fn test_invalid_literal_is_reported() {
        let result = request(Some("AB"), None, "char").execute(&coercer("en-US"));
        assert!(matches!(
            result,
            Err(CliError::Coercion(CoercionError::InvalidInput { .. }))
        ));
    }

    #[test]
    fn test_outcome_serializes_to_json() {
        let outcome = request(Some("true"), Some("bool"), "i32").execute(&coercer("en-US")).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["input_type"], "bool");
        assert_eq!(json["value"], "1");
        assert_eq!(json["value_type"], "i32");
        assert_eq!(json["target"], "i32");
    }
}
