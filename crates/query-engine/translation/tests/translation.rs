mod common;

use common::{drama, movies, translate, Movie, Person};
use query_engine_ast::ast::helpers::{
    and, binary, constant, convert, eq, function, gt, int, member, member_path, ne,
};
use query_engine_ast::ast::{BinaryOperatorKind, MemberAccess, OrderByNode};
use query_engine_metadata::metadata::{ClrType, NamingPolicy, Value};
use query_engine_translation::translation::builder::{lambda, Param};
use query_engine_translation::translation::expression::{
    DeclaringType, Expression, MethodRef, SourceBinaryKind,
};
use query_engine_translation::translation::query::error::Error;

#[test]
fn where_with_a_single_comparison() {
    let query = movies().where_(|m| Ok(m.get("Year")?.eq(1994)));
    let description = translate(&query).unwrap();
    assert_eq!(description.table_name, "movies");
    similar_asserts::assert_eq!(description.filter, Some(eq(member("year"), int(1994))));
    assert!(description.ordering.is_empty());
    assert_eq!(description.top, None);
}

#[test]
fn filter_order_and_take() {
    let query = movies()
        .where_(|m| Ok(m.get("BestPictureWinner")?.eq(true)))
        .order_by_descending(|m| m.get("Year"))
        .take(10);
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(member("bestPictureWinner"), constant(true)))
    );
    assert_eq!(
        description.ordering,
        vec![OrderByNode::descending(MemberAccess::new("year"))]
    );
    assert_eq!(description.top, Some(10));
}

#[test]
fn chained_take_narrows_and_chained_skip_adds() {
    let description = translate(&movies().take(125).take(50).skip(10).skip(5)).unwrap();
    assert_eq!(description.top, Some(50));
    assert_eq!(description.skip, Some(15));

    let description = translate(&movies().take(50).take(125)).unwrap();
    assert_eq!(description.top, Some(50));
}

#[test]
fn translating_twice_gives_equal_descriptions() {
    let query = movies()
        .where_(|m| Ok(m.get("Year")?.gt(1990).and_also(m.get("Score")?.ge(7.5))))
        .order_by(|m| m.get("Title"))
        .then_by_descending(|m| m.get("Year"))
        .skip(5)
        .take(20);
    similar_asserts::assert_eq!(translate(&query).unwrap(), translate(&query).unwrap());
}

#[test]
fn order_by_is_the_primary_key_even_after_then_by() {
    let query = movies()
        .then_by(|m| m.get("Title"))
        .order_by_descending(|m| m.get("Year"))
        .then_by(|m| m.get("Duration"));
    let description = translate(&query).unwrap();
    assert_eq!(
        description.ordering,
        vec![
            OrderByNode::descending(MemberAccess::new("year")),
            OrderByNode::ascending(MemberAccess::new("title")),
            OrderByNode::ascending(MemberAccess::new("duration")),
        ]
    );
}

#[test]
fn a_second_order_by_takes_precedence() {
    let query = movies()
        .order_by(|m| m.get("Title"))
        .order_by(|m| m.get("Year"));
    let description = translate(&query).unwrap();
    assert_eq!(
        description.ordering,
        vec![
            OrderByNode::ascending(MemberAccess::new("year")),
            OrderByNode::ascending(MemberAccess::new("title")),
        ]
    );
}

#[test]
fn successive_where_clauses_are_combined() {
    let query = movies()
        .where_(|m| Ok(m.get("Year")?.eq(1994)))
        .where_(|m| Ok(m.get("Rating")?.eq("R")));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(and(
            eq(member("year"), int(1994)),
            eq(member("mpaa_rating"), constant("R"))
        ))
    );
}

#[test]
fn unknown_query_operators_are_rejected() {
    let key = lambda::<Movie>(|m| m.get("Year")).unwrap();
    let query = movies().apply("GroupBy", key);
    let error = translate(&query).unwrap_err();
    assert_eq!(error, Error::UnsupportedOperation("GroupBy".to_string()));
    assert_eq!(
        error.to_string(),
        "'GroupBy' clause in query expression is not supported."
    );
}

#[test]
fn predicates_must_have_one_parameter() {
    let first = Param::<Movie>::new("a");
    let second = Param::<Movie>::new("b");
    let body = first.get("Year").unwrap().eq(second.get("Year").unwrap());
    let Expression::Parameter(a) = first.expression() else {
        unreachable!()
    };
    let Expression::Parameter(b) = second.expression() else {
        unreachable!()
    };
    let query = movies().apply("Where", Expression::lambda(vec![a, b], body));
    assert!(matches!(
        translate(&query),
        Err(Error::InvalidPredicate(_))
    ));

    let query = movies().apply("Where", Expression::lambda(vec![], Expression::constant(true)));
    assert!(matches!(
        translate(&query),
        Err(Error::InvalidPredicate(_))
    ));
}

#[test]
fn members_must_belong_to_the_lambda_parameter() {
    let outer = Param::<Movie>::new("outer");
    let query = movies().where_(|_| Ok(outer.get("Year")?.eq(1994)));
    assert!(matches!(
        translate(&query),
        Err(Error::InvalidPredicate(_))
    ));
}

#[test]
fn unknown_members_are_reported() {
    let query = movies().where_(|m| Ok(m.get("Budget")?.eq(1)));
    assert_eq!(
        translate(&query),
        Err(Error::InvalidPredicate(
            "'Budget' is not a member of 'Movie'".to_string()
        ))
    );
}

#[test]
fn captured_variables_are_inlined() {
    let year = 1994;
    let query = movies().where_(|m| Ok(m.get("Year")?.eq(Expression::captured("year", year))));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(description.filter, Some(eq(member("year"), int(1994))));
}

#[test]
fn explicit_wire_names_win_over_the_naming_policy() {
    for (policy, expected) in [
        (NamingPolicy::CamelCase, "bestPictureWinner"),
        (NamingPolicy::SnakeCase, "best_picture_winner"),
        (NamingPolicy::None, "BestPictureWinner"),
    ] {
        let query = movies()
            .naming_policy(policy)
            .where_(|m| Ok(m.get("BestPictureWinner")?.eq(true).and_also(m.get("Rating")?.eq("PG"))));
        let description = translate(&query).unwrap();
        similar_asserts::assert_eq!(
            description.filter,
            Some(and(
                eq(member(expected), constant(true)),
                eq(member("mpaa_rating"), constant("PG"))
            ))
        );
    }
}

#[test]
fn unrecognized_methods_drop_the_clause() {
    let pad_left = MethodRef::new(DeclaringType::String, "PadLeft", ClrType::String);
    let query = movies()
        .where_(|m| Ok(m.get("Title")?.call(pad_left, vec![Expression::constant(5)]).eq("x")))
        .where_(|m| Ok(m.get("Year")?.eq(1994)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(description.filter, Some(eq(member("year"), int(1994))));
}

#[test]
fn recognized_methods_with_the_wrong_arity_drop_the_clause() {
    let starts_with = MethodRef::new(DeclaringType::String, "StartsWith", ClrType::Bool);
    let query = movies().where_(|m| {
        Ok(m.get("Year")?
            .eq(1994)
            .and_also(m.get("Title")?.call(starts_with, vec![])))
    });
    let description = translate(&query).unwrap();
    assert_eq!(description.filter, None);
}

#[test]
fn string_functions_are_compiled() {
    let query = movies().where_(|m| {
        Ok(m.get("Title")?
            .to_lower()
            .starts_with("the")
            .and_also(m.get("Title")?.length().gt(10)))
    });
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(and(
            function(
                "startswith",
                vec![function("tolower", vec![member("title")]), constant("the")]
            ),
            gt(function("length", vec![member("title")]), int(10))
        ))
    );
}

#[test]
fn substring_accepts_one_or_two_arguments() {
    let query = movies().where_(|m| {
        Ok(m.get("Title")?
            .substring(1, Some(Expression::constant(3)))
            .eq("he "))
    });
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(
            function("substring", vec![member("title"), int(1), int(3)]),
            constant("he ")
        ))
    );
}

#[test]
fn date_properties_and_math_are_functions() {
    let query = movies().where_(|m| {
        Ok(m.get("ReleaseDate")?
            .date_part("Year")
            .eq(1994)
            .and_also(Expression::math("Round", m.get("Score")?).eq(8.0)))
    });
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(and(
            eq(function("year", vec![member("releaseDate")]), int(1994)),
            eq(function("round", vec![member("score")]), constant(8.0))
        ))
    );
}

#[test]
fn string_addition_is_concatenation() {
    let query = movies().where_(|m| Ok(m.get("Title")?.add(m.get("Rating")?).eq("AliensR")));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(
            function("concat", vec![member("title"), member("mpaa_rating")]),
            constant("AliensR")
        ))
    );
}

#[test]
fn operands_are_widened_to_a_common_type() {
    let query = movies().where_(|m| Ok(m.get("Duration")?.gt(90_i64)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(gt(convert(member("duration"), ClrType::Int64), constant(90_i64)))
    );

    let query = movies().where_(|m| Ok(m.get("Score")?.gt(5)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(gt(member("score"), constant(5.0)))
    );
}

#[test]
fn enum_comparisons_compare_member_names() {
    let query = movies().where_(|m| {
        Ok(m.get("Genre")?
            .convert(ClrType::Int32)
            .eq(Expression::constant(drama()).convert(ClrType::Int32)))
    });
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(member("genre"), constant(drama())))
    );

    let query = movies().where_(|m| Ok(m.get("Genre")?.convert(ClrType::Int32).eq(3)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(member("genre"), constant(drama())))
    );
}

#[test]
fn enum_values_without_a_member_keep_the_conversion() {
    let query = movies().where_(|m| Ok(m.get("Genre")?.convert(ClrType::Int32).ne(42)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(ne(convert(member("genre"), ClrType::Int32), int(42)))
    );
}

#[test]
fn narrowing_conversions_are_rejected() {
    let query = movies().where_(|m| Ok(m.get("Score")?.convert(ClrType::Int32).eq(5)));
    assert!(matches!(
        translate(&query),
        Err(Error::InvalidPredicate(_))
    ));
}

#[test]
fn operators_without_a_filter_form_are_rejected() {
    let query = movies()
        .where_(|m| Ok(m.get("Year")?.with(SourceBinaryKind::Power, 2).eq(4_000_000)));
    assert_eq!(
        translate(&query),
        Err(Error::InvalidPredicate(
            "the 'Power' operator is not supported".to_string()
        ))
    );
}

#[test]
fn modulo_is_part_of_the_description() {
    let query = movies().where_(|m| Ok(m.get("Year")?.rem(2).eq(0)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(
            binary(BinaryOperatorKind::Mod, member("year"), int(2)),
            int(0)
        ))
    );
}

#[test]
fn nested_members_are_paths() {
    let query = movies().where_(|m| Ok(m.get("Director")?.get::<Person>("Name")?.eq("Lynch")));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(eq(member_path(&["director", "name"]), constant("Lynch")))
    );
}

#[test]
fn the_first_projection_selects_fields() {
    let query = movies()
        .select(|m| {
            Ok(Expression::New {
                members: vec![
                    ("Title".to_string(), m.get("Title")?),
                    ("Year".to_string(), m.get("Year")?),
                    ("Upper".to_string(), m.get("Title")?.to_upper()),
                ],
            })
        })
        .select(|m| m.get("Duration"));
    let description = translate(&query).unwrap();
    assert_eq!(description.selection, vec!["title", "year"]);
    assert_eq!(description.projections.len(), 2);
    assert_eq!(description.projections[1].fields, vec!["duration"]);
}

#[test]
fn take_zero_is_an_invalid_argument() {
    assert!(matches!(
        translate(&movies().take(0)),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn query_options_and_parameters_are_carried() {
    let query = movies()
        .include_total_count()
        .include_deleted_items()
        .with_parameter("tenant", "contoso");
    let description = translate(&query).unwrap();
    assert!(description.include_total_count);
    assert!(description.include_deleted_items);
    assert_eq!(
        description.parameters.get("tenant").map(String::as_str),
        Some("contoso")
    );

    for reserved in ["$filter", "__includedeleted"] {
        assert!(matches!(
            translate(&movies().with_parameter(reserved, "x")),
            Err(Error::Ast(_))
        ));
    }
}

#[test]
fn null_comparisons_need_no_conversion() {
    let query = movies().where_(|m| Ok(m.get("Title")?.ne(Value::Null)));
    let description = translate(&query).unwrap();
    similar_asserts::assert_eq!(
        description.filter,
        Some(binary(
            BinaryOperatorKind::Ne,
            member("title"),
            constant(Value::Null)
        ))
    );
}
