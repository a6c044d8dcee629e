//! Property-based tests over generated programs.
//!
//! - rendering with comments then parsing gives back the same program
//! - minification renames injectively and keeps the public surface

use std::collections::HashSet;

use dvmbasic_rust::model::build::*;
use dvmbasic_rust::model::builtins::BUILTINS;
use dvmbasic_rust::model::{DvmType, Expression, Function, Operator, Program, Statement};
use dvmbasic_rust::processor::infer::infer_binary;
use dvmbasic_rust::{GenerateOptions, generate, parse};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Every generated function takes these, so names always resolve.
const ARGS: &[(&str, DvmType)] = &[("amount", DvmType::Uint64), ("owner", DvmType::String)];

const BINARY: &[&str] = &[
    "==", "!=", "<", ">", "<=", ">=", "+", "-", "*", "/", "%", "&", "|", "^", "<<", ">>",
];

fn arb_leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        any::<u64>().prop_map(int),
        "[a-z ]{0,8}".prop_map(text),
        prop::sample::select(ARGS.iter().map(|(n, _)| *n).collect::<Vec<_>>()).prop_map(name),
        Just(call("SIGNER", vec![])),
    ]
}

fn arb_expression() -> impl Strategy<Value = Expression> {
    arb_leaf().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (prop::sample::select(BINARY.to_vec()), inner.clone(), inner.clone()).prop_map(
                |(symbol, left, right)| {
                    let operator = Operator::from_symbol(symbol).unwrap();
                    let ty = infer_binary(operator, &left, &right);
                    op(operator, left, right, ty)
                }
            ),
            inner.clone().prop_map(not),
            inner.clone().prop_map(|e| call("STRLEN", vec![e])),
            (inner.clone(), inner).prop_map(|(a, b)| call("MAX", vec![a, b])),
        ]
    })
}

/// Comment text, including the delimiters of both comment forms.
const NOTE: &str = "[a-z]{1,8}( ([a-z]{1,8}|\\*/|/\\*|//)){0,3}";

type Line = (u8, Expression, u64, Vec<String>);

/// One numbered line: an executable statement or none, then some comments.
fn arb_line() -> impl Strategy<Value = Line> {
    (0u8..6, arb_expression(), 1u64..500, prop::collection::vec(NOTE, 0..3))
}

fn to_statements(index: usize, line: Line) -> Vec<Statement> {
    let (choice, expression, target, notes) = line;
    let number = (index as u64 + 1) * 10;
    let mut statements = match choice {
        0 => vec![return_expression(expression, number)],
        1 => vec![if_then(expression, target, number)],
        2 => vec![assign("amount", expression, number)],
        3 => vec![goto(target, number)],
        4 => declare_many(&["tmp", "scratch"], DvmType::Uint64, number),
        _ => vec![],
    };
    statements.extend(notes.into_iter().map(|note| comment(note, number)));
    statements
}

fn arb_function(name: String, public: bool) -> impl Strategy<Value = Function> {
    prop::collection::vec(arb_line(), 1..6).prop_map(move |lines| {
        let statements = lines
            .into_iter()
            .enumerate()
            .flat_map(|(i, line)| to_statements(i, line))
            .collect();
        let name = if public { name.to_uppercase() } else { name.clone() };
        function(
            name,
            ARGS.iter().map(|(n, ty)| arg(*n, *ty)).collect(),
            DvmType::Uint64,
            statements,
        )
    })
}

fn arb_program() -> impl Strategy<Value = Program> {
    prop::collection::vec(any::<bool>(), 1..4)
        .prop_flat_map(|visibility| {
            visibility
                .into_iter()
                .enumerate()
                .map(|(i, public)| arb_function(format!("fn{i}"), public))
                .collect::<Vec<_>>()
        })
        .prop_map(|functions| Program {
            headers: vec![],
            functions,
        })
}

// =============================================================================
// Round trip
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// parse(generate(p)) == p
    #[test]
    fn generate_then_parse_is_identity(program in arb_program(), compact in any::<bool>()) {
        let options = GenerateOptions {
            comments: true,
            optimize_space: compact,
            ..Default::default()
        };
        let code = generate(program.clone(), &options).code;
        let parsed = parse(&code);
        prop_assert!(parsed.is_ok(), "failed to parse:\n{}\n{:?}", code, parsed);
        prop_assert_eq!(parsed.unwrap(), program, "source:\n{}", code);
    }

    /// Without comments the output parses to the program minus its comments.
    #[test]
    fn generate_without_comments_drops_only_comments(program in arb_program()) {
        let code = generate(program.clone(), &GenerateOptions::default()).code;
        let mut expected = program;
        for function in &mut expected.functions {
            function.statements.retain(|s| s.kind.is_executable());
        }
        prop_assert_eq!(parse(&code).unwrap(), expected);
    }
}

// =============================================================================
// Minification
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn minification_is_total_and_injective(program in arb_program()) {
        let options = GenerateOptions { minify: true, ..Default::default() };
        let generated = generate(program.clone(), &options);
        let mapping = generated.mapping.clone().unwrap();
        let minified = parse(&generated.code);
        prop_assert!(minified.is_ok(), "minified output does not check:\n{}", generated.code);
        let minified = minified.unwrap();

        let builtins: HashSet<String> = BUILTINS.iter().map(|b| b.name.to_ascii_lowercase()).collect();
        let mut seen = HashSet::new();
        for new_name in mapping.names.keys() {
            prop_assert!(seen.insert(new_name.to_ascii_lowercase()));
            prop_assert!(!builtins.contains(&new_name.to_ascii_lowercase()));
        }

        for (before, after) in program.functions.iter().zip(&minified.functions) {
            if before.name.starts_with(|c: char| c.is_ascii_uppercase()) {
                prop_assert_eq!(&before.name, &after.name);
            } else {
                prop_assert_eq!(mapping.original(&after.name), Some(before.name.as_str()));
            }
            for (a, b) in before.args.iter().zip(&after.args) {
                let mapped = &mapping.names[&b.name];
                prop_assert_eq!(&mapped.name, &a.name);
                prop_assert_eq!(mapped.owner.as_deref(), Some(before.name.as_str()));
            }
        }
    }
}
