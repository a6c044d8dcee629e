//! Renders a `Program` back to DVM-BASIC source.
//!
//! Layout: `Function name(args) Type`, then one `\n\t<line>\t<body>` per
//! statement, then `\nEnd Function`. Functions are separated by a blank
//! line. `optimize_space` drops the blank line, the statement indent, the
//! spaces around binary operators and after commas.

use super::GenerateOptions;
use crate::model::*;

pub fn generate_code(program: &Program, options: &GenerateOptions) -> String {
    let writer = SourceWriter { options };
    let mut blocks: Vec<String> = program
        .functions
        .iter()
        .map(|f| writer.function(f))
        .collect();
    if options.comments && !program.headers.is_empty() {
        let headers: Vec<String> = program.headers.iter().map(|h| comment_text(h, false)).collect();
        blocks.push(headers.join("\n"));
    }
    blocks.join(writer.function_separator())
}

struct SourceWriter<'a> {
    options: &'a GenerateOptions,
}

impl SourceWriter<'_> {
    fn function_separator(&self) -> &'static str {
        if self.options.optimize_space { "\n" } else { "\n\n" }
    }

    fn comma(&self) -> &'static str {
        if self.options.optimize_space { "," } else { ", " }
    }

    fn line_start(&self) -> &'static str {
        if self.options.optimize_space { "\n" } else { "\n\t" }
    }

    fn function(&self, f: &Function) -> String {
        let mut out = String::new();
        if self.options.comments {
            for comment in &f.comments {
                out.push_str(&comment_text(comment, false));
                out.push('\n');
            }
        }
        let args: Vec<String> = f.args.iter().map(|a| format!("{} {}", a.name, a.ty)).collect();
        out.push_str(&format!(
            "Function {}({}) {}",
            f.name,
            args.join(self.comma()),
            f.return_type
        ));
        self.statements(&f.statements, &mut out);
        out.push_str("\nEnd Function");
        out
    }

    fn statements(&self, statements: &[Statement], out: &mut String) {
        let visible: Vec<&Statement> = statements
            .iter()
            .filter(|s| self.options.comments || s.kind.is_executable())
            .collect();

        // Line number of the last statement written, so comments that open
        // a line of their own get a number.
        let mut current_line = None;
        let mut i = 0;
        while i < visible.len() {
            let statement = visible[i];
            match &statement.kind {
                StatementKind::Dim(first) => {
                    let mut names = vec![first.name.as_str()];
                    while let Some(StatementKind::Dim(next)) = visible.get(i + 1).map(|s| &s.kind) {
                        if visible[i + 1].line != statement.line || next.ty != first.ty {
                            break;
                        }
                        names.push(&next.name);
                        i += 1;
                    }
                    out.push_str(&format!(
                        "{}{}\tDIM {} AS {}",
                        self.line_start(),
                        statement.line,
                        names.join(self.comma()),
                        first.ty
                    ));
                }
                StatementKind::Comment(text) => {
                    if current_line != Some(statement.line) {
                        out.push_str(&format!("{}{}", self.line_start(), statement.line));
                    }
                    let followed_by_comment = matches!(
                        visible.get(i + 1),
                        Some(next) if matches!(next.kind, StatementKind::Comment(_))
                            && next.line == statement.line
                    );
                    if !self.options.optimize_space {
                        out.push('\t');
                    }
                    out.push_str(&comment_text(text, followed_by_comment));
                }
                StatementKind::NoOp => {
                    out.push_str(&format!("{}{}", self.line_start(), statement.line));
                }
                kind => {
                    out.push_str(&format!(
                        "{}{}\t{}",
                        self.line_start(),
                        statement.line,
                        self.statement_body(kind)
                    ));
                }
            }
            current_line = Some(statement.line);
            i += 1;
        }
    }

    fn statement_body(&self, kind: &StatementKind) -> String {
        match kind {
            StatementKind::Return(e) => format!("RETURN {}", self.expression(e, true)),
            StatementKind::Expression(e) => self.expression(e, true),
            StatementKind::Branch(branch) => {
                let mut body = format!(
                    "IF {} THEN GOTO {}",
                    self.expression(&branch.condition, true),
                    branch.then
                );
                if let Some(otherwise) = branch.otherwise {
                    body.push_str(&format!(" ELSE GOTO {otherwise}"));
                }
                body
            }
            StatementKind::Let(assignment) => format!(
                "LET {} = {}",
                assignment.name,
                self.expression(&assignment.expression, true)
            ),
            StatementKind::Goto(target) => format!("GOTO {target}"),
            StatementKind::Dim(dim) => format!("DIM {} AS {}", dim.name, dim.ty),
            StatementKind::Comment(text) => format!("// {text}"),
            StatementKind::NoOp => String::new(),
        }
    }

    /// Nested operations are always parenthesized; the outermost one of a
    /// statement or call argument never is.
    fn expression(&self, expression: &Expression, top_level: bool) -> String {
        match expression {
            Expression::Value(Literal::Uint64(n)) => n.to_string(),
            Expression::Value(Literal::String(s)) => format!("\"{s}\""),
            Expression::Name(name) => name.clone(),
            Expression::Call(call) => {
                let args: Vec<String> = call.args.iter().map(|a| self.expression(a, true)).collect();
                format!("{}({})", call.name, args.join(self.comma()))
            }
            Expression::Operation(operation) => {
                let rendered = self.operation(operation);
                if top_level {
                    rendered
                } else {
                    format!("({rendered})")
                }
            }
        }
    }

    fn operation(&self, operation: &Operation) -> String {
        let spacer = if self.options.optimize_space { "" } else { " " };
        match operation.operands.as_slice() {
            [operand] => format!(
                "{}{spacer}{}",
                operation.operator,
                self.expression(operand, false)
            ),
            [left, right] => format!(
                "{}{spacer}{}{spacer}{}",
                self.expression(left, false),
                operation.operator,
                self.expression(right, false)
            ),
            operands => {
                let parts: Vec<String> = operands.iter().map(|o| self.expression(o, false)).collect();
                parts.join(format!("{spacer}{}{spacer}", operation.operator).as_str())
            }
        }
    }
}

/// Picks a delimiter the text cannot close early. A line comment that has
/// another comment after it on the same line ends with a newline instead.
/// Text holding both a newline and `*/` has no faithful form; its `*/` is
/// split.
fn comment_text(text: &str, followed_by_comment: bool) -> String {
    let multi_line = text.contains('\n');
    let closes_block = text.contains("*/");
    match (multi_line || followed_by_comment, closes_block) {
        (true, false) => format!("/* {text} */"),
        (_, true) if !multi_line => {
            if followed_by_comment {
                format!("// {text}\n")
            } else {
                format!("// {text}")
            }
        }
        (_, true) => format!("/* {} */", text.replace("*/", "* /")),
        (false, false) => format!("// {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build::*;

    fn options(comments: bool, optimize_space: bool) -> GenerateOptions {
        GenerateOptions {
            minify: false,
            comments,
            optimize_space,
        }
    }

    fn single(statements: Vec<Statement>) -> Program {
        Program {
            headers: vec![],
            functions: vec![function("F", vec![], DvmType::Uint64, statements)],
        }
    }

    fn sym(s: &str) -> Operator {
        Operator::from_symbol(s).unwrap()
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(generate_code(&Program::default(), &options(true, false)), "");
    }

    #[test]
    fn test_expressions() {
        let add = |l, r| op(sym("+"), l, r, DvmType::Uint64);
        let test_cases = vec![
            (add(int(1), op(sym("*"), int(1), int(1), DvmType::Uint64)), "1 + (1 * 1)"),
            (add(name("a"), text("b")), "a + \"b\""),
            (not(name("a")), "! a"),
            (not(add(int(1), int(2))), "! (1 + 2)"),
            (add(not(name("a")), int(1)), "(! a) + 1"),
            (
                call("MAX", vec![add(int(1), int(2)), name("b")]),
                "MAX(1 + 2, b)",
            ),
        ];
        for (expression, expected) in test_cases {
            let program = single(vec![return_expression(expression, 10)]);
            assert_eq!(
                generate_code(&program, &options(false, false)),
                format!("Function F() Uint64\n\t10\tRETURN {expected}\nEnd Function")
            );
        }
    }

    #[test]
    fn test_dim_grouping() {
        let mut statements = declare_many(&["a", "b"], DvmType::Uint64, 10);
        statements.push(declare("c", DvmType::String, 10));
        statements.push(declare("d", DvmType::String, 20));
        let code = generate_code(&single(statements), &options(false, false));
        assert_eq!(
            code,
            "Function F() Uint64\n\t10\tDIM a, b AS Uint64\n\t10\tDIM c AS String\n\t20\tDIM d AS String\nEnd Function"
        );
    }

    #[test]
    fn test_comments() {
        let mut program = single(vec![
            return_value(0, 10),
            comment("first", 10),
            comment("second", 10),
            comment("multi\nline", 20),
        ]);
        program.functions[0].comments = vec!["about F".into()];
        program.headers = vec!["end note".into()];

        assert_eq!(
            generate_code(&program, &options(true, false)),
            "// about F\nFunction F() Uint64\n\t10\tRETURN 0\t/* first */\t// second\n\t20\t/* multi\nline */\nEnd Function\n\n// end note"
        );
        assert_eq!(
            generate_code(&program, &options(false, false)),
            "Function F() Uint64\n\t10\tRETURN 0\nEnd Function"
        );
    }

    #[test]
    fn test_comment_delimiters() {
        let test_cases = vec![
            ("plain", false, "// plain"),
            ("plain", true, "/* plain */"),
            ("two\nlines", false, "/* two\nlines */"),
            ("a */ b", false, "// a */ b"),
            ("a */ b", true, "// a */ b\n"),
            ("a */\nb", false, "/* a * /\nb */"),
            ("// inner", true, "/* // inner */"),
        ];
        for (text, followed_by_comment, expected) in test_cases {
            assert_eq!(comment_text(text, followed_by_comment), expected, "{text:?}");
        }
    }

    #[test]
    fn test_comment_closing_marker_survives() {
        let program = single(vec![
            return_value(0, 10),
            comment("a */ b", 10),
            comment("c", 10),
        ]);
        assert_eq!(
            generate_code(&program, &options(true, false)),
            "Function F() Uint64\n\t10\tRETURN 0\t// a */ b\n\t// c\nEnd Function"
        );
    }

    #[test]
    fn test_comment_lines_get_numbers() {
        let program = single(vec![
            comment("opening", 5),
            return_value(0, 10),
            comment("later", 20),
        ]);
        assert_eq!(
            generate_code(&program, &options(true, false)),
            "Function F() Uint64\n\t5\t// opening\n\t10\tRETURN 0\n\t20\t// later\nEnd Function"
        );
    }

    #[test]
    fn test_optimize_space() {
        let program = Program {
            headers: vec![],
            functions: vec![
                function(
                    "A",
                    vec![arg("x", DvmType::Uint64), arg("y", DvmType::String)],
                    DvmType::Uint64,
                    vec![
                        declare_many(&["a", "b"], DvmType::Uint64, 5).remove(0),
                        declare("b", DvmType::Uint64, 5),
                        store(text("k"), op(sym("+"), name("x"), int(1), DvmType::Uint64), 10),
                        comment("stored", 10),
                        if_then_else(op(sym("=="), name("x"), int(1), DvmType::Uint64), 30, 40, 20),
                    ],
                ),
                function("B", vec![], DvmType::Uint64, vec![goto(10, 10)]),
            ],
        };
        assert_eq!(
            generate_code(&program, &options(true, true)),
            "Function A(x Uint64,y String) Uint64\n5\tDIM a,b AS Uint64\n10\tSTORE(\"k\",x+1)// stored\n20\tIF x==1 THEN GOTO 30 ELSE GOTO 40\nEnd Function\nFunction B() Uint64\n10\tGOTO 10\nEnd Function"
        );
    }

    #[test]
    fn test_noop_lines() {
        let program = single(vec![statement(10, StatementKind::NoOp), return_value(0, 20)]);
        assert_eq!(
            generate_code(&program, &options(true, false)),
            "Function F() Uint64\n\t10\n\t20\tRETURN 0\nEnd Function"
        );
        assert_eq!(
            generate_code(&program, &options(false, false)),
            "Function F() Uint64\n\t20\tRETURN 0\nEnd Function"
        );
    }
}
