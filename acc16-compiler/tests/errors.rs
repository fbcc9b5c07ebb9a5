use acc16_compiler::backend::codegen::lower;
use acc16_compiler::ir::ir_generator::IrBuilder;
use acc16_compiler::ir::{Instr, Label, ProgramIR};
use acc16_compiler::{
    analyze, compile, compile_to_ir, compile_to_ir_with, parse, CompileError, CompileOptions,
    SemanticErrorKind,
};
use acc16_compiler::frontend::lexer::LexErrorKind;

// ── Semantic error detection ─────────────────────────────────────────────
// Each test verifies that an invalid program produces the correct error kind.

#[test]
fn undeclared_variable() {
    let result = compile_to_ir("print x;");
    assert_semantic_error(result, SemanticErrorKind::UndeclaredVariable);
}

#[test]
fn use_before_declaration() {
    let source = r#"
        var a = b;
        var b = 1;
    "#;
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::UndeclaredVariable);
}

#[test]
fn redeclaration_is_reuse_by_default() {
    let ir = compile_to_ir("var a = 1; var a = a + 1;").unwrap();
    assert_eq!(ir.slots.len(), 1);
}

#[test]
fn strict_mode_rejects_redeclaration() {
    let result = compile_to_ir_with("var a = 1; var a = 2;", &CompileOptions::strict());
    assert_semantic_error(result, SemanticErrorKind::VariableRedeclaration);
}

// ── Error location accuracy ─────────────────────────────────────────────

#[test]
fn semantic_error_points_at_the_name() {
    let source = "var a = 1;\nprint a + missing;";
    match compile_to_ir(source) {
        Err(CompileError::Semantic { line, col, message, .. }) => {
            assert_eq!((line, col), (2, 11));
            assert!(message.contains("missing"));
        }
        other => panic!("Expected semantic error, got: {:?}", other),
    }
}

#[test]
fn lexical_error_is_reported() {
    match compile_to_ir("var a = 1 @ 2;") {
        Err(CompileError::Lexical(e)) => {
            assert_eq!(e.kind, LexErrorKind::UnexpectedCharacter);
            assert_eq!(e.lexeme, "@");
            assert_eq!((e.line, e.column), (1, 11));
        }
        other => panic!("Expected lexical error, got: {:?}", other),
    }
}

#[test]
fn oversized_literal_is_a_lexical_error() {
    match compile_to_ir("var a = 1;\nprint a + 123456789012345678901234567890;") {
        Err(CompileError::Lexical(e)) => {
            assert_eq!(e.kind, LexErrorKind::NumberOutOfRange);
            assert_eq!(e.lexeme, "123456789012345678901234567890");
            assert_eq!((e.line, e.column), (2, 11));
        }
        other => panic!("Expected lexical error, got: {:?}", other),
    }
}

// ── Nesting limits ───────────────────────────────────────────────────────

fn nested_parens(depth: usize) -> String {
    format!("var a = {}1{};", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn redundant_parentheses_within_the_limit_compile() {
    let ir = compile_to_ir(&nested_parens(200)).unwrap();
    assert_eq!(ir.temp_count(), 0);
}

#[test]
fn deeply_nested_parentheses_are_a_parse_error() {
    let source = nested_parens(200_000);
    let result = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || compile_to_ir(&source))
        .unwrap()
        .join()
        .expect("parser overflowed its stack");
    match result {
        Err(CompileError::Parse { line, message, .. }) => {
            assert_eq!(line, 1);
            assert!(message.contains("nested too deeply"), "message was {message}");
        }
        other => panic!("Expected parse error, got: {:?}", other),
    }
}

#[test]
fn deeply_nested_blocks_are_a_parse_error() {
    let depth = 100_000;
    let source = format!("{}{}", "{".repeat(depth), "}".repeat(depth));
    assert!(matches!(
        compile_to_ir(&source),
        Err(CompileError::Parse { .. })
    ));
}

#[test]
fn repeated_bitwise_not_is_bounded_too() {
    let source = format!("var a = {}1;", "~".repeat(100_000));
    assert!(matches!(
        compile_to_ir(&source),
        Err(CompileError::Parse { .. })
    ));
}

#[test]
fn parse_error_is_reported() {
    match compile_to_ir("while a < 3 { print a; }") {
        Err(CompileError::Parse { line, col, message, .. }) => {
            assert_eq!((line, col), (1, 13));
            assert!(message.contains("':'"), "message was {message}");
        }
        other => panic!("Expected parse error, got: {:?}", other),
    }
}

// ── Unsupported constructs ───────────────────────────────────────────────

#[test]
fn condition_must_be_a_comparison() {
    let result = compile_to_ir("var a = 1; if a: { print a; }");
    assert!(matches!(
        result,
        Err(CompileError::UnsupportedConstruct {
            stage: "IR builder",
            ..
        })
    ));
}

#[test]
fn comparison_as_value_is_rejected_by_lowering() {
    // The IR can express it, but the machine has no compare-into-register op.
    compile_to_ir("var a = 1; var b = a < 2;").unwrap();
    let result = compile("var a = 1; var b = a < 2;");
    assert!(matches!(
        result,
        Err(CompileError::UnsupportedConstruct {
            stage: "lowerer",
            ..
        })
    ));
}

// ── Back-end failures ────────────────────────────────────────────────────

#[test]
fn too_many_live_temporaries() {
    let source = "var a = 1; var r = 1 + (2 + (3 + (4 + (5 + (6 + (7 + a))))));";
    assert_eq!(
        compile(source).unwrap_err(),
        CompileError::TooManyLiveTemporaries { limit: 6 }
    );
}

#[test]
fn six_live_temporaries_fit() {
    let source = "var a = 1; var r = 1 + (2 + (3 + (4 + a)));";
    let compiled = compile(source).unwrap();
    assert_eq!(compiled.lowered.peak_registers, 6);
}

#[test]
fn immediate_out_of_range() {
    assert_eq!(
        compile("var a = 9000;").unwrap_err(),
        CompileError::ImmediateOutOfRange {
            value: 9000,
            bits: 13
        }
    );
}

#[test]
fn unresolved_label() {
    let ir = ProgramIR {
        instrs: vec![Instr::Jump(Label(3))],
        slots: Vec::new(),
    };
    assert_eq!(
        lower(&ir).unwrap_err(),
        CompileError::UnresolvedLabel(Label(3))
    );
}

#[test]
fn builder_is_single_use() {
    let source = "var a = 1; print a;";
    let program = parse(source).unwrap();
    let symbols = analyze(&program, source, &CompileOptions::default()).unwrap();

    let mut builder = IrBuilder::new(&symbols, source);
    builder.build_program(&program).unwrap();
    assert_eq!(
        builder.build_program(&program).unwrap_err(),
        CompileError::DuplicateUsageOfBuilder
    );
}

fn assert_semantic_error(
    result: Result<acc16_compiler::ir::ProgramIR, CompileError>,
    expected: SemanticErrorKind,
) {
    match result {
        Ok(_) => panic!("Expected {:?} error, but compilation succeeded", expected),
        Err(CompileError::Semantic { kind, .. }) => {
            assert_eq!(kind, expected);
        }
        Err(other) => panic!("Expected {:?} semantic error, got: {:?}", expected, other),
    }
}
