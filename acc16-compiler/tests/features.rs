use acc16_compiler::backend::usage::{total_reads, TempUsageAnalyzer};
use acc16_compiler::ir::ast::BinOp;
use acc16_compiler::ir::{Instr, Label, Operand, RelOp, Temp};
use acc16_compiler::{analyze, compile_to_ir, parse, CompileOptions};

const LOOP_SCENARIO: &str = r#"
    var a = 2;
    var b = 10;
    while a < b: {
        var a = a + 1;
    }
    var c = a;
"#;

// ── Slots ────────────────────────────────────────────────────────────────

#[test]
fn slots_follow_first_declaration_order() {
    let source = "var x = 1; var y = 2; var z = y; var x = z;";
    let program = parse(source).unwrap();
    let symbols = analyze(&program, source, &CompileOptions::default()).unwrap();

    let slots: Vec<_> = symbols.iter().map(|s| (s.name.as_str(), s.slot)).collect();
    assert_eq!(slots, vec![("x", 0), ("y", 1), ("z", 2)]);
}

#[test]
fn ir_lists_each_touched_slot_once() {
    let ir = compile_to_ir(LOOP_SCENARIO).unwrap();
    let slots: Vec<_> = ir.slots.iter().map(|s| (s.name.as_str(), s.index)).collect();
    assert_eq!(slots, vec![("a", 0), ("b", 1), ("c", 2)]);
}

// ── Expressions ──────────────────────────────────────────────────────────

#[test]
fn bitwise_not_is_a_unary_instruction() {
    let ir = compile_to_ir("var a = ~3; var b = ~a;").unwrap();
    assert_eq!(
        ir.instrs[0],
        Instr::Not {
            dst: Temp(0),
            src: Operand::Const(3),
        }
    );
    assert!(ir.instrs.contains(&Instr::Not {
        dst: Temp(2),
        src: Operand::Temp(Temp(1)),
    }));
    assert_eq!(ir.instrs[0].to_string(), "t0 = ~3");
}

#[test]
fn literal_right_operand_is_an_immediate() {
    let ir = compile_to_ir("var a = 5; var b = a + 1;").unwrap();
    assert!(ir.instrs.iter().any(|i| matches!(
        i,
        Instr::BinOp {
            op: BinOp::Add,
            right: Operand::Const(1),
            ..
        }
    )));
}

#[test]
fn literal_declaration_stores_constant_directly() {
    let ir = compile_to_ir("var a = 10;").unwrap();
    assert_eq!(ir.instrs.len(), 1);
    assert!(matches!(
        &ir.instrs[0],
        Instr::Store {
            src: Operand::Const(10),
            ..
        }
    ));
    assert_eq!(ir.temp_count(), 0);
}

#[test]
fn modulo_scenario_uses_three_temps_and_three_slots() {
    let ir = compile_to_ir("var a = 10; var b = 16; var c = a % b;").unwrap();
    assert_eq!(ir.temp_count(), 3);
    assert_eq!(ir.slots.len(), 3);
    assert!(ir.instrs.contains(&Instr::BinOp {
        dst: Temp(2),
        left: Temp(0),
        right: Operand::Temp(Temp(1)),
        op: BinOp::Mod,
    }));
}

#[test]
fn ir_renders_as_text() {
    let ir = compile_to_ir("var a = 10; var b = a * 3; print b;").unwrap();
    assert_eq!(
        ir.to_lines(),
        vec![
            "  store a[0], 10",
            "  t0 = load a[0]",
            "  t1 = t0 * 3",
            "  store b[1], t1",
            "  t2 = load b[1]",
            "  print t2",
        ]
    );
}

// ── Temp usage ───────────────────────────────────────────────────────────

#[test]
fn refcounts_sum_to_total_reads() {
    let source = std::fs::read_to_string("../samples/gcd.acc").expect("Failed to read gcd.acc");
    let ir = compile_to_ir(&source).unwrap();

    let counts = TempUsageAnalyzer::new().analyze(&ir);
    let reads: usize = ir.instrs.iter().map(|i| i.used_temps().len()).sum();
    assert_eq!(total_reads(&counts), reads);
    assert!(reads > 0);
}

// ── Control flow ─────────────────────────────────────────────────────────

#[test]
fn while_loop_shape() {
    let ir = compile_to_ir(LOOP_SCENARIO).unwrap();

    let branches: Vec<_> = ir
        .instrs
        .iter()
        .filter_map(|i| match i {
            Instr::Branch { op, target, .. } => Some((*op, *target)),
            _ => None,
        })
        .collect();
    let jumps: Vec<_> = ir
        .instrs
        .iter()
        .filter_map(|i| match i {
            Instr::Jump(l) => Some(*l),
            _ => None,
        })
        .collect();
    let labels: Vec<_> = ir
        .instrs
        .iter()
        .filter_map(|i| match i {
            Instr::Label(l) => Some(*l),
            _ => None,
        })
        .collect();

    // `a < b` is inverted so the branch leaves the loop.
    assert_eq!(branches, vec![(RelOp::Ge, Label(1))]);
    assert_eq!(jumps, vec![Label(0)]);
    assert_eq!(labels, vec![Label(0), Label(1)]);
}

#[test]
fn if_else_shape() {
    let ir = compile_to_ir("var a = 1; if a == 2: { print a; } else { print 0; }").unwrap();
    let shape: Vec<_> = ir
        .instrs
        .iter()
        .filter(|i| {
            matches!(
                i,
                Instr::Branch { .. } | Instr::Jump(_) | Instr::Label(_) | Instr::Print(_)
            )
        })
        .map(|i| i.to_string())
        .collect();
    assert_eq!(
        shape,
        vec![
            "if t0 != t1 goto L0",
            "print t2",
            "goto L1",
            "L0:",
            "print t3",
            "L1:",
        ]
    );
}

#[test]
fn condition_operands_are_always_temps() {
    let ir = compile_to_ir("var n = 3; while n > 0: { var n = n - 1; }").unwrap();
    let consts = ir
        .instrs
        .iter()
        .filter(|i| matches!(i, Instr::Const { value: 0, .. }))
        .count();
    assert_eq!(consts, 1);
}

#[test]
fn nested_blocks_share_one_scope() {
    let ir = compile_to_ir("{ var a = 1; { var b = a; } } print b;").unwrap();
    assert_eq!(ir.slots.len(), 2);
}
