use std::collections::BTreeSet;

use seminal_core::analysis::{AnalysisContext, LineIndex, Scope, SymbolResolver};
use seminal_core::config::SlicerConfig;
use seminal_core::model::{ModuleBuilder, Operand};
use seminal_core::source::NoSource;

mod common;

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn every_instruction_line_gets_a_record() {
    let module = common::input_program();
    let resolver = SymbolResolver::new(&module);
    let index = LineIndex::build(&module, &resolver);

    let lines: Vec<u32> = index.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![3, 4, 5, 6, 8]);
    assert_eq!(index.get(3).unwrap().variables, names(&["x"]));
    assert_eq!(index.get(4).unwrap().variables, names(&["x", "y"]));
    assert_eq!(index.get(5).unwrap().variables, names(&["y"]));
    assert!(index.get(6).unwrap().variables.is_empty(), "return of a constant names nothing");
}

#[test]
fn repeated_visits_accumulate_without_duplicates() {
    let mut m = ModuleBuilder::new("dups");
    let mut f = m.function("main", 1);
    f.at(2);
    let x = f.local("x");
    let a = f.load(x);
    let b = f.load(x);
    let sum = f.compute("add", vec![a.into(), b.into()]);
    f.store(sum, x);
    f.finish();
    let module = m.build();

    let resolver = SymbolResolver::new(&module);
    let index = LineIndex::build(&module, &resolver);
    assert_eq!(index.get(2).unwrap().variables, names(&["x"]));
}

#[test]
fn array_elements_collapse_to_the_base_variable() {
    let mut m = ModuleBuilder::new("array");
    let mut f = m.function("main", 1);
    f.at(2);
    let arr = f.local("arr");
    let i = f.local("i");
    f.at(3);
    let li = f.load(i);
    let slot = f.element_ptr(arr, li);
    f.store(Operand::int(7), slot);
    f.finish();
    let module = m.build();

    let resolver = SymbolResolver::new(&module);
    let index = LineIndex::build(&module, &resolver);
    assert_eq!(index.get(3).unwrap().variables, names(&["arr", "i"]));
    assert_eq!(resolver.resolve_id(slot).map(|s| s.name.as_str()), Some("arr"));
}

#[test]
fn undeclared_temporaries_are_not_named() {
    let mut m = ModuleBuilder::new("temps");
    let mut f = m.function("main", 1);
    f.at(2);
    let tmp = f.temporary();
    f.store(Operand::int(1), tmp);
    f.finish();
    let module = m.build();

    let resolver = SymbolResolver::new(&module);
    let index = LineIndex::build(&module, &resolver);
    assert!(index.get(2).unwrap().variables.is_empty());
    assert!(resolver.resolve_id(tmp).is_none());
}

#[test]
fn globals_resolve_to_the_global_scope() {
    let module = common::global_program();
    let resolver = SymbolResolver::new(&module);
    let global_id = module.globals[0].id;
    let symbol = resolver.resolve_id(global_id).expect("global symbol");
    assert_eq!(symbol.name, "g");
    assert_eq!(symbol.scope, Scope::Global);

    let index = LineIndex::build(&module, &resolver);
    assert_eq!(index.get(2).unwrap().variables, names(&["g"]));
    assert_eq!(index.get(4).unwrap().variables, names(&["g"]));
}

#[test]
fn line_records_carry_their_function_scope() {
    let module = common::interprocedural_program(true);
    let ctx = AnalysisContext::build(&module, &SlicerConfig::default(), &NoSource);
    assert_eq!(ctx.line(1).unwrap().scope, Scope::function("f"));
    assert_eq!(ctx.line(3).unwrap().scope, Scope::function("main"));
    assert_eq!(ctx.line(4).unwrap().scope, Scope::function("main"));
    for record in ctx.lines().iter() {
        let scope_is_known = match &record.scope {
            Scope::Global => true,
            Scope::Function(name) => ctx.function(name).is_some(),
        };
        assert!(scope_is_known, "line {} has unknown scope", record.line);
    }
}
