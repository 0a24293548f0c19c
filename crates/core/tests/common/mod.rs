//! Small C programs expressed as unoptimized IR, shared across test files.
#![allow(dead_code)]

use seminal_core::model::{Module, ModuleBuilder, Operand};
use seminal_core::source::InMemorySource;

pub const INPUT_SRC: &str = "\
#include <stdio.h>
int main() {
  int x = getchar();
  int y = x + 1;
  if (y > 0) {
    return 1;
  }
  return 0;
}
";

/// `x = getchar(); y = x + 1; if (y > 0)` with the branch on line 5.
pub fn input_program() -> Module {
    let mut m = ModuleBuilder::new("input").source_file("input.c");
    m.declare("getchar");
    let mut f = m.function("main", 2);
    f.at(3);
    let x = f.local("x");
    let c = f.call("getchar", vec![]);
    f.store(c, x);
    f.at(4);
    let y = f.local("y");
    let lx = f.load(x);
    let sum = f.compute("add", vec![lx.into(), Operand::int(1)]);
    f.store(sum, y);
    f.at(5);
    let ly = f.load(y);
    let cmp = f.compute("icmp sgt", vec![ly.into(), Operand::int(0)]);
    f.branch(Some(cmp.into()));
    f.at(6);
    f.ret(Some(Operand::int(1)));
    f.at(8);
    f.ret(Some(Operand::int(0)));
    f.finish();
    m.build()
}

pub fn input_source() -> InMemorySource {
    InMemorySource::new().with_file("input.c", INPUT_SRC)
}

/// `x = 5; if (x > 0)` with the branch on line 3.
pub fn literal_program() -> Module {
    let mut m = ModuleBuilder::new("literal").source_file("literal.c");
    let mut f = m.function("main", 1);
    f.at(2);
    let x = f.local("x");
    f.store(Operand::int(5), x);
    f.at(3);
    let lx = f.load(x);
    let cmp = f.compute("icmp sgt", vec![lx.into(), Operand::int(0)]);
    f.branch(Some(cmp.into()));
    f.ret(Some(Operand::int(1)));
    f.at(4);
    f.ret(Some(Operand::int(0)));
    f.finish();
    m.build()
}

/// `int f(int p) { return p; }` on line 1, called as `f(<arg>)` on line 3 of
/// `main`, whose result lands in `r`, tested on line 4.
pub fn interprocedural_program(arg_from_input: bool) -> Module {
    let mut m = ModuleBuilder::new("interproc").source_file("interproc.c");
    m.declare("getchar");
    let mut f = m.function("f", 1);
    let p = f.param("p");
    f.at(1);
    let lp = f.load(p);
    f.ret(Some(lp.into()));
    f.finish();

    let mut main = m.function("main", 2);
    main.at(3);
    let r = main.local("r");
    let arg: Operand = if arg_from_input {
        main.call("getchar", vec![]).into()
    } else {
        Operand::int(5)
    };
    let result = main.call("f", vec![arg]);
    main.store(result, r);
    main.at(4);
    let lr = main.load(r);
    let cmp = main.compute("icmp sgt", vec![lr.into(), Operand::int(0)]);
    main.branch(Some(cmp.into()));
    main.ret(Some(Operand::int(1)));
    main.at(5);
    main.ret(Some(Operand::int(0)));
    main.finish();
    m.build()
}

/// `a = b; b = a; if (a > 0)` in one scope.
pub fn cycle_program() -> Module {
    let mut m = ModuleBuilder::new("cycle");
    let mut f = m.function("main", 1);
    f.at(2);
    let a = f.local("a");
    let b = f.local("b");
    f.at(3);
    let lb = f.load(b);
    f.store(lb, a);
    f.at(4);
    let la = f.load(a);
    f.store(la, b);
    f.at(5);
    let la2 = f.load(a);
    let cmp = f.compute("icmp sgt", vec![la2.into(), Operand::int(0)]);
    f.branch(Some(cmp.into()));
    f.ret(Some(Operand::int(1)));
    f.finish();
    m.build()
}

/// `scanf("%d", &n); if (n > 10)` with the branch on line 4.
pub fn scanf_program() -> Module {
    let mut m = ModuleBuilder::new("scan");
    m.declare("scanf");
    let mut f = m.function("main", 1);
    f.at(2);
    let n = f.local("n");
    f.at(3);
    let fmt = f.string_literal("%d");
    f.call("scanf", vec![fmt.into(), n.into()]);
    f.at(4);
    let ln = f.load(n);
    let cmp = f.compute("icmp sgt", vec![ln.into(), Operand::int(10)]);
    f.branch(Some(cmp.into()));
    f.ret(Some(Operand::int(1)));
    f.finish();
    m.build()
}

/// Global `g` written from `getchar()` in `set` (line 2), tested in `main` (line 4).
pub fn global_program() -> Module {
    let mut m = ModuleBuilder::new("global");
    m.declare("getchar");
    let g = m.global("g", 1);
    let mut set = m.function("set", 2);
    set.at(2);
    let c = set.call("getchar", vec![]);
    set.store(c, g);
    set.ret(None);
    set.finish();

    let mut main = m.function("main", 3);
    main.at(4);
    let lg = main.load(g);
    let cmp = main.compute("icmp ne", vec![lg.into(), Operand::int(0)]);
    main.branch(Some(cmp.into()));
    main.ret(Some(Operand::int(1)));
    main.finish();
    m.build()
}
