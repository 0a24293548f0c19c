use seminal_core::model::{
    load_module, Block, FunctionUnit, Instruction, ModelError, ModuleBuilder, Op, Operand, ValueId,
};
use tempfile::tempdir;

mod common;

#[test]
fn builder_output_validates() {
    for module in [
        common::input_program(),
        common::literal_program(),
        common::interprocedural_program(true),
        common::cycle_program(),
        common::scanf_program(),
        common::global_program(),
    ] {
        module.validate().unwrap_or_else(|e| panic!("{} invalid: {e}", module.name));
    }
}

#[test]
fn duplicate_value_ids_are_rejected() {
    let mut module = common::literal_program();
    module.functions[0].params.push(ValueId(0));
    assert_eq!(module.validate(), Err(ModelError::DuplicateValue { id: ValueId(0) }));
}

#[test]
fn dangling_references_are_rejected() {
    let mut module = ModuleBuilder::new("dangling").build();
    module.functions.push(FunctionUnit {
        name: "main".into(),
        line: Some(1),
        declaration: false,
        params: vec![],
        blocks: vec![Block {
            label: "entry".into(),
            instructions: vec![Instruction {
                id: Some(ValueId(1)),
                line: Some(2),
                op: Op::Load { ptr: Operand::Value(ValueId(99)) },
            }],
        }],
    });
    assert_eq!(
        module.validate(),
        Err(ModelError::DanglingValue { id: ValueId(99), function: "main".into() })
    );
}

#[test]
fn declarations_are_not_defined_functions() {
    let module = common::input_program();
    let defined: Vec<&str> = module.defined_functions().map(|f| f.name.as_str()).collect();
    assert_eq!(defined, vec!["main"]);
    assert!(module.function("getchar").expect("prototype").is_declaration());
}

#[test]
fn conditional_branch_lines_are_sorted_and_unique() {
    let module = common::input_program();
    assert_eq!(module.conditional_branch_lines(), vec![5]);
}

#[test]
fn load_module_reads_json_and_yaml() {
    let dir = tempdir().expect("tempdir");
    let module = common::input_program();

    let json_path = dir.path().join("input.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&module).unwrap()).unwrap();
    assert_eq!(load_module(&json_path).expect("json module"), module);

    let yaml_path = dir.path().join("input.yaml");
    std::fs::write(&yaml_path, serde_yaml::to_string(&module).unwrap()).unwrap();
    assert_eq!(load_module(&yaml_path).expect("yaml module"), module);
}

#[test]
fn load_module_parses_hand_written_json() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tiny.json");
    let body = r#"{
      "name": "tiny",
      "functions": [
        { "name": "getchar", "declaration": true },
        { "name": "main", "line": 1, "blocks": [ { "label": "entry", "instructions": [
          { "id": 0, "line": 2, "op": { "kind": "alloca" } },
          { "line": 2, "op": { "kind": "debug_declare", "address": 0,
                               "variable": { "name": "c", "line": 2 } } },
          { "id": 1, "line": 2, "op": { "kind": "call", "callee": { "direct": "getchar" } } },
          { "line": 2, "op": { "kind": "store",
                               "value": { "kind": "value", "value": 1 },
                               "ptr": { "kind": "value", "value": 0 } } }
        ] } ] }
      ]
    }"#;
    std::fs::write(&path, body).unwrap();
    let module = load_module(&path).expect("module");
    assert_eq!(module.defined_functions().count(), 1);
    assert_eq!(module.functions[1].instructions().count(), 4);
}

#[test]
fn load_module_reports_invalid_ir() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{"name":"bad","functions":[{"name":"main","line":1,"blocks":[{"label":"entry",
           "instructions":[{"id":1,"line":2,"op":{"kind":"load","ptr":{"kind":"value","value":7}}}]}]}]}"#,
    )
    .unwrap();
    let err = load_module(&path).unwrap_err();
    assert!(format!("{err:#}").contains("never defined"));
}
