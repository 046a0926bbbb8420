//! End-to-end pipeline tests.
//!
//! Tests verify the full pipeline: package → codegen → formatter → C text,
//! the serializable compile result, and the command line binary.

use std::io::Write;
use std::process::{Command, Stdio};

use puffs_gen_c::{
    compile, compile_to_result, compile_with, sha256_hex, ClangFormat, CompileError,
    CompileResult, CompilerConfig, FormatError, Formatter, GenOptions, Unformatted,
};
use puffs_types::ast::*;
use puffs_types::PackageBuilder;

// ══════════════════════════════════════════════════════════════════════════════
// Fixtures
// ══════════════════════════════════════════════════════════════════════════════

/// A small package: a suspendible `state` struct with a counter, and a
/// public method that counts down to zero.
fn countdown() -> Package {
    let mut b = PackageBuilder::new("countdown");
    let state = b.id("state");
    let u32_ = b.ty("u32");
    let ten = b.int(10);
    let n = b.field("n", u32_).with_default(ten);
    let s = StructDecl::new(state).public().suspendible().field(n);

    let cond = Expr::binary(BinaryOp::GreaterThan, b.this_field("n"), b.int(0));
    let body = vec![Stmt::while_loop(
        cond,
        vec![Stmt::assign(b.this_field("n"), AssignOp::MinusEq, b.int(1))],
    )];
    let run = b.id("run");
    let f = FuncDecl::new(run)
        .receiver(state)
        .public()
        .suspendible()
        .body(body);
    b.file("countdown.puffs", vec![TopLevelDecl::Struct(s), TopLevelDecl::Func(f)]);
    b.finish()
}

/// A package the generator rejects: a non-suspendible method.
fn rejected() -> Package {
    let mut b = PackageBuilder::new("rejected");
    let (s, f) = (b.id("s"), b.id("f"));
    b.file("r.puffs", vec![TopLevelDecl::Func(FuncDecl::new(f).receiver(s))]);
    b.finish()
}

fn unformatted_config() -> CompilerConfig {
    let mut config = CompilerConfig::default();
    config.formatter.enabled = false;
    config
}

/// Upper-cases everything, so tests can tell formatted from raw output.
struct Shouting;

impl Formatter for Shouting {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        Ok(source.to_uppercase())
    }
}

/// Always fails.
struct Broken;

impl Formatter for Broken {
    fn format(&self, _source: &str) -> Result<String, FormatError> {
        Err(FormatError::Failed {
            program: "broken".into(),
            status: "exit status: 1".into(),
            stderr: "no".into(),
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// 1. Library pipeline
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn unformatted_output_matches_codegen() {
    let pkg = countdown();
    let c = compile(&pkg, &unformatted_config()).unwrap();
    assert_eq!(c, puffs_cgen::generate(&pkg).unwrap());
    assert!(c.contains("self->f_n -= 1;\n"));
}

#[test]
fn formatter_sees_the_whole_generated_text() {
    let pkg = countdown();
    let c = compile_with(&pkg, &GenOptions::default(), &Shouting).unwrap();
    assert!(c.starts_with("#IFNDEF PUFFS_COUNTDOWN_H\n"));
    assert!(c.contains("// C HEADER ENDS HERE."));
}

#[test]
fn formatter_failure_aborts_with_no_output() {
    let err = compile_with(&countdown(), &GenOptions::default(), &Broken).unwrap_err();
    assert!(matches!(err, CompileError::Format(_)), "{err}");
    assert_eq!(err.kind(), "format");
}

#[test]
fn codegen_failure_skips_the_formatter() {
    // Broken would fail too; the codegen error must win.
    let err = compile_with(&rejected(), &GenOptions::default(), &Broken).unwrap_err();
    assert!(matches!(err, CompileError::Codegen(_)), "{err}");
    assert!(err.to_string().contains("only suspendible functions may have a receiver"));
}

#[test]
fn version_option_reaches_the_output() {
    let mut config = unformatted_config();
    config.gen.version = 0xABCDE;
    let c = compile(&countdown(), &config).unwrap();
    assert!(c.contains("#define PUFFS_VERSION (0xABCDE)"));
}

#[test]
fn repeated_compiles_are_identical() {
    let pkg = countdown();
    let config = unformatted_config();
    let first = sha256_hex(&compile(&pkg, &config).unwrap());
    for _ in 0..20 {
        assert_eq!(sha256_hex(&compile(&pkg, &config).unwrap()), first);
    }
}

#[cfg(unix)]
#[test]
fn failing_formatter_process_is_reported() {
    let f = ClangFormat::new("false", "Chromium");
    let err = compile_with(&countdown(), &GenOptions::default(), &f).unwrap_err();
    let CompileError::Format(FormatError::Failed { program, .. }) = &err else {
        panic!("expected formatter failure, got {err}");
    };
    assert_eq!(program, "false");
}

#[test]
fn unformatted_formatter_is_identity() {
    let pkg = countdown();
    assert_eq!(
        compile_with(&pkg, &GenOptions::default(), &Unformatted).unwrap(),
        puffs_cgen::generate(&pkg).unwrap()
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// 2. Compile results
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn success_result_carries_source_and_digest() {
    let result = compile_to_result(&countdown(), &unformatted_config());
    assert!(result.success);
    assert_eq!(result.package, "countdown");
    let source = result.source.as_deref().unwrap();
    assert_eq!(result.sha256.as_deref(), Some(sha256_hex(source).as_str()));
    assert!(result.error.is_none());
}

#[test]
fn failure_result_carries_the_error() {
    let result = compile_to_result(&rejected(), &unformatted_config());
    assert!(!result.success);
    assert!(result.source.is_none());
    assert!(result.sha256.is_none());
    let error = result.error.unwrap();
    assert_eq!(error.kind, "codegen");
    assert!(error.message.contains("\"s.f\""), "{}", error.message);
}

#[test]
fn compile_result_json_roundtrip() {
    let result = compile_to_result(&countdown(), &unformatted_config());
    let json = serde_json::to_string(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["success"], true);
    assert!(!parsed["source"].is_null());
    let rt: CompileResult = serde_json::from_str(&json).unwrap();
    assert_eq!(rt, result);
}

// ══════════════════════════════════════════════════════════════════════════════
// 3. Command line
// ══════════════════════════════════════════════════════════════════════════════

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_puffs-gen-c"))
}

fn run_with_stdin(args: &[&str], stdin: &str) -> std::process::Output {
    let mut child = bin()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn cli_reads_stdin_and_writes_stdout() {
    let pkg = countdown();
    let json = serde_json::to_string(&pkg).unwrap();
    let out = run_with_stdin(&["--no-format"], &json);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        puffs_cgen::generate(&pkg).unwrap()
    );
}

#[test]
fn cli_failure_writes_nothing_to_stdout() {
    let json = serde_json::to_string(&rejected()).unwrap();
    let out = run_with_stdin(&["--no-format"], &json);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("only suspendible functions may have a receiver"), "{stderr}");
}

#[test]
fn cli_json_mode_reports_result() {
    let json = serde_json::to_string(&countdown()).unwrap();
    let out = run_with_stdin(&["--no-format", "--json"], &json);
    assert!(out.status.success());
    let result: CompileResult = serde_json::from_slice(&out.stdout).unwrap();
    assert!(result.success);
    assert!(result.source.unwrap().contains("puffs_countdown_state_run"));
}

#[test]
fn cli_merges_documents_of_one_package() {
    // Split the struct and the function into two documents.
    let full = countdown();
    let mut first = full.clone();
    let funcs = first.files[0].decls.split_off(1);
    let mut second = Package::new(full.name.clone(), full.ids.clone());
    second.files.push(File::new("run.puffs", funcs));

    let dir = std::env::temp_dir().join(format!("puffs-gen-c-merge-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let a = dir.join("a.json");
    let b = dir.join("b.json");
    std::fs::write(&a, serde_json::to_string(&first).unwrap()).unwrap();
    std::fs::write(&b, serde_json::to_string(&second).unwrap()).unwrap();
    let out_path = dir.join("out.c");

    let status = bin()
        .arg("--no-format")
        .arg("-o")
        .arg(&out_path)
        .arg(&a)
        .arg(&b)
        .status()
        .unwrap();
    assert!(status.success());
    let written = std::fs::read_to_string(&out_path).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
    assert_eq!(written, puffs_cgen::generate(&full).unwrap());
}
