//! `sin`/`cos`/`tan`/`asin`/`acos`/`atan`, scalar-only builtins.

use shadelang::compile;
use shadelang::vm::ExecutionContext;

fn run_scalar_builtin(call: &str, x: f32) -> f32 {
    let source = format!("in float x; out float r; void main(){{ r = {call}(x); }}");
    let bc = compile(&source).unwrap();
    let mut scratch = [0u8; 64];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut xs = [x];
    let mut r = [0.0f32];
    ctx.bind_stream(bc.stream_slot("x").unwrap(), xs.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("r").unwrap(), r.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    r[0]
}

#[test]
fn sin_of_zero_is_zero() {
    assert_eq!(run_scalar_builtin("sin", 0.0), 0.0);
}

#[test]
fn cos_of_zero_is_one() {
    assert_eq!(run_scalar_builtin("cos", 0.0), 1.0);
}

#[test]
fn tan_matches_std() {
    assert!((run_scalar_builtin("tan", 0.5) - 0.5f32.tan()).abs() < 1e-6);
}

#[test]
fn asin_acos_atan_round_trip_through_sin_cos_tan() {
    assert!((run_scalar_builtin("asin", 0.5) - 0.5f32.asin()).abs() < 1e-6);
    assert!((run_scalar_builtin("acos", 0.5) - 0.5f32.acos()).abs() < 1e-6);
    assert!((run_scalar_builtin("atan", 0.5) - 0.5f32.atan()).abs() < 1e-6);
}

#[test]
fn trig_functions_reject_vector_operands() {
    let err = compile("in vec2 v; out vec2 r; void main(){ r = sin(v); }").unwrap_err();
    assert!(matches!(err, shadelang::Error::ParseError { .. }));
}
