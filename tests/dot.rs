//! `dot()` over vec2/vec3/vec4, register and uniform operands.

use shadelang::compile;
use shadelang::vm::{ExecutionContext, UniformValue};

#[test]
fn vec2_dot_register_register() {
    let bc = compile("in vec2 a; in vec2 b; out float r; void main(){ r = dot(a, b); }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut a = [1.0f32, 2.0, 0.0, 0.0];
    let mut b = [3.0f32, 4.0, 0.0, 0.0];
    let mut r = [0.0f32];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("b").unwrap(), b.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("r").unwrap(), r.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(r[0], 11.0); // 1*3 + 2*4
}

#[test]
fn vec3_dot_register_uniform() {
    let bc = compile("in vec3 a; uniform vec3 u; out float r; void main(){ r = dot(a, u); }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    ctx.set_uniform(bc.uniform_slot("u").unwrap(), UniformValue::Vec3([1.0, 0.0, 0.0])).unwrap();
    let mut a = [2.0f32, 3.0, 4.0, 0.0];
    let mut r = [0.0f32];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("r").unwrap(), r.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(r[0], 2.0);
}

#[test]
fn vec4_dot_uniform_uniform() {
    let bc = compile("uniform vec4 u1; uniform vec4 u2; out float r; void main(){ r = dot(u1, u2); }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    ctx.set_uniform(bc.uniform_slot("u1").unwrap(), UniformValue::Vec4([1.0, 2.0, 3.0, 4.0])).unwrap();
    ctx.set_uniform(bc.uniform_slot("u2").unwrap(), UniformValue::Vec4([1.0, 1.0, 1.0, 1.0])).unwrap();
    let mut r = [0.0f32];
    ctx.bind_stream(bc.stream_slot("r").unwrap(), r.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(r[0], 10.0);
}

#[test]
fn dot_rejects_mismatched_vector_widths() {
    let err = compile("in vec2 a; in vec3 b; out float r; void main(){ r = dot(a, b); }").unwrap_err();
    assert!(matches!(err, shadelang::Error::ParseError { .. }));
}
