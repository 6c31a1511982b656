//! `cross()`, vec3 only, register/register/uniform operand forms.

use shadelang::compile;
use shadelang::vm::{ExecutionContext, UniformValue};

#[test]
fn cross_of_basis_vectors_follows_the_right_hand_rule() {
    let bc = compile("in vec3 v; in vec3 u; out vec3 r; void main(){ r = cross(v, u); }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut v = [1.0f32, 0.0, 0.0, 0.0];
    let mut u = [0.0f32, 1.0, 0.0, 0.0];
    let mut r = [0.0f32; 4];
    ctx.bind_stream(bc.stream_slot("v").unwrap(), v.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("u").unwrap(), u.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("r").unwrap(), r.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(&r[..3], [0.0, 0.0, 1.0]);
}

#[test]
fn cross_register_uniform() {
    let bc = compile("in vec3 v; uniform vec3 u; out vec3 r; void main(){ r = cross(v, u); }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    ctx.set_uniform(bc.uniform_slot("u").unwrap(), UniformValue::Vec3([0.0, 1.0, 0.0])).unwrap();
    let mut v = [1.0f32, 0.0, 0.0, 0.0];
    let mut r = [0.0f32; 4];
    ctx.bind_stream(bc.stream_slot("v").unwrap(), v.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("r").unwrap(), r.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(&r[..3], [0.0, 0.0, 1.0]);
}

#[test]
fn cross_rejects_non_vec3_operands() {
    let err = compile("in vec2 v; in vec2 u; out vec3 r; void main(){ r = cross(v, u); }").unwrap_err();
    assert!(matches!(err, shadelang::Error::ParseError { .. }));
}
