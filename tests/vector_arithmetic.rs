//! Vector arithmetic (vec2/vec3/vec4): component-wise add/sub, scalar
//! mul/div, and mixed-type member access.

use shadelang::compile;
use shadelang::vm::ExecutionContext;

fn run_vec4(source: &str, a: [f32; 4], b: Option<[f32; 4]>) -> [f32; 4] {
    let bc = compile(source).expect("source should compile");
    let mut scratch = [0u8; 256];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();

    let mut a_buf = a;
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a_buf.as_mut_ptr() as *mut u8).unwrap();
    let mut b_buf = b.unwrap_or([0.0; 4]);
    if let Some(slot) = bc.stream_slot("b") {
        ctx.bind_stream(slot, b_buf.as_mut_ptr() as *mut u8).unwrap();
    }
    let mut dst = [0.0f32; 4];
    ctx.bind_stream(bc.stream_slot("dst").unwrap(), dst.as_mut_ptr() as *mut u8).unwrap();

    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    dst
}

#[test]
fn vec2_add_register_register() {
    let bc = compile("in vec2 a; in vec2 b; out vec2 dst; void main(){ dst = a + b; }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut a = [1.0f32, 2.0, 0.0, 0.0];
    let mut b = [3.0f32, 4.0, 0.0, 0.0];
    let mut dst = [0.0f32; 4];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("b").unwrap(), b.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("dst").unwrap(), dst.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(&dst[..2], [4.0, 6.0]);
}

#[test]
fn vec3_sub_register_register() {
    let bc = compile("in vec3 a; in vec3 b; out vec3 dst; void main(){ dst = a - b; }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut a = [5.0f32, 5.0, 5.0, 0.0];
    let mut b = [1.0f32, 2.0, 3.0, 0.0];
    let mut dst = [0.0f32; 4];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("b").unwrap(), b.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("dst").unwrap(), dst.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(&dst[..3], [4.0, 3.0, 2.0]);
}

#[test]
fn vec4_add_register_register() {
    let dst = run_vec4(
        "in vec4 a; in vec4 b; out vec4 dst; void main(){ dst = a + b; }",
        [1.0, 2.0, 3.0, 4.0],
        Some([10.0, 10.0, 10.0, 10.0]),
    );
    assert_eq!(dst, [11.0, 12.0, 13.0, 14.0]);
}

#[test]
fn vec4_scalar_multiplication_by_constant() {
    let dst = run_vec4("in vec4 a; out vec4 dst; void main(){ dst = a * 2.0; }", [1.0, 2.0, 3.0, 4.0], None);
    assert_eq!(dst, [2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn vec4_scalar_division_by_constant() {
    let dst = run_vec4("in vec4 a; out vec4 dst; void main(){ dst = a / 2.0; }", [2.0, 4.0, 6.0, 8.0], None);
    assert_eq!(dst, [1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn vec4_scalar_multiplication_by_uniform() {
    let bc = compile("in vec4 a; uniform float u; out vec4 dst; void main(){ dst = a * u; }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    ctx.set_uniform(bc.uniform_slot("u").unwrap(), shadelang::vm::UniformValue::Scalar(3.0)).unwrap();
    let mut a = [1.0f32, 2.0, 3.0, 4.0];
    let mut dst = [0.0f32; 4];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("dst").unwrap(), dst.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(dst, [3.0, 6.0, 9.0, 12.0]);
}

#[test]
fn member_access_combines_single_lanes_from_different_registers() {
    let bc = compile(
        "in vec4 a; in vec2 b; out float dst; void main(){ dst = a.x + b.y; }",
    )
    .unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut a = [10.0f32, 0.0, 0.0, 0.0];
    let mut b = [0.0f32, 5.0, 0.0, 0.0];
    let mut dst = [0.0f32];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("b").unwrap(), b.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("dst").unwrap(), dst.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(dst[0], 15.0);
}

#[test]
fn member_access_selects_high_lanes() {
    let bc = compile("in vec4 a; out float dst; void main(){ dst = a.z + a.w; }").unwrap();
    let mut scratch = [0u8; 128];
    let mut ctx = ExecutionContext::new(&bc, &mut scratch).unwrap();
    let mut a = [1.0f32, 2.0, 3.0, 4.0];
    let mut dst = [0.0f32];
    ctx.bind_stream(bc.stream_slot("a").unwrap(), a.as_mut_ptr() as *mut u8).unwrap();
    ctx.bind_stream(bc.stream_slot("dst").unwrap(), dst.as_mut_ptr() as *mut u8).unwrap();
    ctx.execute(bc.method_index("main").unwrap(), 1).unwrap();
    assert_eq!(dst[0], 7.0);
}
