/// Minimum stack space to keep available before recursing.
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated each time the stack has to grow.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if less than the red zone remains.
///
/// The parser and the evaluator call this at every recursive descent so deeply
/// nested scripts exhaust the interpreter's call-depth limit long before they
/// exhaust the native stack.
///
/// # Example
/// ```
/// use ckl::util::stack::ensure_sufficient_stack;
///
/// fn depth(n: u32) -> u32 {
///     ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
/// }
///
/// assert_eq!(depth(50_000), 50_000);
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
