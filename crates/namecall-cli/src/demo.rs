//! Functions the shell registers out of the box

use namecall_runtime::{CallError, New, Object, Registry, RegistryBuilder};

/// Built-ins plus the demo set, ready to install
pub fn registry() -> Registry {
    register(RegistryBuilder::new().with_builtins()).build()
}

pub fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register_fn("sum", "x: int, y: int", sum)
        .register_fn("greet", "name: string", greet)
        .register_fn("concat", "a: string, b: string", concat)
        .register_fn("string_new", "s: string", string_new)
        .register_fn("string_substr", "s: handle, pos: int, len: int", string_substr)
        .register_fn("string_len", "s: handle", string_len)
}

fn sum(x: i64, y: i64) -> Result<String, CallError> {
    let total = x
        .checked_add(y)
        .ok_or_else(|| CallError::failed(format!("{} + {} overflows", x, y)))?;
    Ok(format!("The result is {}", total))
}

fn greet(name: String) -> String {
    format!("Hello, {}!", name)
}

fn concat(a: String, b: String) -> String {
    a + &b
}

fn string_new(s: String) -> New<String> {
    New(s)
}

/// Characters `pos..pos + len` of the stored string
fn string_substr(s: Object<String>, pos: usize, len: usize) -> Result<String, CallError> {
    let text = s.lock();
    let count = text.chars().count();
    if pos > count {
        return Err(CallError::failed(format!(
            "position {} is past the end of a {}-character string",
            pos, count
        )));
    }
    Ok(text.chars().skip(pos).take(len).collect())
}

fn string_len(s: Object<String>) -> usize {
    s.lock().chars().count()
}
