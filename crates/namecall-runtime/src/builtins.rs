//! Built-in callables
//!
//! - `help` - lists every registered callable as `name(descriptor)`
//! - `release` - drops the object named by a handle

use crate::callable::Invocation;
use crate::error::CallError;
use crate::registry::RegistryBuilder;
use crate::value::Dynamic;

pub const HELP: &str = "help";
pub const RELEASE: &str = "release";

pub(crate) fn install(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(HELP, "", help)
        .register(RELEASE, "h: handle", release)
}

fn help(invocation: &Invocation<'_>) -> Result<Dynamic, CallError> {
    Ok(Dynamic::from_text(invocation.registry().render_help()))
}

fn release(invocation: &Invocation<'_>) -> Result<Dynamic, CallError> {
    let raw: u64 = invocation.get(0)?;
    invocation.handles().remove(raw)?;
    Ok(Dynamic::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::New;
    use crate::error::HandleError;

    #[test]
    fn test_help_lists_itself() {
        let registry = RegistryBuilder::new().with_builtins().build();
        let text = registry.call::<&str>(HELP, &[]).unwrap();
        insta::assert_snapshot!(text.as_str().trim_end(), @r"
        List of supported functions:
          help()
          release(h: handle)
        ");
    }

    #[test]
    fn test_release_drops_object() {
        let registry = RegistryBuilder::new()
            .with_builtins()
            .register_fn("box", "n: int", |n: i64| New(n))
            .build();

        let handle = registry.call("box", &["9"]).unwrap();
        assert_eq!(registry.handles().len(), 1);

        registry.call(RELEASE, &[handle.as_str()]).unwrap();
        assert!(registry.handles().is_empty());

        let err = registry.call(RELEASE, &[handle.as_str()]).unwrap_err();
        assert!(matches!(err, CallError::Handle(HandleError::Stale(_))));
    }

    #[test]
    fn test_release_requires_handle() {
        let registry = RegistryBuilder::new().with_builtins().build();
        let err = registry.call::<&str>(RELEASE, &[]).unwrap_err();
        assert!(matches!(err, CallError::ArgumentCount { expected: 1, got: 0, .. }));
    }
}
