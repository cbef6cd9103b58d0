//! List command

use namecall_runtime::Registry;

/// Print the help listing
pub fn run(registry: &Registry) {
    print!("{}", registry.render_help());
}
