pub mod report;
pub mod sale;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in sale::definitions() {
        registry.register(entry);
    }
    for entry in report::definitions() {
        registry.register(entry);
    }
    for entry in system::definitions() {
        registry.register(entry);
    }
}
