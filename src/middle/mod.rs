pub mod walk;
pub mod mangle;
pub mod definition;
pub mod prune;
pub mod mapping;

pub use definition::{locate, parse_template_and_args, TemplateDefinition};
pub use mangle::Mangler;
pub use mapping::SubstitutionMapping;
pub use prune::{prune, DeclaredNameRegistry};
